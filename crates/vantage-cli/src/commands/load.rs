//! CSV series loading
//!
//! Input format is one observation per row:
//!
//! ```csv
//! series,timestamp,value
//! revenue,2026-01-01,1042.50
//! revenue,2026-01-02,1087.00
//! signups,2026-01-01,34
//! ```
//!
//! Timestamps are RFC 3339 or bare `YYYY-MM-DD` dates (treated as midnight
//! UTC). Empty or non-numeric values become missing observations so gap
//! detection can see them.

use std::collections::HashMap;
use std::path::Path;

use anyhow::{Context, Result};
use chrono::{DateTime, NaiveDate, Utc};
use serde::Deserialize;
use tracing::debug;

use vantage_core::DataSeries;

#[derive(Debug, Deserialize)]
struct Row {
    series: String,
    timestamp: String,
    value: String,
}

/// Load all series from a CSV file, in first-appearance order.
///
/// Points within each series are sorted by timestamp, so rows may arrive
/// interleaved or out of order.
pub fn load_series(path: &Path) -> Result<Vec<DataSeries>> {
    let mut reader = csv::Reader::from_path(path)
        .with_context(|| format!("Cannot open {}", path.display()))?;

    let mut order: Vec<String> = Vec::new();
    let mut by_id: HashMap<String, DataSeries> = HashMap::new();

    for (line, record) in reader.deserialize::<Row>().enumerate() {
        let row = record.with_context(|| format!("Invalid CSV row {}", line + 2))?;
        let timestamp = parse_timestamp(&row.timestamp)
            .with_context(|| format!("Invalid timestamp {:?} on row {}", row.timestamp, line + 2))?;
        let value: f64 = match row.value.trim() {
            "" => f64::NAN,
            v => v.parse().unwrap_or(f64::NAN),
        };

        let series = by_id.entry(row.series.clone()).or_insert_with(|| {
            order.push(row.series.clone());
            DataSeries::new(row.series.clone(), row.series.clone())
        });
        series.push(timestamp, value);
    }

    let mut loaded: Vec<DataSeries> = order
        .into_iter()
        .filter_map(|id| by_id.remove(&id))
        .collect();
    for series in &mut loaded {
        series.data.sort_by_key(|p| p.timestamp);
        debug!(series = %series.id, points = series.len(), "Series loaded");
    }

    anyhow::ensure!(!loaded.is_empty(), "No data rows in {}", path.display());
    Ok(loaded)
}

fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Ok(ts.with_timezone(&Utc));
    }
    let date = NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .context("expected RFC 3339 or YYYY-MM-DD")?;
    Ok(DateTime::from_naive_utc_and_offset(
        date.and_hms_opt(0, 0, 0).unwrap(),
        Utc,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_csv(content: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_loads_interleaved_series_in_order() {
        let file = write_csv(
            "series,timestamp,value\n\
             revenue,2026-01-02,110\n\
             signups,2026-01-01,5\n\
             revenue,2026-01-01,100\n",
        );

        let loaded = load_series(file.path()).unwrap();
        assert_eq!(loaded.len(), 2);
        assert_eq!(loaded[0].id, "revenue");
        assert_eq!(loaded[1].id, "signups");
        // Out-of-order rows get sorted by timestamp
        assert_eq!(loaded[0].values(), vec![100.0, 110.0]);
    }

    #[test]
    fn test_blank_value_becomes_missing() {
        let file = write_csv(
            "series,timestamp,value\n\
             m,2026-01-01,1\n\
             m,2026-01-02,\n\
             m,2026-01-03,3\n",
        );

        let loaded = load_series(file.path()).unwrap();
        assert_eq!(loaded[0].len(), 3);
        assert!(loaded[0].data[1].value.is_nan());
        assert_eq!(loaded[0].finite_values(), vec![1.0, 3.0]);
    }

    #[test]
    fn test_rfc3339_timestamps_accepted() {
        let file = write_csv(
            "series,timestamp,value\n\
             m,2026-01-01T09:30:00Z,1\n",
        );

        let loaded = load_series(file.path()).unwrap();
        assert_eq!(loaded[0].data[0].timestamp.to_rfc3339(), "2026-01-01T09:30:00+00:00");
    }

    #[test]
    fn test_bad_timestamp_is_an_error() {
        let file = write_csv("series,timestamp,value\nm,yesterday,1\n");
        assert!(load_series(file.path()).is_err());
    }

    #[test]
    fn test_empty_file_is_an_error() {
        let file = write_csv("series,timestamp,value\n");
        assert!(load_series(file.path()).is_err());
    }
}
