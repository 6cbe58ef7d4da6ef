//! Per-point deviation scoring against a global baseline
//!
//! Flags:
//! - Spikes/drops: z-score beyond the configured threshold, continuing the
//!   move from the previous point
//! - Outliers: isolated extreme values
//! - Trend breaks: sharp departures from a short rolling regression even
//!   when the global z-score is moderate
//! - Missing data: timestamp gaps larger than the series' modal interval

use std::collections::HashMap;
use std::collections::HashSet;

use tracing::debug;

use crate::error::{Error, Result};
use crate::models::{AnalysisConfig, Anomaly, AnomalyType, DataSeries, Severity};
use crate::stats;
use crate::trend::linear_fit;

/// Points in the short rolling regression used for trend-break detection
const TREND_BREAK_WINDOW: usize = 5;

/// Gaps must exceed the modal interval by this factor to count as missing
/// data (tolerates clock jitter)
const GAP_TOLERANCE: f64 = 1.5;

/// Scan a series for anomalous points.
///
/// Needs at least 2 present observations to establish a baseline. A
/// zero-variance series cannot host anomalies and yields an empty result
/// rather than an error.
pub fn detect(series: &DataSeries, config: &AnalysisConfig) -> Result<Vec<Anomaly>> {
    let present: Vec<(usize, f64)> = series
        .data
        .iter()
        .enumerate()
        .filter(|(_, p)| p.is_present())
        .map(|(i, p)| (i, p.value))
        .collect();

    if present.len() < 2 {
        return Err(Error::InsufficientData(format!(
            "series '{}' has {} present points, need at least 2 for a baseline",
            series.id,
            present.len()
        )));
    }

    let values: Vec<f64> = present.iter().map(|&(_, v)| v).collect();
    let stats = stats::describe(&values)?;

    if stats.std_dev <= f64::EPSILON {
        debug!(series = %series.id, "Zero-variance series, no anomalies possible");
        return Ok(Vec::new());
    }

    let fit = linear_fit(&values);
    let threshold = config.anomaly_threshold;
    let n = values.len() as f64;
    let modal_gap = modal_interval_secs(series);

    let mut anomalies = Vec::new();
    let mut flagged: HashSet<usize> = HashSet::new();

    for (pos, &(data_idx, value)) in present.iter().enumerate() {
        let point = &series.data[data_idx];
        let expected = fit.predict(pos as f64);

        // Gap before this point; flagged on the observation that ended it,
        // so the anomaly carries that point's real value
        if let Some(modal) = modal_gap {
            if pos > 0 {
                let prev_ts = series.data[present[pos - 1].0].timestamp;
                let gap = (point.timestamp - prev_ts).num_seconds();
                if gap as f64 > modal as f64 * GAP_TOLERANCE {
                    anomalies.push(missing_anomaly(
                        series,
                        point.timestamp,
                        value,
                        expected,
                        gap,
                        modal,
                    ));
                }
            }
        }

        let z = (value - stats.mean) / stats.std_dev;
        let prev_value = if pos > 0 { Some(present[pos - 1].1) } else { None };

        if z.abs() > threshold {
            let anomaly_type = match prev_value {
                Some(prev) if z > 0.0 && value > prev => AnomalyType::Spike,
                Some(prev) if z < 0.0 && value < prev => AnomalyType::Drop,
                _ => AnomalyType::Outlier,
            };
            let ratio = z.abs() / threshold;
            let severity = severity_from_ratio(ratio);
            let confidence = score_confidence(ratio, n);

            anomalies.push(Anomaly {
                id: format!("anomaly:{}:{}", series.id, point.timestamp.timestamp()),
                series_id: series.id.clone(),
                timestamp: point.timestamp,
                value,
                expected_value: expected,
                deviation: percent_deviation(value, expected),
                severity,
                anomaly_type,
                confidence,
                description: describe_deviation(series, anomaly_type, value, z, expected),
                suggested_action: suggest_action(series, anomaly_type, severity),
            });
            flagged.insert(pos);
            continue;
        }

        // Moderate global z-score can still break the local trend
        if pos >= TREND_BREAK_WINDOW {
            let window_start = pos - TREND_BREAK_WINDOW;
            // A freshly flagged extreme inside the window would poison the
            // local fit and cascade false positives
            if (window_start..pos).any(|i| flagged.contains(&i)) {
                continue;
            }
            let window: Vec<f64> = values[window_start..pos].to_vec();
            let local = linear_fit(&window);
            let predicted = local.predict(TREND_BREAK_WINDOW as f64);
            let residual_z = (value - predicted).abs() / stats.std_dev;
            if residual_z > threshold {
                let ratio = residual_z / threshold;
                let severity = severity_from_ratio(ratio);
                anomalies.push(Anomaly {
                    id: format!("anomaly:{}:{}", series.id, point.timestamp.timestamp()),
                    series_id: series.id.clone(),
                    timestamp: point.timestamp,
                    value,
                    expected_value: predicted,
                    deviation: percent_deviation(value, predicted),
                    severity,
                    anomaly_type: AnomalyType::TrendBreak,
                    confidence: score_confidence(ratio, n),
                    description: format!(
                        "{} broke from its local trend: {:.2} observed vs {:.2} projected",
                        series.name, value, predicted
                    ),
                    suggested_action: suggest_action(series, AnomalyType::TrendBreak, severity),
                });
                flagged.insert(pos);
            }
        }
    }

    debug!(
        series = %series.id,
        count = anomalies.len(),
        "Anomaly detection complete"
    );
    Ok(anomalies)
}

/// Most common rounded gap between consecutive timestamps, in seconds
pub(crate) fn modal_interval_secs(series: &DataSeries) -> Option<i64> {
    if series.data.len() < 3 {
        return None;
    }
    let mut counts: HashMap<i64, usize> = HashMap::new();
    for w in series.data.windows(2) {
        let gap = (w[1].timestamp - w[0].timestamp).num_seconds();
        if gap > 0 {
            *counts.entry(gap).or_insert(0) += 1;
        }
    }
    counts
        .into_iter()
        .max_by_key(|&(gap, count)| (count, std::cmp::Reverse(gap)))
        .map(|(gap, _)| gap)
}

/// The anomaly describes the gap but is pinned to the observation that
/// ended it, so value/expected stay finite.
fn missing_anomaly(
    series: &DataSeries,
    timestamp: chrono::DateTime<chrono::Utc>,
    value: f64,
    expected: f64,
    gap_secs: i64,
    modal_secs: i64,
) -> Anomaly {
    let ratio = gap_secs as f64 / modal_secs as f64;
    let severity = if ratio < 3.0 {
        Severity::Low
    } else if ratio < 5.0 {
        Severity::Medium
    } else if ratio < 10.0 {
        Severity::High
    } else {
        Severity::Critical
    };
    Anomaly {
        id: format!("anomaly:{}:{}:gap", series.id, timestamp.timestamp()),
        series_id: series.id.clone(),
        timestamp,
        value,
        expected_value: expected,
        deviation: percent_deviation(value, expected),
        severity,
        anomaly_type: AnomalyType::Missing,
        // Timestamps are exact, so gap detection is near-certain
        confidence: 0.95,
        description: format!(
            "{} has a {:.1}x gap before this point ({}s vs the usual {}s)",
            series.name, ratio, gap_secs, modal_secs
        ),
        suggested_action: Some(format!(
            "Backfill the missing observations in {} or confirm collection was intentionally paused",
            series.name
        )),
    }
}

/// low < 1.5x threshold, medium < 2x, high < 3x, else critical
fn severity_from_ratio(ratio: f64) -> Severity {
    if ratio < 1.5 {
        Severity::Low
    } else if ratio < 2.0 {
        Severity::Medium
    } else if ratio < 3.0 {
        Severity::High
    } else {
        Severity::Critical
    }
}

/// Grows with the deviation ratio and the sample size, capped at 1
fn score_confidence(ratio: f64, n: f64) -> f64 {
    let deviation_part = (ratio / 3.0).min(1.0);
    let sample_part = n / (n + 10.0);
    (deviation_part * sample_part).min(1.0)
}

fn percent_deviation(value: f64, expected: f64) -> f64 {
    if expected.abs() > f64::EPSILON {
        (value - expected) / expected.abs() * 100.0
    } else {
        0.0
    }
}

fn describe_deviation(
    series: &DataSeries,
    anomaly_type: AnomalyType,
    value: f64,
    z: f64,
    expected: f64,
) -> String {
    let direction = if z > 0.0 { "above" } else { "below" };
    match anomaly_type {
        AnomalyType::Spike => format!(
            "{} spiked to {:.2}, {:.1} standard deviations {} the baseline (expected {:.2})",
            series.name,
            value,
            z.abs(),
            direction,
            expected
        ),
        AnomalyType::Drop => format!(
            "{} dropped to {:.2}, {:.1} standard deviations {} the baseline (expected {:.2})",
            series.name,
            value,
            z.abs(),
            direction,
            expected
        ),
        _ => format!(
            "{} recorded an isolated extreme of {:.2}, {:.1} standard deviations {} the baseline",
            series.name,
            value,
            z.abs(),
            direction
        ),
    }
}

fn suggest_action(
    series: &DataSeries,
    anomaly_type: AnomalyType,
    severity: Severity,
) -> Option<String> {
    if severity.priority() < Severity::High.priority() {
        return None;
    }
    let action = match anomaly_type {
        AnomalyType::Spike => format!("Investigate what drove the sudden increase in {}", series.name),
        AnomalyType::Drop => format!("Investigate what caused the sharp fall in {}", series.name),
        AnomalyType::Outlier => format!("Verify the extreme reading in {} is not a data error", series.name),
        AnomalyType::TrendBreak => format!("Review recent changes affecting {}", series.name),
        AnomalyType::Missing => return None, // handled at construction
    };
    Some(action)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone, Utc};

    fn daily_series(id: &str, values: &[f64]) -> DataSeries {
        let start = Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap();
        DataSeries::from_values(id, id, start, Duration::days(1), values)
    }

    #[test]
    fn test_too_short_fails() {
        let series = daily_series("s", &[1.0]);
        assert!(matches!(
            detect(&series, &AnalysisConfig::default()),
            Err(Error::InsufficientData(_))
        ));
    }

    #[test]
    fn test_constant_series_has_no_anomalies() {
        let series = daily_series("flat", &[5.0; 30]);
        let anomalies = detect(&series, &AnalysisConfig::default()).unwrap();
        assert!(anomalies.is_empty());
    }

    #[test]
    fn test_extreme_point_is_critical_spike() {
        // Near-flat baseline with one extreme far beyond it
        let mut values: Vec<f64> = (0..60)
            .map(|i| 10.0 + if i % 2 == 0 { 0.1 } else { -0.1 })
            .collect();
        values.push(200.0);
        let series = daily_series("burst", &values);

        let anomalies = detect(&series, &AnalysisConfig::default()).unwrap();
        assert_eq!(anomalies.len(), 1);
        let anomaly = &anomalies[0];
        assert_eq!(anomaly.severity, Severity::Critical);
        assert!(matches!(
            anomaly.anomaly_type,
            AnomalyType::Spike | AnomalyType::Outlier
        ));
        assert!((anomaly.value - 200.0).abs() < 1e-9);
        assert!(anomaly.confidence > 0.5);
    }

    #[test]
    fn test_drop_classification() {
        let mut values: Vec<f64> = (0..60)
            .map(|i| 100.0 + if i % 2 == 0 { 0.5 } else { -0.5 })
            .collect();
        values.push(-500.0);
        let series = daily_series("crash", &values);

        let anomalies = detect(&series, &AnalysisConfig::default()).unwrap();
        assert_eq!(anomalies.len(), 1);
        assert_eq!(anomalies[0].anomaly_type, AnomalyType::Drop);
        assert!(anomalies[0].deviation < 0.0);
    }

    #[test]
    fn test_timestamp_gap_reported_missing() {
        let start = Utc.with_ymd_and_hms(2026, 3, 1, 0, 0, 0).unwrap();
        let mut series = DataSeries::new("gappy", "Gappy");
        for i in 0..10 {
            series.push(start + Duration::days(i), 10.0 + (i % 3) as f64);
        }
        // Five-day hole, then resume
        for i in 0..5 {
            series.push(start + Duration::days(15 + i), 10.0 + (i % 3) as f64);
        }

        let anomalies = detect(&series, &AnalysisConfig::default()).unwrap();
        let missing: Vec<_> = anomalies
            .iter()
            .filter(|a| a.anomaly_type == AnomalyType::Missing)
            .collect();
        assert_eq!(missing.len(), 1);
        assert_eq!(
            missing[0].timestamp,
            start + Duration::days(15)
        );
        assert!(missing[0].suggested_action.is_some());
        // The point that ended the gap gives the anomaly real numbers
        assert!((missing[0].value - 10.0).abs() < 1e-9);
        assert!(missing[0].expected_value.is_finite());
        assert!(missing[0].deviation.is_finite());
    }

    #[test]
    fn test_anomalies_ordered_by_timestamp() {
        let mut values: Vec<f64> = (0..80).map(|i| 50.0 + (i % 5) as f64).collect();
        values[20] = 500.0;
        values[60] = -400.0;
        let series = daily_series("two", &values);

        let anomalies = detect(&series, &AnalysisConfig::default()).unwrap();
        assert!(anomalies.len() >= 2);
        for w in anomalies.windows(2) {
            assert!(w[0].timestamp <= w[1].timestamp);
        }
    }

    #[test]
    fn test_ids_are_deterministic() {
        let mut values: Vec<f64> = (0..60).map(|i| 10.0 + (i % 2) as f64 * 0.2).collect();
        values.push(300.0);
        let series = daily_series("idem", &values);

        let first = detect(&series, &AnalysisConfig::default()).unwrap();
        let second = detect(&series, &AnalysisConfig::default()).unwrap();
        let first_ids: Vec<_> = first.iter().map(|a| a.id.clone()).collect();
        let second_ids: Vec<_> = second.iter().map(|a| a.id.clone()).collect();
        assert_eq!(first_ids, second_ids);
    }
}
