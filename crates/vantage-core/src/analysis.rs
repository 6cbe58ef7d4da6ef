//! Full-pipeline orchestration
//!
//! Runs statistics, trend, anomaly, and forecast analysis per series, then
//! pairwise correlation, then insight generation. Configuration problems
//! fail fast before any work; per-series data problems are captured in the
//! result so one short series never aborts a whole batch.

use chrono::Utc;
use std::collections::BTreeMap;
use tracing::{debug, info, warn};

use crate::benchmark::{self, BenchmarkInput};
use crate::error::Result;
use crate::insights::{engine::dedup_and_sort, InsightGenerator, RuleContext};
use crate::models::{
    AnalysisConfig, AnalysisResult, Anomaly, Benchmark, Correlation, DataSeries, Insight,
    Prediction, SeriesError,
};
use crate::{anomaly, correlation, forecast, stats, trend};

/// Stateless analysis pipeline: a pure function of its inputs plus config
pub struct Analyzer {
    config: AnalysisConfig,
    generator: InsightGenerator,
}

impl Analyzer {
    pub fn new(config: AnalysisConfig) -> Self {
        Self {
            config,
            generator: InsightGenerator::new(),
        }
    }

    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    /// Analyze a batch of series with no benchmark comparisons
    pub fn analyze(&self, series: &[DataSeries]) -> Result<AnalysisResult> {
        self.analyze_with_benchmarks(series, &[])
    }

    /// Analyze a batch of series plus caller-supplied benchmark comparisons.
    ///
    /// Config validation errors surface immediately; insufficient data on an
    /// individual series is reported in `AnalysisResult::errors` alongside
    /// the successful series.
    pub fn analyze_with_benchmarks(
        &self,
        series: &[DataSeries],
        benchmark_inputs: &[BenchmarkInput],
    ) -> Result<AnalysisResult> {
        self.config.validate()?;

        let mut stats_by_series = BTreeMap::new();
        let mut trends_by_series = BTreeMap::new();
        let mut anomalies: Vec<Anomaly> = Vec::new();
        let mut predictions: Vec<Prediction> = Vec::new();
        let mut errors: Vec<SeriesError> = Vec::new();

        for s in series {
            let finite = s.finite_values();
            let series_stats = match stats::describe(&finite) {
                Ok(stats) => stats,
                Err(e) => {
                    warn!(series = %s.id, error = %e, "Series skipped");
                    errors.push(SeriesError {
                        series_id: s.id.clone(),
                        error: e.to_string(),
                    });
                    continue;
                }
            };
            trends_by_series.insert(s.id.clone(), trend::analyze(&finite, &self.config));
            stats_by_series.insert(s.id.clone(), series_stats);

            match anomaly::detect(s, &self.config) {
                Ok(found) => anomalies.extend(found),
                Err(e) => errors.push(SeriesError {
                    series_id: s.id.clone(),
                    error: e.to_string(),
                }),
            }

            match forecast::predict(s, self.config.prediction_horizon, None, &self.config) {
                Ok(found) => predictions.extend(found),
                Err(e) => errors.push(SeriesError {
                    series_id: s.id.clone(),
                    error: e.to_string(),
                }),
            }

            debug!(series = %s.id, "Series analysis complete");
        }

        let correlations = self.correlate_pairs(series, &stats_by_series, &mut errors);

        let benchmarks: Vec<Benchmark> = benchmark_inputs
            .iter()
            .map(|input| benchmark::compare(input, None))
            .collect();

        let insights = self.generate_insights(
            series,
            &stats_by_series,
            &trends_by_series,
            &anomalies,
            &predictions,
            &correlations,
            &benchmarks,
        );

        info!(
            series = series.len(),
            anomalies = anomalies.len(),
            correlations = correlations.len(),
            insights = insights.len(),
            errors = errors.len(),
            "Analysis complete"
        );

        let ids: Vec<&str> = series.iter().map(|s| s.id.as_str()).collect();
        Ok(AnalysisResult {
            id: format!("analysis:{}", ids.join("+")),
            analyzed_at: Utc::now(),
            config: self.config.clone(),
            series: series.to_vec(),
            stats: stats_by_series,
            trends: trends_by_series,
            anomalies,
            predictions,
            correlations,
            insights,
            benchmarks,
            summary: None,
            errors,
        })
    }

    /// Correlate every unordered pair of series that passed basic analysis
    fn correlate_pairs(
        &self,
        series: &[DataSeries],
        stats: &BTreeMap<String, crate::models::DescriptiveStats>,
        errors: &mut Vec<SeriesError>,
    ) -> Vec<Correlation> {
        let mut correlations = Vec::new();
        for (i, a) in series.iter().enumerate() {
            if !stats.contains_key(&a.id) {
                continue;
            }
            for b in series[i + 1..].iter().filter(|b| stats.contains_key(&b.id)) {
                match correlation::correlate(a, b, &self.config) {
                    Ok(Some(found)) => correlations.push(found),
                    Ok(None) => {}
                    Err(e) => errors.push(SeriesError {
                        series_id: format!("{}:{}", a.id, b.id),
                        error: e.to_string(),
                    }),
                }
            }
        }
        correlations
    }

    #[allow(clippy::too_many_arguments)]
    fn generate_insights(
        &self,
        series: &[DataSeries],
        stats: &BTreeMap<String, crate::models::DescriptiveStats>,
        trends: &BTreeMap<String, crate::models::Trend>,
        anomalies: &[Anomaly],
        predictions: &[Prediction],
        correlations: &[Correlation],
        benchmarks: &[Benchmark],
    ) -> Vec<Insight> {
        let mut insights = Vec::new();

        for s in series {
            let (Some(series_stats), Some(series_trend)) = (stats.get(&s.id), trends.get(&s.id))
            else {
                continue;
            };
            let series_anomalies: Vec<Anomaly> = anomalies
                .iter()
                .filter(|a| a.series_id == s.id)
                .cloned()
                .collect();
            let series_predictions: Vec<Prediction> = predictions
                .iter()
                .filter(|p| p.series_id == s.id)
                .cloned()
                .collect();

            let ctx = RuleContext {
                series: s,
                stats: series_stats,
                trend: series_trend,
                anomalies: &series_anomalies,
                predictions: &series_predictions,
                correlations,
                benchmarks,
                config: &self.config,
            };
            insights.extend(self.generator.generate(&ctx));
        }

        // Cross-series rules (correlation, benchmark) fire once per involved
        // series; collapse them to one insight each
        dedup_and_sort(insights)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::InsightType;
    use chrono::{Duration, TimeZone};

    fn daily_series(id: &str, values: &[f64]) -> DataSeries {
        let start = Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap();
        DataSeries::from_values(id, id, start, Duration::days(1), values)
    }

    #[test]
    fn test_invalid_config_fails_fast() {
        let analyzer = Analyzer::new(AnalysisConfig {
            anomaly_threshold: -1.0,
            ..Default::default()
        });
        let series = vec![daily_series("s", &[1.0, 2.0, 3.0])];
        assert!(matches!(
            analyzer.analyze(&series),
            Err(crate::Error::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_short_series_reported_not_fatal() {
        let good = daily_series("good", &(0..30).map(|i| 10.0 + i as f64).collect::<Vec<_>>());
        let bad = daily_series("bad", &[]);

        let result = Analyzer::new(AnalysisConfig::default())
            .analyze(&[good, bad])
            .unwrap();

        assert!(result.stats.contains_key("good"));
        assert!(!result.stats.contains_key("bad"));
        assert_eq!(result.errors.len(), 1);
        assert_eq!(result.errors[0].series_id, "bad");
        assert!(!result.predictions.is_empty());
    }

    #[test]
    fn test_correlated_pair_produces_comparison_insight() {
        let a = daily_series("a", &(0..30).map(|i| 10.0 + 2.0 * i as f64).collect::<Vec<_>>());
        let b = daily_series("b", &(0..30).map(|i| 5.0 + 6.0 * i as f64).collect::<Vec<_>>());

        let result = Analyzer::new(AnalysisConfig::default())
            .analyze(&[a, b])
            .unwrap();

        assert_eq!(result.correlations.len(), 1);
        let comparisons: Vec<_> = result
            .insights
            .iter()
            .filter(|i| i.insight_type == InsightType::Comparison)
            .collect();
        // Both series see the same correlation; dedup keeps one insight
        assert_eq!(comparisons.len(), 1);
    }

    #[test]
    fn test_result_ids_are_deterministic() {
        let series =
            vec![daily_series("m", &(0..30).map(|i| 10.0 + i as f64).collect::<Vec<_>>())];
        let analyzer = Analyzer::new(AnalysisConfig::default());

        let first = analyzer.analyze(&series).unwrap();
        let second = analyzer.analyze(&series).unwrap();

        assert_eq!(first.id, second.id);
        let first_insight_ids: Vec<_> = first.insights.iter().map(|i| &i.id).collect();
        let second_insight_ids: Vec<_> = second.insights.iter().map(|i| &i.id).collect();
        assert_eq!(first_insight_ids, second_insight_ids);
        let first_prediction_values: Vec<_> =
            first.predictions.iter().map(|p| p.predicted_value).collect();
        let second_prediction_values: Vec<_> =
            second.predictions.iter().map(|p| p.predicted_value).collect();
        assert_eq!(first_prediction_values, second_prediction_values);
    }

    #[test]
    fn test_benchmarks_flow_into_insights() {
        let series =
            vec![daily_series("revenue", &(0..30).map(|i| 50.0 + i as f64).collect::<Vec<_>>())];
        let inputs = vec![BenchmarkInput {
            metric: "revenue".to_string(),
            current_value: 79.0,
            benchmark_value: 120.0,
            source: crate::models::BenchmarkSource::Target,
            higher_is_better: true,
        }];

        let result = Analyzer::new(AnalysisConfig::default())
            .analyze_with_benchmarks(&series, &inputs)
            .unwrap();

        assert_eq!(result.benchmarks.len(), 1);
        assert!(result
            .insights
            .iter()
            .any(|i| i.insight_type == InsightType::Recommendation));
    }
}
