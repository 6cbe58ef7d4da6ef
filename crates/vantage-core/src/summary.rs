//! Executive summary builder - period-level report over an analysis result

use tracing::debug;

use crate::models::{
    AnalysisResult, ExecutiveSummary, InsightType, KeyMetric, MetricStatus, Period, Priority,
    Severity, TrendDirection,
};

/// Default number of insights surfaced at the top of the report
const DEFAULT_TOP_N: usize = 5;

/// Builds an [`ExecutiveSummary`] from an already-computed analysis result
pub struct ExecutiveSummaryBuilder {
    top_n: usize,
}

impl Default for ExecutiveSummaryBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl ExecutiveSummaryBuilder {
    pub fn new() -> Self {
        Self {
            top_n: DEFAULT_TOP_N,
        }
    }

    pub fn with_top_n(mut self, top_n: usize) -> Self {
        self.top_n = top_n;
        self
    }

    /// Aggregate the result into a period-level report.
    ///
    /// `top_insights` is always a subset of `result.insights`, ordered by
    /// priority then confidence.
    pub fn build(&self, result: &AnalysisResult, period: Period) -> ExecutiveSummary {
        let key_metrics = self.key_metrics(result);

        let mut top_insights = result.insights.clone();
        top_insights.sort_by(|a, b| {
            b.priority.rank().cmp(&a.priority.rank()).then_with(|| {
                b.confidence
                    .partial_cmp(&a.confidence)
                    .unwrap_or(std::cmp::Ordering::Equal)
            })
        });
        top_insights.truncate(self.top_n);

        let highlights: Vec<String> = top_insights.iter().take(3).map(|i| i.title.clone()).collect();

        // Risks: negatively framed anomaly/prediction insights
        let risks: Vec<String> = result
            .insights
            .iter()
            .filter(|i| {
                matches!(i.insight_type, InsightType::Anomaly | InsightType::Prediction)
                    && i.priority.rank() >= Priority::Warning.rank()
            })
            .map(|i| i.description.clone())
            .collect();

        // Opportunities: positively framed anomaly/prediction insights,
        // the mirror of the risk filter above
        let opportunities: Vec<String> = result
            .insights
            .iter()
            .filter(|i| {
                matches!(i.insight_type, InsightType::Anomaly | InsightType::Prediction)
                    && i.priority == Priority::Info
            })
            .map(|i| i.description.clone())
            .collect();

        let recommendations = self.recommendations(result);

        debug!(
            insights = top_insights.len(),
            risks = risks.len(),
            opportunities = opportunities.len(),
            "Executive summary built"
        );

        ExecutiveSummary {
            period,
            highlights,
            key_metrics,
            top_insights,
            risks,
            opportunities,
            recommendations,
        }
    }

    fn key_metrics(&self, result: &AnalysisResult) -> Vec<KeyMetric> {
        let mut metrics = Vec::new();

        for series in &result.series {
            let Some(stats) = result.stats.get(&series.id) else {
                continue;
            };
            let trend = result.trends.get(&series.id);
            let direction = trend.map(|t| t.direction);

            let has_critical = result
                .anomalies
                .iter()
                .any(|a| a.series_id == series.id && a.severity == Severity::Critical);

            let status = if has_critical {
                MetricStatus::Bad
            } else {
                match direction {
                    Some(TrendDirection::Increasing) if result.config.growth_is_good => {
                        MetricStatus::Good
                    }
                    Some(TrendDirection::Decreasing) if !result.config.growth_is_good => {
                        MetricStatus::Good
                    }
                    Some(TrendDirection::Increasing) | Some(TrendDirection::Decreasing) => {
                        MetricStatus::Bad
                    }
                    _ => MetricStatus::Neutral,
                }
            };

            metrics.push(KeyMetric {
                name: format!("{} (mean of {} points)", series.name, stats.count),
                value: stats.mean,
                status,
                trend: direction,
            });
        }

        metrics
    }

    /// Concatenate suggested actions and benchmark recommendations already
    /// present on source entities, first occurrence wins
    fn recommendations(&self, result: &AnalysisResult) -> Vec<String> {
        let mut seen = std::collections::HashSet::new();
        let mut recommendations = Vec::new();

        for action in result
            .anomalies
            .iter()
            .filter_map(|a| a.suggested_action.as_deref())
            .chain(
                result
                    .benchmarks
                    .iter()
                    .filter_map(|b| b.recommendation.as_deref()),
            )
        {
            if seen.insert(action.to_string()) {
                recommendations.push(action.to_string());
            }
        }

        recommendations
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::Analyzer;
    use crate::models::{AnalysisConfig, DataSeries};
    use chrono::{Duration, TimeZone, Utc};

    fn daily_series(id: &str, values: &[f64]) -> DataSeries {
        let start = Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap();
        DataSeries::from_values(id, id, start, Duration::days(1), values)
    }

    fn period() -> Period {
        let start = Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap();
        Period {
            start,
            end: start + Duration::days(60),
        }
    }

    #[test]
    fn test_top_insights_subset_and_order() {
        let mut values: Vec<f64> = (0..60).map(|i| 100.0 + 2.0 * i as f64).collect();
        values[30] = 2000.0;
        let series = vec![daily_series("revenue", &values)];
        let result = Analyzer::new(AnalysisConfig::default())
            .analyze(&series)
            .unwrap();

        let summary = ExecutiveSummaryBuilder::new().build(&result, period());

        assert!(summary.top_insights.len() <= 5);
        for insight in &summary.top_insights {
            assert!(result.insights.iter().any(|i| i.id == insight.id));
        }
        for w in summary.top_insights.windows(2) {
            assert!(w[0].priority.rank() >= w[1].priority.rank());
        }
    }

    #[test]
    fn test_key_metrics_cover_each_series() {
        let a = daily_series("a", &(0..20).map(|i| 10.0 + i as f64).collect::<Vec<_>>());
        let b = daily_series("b", &(0..20).map(|i| 50.0 - i as f64).collect::<Vec<_>>());
        let result = Analyzer::new(AnalysisConfig::default())
            .analyze(&[a, b])
            .unwrap();

        let summary = ExecutiveSummaryBuilder::new().build(&result, period());
        assert_eq!(summary.key_metrics.len(), 2);

        // Growth framed as good by default: rising series good, falling bad
        assert_eq!(summary.key_metrics[0].status, MetricStatus::Good);
        assert_eq!(summary.key_metrics[1].status, MetricStatus::Bad);
    }

    #[test]
    fn test_opportunities_drawn_from_anomaly_and_prediction_only() {
        // Clean growth produces an info-priority trend insight; it belongs
        // in key metrics, not the opportunities list
        let values: Vec<f64> = (0..30).map(|i| 100.0 + 5.0 * i as f64).collect();
        let series = vec![daily_series("growth", &values)];
        let result = Analyzer::new(AnalysisConfig::default())
            .analyze(&series)
            .unwrap();

        let trend_descriptions: Vec<&str> = result
            .insights
            .iter()
            .filter(|i| i.insight_type == InsightType::Trend)
            .map(|i| i.description.as_str())
            .collect();
        assert!(!trend_descriptions.is_empty());

        let summary = ExecutiveSummaryBuilder::new().build(&result, period());
        for desc in trend_descriptions {
            assert!(!summary.opportunities.iter().any(|o| o == desc));
        }
        for opportunity in &summary.opportunities {
            assert!(result.insights.iter().any(|i| {
                matches!(
                    i.insight_type,
                    InsightType::Anomaly | InsightType::Prediction
                ) && i.description == *opportunity
            }));
        }
    }

    #[test]
    fn test_recommendations_deduplicated() {
        let mut values: Vec<f64> = (0..80).map(|i| 10.0 + ((i % 2) as f64) * 0.2).collect();
        values[40] = 400.0;
        values[70] = 420.0;
        let series = vec![daily_series("spiky", &values)];
        let result = Analyzer::new(AnalysisConfig::default())
            .analyze(&series)
            .unwrap();

        let summary = ExecutiveSummaryBuilder::new().build(&result, period());
        let mut sorted = summary.recommendations.clone();
        sorted.sort();
        sorted.dedup();
        assert_eq!(sorted.len(), summary.recommendations.len());
    }

    #[test]
    fn test_top_n_is_configurable() {
        let mut values: Vec<f64> = (0..60).map(|i| 100.0 + 2.0 * i as f64).collect();
        values[30] = 2000.0;
        let series = vec![daily_series("revenue", &values)];
        let result = Analyzer::new(AnalysisConfig::default())
            .analyze(&series)
            .unwrap();

        let summary = ExecutiveSummaryBuilder::new()
            .with_top_n(1)
            .build(&result, period());
        assert!(summary.top_insights.len() <= 1);
    }
}
