//! Insight generation engine - orchestrates rule evaluation

use tracing::debug;

use crate::models::{
    AnalysisConfig, Anomaly, Benchmark, Correlation, DataSeries, DescriptiveStats, Insight,
    Prediction, Trend,
};

use super::rules::{AnomalyRule, BenchmarkRule, CorrelationRule, ForecastRule, TrendRule};

/// Read-only context shared by all insight rules for one series
pub struct RuleContext<'a> {
    pub series: &'a DataSeries,
    pub stats: &'a DescriptiveStats,
    pub trend: &'a Trend,
    pub anomalies: &'a [Anomaly],
    pub predictions: &'a [Prediction],
    /// Correlations involving any analyzed series, not just this one
    pub correlations: &'a [Correlation],
    pub benchmarks: &'a [Benchmark],
    pub config: &'a AnalysisConfig,
}

/// An independent insight rule: one predicate, at most one insight
pub trait Rule: Send + Sync {
    /// Stable identifier for logging
    fn id(&self) -> &'static str;

    /// Evaluate the rule against the shared context
    fn evaluate(&self, ctx: &RuleContext<'_>) -> Option<Insight>;
}

/// The main generator that runs all registered rules
pub struct InsightGenerator {
    rules: Vec<Box<dyn Rule>>,
}

impl Default for InsightGenerator {
    fn default() -> Self {
        Self::new()
    }
}

impl InsightGenerator {
    /// Create a generator with the built-in rule set
    pub fn new() -> Self {
        let mut generator = Self { rules: vec![] };

        generator.register(Box::new(AnomalyRule));
        generator.register(Box::new(TrendRule));
        generator.register(Box::new(ForecastRule));
        generator.register(Box::new(CorrelationRule));
        generator.register(Box::new(BenchmarkRule));

        generator
    }

    /// Register an additional rule
    pub fn register(&mut self, rule: Box<dyn Rule>) {
        self.rules.push(rule);
    }

    /// Evaluate every rule, drop low-confidence insights, deduplicate, and
    /// sort by priority (highest first) then recency
    pub fn generate(&self, ctx: &RuleContext<'_>) -> Vec<Insight> {
        let mut insights = Vec::new();

        for rule in &self.rules {
            match rule.evaluate(ctx) {
                Some(insight) => {
                    if insight.confidence < ctx.config.insight_min_confidence {
                        debug!(
                            rule = rule.id(),
                            confidence = insight.confidence,
                            "Insight below confidence floor, dropped"
                        );
                        continue;
                    }
                    debug!(rule = rule.id(), id = %insight.id, "Insight emitted");
                    insights.push(insight);
                }
                None => {
                    debug!(rule = rule.id(), "Rule produced no insight");
                }
            }
        }

        dedup_and_sort(insights)
    }

    /// Ids of the registered rules
    pub fn rule_ids(&self) -> Vec<&'static str> {
        self.rules.iter().map(|r| r.id()).collect()
    }
}

/// Deduplicate by insight id, then order by priority, recency, id
pub(crate) fn dedup_and_sort(mut insights: Vec<Insight>) -> Vec<Insight> {
    let mut seen = std::collections::HashSet::new();
    insights.retain(|i| seen.insert(i.id.clone()));
    insights.sort_by(|a, b| {
        b.priority
            .rank()
            .cmp(&a.priority.rank())
            .then_with(|| b.generated_at.cmp(&a.generated_at))
            .then_with(|| a.id.cmp(&b.id))
    });
    insights
}
