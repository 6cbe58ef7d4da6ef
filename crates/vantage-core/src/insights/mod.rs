//! Insight Generator - rule-based synthesis of analytical results
//!
//! Turns the lower-level outputs (stats, trend, anomalies, predictions,
//! correlations, benchmarks) into prioritized, human-readable insights.
//! Each rule is an independent predicate-and-builder evaluated over a
//! shared read-only context; rules never see each other's output.
//!
//! ## Built-in rules
//!
//! - **AnomalyRule** - surfaces the worst high/critical anomaly
//! - **TrendRule** - surfaces a well-fitted directional trend
//! - **ForecastRule** - surfaces forecasts crossing material thresholds
//! - **CorrelationRule** - surfaces strong cross-series relationships
//! - **BenchmarkRule** - surfaces below/critical benchmark performance

pub mod engine;
pub mod rules;

pub use engine::{InsightGenerator, Rule, RuleContext};
pub use rules::{AnomalyRule, BenchmarkRule, CorrelationRule, ForecastRule, TrendRule};
