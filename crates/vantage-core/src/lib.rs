//! Vantage Core Library
//!
//! Stateless analytics engine that turns raw time-series observations
//! (stock levels, revenue, burn rate, arbitrary business metrics) into:
//! - Descriptive statistics
//! - Trend and seasonality characterization
//! - Statistically-grounded anomalies
//! - Multi-model forecasts with confidence bounds
//! - Cross-series correlations
//! - Benchmark comparisons
//! - Prioritized, human-readable insights and executive summaries
//!
//! Every component is a pure function of its inputs plus an
//! [`AnalysisConfig`]; the engine holds no state between calls, so callers
//! are free to run independent series on separate threads or tasks.

pub mod analysis;
pub mod anomaly;
pub mod benchmark;
pub mod correlation;
pub mod error;
pub mod forecast;
pub mod insights;
pub mod models;
pub mod stats;
pub mod summary;
pub mod trend;

pub use analysis::Analyzer;
pub use benchmark::BenchmarkInput;
pub use error::{Error, Result};
pub use insights::{InsightGenerator, Rule, RuleContext};
pub use models::{
    AnalysisConfig, AnalysisResult, Anomaly, AnomalyType, Benchmark, BenchmarkSource,
    BenchmarkTrend, Correlation, CorrelationDirection, CorrelationStrength, DataPoint, DataSeries,
    DescriptiveStats, ExecutiveSummary, ForecastModel, Insight, InsightMetric, InsightType,
    KeyMetric, MetricStatus, Percentiles, Performance, Period, Prediction, PredictionFactor,
    Priority, Seasonality, SeriesError, Severity, Trend, TrendDirection,
};
pub use summary::ExecutiveSummaryBuilder;
