//! Core data model for the analytics engine
//!
//! Everything here is an immutable value object: the engine computes these
//! from caller-supplied series and returns them without retaining state.
//! Closed tag enums (anomaly type, severity, strength, ...) serialize as
//! snake_case strings because downstream consumers switch on them.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use crate::error::{Error, Result};

// ---------------------------------------------------------------------------
// Series
// ---------------------------------------------------------------------------

/// A single observation in a time series
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataPoint {
    pub timestamp: DateTime<Utc>,
    /// Observed value; non-finite values are treated as missing
    pub value: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<serde_json::Value>,
}

impl DataPoint {
    pub fn new(timestamp: DateTime<Utc>, value: f64) -> Self {
        Self {
            timestamp,
            value,
            label: None,
            metadata: None,
        }
    }

    /// Whether the observation carries a usable value
    pub fn is_present(&self) -> bool {
        self.value.is_finite()
    }
}

/// An ordered, timestamped sequence of numeric observations
///
/// Invariant: timestamps are non-decreasing. Duplicate timestamps are
/// permitted and not deduplicated by the engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataSeries {
    pub id: String,
    pub name: String,
    pub data: Vec<DataPoint>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
}

impl DataSeries {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            data: Vec::new(),
            unit: None,
            color: None,
        }
    }

    /// Build a series from plain values spaced `step` apart starting at `start`
    pub fn from_values(
        id: impl Into<String>,
        name: impl Into<String>,
        start: DateTime<Utc>,
        step: Duration,
        values: &[f64],
    ) -> Self {
        let mut series = Self::new(id, name);
        for (i, &v) in values.iter().enumerate() {
            series.data.push(DataPoint::new(start + step * i as i32, v));
        }
        series
    }

    pub fn push(&mut self, timestamp: DateTime<Utc>, value: f64) {
        self.data.push(DataPoint::new(timestamp, value));
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// All values in order, including non-finite placeholders
    pub fn values(&self) -> Vec<f64> {
        self.data.iter().map(|p| p.value).collect()
    }

    /// Values with missing (non-finite) observations excluded
    pub fn finite_values(&self) -> Vec<f64> {
        self.data
            .iter()
            .filter(|p| p.is_present())
            .map(|p| p.value)
            .collect()
    }
}

// ---------------------------------------------------------------------------
// Descriptive statistics
// ---------------------------------------------------------------------------

/// Interpolated percentiles of a sample
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Percentiles {
    pub p25: f64,
    pub p50: f64,
    pub p75: f64,
    pub p90: f64,
    pub p95: f64,
    pub p99: f64,
}

/// Descriptive statistics over one series, computed once per analysis call
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DescriptiveStats {
    pub count: usize,
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    pub median: f64,
    /// Sample standard deviation (Bessel-corrected)
    pub std_dev: f64,
    pub variance: f64,
    pub skewness: f64,
    pub kurtosis: f64,
    pub percentiles: Percentiles,
}

// ---------------------------------------------------------------------------
// Trend
// ---------------------------------------------------------------------------

/// Direction classification of a fitted trend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrendDirection {
    Increasing,
    Decreasing,
    Stable,
    Volatile,
}

impl TrendDirection {
    pub fn as_str(&self) -> &'static str {
        match self {
            TrendDirection::Increasing => "increasing",
            TrendDirection::Decreasing => "decreasing",
            TrendDirection::Stable => "stable",
            TrendDirection::Volatile => "volatile",
        }
    }
}

impl fmt::Display for TrendDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Detected seasonal structure in a series
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Seasonality {
    pub detected: bool,
    /// Period in observations (e.g. 7 for weekly on daily data)
    pub period: usize,
    /// Half-range of the seasonal component after detrending
    pub amplitude: f64,
    /// Autocorrelation at the detected period
    pub strength: f64,
}

/// Regression-based trend characterization
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Trend {
    pub direction: TrendDirection,
    pub slope: f64,
    pub r_squared: f64,
    /// Mean of consecutive relative differences
    pub change_rate: f64,
    /// Slope of the consecutive-relative-difference series
    pub acceleration: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seasonality: Option<Seasonality>,
}

// ---------------------------------------------------------------------------
// Anomalies
// ---------------------------------------------------------------------------

/// Severity of a detected anomaly
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Low,
    Medium,
    High,
    Critical,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Low => "low",
            Severity::Medium => "medium",
            Severity::High => "high",
            Severity::Critical => "critical",
        }
    }

    /// Numeric priority for sorting (higher = more severe)
    pub fn priority(&self) -> u8 {
        match self {
            Severity::Low => 1,
            Severity::Medium => 2,
            Severity::High => 3,
            Severity::Critical => 4,
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Severity {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "low" => Ok(Severity::Low),
            "medium" => Ok(Severity::Medium),
            "high" => Ok(Severity::High),
            "critical" => Ok(Severity::Critical),
            _ => Err(format!("Unknown severity: {}", s)),
        }
    }
}

/// Kind of deviation an anomaly represents
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnomalyType {
    /// Upward deviation continuing from the previous point
    Spike,
    /// Downward deviation continuing from the previous point
    Drop,
    /// Isolated extreme value with unremarkable neighbors
    Outlier,
    /// Sharp departure from the locally fitted trend
    TrendBreak,
    /// Timestamp gap larger than the series' modal interval
    Missing,
}

impl AnomalyType {
    pub fn as_str(&self) -> &'static str {
        match self {
            AnomalyType::Spike => "spike",
            AnomalyType::Drop => "drop",
            AnomalyType::Outlier => "outlier",
            AnomalyType::TrendBreak => "trend_break",
            AnomalyType::Missing => "missing",
        }
    }
}

impl fmt::Display for AnomalyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A single flagged observation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Anomaly {
    /// Deterministic key, e.g. "anomaly:revenue:1700000000"
    pub id: String,
    pub series_id: String,
    pub timestamp: DateTime<Utc>,
    pub value: f64,
    /// Trend-fitted or mean value at this timestamp
    pub expected_value: f64,
    /// Percent difference from the expected value
    pub deviation: f64,
    pub severity: Severity,
    #[serde(rename = "type")]
    pub anomaly_type: AnomalyType,
    /// Confidence in [0, 1], growing with deviation and sample size
    pub confidence: f64,
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggested_action: Option<String>,
}

// ---------------------------------------------------------------------------
// Predictions
// ---------------------------------------------------------------------------

/// Forecasting model family
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ForecastModel {
    Linear,
    Polynomial,
    Exponential,
    Seasonal,
}

impl ForecastModel {
    pub fn as_str(&self) -> &'static str {
        match self {
            ForecastModel::Linear => "linear",
            ForecastModel::Polynomial => "polynomial",
            ForecastModel::Exponential => "exponential",
            ForecastModel::Seasonal => "seasonal",
        }
    }
}

impl fmt::Display for ForecastModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Named, purely explanatory contribution weight attached to a prediction
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PredictionFactor {
    pub name: String,
    pub weight: f64,
}

/// One forecast step
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Prediction {
    pub id: String,
    pub series_id: String,
    pub target_date: DateTime<Utc>,
    pub predicted_value: f64,
    /// lower_bound <= predicted_value <= upper_bound always holds
    pub lower_bound: f64,
    pub upper_bound: f64,
    /// Confidence in [0, 1], non-increasing with forecast distance
    pub confidence: f64,
    pub model: ForecastModel,
    pub factors: Vec<PredictionFactor>,
}

// ---------------------------------------------------------------------------
// Correlations
// ---------------------------------------------------------------------------

/// Strength bucket derived from |coefficient|
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CorrelationStrength {
    Weak,
    Moderate,
    Strong,
    VeryStrong,
}

impl CorrelationStrength {
    /// Bucket a coefficient by absolute value: weak <0.3, moderate <0.5,
    /// strong <0.7, very_strong >=0.7
    pub fn from_coefficient(coefficient: f64) -> Self {
        let abs = coefficient.abs();
        if abs >= 0.7 {
            CorrelationStrength::VeryStrong
        } else if abs >= 0.5 {
            CorrelationStrength::Strong
        } else if abs >= 0.3 {
            CorrelationStrength::Moderate
        } else {
            CorrelationStrength::Weak
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            CorrelationStrength::Weak => "weak",
            CorrelationStrength::Moderate => "moderate",
            CorrelationStrength::Strong => "strong",
            CorrelationStrength::VeryStrong => "very_strong",
        }
    }
}

impl fmt::Display for CorrelationStrength {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Sign of the correlation coefficient
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CorrelationDirection {
    Positive,
    Negative,
}

/// A discovered pairwise relationship between two series
///
/// The coefficient is symmetric; the id pair is reported in canonical
/// (lexicographic) order only. `causality_hint` is a heuristic label,
/// never a statistical causality claim.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Correlation {
    pub id: String,
    pub series1: String,
    pub series2: String,
    /// Pearson coefficient in [-1, 1]
    pub coefficient: f64,
    pub strength: CorrelationStrength,
    pub direction: CorrelationDirection,
    /// Best lag offset when a lag window was searched; 0 means unlagged won
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lag_days: Option<i64>,
    pub interpretation: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub causality_hint: Option<String>,
}

// ---------------------------------------------------------------------------
// Insights
// ---------------------------------------------------------------------------

/// Category of a generated insight
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InsightType {
    Anomaly,
    Trend,
    Prediction,
    Comparison,
    Recommendation,
}

impl InsightType {
    pub fn as_str(&self) -> &'static str {
        match self {
            InsightType::Anomaly => "anomaly",
            InsightType::Trend => "trend",
            InsightType::Prediction => "prediction",
            InsightType::Comparison => "comparison",
            InsightType::Recommendation => "recommendation",
        }
    }
}

impl fmt::Display for InsightType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for InsightType {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "anomaly" => Ok(InsightType::Anomaly),
            "trend" => Ok(InsightType::Trend),
            "prediction" => Ok(InsightType::Prediction),
            "comparison" => Ok(InsightType::Comparison),
            "recommendation" => Ok(InsightType::Recommendation),
            _ => Err(format!("Unknown insight type: {}", s)),
        }
    }
}

/// How urgently an insight needs attention
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    Info,
    Warning,
    Action,
    Critical,
}

impl Priority {
    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::Info => "info",
            Priority::Warning => "warning",
            Priority::Action => "action",
            Priority::Critical => "critical",
        }
    }

    /// Numeric priority for sorting (higher = more urgent)
    pub fn rank(&self) -> u8 {
        match self {
            Priority::Info => 1,
            Priority::Warning => 2,
            Priority::Action => 3,
            Priority::Critical => 4,
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A headline number attached to an insight
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InsightMetric {
    pub name: String,
    pub value: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub change: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trend: Option<TrendDirection>,
}

/// A synthesized, human-readable finding
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Insight {
    /// Deterministic key for deduplication, e.g. "insight:anomaly:revenue"
    pub id: String,
    #[serde(rename = "type")]
    pub insight_type: InsightType,
    pub priority: Priority,
    pub title: String,
    pub description: String,
    pub metrics: Vec<InsightMetric>,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub actions: Vec<String>,
    /// Ids of the series this insight was derived from
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub related_series: Vec<String>,
    /// Never below the minimum confidence of the contributing sources
    pub confidence: f64,
    pub generated_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<DateTime<Utc>>,
}

impl Insight {
    pub fn new(
        id: impl Into<String>,
        insight_type: InsightType,
        priority: Priority,
        title: impl Into<String>,
        description: impl Into<String>,
        confidence: f64,
    ) -> Self {
        Self {
            id: id.into(),
            insight_type,
            priority,
            title: title.into(),
            description: description.into(),
            metrics: Vec::new(),
            actions: Vec::new(),
            related_series: Vec::new(),
            confidence,
            generated_at: Utc::now(),
            expires_at: None,
        }
    }

    pub fn with_metric(mut self, metric: InsightMetric) -> Self {
        self.metrics.push(metric);
        self
    }

    pub fn with_action(mut self, action: impl Into<String>) -> Self {
        self.actions.push(action.into());
        self
    }

    pub fn with_related_series(mut self, series_id: impl Into<String>) -> Self {
        self.related_series.push(series_id.into());
        self
    }

    pub fn with_expiry(mut self, expires_at: DateTime<Utc>) -> Self {
        self.expires_at = Some(expires_at);
        self
    }
}

// ---------------------------------------------------------------------------
// Benchmarks
// ---------------------------------------------------------------------------

/// Where a benchmark reference value comes from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BenchmarkSource {
    PreviousPeriod,
    Target,
    Industry,
    BestPractice,
}

impl BenchmarkSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            BenchmarkSource::PreviousPeriod => "previous_period",
            BenchmarkSource::Target => "target",
            BenchmarkSource::Industry => "industry",
            BenchmarkSource::BestPractice => "best_practice",
        }
    }
}

/// Classification of current value vs. benchmark
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Performance {
    Exceeding,
    Meeting,
    Below,
    Critical,
}

impl Performance {
    pub fn as_str(&self) -> &'static str {
        match self {
            Performance::Exceeding => "exceeding",
            Performance::Meeting => "meeting",
            Performance::Below => "below",
            Performance::Critical => "critical",
        }
    }
}

/// Direction of benchmark performance over time
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BenchmarkTrend {
    Improving,
    Declining,
    Stable,
}

/// Result of comparing a current value against a reference value
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Benchmark {
    pub id: String,
    pub metric: String,
    pub current_value: f64,
    pub benchmark_value: f64,
    pub source: BenchmarkSource,
    pub performance: Performance,
    /// current - benchmark
    pub gap: f64,
    /// gap / benchmark; None when the benchmark value is zero
    pub gap_percent: Option<f64>,
    pub trend: BenchmarkTrend,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recommendation: Option<String>,
}

// ---------------------------------------------------------------------------
// Executive summary
// ---------------------------------------------------------------------------

/// Reporting window
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Period {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

/// Traffic-light status of a headline metric
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MetricStatus {
    Good,
    Neutral,
    Bad,
}

/// A headline number in the executive summary
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KeyMetric {
    pub name: String,
    pub value: f64,
    pub status: MetricStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trend: Option<TrendDirection>,
}

/// Period-level report aggregated from an analysis result
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutiveSummary {
    pub period: Period,
    pub highlights: Vec<String>,
    pub key_metrics: Vec<KeyMetric>,
    pub top_insights: Vec<Insight>,
    pub risks: Vec<String>,
    pub opportunities: Vec<String>,
    pub recommendations: Vec<String>,
}

// ---------------------------------------------------------------------------
// Config and result
// ---------------------------------------------------------------------------

/// Tunable analysis parameters, validated once at engine entry
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisConfig {
    /// Z-score threshold (in standard deviations) above which a point is anomalous
    pub anomaly_threshold: f64,
    /// Number of future steps to forecast
    pub prediction_horizon: u32,
    /// Minimum |coefficient| for a correlation to be reported
    pub correlation_min_strength: f64,
    /// Insights with lower confidence are dropped
    pub insight_min_confidence: f64,
    /// Days covered by a previous-period benchmark comparison
    pub benchmark_period_days: u32,
    /// Lag offsets to search when correlating (None = unlagged only)
    pub correlation_max_lag: Option<u32>,
    /// |slope| below this fraction of the mean magnitude counts as stable
    pub stable_slope_ratio: f64,
    /// Minimum r-squared for a flat slope to be called stable rather than volatile
    pub stable_min_r_squared: f64,
    /// Residual dispersion (stddev of residuals / |mean|) above this is volatile
    pub volatility_ratio: f64,
    /// Minimum autocorrelation for a candidate period to count as seasonal
    pub seasonality_min_autocorrelation: f64,
    /// Whether an increasing trend is framed as positive (flip for cost-like metrics)
    pub growth_is_good: bool,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            anomaly_threshold: 2.0,              // 2 standard deviations
            prediction_horizon: 14,              // two weeks ahead
            correlation_min_strength: 0.3,       // drop weak correlations
            insight_min_confidence: 0.5,         // drop coin-flip insights
            benchmark_period_days: 30,           // month-over-month
            correlation_max_lag: None,           // unlagged by default
            stable_slope_ratio: 0.01,            // slope < 1% of mean is flat
            stable_min_r_squared: 0.5,           // flat needs an explained fit too
            volatility_ratio: 0.5,               // residual spread > 50% of mean
            seasonality_min_autocorrelation: 0.5,
            growth_is_good: true,
        }
    }
}

impl AnalysisConfig {
    /// Validate all parameters; called once at engine entry (fail fast)
    pub fn validate(&self) -> Result<()> {
        if !self.anomaly_threshold.is_finite() || self.anomaly_threshold <= 0.0 {
            return Err(Error::InvalidConfig(format!(
                "anomaly_threshold must be > 0, got {}",
                self.anomaly_threshold
            )));
        }
        if self.prediction_horizon == 0 {
            return Err(Error::InvalidConfig(
                "prediction_horizon must be > 0".to_string(),
            ));
        }
        if !(0.0..=1.0).contains(&self.correlation_min_strength) {
            return Err(Error::InvalidConfig(format!(
                "correlation_min_strength must be in [0, 1], got {}",
                self.correlation_min_strength
            )));
        }
        if !(0.0..=1.0).contains(&self.insight_min_confidence) {
            return Err(Error::InvalidConfig(format!(
                "insight_min_confidence must be in [0, 1], got {}",
                self.insight_min_confidence
            )));
        }
        if self.benchmark_period_days == 0 {
            return Err(Error::InvalidConfig(
                "benchmark_period_days must be > 0".to_string(),
            ));
        }
        if !self.stable_slope_ratio.is_finite() || self.stable_slope_ratio <= 0.0 {
            return Err(Error::InvalidConfig(
                "stable_slope_ratio must be > 0".to_string(),
            ));
        }
        if !(0.0..=1.0).contains(&self.stable_min_r_squared) {
            return Err(Error::InvalidConfig(format!(
                "stable_min_r_squared must be in [0, 1], got {}",
                self.stable_min_r_squared
            )));
        }
        if !self.volatility_ratio.is_finite() || self.volatility_ratio <= 0.0 {
            return Err(Error::InvalidConfig(
                "volatility_ratio must be > 0".to_string(),
            ));
        }
        if !(0.0..=1.0).contains(&self.seasonality_min_autocorrelation) {
            return Err(Error::InvalidConfig(format!(
                "seasonality_min_autocorrelation must be in [0, 1], got {}",
                self.seasonality_min_autocorrelation
            )));
        }
        Ok(())
    }
}

/// A per-series failure captured during a multi-series batch
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeriesError {
    pub series_id: String,
    pub error: String,
}

/// Top-level return value of a full analysis run, immutable once constructed
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub id: String,
    pub analyzed_at: DateTime<Utc>,
    pub config: AnalysisConfig,
    pub series: Vec<DataSeries>,
    /// Per-series descriptive statistics, keyed by series id
    pub stats: BTreeMap<String, DescriptiveStats>,
    /// Per-series trend characterization, keyed by series id
    pub trends: BTreeMap<String, Trend>,
    pub anomalies: Vec<Anomaly>,
    pub predictions: Vec<Prediction>,
    pub correlations: Vec<Correlation>,
    pub insights: Vec<Insight>,
    pub benchmarks: Vec<Benchmark>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<ExecutiveSummary>,
    /// Series that failed analysis, reported alongside successful results
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub errors: Vec<SeriesError>,
}
