//! Multi-model forecasting with confidence bounds
//!
//! Fits linear, quadratic, and exponential models (plus a seasonal model
//! when the trend analyzer detected a cycle), selects the one with the
//! lowest in-sample RMSE, and extrapolates with intervals that widen with
//! forecast distance. Strong seasonality wins over a marginal RMSE edge:
//! cyclical structure generalizes better out of sample.

use chrono::Duration;
use tracing::{debug, warn};

use crate::anomaly::modal_interval_secs;
use crate::error::{Error, Result};
use crate::models::{AnalysisConfig, DataSeries, ForecastModel, Prediction, PredictionFactor};
use crate::trend::{self, linear_fit, LinearFit};

/// Two-sided 95% normal quantile used for interval half-widths
const Z_95: f64 = 1.96;

/// Seasonality at or above this autocorrelation overrides RMSE selection
const SEASONAL_PREFERENCE_MIN_STRENGTH: f64 = 0.6;

/// Forecast `horizon` steps beyond the end of the series.
///
/// `model_override` forces a model family instead of RMSE selection.
pub fn predict(
    series: &DataSeries,
    horizon: u32,
    model_override: Option<ForecastModel>,
    config: &AnalysisConfig,
) -> Result<Vec<Prediction>> {
    if horizon == 0 {
        return Err(Error::InvalidHorizon(0));
    }

    let values = series.finite_values();
    let n = values.len();
    if n < 3 {
        return Err(Error::InsufficientData(format!(
            "series '{}' has {} present points, need at least 3 to fit a model",
            series.id, n
        )));
    }

    let trend = trend::analyze(&values, config);
    let candidates = fit_candidates(&values, &trend, config);

    let chosen = match model_override {
        Some(tag) => candidates
            .iter()
            .find(|c| c.tag == tag)
            .or_else(|| {
                warn!(
                    series = %series.id,
                    model = tag.as_str(),
                    "Requested model unavailable for this series, falling back to linear"
                );
                candidates.iter().find(|c| c.tag == ForecastModel::Linear)
            })
            .cloned(),
        None => select_model(&candidates, &trend),
    }
    .ok_or_else(|| Error::InsufficientData("no forecast model could be fitted".to_string()))?;

    debug!(
        series = %series.id,
        model = chosen.tag.as_str(),
        rmse = chosen.rmse,
        "Forecast model selected"
    );

    let factors = contribution_factors(&trend);
    let step_secs = modal_interval_secs(series).unwrap_or(86_400);
    let last_ts = series
        .data
        .last()
        .map(|p| p.timestamp)
        .unwrap_or_else(chrono::Utc::now);
    let nf = n as f64;

    let mut predictions = Vec::with_capacity(horizon as usize);
    for h in 1..=horizon as usize {
        let x = (n - 1 + h) as f64;
        let predicted = chosen.predict(x);
        // Interval widens with distance and with in-sample residual spread
        let half_width = Z_95 * chosen.rmse * (1.0 + h as f64 / nf).sqrt();
        // Monotonically decaying with distance, never above 0.95
        let confidence = 0.95 * (nf / (nf + h as f64)).sqrt();

        predictions.push(Prediction {
            id: format!("forecast:{}:{}", series.id, h),
            series_id: series.id.clone(),
            target_date: last_ts + Duration::seconds(step_secs * h as i64),
            predicted_value: predicted,
            lower_bound: predicted - half_width,
            upper_bound: predicted + half_width,
            confidence,
            model: chosen.tag,
            factors: factors.clone(),
        });
    }

    Ok(predictions)
}

/// A fitted candidate model with its in-sample error
#[derive(Debug, Clone)]
struct Candidate {
    tag: ForecastModel,
    rmse: f64,
    kind: FittedKind,
}

#[derive(Debug, Clone)]
enum FittedKind {
    Linear(LinearFit),
    /// coefficients c0 + c1*x + c2*x^2
    Polynomial([f64; 3]),
    /// a * exp(b * x)
    Exponential { a: f64, b: f64 },
    Seasonal {
        fit: LinearFit,
        phase_means: Vec<f64>,
    },
}

impl Candidate {
    fn predict(&self, x: f64) -> f64 {
        match &self.kind {
            FittedKind::Linear(fit) => fit.predict(x),
            FittedKind::Polynomial(c) => c[0] + c[1] * x + c[2] * x * x,
            FittedKind::Exponential { a, b } => a * (b * x).exp(),
            FittedKind::Seasonal { fit, phase_means } => {
                let phase = (x.round() as usize) % phase_means.len();
                fit.predict(x) + phase_means[phase]
            }
        }
    }
}

fn fit_candidates(values: &[f64], trend: &crate::models::Trend, _config: &AnalysisConfig) -> Vec<Candidate> {
    let mut candidates = Vec::new();

    let linear = linear_fit(values);
    candidates.push(with_rmse(values, ForecastModel::Linear, FittedKind::Linear(linear)));

    if let Some(coefficients) = fit_quadratic(values) {
        candidates.push(with_rmse(
            values,
            ForecastModel::Polynomial,
            FittedKind::Polynomial(coefficients),
        ));
    }

    // Log-linear fit only makes sense on strictly positive data
    if values.iter().all(|&v| v > 0.0) {
        let logs: Vec<f64> = values.iter().map(|v| v.ln()).collect();
        let log_fit = linear_fit(&logs);
        candidates.push(with_rmse(
            values,
            ForecastModel::Exponential,
            FittedKind::Exponential {
                a: log_fit.intercept.exp(),
                b: log_fit.slope,
            },
        ));
    }

    if let Some(seasonality) = &trend.seasonality {
        let fit = linear_fit(values);
        let period = seasonality.period;
        let mut sums = vec![0.0; period];
        let mut counts = vec![0usize; period];
        for (i, &v) in values.iter().enumerate() {
            sums[i % period] += v - fit.predict(i as f64);
            counts[i % period] += 1;
        }
        let phase_means: Vec<f64> = sums
            .iter()
            .zip(&counts)
            .map(|(&s, &c)| if c > 0 { s / c as f64 } else { 0.0 })
            .collect();
        candidates.push(with_rmse(
            values,
            ForecastModel::Seasonal,
            FittedKind::Seasonal { fit, phase_means },
        ));
    }

    candidates
}

fn with_rmse(values: &[f64], tag: ForecastModel, kind: FittedKind) -> Candidate {
    let mut candidate = Candidate {
        tag,
        rmse: 0.0,
        kind,
    };
    let sse: f64 = values
        .iter()
        .enumerate()
        .map(|(i, &v)| (v - candidate.predict(i as f64)).powi(2))
        .sum();
    candidate.rmse = (sse / values.len() as f64).sqrt();
    candidate
}

fn select_model(candidates: &[Candidate], trend: &crate::models::Trend) -> Option<Candidate> {
    // Strongly detected seasonality beats a marginal in-sample fit advantage
    if let Some(seasonality) = &trend.seasonality {
        if seasonality.strength >= SEASONAL_PREFERENCE_MIN_STRENGTH {
            if let Some(seasonal) = candidates.iter().find(|c| c.tag == ForecastModel::Seasonal) {
                return Some(seasonal.clone());
            }
        }
    }
    candidates
        .iter()
        .min_by(|a, b| a.rmse.partial_cmp(&b.rmse).unwrap_or(std::cmp::Ordering::Equal))
        .cloned()
}

/// Explanatory weights for "what drives this forecast"; always sums to 1
fn contribution_factors(trend: &crate::models::Trend) -> Vec<PredictionFactor> {
    let trend_weight = trend.r_squared.clamp(0.0, 1.0);
    let seasonal_weight = trend
        .seasonality
        .as_ref()
        .map(|s| s.strength.clamp(0.0, 1.0) * (1.0 - trend_weight))
        .unwrap_or(0.0);
    let noise_weight = (1.0 - trend_weight - seasonal_weight).max(0.0);

    vec![
        PredictionFactor {
            name: "trend".to_string(),
            weight: trend_weight,
        },
        PredictionFactor {
            name: "seasonality".to_string(),
            weight: seasonal_weight,
        },
        PredictionFactor {
            name: "noise".to_string(),
            weight: noise_weight,
        },
    ]
}

/// Least-squares quadratic via the 3x3 normal equations
fn fit_quadratic(values: &[f64]) -> Option<[f64; 3]> {
    let n = values.len() as f64;
    let (mut sx, mut sx2, mut sx3, mut sx4) = (0.0, 0.0, 0.0, 0.0);
    let (mut sy, mut sxy, mut sx2y) = (0.0, 0.0, 0.0);
    for (i, &y) in values.iter().enumerate() {
        let x = i as f64;
        let x2 = x * x;
        sx += x;
        sx2 += x2;
        sx3 += x2 * x;
        sx4 += x2 * x2;
        sy += y;
        sxy += x * y;
        sx2y += x2 * y;
    }
    solve3(
        [[n, sx, sx2], [sx, sx2, sx3], [sx2, sx3, sx4]],
        [sy, sxy, sx2y],
    )
}

/// Gaussian elimination with partial pivoting for a 3x3 system
fn solve3(mut a: [[f64; 3]; 3], mut b: [f64; 3]) -> Option<[f64; 3]> {
    for col in 0..3 {
        let pivot = (col..3).max_by(|&i, &j| {
            a[i][col]
                .abs()
                .partial_cmp(&a[j][col].abs())
                .unwrap_or(std::cmp::Ordering::Equal)
        })?;
        if a[pivot][col].abs() < 1e-12 {
            return None;
        }
        a.swap(col, pivot);
        b.swap(col, pivot);
        for row in col + 1..3 {
            let factor = a[row][col] / a[col][col];
            for k in col..3 {
                a[row][k] -= factor * a[col][k];
            }
            b[row] -= factor * b[col];
        }
    }
    let mut x = [0.0; 3];
    for row in (0..3).rev() {
        let mut sum = b[row];
        for k in row + 1..3 {
            sum -= a[row][k] * x[k];
        }
        x[row] = sum / a[row][row];
    }
    Some(x)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn daily_series(id: &str, values: &[f64]) -> DataSeries {
        let start = Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap();
        DataSeries::from_values(id, id, start, Duration::days(1), values)
    }

    fn cfg() -> AnalysisConfig {
        AnalysisConfig::default()
    }

    #[test]
    fn test_zero_horizon_rejected() {
        let series = daily_series("s", &[1.0, 2.0, 3.0, 4.0]);
        assert!(matches!(
            predict(&series, 0, None, &cfg()),
            Err(Error::InvalidHorizon(0))
        ));
    }

    #[test]
    fn test_short_series_rejected() {
        let series = daily_series("s", &[1.0, 2.0]);
        assert!(matches!(
            predict(&series, 5, None, &cfg()),
            Err(Error::InsufficientData(_))
        ));
    }

    #[test]
    fn test_linear_series_extrapolates_linearly() {
        let values: Vec<f64> = (0..20).map(|i| 5.0 + 3.0 * i as f64).collect();
        let series = daily_series("lin", &values);
        let predictions = predict(&series, 5, None, &cfg()).unwrap();

        assert_eq!(predictions.len(), 5);
        // First step continues the line: 5 + 3*20 = 65
        assert!((predictions[0].predicted_value - 65.0).abs() < 1e-6);
        assert!((predictions[4].predicted_value - 77.0).abs() < 1e-6);
    }

    #[test]
    fn test_bounds_bracket_prediction() {
        let values: Vec<f64> = (0..30).map(|i| 100.0 + 2.0 * i as f64 + ((i % 3) as f64)).collect();
        let series = daily_series("noisy", &values);
        let predictions = predict(&series, 10, None, &cfg()).unwrap();

        for p in &predictions {
            assert!(p.lower_bound <= p.predicted_value);
            assert!(p.predicted_value <= p.upper_bound);
        }
    }

    #[test]
    fn test_confidence_non_increasing_with_horizon() {
        let values: Vec<f64> = (0..30).map(|i| 10.0 + i as f64).collect();
        let series = daily_series("conf", &values);
        let predictions = predict(&series, 12, None, &cfg()).unwrap();

        for w in predictions.windows(2) {
            assert!(w[1].confidence <= w[0].confidence);
        }
        assert!(predictions[0].confidence <= 0.95);
        assert!(predictions.last().unwrap().confidence > 0.0);
    }

    #[test]
    fn test_intervals_widen_with_horizon() {
        let values: Vec<f64> = (0..30)
            .map(|i| 50.0 + i as f64 + if i % 2 == 0 { 1.0 } else { -1.0 })
            .collect();
        let series = daily_series("widen", &values);
        let predictions = predict(&series, 8, None, &cfg()).unwrap();

        for w in predictions.windows(2) {
            let first = w[0].upper_bound - w[0].lower_bound;
            let second = w[1].upper_bound - w[1].lower_bound;
            assert!(second >= first);
        }
    }

    #[test]
    fn test_exponential_growth_picks_exponential() {
        let values: Vec<f64> = (0..25).map(|i| 10.0 * 1.2_f64.powi(i)).collect();
        let series = daily_series("exp", &values);
        let predictions = predict(&series, 3, None, &cfg()).unwrap();
        assert_eq!(predictions[0].model, ForecastModel::Exponential);
    }

    #[test]
    fn test_seasonal_series_prefers_seasonal_model() {
        let values: Vec<f64> = (0..56)
            .map(|i| 100.0 + 20.0 * (i as f64 * 2.0 * std::f64::consts::PI / 7.0).sin())
            .collect();
        let series = daily_series("weekly", &values);
        let predictions = predict(&series, 7, None, &cfg()).unwrap();
        assert_eq!(predictions[0].model, ForecastModel::Seasonal);
    }

    #[test]
    fn test_model_override_honored() {
        let values: Vec<f64> = (0..20).map(|i| 5.0 + 3.0 * i as f64).collect();
        let series = daily_series("force", &values);
        let predictions = predict(&series, 2, Some(ForecastModel::Polynomial), &cfg()).unwrap();
        assert_eq!(predictions[0].model, ForecastModel::Polynomial);
    }

    #[test]
    fn test_factors_sum_to_one() {
        let values: Vec<f64> = (0..30).map(|i| 10.0 + i as f64 + ((i % 4) as f64)).collect();
        let series = daily_series("factors", &values);
        let predictions = predict(&series, 1, None, &cfg()).unwrap();

        let total: f64 = predictions[0].factors.iter().map(|f| f.weight).sum();
        assert!((total - 1.0).abs() < 1e-9);
        let names: Vec<_> = predictions[0].factors.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["trend", "seasonality", "noise"]);
    }

    #[test]
    fn test_target_dates_advance_by_series_step() {
        let values: Vec<f64> = (0..10).map(|i| i as f64).collect();
        let series = daily_series("dates", &values);
        let predictions = predict(&series, 3, None, &cfg()).unwrap();

        let last = series.data.last().unwrap().timestamp;
        assert_eq!(predictions[0].target_date, last + Duration::days(1));
        assert_eq!(predictions[2].target_date, last + Duration::days(3));
    }
}
