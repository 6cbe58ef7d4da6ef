//! Regression-based trend and seasonality characterization
//!
//! Fits an ordinary least-squares line of value on index, classifies the
//! direction (increasing / decreasing / stable / volatile), and probes
//! candidate periods (weekly, monthly) for seasonal structure via
//! autocorrelation. Classification thresholds come from `AnalysisConfig`
//! rather than being hard-coded.

use tracing::debug;

use crate::models::{AnalysisConfig, Seasonality, Trend, TrendDirection};

/// Candidate seasonal periods probed on every series (in observations)
pub const SEASONALITY_CANDIDATE_PERIODS: [usize; 2] = [7, 30];

/// An ordinary least-squares fit of value on index
#[derive(Debug, Clone, Copy)]
pub(crate) struct LinearFit {
    pub slope: f64,
    pub intercept: f64,
    pub r_squared: f64,
    /// Standard deviation of the fit residuals
    pub residual_std: f64,
}

impl LinearFit {
    pub fn predict(&self, x: f64) -> f64 {
        self.intercept + self.slope * x
    }
}

/// Least-squares line through (0, v[0]) .. (n-1, v[n-1]).
///
/// Requires at least 2 points; callers guard the degenerate cases.
pub(crate) fn linear_fit(values: &[f64]) -> LinearFit {
    let n = values.len() as f64;
    let mean_x = (n - 1.0) / 2.0;
    let mean_y = values.iter().sum::<f64>() / n;

    let mut sxx = 0.0;
    let mut sxy = 0.0;
    for (i, &y) in values.iter().enumerate() {
        let dx = i as f64 - mean_x;
        sxx += dx * dx;
        sxy += dx * (y - mean_y);
    }

    let slope = if sxx > f64::EPSILON { sxy / sxx } else { 0.0 };
    let intercept = mean_y - slope * mean_x;

    let mut ss_res = 0.0;
    let mut ss_tot = 0.0;
    for (i, &y) in values.iter().enumerate() {
        let fitted = intercept + slope * i as f64;
        ss_res += (y - fitted).powi(2);
        ss_tot += (y - mean_y).powi(2);
    }

    // A variance-free series is fitted exactly by its own mean line
    let r_squared = if ss_tot > f64::EPSILON {
        (1.0 - ss_res / ss_tot).clamp(0.0, 1.0)
    } else if ss_res <= f64::EPSILON {
        1.0
    } else {
        0.0
    };
    let residual_std = (ss_res / n).sqrt();

    LinearFit {
        slope,
        intercept,
        r_squared,
        residual_std,
    }
}

/// Characterize the trend of an ordered series of values.
///
/// Series shorter than 3 points cannot support a regression and come back
/// as `stable` with r_squared = 0 and no seasonality.
pub fn analyze(values: &[f64], config: &AnalysisConfig) -> Trend {
    if values.len() < 3 {
        return Trend {
            direction: TrendDirection::Stable,
            slope: 0.0,
            r_squared: 0.0,
            change_rate: 0.0,
            acceleration: 0.0,
            seasonality: None,
        };
    }

    let fit = linear_fit(values);
    let mean = values.iter().sum::<f64>() / values.len() as f64;
    let mean_mag = mean.abs();

    // Mean of consecutive relative differences, and its own slope
    let diffs: Vec<f64> = values
        .windows(2)
        .filter(|w| w[0].abs() > f64::EPSILON)
        .map(|w| (w[1] - w[0]) / w[0].abs())
        .collect();
    let change_rate = if diffs.is_empty() {
        0.0
    } else {
        diffs.iter().sum::<f64>() / diffs.len() as f64
    };
    let acceleration = if diffs.len() >= 2 {
        linear_fit(&diffs).slope
    } else {
        0.0
    };

    let direction = classify_direction(&fit, mean_mag, config);

    let seasonality = detect_seasonality(values, &fit, config);
    if let Some(s) = &seasonality {
        debug!(
            period = s.period,
            strength = s.strength,
            "Seasonality detected"
        );
    }

    Trend {
        direction,
        slope: fit.slope,
        r_squared: fit.r_squared,
        change_rate,
        acceleration,
        seasonality,
    }
}

fn classify_direction(fit: &LinearFit, mean_mag: f64, config: &AnalysisConfig) -> TrendDirection {
    // Residual dispersion dominates: a noisy series is volatile regardless
    // of the slope sign
    if mean_mag > f64::EPSILON && fit.residual_std / mean_mag > config.volatility_ratio {
        return TrendDirection::Volatile;
    }

    let stable_cutoff = if mean_mag > f64::EPSILON {
        config.stable_slope_ratio * mean_mag
    } else {
        f64::EPSILON
    };
    if fit.slope.abs() < stable_cutoff {
        // A flat slope only reads as stable when the fit explains the
        // series; a flat line through unexplained scatter is volatile
        return if fit.r_squared >= config.stable_min_r_squared {
            TrendDirection::Stable
        } else {
            TrendDirection::Volatile
        };
    }
    if fit.slope > 0.0 {
        TrendDirection::Increasing
    } else {
        TrendDirection::Decreasing
    }
}

/// Autocorrelation of a sample at the given lag (mean-removed)
pub(crate) fn autocorrelation(values: &[f64], lag: usize) -> f64 {
    let n = values.len();
    if lag == 0 || lag >= n {
        return 0.0;
    }
    let mean = values.iter().sum::<f64>() / n as f64;
    let denom: f64 = values.iter().map(|v| (v - mean).powi(2)).sum();
    if denom <= f64::EPSILON {
        return 0.0;
    }
    let num: f64 = (0..n - lag)
        .map(|i| (values[i] - mean) * (values[i + lag] - mean))
        .sum();
    num / denom
}

fn detect_seasonality(
    values: &[f64],
    fit: &LinearFit,
    config: &AnalysisConfig,
) -> Option<Seasonality> {
    // Detrend first so a strong trend does not masquerade as a cycle
    let residuals: Vec<f64> = values
        .iter()
        .enumerate()
        .map(|(i, &v)| v - fit.predict(i as f64))
        .collect();

    let mut best: Option<(usize, f64)> = None;
    for &period in &SEASONALITY_CANDIDATE_PERIODS {
        // Need at least two full cycles to say anything
        if values.len() < period * 2 {
            continue;
        }
        let acf = autocorrelation(&residuals, period);
        if acf >= config.seasonality_min_autocorrelation
            && best.map_or(true, |(_, b)| acf > b)
        {
            best = Some((period, acf));
        }
    }

    let (period, strength) = best?;

    // Amplitude: half-range of the per-phase means of the detrended series
    let mut phase_sums = vec![0.0; period];
    let mut phase_counts = vec![0usize; period];
    for (i, &r) in residuals.iter().enumerate() {
        phase_sums[i % period] += r;
        phase_counts[i % period] += 1;
    }
    let phase_means: Vec<f64> = phase_sums
        .iter()
        .zip(&phase_counts)
        .filter(|(_, &c)| c > 0)
        .map(|(&s, &c)| s / c as f64)
        .collect();
    let max = phase_means.iter().cloned().fold(f64::MIN, f64::max);
    let min = phase_means.iter().cloned().fold(f64::MAX, f64::min);

    Some(Seasonality {
        detected: true,
        period,
        amplitude: (max - min) / 2.0,
        strength,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cfg() -> AnalysisConfig {
        AnalysisConfig::default()
    }

    #[test]
    fn test_short_series_is_stable() {
        let trend = analyze(&[1.0, 2.0], &cfg());
        assert_eq!(trend.direction, TrendDirection::Stable);
        assert_eq!(trend.r_squared, 0.0);
        assert!(trend.seasonality.is_none());
    }

    #[test]
    fn test_perfect_line_increasing() {
        let values: Vec<f64> = (0..20).map(|i| 10.0 + 2.0 * i as f64).collect();
        let trend = analyze(&values, &cfg());
        assert_eq!(trend.direction, TrendDirection::Increasing);
        assert!((trend.slope - 2.0).abs() < 1e-9);
        assert!((trend.r_squared - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_decreasing_line() {
        let values: Vec<f64> = (0..20).map(|i| 100.0 - 3.0 * i as f64).collect();
        let trend = analyze(&values, &cfg());
        assert_eq!(trend.direction, TrendDirection::Decreasing);
        assert!(trend.slope < 0.0);
    }

    #[test]
    fn test_constant_series_is_stable() {
        let trend = analyze(&[5.0; 30], &cfg());
        assert_eq!(trend.direction, TrendDirection::Stable);
        assert_eq!(trend.slope, 0.0);
        assert_eq!(trend.change_rate, 0.0);
    }

    #[test]
    fn test_noisy_series_is_volatile() {
        // Alternating far above/below the mean: huge residual dispersion
        let values: Vec<f64> = (0..30)
            .map(|i| if i % 2 == 0 { 100.0 } else { 10.0 })
            .collect();
        let trend = analyze(&values, &cfg());
        assert_eq!(trend.direction, TrendDirection::Volatile);
    }

    #[test]
    fn test_flat_but_unexplained_series_is_volatile() {
        // Slope is near zero yet the line explains none of the variance;
        // dispersion stays under the volatility ratio on its own
        let values: Vec<f64> = (0..40)
            .map(|i| 100.0 + if i % 2 == 0 { 15.0 } else { -15.0 })
            .collect();
        let trend = analyze(&values, &cfg());
        assert!(trend.slope.abs() < cfg().stable_slope_ratio * 100.0);
        assert!(trend.r_squared < cfg().stable_min_r_squared);
        assert_eq!(trend.direction, TrendDirection::Volatile);
    }

    #[test]
    fn test_constant_series_has_perfect_fit() {
        let fit = linear_fit(&[7.5; 20]);
        assert_eq!(fit.slope, 0.0);
        assert!((fit.r_squared - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_change_rate_of_steady_growth() {
        // 10% growth per step
        let values: Vec<f64> = (0..10).map(|i| 100.0 * 1.1_f64.powi(i)).collect();
        let trend = analyze(&values, &cfg());
        assert!((trend.change_rate - 0.1).abs() < 1e-6);
    }

    #[test]
    fn test_weekly_seasonality_detected() {
        // Clean 7-period sine over 8 cycles
        let values: Vec<f64> = (0..56)
            .map(|i| 50.0 + 10.0 * (i as f64 * 2.0 * std::f64::consts::PI / 7.0).sin())
            .collect();
        let trend = analyze(&values, &cfg());
        let seasonality = trend.seasonality.expect("seasonality should be detected");
        assert_eq!(seasonality.period, 7);
        assert!(seasonality.detected);
        assert!(seasonality.amplitude > 5.0);
        assert!(seasonality.strength >= cfg().seasonality_min_autocorrelation);
    }

    #[test]
    fn test_trendy_series_has_no_false_seasonality() {
        let values: Vec<f64> = (0..60).map(|i| i as f64 * 5.0).collect();
        let trend = analyze(&values, &cfg());
        assert!(trend.seasonality.is_none());
    }

    #[test]
    fn test_autocorrelation_of_alternating_series() {
        let values: Vec<f64> = (0..40).map(|i| if i % 2 == 0 { 1.0 } else { -1.0 }).collect();
        assert!(autocorrelation(&values, 2) > 0.8);
        assert!(autocorrelation(&values, 1) < -0.8);
    }
}
