//! Descriptive statistics over a numeric sample
//!
//! The rest of the engine (trend, anomaly, correlation) builds on the
//! moments computed here. Sample (Bessel-corrected) standard deviation,
//! adjusted Fisher-Pearson skewness/kurtosis, and linearly interpolated
//! percentiles; nearest-rank percentiles are avoided because they jump
//! discontinuously under small n.

use crate::error::{Error, Result};
use crate::models::{DescriptiveStats, Percentiles};

/// Compute descriptive statistics for a non-empty sample of finite values.
///
/// A single-element sample yields degenerate stats (all moments zero)
/// rather than dividing by zero.
pub fn describe(values: &[f64]) -> Result<DescriptiveStats> {
    if values.is_empty() {
        return Err(Error::InsufficientData(
            "cannot compute statistics of an empty sample".to_string(),
        ));
    }

    let n = values.len();
    let nf = n as f64;
    let mean = values.iter().sum::<f64>() / nf;

    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    let min = sorted[0];
    let max = sorted[n - 1];

    if n == 1 {
        return Ok(DescriptiveStats {
            count: 1,
            min,
            max,
            mean,
            median: mean,
            std_dev: 0.0,
            variance: 0.0,
            skewness: 0.0,
            kurtosis: 0.0,
            percentiles: Percentiles {
                p25: mean,
                p50: mean,
                p75: mean,
                p90: mean,
                p95: mean,
                p99: mean,
            },
        });
    }

    let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (nf - 1.0);
    let std_dev = variance.sqrt();

    let (skewness, kurtosis) = if std_dev > f64::EPSILON {
        (
            adjusted_skewness(values, mean, std_dev),
            adjusted_kurtosis(values, mean, std_dev),
        )
    } else {
        (0.0, 0.0)
    };

    Ok(DescriptiveStats {
        count: n,
        min,
        max,
        mean,
        median: percentile(&sorted, 50.0),
        std_dev,
        variance,
        skewness,
        kurtosis,
        percentiles: Percentiles {
            p25: percentile(&sorted, 25.0),
            p50: percentile(&sorted, 50.0),
            p75: percentile(&sorted, 75.0),
            p90: percentile(&sorted, 90.0),
            p95: percentile(&sorted, 95.0),
            p99: percentile(&sorted, 99.0),
        },
    })
}

/// Linearly interpolated percentile of an already-sorted sample
pub(crate) fn percentile(sorted: &[f64], p: f64) -> f64 {
    let n = sorted.len();
    if n == 1 {
        return sorted[0];
    }
    let rank = (p / 100.0) * (n - 1) as f64;
    let lower = rank.floor() as usize;
    let upper = rank.ceil() as usize;
    if lower == upper {
        sorted[lower]
    } else {
        let frac = rank - lower as f64;
        sorted[lower] + (sorted[upper] - sorted[lower]) * frac
    }
}

/// Adjusted Fisher-Pearson standardized third moment; zero when n < 3
fn adjusted_skewness(values: &[f64], mean: f64, std_dev: f64) -> f64 {
    let n = values.len() as f64;
    if n < 3.0 {
        return 0.0;
    }
    let m3 = values
        .iter()
        .map(|v| ((v - mean) / std_dev).powi(3))
        .sum::<f64>();
    n / ((n - 1.0) * (n - 2.0)) * m3
}

/// Adjusted excess kurtosis; zero when n < 4
fn adjusted_kurtosis(values: &[f64], mean: f64, std_dev: f64) -> f64 {
    let n = values.len() as f64;
    if n < 4.0 {
        return 0.0;
    }
    let m4 = values
        .iter()
        .map(|v| ((v - mean) / std_dev).powi(4))
        .sum::<f64>();
    let a = n * (n + 1.0) / ((n - 1.0) * (n - 2.0) * (n - 3.0));
    let b = 3.0 * (n - 1.0).powi(2) / ((n - 2.0) * (n - 3.0));
    a * m4 - b
}
