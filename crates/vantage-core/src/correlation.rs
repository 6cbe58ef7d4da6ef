//! Pairwise series relationship discovery
//!
//! Pearson correlation over timestamp-aligned value pairs, with an optional
//! lag search. The causality hint is a heuristic label only; it is never a
//! statistical causality claim and is worded accordingly.

use tracing::debug;

use crate::error::{Error, Result};
use crate::models::{
    AnalysisConfig, Correlation, CorrelationDirection, CorrelationStrength, DataSeries,
};

/// Correlate two series, returning `None` when the relationship is weaker
/// than `correlation_min_strength` or when either series is degenerate
/// (zero variance over the aligned pairs).
///
/// The id pair is reported in canonical (lexicographic) order regardless of
/// argument order, which keeps the result symmetric.
pub fn correlate(
    a: &DataSeries,
    b: &DataSeries,
    config: &AnalysisConfig,
) -> Result<Option<Correlation>> {
    if a.id == b.id {
        return Err(Error::IdenticalSeries(a.id.clone()));
    }

    // Canonical order first so (a, b) and (b, a) produce identical output
    let (first, second) = if a.id <= b.id { (a, b) } else { (b, a) };

    let (xs, ys) = align_by_timestamp(first, second);
    if xs.len() < 3 {
        return Err(Error::InsufficientData(format!(
            "series '{}' and '{}' share only {} aligned points, need at least 3",
            first.id,
            second.id,
            xs.len()
        )));
    }

    let (coefficient, lag) = match best_correlation(&xs, &ys, config.correlation_max_lag) {
        Some(found) => found,
        None => {
            debug!(
                series1 = %first.id,
                series2 = %second.id,
                "Zero variance in aligned pairs, no correlation possible"
            );
            return Ok(None);
        }
    };

    if coefficient.abs() < config.correlation_min_strength {
        debug!(
            series1 = %first.id,
            series2 = %second.id,
            coefficient,
            "Correlation below reporting strength"
        );
        return Ok(None);
    }

    let strength = CorrelationStrength::from_coefficient(coefficient);
    let direction = if coefficient >= 0.0 {
        CorrelationDirection::Positive
    } else {
        CorrelationDirection::Negative
    };

    let lag_days = config.correlation_max_lag.map(|_| lag);
    let causality_hint = causality_hint(first, second, lag, strength);

    Ok(Some(Correlation {
        id: format!("corr:{}:{}", first.id, second.id),
        series1: first.id.clone(),
        series2: second.id.clone(),
        coefficient,
        strength,
        direction,
        lag_days,
        interpretation: interpret(first, second, coefficient, strength),
        causality_hint,
    }))
}

/// Pair up finite values that share a timestamp (two-pointer merge over the
/// ascending-timestamp invariant)
fn align_by_timestamp(a: &DataSeries, b: &DataSeries) -> (Vec<f64>, Vec<f64>) {
    let mut xs = Vec::new();
    let mut ys = Vec::new();
    let mut i = 0;
    let mut j = 0;
    while i < a.data.len() && j < b.data.len() {
        let pa = &a.data[i];
        let pb = &b.data[j];
        match pa.timestamp.cmp(&pb.timestamp) {
            std::cmp::Ordering::Less => i += 1,
            std::cmp::Ordering::Greater => j += 1,
            std::cmp::Ordering::Equal => {
                if pa.is_present() && pb.is_present() {
                    xs.push(pa.value);
                    ys.push(pb.value);
                }
                i += 1;
                j += 1;
            }
        }
    }
    (xs, ys)
}

/// Pearson coefficient; `None` when either side has zero variance
pub(crate) fn pearson(xs: &[f64], ys: &[f64]) -> Option<f64> {
    let n = xs.len() as f64;
    let mean_x = xs.iter().sum::<f64>() / n;
    let mean_y = ys.iter().sum::<f64>() / n;

    let mut sxy = 0.0;
    let mut sxx = 0.0;
    let mut syy = 0.0;
    for (&x, &y) in xs.iter().zip(ys) {
        let dx = x - mean_x;
        let dy = y - mean_y;
        sxy += dx * dy;
        sxx += dx * dx;
        syy += dy * dy;
    }

    if sxx <= f64::EPSILON || syy <= f64::EPSILON {
        return None;
    }
    Some((sxy / (sxx * syy).sqrt()).clamp(-1.0, 1.0))
}

/// Search lag offsets for the maximal |coefficient|.
///
/// Positive lag means the first series leads: x[i] pairs with y[i + lag].
/// Negative lag means the second series leads. Lag 0 is always evaluated.
fn best_correlation(xs: &[f64], ys: &[f64], max_lag: Option<u32>) -> Option<(f64, i64)> {
    let mut best: Option<(f64, i64)> = pearson(xs, ys).map(|r| (r, 0));

    let Some(max_lag) = max_lag else {
        return best;
    };

    for lag in 1..=max_lag as usize {
        if xs.len() <= lag || xs.len() - lag < 3 {
            break;
        }
        let forward = pearson(&xs[..xs.len() - lag], &ys[lag..]);
        let backward = pearson(&xs[lag..], &ys[..ys.len() - lag]);
        for (r, signed_lag) in [
            (forward, lag as i64),
            (backward, -(lag as i64)),
        ] {
            if let Some(r) = r {
                if best.map_or(true, |(b, _)| r.abs() > b.abs()) {
                    best = Some((r, signed_lag));
                }
            }
        }
    }
    best
}

fn interpret(
    a: &DataSeries,
    b: &DataSeries,
    coefficient: f64,
    strength: CorrelationStrength,
) -> String {
    let relation = if coefficient >= 0.0 {
        "move together"
    } else {
        "move inversely"
    };
    format!(
        "{} and {} {} with {} correlation (r = {:.2})",
        a.name,
        b.name,
        relation,
        strength.as_str().replace('_', " "),
        coefficient
    )
}

/// Advisory only: flagged just for lagged strong relationships, and always
/// worded as a lead, never as a cause
fn causality_hint(
    a: &DataSeries,
    b: &DataSeries,
    lag: i64,
    strength: CorrelationStrength,
) -> Option<String> {
    if lag == 0 || strength < CorrelationStrength::Strong {
        return None;
    }
    let (leader, follower) = if lag > 0 { (a, b) } else { (b, a) };
    Some(format!(
        "{} may lead {} by {} steps; this is a heuristic signal, not evidence of causation",
        leader.name,
        follower.name,
        lag.abs()
    ))
}
