//! Benchmark comparison of a current value against a reference value

use crate::models::{Benchmark, BenchmarkSource, BenchmarkTrend, Performance};

/// Favorable gap (in percent) at or above which performance is `exceeding`
const EXCEEDING_PERCENT: f64 = 5.0;
/// Favorable gap down to which performance still counts as `meeting`
const MEETING_PERCENT: f64 = -5.0;
/// Favorable gap down to which performance is `below`; worse is `critical`
const BELOW_PERCENT: f64 = -20.0;

/// Minimum favorable-percent movement between snapshots to call a trend
const TREND_DEADBAND: f64 = 1.0;

/// A benchmark comparison request
#[derive(Debug, Clone)]
pub struct BenchmarkInput {
    pub metric: String,
    pub current_value: f64,
    pub benchmark_value: f64,
    pub source: BenchmarkSource,
    /// Metric direction convention: true when larger values are desirable
    /// (revenue), false when smaller are (burn rate, churn)
    pub higher_is_better: bool,
}

/// Compare a current value against its benchmark.
///
/// `previous` is an optional earlier snapshot of the same comparison; the
/// trend defaults to `stable` without one. A zero benchmark value leaves
/// `gap_percent` unset and classifies performance from the absolute gap
/// alone, so no infinity ever reaches the output.
pub fn compare(input: &BenchmarkInput, previous: Option<&Benchmark>) -> Benchmark {
    let gap = input.current_value - input.benchmark_value;
    let gap_percent = if input.benchmark_value.abs() > f64::EPSILON {
        Some(gap / input.benchmark_value.abs() * 100.0)
    } else {
        None
    };

    let favorable_sign = if input.higher_is_better { 1.0 } else { -1.0 };
    let performance = match gap_percent {
        Some(pct) => classify(pct * favorable_sign),
        // No relative scale: fall back to the sign of the favorable gap
        None => {
            let favorable_gap = gap * favorable_sign;
            if favorable_gap > 0.0 {
                Performance::Exceeding
            } else if favorable_gap == 0.0 {
                Performance::Meeting
            } else {
                Performance::Below
            }
        }
    };

    let trend = trend_vs_previous(gap * favorable_sign, gap_percent.map(|p| p * favorable_sign), previous, favorable_sign);

    let recommendation = match performance {
        Performance::Below | Performance::Critical => Some(format!(
            "{} is {:.2} short of its {} benchmark; close the gap or revisit the target",
            input.metric,
            gap.abs(),
            source_label(input.source)
        )),
        _ => None,
    };

    Benchmark {
        id: format!("benchmark:{}:{}", input.metric, input.source.as_str()),
        metric: input.metric.clone(),
        current_value: input.current_value,
        benchmark_value: input.benchmark_value,
        source: input.source,
        performance,
        gap,
        gap_percent,
        trend,
        recommendation,
    }
}

fn classify(favorable_percent: f64) -> Performance {
    if favorable_percent >= EXCEEDING_PERCENT {
        Performance::Exceeding
    } else if favorable_percent >= MEETING_PERCENT {
        Performance::Meeting
    } else if favorable_percent >= BELOW_PERCENT {
        Performance::Below
    } else {
        Performance::Critical
    }
}

fn trend_vs_previous(
    favorable_gap: f64,
    favorable_percent: Option<f64>,
    previous: Option<&Benchmark>,
    favorable_sign: f64,
) -> BenchmarkTrend {
    let Some(prev) = previous else {
        return BenchmarkTrend::Stable;
    };

    // Prefer the relative comparison when both snapshots support it
    match (favorable_percent, prev.gap_percent) {
        (Some(now), Some(prev_pct)) => {
            let delta = now - prev_pct * favorable_sign;
            if delta > TREND_DEADBAND {
                BenchmarkTrend::Improving
            } else if delta < -TREND_DEADBAND {
                BenchmarkTrend::Declining
            } else {
                BenchmarkTrend::Stable
            }
        }
        _ => {
            let delta = favorable_gap - prev.gap * favorable_sign;
            if delta > 0.0 {
                BenchmarkTrend::Improving
            } else if delta < 0.0 {
                BenchmarkTrend::Declining
            } else {
                BenchmarkTrend::Stable
            }
        }
    }
}

fn source_label(source: BenchmarkSource) -> &'static str {
    match source {
        BenchmarkSource::PreviousPeriod => "previous-period",
        BenchmarkSource::Target => "target",
        BenchmarkSource::Industry => "industry",
        BenchmarkSource::BestPractice => "best-practice",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input(current: f64, benchmark: f64, higher_is_better: bool) -> BenchmarkInput {
        BenchmarkInput {
            metric: "revenue".to_string(),
            current_value: current,
            benchmark_value: benchmark,
            source: BenchmarkSource::Target,
            higher_is_better,
        }
    }

    #[test]
    fn test_exceeding_target() {
        let result = compare(&input(120.0, 100.0, true), None);
        assert_eq!(result.performance, Performance::Exceeding);
        assert!((result.gap - 20.0).abs() < 1e-9);
        assert!((result.gap_percent.unwrap() - 20.0).abs() < 1e-9);
        assert!(result.recommendation.is_none());
    }

    #[test]
    fn test_meeting_within_deadband() {
        let result = compare(&input(98.0, 100.0, true), None);
        assert_eq!(result.performance, Performance::Meeting);
    }

    #[test]
    fn test_below_and_critical() {
        let below = compare(&input(85.0, 100.0, true), None);
        assert_eq!(below.performance, Performance::Below);
        assert!(below.recommendation.is_some());

        let critical = compare(&input(50.0, 100.0, true), None);
        assert_eq!(critical.performance, Performance::Critical);
    }

    #[test]
    fn test_lower_is_better_flips_classification() {
        // Burn rate 20% above target is bad when lower is better
        let result = compare(&input(120.0, 100.0, false), None);
        assert_eq!(result.performance, Performance::Critical);

        // Burn rate 20% below target is good
        let result = compare(&input(80.0, 100.0, false), None);
        assert_eq!(result.performance, Performance::Exceeding);
    }

    #[test]
    fn test_zero_benchmark_has_no_percent() {
        let result = compare(&input(10.0, 0.0, true), None);
        assert!(result.gap_percent.is_none());
        assert_eq!(result.performance, Performance::Exceeding);

        let result = compare(&input(-10.0, 0.0, true), None);
        assert_eq!(result.performance, Performance::Below);
    }

    #[test]
    fn test_trend_defaults_to_stable() {
        let result = compare(&input(110.0, 100.0, true), None);
        assert_eq!(result.trend, BenchmarkTrend::Stable);
    }

    #[test]
    fn test_trend_against_previous_snapshot() {
        let earlier = compare(&input(90.0, 100.0, true), None);
        let improving = compare(&input(105.0, 100.0, true), Some(&earlier));
        assert_eq!(improving.trend, BenchmarkTrend::Improving);

        let declining = compare(&input(80.0, 100.0, true), Some(&earlier));
        assert_eq!(declining.trend, BenchmarkTrend::Declining);
    }
}
