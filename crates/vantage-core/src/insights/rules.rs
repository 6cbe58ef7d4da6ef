//! Built-in insight rules
//!
//! Each rule inspects one slice of the analysis context and emits at most
//! one insight. Confidence is inherited from the contributing source so
//! the generator's floor check composes correctly.

use chrono::{Duration, Utc};

use crate::models::{
    AnomalyType, CorrelationStrength, Insight, InsightMetric, InsightType, Performance, Priority,
    Severity, TrendDirection,
};

use super::engine::{Rule, RuleContext};

/// Minimum r-squared for a trend to be worth reporting
pub const TREND_FIT_FLOOR: f64 = 0.6;

/// Anomaly-derived insights go stale quickly
const ANOMALY_TTL_DAYS: i64 = 2;
/// Trend and comparison insights describe slower-moving structure
const TREND_TTL_DAYS: i64 = 14;
const COMPARISON_TTL_DAYS: i64 = 14;
const RECOMMENDATION_TTL_DAYS: i64 = 7;

/// Confidence assigned to benchmark-derived insights; the comparison is
/// plain arithmetic, the uncertainty lives in the benchmark value itself
const BENCHMARK_CONFIDENCE: f64 = 0.9;

/// Surfaces the single worst high/critical anomaly of the series
pub struct AnomalyRule;

impl Rule for AnomalyRule {
    fn id(&self) -> &'static str {
        "anomaly"
    }

    fn evaluate(&self, ctx: &RuleContext<'_>) -> Option<Insight> {
        let worst = ctx
            .anomalies
            .iter()
            .filter(|a| a.severity.priority() >= Severity::High.priority())
            .max_by(|a, b| {
                a.severity
                    .priority()
                    .cmp(&b.severity.priority())
                    .then_with(|| {
                        a.confidence
                            .partial_cmp(&b.confidence)
                            .unwrap_or(std::cmp::Ordering::Equal)
                    })
            })?;

        let priority = match worst.severity {
            Severity::Critical => Priority::Critical,
            _ => Priority::Warning,
        };
        let title = match worst.anomaly_type {
            AnomalyType::Missing => format!("Data gap in {}", ctx.series.name),
            _ => format!(
                "{} anomaly in {}",
                capitalize(worst.severity.as_str()),
                ctx.series.name
            ),
        };

        let mut insight = Insight::new(
            format!("insight:anomaly:{}", ctx.series.id),
            InsightType::Anomaly,
            priority,
            title,
            worst.description.clone(),
            worst.confidence,
        )
        .with_related_series(ctx.series.id.clone())
        .with_expiry(Utc::now() + Duration::days(ANOMALY_TTL_DAYS));

        insight = insight.with_metric(InsightMetric {
            name: ctx.series.name.clone(),
            value: worst.value,
            change: Some(worst.deviation),
            trend: None,
        });
        if let Some(action) = &worst.suggested_action {
            insight = insight.with_action(action.clone());
        }
        Some(insight)
    }
}

/// Surfaces a directional trend with a good regression fit
pub struct TrendRule;

impl Rule for TrendRule {
    fn id(&self) -> &'static str {
        "trend"
    }

    fn evaluate(&self, ctx: &RuleContext<'_>) -> Option<Insight> {
        let trend = ctx.trend;
        let rising = match trend.direction {
            TrendDirection::Increasing => true,
            TrendDirection::Decreasing => false,
            _ => return None,
        };
        if trend.r_squared < TREND_FIT_FLOOR {
            return None;
        }

        // "Growth is good" is a simplifying default; cost-like metrics flip it
        let favorable = rising == ctx.config.growth_is_good;
        let priority = if favorable {
            Priority::Info
        } else {
            Priority::Warning
        };
        let verb = if rising { "increasing" } else { "decreasing" };

        let insight = Insight::new(
            format!("insight:trend:{}", ctx.series.id),
            InsightType::Trend,
            priority,
            format!("{} is {}", ctx.series.name, verb),
            format!(
                "{} is {} at {:.1}% per step (fit quality r\u{b2} = {:.2})",
                ctx.series.name,
                verb,
                trend.change_rate * 100.0,
                trend.r_squared
            ),
            trend.r_squared,
        )
        .with_related_series(ctx.series.id.clone())
        .with_metric(InsightMetric {
            name: format!("{} mean", ctx.series.name),
            value: ctx.stats.mean,
            change: Some(trend.change_rate * 100.0),
            trend: Some(trend.direction),
        })
        .with_expiry(Utc::now() + Duration::days(TREND_TTL_DAYS));

        Some(insight)
    }
}

/// Surfaces forecasts that cross a materially significant threshold
pub struct ForecastRule;

impl Rule for ForecastRule {
    fn id(&self) -> &'static str {
        "forecast"
    }

    fn evaluate(&self, ctx: &RuleContext<'_>) -> Option<Insight> {
        let last_value = *ctx.series.finite_values().last()?;
        let final_step = ctx.predictions.last()?;

        let crosses_zero = last_value > 0.0 && final_step.predicted_value < 0.0
            || last_value < 0.0 && final_step.predicted_value > 0.0;
        let interval_excludes_current =
            final_step.lower_bound > last_value || final_step.upper_bound < last_value;

        if !crosses_zero && !interval_excludes_current {
            return None;
        }

        let moving_up = final_step.predicted_value > last_value;
        let priority = if crosses_zero {
            Priority::Action
        } else if moving_up == ctx.config.growth_is_good {
            Priority::Info
        } else {
            Priority::Warning
        };

        let description = if crosses_zero {
            format!(
                "{} is projected to cross zero, reaching {:.2} by {} (currently {:.2})",
                ctx.series.name,
                final_step.predicted_value,
                final_step.target_date.format("%Y-%m-%d"),
                last_value
            )
        } else {
            format!(
                "{} is projected at {:.2} by {}, outside the expected range of today's {:.2}",
                ctx.series.name,
                final_step.predicted_value,
                final_step.target_date.format("%Y-%m-%d"),
                last_value
            )
        };

        let change = if last_value.abs() > f64::EPSILON {
            Some((final_step.predicted_value - last_value) / last_value.abs() * 100.0)
        } else {
            None
        };

        let insight = Insight::new(
            format!("insight:prediction:{}", ctx.series.id),
            InsightType::Prediction,
            priority,
            format!("{} forecast shift", ctx.series.name),
            description,
            final_step.confidence,
        )
        .with_related_series(ctx.series.id.clone())
        .with_metric(InsightMetric {
            name: format!("{} projected", ctx.series.name),
            value: final_step.predicted_value,
            change,
            trend: None,
        })
        .with_expiry(Utc::now() + Duration::days(ctx.predictions.len() as i64));

        Some(insight)
    }
}

/// Surfaces the strongest strong/very-strong correlation involving this series
pub struct CorrelationRule;

impl Rule for CorrelationRule {
    fn id(&self) -> &'static str {
        "correlation"
    }

    fn evaluate(&self, ctx: &RuleContext<'_>) -> Option<Insight> {
        let best = ctx
            .correlations
            .iter()
            .filter(|c| c.series1 == ctx.series.id || c.series2 == ctx.series.id)
            .filter(|c| c.strength >= CorrelationStrength::Strong)
            .max_by(|a, b| {
                a.coefficient
                    .abs()
                    .partial_cmp(&b.coefficient.abs())
                    .unwrap_or(std::cmp::Ordering::Equal)
            })?;

        let mut description = best.interpretation.clone();
        if let Some(hint) = &best.causality_hint {
            description.push_str(". ");
            description.push_str(hint);
        }

        let insight = Insight::new(
            format!("insight:comparison:{}", best.id),
            InsightType::Comparison,
            Priority::Info,
            format!("{} tracks {}", best.series1, best.series2),
            description,
            best.coefficient.abs(),
        )
        .with_related_series(best.series1.clone())
        .with_related_series(best.series2.clone())
        .with_metric(InsightMetric {
            name: "correlation coefficient".to_string(),
            value: best.coefficient,
            change: None,
            trend: None,
        })
        .with_expiry(Utc::now() + Duration::days(COMPARISON_TTL_DAYS));

        Some(insight)
    }
}

/// Surfaces the worst below/critical benchmark comparison
pub struct BenchmarkRule;

impl Rule for BenchmarkRule {
    fn id(&self) -> &'static str {
        "benchmark"
    }

    fn evaluate(&self, ctx: &RuleContext<'_>) -> Option<Insight> {
        let worst = ctx
            .benchmarks
            .iter()
            .filter(|b| matches!(b.performance, Performance::Below | Performance::Critical))
            .max_by(|a, b| {
                performance_rank(a.performance)
                    .cmp(&performance_rank(b.performance))
                    .then_with(|| {
                        a.gap
                            .abs()
                            .partial_cmp(&b.gap.abs())
                            .unwrap_or(std::cmp::Ordering::Equal)
                    })
            })?;

        let priority = match worst.performance {
            Performance::Critical => Priority::Action,
            _ => Priority::Warning,
        };

        let gap_text = match worst.gap_percent {
            Some(pct) => format!("{:.1}% away from", pct.abs()),
            None => "missing".to_string(),
        };

        let mut insight = Insight::new(
            format!("insight:recommendation:{}", worst.id),
            InsightType::Recommendation,
            priority,
            format!("{} is underperforming its benchmark", worst.metric),
            format!(
                "{} is at {:.2}, {} the {} benchmark of {:.2}",
                worst.metric,
                worst.current_value,
                gap_text,
                worst.source.as_str().replace('_', " "),
                worst.benchmark_value
            ),
            BENCHMARK_CONFIDENCE,
        )
        .with_metric(InsightMetric {
            name: worst.metric.clone(),
            value: worst.current_value,
            change: worst.gap_percent,
            trend: None,
        })
        .with_expiry(Utc::now() + Duration::days(RECOMMENDATION_TTL_DAYS));

        if let Some(recommendation) = &worst.recommendation {
            insight = insight.with_action(recommendation.clone());
        }
        Some(insight)
    }
}

fn performance_rank(performance: Performance) -> u8 {
    match performance {
        Performance::Exceeding => 0,
        Performance::Meeting => 1,
        Performance::Below => 2,
        Performance::Critical => 3,
    }
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}
