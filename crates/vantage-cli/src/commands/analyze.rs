//! Full pipeline command

use std::path::Path;

use anyhow::{Context, Result};
use chrono::Utc;
use tracing::info;

use vantage_core::{
    AnalysisConfig, AnalysisResult, Analyzer, ExecutiveSummaryBuilder, Period, Priority,
};

use super::load_series;

#[allow(clippy::too_many_arguments)]
pub fn cmd_analyze(
    file: &Path,
    threshold: Option<f64>,
    horizon: Option<u32>,
    max_lag: Option<u32>,
    shrinking_is_good: bool,
    json: bool,
    summary: bool,
) -> Result<()> {
    let loaded = load_series(file)?;

    let mut config = AnalysisConfig::default();
    if let Some(threshold) = threshold {
        config.anomaly_threshold = threshold;
    }
    if let Some(horizon) = horizon {
        config.prediction_horizon = horizon;
    }
    config.correlation_max_lag = max_lag;
    if shrinking_is_good {
        config.growth_is_good = false;
    }

    info!(series = loaded.len(), file = %file.display(), "Running analysis");
    let mut result = Analyzer::new(config).analyze(&loaded)?;

    if summary {
        let start = loaded
            .iter()
            .filter_map(|s| s.data.first().map(|p| p.timestamp))
            .min()
            .unwrap_or_else(Utc::now);
        let end = loaded
            .iter()
            .filter_map(|s| s.data.last().map(|p| p.timestamp))
            .max()
            .unwrap_or_else(Utc::now);
        let report = ExecutiveSummaryBuilder::new().build(&result, Period { start, end });
        result.summary = Some(report);
    }

    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(&result).context("Cannot serialize result")?
        );
        return Ok(());
    }

    print_report(&result);
    Ok(())
}

fn print_report(result: &AnalysisResult) {
    println!();
    println!("🔭 Vantage Analysis");
    println!("   ─────────────────────────────────────────────────────────────");

    for series in &result.series {
        let Some(stats) = result.stats.get(&series.id) else {
            continue;
        };
        print!(
            "   {} · {} points · mean {:.2}",
            series.name, stats.count, stats.mean
        );
        if let Some(trend) = result.trends.get(&series.id) {
            print!(" · {}", trend.direction);
            if let Some(s) = trend.seasonality.as_ref().filter(|s| s.detected) {
                print!(" · seasonal (period {})", s.period);
            }
        }
        println!();
    }

    if !result.anomalies.is_empty() {
        println!();
        println!("   ⚠️  Anomalies ({})", result.anomalies.len());
        for anomaly in &result.anomalies {
            println!(
                "      [{}] {} {} @ {}: {}",
                anomaly.severity,
                anomaly.series_id,
                anomaly.anomaly_type,
                anomaly.timestamp.format("%Y-%m-%d"),
                anomaly.description
            );
        }
    }

    if !result.predictions.is_empty() {
        println!();
        println!("   🔮 Forecast ({} steps)", result.predictions.len());
        // One line per series: the final step tells the story
        let mut last_per_series: Vec<&vantage_core::Prediction> = Vec::new();
        for p in &result.predictions {
            match last_per_series.iter_mut().find(|l| l.series_id == p.series_id) {
                Some(slot) => *slot = p,
                None => last_per_series.push(p),
            }
        }
        for p in last_per_series {
            println!(
                "      {} → {:.2} [{:.2}, {:.2}] by {} ({} model, confidence {:.0}%)",
                p.series_id,
                p.predicted_value,
                p.lower_bound,
                p.upper_bound,
                p.target_date.format("%Y-%m-%d"),
                p.model,
                p.confidence * 100.0
            );
        }
    }

    if !result.correlations.is_empty() {
        println!();
        println!("   🔗 Correlations ({})", result.correlations.len());
        for c in &result.correlations {
            println!("      {}", c.interpretation);
            if let Some(hint) = &c.causality_hint {
                println!("         {}", hint);
            }
        }
    }

    if !result.insights.is_empty() {
        println!();
        println!("   💡 Insights ({})", result.insights.len());
        for insight in &result.insights {
            println!(
                "      {} [{}] {}",
                priority_icon(insight.priority),
                insight.priority,
                insight.title
            );
            println!("         {}", insight.description);
            for action in &insight.actions {
                println!("         → {}", action);
            }
        }
    }

    if !result.errors.is_empty() {
        println!();
        println!("   ❌ Skipped ({})", result.errors.len());
        for error in &result.errors {
            println!("      {}: {}", error.series_id, error.error);
        }
    }

    if let Some(report) = &result.summary {
        println!();
        println!("   📋 Executive Summary");
        println!(
            "      Period: {} – {}",
            report.period.start.format("%Y-%m-%d"),
            report.period.end.format("%Y-%m-%d")
        );
        for highlight in &report.highlights {
            println!("      • {}", highlight);
        }
        if !report.risks.is_empty() {
            println!("      Risks:");
            for risk in &report.risks {
                println!("        - {}", risk);
            }
        }
        if !report.opportunities.is_empty() {
            println!("      Opportunities:");
            for opportunity in &report.opportunities {
                println!("        - {}", opportunity);
            }
        }
        if !report.recommendations.is_empty() {
            println!("      Recommendations:");
            for recommendation in &report.recommendations {
                println!("        - {}", recommendation);
            }
        }
    }

    println!();
}

fn priority_icon(priority: Priority) -> &'static str {
    match priority {
        Priority::Critical => "🚨",
        Priority::Action => "🔴",
        Priority::Warning => "🟡",
        Priority::Info => "🔵",
    }
}
