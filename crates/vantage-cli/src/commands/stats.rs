//! Descriptive statistics command

use std::path::Path;

use anyhow::{bail, Result};

use vantage_core::stats;

use super::load_series;

pub fn cmd_stats(file: &Path, only_series: Option<&str>) -> Result<()> {
    let loaded = load_series(file)?;

    if let Some(id) = only_series {
        if !loaded.iter().any(|s| s.id == id) {
            bail!("Series '{}' not found in {}", id, file.display());
        }
    }

    for series in loaded
        .iter()
        .filter(|s| only_series.map_or(true, |id| s.id == id))
    {
        println!();
        println!("📈 {}", series.name);
        println!("   ─────────────────────────────────────────────");

        match stats::describe(&series.finite_values()) {
            Ok(s) => {
                println!("   Points: {}", s.count);
                println!("   Min / Max: {:.2} / {:.2}", s.min, s.max);
                println!("   Mean: {:.2}", s.mean);
                println!("   Median: {:.2}", s.median);
                println!("   Std dev: {:.2}", s.std_dev);
                println!("   Skewness: {:.3}", s.skewness);
                println!("   Kurtosis: {:.3}", s.kurtosis);
                println!(
                    "   Percentiles: p25={:.2} p50={:.2} p75={:.2} p90={:.2} p95={:.2} p99={:.2}",
                    s.percentiles.p25,
                    s.percentiles.p50,
                    s.percentiles.p75,
                    s.percentiles.p90,
                    s.percentiles.p95,
                    s.percentiles.p99
                );
            }
            Err(e) => println!("   ⚠️  {}", e),
        }
    }
    println!();

    Ok(())
}
