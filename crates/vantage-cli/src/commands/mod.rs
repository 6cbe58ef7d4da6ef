//! CLI command implementations
//!
//! Commands are organized by domain:
//! - `analyze` - Full pipeline command (anomalies, forecasts, correlations, insights)
//! - `load` - CSV series loading shared by all commands
//! - `stats` - Descriptive statistics command

pub mod analyze;
pub mod load;
pub mod stats;

// Re-export command functions for main.rs
pub use analyze::*;
pub use load::*;
pub use stats::*;
