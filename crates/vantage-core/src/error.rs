//! Error types for Vantage

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Insufficient data: {0}")]
    InsufficientData(String),

    #[error("Invalid config: {0}")]
    InvalidConfig(String),

    #[error("Invalid horizon: {0}")]
    InvalidHorizon(i64),

    #[error("Cannot correlate a series with itself: {0}")]
    IdenticalSeries(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
