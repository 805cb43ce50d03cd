// src/error.rs
use thiserror::Error;

// --- Error Handling ---
//
// Only the I/O adapters and configuration report errors. The reconciliation
// core degrades (drop, default, empty string) instead of failing.

#[derive(Error, Debug)]
pub enum AppError {
    #[error("File I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("CSV read/write failed: {0}")]
    Csv(#[from] csv::Error),
    #[error("JSON serialization failed: {0}")]
    SerdeJson(#[from] serde_json::Error),
    #[error("Invalid configuration: {0}")]
    Config(#[from] envy::Error),
    #[error("Missing required column '{0}'")]
    MissingColumn(String),
    #[error("Unsupported punch log format: {0} (expected .dat, .txt or .csv)")]
    UnsupportedFormat(String),
    #[error("Invalid reporting period {year}-{month:02}")]
    InvalidPeriod { year: i32, month: u32 },
    #[error("Invalid attendance policy: {0}")]
    InvalidPolicy(String),
    #[error("Invalid time of day '{0}' (expected HH:MM or HH:MM:SS)")]
    InvalidTime(String),
}
