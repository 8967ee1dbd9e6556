//! Scheduler error types

use chrono::{DateTime, Utc};
use thiserror::Error;

/// Errors that can occur while configuring or driving the scheduler
#[derive(Debug, Error)]
pub enum SchedulerError {
    #[error("Invalid rating: {0} (expected 1-4 or again/hard/good/easy)")]
    InvalidRating(i64),

    #[error("Invalid rating name: {0}")]
    InvalidRatingName(String),

    #[error("Requested retention must be in (0, 1], got {0}")]
    InvalidRetention(f64),

    #[error("Maximum interval must be at least 1 day, got {0}")]
    InvalidMaximumInterval(u32),

    #[error("Weight w[{index}] must be a finite non-negative number, got {value}")]
    InvalidWeight { index: usize, value: f64 },

    #[error("Invalid learning step '{0}' (expected e.g. 1m, 10m, 1h, 1d)")]
    InvalidStep(String),

    #[error("Review log does not match card: card last reviewed {card:?}, log reviewed at {log}")]
    RollbackMismatch {
        card: Option<DateTime<Utc>>,
        log: DateTime<Utc>,
    },

    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("TOML serialization error: {0}")]
    TomlSer(#[from] toml::ser::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for scheduler operations
pub type Result<T> = std::result::Result<T, SchedulerError>;
