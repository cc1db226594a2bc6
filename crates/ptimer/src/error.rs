//! Error types for timer construction.

use thiserror::Error;

/// Errors that can occur while configuring a [`Timer`](crate::Timer).
///
/// Entering and leaving a timed scope never fails, so every variant here is
/// raised before any measurement starts.
#[derive(Debug, Error)]
pub enum TimerError {
    /// The requested formatter name is not one of the built-ins
    #[error("Unknown format name: {0} (expected time_fmt_ms, time_fmt_s or time_fmt_m)")]
    UnknownFormat(String),

    /// Failed to parse a timer configuration
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type for timer configuration.
pub type TimerResult<T> = Result<T, TimerError>;
