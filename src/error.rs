//! Error types for moodscope

use thiserror::Error;

/// Errors that can occur during computation
///
/// Malformed records never surface here: they are dropped during
/// normalization and reported as [`crate::normalizer::RejectedRow`] values.
/// This enum covers input parsing, store plumbing and CLI wiring.
#[derive(Debug, Error)]
pub enum ComputeError {
    #[error("Failed to parse input rows: {0}")]
    ParseError(String),

    #[error("Invalid JSON: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Invalid timestamp: {0}")]
    BadTimestamp(String),

    #[error("Record source unavailable: {0}")]
    SourceUnavailable(String),

    #[error("Unknown record id: {0}")]
    UnknownRecord(String),

    #[error("Invalid window specification: {0}")]
    InvalidWindow(String),
}
