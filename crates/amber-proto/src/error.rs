//! Error types for the AMBER wire protocol.

use thiserror::Error;

/// Top-level protocol errors
#[derive(Debug, Error)]
pub enum ProtocolError {
    /// Frame codec error
    #[error("frame error: {0}")]
    Frame(#[from] FrameError),

    /// Record validation error
    #[error("validation error: {0}")]
    Validation(#[from] ValidationError),

    /// Canonical serialization or parse error
    #[error("serialization error: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Frame-level errors
#[derive(Debug, Error)]
pub enum FrameError {
    /// Chunk size must be at least one byte
    #[error("invalid chunk size: {0}")]
    InvalidChunkSize(usize),

    /// Frame too short to parse
    #[error("frame too short: expected at least {expected}, got {actual}")]
    TooShort {
        /// Expected minimum size
        expected: usize,
        /// Actual size received
        actual: usize,
    },

    /// Chunk count does not fit the 16-bit total field
    #[error("payload splits into {0} chunks, exceeding the 16-bit header field")]
    TooManyChunks(usize),
}

/// Record validation errors
#[derive(Debug, Error)]
pub enum ValidationError {
    /// Severity label outside the fixed set
    #[error("invalid severity '{0}', must be one of: Extreme, Severe, Moderate, Minor, Unknown")]
    InvalidSeverity(String),

    /// Required text field empty after trimming
    #[error("{0} must not be empty")]
    EmptyField(&'static str),

    /// Timestamp field not a positive unix time
    #[error("{field} must be a positive unix timestamp, got {value}")]
    NonPositiveTimestamp {
        /// Offending field name, in wire spelling
        field: &'static str,
        /// Rejected value
        value: i64,
    },

    /// Unparseable timestamp input
    #[error("invalid timestamp '{0}', expected unix seconds or ISO-8601")]
    InvalidTimestamp(String),
}
