//! Error types for FlintKV
//!
//! Provides a unified error type for all operations.

use thiserror::Error;

/// Result type alias using FlintError
pub type Result<T> = std::result::Result<T, FlintError>;

/// Unified error type for FlintKV operations
#[derive(Debug, Error)]
pub enum FlintError {
    // -------------------------------------------------------------------------
    // I/O Errors
    // -------------------------------------------------------------------------
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // -------------------------------------------------------------------------
    // Log Errors
    // -------------------------------------------------------------------------
    /// The log could not be parsed as a strict sequence of records:
    /// either a record was truncated before end-of-log, or its kind
    /// byte is unrecognized. Never retried; the offset is the start of
    /// the record that failed to decode.
    #[error("corrupt record at offset {offset}: {reason}")]
    Corrupt { offset: u64, reason: String },

    // -------------------------------------------------------------------------
    // Lookup Errors
    // -------------------------------------------------------------------------
    /// A normal, recoverable condition — not a system fault.
    #[error("key not found")]
    KeyNotFound,
}

impl FlintError {
    /// Build a corrupt-record error for the record starting at `offset`
    pub fn corrupt(offset: u64, reason: impl Into<String>) -> Self {
        FlintError::Corrupt {
            offset,
            reason: reason.into(),
        }
    }
}
