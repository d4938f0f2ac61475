//! Media pipeline error types.

use thiserror::Error;

use crate::storage::StorageError;

/// Errors from the profile image ingestion pipeline.
#[derive(Debug, Error)]
pub enum MediaError {
    /// Missing, empty, or unsupported upload payload. Rejected before any
    /// I/O happens.
    #[error("invalid upload: {0}")]
    Validation(String),

    /// The payload could not be decoded as an image.
    #[error("could not decode image: {0}")]
    Decode(String),

    /// The bounded search exhausted every parameter combination without
    /// reaching the size ceiling.
    #[error("could not compress image below {ceiling} bytes (best attempt: {achieved} bytes)")]
    Encoding {
        /// The size ceiling in bytes.
        ceiling: usize,
        /// The smallest result any attempt achieved, in bytes.
        achieved: usize,
    },

    /// Writing the encoded object to storage failed. No record was touched.
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),

    /// The profile record store failed. When this happens after a
    /// successful write, the new object is left orphaned.
    #[error("record store error: {0}")]
    Record(String),
}

impl MediaError {
    /// Create a validation error.
    #[must_use]
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Create a record store error.
    #[must_use]
    pub fn record(msg: impl Into<String>) -> Self {
        Self::Record(msg.into())
    }
}
