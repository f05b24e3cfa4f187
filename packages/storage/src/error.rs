//! Error types for storage

use thiserror::Error;

/// Failure of the backing key-value medium
#[derive(Error, Debug)]
pub enum MediumError {
    #[error("Quota exceeded: {needed} bytes needed, limit is {limit}")]
    QuotaExceeded { needed: usize, limit: usize },

    #[error("Medium unavailable: {0}")]
    Unavailable(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Non-fatal persistence failure.
///
/// Callers log and drop these: edits keep living in memory for the rest of
/// the session.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Storage medium error: {0}")]
    Medium(#[from] MediumError),

    #[error("Serialization error: {0}")]
    Serialize(#[from] serde_json::Error),
}
