//! Error types for Skirmish.

use thiserror::Error;

/// Top-level error type for Skirmish operations.
///
/// The simulation itself never fails mid-tick; these errors only surface at
/// the persistence edge.
#[derive(Debug, Error)]
pub enum SkirmishError {
    /// Persistence errors
    #[error("Storage error: {0}")]
    Storage(#[from] StoreError),
}

/// Key/value persistence errors.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Backing medium could not be read or written
    #[error("store I/O failed for key '{key}': {source}")]
    Io {
        /// Key being accessed
        key: String,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },

    /// Stored value could not be encoded or decoded
    #[error("serialization failed for key '{key}': {source}")]
    Serialization {
        /// Key being accessed
        key: String,
        /// Underlying error
        #[source]
        source: serde_json::Error,
    },

    /// Key contains characters the store cannot represent
    #[error("invalid store key: {0}")]
    InvalidKey(String),
}

/// Result type alias for Skirmish operations.
pub type SkirmishResult<T> = Result<T, SkirmishError>;

/// Result type alias for key/value store operations.
pub type StoreResult<T> = Result<T, StoreError>;
