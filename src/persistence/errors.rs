//! Persistence error types

use thiserror::Error;

/// Result type for persistence operations
pub type PersistenceResult<T> = Result<T, PersistenceError>;

/// Persistence errors
#[derive(Debug, Clone, Error)]
pub enum PersistenceError {
    #[error("I/O error on {target}: {message}")]
    Io { target: String, message: String },

    #[error("failed to encode table '{table}': {message}")]
    Encode { table: String, message: String },

    #[error("failed to decode table '{table}': {message}")]
    Decode { table: String, message: String },

    #[error("document root key mismatch: expected '{expected}', found '{found}'")]
    RootKeyMismatch { expected: String, found: String },

    #[error("stored record {id} is invalid: {reason}")]
    InvalidRecord { id: u64, reason: String },

    #[error("stored record id {0} appears more than once")]
    DuplicateId(u64),

    #[error("table '{0}' has no record store attached")]
    NoStore(String),
}

impl PersistenceError {
    pub fn io(target: impl Into<String>, err: std::io::Error) -> Self {
        Self::Io {
            target: target.into(),
            message: err.to_string(),
        }
    }

    /// Returns the string code for this error
    pub fn code(&self) -> &'static str {
        match self {
            Self::Io { .. } => "JSONDB_PERSISTENCE_IO",
            Self::Encode { .. } => "JSONDB_PERSISTENCE_ENCODE",
            Self::Decode { .. } => "JSONDB_PERSISTENCE_DECODE",
            Self::RootKeyMismatch { .. } => "JSONDB_PERSISTENCE_ROOT_KEY",
            Self::InvalidRecord { .. } => "JSONDB_PERSISTENCE_INVALID_RECORD",
            Self::DuplicateId(_) => "JSONDB_PERSISTENCE_DUPLICATE_ID",
            Self::NoStore(_) => "JSONDB_PERSISTENCE_NO_STORE",
        }
    }
}
