//! Table error types
//!
//! Rejections (`MissingField`, `InvalidField`, `NotAnObject`) are the
//! failures a table downgrades to `false` when it suppresses errors. The
//! wrapped schema, pipeline and persistence errors follow their own
//! component's policy.

use thiserror::Error;

use crate::persistence::PersistenceError;
use crate::pipeline::PipelineError;
use crate::schema::{Rejection, SchemaError};

/// Result type for table operations
pub type TableResult<T> = Result<T, TableError>;

/// Table errors
#[derive(Debug, Clone, Error)]
pub enum TableError {
    #[error("table '{table}': record is missing field '{field}'")]
    MissingField { table: String, field: String },

    #[error("table '{table}': field '{field}' rejected: {rejection}")]
    InvalidField {
        table: String,
        field: String,
        rejection: Rejection,
    },

    #[error("table '{table}': record must be an object, got {actual}")]
    NotAnObject { table: String, actual: &'static str },

    #[error("table '{table}': column '{column}' declared twice")]
    DuplicateColumn { table: String, column: String },

    #[error("table '{table}': column name '{column}' is reserved for record identity")]
    ReservedColumn { table: String, column: String },

    #[error("table '{table}': record ids are exhausted")]
    IdsExhausted { table: String },

    #[error("invalid table config: {0}")]
    InvalidConfig(String),

    #[error(transparent)]
    Schema(#[from] SchemaError),

    #[error(transparent)]
    Pipeline(#[from] PipelineError),

    #[error(transparent)]
    Persistence(#[from] PersistenceError),
}

impl TableError {
    /// Returns the string code for this error
    pub fn code(&self) -> &'static str {
        match self {
            Self::MissingField { .. } => "JSONDB_MISSING_FIELD",
            Self::InvalidField { rejection, .. } => rejection.code(),
            Self::NotAnObject { .. } => "JSONDB_NOT_AN_OBJECT",
            Self::DuplicateColumn { .. } => "JSONDB_DUPLICATE_COLUMN",
            Self::ReservedColumn { .. } => "JSONDB_RESERVED_COLUMN",
            Self::IdsExhausted { .. } => "JSONDB_IDS_EXHAUSTED",
            Self::InvalidConfig(_) => "JSONDB_INVALID_CONFIG",
            Self::Schema(e) => e.code(),
            Self::Pipeline(e) => e.code(),
            Self::Persistence(e) => e.code(),
        }
    }

    /// True for a record that simply did not fit the table's shape
    pub fn is_rejection(&self) -> bool {
        matches!(
            self,
            Self::MissingField { .. } | Self::InvalidField { .. } | Self::NotAnObject { .. }
        )
    }
}
