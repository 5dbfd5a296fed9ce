//! Schema error types
//!
//! Error codes:
//! - JSONDB_PREDICATE_FAILURE (a predicate raised instead of answering)
//! - JSONDB_CONSTRUCTION_INVALID (substitute fails its own schema, never suppressible)

use std::fmt;

use thiserror::Error;

use super::types::ValueKind;

/// Why a value was turned away by a schema.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rejection {
    /// The value's kind disagrees with the schema's kind
    Shape {
        /// Kind the schema requires
        expected: ValueKind,
        /// Kind name of the candidate ("null" for values without a kind)
        actual: &'static str,
    },
    /// Predicate at `index` answered false, or raised while suppressed
    Predicate {
        /// Position in the schema's predicate list
        index: usize,
    },
}

impl Rejection {
    /// Returns the string code for this rejection
    pub fn code(&self) -> &'static str {
        match self {
            Rejection::Shape { .. } => "JSONDB_SHAPE_MISMATCH",
            Rejection::Predicate { .. } => "JSONDB_PREDICATE_REJECTED",
        }
    }
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Rejection::Shape { expected, actual } => {
                write!(f, "expected {}, got {}", expected, actual)
            }
            Rejection::Predicate { index } => write!(f, "predicate #{} rejected the value", index),
        }
    }
}

/// Schema errors
#[derive(Debug, Clone, Error)]
pub enum SchemaError {
    #[error("predicate #{index} failed: {message}")]
    PredicateFailure { index: usize, message: String },

    #[error("substitute {value} is not a valid {kind} for this schema")]
    ConstructionInvalid { kind: ValueKind, value: String },
}

impl SchemaError {
    /// Returns the string code for this error
    pub fn code(&self) -> &'static str {
        match self {
            SchemaError::PredicateFailure { .. } => "JSONDB_PREDICATE_FAILURE",
            SchemaError::ConstructionInvalid { .. } => "JSONDB_CONSTRUCTION_INVALID",
        }
    }

    /// Index of the predicate that raised, if this is a predicate failure
    pub fn predicate_index(&self) -> Option<usize> {
        match self {
            SchemaError::PredicateFailure { index, .. } => Some(*index),
            SchemaError::ConstructionInvalid { .. } => None,
        }
    }
}

/// Result type for schema operations
pub type SchemaResult<T> = Result<T, SchemaError>;
