//! Field schemas and columns
//!
//! A schema is the validation contract for one semantic field: a required
//! value kind, ordered predicates and an optional substitute. Columns bind a
//! shared schema to a field name inside a table.
//!
//! # Design Principles
//!
//! - Kinds are a closed enum, predicates an open ordered list
//! - Arrays are never accepted as objects
//! - A schema with an invalid substitute cannot be constructed
//! - Suppression is an explicit per-component setting

mod column;
mod errors;
mod types;
mod validator;

pub use column::{Column, FieldCheck};
pub use errors::{Rejection, SchemaError, SchemaResult};
pub use types::{kind_name, FieldSchema, FieldSchemaBuilder, Predicate, ValueKind};
pub use validator::Verdict;
