//! jsondb - a minimal embedded document store
//!
//! Tables hold JSON records validated against per-field schemas, mutated by
//! an ordered pipeline of transform steps and persisted as one JSON file.

pub mod persistence;
pub mod pipeline;
pub mod schema;
pub mod table;

/// Field name to value mapping of a record
pub type Fields = serde_json::Map<String, serde_json::Value>;

/// Error raised by user-supplied predicates and pipeline steps
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

pub use persistence::{JsonFileStore, MemoryStore, PersistenceError, RecordStore};
pub use pipeline::{step, Pipeline, PipelineError, Step};
pub use schema::{Column, FieldSchema, SchemaError, ValueKind};
pub use table::{Record, Table, TableConfig, TableError};
