//! Tables
//!
//! A table owns its columns, its mutation pipeline, an identity counter and
//! the in-memory records.
//!
//! Insert flow: pipeline → substitutes → per-column validation → id
//! assignment → append → save (when `auto_persist` and a store is attached).
//!
//! # Design Principles
//!
//! - Ids are assigned by the table and never reused
//! - A rejected record leaves the table untouched
//! - Columns are a subset constraint: unschemed fields are kept
//! - One owner at a time; all mutation takes `&mut self`

mod collection;
mod config;
mod errors;
mod record;

pub use collection::{Table, TableBuilder};
pub use config::TableConfig;
pub use errors::{TableError, TableResult};
pub use record::{Record, ID_FIELD};
