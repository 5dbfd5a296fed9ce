//! Table persistence
//!
//! Tables persist as one JSON document keyed by the table's name. The
//! document codec lives in [`document`]; where the bytes go is decided by a
//! [`RecordStore`].
//!
//! Every operation returns a result. Tables log failures of automatic saves
//! and keep the last one for inspection; they never abort a mutation.

pub mod document;
mod errors;
mod store;

pub use errors::{PersistenceError, PersistenceResult};
pub use store::{JsonFileStore, MemoryStore, RecordStore};
