//! Persisted document format
//!
//! A single JSON object with exactly one key, the table name, mapping to the
//! ordered array of records. Each record is its field map plus an integer `id`:
//!
//! ```json
//! {"users":[{"id":0,"name":"Ada"},{"id":2,"name":"Grace"}]}
//! ```

use std::collections::HashSet;

use serde_json::{Map, Value};

use super::errors::{PersistenceError, PersistenceResult};
use crate::table::Record;

/// Serializes `records` under the root key `table`
pub fn encode(table: &str, records: &[Record]) -> PersistenceResult<Vec<u8>> {
    let encode_err = |e: serde_json::Error| PersistenceError::Encode {
        table: table.to_string(),
        message: e.to_string(),
    };

    let mut root = Map::new();
    root.insert(table.to_string(), serde_json::to_value(records).map_err(encode_err)?);
    serde_json::to_vec(&Value::Object(root)).map_err(encode_err)
}

/// Parses a document written by [`encode`] for `table`.
///
/// # Errors
///
/// - `Decode` if the bytes are not a single-key object holding an array of records
/// - `RootKeyMismatch` if the root key is not `table`
/// - `DuplicateId` if two records share an id
pub fn decode(table: &str, bytes: &[u8]) -> PersistenceResult<Vec<Record>> {
    let decode_err = |message: String| PersistenceError::Decode {
        table: table.to_string(),
        message,
    };

    let root: Value = serde_json::from_slice(bytes).map_err(|e| decode_err(e.to_string()))?;
    let Value::Object(mut root) = root else {
        return Err(decode_err("document root is not an object".into()));
    };

    if root.len() != 1 {
        return Err(decode_err(format!(
            "document must have exactly one root key, found {}",
            root.len()
        )));
    }

    let rows = match root.remove(table) {
        Some(rows) => rows,
        None => {
            let found = root.keys().next().cloned().unwrap_or_default();
            return Err(PersistenceError::RootKeyMismatch {
                expected: table.to_string(),
                found,
            });
        }
    };

    let records: Vec<Record> =
        serde_json::from_value(rows).map_err(|e| decode_err(e.to_string()))?;

    let mut seen = HashSet::with_capacity(records.len());
    for record in &records {
        if !seen.insert(record.id) {
            return Err(PersistenceError::DuplicateId(record.id));
        }
    }

    Ok(records)
}
