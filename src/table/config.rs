//! Table Configuration
//!
//! Every suppression switch is set per table here; nothing is global.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use super::errors::{TableError, TableResult};

/// Table configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableConfig {
    /// Turn rejected inserts into `false` instead of errors (default: false)
    #[serde(default)]
    pub suppress_errors: bool,

    /// Save after every mutation when a store is attached (default: true)
    #[serde(default = "default_auto_persist")]
    pub auto_persist: bool,

    /// JSON file to persist to (default: none, in-memory only)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_file: Option<PathBuf>,
}

fn default_auto_persist() -> bool {
    true
}

impl Default for TableConfig {
    fn default() -> Self {
        Self {
            suppress_errors: false,
            auto_persist: default_auto_persist(),
            data_file: None,
        }
    }
}

impl TableConfig {
    /// Config persisting to `path`
    pub fn with_data_file(path: impl Into<PathBuf>) -> Self {
        Self {
            data_file: Some(path.into()),
            ..Default::default()
        }
    }

    /// Parses a config from JSON; absent keys take their defaults
    pub fn from_json_str(json: &str) -> TableResult<Self> {
        serde_json::from_str(json).map_err(|e| TableError::InvalidConfig(e.to_string()))
    }
}
