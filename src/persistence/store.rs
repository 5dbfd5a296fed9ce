//! Record stores
//!
//! A store moves the encoded table document to and from durable storage.
//! Writes are whole-document replacements.

use std::fs::{self, File, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use super::errors::{PersistenceError, PersistenceResult};

/// Destination for a table's encoded document
pub trait RecordStore: Send + Sync {
    /// Reads the stored document. `None` means nothing was stored yet.
    fn read(&self) -> PersistenceResult<Option<Vec<u8>>>;

    /// Replaces the stored document
    fn write(&self, document: &[u8]) -> PersistenceResult<()>;

    /// Human-readable location, used in logs
    fn describe(&self) -> String;
}

/// Stores the document in a single JSON file.
///
/// Writes go to a temporary sibling file that is fsynced and then renamed
/// over the target, so readers never observe a half-written document.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
    temp_path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let mut temp_name = path
            .file_name()
            .map(|name| name.to_os_string())
            .unwrap_or_default();
        temp_name.push(".tmp");
        let temp_path = path.with_file_name(temp_name);
        Self { path, temp_path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn io_err(&self, e: std::io::Error) -> PersistenceError {
        PersistenceError::io(self.path.display().to_string(), e)
    }

    /// Writes `document` to the temp file and renames it over the target
    fn replace_with_temp(&self, document: &[u8]) -> PersistenceResult<()> {
        let mut file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(&self.temp_path)
            .map_err(|e| self.io_err(e))?;

        file.write_all(document).map_err(|e| self.io_err(e))?;
        file.sync_all().map_err(|e| self.io_err(e))?;

        fs::rename(&self.temp_path, &self.path).map_err(|e| self.io_err(e))
    }
}

impl RecordStore for JsonFileStore {
    fn read(&self) -> PersistenceResult<Option<Vec<u8>>> {
        match fs::read(&self.path) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(self.io_err(e)),
        }
    }

    fn write(&self, document: &[u8]) -> PersistenceResult<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| self.io_err(e))?;
        }

        if let Err(e) = self.replace_with_temp(document) {
            // clean up temp file if it exists
            if self.temp_path.exists() {
                let _ = fs::remove_file(&self.temp_path);
            }
            return Err(e);
        }

        // make the rename itself durable
        if let Some(parent) = self.path.parent() {
            if let Ok(dir) = File::open(parent) {
                let _ = dir.sync_all();
            }
        }

        Ok(())
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}

/// Keeps the document in memory. Clones share the same buffer.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    document: Arc<Mutex<Option<Vec<u8>>>>,
    writes: Arc<Mutex<usize>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current document, if any
    pub fn contents(&self) -> Option<Vec<u8>> {
        self.document.lock().ok().and_then(|doc| doc.clone())
    }

    /// Number of successful writes so far
    pub fn write_count(&self) -> usize {
        self.writes.lock().map(|count| *count).unwrap_or(0)
    }

    fn poisoned(&self) -> PersistenceError {
        PersistenceError::Io {
            target: self.describe(),
            message: "memory store lock poisoned".into(),
        }
    }
}

impl RecordStore for MemoryStore {
    fn read(&self) -> PersistenceResult<Option<Vec<u8>>> {
        Ok(self.contents())
    }

    fn write(&self, document: &[u8]) -> PersistenceResult<()> {
        *self.document.lock().map_err(|_| self.poisoned())? = Some(document.to_vec());
        *self.writes.lock().map_err(|_| self.poisoned())? += 1;
        Ok(())
    }

    fn describe(&self) -> String {
        "<memory>".to_string()
    }
}
