//! JSON file store.
//!
//! ## File Format
//!
//! ```json
//! {
//!   "version": "1",
//!   "entries": [
//!     { "address": "10.0.0.0/8", "created_at": "2024-06-15" },
//!     { "address": "192.0.2.7", "comment": "imported" }
//!   ]
//! }
//! ```
//!
//! Writes go through [`FileSystem::write_atomic`], so a crash or a failed
//! write never leaves a half-written file behind. A missing file loads as
//! an empty store; a corrupt one is an error, never silently reset.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use super::BlocklistStore;
use crate::entry::{Entry, EntrySet, StoreSnapshot};
use crate::error::{AutoblockError, Result};
use crate::fs_abstraction::{FileSystem, RealFileSystem};

/// Store file format version
const STORE_FILE_VERSION: &str = "1";

#[derive(Debug, Serialize, Deserialize)]
struct StoreFile {
    version: String,
    entries: Vec<Entry>,
}

/// Serialize a set in the store file format
pub(crate) fn render_store_file(set: &EntrySet) -> Result<String> {
    let file = StoreFile {
        version: STORE_FILE_VERSION.to_string(),
        entries: set.iter().cloned().collect(),
    };
    serde_json::to_string_pretty(&file).map_err(|e| AutoblockError::StoreFormat(e.to_string()))
}

pub struct JsonFileStore<F: FileSystem = RealFileSystem> {
    path: PathBuf,
    fs: F,
}

impl JsonFileStore<RealFileSystem> {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self::with_fs(path, RealFileSystem)
    }
}

impl<F: FileSystem> JsonFileStore<F> {
    pub fn with_fs(path: impl Into<PathBuf>, fs: F) -> Self {
        Self {
            path: path.into(),
            fs,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl<F: FileSystem> BlocklistStore for JsonFileStore<F> {
    fn location(&self) -> String {
        self.path.display().to_string()
    }

    fn load(&self) -> Result<StoreSnapshot> {
        if !self.fs.exists(&self.path) {
            debug!("Store file {:?} does not exist yet, starting empty", self.path);
            return Ok(StoreSnapshot::new());
        }

        let content = self
            .fs
            .read_to_string(&self.path)
            .map_err(|e| AutoblockError::store_io(&self.path, e))?;

        let file: StoreFile = serde_json::from_str(&content).map_err(|e| {
            AutoblockError::StoreFormat(format!("{}: {}", self.path.display(), e))
        })?;

        if file.version != STORE_FILE_VERSION {
            return Err(AutoblockError::StoreFormat(format!(
                "{}: unsupported version '{}' (expected '{}')",
                self.path.display(),
                file.version,
                STORE_FILE_VERSION
            )));
        }

        let total = file.entries.len();
        let snapshot: StoreSnapshot = file.entries.into_iter().collect();
        if snapshot.len() != total {
            warn!(
                "Store file {:?} held {} duplicate address(es), keeping the first of each",
                self.path,
                total - snapshot.len()
            );
        }

        Ok(snapshot)
    }

    fn replace(&self, final_set: &EntrySet) -> Result<()> {
        let content = render_store_file(final_set)?;

        self.fs
            .write_atomic(&self.path, content.as_bytes())
            .map_err(|e| AutoblockError::store_io(&self.path, e))?;

        debug!("Wrote {} entries to {:?}", final_set.len(), self.path);
        Ok(())
    }
}
