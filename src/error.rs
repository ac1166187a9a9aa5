//! Error types for autoblock.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AutoblockError {
    #[error("Invalid policy: {0}")]
    Validation(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Backup failed: {0}")]
    Backup(String),

    #[error("Store I/O error on {path:?}: {source}")]
    StoreIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Store format error: {0}")]
    StoreFormat(String),

    #[error("Network error: {0}")]
    Network(String),
}

impl AutoblockError {
    /// Wrap an I/O failure on the store's backing path
    pub fn store_io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::StoreIo {
            path: path.into(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, AutoblockError>;
