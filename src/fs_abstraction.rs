//! Filesystem abstraction layer for testability
//!
//! This module provides a trait-based abstraction over the filesystem
//! operations autoblock performs: reading source lists, loading and
//! atomically replacing the store file, and writing backups.
//! Uses mockall for automatic mock generation in test builds.

use std::io::{self, Write};
use std::path::Path;

#[cfg(test)]
use mockall::automock;

/// Trait abstracting filesystem operations for dependency injection.
///
/// # Example (production)
/// ```ignore
/// use autoblock::fs_abstraction::{FileSystem, real_fs};
///
/// let content = real_fs().read_to_string(Path::new("/etc/autoblock/local.txt"))?;
/// ```
///
/// # Example (testing)
/// ```ignore
/// use autoblock::fs_abstraction::MockFileSystem;
///
/// let mut mock_fs = MockFileSystem::new();
/// mock_fs.expect_read()
///     .returning(|_| Ok(b"10.0.0.1\n".to_vec()));
/// ```
#[cfg_attr(test, automock)]
pub trait FileSystem: Send + Sync {
    /// Read file contents as a string.
    fn read_to_string(&self, path: &Path) -> io::Result<String>;

    /// Read raw file contents.
    fn read(&self, path: &Path) -> io::Result<Vec<u8>>;

    /// Replace a file's contents atomically.
    ///
    /// On error the previous contents stay in place.
    fn write_atomic(&self, path: &Path, contents: &[u8]) -> io::Result<()>;

    /// Write bytes to a new file, failing if it already exists.
    fn write_new(&self, path: &Path, contents: &[u8]) -> io::Result<()>;

    /// Check if a path exists.
    fn exists(&self, path: &Path) -> bool;
}

/// Real filesystem implementation using std::fs.
#[derive(Default, Clone, Copy)]
pub struct RealFileSystem;

impl FileSystem for RealFileSystem {
    fn read_to_string(&self, path: &Path) -> io::Result<String> {
        std::fs::read_to_string(path)
    }

    fn read(&self, path: &Path) -> io::Result<Vec<u8>> {
        std::fs::read(path)
    }

    fn write_atomic(&self, path: &Path, contents: &[u8]) -> io::Result<()> {
        let parent = match path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p,
            _ => Path::new("."),
        };

        // Temp file in the same directory so the rename stays on one filesystem
        let mut temp_file = tempfile::NamedTempFile::new_in(parent)?;
        temp_file.write_all(contents)?;
        temp_file.as_file().sync_all()?;
        temp_file.persist(path).map_err(|e| e.error)?;
        Ok(())
    }

    fn write_new(&self, path: &Path, contents: &[u8]) -> io::Result<()> {
        let mut file = std::fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(path)?;
        file.write_all(contents)?;
        file.sync_all()
    }

    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }
}

static REAL_FS: RealFileSystem = RealFileSystem;

/// Get a reference to the global real filesystem instance.
///
/// For testing, create a `MockFileSystem` instead.
pub fn real_fs() -> &'static RealFileSystem {
    &REAL_FS
}
