//! Pre-mutation backups of the store.
//!
//! A backup is the snapshot written in the store file format, so it can be
//! restored by pointing `--db` at it. Backups never overwrite an existing
//! file.

use chrono::{DateTime, Utc};
use std::path::{Path, PathBuf};
use tracing::info;

use crate::entry::StoreSnapshot;
use crate::error::{AutoblockError, Result};
use crate::fs_abstraction::{FileSystem, RealFileSystem};
use crate::store::render_store_file;

/// Where a backup went and what it held
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackupResult {
    pub path: PathBuf,
    pub entries: usize,
}

pub struct BackupAgent<F: FileSystem = RealFileSystem> {
    fs: F,
}

impl Default for BackupAgent<RealFileSystem> {
    fn default() -> Self {
        Self::new()
    }
}

impl BackupAgent<RealFileSystem> {
    pub fn new() -> Self {
        Self::with_fs(RealFileSystem)
    }
}

impl<F: FileSystem> BackupAgent<F> {
    pub fn with_fs(fs: F) -> Self {
        Self { fs }
    }

    /// Write `snapshot` into `destination` as `<timestamp>_backup_<label>`.
    pub fn backup(
        &self,
        snapshot: &StoreSnapshot,
        destination: &Path,
        label: &str,
        now: DateTime<Utc>,
    ) -> Result<BackupResult> {
        if !self.fs.exists(destination) {
            return Err(AutoblockError::Backup(format!(
                "destination {:?} does not exist",
                destination
            )));
        }

        let path = destination.join(backup_file_name(label, now));
        let content = render_store_file(snapshot)
            .map_err(|e| AutoblockError::Backup(e.to_string()))?;

        self.fs
            .write_new(&path, content.as_bytes())
            .map_err(|e| AutoblockError::Backup(format!("{:?}: {}", path, e)))?;

        info!("Store backed up to {:?} ({} entries)", path, snapshot.len());

        Ok(BackupResult {
            path,
            entries: snapshot.len(),
        })
    }
}

/// Backup file name for a store label at a given time
pub fn backup_file_name(label: &str, now: DateTime<Utc>) -> String {
    format!("{}_backup_{}", now.format("%Y%m%d_%H%M%S"), label)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entry::Entry;
    use crate::fs_abstraction::MockFileSystem;
    use chrono::TimeZone;
    use tempfile::TempDir;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 15, 8, 30, 5).unwrap()
    }

    fn snapshot() -> StoreSnapshot {
        ["10.0.0.1", "10.0.0.2"].into_iter().map(Entry::new).collect()
    }

    #[test]
    fn test_backup_file_name() {
        assert_eq!(
            backup_file_name("blocklist.json", now()),
            "20240615_083005_backup_blocklist.json"
        );
    }

    #[test]
    fn test_backup_writes_restorable_snapshot() {
        use crate::store::{BlocklistStore, JsonFileStore};

        let temp_dir = TempDir::new().unwrap();
        let result = BackupAgent::new()
            .backup(&snapshot(), temp_dir.path(), "blocklist.json", now())
            .unwrap();

        assert_eq!(result.entries, 2);
        assert!(result.path.starts_with(temp_dir.path()));
        let restored = JsonFileStore::new(&result.path).load().unwrap();
        assert_eq!(restored, snapshot());
    }

    #[test]
    fn test_backup_never_overwrites() {
        let temp_dir = TempDir::new().unwrap();
        let agent = BackupAgent::new();
        agent
            .backup(&snapshot(), temp_dir.path(), "blocklist.json", now())
            .unwrap();

        let err = agent
            .backup(&StoreSnapshot::new(), temp_dir.path(), "blocklist.json", now())
            .unwrap_err();
        assert!(matches!(err, AutoblockError::Backup(_)));
    }

    #[test]
    fn test_backup_missing_destination() {
        let err = BackupAgent::new()
            .backup(&snapshot(), Path::new("/nonexistent/backups"), "db", now())
            .unwrap_err();
        assert!(err.to_string().contains("does not exist"));
    }

    #[test]
    fn test_backup_write_failure() {
        let mut mock = MockFileSystem::new();
        mock.expect_exists().returning(|_| true);
        mock.expect_write_new().returning(|_, _| {
            Err(std::io::Error::new(
                std::io::ErrorKind::PermissionDenied,
                "read-only filesystem",
            ))
        });

        let err = BackupAgent::with_fs(mock)
            .backup(&snapshot(), Path::new("/backups"), "db", now())
            .unwrap_err();
        assert!(matches!(err, AutoblockError::Backup(_)));
        assert!(err.to_string().contains("read-only filesystem"));
    }
}
