//! In-memory store, for tests and embedding.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;

use super::BlocklistStore;
use crate::entry::{EntrySet, StoreSnapshot};
use crate::error::{AutoblockError, Result};

#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<EntrySet>,
    fail_writes: AtomicBool,
    writes: AtomicUsize,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_entries(entries: EntrySet) -> Self {
        Self {
            entries: Mutex::new(entries),
            ..Default::default()
        }
    }

    /// Make every subsequent write fail, leaving contents unchanged
    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::Relaxed);
    }

    /// Number of successful writes so far
    pub fn write_count(&self) -> usize {
        self.writes.load(Ordering::Relaxed)
    }

    pub fn snapshot(&self) -> EntrySet {
        self.lock().clone()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, EntrySet> {
        // A poisoned lock still holds a consistent set: writes swap it whole
        self.entries
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl BlocklistStore for MemoryStore {
    fn location(&self) -> String {
        "memory".to_string()
    }

    fn load(&self) -> Result<StoreSnapshot> {
        Ok(self.snapshot())
    }

    fn replace(&self, final_set: &EntrySet) -> Result<()> {
        if self.fail_writes.load(Ordering::Relaxed) {
            return Err(AutoblockError::store_io(
                "memory",
                std::io::Error::new(std::io::ErrorKind::Other, "simulated write failure"),
            ));
        }
        *self.lock() = final_set.clone();
        self.writes.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }
}
