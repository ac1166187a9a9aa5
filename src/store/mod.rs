//! Persisted blocklist stores.
//!
//! A store owns the on-disk representation of the deny list. The
//! reconciliation engine never writes to it directly: the orchestrator
//! loads a snapshot, reconciles, and hands the result back through
//! [`BlocklistStore::replace`] or [`BlocklistStore::apply_diff`].

mod file;
mod memory;

pub use file::JsonFileStore;
pub(crate) use file::render_store_file;
pub use memory::MemoryStore;

use crate::entry::{Entry, EntrySet, StoreSnapshot};
use crate::error::Result;

/// Trait for blocklist persistence backends
pub trait BlocklistStore {
    /// Human-readable location, used in logs and backup names
    fn location(&self) -> String;

    /// Read the full current contents
    fn load(&self) -> Result<StoreSnapshot>;

    /// Replace the persisted contents with `final_set`.
    ///
    /// Implementations must leave the previous state intact on failure.
    fn replace(&self, final_set: &EntrySet) -> Result<()>;

    /// Apply an incremental change.
    ///
    /// Removals are applied before additions, so an address present in
    /// both lists ends up with the added entry.
    fn apply_diff(&self, to_add: &[Entry], to_remove: &[Entry]) -> Result<()> {
        let mut current = self.load()?;
        for entry in to_remove {
            current.remove(&entry.address);
        }
        current.extend(to_add.iter().cloned());
        self.replace(&current)
    }
}
