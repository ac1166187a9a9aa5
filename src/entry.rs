//! Blocklist data model.
//!
//! An [`Entry`] is one deny record. Entries are grouped in an [`EntrySet`],
//! which keeps addresses unique and ordered so snapshots and results are
//! deterministic. [`StoreSnapshot`] and [`CandidateSet`] are the two roles
//! an `EntrySet` plays during a run.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::btree_map::{self, BTreeMap};

use crate::error::{AutoblockError, Result};

/// A single deny entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entry {
    /// IP or CIDR, kept verbatim as it appeared in the source list
    pub address: String,

    /// Date the entry was first admitted to the store
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<NaiveDate>,

    /// Inline comment from the source line
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
}

impl Entry {
    pub fn new(address: impl Into<String>) -> Self {
        Self {
            address: address.into(),
            created_at: None,
            comment: None,
        }
    }

    pub fn with_created_at(mut self, date: NaiveDate) -> Self {
        self.created_at = Some(date);
        self
    }

    pub fn with_comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = Some(comment.into());
        self
    }

    /// Age in whole days at `today`, or `None` when the admission date is unknown.
    pub fn age_days(&self, today: NaiveDate) -> Option<i64> {
        self.created_at
            .map(|created| today.signed_duration_since(created).num_days())
    }
}

/// Entries unique by address, iterated in address order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EntrySet {
    entries: BTreeMap<String, Entry>,
}

/// Full contents of the persisted deny list at the start of a run.
pub type StoreSnapshot = EntrySet;

/// Union of all parsed source entries for one run.
pub type CandidateSet = EntrySet;

impl EntrySet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert an entry unless its address is already present.
    ///
    /// The first occurrence wins; returns `true` if the entry was added.
    pub fn insert(&mut self, entry: Entry) -> bool {
        match self.entries.entry(entry.address.clone()) {
            btree_map::Entry::Vacant(slot) => {
                slot.insert(entry);
                true
            }
            btree_map::Entry::Occupied(_) => false,
        }
    }

    pub fn remove(&mut self, address: &str) -> Option<Entry> {
        self.entries.remove(address)
    }

    pub fn contains(&self, address: &str) -> bool {
        self.entries.contains_key(address)
    }

    pub fn get(&self, address: &str) -> Option<&Entry> {
        self.entries.get(address)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Entry> {
        self.entries.values()
    }

    pub fn addresses(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn into_vec(self) -> Vec<Entry> {
        self.entries.into_values().collect()
    }
}

impl FromIterator<Entry> for EntrySet {
    fn from_iter<I: IntoIterator<Item = Entry>>(iter: I) -> Self {
        let mut set = Self::new();
        set.extend(iter);
        set
    }
}

impl Extend<Entry> for EntrySet {
    fn extend<I: IntoIterator<Item = Entry>>(&mut self, iter: I) {
        for entry in iter {
            self.insert(entry);
        }
    }
}

impl IntoIterator for EntrySet {
    type Item = Entry;
    type IntoIter = btree_map::IntoValues<String, Entry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_values()
    }
}

/// Run parameters, fixed for the duration of one run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Policy {
    /// Days after admission an entry expires; 0 disables expiration
    pub expire_in_days: i64,
    pub remove_expired: bool,
    pub clear_db: bool,
    pub dry_run: bool,
}

impl Policy {
    pub fn validate(&self) -> Result<()> {
        if self.expire_in_days < 0 {
            return Err(AutoblockError::Validation(format!(
                "expire_in_days must not be negative (got {})",
                self.expire_in_days
            )));
        }
        Ok(())
    }

    pub fn expiration_enabled(&self) -> bool {
        self.expire_in_days > 0
    }
}
