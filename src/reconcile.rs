//! Reconciliation of the persisted blocklist with freshly parsed candidates.
//!
//! [`reconcile`] is a pure function: it reads the store snapshot, the
//! candidate set and the policy, and returns the next state together with
//! the diff that leads to it. The reference time is passed in by the caller.

use chrono::{DateTime, NaiveDate, Utc};

use crate::entry::{CandidateSet, Entry, EntrySet, Policy, StoreSnapshot};
use crate::error::Result;

/// Outcome of one reconciliation
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReconciliationResult {
    /// Candidates new to the store, stamped with the run date
    pub to_add: Vec<Entry>,
    /// Store entries dropped by policy
    pub to_remove: Vec<Entry>,
    /// Store entries past the expiration window, removed or not
    pub expired: Vec<Entry>,
    /// Complete resulting set
    pub final_set: EntrySet,
}

impl ReconciliationResult {
    /// True when persisting `final_set` would change nothing
    pub fn is_noop(&self) -> bool {
        self.to_add.is_empty() && self.to_remove.is_empty()
    }
}

/// Compute the next blocklist state.
///
/// Fails only when the policy itself is invalid.
pub fn reconcile(
    store: &StoreSnapshot,
    candidates: &CandidateSet,
    policy: &Policy,
    now: DateTime<Utc>,
) -> Result<ReconciliationResult> {
    policy.validate()?;

    let today = now.date_naive();
    let mut result = ReconciliationResult::default();

    let mut working = if policy.clear_db {
        result.to_remove.extend(store.iter().cloned());
        EntrySet::new()
    } else {
        store.clone()
    };

    if !policy.clear_db && policy.expiration_enabled() {
        let expired: Vec<Entry> = working
            .iter()
            .filter(|entry| is_expired(entry, today, policy.expire_in_days))
            .cloned()
            .collect();

        if policy.remove_expired {
            for entry in &expired {
                working.remove(&entry.address);
            }
            result.to_remove.extend(expired.iter().cloned());
        }
        result.expired = expired;
    }

    for candidate in candidates.iter() {
        if working.contains(&candidate.address) {
            continue;
        }
        let entry = candidate.clone().with_created_at(today);
        working.insert(entry.clone());
        result.to_add.push(entry);
    }

    result.final_set = working;
    Ok(result)
}

/// An entry is expired once its age is strictly greater than the window.
/// Entries without an admission date never expire.
fn is_expired(entry: &Entry, today: NaiveDate, expire_in_days: i64) -> bool {
    entry
        .age_days(today)
        .is_some_and(|age| age > expire_in_days)
}
