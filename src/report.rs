//! Run summary.

use std::fmt;
use std::path::PathBuf;

use crate::utils::format_count;

/// What a run did, or would have done on a dry run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunReport {
    /// Lists read successfully (files and URLs)
    pub sources_read: usize,
    /// URLs that could not be fetched
    pub sources_failed: usize,
    /// Valid entries across all lists, duplicates included
    pub valid_entries: usize,
    /// Lines skipped with a parse warning
    pub invalid_entries: usize,
    /// Unique candidate addresses
    pub candidates: usize,
    pub store_before: usize,
    pub store_after: usize,
    pub added: usize,
    pub removed: usize,
    pub expired: usize,
    pub dry_run: bool,
    pub backup: Option<PathBuf>,
    /// No valid address was found, the store was left untouched
    pub skipped: bool,
}

impl fmt::Display for RunReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.skipped {
            return write!(f, "[SKIP] No IP found in list");
        }

        let tag = if self.dry_run { "[DRY-RUN]" } else { "[OK]" };
        write!(
            f,
            "{} {} entries in store ({} added, {} removed",
            tag,
            format_count(self.store_after),
            format_count(self.added),
            format_count(self.removed),
        )?;
        if self.expired > 0 {
            write!(f, ", {} expired", format_count(self.expired))?;
        }
        write!(f, ")")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_ok() {
        let report = RunReport {
            store_before: 10,
            store_after: 1500,
            added: 1495,
            removed: 5,
            ..Default::default()
        };
        assert_eq!(
            report.to_string(),
            "[OK] 1.5K entries in store (1.5K added, 5 removed)"
        );
    }

    #[test]
    fn test_display_dry_run_with_expired() {
        let report = RunReport {
            store_before: 3,
            store_after: 3,
            expired: 2,
            dry_run: true,
            ..Default::default()
        };
        assert_eq!(
            report.to_string(),
            "[DRY-RUN] 3 entries in store (0 added, 0 removed, 2 expired)"
        );
    }

    #[test]
    fn test_display_skipped() {
        let report = RunReport {
            skipped: true,
            ..Default::default()
        };
        assert_eq!(report.to_string(), "[SKIP] No IP found in list");
    }

    #[test]
    fn test_display_shrinking_store() {
        let report = RunReport {
            store_before: 5,
            store_after: 2,
            added: 1,
            removed: 4,
            expired: 4,
            ..Default::default()
        };
        assert_eq!(
            report.to_string(),
            "[OK] 2 entries in store (1 added, 4 removed, 4 expired)"
        );
    }
}
