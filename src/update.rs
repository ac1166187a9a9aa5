//! One blocklist update run: read sources, reconcile, back up, persist.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use std::path::Path;
use tracing::{debug, info, warn};

use crate::backup::BackupAgent;
use crate::config::RunSettings;
use crate::error::AutoblockError;
use crate::fetcher::{fetch_all, Fetcher, ListFetcher};
use crate::fs_abstraction::{real_fs, FileSystem};
use crate::parser::{CandidateCollector, ParseOutcome};
use crate::reconcile::reconcile;
use crate::report::RunReport;
use crate::store::{BlocklistStore, JsonFileStore};
use crate::utils::format_count;

/// Run an update against the configured store file
pub async fn run(settings: &RunSettings) -> Result<RunReport> {
    let fetcher = Fetcher::new()?;
    let store = JsonFileStore::new(&settings.database);
    let backup = BackupAgent::new();

    let report = execute(settings, &store, &fetcher, real_fs(), &backup, Utc::now()).await?;
    debug!(
        "Downloaded {} bytes from remote lists",
        format_count(fetcher.total_downloaded())
    );
    Ok(report)
}

/// Run an update with explicit collaborators and reference time.
pub async fn execute<S, F, FS, B>(
    settings: &RunSettings,
    store: &S,
    fetcher: &F,
    fs: &FS,
    backup: &BackupAgent<B>,
    now: DateTime<Utc>,
) -> Result<RunReport>
where
    S: BlocklistStore,
    F: ListFetcher + ?Sized,
    FS: FileSystem + ?Sized,
    B: FileSystem,
{
    settings.validate()?;
    let policy = settings.policy;

    let mut report = RunReport {
        dry_run: policy.dry_run,
        ..Default::default()
    };

    let outcome = collect_candidates(settings, fetcher, fs, &mut report).await?;

    for warning in &outcome.warnings {
        warn!("{}", warning);
    }
    report.valid_entries = outcome.valid_count;
    report.invalid_entries = outcome.warnings.len();
    report.candidates = outcome.candidates.len();

    info!(
        "Total IP fetched in lists: {} ({} unique, {} duplicates, {} invalid)",
        format_count(outcome.valid_count),
        format_count(outcome.candidates.len()),
        format_count(outcome.duplicate_count()),
        format_count(outcome.warnings.len())
    );

    if outcome.candidates.is_empty() {
        info!("No IP found in list");
        report.skipped = true;
        return Ok(report);
    }

    let snapshot = store
        .load()
        .with_context(|| format!("Failed to load store {}", store.location()))?;
    report.store_before = snapshot.len();
    info!(
        "Total deny IP currently in store: {}",
        format_count(snapshot.len())
    );

    let result = reconcile(&snapshot, &outcome.candidates, &policy, now)?;
    report.added = result.to_add.len();
    report.removed = result.to_remove.len();
    report.expired = result.expired.len();
    report.store_after = result.final_set.len();

    if policy.clear_db {
        info!("All {} deny entries will be replaced", snapshot.len());
    }
    if !result.expired.is_empty() {
        if policy.remove_expired {
            info!("{} expired entries will be removed", result.expired.len());
        } else {
            info!(
                "{} entries are expired (kept, use --remove-expired to drop them)",
                result.expired.len()
            );
        }
    }
    for entry in &result.expired {
        debug!("Expired: {} (since {:?})", entry.address, entry.created_at);
    }

    if policy.dry_run {
        info!("Dry run -> nothing to do");
        return Ok(report);
    }

    if result.is_noop() {
        info!("Store already up to date");
        return Ok(report);
    }

    if let Some(destination) = &settings.backup_to {
        let label = backup_label(&store.location());
        let backup_result = backup
            .backup(&snapshot, destination, &label, now)
            .context("Backup failed, store left untouched")?;
        report.backup = Some(backup_result.path);
    }

    store
        .replace(&result.final_set)
        .with_context(|| format!("Failed to write store {}", store.location()))?;

    info!(
        "Total deny IP now in store: {} ({} added, {} removed)",
        format_count(report.store_after),
        format_count(report.added),
        format_count(report.removed)
    );

    Ok(report)
}

/// Read local files and fetch URLs into one candidate set.
///
/// An unreadable local file is fatal; an unreachable URL only warns.
/// Local bytes that are not UTF-8 are decoded lossily, so the lines holding
/// them end up as parse warnings.
async fn collect_candidates<F, FS>(
    settings: &RunSettings,
    fetcher: &F,
    fs: &FS,
    report: &mut RunReport,
) -> Result<ParseOutcome>
where
    F: ListFetcher + ?Sized,
    FS: FileSystem + ?Sized,
{
    let mut collector = CandidateCollector::new();

    for path in &settings.files {
        let bytes = fs
            .read(path)
            .with_context(|| format!("Failed to read list file {:?}", path))?;
        let content = String::from_utf8_lossy(&bytes);
        let count = collector.add_source(&path.display().to_string(), &content);
        report.sources_read += 1;
        debug!("{}: {} entries", path.display(), format_count(count));
    }

    for (url, body) in fetch_all(fetcher, &settings.urls).await {
        match body {
            Ok(content) => {
                let count = collector.add_source(&url, &content);
                report.sources_read += 1;
                debug!("{}: {} entries", url, format_count(count));
            }
            Err(AutoblockError::Network(reason)) => {
                warn!("Unable to connect to {}", reason);
                report.sources_failed += 1;
            }
            Err(e) => return Err(e.into()),
        }
    }

    Ok(collector.finish())
}

fn backup_label(location: &str) -> String {
    Path::new(location)
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| "blocklist.json".to_string())
}
