//! # autoblock - Blocklist reconciler
//!
//! Merges IP entries from local files and remote URLs into a persisted deny
//! store, applying expiration and deduplication policy, optionally backing
//! the store up first.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │  CLI (clap) + Config (serde_yaml)                           │
//! ├─────────────────────────────────────────────────────────────┤
//! │  Sources                                                    │
//! │    ├── Local files (FileSystem trait)                       │
//! │    └── Remote URLs (reqwest, ListFetcher trait)             │
//! ├─────────────────────────────────────────────────────────────┤
//! │  Parser → CandidateSet (deduplicated, warnings collected)   │
//! ├─────────────────────────────────────────────────────────────┤
//! │  Reconciliation engine (pure)                               │
//! │    StoreSnapshot + CandidateSet + Policy + now              │
//! │      → to_add / to_remove / expired / final_set             │
//! ├─────────────────────────────────────────────────────────────┤
//! │  BackupAgent (before any write) → BlocklistStore            │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Example Usage
//!
//! ```
//! use autoblock::entry::{Entry, EntrySet, Policy};
//! use autoblock::parser::CandidateCollector;
//! use autoblock::reconcile::reconcile;
//! use chrono::Utc;
//!
//! let mut collector = CandidateCollector::new();
//! collector.add_source("list.txt", "# bad hosts\n192.0.2.1\n198.51.100.0/24 # scanner\n");
//! let outcome = collector.finish();
//!
//! let store: EntrySet = [Entry::new("192.0.2.1")].into_iter().collect();
//! let policy = Policy { expire_in_days: 30, remove_expired: true, ..Default::default() };
//!
//! let result = reconcile(&store, &outcome.candidates, &policy, Utc::now()).unwrap();
//! assert_eq!(result.to_add.len(), 1);
//! assert_eq!(result.final_set.len(), 2);
//! ```
//!
//! ## Modules
//!
//! - [`backup`] - Pre-mutation store backups
//! - [`cli`] - Command-line interface definitions
//! - [`config`] - Configuration file and run settings
//! - [`entry`] - Entry, EntrySet and Policy
//! - [`error`] - Error taxonomy
//! - [`fetcher`] - HTTP client for remote lists
//! - [`fs_abstraction`] - Filesystem trait for dependency injection
//! - [`parser`] - Source list parsing
//! - [`reconcile`] - Reconciliation engine
//! - [`report`] - Run summary
//! - [`store`] - Persisted store backends
//! - [`update`] - Run orchestration
//! - [`utils`] - Formatting helpers
//! - [`validation`] - IP, URL and path validation

pub mod backup;
pub mod cli;
pub mod config;
pub mod entry;
pub mod error;
pub mod fetcher;
pub mod fs_abstraction;
pub mod parser;
pub mod reconcile;
pub mod report;
pub mod store;
pub mod update;
pub mod utils;
pub mod validation;

pub use cli::Cli;
pub use config::{Config, RunSettings};
pub use entry::{CandidateSet, Entry, EntrySet, Policy, StoreSnapshot};
pub use error::AutoblockError;
pub use reconcile::{reconcile, ReconciliationResult};
