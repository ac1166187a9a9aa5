//! Configuration management for autoblock.
//!
//! Settings come from an optional YAML file and the command line. Sources
//! given on the command line are appended to those in the file; scalar
//! values given on the command line win.
//!
//! ```yaml
//! database: /var/lib/autoblock/blocklist.json
//! backup_to: /var/backups/autoblock
//! expire_in_days: 30
//! remove_expired: true
//! files:
//!   - /etc/autoblock/local.txt
//! urls:
//!   - https://lists.blocklist.de/lists/all.txt
//! ```

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::cli::Cli;
use crate::entry::Policy;
use crate::error::AutoblockError;
use crate::validation::{validate_backup_dir, validate_url};

/// Default location of the store file
pub const DEFAULT_DATABASE: &str = "/var/lib/autoblock/blocklist.json";

/// Configuration file contents
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Store file path
    pub database: PathBuf,

    /// Folder for pre-mutation backups
    pub backup_to: Option<PathBuf>,

    /// Expiration window in days (0: never)
    pub expire_in_days: i64,

    /// Remove expired entries
    pub remove_expired: bool,

    /// Local list files
    pub files: Vec<PathBuf>,

    /// Remote list URLs
    pub urls: Vec<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database: PathBuf::from(DEFAULT_DATABASE),
            backup_to: None,
            expire_in_days: 0,
            remove_expired: false,
            files: Vec::new(),
            urls: Vec::new(),
        }
    }
}

impl Config {
    /// Load configuration from YAML file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read config file: {:?}", path.as_ref()))?;
        Self::from_yaml(&content)
            .with_context(|| format!("Failed to parse config file: {:?}", path.as_ref()))
    }

    pub fn from_yaml(content: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(content)?)
    }

    /// Combine with command-line arguments into the settings for one run
    pub fn into_settings(self, cli: &Cli) -> RunSettings {
        let mut files = self.files;
        files.extend(cli.in_file.iter().cloned());
        let mut urls = self.urls;
        urls.extend(cli.in_url.iter().cloned());

        RunSettings {
            database: cli.db.clone().unwrap_or(self.database),
            backup_to: cli.backup_to.clone().or(self.backup_to),
            files,
            urls,
            policy: Policy {
                expire_in_days: cli.expire_in_day.unwrap_or(self.expire_in_days),
                remove_expired: cli.remove_expired || self.remove_expired,
                clear_db: cli.clear_db,
                dry_run: cli.dry_run,
            },
        }
    }
}

/// Everything one run needs, after config and CLI are merged
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSettings {
    pub database: PathBuf,
    pub backup_to: Option<PathBuf>,
    pub files: Vec<PathBuf>,
    pub urls: Vec<String>,
    pub policy: Policy,
}

impl RunSettings {
    /// Load the config file named on the command line, if any, and merge
    pub fn from_cli(cli: &Cli) -> Result<Self> {
        let config = match &cli.config {
            Some(path) => Config::load(path)?,
            None => Config::default(),
        };
        Ok(config.into_settings(cli))
    }

    /// Check settings before anything is read or written
    pub fn validate(&self) -> crate::error::Result<()> {
        self.policy.validate()?;

        if self.files.is_empty() && self.urls.is_empty() {
            return Err(AutoblockError::Config(
                "At least one source list is mandatory (file or url)".to_string(),
            ));
        }

        for url in &self.urls {
            validate_url(url).map_err(|e| AutoblockError::Config(e.to_string()))?;
        }

        match &self.backup_to {
            Some(dir) => {
                validate_backup_dir(dir).map_err(|e| AutoblockError::Config(e.to_string()))?
            }
            None if self.policy.clear_db => {
                return Err(AutoblockError::Config(
                    "backup folder should be set for clear db".to_string(),
                ));
            }
            None => {}
        }

        Ok(())
    }
}
