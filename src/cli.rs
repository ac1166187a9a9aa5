//! CLI argument parsing with clap.

use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "autoblock")]
#[command(author, version, about = "Merge IP blocklists from files and URLs into a persisted deny store")]
pub struct Cli {
    /// Local list files (eg. -f /home/user/list.txt custom.txt)
    #[arg(short = 'f', long = "in-file", num_args = 1.., value_name = "FILE")]
    pub in_file: Vec<PathBuf>,

    /// Remote list URLs (eg. -u https://example.com/list.txt)
    #[arg(short = 'u', long = "in-url", num_args = 1.., value_name = "URL")]
    pub in_url: Vec<String>,

    /// Expire time in days. Default 0: no expiration
    #[arg(short = 'e', long = "expire-in-day", allow_negative_numbers = true)]
    pub expire_in_day: Option<i64>,

    /// Remove expired entries
    #[arg(long)]
    pub remove_expired: bool,

    /// Folder to store a backup of the store before modifying it
    #[arg(short = 'b', long = "backup-to", value_name = "DIR")]
    pub backup_to: Option<PathBuf>,

    /// Clear ALL deny entries in the store before filling
    #[arg(long)]
    pub clear_db: bool,

    /// Perform a run without any modifications
    #[arg(long)]
    pub dry_run: bool,

    /// Store file path
    #[arg(long, value_name = "PATH")]
    pub db: Option<PathBuf>,

    /// Optional YAML config file
    #[arg(short, long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Increase output verbosity
    #[arg(short, long)]
    pub verbose: bool,

    /// Only print errors
    #[arg(short, long, conflicts_with = "verbose")]
    pub quiet: bool,
}
