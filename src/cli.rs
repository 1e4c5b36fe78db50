//! Command-line interface definitions for DupeWatch.
//!
//! This module defines all CLI arguments, subcommands, and options using the
//! clap derive API. Global options (verbosity, color, config overrides) apply
//! to every subcommand.
//!
//! # Example
//!
//! ```bash
//! # Find content duplicates under two directories
//! dupewatch dupes ~/Downloads ~/Documents
//!
//! # Same-name-and-size candidates, JSON output for scripting
//! dupewatch dupes ~/Downloads --by name-size --output json
//!
//! # Similarly named files at a custom threshold
//! dupewatch similar ~/Documents --threshold 0.9
//!
//! # What was touched under a watched root on a given day
//! dupewatch history show --date 2024-05-01 --root ~/Documents
//!
//! # Watch configured roots until Ctrl+C
//! dupewatch watch
//! ```

use clap::{Args, Parser, Subcommand, ValueEnum};
use chrono::NaiveDate;
use std::path::PathBuf;

/// Duplicate file finder and file activity tracker.
///
/// DupeWatch finds duplicate files by content hash (BLAKE3), by matching
/// name and size, or by filename similarity, and keeps a date-keyed record
/// of file activity under watched directories.
#[derive(Debug, Parser)]
#[command(name = "dupewatch")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Increase verbosity level (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long, global = true, env = "NO_COLOR")]
    pub no_color: bool,

    /// Report fatal errors as JSON on stderr
    #[arg(long, global = true)]
    pub json_errors: bool,

    /// Path to the configuration file
    ///
    /// If not specified, a default platform-specific path is used.
    #[arg(long, global = true, value_name = "PATH", env = "DUPEWATCH_CONFIG")]
    pub config_file: Option<PathBuf>,

    /// Path to the history document
    ///
    /// If not specified, it lives alongside the configuration file.
    #[arg(long, global = true, value_name = "PATH", env = "DUPEWATCH_HISTORY")]
    pub history_file: Option<PathBuf>,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands for DupeWatch.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Find duplicate files under one or more directories
    Dupes(DupesArgs),
    /// Find files with similar names under one or more directories
    Similar(SimilarArgs),
    /// Summarize file counts, sizes, and extensions under directories
    Stats(StatsArgs),
    /// Inspect or rebuild the file activity history
    History {
        #[command(subcommand)]
        command: HistoryCommands,
    },
    /// Manage the watched directory list
    Roots {
        #[command(subcommand)]
        command: RootsCommands,
    },
    /// Record file activity under the watched directories until interrupted
    Watch,
}

/// Arguments for the dupes subcommand.
#[derive(Debug, Args)]
pub struct DupesArgs {
    /// Directories to scan
    #[arg(value_name = "ROOTS", required = true)]
    pub roots: Vec<PathBuf>,

    /// Grouping strategy
    #[arg(long, value_enum, default_value = "hash")]
    pub by: DupesBy,

    /// Output format
    #[arg(short, long, value_enum, default_value = "text")]
    pub output: OutputFormat,

    /// Delete every group member after the first
    ///
    /// Files go to the system trash unless --permanent is given.
    #[arg(long, requires = "yes")]
    pub delete_extras: bool,

    /// Use permanent deletion instead of moving to trash
    ///
    /// Warning: Files cannot be recovered after permanent deletion.
    #[arg(long, requires = "delete_extras")]
    pub permanent: bool,

    /// Skip confirmation prompts (required with --delete-extras)
    #[arg(short = 'y', long)]
    pub yes: bool,
}

/// Arguments for the similar subcommand.
#[derive(Debug, Args)]
pub struct SimilarArgs {
    /// Directories to scan
    #[arg(value_name = "ROOTS", required = true)]
    pub roots: Vec<PathBuf>,

    /// Similarity threshold between 0.1 and 1.0
    ///
    /// Higher values demand closer name matches; 1.0 matches identical
    /// names only.
    #[arg(short, long, value_name = "T", default_value = "0.8", value_parser = parse_threshold)]
    pub threshold: f64,

    /// Output format
    #[arg(short, long, value_enum, default_value = "text")]
    pub output: OutputFormat,
}

/// Arguments for the stats subcommand.
#[derive(Debug, Args)]
pub struct StatsArgs {
    /// Directories to scan
    #[arg(value_name = "ROOTS", required = true)]
    pub roots: Vec<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "text")]
    pub output: OutputFormat,
}

/// History subcommands.
#[derive(Debug, Subcommand)]
pub enum HistoryCommands {
    /// List files recorded for a date
    Show(HistoryShowArgs),
    /// Rebuild a date's entries from file modification times
    Backfill(HistoryBackfillArgs),
}

/// Arguments for `history show`.
#[derive(Debug, Args)]
pub struct HistoryShowArgs {
    /// Date to list (YYYY-MM-DD, defaults to today)
    #[arg(long, value_name = "DATE", value_parser = parse_date)]
    pub date: Option<NaiveDate>,

    /// Only list files under this directory (repeatable)
    #[arg(long = "root", value_name = "PATH")]
    pub roots: Vec<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "text")]
    pub output: OutputFormat,
}

/// Arguments for `history backfill`.
#[derive(Debug, Args)]
pub struct HistoryBackfillArgs {
    /// Date to rebuild (YYYY-MM-DD)
    #[arg(long, value_name = "DATE", value_parser = parse_date)]
    pub date: NaiveDate,

    /// Directory whose files to examine
    #[arg(value_name = "ROOT")]
    pub root: PathBuf,
}

/// Watched-roots subcommands.
#[derive(Debug, Subcommand)]
pub enum RootsCommands {
    /// Add a directory to the watched list
    Add {
        /// Directory to watch
        #[arg(value_name = "PATH")]
        path: PathBuf,
    },
    /// Remove a directory from the watched list and forget its history
    Remove {
        /// Directory to stop watching
        #[arg(value_name = "PATH")]
        path: PathBuf,
    },
    /// List the watched directories
    List,
}

/// Duplicate grouping strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum DupesBy {
    /// Group by BLAKE3 content hash
    Hash,
    /// Group by matching filename and size
    NameSize,
}

/// Output format for reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text
    Text,
    /// JSON output for scripting
    Json,
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Text => write!(f, "text"),
            OutputFormat::Json => write!(f, "json"),
        }
    }
}

/// Parse a similarity threshold, enforcing the user-facing range.
///
/// # Errors
///
/// Returns an error if the string is not a number or falls outside
/// [0.1, 1.0].
pub fn parse_threshold(s: &str) -> Result<f64, String> {
    let value: f64 = s
        .trim()
        .parse()
        .map_err(|_| format!("Invalid threshold: '{s}'"))?;

    if !(0.1..=1.0).contains(&value) {
        return Err(format!(
            "Threshold must be between 0.1 and 1.0, got {value}"
        ));
    }
    Ok(value)
}

/// Parse a calendar date in `YYYY-MM-DD` form.
///
/// # Errors
///
/// Returns an error if the string is not a valid date.
pub fn parse_date(s: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")
        .map_err(|_| format!("Invalid date '{s}' (expected YYYY-MM-DD)"))
}
