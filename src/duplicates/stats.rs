//! Directory statistics scan.
//!
//! Counts and measures without any duplicate matching: file total,
//! cumulative size, a per-extension breakdown, and the largest files seen.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::Serialize;

use super::ScanContext;
use crate::scanner::Walker;

/// How many of the largest files are retained.
pub const TOP_LARGEST: usize = 10;

/// Count and cumulative size for one file extension.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ExtensionStats {
    pub count: u64,
    pub size: u64,
}

/// One of the largest files found during a stats scan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LargestFile {
    pub path: PathBuf,
    pub size: u64,
}

/// Aggregate measurements over a set of scan roots.
///
/// Extensions are keyed by the lowercased final extension without its dot;
/// extensionless files (including dotfiles like `.gitignore`) accumulate
/// under the empty string. `largest_files` is kept sorted by size
/// descending and truncated to [`TOP_LARGEST`] after every insertion, so
/// it is valid at any point mid-scan, not only at the end.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DirectoryStats {
    pub total_files: u64,
    pub total_size: u64,
    pub extensions: BTreeMap<String, ExtensionStats>,
    pub largest_files: Vec<LargestFile>,
}

impl DirectoryStats {
    /// Fold one file into the running totals.
    pub fn record_file(&mut self, path: &Path, size: u64) {
        self.total_files += 1;
        self.total_size += size;

        let ext = path
            .extension()
            .map(|ext| ext.to_string_lossy().to_lowercase())
            .unwrap_or_default();
        let entry = self.extensions.entry(ext).or_default();
        entry.count += 1;
        entry.size += size;

        self.largest_files.push(LargestFile {
            path: path.to_path_buf(),
            size,
        });
        self.largest_files.sort_by(|a, b| b.size.cmp(&a.size));
        self.largest_files.truncate(TOP_LARGEST);
    }
}

/// Measure every file under `roots`.
///
/// Single pass with no pre-count, so progress reports a fixed 0 percent
/// and carries the running file count in its message, every 100 files.
/// Files that cannot be stat'ed are logged and skipped. Cancellation
/// returns an empty [`DirectoryStats`], not the partial tallies.
#[must_use]
pub fn scan_directories(roots: &[PathBuf], ctx: &ScanContext) -> DirectoryStats {
    let walker = Walker::new(roots);
    let mut stats = DirectoryStats::default();

    for path in walker.files() {
        if ctx.is_cancelled() {
            log::info!("Stats scan cancelled after {} files", stats.total_files);
            return DirectoryStats::default();
        }

        match std::fs::metadata(&path) {
            Ok(meta) => {
                stats.record_file(&path, meta.len());
                if stats.total_files % 100 == 0 {
                    ctx.report(0.0, &format!("Scanned {} files...", stats.total_files));
                }
            }
            Err(err) => log::warn!("Skipping unreadable file {}: {err}", path.display()),
        }
    }

    stats
}
