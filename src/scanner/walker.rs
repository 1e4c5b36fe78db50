//! Sequential multi-root directory walker.
//!
//! Scans run over a list of root directories and need two things from
//! traversal: a cheap up-front file count so progress can state an accurate
//! total, and a processing pass yielding every regular file underneath the
//! roots. Both passes evaluate the roots at call time; a root that is
//! missing or not a directory simply contributes no files.
//!
//! The walk is deliberately sequential. Progress is reported per file,
//! cancellation is polled per file, and duplicate groups keep their members
//! in discovery order, none of which survives a parallelized traversal.

use std::path::{Path, PathBuf};

use walkdir::WalkDir;

/// File discovery over a set of root directories.
#[derive(Debug, Clone)]
pub struct Walker {
    roots: Vec<PathBuf>,
}

impl Walker {
    /// Create a walker over the given roots.
    ///
    /// Roots are not validated here; unusable ones are skipped when a pass
    /// runs, so the same walker can be reused as directories come and go.
    #[must_use]
    pub fn new(roots: &[PathBuf]) -> Self {
        Self {
            roots: roots.to_vec(),
        }
    }

    /// Count pass: number of regular files under all usable roots.
    ///
    /// Runs before the processing pass so the first progress update can
    /// state a total. The tree may change between the passes; the count is
    /// a snapshot, and percentages computed from it are approximate under
    /// concurrent modification.
    #[must_use]
    pub fn count(&self) -> u64 {
        self.usable_roots()
            .map(|root| {
                WalkDir::new(root)
                    .into_iter()
                    .filter_map(|entry| entry.ok())
                    .filter(|entry| entry.file_type().is_file())
                    .count() as u64
            })
            .sum()
    }

    /// Processing pass: every regular file under all usable roots.
    ///
    /// Unreadable entries are logged and skipped. No ordering is guaranteed
    /// beyond being stable for an unchanged tree, which is what gives
    /// duplicate groups their reproducible member order.
    pub fn files(&self) -> impl Iterator<Item = PathBuf> + '_ {
        self.usable_roots().flat_map(|root| {
            WalkDir::new(root).into_iter().filter_map(|entry| match entry {
                Ok(entry) if entry.file_type().is_file() => Some(entry.into_path()),
                Ok(_) => None,
                Err(err) => {
                    log::warn!("Skipping unreadable entry: {err}");
                    None
                }
            })
        })
    }

    fn usable_roots(&self) -> impl Iterator<Item = &Path> {
        self.roots.iter().filter_map(|root| {
            if root.is_dir() {
                Some(root.as_path())
            } else {
                log::debug!("Skipping unavailable root: {}", root.display());
                None
            }
        })
    }
}
