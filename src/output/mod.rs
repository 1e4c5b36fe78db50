//! Result rendering.
//!
//! Scan results carry paths and keys only; the per-file details shown in a
//! report (size, modification time) are probed from the filesystem at
//! render time via [`FileRecord::probe`]. A file that vanished between
//! scan and render becomes an explicit unavailable marker in the output
//! instead of an error.

pub mod json;
pub mod text;

use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};
use serde::Serialize;

/// On-demand detail for one reported file.
///
/// `size` and `modified` are `None` exactly when `error` explains why the
/// probe failed.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FileRecord {
    pub path: PathBuf,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub modified: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl FileRecord {
    /// Stat `path` now and capture what a report needs.
    #[must_use]
    pub fn probe(path: &Path) -> Self {
        match std::fs::metadata(path) {
            Ok(meta) => Self {
                path: path.to_path_buf(),
                size: Some(meta.len()),
                modified: meta
                    .modified()
                    .ok()
                    .map(|time| DateTime::<Local>::from(time).format("%Y-%m-%d %H:%M").to_string()),
                error: None,
            },
            Err(err) => Self {
                path: path.to_path_buf(),
                size: None,
                modified: None,
                error: Some(err.to_string()),
            },
        }
    }

    /// Whether the probe found the file.
    #[must_use]
    pub fn is_available(&self) -> bool {
        self.error.is_none()
    }
}
