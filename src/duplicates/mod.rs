//! Duplicate detection and directory statistics.
//!
//! Three independent strategies find duplicates over a set of scan roots:
//! - content identity via streaming BLAKE3 ([`find_duplicates_by_hash`])
//! - exact name+size coincidence ([`find_duplicates_by_name_size`])
//! - fuzzy file-name similarity ([`find_similar_files`])
//!
//! plus a count-and-measure pass with no matching at all
//! ([`scan_directories`]).
//!
//! Every operation takes a [`ScanContext`] carrying its cancellation token
//! and optional progress sink. Contexts are per-operation: concurrent scans
//! with separate contexts do not interfere, and cancelling one leaves the
//! others running.

pub mod finder;
pub mod groups;
pub mod stats;

use std::sync::Arc;

pub use finder::{
    find_duplicates_by_hash, find_duplicates_by_name_size, find_similar_files, name_similarity,
};
pub use groups::{DuplicateGroup, GroupKey};
pub use stats::{scan_directories, DirectoryStats, ExtensionStats, LargestFile};

use crate::progress::ProgressSink;
use crate::signal::CancelToken;

/// Per-operation scan state: cancellation and progress delivery.
///
/// A cancelled operation stops at its next check point (between files,
/// between comparisons, between hash blocks) and returns an empty result,
/// the same shape as a scan that found nothing. Callers that need to tell
/// the two apart consult the token they attached.
#[derive(Clone, Default)]
pub struct ScanContext {
    cancel: CancelToken,
    progress: Option<Arc<dyn ProgressSink>>,
}

impl ScanContext {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Use an externally owned cancellation token.
    #[must_use]
    pub fn with_cancel(mut self, token: CancelToken) -> Self {
        self.cancel = token;
        self
    }

    /// Deliver progress updates to `sink`.
    #[must_use]
    pub fn with_progress(mut self, sink: Arc<dyn ProgressSink>) -> Self {
        self.progress = Some(sink);
        self
    }

    /// Clone of this context's cancellation token, for stopping the
    /// operation from another thread.
    #[must_use]
    pub fn cancel_token(&self) -> CancelToken {
        self.cancel.clone()
    }

    pub(crate) fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    pub(crate) fn report(&self, percent: f64, message: &str) {
        if let Some(ref sink) = self.progress {
            sink.report(percent, message);
        }
    }
}

impl std::fmt::Debug for ScanContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScanContext")
            .field("cancel", &self.cancel)
            .field("progress", &self.progress.as_ref().map(|_| "<sink>"))
            .finish()
    }
}

/// Errors from duplicate-finding operations.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum FinderError {
    /// The similarity threshold must be in `(0.0, 1.0]`.
    #[error("similarity threshold {0} is out of range (expected 0.0 < t <= 1.0)")]
    ThresholdOutOfRange(f64),
}
