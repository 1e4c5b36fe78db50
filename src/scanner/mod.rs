//! Directory traversal and content hashing.
//!
//! The scanner is the filesystem-facing layer the duplicate and history
//! operations are built on:
//! - [`walker`]: sequential multi-root file discovery with a cheap count
//!   pass for progress totals
//! - [`hasher`]: streaming BLAKE3 hashing in fixed-size blocks
//!
//! Traversal problems (unreadable directories, files that vanish mid-scan)
//! are logged and skipped; they never abort an operation.

pub mod hasher;
pub mod walker;

use std::path::PathBuf;

pub use hasher::{digest_to_hex, Digest, Hasher, BLOCK_SIZE};
pub use walker::Walker;

/// Errors from hashing a single file.
///
/// Callers treat [`HashError::Cancelled`] as an instruction to wind down;
/// anything else is logged and the file is skipped.
#[derive(thiserror::Error, Debug)]
pub enum HashError {
    /// Cancellation was requested between blocks; the partial digest is
    /// discarded.
    #[error("hashing cancelled")]
    Cancelled,

    /// The file could not be opened or read.
    #[error("I/O error for {path}: {source}")]
    Io {
        /// Path where the error occurred
        path: PathBuf,
        /// The underlying I/O error
        #[source]
        source: std::io::Error,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_error_display() {
        let err = HashError::Io {
            path: PathBuf::from("/tmp/locked.bin"),
            source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        };
        assert!(err.to_string().contains("/tmp/locked.bin"));

        assert_eq!(HashError::Cancelled.to_string(), "hashing cancelled");
    }
}
