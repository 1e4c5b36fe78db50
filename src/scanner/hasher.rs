//! Streaming BLAKE3 file hashing.
//!
//! Files are read in [`BLOCK_SIZE`] chunks so arbitrarily large files hash
//! in constant memory, and so a cancellation request is honored within one
//! block's worth of I/O. The digest keys content-identity buckets; it is a
//! fast fingerprint, not a security boundary.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use super::HashError;
use crate::signal::CancelToken;

/// Read granularity for streaming hashing, 64 KiB.
pub const BLOCK_SIZE: usize = 64 * 1024;

/// Raw BLAKE3 output.
pub type Digest = [u8; 32];

/// Lowercase hex rendering of a digest, used as the content bucket key.
#[must_use]
pub fn digest_to_hex(digest: &Digest) -> String {
    digest.iter().map(|byte| format!("{byte:02x}")).collect()
}

/// File content hasher with optional cooperative cancellation.
#[derive(Debug, Default)]
pub struct Hasher {
    cancel: Option<CancelToken>,
}

impl Hasher {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach a cancellation token polled between blocks.
    #[must_use]
    pub fn with_cancel(mut self, token: CancelToken) -> Self {
        self.cancel = Some(token);
        self
    }

    /// Hash the full content of `path`.
    ///
    /// A cancellation observed mid-file discards the partial digest and
    /// returns [`HashError::Cancelled`]; there is no resume. Open and read
    /// failures come back as [`HashError::Io`] for the caller to log and
    /// skip.
    pub fn hash_file(&self, path: &Path) -> Result<Digest, HashError> {
        let mut file = File::open(path).map_err(|source| HashError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        let mut hasher = blake3::Hasher::new();
        let mut buffer = vec![0u8; BLOCK_SIZE];

        loop {
            if self.is_cancelled() {
                return Err(HashError::Cancelled);
            }

            let read = file.read(&mut buffer).map_err(|source| HashError::Io {
                path: path.to_path_buf(),
                source,
            })?;
            if read == 0 {
                break;
            }
            hasher.update(&buffer[..read]);
        }

        Ok(*hasher.finalize().as_bytes())
    }

    fn is_cancelled(&self) -> bool {
        self.cancel.as_ref().is_some_and(CancelToken::is_cancelled)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_identical_content_same_digest() {
        let tmp = TempDir::new().unwrap();
        let a = tmp.path().join("a.bin");
        let b = tmp.path().join("b.bin");
        fs::write(&a, b"same bytes").unwrap();
        fs::write(&b, b"same bytes").unwrap();

        let hasher = Hasher::new();
        assert_eq!(
            hasher.hash_file(&a).unwrap(),
            hasher.hash_file(&b).unwrap()
        );
    }

    #[test]
    fn test_different_content_different_digest() {
        let tmp = TempDir::new().unwrap();
        let a = tmp.path().join("a.bin");
        let b = tmp.path().join("b.bin");
        fs::write(&a, b"first").unwrap();
        fs::write(&b, b"second").unwrap();

        let hasher = Hasher::new();
        assert_ne!(
            hasher.hash_file(&a).unwrap(),
            hasher.hash_file(&b).unwrap()
        );
    }

    #[test]
    fn test_content_larger_than_one_block() {
        let tmp = TempDir::new().unwrap();
        let big = tmp.path().join("big.bin");
        fs::write(&big, vec![0xAB; BLOCK_SIZE * 3 + 17]).unwrap();

        let hasher = Hasher::new();
        let first = hasher.hash_file(&big).unwrap();
        let second = hasher.hash_file(&big).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let hasher = Hasher::new();
        let err = hasher.hash_file(Path::new("/no/such/file.bin")).unwrap_err();
        assert!(matches!(err, HashError::Io { .. }));
    }

    #[test]
    fn test_cancelled_before_first_block() {
        let tmp = TempDir::new().unwrap();
        let file = tmp.path().join("victim.bin");
        fs::write(&file, b"content").unwrap();

        let token = CancelToken::new();
        token.cancel();
        let hasher = Hasher::new().with_cancel(token);

        let err = hasher.hash_file(&file).unwrap_err();
        assert!(matches!(err, HashError::Cancelled));
    }

    #[test]
    fn test_digest_to_hex_format() {
        let digest: Digest = [0x0F; 32];
        let hex = digest_to_hex(&digest);
        assert_eq!(hex.len(), 64);
        assert!(hex.chars().all(|c| c == '0' || c == 'f'));
    }
}
