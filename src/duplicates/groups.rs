//! Duplicate group model.
//!
//! Every detection strategy produces the same shape: a bucket key plus the
//! member paths that share it. Only the key varies — a content digest, a
//! name+size composite, or a synthetic id for similarity clusters.

use std::fmt;
use std::path::PathBuf;

/// Identity of a duplicate bucket.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum GroupKey {
    /// Hex BLAKE3 digest shared by every member's content.
    Content(String),
    /// Exact file name and byte size shared by every member.
    NameSize { name: String, size: u64 },
    /// Synthetic id for a fuzzy-name cluster, numbered in creation order.
    Similar(u32),
}

impl GroupKey {
    /// Short label for the detection strategy behind this key.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            GroupKey::Content(_) => "content",
            GroupKey::NameSize { .. } => "name-size",
            GroupKey::Similar(_) => "similar",
        }
    }
}

impl fmt::Display for GroupKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GroupKey::Content(hex) => f.write_str(hex),
            GroupKey::NameSize { name, size } => write!(f, "{name}_{size}"),
            GroupKey::Similar(id) => write!(f, "group_{id}"),
        }
    }
}

/// A set of files considered duplicates of each other.
///
/// Members stay in discovery order; the first member is the one a cleanup
/// pass keeps. Groups returned from a scan always have at least two
/// members and no repeated path.
#[derive(Debug, Clone, PartialEq)]
pub struct DuplicateGroup {
    pub key: GroupKey,
    pub paths: Vec<PathBuf>,
}

impl DuplicateGroup {
    #[must_use]
    pub fn new(key: GroupKey, paths: Vec<PathBuf>) -> Self {
        Self { key, paths }
    }

    /// Number of members.
    #[must_use]
    pub fn len(&self) -> usize {
        self.paths.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    /// Every member except the first: the redundant copies a cleanup pass
    /// would remove.
    #[must_use]
    pub fn extras(&self) -> &[PathBuf] {
        if self.paths.is_empty() {
            &[]
        } else {
            &self.paths[1..]
        }
    }
}
