//! The three duplicate-finding strategies.
//!
//! All strategies share one skeleton: walk the roots, bucket every file by
//! a key, keep the buckets with two or more members. They differ only in
//! the key — content digest, name+size composite, or fuzzy-name cluster —
//! and in cost: the content scan reads every byte, the name+size scan only
//! stats, and the similarity scan is O(n²) over file names without touching
//! content at all.
//!
//! Buckets are insertion-ordered maps, so group order is first-seen order
//! and members stay in discovery order.

use std::path::{Path, PathBuf};

use indexmap::IndexMap;

use super::{DuplicateGroup, FinderError, GroupKey, ScanContext};
use crate::progress::percent_done;
use crate::scanner::{digest_to_hex, HashError, Hasher, Walker};

/// Find files with byte-identical content.
///
/// Two-phase: a count pass sizes the progress total, then every file is
/// streamed through the hasher and bucketed by digest. Files that cannot
/// be read are logged and excluded from every bucket. Progress fires after
/// each file. Cancellation mid-scan discards all partial buckets and
/// returns an empty result.
#[must_use]
pub fn find_duplicates_by_hash(roots: &[PathBuf], ctx: &ScanContext) -> Vec<DuplicateGroup> {
    let walker = Walker::new(roots);
    let total = walker.count();
    let hasher = Hasher::new().with_cancel(ctx.cancel_token());

    let mut buckets: IndexMap<String, Vec<PathBuf>> = IndexMap::new();
    let mut processed: u64 = 0;

    for path in walker.files() {
        if ctx.is_cancelled() {
            log::info!("Content scan cancelled after {processed} of {total} files");
            return Vec::new();
        }

        match hasher.hash_file(&path) {
            Ok(digest) => buckets
                .entry(digest_to_hex(&digest))
                .or_default()
                .push(path),
            Err(HashError::Cancelled) => {
                log::info!("Content scan cancelled mid-file");
                return Vec::new();
            }
            Err(err) => log::warn!("Skipping unhashable file: {err}"),
        }

        processed += 1;
        ctx.report(
            percent_done(processed, total),
            &format!("Processing files: {processed}/{total}"),
        );
    }

    collect_groups(buckets, GroupKey::Content)
}

/// Find files that coincide in exact name and byte size.
///
/// No content is read; a stat per file is the whole cost. Same-name
/// same-size files with different content do group together — that is the
/// point of this cheaper, looser strategy.
#[must_use]
pub fn find_duplicates_by_name_size(roots: &[PathBuf], ctx: &ScanContext) -> Vec<DuplicateGroup> {
    let walker = Walker::new(roots);
    let total = walker.count();

    let mut buckets: IndexMap<(String, u64), Vec<PathBuf>> = IndexMap::new();
    let mut processed: u64 = 0;

    for path in walker.files() {
        if ctx.is_cancelled() {
            log::info!("Name+size scan cancelled after {processed} of {total} files");
            return Vec::new();
        }

        match std::fs::metadata(&path) {
            Ok(meta) => buckets
                .entry((file_name_of(&path), meta.len()))
                .or_default()
                .push(path),
            Err(err) => log::warn!("Skipping unreadable file {}: {err}", path.display()),
        }

        processed += 1;
        ctx.report(
            percent_done(processed, total),
            &format!("Processing files: {processed}/{total}"),
        );
    }

    collect_groups(buckets, |(name, size)| GroupKey::NameSize { name, size })
}

/// Cluster files whose names are similar but not necessarily identical.
///
/// `threshold` must lie in `(0.0, 1.0]` and is checked before any
/// traversal. The full file list is materialized, then each unordered pair
/// is scored once with [`name_similarity`]; qualifying pairs merge into the
/// first existing cluster containing either path, or open a new cluster.
/// Merging is deliberately not transitive: clusters are never unioned with
/// each other, and a path can appear in more than one cluster when it
/// bridges two that already exist. Progress fires every 100 comparisons
/// over the n·(n−1)/2 total.
pub fn find_similar_files(
    roots: &[PathBuf],
    threshold: f64,
    ctx: &ScanContext,
) -> Result<Vec<DuplicateGroup>, FinderError> {
    if !(threshold > 0.0 && threshold <= 1.0) {
        return Err(FinderError::ThresholdOutOfRange(threshold));
    }

    let walker = Walker::new(roots);
    let mut all_files: Vec<(PathBuf, String)> = Vec::new();
    for path in walker.files() {
        if ctx.is_cancelled() {
            log::info!("Similarity scan cancelled while collecting files");
            return Ok(Vec::new());
        }
        let name = file_name_of(&path);
        all_files.push((path, name));
    }

    let n = all_files.len() as u64;
    let total = n.saturating_mul(n.saturating_sub(1)) / 2;

    let mut clusters: IndexMap<u32, Vec<PathBuf>> = IndexMap::new();
    let mut cluster_count: u32 = 0;
    let mut compared: u64 = 0;

    for i in 0..all_files.len() {
        for j in (i + 1)..all_files.len() {
            if ctx.is_cancelled() {
                log::info!("Similarity scan cancelled after {compared} of {total} comparisons");
                return Ok(Vec::new());
            }

            let (path_a, name_a) = &all_files[i];
            let (path_b, name_b) = &all_files[j];

            if name_similarity(name_a, name_b) >= threshold {
                let existing = clusters
                    .values_mut()
                    .find(|members| members.contains(path_a) || members.contains(path_b));
                match existing {
                    Some(members) => {
                        if !members.contains(path_a) {
                            members.push(path_a.clone());
                        }
                        if !members.contains(path_b) {
                            members.push(path_b.clone());
                        }
                    }
                    None => {
                        clusters.insert(cluster_count, vec![path_a.clone(), path_b.clone()]);
                        cluster_count += 1;
                    }
                }
            }

            compared += 1;
            if compared % 100 == 0 {
                ctx.report(
                    percent_done(compared, total),
                    &format!("Comparing files: {compared}/{total}"),
                );
            }
        }
    }

    Ok(clusters
        .into_iter()
        .map(|(id, paths)| DuplicateGroup::new(GroupKey::Similar(id), paths))
        .collect())
}

/// Jaro-Winkler similarity between two file names, in `0.0..=1.0`.
///
/// Equals 1.0 exactly when the names are identical, so a threshold of 1.0
/// degenerates to exact-name clustering. Comparison is case sensitive.
#[must_use]
pub fn name_similarity(a: &str, b: &str) -> f64 {
    strsim::jaro_winkler(a, b)
}

/// Keep buckets with two or more members, in first-seen order.
fn collect_groups<K>(
    buckets: IndexMap<K, Vec<PathBuf>>,
    into_key: impl Fn(K) -> GroupKey,
) -> Vec<DuplicateGroup>
where
    K: std::hash::Hash + Eq,
{
    buckets
        .into_iter()
        .filter(|(_, paths)| paths.len() > 1)
        .map(|(key, paths)| DuplicateGroup::new(into_key(key), paths))
        .collect()
}

fn file_name_of(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_name_similarity_versioned_names_stay_close() {
        assert!(name_similarity("report.txt", "report_v2.txt") >= 0.8);
    }

    #[test]
    fn test_name_similarity_unrelated_names_stay_apart() {
        assert!(name_similarity("invoice.pdf", "report.txt") < 0.8);
        assert!(name_similarity("invoice.pdf", "report_v2.txt") < 0.8);
    }

    #[test]
    fn test_name_similarity_identical_is_exactly_one() {
        assert_eq!(name_similarity("archive.tar.gz", "archive.tar.gz"), 1.0);
    }

    #[test]
    fn test_name_similarity_near_identical_is_below_one() {
        assert!(name_similarity("quarterly_report_v1.txt", "quarterly_report_v2.txt") < 1.0);
    }

    #[test]
    fn test_name_similarity_is_case_sensitive() {
        assert!(name_similarity("README.md", "readme.md") < 1.0);
    }

    #[test]
    fn test_similar_rejects_threshold_outside_domain() {
        let ctx = ScanContext::new();
        for bad in [0.0, -0.2, 1.01, 2.0] {
            let err = find_similar_files(&[], bad, &ctx).unwrap_err();
            assert_eq!(err, FinderError::ThresholdOutOfRange(bad));
        }
    }

    #[test]
    fn test_similar_rejects_nan_threshold() {
        let ctx = ScanContext::new();
        assert!(find_similar_files(&[], f64::NAN, &ctx).is_err());
    }

    #[test]
    fn test_similar_accepts_domain_boundaries() {
        let ctx = ScanContext::new();
        assert!(find_similar_files(&[], 1.0, &ctx).is_ok());
        assert!(find_similar_files(&[], 0.001, &ctx).is_ok());
    }

    #[test]
    fn test_file_name_of_uses_final_component() {
        assert_eq!(file_name_of(Path::new("/a/b/notes.txt")), "notes.txt");
    }
}
