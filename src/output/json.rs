//! JSON report rendering for scripting consumers.

use std::path::PathBuf;

use chrono::NaiveDate;
use serde::Serialize;

use super::FileRecord;
use crate::duplicates::{DirectoryStats, DuplicateGroup};

#[derive(Debug, Serialize)]
struct GroupRecord {
    key: String,
    kind: &'static str,
    files: Vec<FileRecord>,
}

#[derive(Debug, Serialize)]
struct GroupsDocument {
    group_count: usize,
    groups: Vec<GroupRecord>,
}

#[derive(Debug, Serialize)]
struct HistoryDocument<'a> {
    date: NaiveDate,
    count: usize,
    files: &'a [PathBuf],
}

/// Serialize duplicate groups, probing member details now.
///
/// # Errors
///
/// Returns an error if serialization fails (unlikely for valid data).
pub fn render_groups(groups: &[DuplicateGroup]) -> serde_json::Result<String> {
    let document = GroupsDocument {
        group_count: groups.len(),
        groups: groups
            .iter()
            .map(|group| GroupRecord {
                key: group.key.to_string(),
                kind: group.key.kind(),
                files: group
                    .paths
                    .iter()
                    .map(|path| FileRecord::probe(path))
                    .collect(),
            })
            .collect(),
    };
    serde_json::to_string_pretty(&document)
}

/// Serialize a directory stats report.
///
/// # Errors
///
/// Returns an error if serialization fails (unlikely for valid data).
pub fn render_stats(stats: &DirectoryStats) -> serde_json::Result<String> {
    serde_json::to_string_pretty(stats)
}

/// Serialize the history listing for one date.
///
/// # Errors
///
/// Returns an error if serialization fails (unlikely for valid data).
pub fn render_history(date: NaiveDate, paths: &[PathBuf]) -> serde_json::Result<String> {
    let document = HistoryDocument {
        date,
        count: paths.len(),
        files: paths,
    };
    serde_json::to_string_pretty(&document)
}
