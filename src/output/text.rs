//! Human-readable report rendering.

use std::fmt::Write;
use std::path::PathBuf;

use bytesize::ByteSize;
use chrono::NaiveDate;
use yansi::Paint;

use super::FileRecord;
use crate::duplicates::{DirectoryStats, DuplicateGroup, GroupKey};

/// Render duplicate groups with per-member details probed now.
#[must_use]
pub fn render_groups(groups: &[DuplicateGroup]) -> String {
    let mut out = String::new();

    if groups.is_empty() {
        let _ = writeln!(out, "No duplicates found.");
        return out;
    }

    let _ = writeln!(out, "{} duplicate group(s)", groups.len().bold());
    for group in groups {
        let _ = writeln!(out);
        let _ = writeln!(
            out,
            "{}  {} file(s)",
            short_key(&group.key).bold(),
            group.len()
        );
        for path in &group.paths {
            let _ = writeln!(out, "  {}", render_member(&FileRecord::probe(path)));
        }
    }
    out
}

/// Render a directory stats report.
#[must_use]
pub fn render_stats(stats: &DirectoryStats) -> String {
    let mut out = String::new();

    let _ = writeln!(out, "Total files: {}", stats.total_files.bold());
    let _ = writeln!(
        out,
        "Total size:  {} ({} bytes)",
        ByteSize::b(stats.total_size).to_string().bold(),
        stats.total_size
    );

    if !stats.extensions.is_empty() {
        let _ = writeln!(out);
        let _ = writeln!(out, "By extension:");
        for (ext, ext_stats) in &stats.extensions {
            let label = if ext.is_empty() { "(none)" } else { ext };
            let _ = writeln!(
                out,
                "  {:<12} {:>8} file(s)  {}",
                label,
                ext_stats.count,
                ByteSize::b(ext_stats.size)
            );
        }
    }

    if !stats.largest_files.is_empty() {
        let _ = writeln!(out);
        let _ = writeln!(out, "Largest files:");
        for largest in &stats.largest_files {
            let _ = writeln!(
                out,
                "  {:>10}  {}",
                ByteSize::b(largest.size).to_string(),
                largest.path.display()
            );
        }
    }

    out
}

/// Render the history listing for one date.
#[must_use]
pub fn render_history(date: NaiveDate, paths: &[PathBuf]) -> String {
    let mut out = String::new();

    if paths.is_empty() {
        let _ = writeln!(out, "No recorded activity for {date}.");
        return out;
    }

    let _ = writeln!(out, "{} file(s) recorded for {}", paths.len().bold(), date);
    for path in paths {
        let _ = writeln!(out, "  {}", path.display());
    }
    out
}

fn render_member(record: &FileRecord) -> String {
    match (record.size, &record.error) {
        (Some(size), _) => {
            let modified = record.modified.as_deref().unwrap_or("-");
            format!(
                "{}  {}  {}",
                record.path.display(),
                ByteSize::b(size),
                modified.dim()
            )
        }
        (None, Some(error)) => format!(
            "{}  {}",
            record.path.display(),
            format!("(unavailable: {error})").dim()
        ),
        (None, None) => record.path.display().to_string(),
    }
}

/// Content digests are 64 hex characters; shorten them for terminal
/// output while leaving composite and synthetic keys intact. The cut
/// counts characters, not bytes, so non-hex key text never splits a
/// code point.
fn short_key(key: &GroupKey) -> String {
    match key {
        GroupKey::Content(hex) => match hex.char_indices().nth(12) {
            Some((cut, _)) => format!("{}…", &hex[..cut]),
            None => hex.clone(),
        },
        other => other.to_string(),
    }
}
