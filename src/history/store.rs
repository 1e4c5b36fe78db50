//! Persistent map from calendar date to the files active that day.

use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};

use anyhow::Context;
use chrono::{DateTime, Local, NaiveDate};

use crate::scanner::Walker;

/// Date-keyed record of file activity.
///
/// Keys are local calendar dates; the JSON document uses their ISO
/// `YYYY-MM-DD` rendering, with each date mapping to an array of absolute
/// paths. "Today" is captured once at construction: a process that runs
/// across midnight keeps filing live events under its start date, matching
/// how the watcher has always behaved.
///
/// Every mutating operation persists the full document before returning.
/// Persistence failures are logged and swallowed; the in-memory map stays
/// authoritative for the rest of the process.
#[derive(Debug)]
pub struct HistoryStore {
    path: PathBuf,
    today: NaiveDate,
    dates: BTreeMap<NaiveDate, BTreeSet<PathBuf>>,
}

impl HistoryStore {
    /// Load history from `path`, or start empty.
    ///
    /// A missing file is the normal first run. An unreadable or
    /// unparseable file is logged and treated as empty rather than
    /// blocking startup; the next persist overwrites it.
    #[must_use]
    pub fn load(path: &Path) -> Self {
        let dates = match std::fs::read_to_string(path) {
            Ok(content) => match serde_json::from_str(&content) {
                Ok(dates) => dates,
                Err(err) => {
                    log::warn!(
                        "Ignoring unparseable history file {}: {err}",
                        path.display()
                    );
                    BTreeMap::new()
                }
            },
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => BTreeMap::new(),
            Err(err) => {
                log::warn!("Could not read history file {}: {err}", path.display());
                BTreeMap::new()
            }
        };

        Self {
            path: path.to_path_buf(),
            today: Local::now().date_naive(),
            dates,
        }
    }

    /// The date live events are filed under.
    #[must_use]
    pub fn today(&self) -> NaiveDate {
        self.today
    }

    /// Write the full document to disk.
    ///
    /// Writes a sibling temp file first and renames it into place, so a
    /// crash mid-write leaves the previous document intact. Called
    /// automatically after every mutation; failures are logged.
    pub fn persist(&self) {
        if let Err(err) = self.try_persist() {
            log::warn!("Could not persist history to {}: {err:#}", self.path.display());
        }
    }

    fn try_persist(&self) -> anyhow::Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("creating {}", parent.display()))?;
        }
        let json = serde_json::to_string_pretty(&self.dates).context("serializing history")?;
        let tmp = self.path.with_extension("json.tmp");
        std::fs::write(&tmp, json).with_context(|| format!("writing {}", tmp.display()))?;
        std::fs::rename(&tmp, &self.path)
            .with_context(|| format!("replacing {}", self.path.display()))?;
        Ok(())
    }

    /// Record files under `root` whose mtime falls on `date`.
    ///
    /// Unions into the date's existing set, so repeating a backfill is
    /// idempotent. Returns `false` without mutating anything when `root`
    /// does not exist. Files that cannot be stat'ed are skipped. The date
    /// entry is created even when nothing matches, which records "this
    /// date has been backfilled and was empty".
    pub fn backfill(&mut self, date: NaiveDate, root: &Path) -> bool {
        if !root.exists() {
            log::debug!("Backfill root {} does not exist", root.display());
            return false;
        }

        let walker = Walker::new(&[root.to_path_buf()]);
        let entry = self.dates.entry(date).or_default();
        let before = entry.len();

        for path in walker.files() {
            let modified = match std::fs::metadata(&path).and_then(|meta| meta.modified()) {
                Ok(modified) => modified,
                Err(err) => {
                    log::debug!("Skipping unreadable file {}: {err}", path.display());
                    continue;
                }
            };
            if DateTime::<Local>::from(modified).date_naive() == date {
                entry.insert(path);
            }
        }

        let added = entry.len() - before;
        log::debug!("Backfill of {} added {added} files for {date}", root.display());
        self.persist();
        true
    }

    /// File one live event under today.
    ///
    /// Directory events are dropped; only files are history. Duplicate
    /// paths collapse into the set. Persists immediately, so the document
    /// on disk always reflects the last event.
    pub fn ingest(&mut self, path: &Path, is_directory: bool) {
        if is_directory {
            return;
        }
        self.dates
            .entry(self.today)
            .or_default()
            .insert(path.to_path_buf());
        self.persist();
    }

    /// Paths recorded for `date`, optionally filtered to the given roots.
    ///
    /// The filter is a plain string-prefix test on the rendered path, not
    /// a path-component comparison: filtering by `/a/b` also matches
    /// `/a/bc/file`. An empty filter list behaves like no filter. Results
    /// come back in the set's sorted order.
    #[must_use]
    pub fn query(&self, date: NaiveDate, roots: Option<&[PathBuf]>) -> Vec<PathBuf> {
        let Some(entries) = self.dates.get(&date) else {
            return Vec::new();
        };
        entries
            .iter()
            .filter(|path| match roots {
                Some(roots) if !roots.is_empty() => {
                    roots.iter().any(|root| has_string_prefix(path, root))
                }
                _ => true,
            })
            .cloned()
            .collect()
    }

    /// Drop every recorded path under `root`, across all dates.
    ///
    /// Uses the same string-prefix match as [`HistoryStore::query`]. Date
    /// entries emptied by the removal stay in the map. Returns how many
    /// paths were removed.
    pub fn forget(&mut self, root: &Path) -> usize {
        let mut removed = 0;
        for entries in self.dates.values_mut() {
            let before = entries.len();
            entries.retain(|path| !has_string_prefix(path, root));
            removed += before - entries.len();
        }
        self.persist();
        removed
    }
}

/// String-prefix containment check used by query and forget.
///
/// Deliberately not boundary aware, so removing or filtering by a root
/// also covers look-alike siblings (`/a/b` matches `/a/bc/file`). The
/// stored paths came from the same walker and watcher that produced the
/// roots, so in practice prefixes line up.
fn has_string_prefix(path: &Path, root: &Path) -> bool {
    path.to_string_lossy()
        .starts_with(root.to_string_lossy().as_ref())
}
