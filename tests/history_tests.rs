use std::fs;
use std::path::{Path, PathBuf};

use chrono::{Datelike, Local, NaiveDate, TimeZone};
use dupewatch::history::HistoryStore;
use filetime::FileTime;
use tempfile::tempdir;

/// Pin a file's mtime to local noon on `date`. Noon keeps the local
/// calendar date stable regardless of timezone offset or DST shifts.
fn set_mtime(path: &Path, date: NaiveDate) {
    let local_noon = Local
        .with_ymd_and_hms(date.year(), date.month(), date.day(), 12, 0, 0)
        .unwrap();
    filetime::set_file_mtime(path, FileTime::from_system_time(local_noon.into())).unwrap();
}

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

#[test]
fn test_backfill_records_only_files_modified_on_date() {
    let tmp = tempdir().unwrap();
    let root = tmp.path().join("watched");
    fs::create_dir_all(&root).unwrap();

    let on_date_a = root.join("edited_monday.txt");
    let on_date_b = root.join("also_monday.txt");
    let other_day = root.join("edited_tuesday.txt");
    fs::write(&on_date_a, b"a").unwrap();
    fs::write(&on_date_b, b"b").unwrap();
    fs::write(&other_day, b"c").unwrap();

    let monday = date(2024, 5, 6);
    set_mtime(&on_date_a, monday);
    set_mtime(&on_date_b, monday);
    set_mtime(&other_day, date(2024, 5, 7));

    let history_path = tmp.path().join("history.json");
    let mut store = HistoryStore::load(&history_path);
    assert!(store.backfill(monday, &root));

    let mut expected = vec![on_date_a, on_date_b];
    expected.sort();
    assert_eq!(store.query(monday, None), expected);

    // Tuesday was never backfilled, so it has no entry at all.
    assert!(store.query(date(2024, 5, 7), None).is_empty());
}

#[test]
fn test_backfill_is_idempotent() {
    let tmp = tempdir().unwrap();
    let root = tmp.path().join("watched");
    fs::create_dir_all(&root).unwrap();

    let file = root.join("note.txt");
    fs::write(&file, b"x").unwrap();
    let day = date(2024, 5, 6);
    set_mtime(&file, day);

    let mut store = HistoryStore::load(&tmp.path().join("history.json"));
    assert!(store.backfill(day, &root));
    assert!(store.backfill(day, &root));

    assert_eq!(store.query(day, None), vec![file]);
}

#[test]
fn test_backfill_unions_into_existing_entry() {
    let tmp = tempdir().unwrap();
    let root = tmp.path().join("watched");
    fs::create_dir_all(&root).unwrap();

    let first = root.join("first.txt");
    fs::write(&first, b"x").unwrap();
    let day = date(2024, 5, 6);
    set_mtime(&first, day);

    let mut store = HistoryStore::load(&tmp.path().join("history.json"));
    store.backfill(day, &root);

    // A file appears later with the same modification date; a re-run
    // adds it without losing what was already recorded.
    let second = root.join("second.txt");
    fs::write(&second, b"y").unwrap();
    set_mtime(&second, day);
    store.backfill(day, &root);

    let mut expected = vec![first, second];
    expected.sort();
    assert_eq!(store.query(day, None), expected);
}

#[test]
fn test_backfill_quiet_date_persists_empty_entry() {
    let tmp = tempdir().unwrap();
    let root = tmp.path().join("watched");
    fs::create_dir_all(&root).unwrap();
    fs::write(root.join("recent.txt"), b"x").unwrap();

    let quiet_day = date(2020, 1, 1);
    let history_path = tmp.path().join("history.json");
    let mut store = HistoryStore::load(&history_path);
    assert!(store.backfill(quiet_day, &root));
    assert!(store.query(quiet_day, None).is_empty());

    // The date key is written out even with nothing under it: the
    // document records that the day was examined and was empty.
    let document: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&history_path).unwrap()).unwrap();
    let entry = &document["2020-01-01"];
    assert!(entry.is_array());
    assert_eq!(entry.as_array().unwrap().len(), 0);
}

#[test]
fn test_backfill_file_root_is_accepted_but_records_nothing() {
    let tmp = tempdir().unwrap();
    let file_root = tmp.path().join("not_a_dir.txt");
    fs::write(&file_root, b"x").unwrap();

    let day = date(2024, 5, 6);
    let mut store = HistoryStore::load(&tmp.path().join("history.json"));

    // Existence is the only gate; a non-directory just walks as empty.
    assert!(store.backfill(day, &file_root));
    assert!(store.query(day, None).is_empty());
}

#[test]
fn test_history_survives_reload_across_dates() {
    let tmp = tempdir().unwrap();
    let root = tmp.path().join("watched");
    fs::create_dir_all(&root).unwrap();

    let monday_file = root.join("monday.txt");
    let friday_file = root.join("friday.txt");
    fs::write(&monday_file, b"m").unwrap();
    fs::write(&friday_file, b"f").unwrap();
    let monday = date(2024, 5, 6);
    let friday = date(2024, 5, 10);
    set_mtime(&monday_file, monday);
    set_mtime(&friday_file, friday);

    let history_path = tmp.path().join("history.json");
    {
        let mut store = HistoryStore::load(&history_path);
        store.backfill(monday, &root);
        store.backfill(friday, &root);
    }

    let reloaded = HistoryStore::load(&history_path);
    assert_eq!(reloaded.query(monday, None), vec![monday_file]);
    assert_eq!(reloaded.query(friday, None), vec![friday_file]);
}

#[test]
fn test_forget_scopes_to_root_across_dates() {
    let tmp = tempdir().unwrap();
    let kept_root = tmp.path().join("kept");
    let gone_root = tmp.path().join("gone");
    fs::create_dir_all(&kept_root).unwrap();
    fs::create_dir_all(&gone_root).unwrap();

    let monday = date(2024, 5, 6);
    let friday = date(2024, 5, 10);

    let kept_mon = kept_root.join("a.txt");
    let gone_mon = gone_root.join("b.txt");
    let gone_fri = gone_root.join("c.txt");
    for (path, day) in [
        (&kept_mon, monday),
        (&gone_mon, monday),
        (&gone_fri, friday),
    ] {
        fs::write(path, b"x").unwrap();
        set_mtime(path, day);
    }

    let history_path = tmp.path().join("history.json");
    let mut store = HistoryStore::load(&history_path);
    store.backfill(monday, &kept_root);
    store.backfill(monday, &gone_root);
    store.backfill(friday, &gone_root);

    let removed = store.forget(&gone_root);
    assert_eq!(removed, 2);
    assert_eq!(store.query(monday, None), vec![kept_mon]);
    assert!(store.query(friday, None).is_empty());

    // Removal is durable.
    let reloaded = HistoryStore::load(&history_path);
    assert_eq!(reloaded.query(monday, None).len(), 1);
    assert!(reloaded.query(friday, None).is_empty());
}

#[test]
fn test_query_filters_by_backfilled_root() {
    let tmp = tempdir().unwrap();
    let projects = tmp.path().join("projects");
    let photos = tmp.path().join("photos");
    fs::create_dir_all(&projects).unwrap();
    fs::create_dir_all(&photos).unwrap();

    let day = date(2024, 5, 6);
    let code = projects.join("main.rs");
    let shot = photos.join("beach.jpg");
    for path in [&code, &shot] {
        fs::write(path, b"x").unwrap();
        set_mtime(path, day);
    }

    let mut store = HistoryStore::load(&tmp.path().join("history.json"));
    store.backfill(day, &projects);
    store.backfill(day, &photos);

    assert_eq!(store.query(day, None).len(), 2);
    assert_eq!(
        store.query(day, Some(std::slice::from_ref(&projects))),
        vec![code]
    );
    assert!(store
        .query(day, Some(&[PathBuf::from("/nowhere")]))
        .is_empty());
}

#[test]
fn test_ingest_and_backfill_share_the_document() {
    let tmp = tempdir().unwrap();
    let root = tmp.path().join("watched");
    fs::create_dir_all(&root).unwrap();

    let old_file = root.join("archive.txt");
    fs::write(&old_file, b"x").unwrap();
    let past = date(2024, 1, 15);
    set_mtime(&old_file, past);

    let history_path = tmp.path().join("history.json");
    let mut store = HistoryStore::load(&history_path);
    let today = store.today();

    store.ingest(&root.join("live_event.txt"), false);
    store.backfill(past, &root);

    // A same-process backfill of an older date must not clobber what the
    // live watcher recorded for today.
    assert_eq!(
        store.query(today, None),
        vec![root.join("live_event.txt")]
    );
    assert_eq!(store.query(past, None), vec![old_file]);

    let reloaded = HistoryStore::load(&history_path);
    assert_eq!(reloaded.query(today, None).len(), 1);
    assert_eq!(reloaded.query(past, None).len(), 1);
}
