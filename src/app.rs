//! Application orchestration.
//!
//! Wires parsed CLI commands to the scan engine, the history store, and the
//! report renderers, and maps outcomes to process exit codes. Scans run on a
//! worker thread while the calling thread drains progress updates into the
//! terminal renderer, so all drawing happens on one thread and Ctrl+C stays
//! responsive.

use std::path::Path;
use std::thread;
use std::time::Duration;

use anyhow::Result;
use bytesize::ByteSize;

use crate::cli::{
    Cli, Commands, DupesArgs, DupesBy, HistoryCommands, OutputFormat, RootsCommands, SimilarArgs,
    StatsArgs,
};
use crate::config::{self, Config};
use crate::duplicates::{self, DuplicateGroup, ScanContext};
use crate::error::ExitCode;
use crate::history::{FileWatch, HistoryStore};
use crate::output;
use crate::progress::{ChannelSink, Progress, ProgressSink};
use crate::signal::{self, CancelToken};

/// How long the watch loop blocks on the event channel before rechecking
/// the cancellation token.
const WATCH_POLL_INTERVAL: Duration = Duration::from_millis(250);

/// Run the application and produce the process exit code.
///
/// # Errors
///
/// Returns an error for unexpected failures (unwritable config, watcher
/// initialization, render serialization). Expected outcomes, including
/// interruption and empty results, are reported through the exit code.
pub fn run_app(cli: Cli) -> Result<ExitCode> {
    let Cli {
        verbose,
        quiet,
        no_color,
        config_file,
        history_file,
        command,
        ..
    } = cli;

    crate::logging::init_logging(verbose, quiet);

    if no_color {
        yansi::disable();
    }

    let config_path = match config_file {
        Some(path) => path,
        None => config::default_config_path()?,
    };
    let history_path = match history_file {
        Some(path) => path,
        None => config::default_history_path()?,
    };

    match command {
        Commands::Dupes(args) => run_dupes(&args, quiet),
        Commands::Similar(args) => run_similar(&args, quiet),
        Commands::Stats(args) => run_stats(&args, quiet),
        Commands::History { command } => run_history(&command, &history_path),
        Commands::Roots { command } => run_roots(&command, &config_path, &history_path),
        Commands::Watch => run_watch(&config_path, &history_path),
    }
}

fn run_dupes(args: &DupesArgs, quiet: bool) -> Result<ExitCode> {
    let token = signal::install_ctrlc();
    let renderer = Progress::percent_bar(quiet);
    let roots = args.roots.clone();
    let by = args.by;

    let groups = run_scan(&renderer, token.clone(), move |ctx| match by {
        DupesBy::Hash => duplicates::find_duplicates_by_hash(&roots, &ctx),
        DupesBy::NameSize => duplicates::find_duplicates_by_name_size(&roots, &ctx),
    })?;

    if token.is_cancelled() {
        return Ok(ExitCode::Interrupted);
    }

    emit_groups(&groups, args.output)?;

    if args.delete_extras && !groups.is_empty() {
        let (deleted, reclaimed) = delete_group_extras(&groups, args.permanent);
        let summary = format!(
            "Deleted {deleted} file(s), reclaimed {}",
            ByteSize::b(reclaimed)
        );
        match args.output {
            OutputFormat::Text => println!("{summary}"),
            OutputFormat::Json => log::info!("{summary}"),
        }
    }

    Ok(verdict(!groups.is_empty()))
}

fn run_similar(args: &SimilarArgs, quiet: bool) -> Result<ExitCode> {
    let token = signal::install_ctrlc();
    let renderer = Progress::percent_bar(quiet);
    let roots = args.roots.clone();
    let threshold = args.threshold;

    let groups = run_scan(&renderer, token.clone(), move |ctx| {
        duplicates::find_similar_files(&roots, threshold, &ctx)
    })??;

    if token.is_cancelled() {
        return Ok(ExitCode::Interrupted);
    }

    emit_groups(&groups, args.output)?;
    Ok(verdict(!groups.is_empty()))
}

fn run_stats(args: &StatsArgs, quiet: bool) -> Result<ExitCode> {
    let token = signal::install_ctrlc();
    let renderer = Progress::spinner(quiet);
    let roots = args.roots.clone();

    let stats = run_scan(&renderer, token.clone(), move |ctx| {
        duplicates::scan_directories(&roots, &ctx)
    })?;

    if token.is_cancelled() {
        return Ok(ExitCode::Interrupted);
    }

    match args.output {
        OutputFormat::Text => print!("{}", output::text::render_stats(&stats)),
        OutputFormat::Json => println!("{}", output::json::render_stats(&stats)?),
    }

    // A stats report is always a result, even over an empty tree.
    Ok(ExitCode::Success)
}

fn run_history(command: &HistoryCommands, history_path: &Path) -> Result<ExitCode> {
    match command {
        HistoryCommands::Show(args) => {
            let store = HistoryStore::load(history_path);
            let date = args.date.unwrap_or_else(|| store.today());
            let filter = (!args.roots.is_empty()).then_some(args.roots.as_slice());
            let files = store.query(date, filter);

            match args.output {
                OutputFormat::Text => print!("{}", output::text::render_history(date, &files)),
                OutputFormat::Json => println!("{}", output::json::render_history(date, &files)?),
            }
            Ok(verdict(!files.is_empty()))
        }
        HistoryCommands::Backfill(args) => {
            let mut store = HistoryStore::load(history_path);
            if !store.backfill(args.date, &args.root) {
                anyhow::bail!("directory does not exist: {}", args.root.display());
            }

            let recorded = store
                .query(args.date, Some(std::slice::from_ref(&args.root)))
                .len();
            println!(
                "Recorded {recorded} file(s) for {} under {}",
                args.date,
                args.root.display()
            );
            Ok(ExitCode::Success)
        }
    }
}

fn run_roots(command: &RootsCommands, config_path: &Path, history_path: &Path) -> Result<ExitCode> {
    let mut cfg = Config::load(config_path);

    match command {
        RootsCommands::Add { path } => {
            if cfg.add_root(path.clone()) {
                cfg.save(config_path)?;
                println!("Watching {}", path.display());
            } else {
                println!("Already watching {}", path.display());
            }
            Ok(ExitCode::Success)
        }
        RootsCommands::Remove { path } => {
            if cfg.remove_root(path) {
                cfg.save(config_path)?;
                let mut store = HistoryStore::load(history_path);
                let forgotten = store.forget(path);
                println!(
                    "Stopped watching {} ({forgotten} history entries forgotten)",
                    path.display()
                );
                Ok(ExitCode::Success)
            } else {
                println!("Not watching {}", path.display());
                Ok(ExitCode::NoMatches)
            }
        }
        RootsCommands::List => {
            if cfg.watch_roots.is_empty() {
                println!("No watched roots.");
            } else {
                for root in &cfg.watch_roots {
                    println!("{}", root.display());
                }
            }
            Ok(ExitCode::Success)
        }
    }
}

fn run_watch(config_path: &Path, history_path: &Path) -> Result<ExitCode> {
    let cfg = Config::load(config_path);
    if cfg.watch_roots.is_empty() {
        anyhow::bail!("no watched roots configured; add one with `dupewatch roots add <PATH>`");
    }

    let token = signal::install_ctrlc();
    let mut store = HistoryStore::load(history_path);
    let watch = FileWatch::start(&cfg.watch_roots)?;
    if watch.watched_roots() == 0 {
        anyhow::bail!("none of the configured roots exist");
    }

    println!(
        "Recording file activity for {} (Ctrl+C to stop)",
        store.today()
    );

    while !token.is_cancelled() {
        if let Some(event) = watch.try_next(WATCH_POLL_INTERVAL) {
            store.ingest(&event.path, event.is_directory);
        }
    }

    cfg.save(config_path)?;
    log::info!("watch loop stopped");
    Ok(ExitCode::Interrupted)
}

/// Run `scan` on a worker thread while draining its progress updates into
/// `renderer` on the calling thread.
///
/// Returns once the worker finishes and the update channel closes. The
/// worker sees cancellation through the context built around `token`.
fn run_scan<T, F>(renderer: &Progress, token: CancelToken, scan: F) -> Result<T>
where
    T: Send + 'static,
    F: FnOnce(ScanContext) -> T + Send + 'static,
{
    let (sink, updates) = ChannelSink::channel();
    let ctx = ScanContext::new().with_cancel(token).with_progress(sink);

    let worker = thread::spawn(move || scan(ctx));

    // Ends when the worker drops its context, closing the last sender.
    for update in updates {
        renderer.report(update.percent, &update.message);
    }
    renderer.finish();

    worker
        .join()
        .map_err(|_| anyhow::anyhow!("scan worker panicked"))
}

fn emit_groups(groups: &[DuplicateGroup], format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Text => print!("{}", output::text::render_groups(groups)),
        OutputFormat::Json => println!("{}", output::json::render_groups(groups)?),
    }
    Ok(())
}

/// Trash or permanently delete every group member after the first.
///
/// Failures are logged and skipped so one locked file does not abort the
/// rest of the cleanup. Returns how many files went away and their total
/// size.
fn delete_group_extras(groups: &[DuplicateGroup], permanent: bool) -> (usize, u64) {
    let mut deleted = 0usize;
    let mut reclaimed = 0u64;

    for group in groups {
        for path in group.extras() {
            match crate::actions::delete_file(path, permanent) {
                Ok(size) => {
                    deleted += 1;
                    reclaimed += size;
                }
                Err(err) => log::warn!("Failed to delete {}: {err}", path.display()),
            }
        }
    }
    (deleted, reclaimed)
}

fn verdict(found: bool) -> ExitCode {
    if found {
        ExitCode::Success
    } else {
        ExitCode::NoMatches
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::HistoryShowArgs;
    use crate::duplicates::GroupKey;
    use chrono::NaiveDate;
    use std::path::PathBuf;
    use tempfile::TempDir;

    #[test]
    fn test_verdict_mapping() {
        assert_eq!(verdict(true), ExitCode::Success);
        assert_eq!(verdict(false), ExitCode::NoMatches);
    }

    #[test]
    fn test_run_scan_returns_worker_result() {
        let renderer = Progress::percent_bar(true);
        let result =
            run_scan(&renderer, CancelToken::new(), |ctx| {
                ctx.cancel_token().is_cancelled()
            })
            .unwrap();
        assert!(!result);
    }

    #[test]
    fn test_run_scan_delivers_progress_to_renderer() {
        // The quiet renderer swallows updates; this exercises the drain
        // loop shutting down cleanly once the worker is done.
        let renderer = Progress::percent_bar(true);
        let value = run_scan(&renderer, CancelToken::new(), |ctx| {
            for step in 0..5 {
                ctx.report(f64::from(step) * 20.0, "step");
            }
            42
        })
        .unwrap();
        assert_eq!(value, 42);
    }

    #[test]
    fn test_delete_group_extras_keeps_first_member() {
        let tmp = TempDir::new().unwrap();
        let keep = tmp.path().join("keep.txt");
        let extra = tmp.path().join("extra.txt");
        std::fs::write(&keep, b"same").unwrap();
        std::fs::write(&extra, b"same").unwrap();

        let groups = vec![DuplicateGroup::new(
            GroupKey::Content("k".to_string()),
            vec![keep.clone(), extra.clone()],
        )];

        let (deleted, reclaimed) = delete_group_extras(&groups, true);
        assert_eq!(deleted, 1);
        assert_eq!(reclaimed, 4);
        assert!(keep.exists());
        assert!(!extra.exists());
    }

    #[test]
    fn test_delete_group_extras_skips_failures() {
        let tmp = TempDir::new().unwrap();
        let keep = tmp.path().join("keep.txt");
        std::fs::write(&keep, b"same").unwrap();

        let groups = vec![DuplicateGroup::new(
            GroupKey::Content("k".to_string()),
            vec![keep.clone(), tmp.path().join("already-gone.txt")],
        )];

        let (deleted, reclaimed) = delete_group_extras(&groups, true);
        assert_eq!(deleted, 0);
        assert_eq!(reclaimed, 0);
        assert!(keep.exists());
    }

    #[test]
    fn test_run_roots_add_list_remove_flow() {
        let tmp = TempDir::new().unwrap();
        let config_path = tmp.path().join("config.json");
        let history_path = tmp.path().join("history.json");

        let add = RootsCommands::Add {
            path: PathBuf::from("/w/projects"),
        };
        assert_eq!(
            run_roots(&add, &config_path, &history_path).unwrap(),
            ExitCode::Success
        );
        assert_eq!(
            Config::load(&config_path).watch_roots,
            vec![PathBuf::from("/w/projects")]
        );

        let remove = RootsCommands::Remove {
            path: PathBuf::from("/w/projects"),
        };
        assert_eq!(
            run_roots(&remove, &config_path, &history_path).unwrap(),
            ExitCode::Success
        );
        assert!(Config::load(&config_path).watch_roots.is_empty());

        // Removing again finds nothing to do.
        assert_eq!(
            run_roots(&remove, &config_path, &history_path).unwrap(),
            ExitCode::NoMatches
        );
    }

    #[test]
    fn test_run_roots_remove_forgets_history() {
        let tmp = TempDir::new().unwrap();
        let config_path = tmp.path().join("config.json");
        let history_path = tmp.path().join("history.json");

        let watched = tmp.path().join("watched");
        let add = RootsCommands::Add {
            path: watched.clone(),
        };
        run_roots(&add, &config_path, &history_path).unwrap();

        let mut store = HistoryStore::load(&history_path);
        store.ingest(&watched.join("seen.txt"), false);
        let today = store.today();
        drop(store);

        let remove = RootsCommands::Remove {
            path: watched.clone(),
        };
        run_roots(&remove, &config_path, &history_path).unwrap();

        let store = HistoryStore::load(&history_path);
        assert!(store.query(today, None).is_empty());
    }

    #[test]
    fn test_run_history_backfill_missing_root_fails() {
        let tmp = TempDir::new().unwrap();
        let history_path = tmp.path().join("history.json");

        let command = HistoryCommands::Backfill(crate::cli::HistoryBackfillArgs {
            date: NaiveDate::from_ymd_opt(2024, 5, 1).unwrap(),
            root: tmp.path().join("does-not-exist"),
        });
        assert!(run_history(&command, &history_path).is_err());
    }

    #[test]
    fn test_run_history_show_reports_no_matches_when_empty() {
        let tmp = TempDir::new().unwrap();
        let history_path = tmp.path().join("history.json");

        let command = HistoryCommands::Show(HistoryShowArgs {
            date: NaiveDate::from_ymd_opt(2024, 5, 1),
            roots: Vec::new(),
            output: OutputFormat::Text,
        });
        assert_eq!(
            run_history(&command, &history_path).unwrap(),
            ExitCode::NoMatches
        );
    }

    #[test]
    fn test_run_watch_without_roots_fails() {
        let tmp = TempDir::new().unwrap();
        let config_path = tmp.path().join("config.json");
        let history_path = tmp.path().join("history.json");

        assert!(run_watch(&config_path, &history_path).is_err());
    }
}
