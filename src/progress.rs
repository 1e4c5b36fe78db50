//! Progress reporting.
//!
//! Scan operations emit `(percent, message)` updates through the
//! [`ProgressSink`] trait. The CLI renders them with indicatif via
//! [`Progress`]; scans running on a worker thread hand their updates to a
//! [`ChannelSink`] so a single drain loop on the calling thread does all the
//! terminal drawing.

use std::sync::mpsc::{Receiver, Sender};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};

/// Receiver of scan progress updates.
///
/// `percent` is in `0.0..=100.0`; count-only phases report a fixed `0.0` and
/// carry the running total in the message instead.
pub trait ProgressSink: Send + Sync {
    fn report(&self, percent: f64, message: &str);
}

/// Percentage of `processed` out of `total`.
///
/// A zero total is answered with `0.0` rather than dividing; empty scans
/// report a flat zero until completion.
#[must_use]
pub fn percent_done(processed: u64, total: u64) -> f64 {
    if total == 0 {
        return 0.0;
    }
    processed as f64 / total as f64 * 100.0
}

/// One progress update crossing a thread boundary.
#[derive(Debug, Clone, PartialEq)]
pub struct ProgressUpdate {
    pub percent: f64,
    pub message: String,
}

/// [`ProgressSink`] that forwards updates over an mpsc channel.
///
/// The receiver half is drained on the thread that owns the terminal, which
/// keeps all rendering on one consistent thread. Send failures are ignored:
/// a dropped receiver just means nobody is listening anymore.
pub struct ChannelSink {
    tx: Mutex<Sender<ProgressUpdate>>,
}

impl ChannelSink {
    /// Create a sink and the receiver its updates arrive on.
    #[must_use]
    pub fn channel() -> (Arc<Self>, Receiver<ProgressUpdate>) {
        let (tx, rx) = std::sync::mpsc::channel();
        (
            Arc::new(Self {
                tx: Mutex::new(tx),
            }),
            rx,
        )
    }
}

impl ProgressSink for ChannelSink {
    fn report(&self, percent: f64, message: &str) {
        let _ = self.tx.lock().unwrap().send(ProgressUpdate {
            percent,
            message: message.to_string(),
        });
    }
}

/// Terminal progress renderer backed by indicatif.
pub struct Progress {
    bar: Mutex<Option<ProgressBar>>,
    quiet: bool,
}

impl Progress {
    /// Percent-scaled bar for operations that report `0..=100`.
    #[must_use]
    pub fn percent_bar(quiet: bool) -> Self {
        let bar = (!quiet).then(|| {
            let pb = ProgressBar::new(100);
            pb.set_style(Self::bar_style());
            pb
        });
        Self {
            bar: Mutex::new(bar),
            quiet,
        }
    }

    /// Spinner for count-only phases where percent stays pinned at zero.
    #[must_use]
    pub fn spinner(quiet: bool) -> Self {
        let bar = (!quiet).then(|| {
            let pb = ProgressBar::new_spinner();
            pb.set_style(Self::spinner_style());
            pb.enable_steady_tick(Duration::from_millis(100));
            pb
        });
        Self {
            bar: Mutex::new(bar),
            quiet,
        }
    }

    /// Remove the bar from the terminal once the operation is over.
    pub fn finish(&self) {
        if let Some(pb) = self.bar.lock().unwrap().take() {
            pb.finish_and_clear();
        }
    }

    fn bar_style() -> ProgressStyle {
        ProgressStyle::with_template("[{elapsed_precise}] [{bar:40.cyan/blue}] {percent}% {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("█>-")
    }

    fn spinner_style() -> ProgressStyle {
        ProgressStyle::with_template("{spinner:.green} {msg} [{elapsed_precise}]")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_chars("⠁⠂⠄⡀⢀⠠⠐⠈ ")
    }
}

impl ProgressSink for Progress {
    fn report(&self, percent: f64, message: &str) {
        if self.quiet {
            return;
        }
        if let Some(ref pb) = *self.bar.lock().unwrap() {
            pb.set_position(percent.clamp(0.0, 100.0).round() as u64);
            pb.set_message(message.to_string());
        }
    }
}
