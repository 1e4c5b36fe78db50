//! Ctrl+C handling and cooperative cancellation.
//!
//! Scans are cancelled cooperatively: long-running operations poll a shared
//! [`CancelToken`] between files, between pairwise comparisons, and between
//! hash blocks. A cancelled operation winds down at the next check point and
//! returns an empty result.

use std::io::Write;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, OnceLock};

/// Shared cancellation flag handed to scan workers.
///
/// Cloning is cheap and every clone observes the same flag, so the thread
/// that requested a scan can cancel it from a signal handler while the
/// worker polls [`CancelToken::is_cancelled`] at its check points.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    flag: Arc<AtomicBool>,
}

impl CancelToken {
    /// New token in the not-cancelled state.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// `true` once [`CancelToken::cancel`] has been called on any clone.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }

    /// Request cancellation. Idempotent; repeated calls are harmless.
    pub fn cancel(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }

    /// Clear the flag so the token can be reused for a fresh operation.
    pub fn reset(&self) {
        self.flag.store(false, Ordering::SeqCst);
    }
}

static GLOBAL_TOKEN: OnceLock<CancelToken> = OnceLock::new();

/// Install a Ctrl+C handler that cancels the returned token.
///
/// Call once early in startup. The first interrupt sets the token and prints
/// a short notice to stderr; the work loop is expected to notice the token
/// and exit with [`crate::error::ExitCode::Interrupted`].
///
/// Installation never fails: if a handler is already registered in this
/// process (parallel tests end up here), the existing token is reused, and
/// if the OS hook cannot be installed at all we fall back to a token that
/// only responds to manual [`CancelToken::cancel`] calls.
pub fn install_ctrlc() -> CancelToken {
    if let Some(token) = GLOBAL_TOKEN.get() {
        token.reset();
        return token.clone();
    }

    let token = CancelToken::new();
    let hook = token.clone();

    match ctrlc::set_handler(move || {
        hook.cancel();
        let _ = writeln!(std::io::stderr(), "\nInterrupted. Cleaning up...");
        let _ = std::io::stderr().flush();
        log::info!("interrupt received, cancelling current operation");
    }) {
        Ok(()) => {
            let _ = GLOBAL_TOKEN.set(token.clone());
            token
        }
        Err(err) => {
            if let Some(existing) = GLOBAL_TOKEN.get() {
                existing.reset();
                return existing.clone();
            }
            log::debug!("ctrl+c handler unavailable ({err}), using manual token");
            let fallback = CancelToken::new();
            let _ = GLOBAL_TOKEN.set(fallback.clone());
            fallback
        }
    }
}
