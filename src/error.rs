//! Structured error handling and exit codes.

use serde::Serialize;

/// Exit codes for the DupeWatch application.
///
/// - 0: Success (completed normally, matches found)
/// - 1: General error (unexpected failure)
/// - 2: No matches (completed normally, nothing to report)
/// - 130: Interrupted by user (Ctrl+C)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ExitCode {
    /// Success: the operation completed and produced results.
    Success = 0,
    /// General error: an unexpected error occurred.
    GeneralError = 1,
    /// No matches: the operation completed but found nothing to report.
    NoMatches = 2,
    /// Interrupted: the operation was interrupted by the user (Ctrl+C).
    Interrupted = 130,
}

impl ExitCode {
    /// Get the numeric exit code.
    #[must_use]
    pub fn as_i32(self) -> i32 {
        self as i32
    }

    /// Get the machine-readable code prefix.
    #[must_use]
    pub fn code_prefix(self) -> &'static str {
        match self {
            Self::Success => "DW000",
            Self::GeneralError => "DW001",
            Self::NoMatches => "DW002",
            Self::Interrupted => "DW130",
        }
    }
}

/// Structured error information for JSON output.
#[derive(Debug, Serialize)]
pub struct StructuredError {
    /// The error code (e.g., "DW001")
    pub code: String,
    /// The exit code number
    pub exit_code: i32,
    /// Human-readable error message
    pub message: String,
    /// Whether the operation was interrupted
    pub interrupted: bool,
}

impl StructuredError {
    /// Create a new structured error from an anyhow error and an exit code.
    #[must_use]
    pub fn new(err: &anyhow::Error, exit_code: ExitCode) -> Self {
        Self {
            code: exit_code.code_prefix().to_string(),
            exit_code: exit_code.as_i32(),
            message: err.to_string(),
            interrupted: exit_code == ExitCode::Interrupted,
        }
    }
}
