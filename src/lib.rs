//! DupeWatch - Duplicate File Finder and Activity Tracker
//!
//! A cross-platform Rust CLI application that finds duplicate files by
//! content hash (BLAKE3), matching name and size, or filename similarity,
//! and keeps a date-keyed record of file activity under watched directories.

pub mod actions;
pub mod app;
pub mod cli;
pub mod config;
pub mod duplicates;
pub mod error;
pub mod history;
pub mod logging;
pub mod output;
pub mod progress;
pub mod scanner;
pub mod signal;

pub use app::run_app;
