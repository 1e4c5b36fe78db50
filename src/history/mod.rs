//! Date-keyed file activity history.
//!
//! [`HistoryStore`] records which files appeared under watched directories
//! on which local calendar dates, persisting the whole map as one JSON
//! document after every mutation. [`watch`] feeds it live: a recursive
//! filesystem watcher forwards create/modify events over a channel to
//! whatever single thread owns the store.
//!
//! The store itself is not synchronized. One writer at a time is the
//! caller's contract; the CLI satisfies it by making the watch loop the
//! only mutator while it runs.

pub mod store;
pub mod watch;

pub use store::HistoryStore;
pub use watch::{ActivityEvent, FileWatch, WatchError};
