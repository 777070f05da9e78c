//! Debounced directory watching with categorized event batches.
//!
//! This module turns the raw event stream of the platform notification
//! backend into batches a rebuild loop can consume one at a time.
//!
//! # Architecture
//!
//! ```text
//! DirectoryWatcher::start()
//!   - notify::RecommendedWatcher (OS delivery context)
//!       -> EventFilter (output dir, filename globs, directory events)
//!       -> Debouncer (PendingBatch + single flush deadline)
//!       -> crossbeam channel
//!            |
//!       BatchStream (blocking pull of EventBatch)
//! ```
//!
//! Every surviving change restarts the debounce window; one batch flushes
//! per quiet period, with same-kind duplicates and create/modify/delete
//! churn for the same path collapsed to the net visible state.

mod batch;
mod debounce;
mod directory;
mod error;
mod event;
mod filter;
mod roots;

pub use directory::{
    BatchStream, DEFAULT_DEBOUNCE_MS, DirectoryWatcher, DirectoryWatcherBuilder,
};
pub use error::WatchError;
pub use event::{Change, ChangeKind, EventBatch};
