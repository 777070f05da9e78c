//! Debounced directory watching for documentation build loops.
//!
//! `docwatch` wraps the platform file-notification backend and turns its
//! raw event stream into debounced, categorized batches: rapid bursts of
//! filesystem churn collapse into one [`EventBatch`] per quiet period,
//! with duplicate events deduplicated per kind and create/modify/delete
//! sequences for the same path reduced to their net effect. A rebuild
//! loop pulls batches one at a time and decides what to rebuild.
//!
//! # Example
//!
//! ```no_run
//! use docwatch::DirectoryWatcher;
//!
//! fn main() -> Result<(), docwatch::WatchError> {
//!     let mut watcher = DirectoryWatcher::builder()
//!         .patterns(["*.md", "*.rst"])
//!         .ignore_patterns([".*", "_*"])
//!         .output_dir("docs/_build")
//!         .build()?;
//!     watcher.watch("docs");
//!
//!     for batch in watcher.start()? {
//!         for change in batch.all_changes() {
//!             println!("{:?}: {}", change.kind, change.path.display());
//!         }
//!         // rebuild the documentation here
//!     }
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod logging;
pub mod watcher;

pub use config::{LoggingConfig, Settings, WatchConfig};
pub use watcher::{
    BatchStream, Change, ChangeKind, DirectoryWatcher, DirectoryWatcherBuilder, EventBatch,
    WatchError,
};
