//! Error types for watcher construction and startup.

use std::path::PathBuf;
use thiserror::Error;

/// Errors from watcher operations.
///
/// Setup failures are fatal: a watcher either observes every configured
/// root or refuses to start. Runtime delivery anomalies from the OS
/// subsystem are logged and skipped, never surfaced here.
#[derive(Error, Debug)]
pub enum WatchError {
    #[error("Invalid pattern '{pattern}': {reason}")]
    Pattern { pattern: String, reason: String },

    #[error("Failed to initialize watcher: {reason}")]
    InitFailed { reason: String },

    #[error("Cannot watch path {path}: {reason}")]
    PathWatchFailed { path: PathBuf, reason: String },

    #[error("Batch channel closed unexpectedly")]
    ChannelClosed,
}

impl From<notify::Error> for WatchError {
    fn from(e: notify::Error) -> Self {
        WatchError::InitFailed {
            reason: e.to_string(),
        }
    }
}
