//! The directory watcher: construction, OS watch registration, and the
//! blocking batch stream.

use std::path::{Path, PathBuf};
use std::thread::JoinHandle;
use std::time::Duration;

use crossbeam_channel::{Receiver, RecvTimeoutError, unbounded};
use notify::event::{CreateKind, ModifyKind, RemoveKind, RenameMode};
use notify::{Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};

use crate::config::WatchConfig;

use super::debounce::Debouncer;
use super::error::WatchError;
use super::event::{Change, ChangeKind, EventBatch};
use super::filter::EventFilter;
use super::roots::{WatchedRoots, absolute};

/// Default debounce window in milliseconds.
pub const DEFAULT_DEBOUNCE_MS: u64 = 250;

/// Recursive directory watcher producing debounced, categorized batches.
///
/// Raw notifications are filtered (output-directory suppression, filename
/// globs, directory events), deduplicated and categorized into a pending
/// batch, and flushed as one [`EventBatch`] after a full debounce window
/// of silence. Rapid bursts collapse into a single batch.
///
/// Roots are added with [`watch`] before [`start`] consumes the watcher
/// and returns the pull stream; the watched set cannot change once
/// delivery is running.
///
/// [`watch`]: DirectoryWatcher::watch
/// [`start`]: DirectoryWatcher::start
pub struct DirectoryWatcher {
    roots: WatchedRoots,
    filter: EventFilter,
    recursive: bool,
    window: Duration,
}

impl DirectoryWatcher {
    /// Create a builder for configuring the watcher.
    pub fn builder() -> DirectoryWatcherBuilder {
        DirectoryWatcherBuilder::new()
    }

    /// Build a watcher straight from configuration.
    pub fn from_config(config: &WatchConfig) -> Result<Self, WatchError> {
        let mut builder = Self::builder()
            .patterns(config.patterns.iter().cloned())
            .ignore_patterns(config.ignore_patterns.iter().cloned())
            .ignore_directories(config.ignore_directories)
            .case_sensitive(config.case_sensitive)
            .recursive(config.recursive)
            .debounce(Duration::from_millis(config.debounce_ms));

        if let Some(dir) = &config.output_dir {
            builder = builder.output_dir(dir);
        }

        let mut watcher = builder.build()?;
        for dir in &config.directories {
            watcher.watch(dir);
        }
        Ok(watcher)
    }

    /// Add a directory to the watched set.
    ///
    /// The path is normalized to an absolute path. An ancestor of
    /// already-watched directories replaces them (its recursive watch
    /// subsumes theirs); a descendant of an already-watched directory is
    /// a no-op. Re-adding a covered path never errors.
    pub fn watch(&mut self, directory: impl AsRef<Path>) {
        self.roots.insert(directory.as_ref());
    }

    /// Register the OS watches and start producing batches.
    ///
    /// Registration failures (missing directory, insufficient
    /// permissions) are fatal: either every root is watched or the
    /// watcher refuses to start.
    pub fn start(self) -> Result<BatchStream, WatchError> {
        let (batch_tx, batch_rx) = unbounded();
        let debouncer = Debouncer::new(self.window, batch_tx);

        let filter = self.filter;
        let recorder = debouncer.clone();
        let mut os_watcher =
            notify::recommended_watcher(move |res: notify::Result<Event>| match res {
                Ok(event) => {
                    for change in changes_from(event) {
                        if filter.accepts(&change) {
                            recorder.record(change);
                        }
                    }
                }
                Err(e) => {
                    // the OS subsystem dropped or mangled a notification;
                    // nothing to correct here
                    tracing::warn!("[watcher] event delivery error: {e}");
                }
            })?;

        if self.roots.is_empty() {
            tracing::warn!("[watcher] no roots to watch - add directories before starting");
        }

        let mode = if self.recursive {
            RecursiveMode::Recursive
        } else {
            RecursiveMode::NonRecursive
        };

        for root in self.roots.iter() {
            os_watcher
                .watch(root, mode)
                .map_err(|e| WatchError::PathWatchFailed {
                    path: root.to_path_buf(),
                    reason: e.to_string(),
                })?;
            crate::debug_event!("watcher", "watching", "{}", root.display());
        }

        crate::log_event!("watcher", "monitoring", "{} roots", self.roots.len());

        let timer = debouncer
            .spawn_timer()
            .map_err(|e| WatchError::InitFailed {
                reason: e.to_string(),
            })?;

        Ok(BatchStream {
            batches: batch_rx,
            debouncer,
            timer: Some(timer),
            os_watcher: Some(os_watcher),
        })
    }
}

/// Builder for [`DirectoryWatcher`].
pub struct DirectoryWatcherBuilder {
    roots: Vec<PathBuf>,
    patterns: Vec<String>,
    ignore_patterns: Vec<String>,
    ignore_directories: bool,
    case_sensitive: bool,
    output_dir: Option<PathBuf>,
    recursive: bool,
    window: Duration,
}

impl DirectoryWatcherBuilder {
    /// Create a new builder with defaults.
    pub fn new() -> Self {
        Self {
            roots: Vec::new(),
            patterns: Vec::new(),
            ignore_patterns: Vec::new(),
            ignore_directories: true,
            case_sensitive: false,
            output_dir: None,
            recursive: true,
            window: Duration::from_millis(DEFAULT_DEBOUNCE_MS),
        }
    }

    /// Add an initial root directory to watch.
    pub fn root(mut self, directory: impl Into<PathBuf>) -> Self {
        self.roots.push(directory.into());
        self
    }

    /// Inclusion globs matched against filenames. Empty means match-all.
    pub fn patterns(mut self, patterns: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.patterns = patterns.into_iter().map(Into::into).collect();
        self
    }

    /// Exclusion globs; a matching filename is dropped even if included.
    pub fn ignore_patterns(
        mut self,
        patterns: impl IntoIterator<Item = impl Into<String>>,
    ) -> Self {
        self.ignore_patterns = patterns.into_iter().map(Into::into).collect();
        self
    }

    /// Whether directory-kind changes are dropped (default: true).
    pub fn ignore_directories(mut self, ignore: bool) -> Self {
        self.ignore_directories = ignore;
        self
    }

    /// Case sensitivity of glob matching (default: insensitive).
    pub fn case_sensitive(mut self, case_sensitive: bool) -> Self {
        self.case_sensitive = case_sensitive;
        self
    }

    /// Build output directory whose own changes are always suppressed, so
    /// the watcher never reacts to artifacts the consumer writes back.
    pub fn output_dir(mut self, directory: impl AsRef<Path>) -> Self {
        self.output_dir = Some(absolute(directory.as_ref()));
        self
    }

    /// Whether roots are watched recursively (default: true).
    pub fn recursive(mut self, recursive: bool) -> Self {
        self.recursive = recursive;
        self
    }

    /// Set the debounce window (default: 250 ms).
    pub fn debounce(mut self, window: Duration) -> Self {
        self.window = window;
        self
    }

    /// Build the watcher, compiling the glob patterns.
    pub fn build(self) -> Result<DirectoryWatcher, WatchError> {
        let filter = EventFilter::new(
            &self.patterns,
            &self.ignore_patterns,
            self.case_sensitive,
            self.ignore_directories,
            self.output_dir,
        )?;

        let mut roots = WatchedRoots::new();
        for dir in &self.roots {
            roots.insert(dir);
        }

        Ok(DirectoryWatcher {
            roots,
            filter,
            recursive: self.recursive,
            window: self.window,
        })
    }
}

impl Default for DirectoryWatcherBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Blocking pull stream of flushed batches.
///
/// Intended to be driven from a single consumption site, typically a
/// rebuild loop. The sequence has no natural end; it stops when the
/// stream is dropped, which also stops the OS delivery context and joins
/// the timer thread before returning.
pub struct BatchStream {
    batches: Receiver<EventBatch>,
    debouncer: Debouncer,
    timer: Option<JoinHandle<()>>,
    os_watcher: Option<RecommendedWatcher>,
}

impl BatchStream {
    /// Block until the next batch is flushed.
    pub fn recv(&self) -> Result<EventBatch, WatchError> {
        self.batches.recv().map_err(|_| WatchError::ChannelClosed)
    }

    /// Block for at most `timeout`; `Ok(None)` means a quiet interval.
    ///
    /// Lets a consuming loop stay responsive between batches. The wake
    /// interval has no effect on when windows flush.
    pub fn recv_timeout(&self, timeout: Duration) -> Result<Option<EventBatch>, WatchError> {
        match self.batches.recv_timeout(timeout) {
            Ok(batch) => Ok(Some(batch)),
            Err(RecvTimeoutError::Timeout) => Ok(None),
            Err(RecvTimeoutError::Disconnected) => Err(WatchError::ChannelClosed),
        }
    }
}

impl Iterator for BatchStream {
    type Item = EventBatch;

    fn next(&mut self) -> Option<EventBatch> {
        self.batches.recv().ok()
    }
}

impl Drop for BatchStream {
    fn drop(&mut self) {
        // stop OS delivery before tearing down the debounce state
        drop(self.os_watcher.take());
        self.debouncer.shutdown();
        if let Some(timer) = self.timer.take() {
            if timer.join().is_err() {
                tracing::warn!("[watcher] debounce timer thread did not stop cleanly");
            }
        }
    }
}

/// Map one OS notification onto zero or more change records.
///
/// Unpaired rename halves surface the way the OS reports them: a lone
/// rename-from is a deletion, a lone rename-to a creation. Access and
/// other informational events carry no state change and are dropped.
fn changes_from(event: Event) -> Vec<Change> {
    let kind = event.kind;
    let mut paths = event.paths;

    match kind {
        EventKind::Create(create) => {
            let dir_hint = matches!(create, CreateKind::Folder);
            paths
                .drain(..)
                .map(|p| file_change(ChangeKind::Created, p, dir_hint))
                .collect()
        }
        EventKind::Remove(remove) => {
            let dir_hint = matches!(remove, RemoveKind::Folder);
            paths
                .drain(..)
                .map(|p| file_change(ChangeKind::Deleted, p, dir_hint))
                .collect()
        }
        EventKind::Modify(ModifyKind::Name(mode)) => match (mode, paths.len()) {
            (RenameMode::Both, 2) => {
                let to = paths.remove(1);
                let from = paths.remove(0);
                let is_dir = to.is_dir();
                vec![Change {
                    kind: ChangeKind::Moved,
                    path: from,
                    dest: Some(to),
                    is_dir,
                }]
            }
            (RenameMode::From, _) => paths
                .drain(..)
                .map(|p| file_change(ChangeKind::Deleted, p, false))
                .collect(),
            (RenameMode::To, _) => paths
                .drain(..)
                .map(|p| file_change(ChangeKind::Created, p, false))
                .collect(),
            _ => paths
                .drain(..)
                .map(|p| file_change(ChangeKind::Modified, p, false))
                .collect(),
        },
        EventKind::Modify(_) | EventKind::Any => paths
            .drain(..)
            .map(|p| file_change(ChangeKind::Modified, p, false))
            .collect(),
        EventKind::Access(_) | EventKind::Other => Vec::new(),
    }
}

fn file_change(kind: ChangeKind, path: PathBuf, dir_hint: bool) -> Change {
    let is_dir = dir_hint || path.is_dir();
    Change {
        kind,
        path,
        dest: None,
        is_dir,
    }
}
