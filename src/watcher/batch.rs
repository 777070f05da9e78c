//! Pending-batch state for one open debounce window.

use std::collections::HashSet;
use std::path::PathBuf;

use super::event::{Change, ChangeKind, EventBatch};

/// Accumulates filtered changes while a debounce window is open.
///
/// Dedup is first-seen-wins per kind: a second change of the same kind for
/// the same source path is dropped. Across kinds, the net visible state of
/// a path wins: a create followed by a modify or delete in the same window
/// is not reported as a create, a modify followed by a delete collapses to
/// the delete, and a create followed by a delete nets to no change at all.
/// Moved changes only dedup against other moved changes for the same
/// source path.
#[derive(Debug, Default)]
pub(crate) struct PendingBatch {
    moved: Vec<Change>,
    created: Vec<Change>,
    modified: Vec<Change>,
    deleted: Vec<Change>,
    /// Paths currently recorded as created within this window.
    created_paths: HashSet<PathBuf>,
}

impl PendingBatch {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Record one change, applying the dedup and collapse rules.
    pub(crate) fn record(&mut self, change: Change) {
        let kind = change.kind;
        if self.list(kind).iter().any(|c| c.path == change.path) {
            // first entry for this (kind, path) wins; the collapse rules
            // below only run when a change is actually appended
            return;
        }

        let path = change.path.clone();
        self.list_mut(kind).push(change);

        match kind {
            ChangeKind::Moved => {}
            ChangeKind::Created => {
                self.created_paths.insert(path);
            }
            ChangeKind::Modified => {
                self.created.retain(|c| c.path != path);
            }
            ChangeKind::Deleted => {
                self.created.retain(|c| c.path != path);
                self.modified.retain(|c| c.path != path);
                if self.created_paths.remove(&path) {
                    // created and deleted inside one window: the file never
                    // stably existed, so neither change is reported
                    self.deleted.retain(|c| c.path != path);
                }
            }
        }
    }

    /// Snapshot the window into a batch and clear all state.
    pub(crate) fn flush(&mut self) -> EventBatch {
        self.created_paths.clear();
        EventBatch {
            moved: std::mem::take(&mut self.moved),
            created: std::mem::take(&mut self.created),
            modified: std::mem::take(&mut self.modified),
            deleted: std::mem::take(&mut self.deleted),
        }
    }

    fn list(&self, kind: ChangeKind) -> &Vec<Change> {
        match kind {
            ChangeKind::Moved => &self.moved,
            ChangeKind::Created => &self.created,
            ChangeKind::Modified => &self.modified,
            ChangeKind::Deleted => &self.deleted,
        }
    }

    fn list_mut(&mut self, kind: ChangeKind) -> &mut Vec<Change> {
        match kind {
            ChangeKind::Moved => &mut self.moved,
            ChangeKind::Created => &mut self.created,
            ChangeKind::Modified => &mut self.modified,
            ChangeKind::Deleted => &mut self.deleted,
        }
    }
}
