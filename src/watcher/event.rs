//! Change records and the batches flushed to the consumer.

use std::path::{Path, PathBuf};

/// Kind of filesystem change.
///
/// The ordering here is also the iteration order of a flushed batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChangeKind {
    /// File or directory moved or renamed.
    Moved,
    /// File or directory created.
    Created,
    /// File contents or metadata modified.
    Modified,
    /// File or directory deleted.
    Deleted,
}

/// One filesystem change as reported by the OS watch subsystem.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Change {
    /// What happened.
    pub kind: ChangeKind,
    /// Source path of the change.
    pub path: PathBuf,
    /// Destination path (moves only).
    pub dest: Option<PathBuf>,
    /// Whether the change concerns a directory.
    pub is_dir: bool,
}

impl Change {
    /// A created-file change.
    pub fn created(path: impl Into<PathBuf>) -> Self {
        Self::new(ChangeKind::Created, path)
    }

    /// A modified-file change.
    pub fn modified(path: impl Into<PathBuf>) -> Self {
        Self::new(ChangeKind::Modified, path)
    }

    /// A deleted-file change.
    pub fn deleted(path: impl Into<PathBuf>) -> Self {
        Self::new(ChangeKind::Deleted, path)
    }

    /// A moved-file change with both endpoints.
    pub fn moved(from: impl Into<PathBuf>, to: impl Into<PathBuf>) -> Self {
        Self {
            kind: ChangeKind::Moved,
            path: from.into(),
            dest: Some(to.into()),
            is_dir: false,
        }
    }

    fn new(kind: ChangeKind, path: impl Into<PathBuf>) -> Self {
        Self {
            kind,
            path: path.into(),
            dest: None,
            is_dir: false,
        }
    }

    /// Mark the change as concerning a directory.
    pub fn directory(mut self) -> Self {
        self.is_dir = true;
        self
    }

    /// Path the change is "about": the destination for moves, else the
    /// source.
    pub fn effective_path(&self) -> &Path {
        self.dest.as_deref().unwrap_or(&self.path)
    }
}

/// Immutable snapshot of one debounce window.
///
/// A window whose changes all cancelled out (e.g. a file created and
/// deleted before the window closed) still flushes; use [`is_empty`] to
/// skip such batches cheaply.
///
/// [`is_empty`]: EventBatch::is_empty
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EventBatch {
    /// Moved changes, in arrival order.
    pub moved: Vec<Change>,
    /// Created changes, in arrival order.
    pub created: Vec<Change>,
    /// Modified changes, in arrival order.
    pub modified: Vec<Change>,
    /// Deleted changes, in arrival order.
    pub deleted: Vec<Change>,
}

impl EventBatch {
    /// All changes in fixed order: moved, created, modified, deleted.
    pub fn all_changes(&self) -> impl Iterator<Item = &Change> {
        self.moved
            .iter()
            .chain(&self.created)
            .chain(&self.modified)
            .chain(&self.deleted)
    }

    /// Total number of changes across all four kinds.
    pub fn len(&self) -> usize {
        self.moved.len() + self.created.len() + self.modified.len() + self.deleted.len()
    }

    /// Whether the window closed with nothing left to report.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_changes_fixed_order() {
        let batch = EventBatch {
            moved: vec![Change::moved("/d/old.md", "/d/new.md")],
            created: vec![Change::created("/d/a.md")],
            modified: vec![Change::modified("/d/b.md")],
            deleted: vec![Change::deleted("/d/c.md")],
        };

        let kinds: Vec<ChangeKind> = batch.all_changes().map(|c| c.kind).collect();
        assert_eq!(
            kinds,
            vec![
                ChangeKind::Moved,
                ChangeKind::Created,
                ChangeKind::Modified,
                ChangeKind::Deleted,
            ]
        );
        assert_eq!(batch.len(), 4);
        assert!(!batch.is_empty());
    }

    #[test]
    fn test_empty_batch() {
        let batch = EventBatch::default();
        assert!(batch.is_empty());
        assert_eq!(batch.all_changes().count(), 0);
    }

    #[test]
    fn test_effective_path_prefers_destination() {
        let moved = Change::moved("/d/old.md", "/d/new.md");
        assert_eq!(moved.effective_path(), Path::new("/d/new.md"));

        let modified = Change::modified("/d/a.md");
        assert_eq!(modified.effective_path(), Path::new("/d/a.md"));
    }
}
