//! Watch-root bookkeeping with ancestor subsumption.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

/// Set of watch roots in which no root is a descendant of another.
///
/// A recursive watch on an ancestor already covers every descendant, so
/// adding an ancestor of existing roots replaces them and adding a
/// descendant of an existing root is a no-op. This keeps the OS-level
/// watch count minimal and avoids duplicate delivery for the same change.
#[derive(Debug, Default)]
pub(crate) struct WatchedRoots {
    roots: BTreeSet<PathBuf>,
}

impl WatchedRoots {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Insert a root, normalizing to an absolute path. Idempotent.
    pub(crate) fn insert(&mut self, dir: &Path) {
        let dir = absolute(dir);

        if self.roots.iter().any(|root| dir.starts_with(root)) {
            // already covered by an existing root (or present verbatim)
            return;
        }

        self.roots.retain(|root| !root.starts_with(&dir));
        self.roots.insert(dir);
    }

    pub(crate) fn iter(&self) -> impl Iterator<Item = &Path> {
        self.roots.iter().map(|p| p.as_path())
    }

    pub(crate) fn len(&self) -> usize {
        self.roots.len()
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.roots.is_empty()
    }
}

/// Lexical absolute normalization; no symlink resolution, the path need
/// not exist yet.
pub(crate) fn absolute(path: &Path) -> PathBuf {
    std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn paths(roots: &WatchedRoots) -> Vec<PathBuf> {
        roots.iter().map(|p| p.to_path_buf()).collect()
    }

    #[test]
    fn test_ancestor_subsumes_descendant() {
        let mut roots = WatchedRoots::new();
        roots.insert(Path::new("/project/docs"));
        roots.insert(Path::new("/project/docs/guide"));

        assert_eq!(paths(&roots), vec![PathBuf::from("/project/docs")]);
    }

    #[test]
    fn test_descendant_replaced_by_ancestor() {
        let mut roots = WatchedRoots::new();
        roots.insert(Path::new("/project/docs/guide"));
        roots.insert(Path::new("/project/docs/api"));
        roots.insert(Path::new("/project/docs"));

        assert_eq!(paths(&roots), vec![PathBuf::from("/project/docs")]);
    }

    #[test]
    fn test_insert_is_idempotent() {
        let mut roots = WatchedRoots::new();
        roots.insert(Path::new("/project/docs"));
        roots.insert(Path::new("/project/docs"));

        assert_eq!(roots.len(), 1);
    }

    #[test]
    fn test_unrelated_roots_coexist() {
        let mut roots = WatchedRoots::new();
        roots.insert(Path::new("/project/docs"));
        roots.insert(Path::new("/project/notebooks"));

        assert_eq!(roots.len(), 2);
    }

    #[test]
    fn test_sibling_with_shared_prefix_is_not_an_ancestor() {
        // path components decide ancestry, not string prefixes
        let mut roots = WatchedRoots::new();
        roots.insert(Path::new("/project/docs"));
        roots.insert(Path::new("/project/docs-site"));

        assert_eq!(roots.len(), 2);
    }

    #[test]
    fn test_relative_paths_normalized() {
        let mut roots = WatchedRoots::new();
        roots.insert(Path::new("docs"));

        assert!(roots.iter().all(|p| p.is_absolute()));
    }
}
