//! Event filtering: output-directory suppression, filename globs, and
//! directory-event handling.

use std::path::{Path, PathBuf};

use glob::{MatchOptions, Pattern};

use super::error::WatchError;
use super::event::Change;

/// Decides which raw changes may enter the pending batch.
///
/// Checks run in a fixed order: output-directory suppression first, then
/// inclusion/exclusion globs against the filename, then the
/// directory-event setting.
#[derive(Debug)]
pub(crate) struct EventFilter {
    /// Inclusion globs; empty means match-all.
    include: Vec<Pattern>,
    /// Exclusion globs; a match drops the change even when included.
    exclude: Vec<Pattern>,
    options: MatchOptions,
    ignore_directories: bool,
    /// Build output prefix whose own changes are always suppressed.
    output_dir: Option<PathBuf>,
}

impl EventFilter {
    pub(crate) fn new(
        patterns: &[String],
        ignore_patterns: &[String],
        case_sensitive: bool,
        ignore_directories: bool,
        output_dir: Option<PathBuf>,
    ) -> Result<Self, WatchError> {
        let options = MatchOptions {
            case_sensitive,
            require_literal_separator: false,
            require_literal_leading_dot: false,
        };

        Ok(Self {
            include: compile(patterns)?,
            exclude: compile(ignore_patterns)?,
            options,
            ignore_directories,
            output_dir,
        })
    }

    /// Whether a change may enter the pending batch.
    pub(crate) fn accepts(&self, change: &Change) -> bool {
        if let Some(output) = &self.output_dir {
            if change.effective_path().starts_with(output) {
                return false;
            }
        }

        // moves survive if either endpoint's filename passes
        let name_ok = self.name_passes(&change.path)
            || change.dest.as_deref().is_some_and(|d| self.name_passes(d));
        if !name_ok {
            return false;
        }

        if self.ignore_directories && change.is_dir {
            return false;
        }

        true
    }

    fn name_passes(&self, path: &Path) -> bool {
        let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
            return false;
        };

        if !self.include.is_empty()
            && !self
                .include
                .iter()
                .any(|p| p.matches_with(name, self.options))
        {
            return false;
        }

        !self
            .exclude
            .iter()
            .any(|p| p.matches_with(name, self.options))
    }
}

fn compile(patterns: &[String]) -> Result<Vec<Pattern>, WatchError> {
    patterns
        .iter()
        .map(|raw| {
            Pattern::new(raw).map_err(|e| WatchError::Pattern {
                pattern: raw.clone(),
                reason: e.to_string(),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::watcher::event::Change;

    fn filter(
        patterns: &[&str],
        ignore_patterns: &[&str],
        case_sensitive: bool,
        output_dir: Option<&str>,
    ) -> EventFilter {
        let patterns: Vec<String> = patterns.iter().map(|s| s.to_string()).collect();
        let ignore: Vec<String> = ignore_patterns.iter().map(|s| s.to_string()).collect();
        EventFilter::new(
            &patterns,
            &ignore,
            case_sensitive,
            true,
            output_dir.map(PathBuf::from),
        )
        .unwrap()
    }

    #[test]
    fn test_empty_patterns_match_all() {
        let f = filter(&[], &[], false, None);
        assert!(f.accepts(&Change::modified("/docs/a.md")));
        assert!(f.accepts(&Change::modified("/docs/b.txt")));
    }

    #[test]
    fn test_inclusion_pattern_drops_non_matching() {
        let f = filter(&["*.md"], &[], false, None);
        assert!(f.accepts(&Change::created("/docs/a.md")));
        assert!(!f.accepts(&Change::created("/docs/b.txt")));
    }

    #[test]
    fn test_exclusion_wins_over_inclusion() {
        let f = filter(&["*.md"], &["_*"], false, None);
        assert!(f.accepts(&Change::modified("/docs/page.md")));
        assert!(!f.accepts(&Change::modified("/docs/_draft.md")));
    }

    #[test]
    fn test_case_insensitive_by_default() {
        let f = filter(&["*.md"], &[], false, None);
        assert!(f.accepts(&Change::modified("/docs/README.MD")));

        let strict = filter(&["*.md"], &[], true, None);
        assert!(!strict.accepts(&Change::modified("/docs/README.MD")));
    }

    #[test]
    fn test_matches_filename_not_full_path() {
        // the glob is applied to the filename, so a path component
        // matching the pattern does not qualify
        let f = filter(&["*.md"], &[], false, None);
        assert!(!f.accepts(&Change::modified("/docs/notes.md.d/data.bin")));
    }

    #[test]
    fn test_output_directory_suppressed() {
        let f = filter(&[], &[], false, Some("/docs/_build"));
        assert!(!f.accepts(&Change::created("/docs/_build/index.html")));
        assert!(f.accepts(&Change::created("/docs/index.md")));
    }

    #[test]
    fn test_output_suppression_uses_move_destination() {
        let f = filter(&[], &[], false, Some("/docs/_build"));
        assert!(!f.accepts(&Change::moved("/docs/a.md", "/docs/_build/a.md")));
        assert!(f.accepts(&Change::moved("/docs/a.md", "/docs/b.md")));
    }

    #[test]
    fn test_move_survives_when_either_endpoint_matches() {
        let f = filter(&["*.md"], &[], false, None);
        assert!(f.accepts(&Change::moved("/docs/a.txt", "/docs/a.md")));
        assert!(f.accepts(&Change::moved("/docs/a.md", "/docs/a.txt")));
        assert!(!f.accepts(&Change::moved("/docs/a.txt", "/docs/b.txt")));
    }

    #[test]
    fn test_directory_changes_ignored() {
        let f = filter(&[], &[], false, None);
        assert!(!f.accepts(&Change::created("/docs/chapter").directory()));
        assert!(f.accepts(&Change::created("/docs/chapter")));
    }
}
