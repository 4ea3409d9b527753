//! Recursive enumeration of the regular files below a root directory.
//!
//! The walker is lazy: files are yielded as `walkdir` discovers them, so the
//! fingerprint engine can start hashing before the traversal has finished.
//! Entries that cannot be read and symlink cycles are logged and skipped;
//! only an unusable root is an error, and it is reported before the first
//! entry is produced.

use crate::error::{FpError, FpResult};
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use walkdir::WalkDir;

/// Glob patterns excluding files or whole directories from a walk.
#[derive(Debug, Clone, Default)]
pub struct IgnoreSet {
    patterns: Vec<glob::Pattern>,
}

impl IgnoreSet {
    /// Compile `patterns`.
    ///
    /// # Errors
    ///
    /// Returns the first pattern that is not a valid glob.
    pub fn from_patterns(patterns: &[String]) -> Result<Self, glob::PatternError> {
        let patterns = patterns
            .iter()
            .map(|pattern| glob::Pattern::new(pattern))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { patterns })
    }

    /// Whether the set has no patterns
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    /// Match against the entry's file name and its root-relative path.
    #[must_use]
    pub fn is_ignored(&self, path: &Path, root: &Path) -> bool {
        if self.patterns.is_empty() {
            return false;
        }
        let relative = path.strip_prefix(root).unwrap_or(path);
        let name = path.file_name().map(|n| n.to_string_lossy());

        self.patterns.iter().any(|pattern| {
            pattern.matches_path(relative) || name.as_deref().is_some_and(|n| pattern.matches(n))
        })
    }
}

/// Counters describing what a walk skipped.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WalkStats {
    /// Regular files yielded.
    pub files: usize,
    /// Symlinked directories elided because they lead back to an ancestor.
    pub cycles: usize,
    /// Entries that could not be read.
    pub unreadable: usize,
}

/// Configured traversal of one root directory.
#[derive(Debug, Clone)]
pub struct TreeWalker {
    root: PathBuf,
    follow_symlinks: bool,
    sorted: bool,
    ignore: IgnoreSet,
}

impl TreeWalker {
    /// Walker over `root` that does not follow symlinks and keeps
    /// directory-entry order.
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            follow_symlinks: false,
            sorted: false,
            ignore: IgnoreSet::default(),
        }
    }

    /// Descend into symlinked directories (cycles are detected and elided).
    #[must_use]
    pub const fn follow_symlinks(mut self, follow: bool) -> Self {
        self.follow_symlinks = follow;
        self
    }

    /// Visit the entries of every directory sorted by file name.
    #[must_use]
    pub const fn sorted(mut self, sorted: bool) -> Self {
        self.sorted = sorted;
        self
    }

    /// Skip entries matching `ignore`; a matching directory is not descended.
    #[must_use]
    pub fn ignore(mut self, ignore: IgnoreSet) -> Self {
        self.ignore = ignore;
        self
    }

    /// The directory being walked
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Verify the root is an existing, listable directory.
    ///
    /// # Errors
    ///
    /// Returns [`FpError::DirectoryAccess`] otherwise.
    pub fn check_root(&self) -> FpResult<()> {
        let access_error = |source: io::Error| FpError::DirectoryAccess {
            path: self.root.clone(),
            source,
        };

        let metadata = std::fs::metadata(&self.root).map_err(access_error)?;
        if !metadata.is_dir() {
            return Err(access_error(io::Error::other("not a directory")));
        }
        std::fs::read_dir(&self.root).map_err(access_error)?;
        Ok(())
    }

    /// Start the traversal.
    ///
    /// # Errors
    ///
    /// Returns [`FpError::DirectoryAccess`] if the root is unusable.
    pub fn walk(&self) -> FpResult<Walk> {
        self.check_root()?;

        let mut walkdir = WalkDir::new(&self.root).follow_links(self.follow_symlinks);
        if self.sorted {
            walkdir = walkdir.sort_by_file_name();
        }

        let root = self.root.clone();
        let ignore = self.ignore.clone();
        let entries = walkdir.into_iter().filter_entry(move |entry| {
            entry.depth() == 0 || !ignore.is_ignored(entry.path(), &root)
        });

        debug!(
            root = %self.root.display(),
            follow_symlinks = self.follow_symlinks,
            sorted = self.sorted,
            "Starting traversal"
        );

        Ok(Walk {
            entries: Box::new(entries),
            stats: WalkStats::default(),
        })
    }
}

/// Lazy sequence of file paths produced by [`TreeWalker::walk`].
pub struct Walk {
    entries: Box<dyn Iterator<Item = walkdir::Result<walkdir::DirEntry>> + Send>,
    stats: WalkStats,
}

impl Walk {
    /// What has been yielded and skipped so far
    #[must_use]
    pub const fn stats(&self) -> WalkStats {
        self.stats
    }
}

impl Iterator for Walk {
    type Item = PathBuf;

    fn next(&mut self) -> Option<PathBuf> {
        loop {
            match self.entries.next()? {
                Ok(entry) if entry.file_type().is_file() => {
                    self.stats.files += 1;
                    return Some(entry.into_path());
                }
                Ok(_) => {}
                Err(err) => {
                    let path = err
                        .path()
                        .map_or_else(String::new, |p| p.display().to_string());
                    if let Some(ancestor) = err.loop_ancestor() {
                        self.stats.cycles += 1;
                        warn!(
                            path = %path,
                            ancestor = %ancestor.display(),
                            "Symlink cycle detected, not descending again"
                        );
                    } else {
                        self.stats.unreadable += 1;
                        warn!(path = %path, error = %err, "Skipping unreadable entry");
                    }
                }
            }
        }
    }
}
