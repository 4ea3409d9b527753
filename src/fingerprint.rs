//! Fingerprint engine: walks a tree and records metadata and content hashes.
//!
//! Two modes are available:
//!
//! - **Sequential** walks directory entries sorted by name and builds each
//!   record on the calling thread. Output order equals traversal order and
//!   is identical between runs over an unchanged tree.
//! - **Parallel** walks on the calling thread and feeds a bounded queue that
//!   a dedicated worker pool drains, statting and hashing each file. The walk
//!   pauses while the queue is full. Records are gathered in a
//!   path-keyed collector, so every walked path appears exactly once, but
//!   the output order is unspecified.
//!
//! In both modes a failure on one file becomes an error record for that path
//! and never aborts the run. An unusable root aborts before any work is
//! dispatched.

use crate::config::Config;
use crate::error::{FileOperation, FpError, FpResult};
use crate::scanner::{IgnoreSet, TreeWalker, Walk};
use crate::storage::collector::SnapshotCollector;
use crate::storage::{FileInfo, Snapshot};
use crate::utils::hash::{DEFAULT_READ_BUFFER, hash_file_with_buffer};
use crate::utils::paths::path_key;
use crate::utils::thread_pool::{build_pool, resolve_thread_count};
use rayon::iter::{ParallelBridge, ParallelIterator};
use std::path::{Path, PathBuf};
use std::sync::mpsc;
use std::time::Instant;
use tracing::{Level, debug, info, span, warn};

/// Paths queued per worker before the walk waits for hashing to catch up.
pub const QUEUE_DEPTH_PER_WORKER: usize = 64;

/// Immutable settings for one fingerprint run.
#[derive(Debug, Clone)]
pub struct FingerprintOptions {
    /// Directory to fingerprint.
    pub root: PathBuf,
    /// Compute content hashes; when off every `hash` is empty.
    pub hash_enabled: bool,
    /// Hash on a worker pool instead of the calling thread.
    pub parallel: bool,
    /// Worker count for parallel mode, `0` for all available cores.
    pub threads: usize,
    /// Descend into symlinked directories.
    pub follow_symlinks: bool,
    /// Entries excluded from the walk.
    pub ignore: IgnoreSet,
    /// Read buffer used while hashing.
    pub read_buffer_size: usize,
}

impl FingerprintOptions {
    /// Parallel, hashing run over `root` with default settings.
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            hash_enabled: true,
            parallel: true,
            threads: 0,
            follow_symlinks: false,
            ignore: IgnoreSet::default(),
            read_buffer_size: DEFAULT_READ_BUFFER,
        }
    }

    /// Options for `root` taken from a loaded configuration.
    ///
    /// # Errors
    ///
    /// Returns [`FpError::Config`] if an ignore pattern is invalid.
    pub fn from_config(root: impl Into<PathBuf>, config: &Config) -> FpResult<Self> {
        Ok(Self {
            root: root.into(),
            hash_enabled: config.hashing.enabled,
            parallel: true,
            threads: config.performance.parallel_threads,
            follow_symlinks: config.scan.follow_symlinks,
            ignore: config.ignore_set()?,
            read_buffer_size: config.performance.read_buffer_size,
        })
    }

    /// Turn content hashing on or off.
    #[must_use]
    pub const fn with_hashing(mut self, enabled: bool) -> Self {
        self.hash_enabled = enabled;
        self
    }

    /// Choose between the worker pool and the calling thread.
    #[must_use]
    pub const fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Worker count for parallel mode, `0` for all cores.
    #[must_use]
    pub const fn with_threads(mut self, threads: usize) -> Self {
        self.threads = threads;
        self
    }

    #[must_use]
    pub const fn with_follow_symlinks(mut self, follow: bool) -> Self {
        self.follow_symlinks = follow;
        self
    }

    #[must_use]
    pub fn with_ignore(mut self, ignore: IgnoreSet) -> Self {
        self.ignore = ignore;
        self
    }
}

/// Produces a [`Snapshot`] of a directory tree.
#[derive(Debug, Clone)]
pub struct FingerprintEngine {
    options: FingerprintOptions,
}

impl FingerprintEngine {
    #[must_use]
    pub const fn new(options: FingerprintOptions) -> Self {
        Self { options }
    }

    /// Settings this engine was built with
    #[must_use]
    pub const fn options(&self) -> &FingerprintOptions {
        &self.options
    }

    /// Fingerprint every regular file below the root.
    ///
    /// # Errors
    ///
    /// - [`FpError::DirectoryAccess`] if the root is missing or unreadable
    /// - [`FpError::WorkerPool`] if the hashing pool cannot be started
    pub fn fingerprint(&self) -> FpResult<Snapshot> {
        let span = span!(Level::INFO, "fingerprint", root = %self.options.root.display());
        let _guard = span.enter();

        let walk = self.walker().walk()?;
        let started = Instant::now();

        let (snapshot, walk) = if self.options.parallel {
            let threads = resolve_thread_count(self.options.threads);
            info!(threads, hashing = self.options.hash_enabled, "Fingerprinting in parallel");
            self.fingerprint_parallel(walk, threads)?
        } else {
            info!(hashing = self.options.hash_enabled, "Fingerprinting sequentially");
            self.fingerprint_sequential(walk)
        };

        let stats = walk.stats();
        info!(
            files = stats.files,
            records = snapshot.len(),
            errors = snapshot.error_count(),
            symlink_cycles = stats.cycles,
            unreadable_entries = stats.unreadable,
            elapsed = %humantime::format_duration(started.elapsed()),
            "Fingerprint complete"
        );
        Ok(snapshot)
    }

    /// Build the record for a single file.
    ///
    /// Never fails: stat or hash errors are logged and folded into the record.
    #[must_use]
    pub fn fingerprint_file(&self, path: &Path) -> FileInfo {
        let key = path_key(path);

        let metadata = match std::fs::metadata(path) {
            Ok(metadata) => metadata,
            Err(e) => {
                let err = FpError::file_read(path, FileOperation::Stat, e);
                warn!(path = %path.display(), error = %err, "File could not be fingerprinted");
                return FileInfo::new(key).with_error(&err);
            }
        };
        let info = FileInfo::from_metadata(key, &metadata);

        if !self.options.hash_enabled {
            return info;
        }

        match hash_file_with_buffer(path, self.options.read_buffer_size) {
            Ok(hash) => FileInfo { hash, ..info },
            Err(err) => {
                warn!(path = %path.display(), error = %err, "File could not be hashed");
                info.with_error(&err)
            }
        }
    }

    fn walker(&self) -> TreeWalker {
        TreeWalker::new(&self.options.root)
            .follow_symlinks(self.options.follow_symlinks)
            .sorted(!self.options.parallel)
            .ignore(self.options.ignore.clone())
    }

    fn fingerprint_sequential(&self, mut walk: Walk) -> (Snapshot, Walk) {
        let snapshot = walk
            .by_ref()
            .map(|path| self.fingerprint_file(&path))
            .collect();
        (snapshot, walk)
    }

    fn fingerprint_parallel(&self, mut walk: Walk, threads: usize) -> FpResult<(Snapshot, Walk)> {
        let pool = build_pool(threads)?;
        let collector = SnapshotCollector::new();
        let (queue, pending) =
            mpsc::sync_channel::<PathBuf>(threads.max(1) * QUEUE_DEPTH_PER_WORKER);

        // Walking stays on this thread; the scope returns once the workers
        // have drained the queue.
        pool.in_place_scope(|scope| {
            let collector = &collector;
            scope.spawn(move |_| {
                pending.into_iter().par_bridge().for_each(|path| {
                    let info = self.fingerprint_file(&path);
                    if !collector.insert(info) {
                        warn!(path = %path.display(), "Path walked twice, keeping first record");
                    }
                });
            });

            for path in walk.by_ref() {
                if queue.send(path).is_err() {
                    warn!("Hashing workers stopped early, ending walk");
                    break;
                }
            }
            drop(queue);
        });

        debug!(records = collector.len(), "Worker pool drained");
        Ok((collector.into_snapshot(), walk))
    }
}
