#![allow(dead_code)]

use anyhow::Result;
use filetime::FileTime;
use fpfiles::fingerprint::{FingerprintEngine, FingerprintOptions};
use fpfiles::storage::Snapshot;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Fixed modification time applied by [`TestTree::write_pinned`].
pub const PINNED_MTIME: i64 = 1_700_000_000;

/// Directory tree fixture for fingerprint tests
pub struct TestTree {
    pub temp_dir: TempDir,
}

impl TestTree {
    /// Create an empty tree
    pub fn new() -> Result<Self> {
        Ok(Self {
            temp_dir: TempDir::new()?,
        })
    }

    /// Create a tree with a few files spread over nested directories
    pub fn with_sample_files() -> Result<Self> {
        let tree = Self::new()?;
        tree.write_pinned("a.txt", "alpha")?;
        tree.write_pinned("b.txt", "bravo")?;
        tree.write_pinned("docs/readme.md", "# readme")?;
        tree.write_pinned("docs/nested/deep.bin", [0u8, 1, 2, 3].as_slice())?;
        tree.write_pinned("empty", "")?;
        Ok(tree)
    }

    /// Root of the tree
    pub fn path(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Absolute path of `relative`
    pub fn file(&self, relative: &str) -> PathBuf {
        self.path().join(relative)
    }

    /// Write a file, creating parent directories
    pub fn write(&self, relative: &str, content: impl AsRef<[u8]>) -> Result<PathBuf> {
        let path = self.file(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, content)?;
        Ok(path)
    }

    /// Write a file and pin its access and modification time to [`PINNED_MTIME`]
    pub fn write_pinned(&self, relative: &str, content: impl AsRef<[u8]>) -> Result<PathBuf> {
        let path = self.write(relative, content)?;
        self.set_mtime(relative, PINNED_MTIME)?;
        Ok(path)
    }

    /// Set the modification time of `relative` to `secs` since the epoch
    pub fn set_mtime(&self, relative: &str, secs: i64) -> Result<()> {
        let time = FileTime::from_unix_time(secs, 0);
        filetime::set_file_times(self.file(relative), time, time)?;
        Ok(())
    }

    /// Overwrite a file without changing its modification time
    pub fn rewrite_silently(&self, relative: &str, content: impl AsRef<[u8]>) -> Result<()> {
        let path = self.file(relative);
        let modified = FileTime::from_last_modification_time(&fs::metadata(&path)?);
        fs::write(&path, content)?;
        filetime::set_file_mtime(&path, modified)?;
        Ok(())
    }

    /// Fingerprint sequentially with hashing on
    pub fn fingerprint_sequential(&self) -> Result<Snapshot> {
        let options = FingerprintOptions::new(self.path()).with_parallel(false);
        Ok(FingerprintEngine::new(options).fingerprint()?)
    }

    /// Fingerprint in parallel with hashing on
    pub fn fingerprint_parallel(&self) -> Result<Snapshot> {
        let options = FingerprintOptions::new(self.path()).with_threads(4);
        Ok(FingerprintEngine::new(options).fingerprint()?)
    }
}
