//! Tool configuration.
//!
//! Settings are read from a TOML file; every section and key is optional.
//! Command-line flags are applied on top of the loaded values when the
//! immutable engine options are built.
//!
//! ```toml
//! [performance]
//! parallel_threads = 0        # 0 = all available cores
//! read_buffer_size = 65536
//!
//! [scan]
//! follow_symlinks = false
//! ignore_patterns = ["*.tmp", "System Volume Information"]
//!
//! [hashing]
//! enabled = true
//! ```

pub mod parser;

use crate::error::{FpError, FpResult};
use crate::scanner::IgnoreSet;
use crate::utils::hash::DEFAULT_READ_BUFFER;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Environment variable overriding the configuration file location.
pub const CONFIG_PATH_ENV: &str = "FPFILES_CONFIG_PATH";

/// Configuration file location relative to the platform config directory.
pub const DEFAULT_CONFIG_FILE: &str = "fpfiles/config.toml";

/// Smallest accepted read buffer.
pub const MIN_READ_BUFFER: usize = 4096;

/// Settings loaded from the configuration file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub performance: PerformanceConfig,

    #[serde(default)]
    pub scan: ScanConfig,

    #[serde(default)]
    pub hashing: HashingConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PerformanceConfig {
    /// Hashing workers; `0` uses the available hardware concurrency.
    #[serde(default)]
    pub parallel_threads: usize,
    #[serde(default = "default_read_buffer_size")]
    pub read_buffer_size: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct ScanConfig {
    #[serde(default)]
    pub follow_symlinks: bool,
    /// Glob patterns matched against entry names and root-relative paths.
    #[serde(default)]
    pub ignore_patterns: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HashingConfig {
    #[serde(default = "default_hashing_enabled")]
    pub enabled: bool,
}

impl Default for PerformanceConfig {
    fn default() -> Self {
        Self {
            parallel_threads: 0,
            read_buffer_size: default_read_buffer_size(),
        }
    }
}

impl Default for HashingConfig {
    fn default() -> Self {
        Self {
            enabled: default_hashing_enabled(),
        }
    }
}

impl Config {
    /// Resolve the configuration file location.
    ///
    /// `FPFILES_CONFIG_PATH` wins over the platform config directory.
    #[must_use]
    pub fn default_path() -> Option<PathBuf> {
        if let Ok(path) = std::env::var(CONFIG_PATH_ENV) {
            return Some(PathBuf::from(path));
        }
        dirs::config_dir().map(|dir| dir.join(DEFAULT_CONFIG_FILE))
    }

    /// Load configuration from a file, falling back to defaults when it
    /// does not exist.
    ///
    /// # Errors
    ///
    /// Returns [`FpError::Config`] if the file cannot be read, is not valid
    /// TOML, or fails validation
    pub fn load(path: &Path) -> FpResult<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        parser::parse_config_file(path)
    }

    /// Compile the configured ignore patterns.
    ///
    /// # Errors
    ///
    /// Returns [`FpError::Config`] naming the first invalid pattern
    pub fn ignore_set(&self) -> FpResult<IgnoreSet> {
        IgnoreSet::from_patterns(&self.scan.ignore_patterns)
            .map_err(|e| FpError::Config(format!("invalid ignore pattern: {e}")))
    }
}

const fn default_read_buffer_size() -> usize {
    DEFAULT_READ_BUFFER
}

const fn default_hashing_enabled() -> bool {
    true
}
