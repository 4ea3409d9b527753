use super::{Config, MIN_READ_BUFFER};
use crate::error::{FpError, FpResult};
use std::path::Path;

/// Read, parse and validate a configuration file.
///
/// # Errors
///
/// Returns [`FpError::Config`] describing the first problem found
pub fn parse_config_file(path: &Path) -> FpResult<Config> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| FpError::Config(format!("cannot read {}: {e}", path.display())))?;
    parse_config_str(&content)
        .map_err(|e| FpError::Config(format!("{}: {e}", path.display())))
}

/// Parse and validate configuration text.
///
/// # Errors
///
/// Returns a message describing invalid TOML or an invalid value
pub fn parse_config_str(content: &str) -> Result<Config, String> {
    let config: Config = toml::from_str(content).map_err(|e| e.to_string())?;
    validate_config(&config)?;
    Ok(config)
}

fn validate_config(config: &Config) -> Result<(), String> {
    if config.performance.read_buffer_size < MIN_READ_BUFFER {
        return Err(format!(
            "performance.read_buffer_size must be at least {MIN_READ_BUFFER} bytes"
        ));
    }

    for pattern in &config.scan.ignore_patterns {
        glob::Pattern::new(pattern)
            .map_err(|e| format!("scan.ignore_patterns: invalid pattern '{pattern}': {e}"))?;
    }

    Ok(())
}
