//! Utility functions and helpers.
//!
//! - [`hash`]: streaming XXH3 content digests
//! - [`paths`]: result/log path derivation and writability checks
//! - [`privileges`]: administrator detection
//! - [`thread_pool`]: hashing worker pool construction
//!
//! # Examples
//!
//! ```
//! use fpfiles::utils::format_size;
//!
//! assert_eq!(format_size(1024 * 1024), "1.00 MB");
//! ```

/// Content hashing
pub mod hash;
/// Path manipulation and output checks
pub mod paths;
/// Administrator privilege detection
pub mod privileges;
/// Thread pool configuration for parallel hashing
pub mod thread_pool;

/// Formats a file size in bytes into a human-readable string with appropriate units.
#[must_use]
#[allow(
    clippy::cast_precision_loss,
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss
)]
pub fn format_size(size: u64) -> String {
    const UNITS: &[&str] = &["B", "KB", "MB", "GB", "TB"];
    let mut size = size as f64;
    let mut unit_index = 0;

    while size >= 1024.0 && unit_index < UNITS.len() - 1 {
        size /= 1024.0;
        unit_index += 1;
    }

    if unit_index == 0 {
        format!("{} {}", size.round() as u64, UNITS[unit_index])
    } else {
        format!("{:.2} {}", size, UNITS[unit_index])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_size() {
        assert_eq!(format_size(0), "0 B");
        assert_eq!(format_size(1023), "1023 B");
        assert_eq!(format_size(1536), "1.50 KB");
        assert_eq!(format_size(5 * 1024 * 1024 * 1024), "5.00 GB");
    }
}
