use crate::error::{FpError, FpResult};
use anyhow::{Context, Result};
use std::fs::{self, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

/// Extension every result file carries.
pub const RESULT_EXTENSION: &str = "csv";

/// Extension of the log file written next to a result file.
pub const LOG_EXTENSION: &str = "log";

/// Replaces whatever extension `path` has with `.csv`
#[must_use]
pub fn with_csv_extension(path: &Path) -> PathBuf {
    path.with_extension(RESULT_EXTENSION)
}

/// Path of the log file belonging to a result file (`x.csv` -> `x.log`)
#[must_use]
pub fn log_path_for(result_path: &Path) -> PathBuf {
    result_path.with_extension(LOG_EXTENSION)
}

/// Text form of `path` used as the record key in snapshots.
///
/// Distinct paths always give distinct keys. On unix, bytes that are not
/// valid UTF-8 are written as `\xNN` and a literal backslash is doubled, so
/// the original bytes can be recovered from the key. Other platforms use the
/// path's Unicode form.
#[cfg(unix)]
#[must_use]
pub fn path_key(path: &Path) -> String {
    use std::os::unix::ffi::OsStrExt;

    let bytes = path.as_os_str().as_bytes();
    let mut key = String::with_capacity(bytes.len());
    for chunk in bytes.utf8_chunks() {
        for c in chunk.valid().chars() {
            if c == '\\' {
                key.push_str("\\\\");
            } else {
                key.push(c);
            }
        }
        for byte in chunk.invalid() {
            key.push_str(&format!("\\x{byte:02x}"));
        }
    }
    key
}

/// Text form of `path` used as the record key in snapshots.
#[cfg(not(unix))]
#[must_use]
pub fn path_key(path: &Path) -> String {
    path.to_string_lossy().into_owned()
}

/// Expands tilde in path to home directory
///
/// # Errors
///
/// Returns an error if the home directory cannot be determined
pub fn expand_tilde(path: &Path) -> Result<PathBuf> {
    match path.to_str() {
        Some("~") => dirs::home_dir().context("Could not find home directory"),
        Some(path_str) if path_str.starts_with("~/") => {
            let home = dirs::home_dir().context("Could not find home directory")?;
            Ok(home.join(&path_str[2..]))
        }
        _ => Ok(path.to_path_buf()),
    }
}

/// Checks that `path` can be written, creating missing parent directories.
///
/// An existing file is opened for appending without being modified; for a
/// new file a throwaway temporary file is created next to it, so the probe
/// never leaves an empty result file behind.
///
/// # Errors
///
/// Returns [`FpError::OutputWrite`] if the destination is not writable
pub fn check_output_writable(path: &Path) -> FpResult<()> {
    let output_error = |source: io::Error| FpError::OutputWrite {
        path: path.to_path_buf(),
        source,
    };

    if path.is_dir() {
        return Err(output_error(io::Error::other("is a directory")));
    }

    let parent = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    fs::create_dir_all(parent).map_err(output_error)?;

    if path.exists() {
        OpenOptions::new()
            .append(true)
            .open(path)
            .map_err(output_error)?;
    } else {
        NamedTempFile::new_in(parent).map_err(output_error)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_with_csv_extension() {
        assert_eq!(
            with_csv_extension(Path::new("results/fp1")),
            PathBuf::from("results/fp1.csv")
        );
        assert_eq!(
            with_csv_extension(Path::new("results/fp1.txt")),
            PathBuf::from("results/fp1.csv")
        );
        assert_eq!(
            with_csv_extension(Path::new("fp1.csv")),
            PathBuf::from("fp1.csv")
        );
    }

    #[test]
    fn test_path_key_keeps_plain_paths() {
        assert_eq!(path_key(Path::new("/data/a b,c.txt")), "/data/a b,c.txt");
        assert_eq!(path_key(Path::new("/data/caf\u{e9}")), "/data/caf\u{e9}");
    }

    #[cfg(unix)]
    #[test]
    fn test_path_key_escapes_invalid_utf8() {
        use std::ffi::OsStr;
        use std::os::unix::ffi::OsStrExt;

        let ff = Path::new("/data").join(OsStr::from_bytes(b"\xff"));
        let fe = Path::new("/data").join(OsStr::from_bytes(b"\xfe"));
        let mixed = Path::new("/data").join(OsStr::from_bytes(b"a\xc3b"));

        assert_eq!(path_key(&ff), "/data/\\xff");
        assert_eq!(path_key(&fe), "/data/\\xfe");
        assert_eq!(path_key(&mixed), "/data/a\\xc3b");
    }

    #[cfg(unix)]
    #[test]
    fn test_path_key_distinguishes_literal_escape_text() {
        use std::ffi::OsStr;
        use std::os::unix::ffi::OsStrExt;

        let raw = Path::new("/data").join(OsStr::from_bytes(b"\xff"));
        let literal = Path::new("/data").join(r"\xff");

        assert_eq!(path_key(&literal), r"/data/\\xff");
        assert_ne!(path_key(&raw), path_key(&literal));
    }

    #[test]
    fn test_log_path_for() {
        assert_eq!(
            log_path_for(Path::new("/tmp/results/fp_files_result1.csv")),
            PathBuf::from("/tmp/results/fp_files_result1.log")
        );
    }

    #[test]
    fn test_expand_tilde_leaves_plain_paths() -> Result<()> {
        assert_eq!(
            expand_tilde(Path::new("/etc/hosts"))?,
            PathBuf::from("/etc/hosts")
        );
        assert_eq!(expand_tilde(Path::new("a/~/b"))?, PathBuf::from("a/~/b"));
        Ok(())
    }

    #[test]
    fn test_check_output_creates_parents_without_output() -> Result<()> {
        let temp = TempDir::new()?;
        let target = temp.path().join("nested/dir/result.csv");

        check_output_writable(&target)?;

        assert!(target.parent().is_some_and(Path::is_dir));
        assert!(!target.exists());
        let leftovers = fs::read_dir(temp.path().join("nested/dir"))?.count();
        assert_eq!(leftovers, 0);
        Ok(())
    }

    #[test]
    fn test_check_output_keeps_existing_content() -> Result<()> {
        let temp = TempDir::new()?;
        let target = temp.path().join("result.csv");
        fs::write(&target, "keep me")?;

        check_output_writable(&target)?;

        assert_eq!(fs::read_to_string(&target)?, "keep me");
        Ok(())
    }

    #[test]
    fn test_check_output_rejects_directory() -> Result<()> {
        let temp = TempDir::new()?;
        let err = check_output_writable(temp.path()).unwrap_err();
        assert!(matches!(err, FpError::OutputWrite { .. }));
        Ok(())
    }
}
