//! Detection of administrator (root) privileges.
//!
//! Without elevated rights some files under system directories cannot be
//! read; fingerprinting still works but those files end up as error records.

/// Whether the process runs with administrator rights.
///
/// Returns `None` on platforms where this cannot be determined.
#[cfg(unix)]
#[must_use]
pub fn is_elevated() -> Option<bool> {
    // SAFETY: geteuid has no preconditions and cannot fail.
    let euid = unsafe { libc::geteuid() };
    Some(euid == 0)
}

/// Whether the process runs with administrator rights.
///
/// Returns `None` on platforms where this cannot be determined.
#[cfg(not(unix))]
#[must_use]
pub fn is_elevated() -> Option<bool> {
    None
}
