//! Filesystem and integer-comparison primitives shared by [`super::posix_test`]
//! and [`super::extended_test`] — the unary/binary primaries both forms
//! name are the same set (`-f`, `-eq`, ...), just reached through
//! different grammars.

use std::path::Path;

pub fn exists(path: &str) -> bool {
    Path::new(path).symlink_metadata().is_ok()
}

pub fn is_regular_file(path: &str) -> bool {
    std::fs::metadata(path).map(|m| m.is_file()).unwrap_or(false)
}

pub fn is_directory(path: &str) -> bool {
    std::fs::metadata(path).map(|m| m.is_dir()).unwrap_or(false)
}

pub fn is_symlink(path: &str) -> bool {
    Path::new(path)
        .symlink_metadata()
        .map(|m| m.file_type().is_symlink())
        .unwrap_or(false)
}

pub fn is_non_empty_file(path: &str) -> bool {
    std::fs::metadata(path).map(|m| m.len() > 0).unwrap_or(false)
}

#[cfg(unix)]
pub fn is_readable(path: &str) -> bool {
    access(path, libc::R_OK)
}

#[cfg(unix)]
pub fn is_writable(path: &str) -> bool {
    access(path, libc::W_OK)
}

#[cfg(unix)]
pub fn is_executable(path: &str) -> bool {
    access(path, libc::X_OK)
}

#[cfg(unix)]
fn access(path: &str, mode: libc::c_int) -> bool {
    let Ok(c_path) = std::ffi::CString::new(path) else {
        return false;
    };
    // SAFETY: `c_path` is a valid NUL-terminated string for the duration
    // of this call; `access(2)` does not retain the pointer afterward.
    unsafe { libc::access(c_path.as_ptr(), mode) == 0 }
}

/// Parses a test operand as a shell integer, per `test(1)`'s `-eq`-family
/// operands — a non-numeric operand is a test-command syntax error, not a
/// silent `0`, so callers surface [`None`] as an error rather than
/// defaulting.
pub fn parse_int(s: &str) -> Option<i64> {
    s.trim().parse().ok()
}
