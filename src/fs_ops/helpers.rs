//! I/O helper utilities.
//!
//! Enriches io::Error values with the failing operation, the path, and a platform-aware hint.
//! `SortError::io` uses `build_message` for per-file errors; `io_error_with_help` is the
//! `anyhow` adapter for run-level setup code.
//!
//! Usage:
//!   fs::create_dir_all(dir).map_err(io_error_with_help("create destination root", dir))?;

use anyhow::anyhow;
use std::io;
use std::path::Path;

/// `<op> '<path>': <error>` plus a hint and the raw OS code when there is one.
pub(crate) fn build_message(op: &str, path: &Path, e: &io::Error) -> String {
    let mut msg = format!("{op} '{}': {e}", path.display());
    if let Some(hint) = hint_for(e) {
        msg.push_str("; ");
        msg.push_str(hint);
    }
    if let Some(code) = e.raw_os_error() {
        msg.push_str(&format!(" [os code: {code}]"));
    }
    msg
}

fn hint_for(e: &io::Error) -> Option<&'static str> {
    match e.raw_os_error() {
        Some(code) => os_hint(code),
        None => match e.kind() {
            io::ErrorKind::PermissionDenied => Some(HINT_PERMISSION),
            io::ErrorKind::NotFound => Some(HINT_MISSING),
            io::ErrorKind::AlreadyExists => Some(HINT_EXISTS),
            _ => None,
        },
    }
}

const HINT_PERMISSION: &str = "permission denied, check ownership of the source and archive";
const HINT_MISSING: &str = "path not found, it may have been moved while the run was going";
const HINT_EXISTS: &str = "already exists";
const HINT_CROSS_DEVICE: &str = "cross-filesystem, atomic rename not possible";
const HINT_NO_SPACE: &str = "archive volume is full";
const HINT_TOO_LONG: &str = "path too long, use a shorter archive root";

#[cfg(unix)]
fn os_hint(code: i32) -> Option<&'static str> {
    Some(match code {
        libc::EACCES | libc::EPERM => HINT_PERMISSION,
        libc::ENOENT => HINT_MISSING,
        libc::EEXIST => HINT_EXISTS,
        libc::EXDEV => HINT_CROSS_DEVICE,
        libc::ENOSPC => HINT_NO_SPACE,
        libc::ENAMETOOLONG => HINT_TOO_LONG,
        libc::EROFS => "read-only filesystem",
        libc::EBUSY => "resource busy, another process is using the file",
        libc::EMFILE => "too many open files, lower --workers or raise the limit",
        _ => return None,
    })
}

#[cfg(windows)]
fn os_hint(code: i32) -> Option<&'static str> {
    Some(match code {
        // ERROR_ACCESS_DENIED
        5 => HINT_PERMISSION,
        // ERROR_FILE_NOT_FOUND / ERROR_PATH_NOT_FOUND
        2 | 3 => HINT_MISSING,
        // ERROR_FILE_EXISTS / ERROR_ALREADY_EXISTS
        80 | 183 => HINT_EXISTS,
        // ERROR_NOT_SAME_DEVICE
        17 => HINT_CROSS_DEVICE,
        // ERROR_DISK_FULL
        112 => HINT_NO_SPACE,
        // ERROR_FILENAME_EXCED_RANGE
        206 => HINT_TOO_LONG,
        // ERROR_SHARING_VIOLATION
        32 => "sharing violation, the file is open in another program",
        _ => return None,
    })
}

#[cfg(not(any(unix, windows)))]
fn os_hint(_code: i32) -> Option<&'static str> {
    None
}

/// Adapter for anyhow::Result code.
/// Returns a closure suitable for `.map_err(...)` that converts io::Error -> anyhow::Error.
pub fn io_error_with_help<'a>(
    op: &'a str,
    path: &'a Path,
) -> impl FnOnce(io::Error) -> anyhow::Error + 'a {
    move |e: io::Error| anyhow!(build_message(op, path, &e))
}
