//! Metadata carry-over from a source file onto its copy.
//! - Permissions are applied to the still-unpublished temp file, so they are in place before
//!   the rename makes the file visible.
//! - Timestamps are best-effort: failures are logged and ignored.

use filetime::{FileTime, set_file_times};
use std::fs::{self, File};
use std::io;
use std::path::Path;
use tracing::{trace, warn};

/// Apply the source's permission bits (mode on Unix, readonly on Windows) to an open file.
pub(crate) fn copy_permissions(dest: &File, src_meta: &fs::Metadata) -> io::Result<()> {
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let mode = src_meta.permissions().mode() & 0o7777;
        dest.set_permissions(fs::Permissions::from_mode(mode))?;
        trace!(mode = format!("{:o}", mode), "copied permissions onto temp file");
    }
    #[cfg(windows)]
    {
        let mut perms = dest.metadata()?.permissions();
        perms.set_readonly(src_meta.permissions().readonly());
        dest.set_permissions(perms)?;
    }
    Ok(())
}

/// Copy atime/mtime from the source metadata onto `dest` (best-effort).
pub(crate) fn preserve_times(dest: &Path, src_meta: &fs::Metadata) {
    let at = src_meta.accessed().ok().map(FileTime::from_system_time);
    let mt = src_meta.modified().ok().map(FileTime::from_system_time);
    let (Some(at), Some(mt)) = (at, mt) else {
        return;
    };
    if let Err(e) = set_file_times(dest, at, mt) {
        warn!(path = %dest.display(), error = %e, "failed to set atime/mtime on destination");
    } else {
        trace!(path = %dest.display(), "set atime/mtime on destination");
    }
}
