//! Free-space preflight for copies.
//! A copy into a nearly full volume would fail halfway through; checking first turns that into
//! a clear per-file error before any temp file is created.

use std::path::Path;
use tracing::debug;

use crate::errors::SortError;
use crate::platform::free_space_bytes;

/// Headroom kept free on the destination volume.
const CUSHION: u64 = 4 * 1024 * 1024;

pub(crate) fn format_bytes(n: u64) -> String {
    const KB: f64 = 1024.0;
    const MB: f64 = KB * 1024.0;
    const GB: f64 = MB * 1024.0;
    let f = n as f64;
    if f >= GB {
        format!("{:.1} GiB", f / GB)
    } else if f >= MB {
        format!("{:.1} MiB", f / MB)
    } else if f >= KB {
        format!("{:.1} KiB", f / KB)
    } else {
        format!("{} B", n)
    }
}

/// Fail with `InsufficientSpace` when `dst_dir` cannot hold `required` more bytes.
/// If the volume cannot be queried the check is skipped.
pub(crate) fn ensure_space_for_copy(dst_dir: &Path, required: u64) -> Result<(), SortError> {
    let free = match free_space_bytes(dst_dir) {
        Ok(free) => free,
        Err(e) => {
            debug!(dir = %dst_dir.display(), error = %e, "free-space query failed; skipping check");
            return Ok(());
        }
    };
    if free < required.saturating_add(CUSHION) {
        debug!(
            dir = %dst_dir.display(),
            need = %format_bytes(required),
            free = %format_bytes(free),
            "not enough free space"
        );
        return Err(SortError::InsufficientSpace {
            required,
            available: free,
            dest: dst_dir.to_path_buf(),
        });
    }
    Ok(())
}
