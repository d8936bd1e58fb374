//! File move implementation.
//! Attempts a no-clobber rename; when the volumes differ, falls back to a safe copy, carries the
//! timestamps over, then removes the source. Any other rename failure is returned as-is.

use std::fs;
use std::io;
use std::path::Path;
use tracing::{debug, warn};

use super::atomic::publish_with;
use super::copy::{copy_file, parent_dir};
use super::metadata::preserve_times;
use super::util::rename_noreplace;
use crate::errors::SortError;

/// Move `src` to `dst`, returning the file's size in bytes.
pub fn move_file(src: &Path, dst: &Path) -> Result<u64, SortError> {
    move_file_with(src, dst, rename_noreplace)
}

/// `move_file` with an injectable rename primitive.
pub fn move_file_with<F>(src: &Path, dst: &Path, rename: F) -> Result<u64, SortError>
where
    F: Fn(&Path, &Path) -> io::Result<()>,
{
    let dest_dir = parent_dir(dst)?;
    fs::create_dir_all(dest_dir)
        .map_err(|e| SortError::io("create destination directory", dest_dir, e))?;
    let src_meta = fs::metadata(src).map_err(|e| SortError::io("stat source", src, e))?;

    match publish_with(src, dst, rename) {
        Ok(()) => {
            debug!(src = %src.display(), dest = %dst.display(), "renamed file atomically");
            Ok(src_meta.len())
        }
        Err(SortError::CrossDevice { .. }) => {
            warn!(
                src = %src.display(),
                dest = %dst.display(),
                hint = "cross-filesystem; will copy instead",
                "atomic rename not possible, using safe copy then delete"
            );
            // On failure the source has not been touched yet.
            let bytes = copy_file(src, dst)?;
            preserve_times(dst, &src_meta);
            fs::remove_file(src).map_err(|e| SortError::io("remove original file", src, e))?;
            Ok(bytes)
        }
        Err(e) => Err(e),
    }
}
