//! Safe copy into the archive:
//! - Streams into a temp file created inside the destination directory (`tempfile`)
//! - Fsyncs the temp file and applies the source's permission bits
//! - Publishes with a no-clobber rename, then fsyncs the directory
//! - Any failure drops the temp file, which removes it; the source is only ever read

use std::fs::{self, File};
use std::io;
use std::path::Path;
use tracing::trace;

use super::io_copy;
use super::{metadata, space, util};
use crate::errors::SortError;

/// Prefix of in-flight temp files; discovery ignores names starting with it.
pub const TEMP_PREFIX: &str = ".sortmedia-";

/// Copy `src` to `dst`, returning the number of bytes written.
/// Fails with `DestinationExists` if `dst` is occupied when the copy is published.
pub fn copy_file(src: &Path, dst: &Path) -> Result<u64, SortError> {
    let dest_dir = parent_dir(dst)?;
    fs::create_dir_all(dest_dir)
        .map_err(|e| SortError::io("create destination directory", dest_dir, e))?;

    let mut src_f = File::open(src).map_err(|e| SortError::io("open source", src, e))?;
    let src_meta = src_f
        .metadata()
        .map_err(|e| SortError::io("stat source", src, e))?;
    space::ensure_space_for_copy(dest_dir, src_meta.len())?;

    let mut tmp = tempfile::Builder::new()
        .prefix(TEMP_PREFIX)
        .suffix(".tmp")
        .tempfile_in(dest_dir)
        .map_err(|e| SortError::io("create temporary file", dest_dir, e))?;
    trace!(tmp = %tmp.path().display(), "created temp file");

    let copied = io_copy::copy_into(&mut src_f, tmp.as_file_mut())
        .map_err(|e| SortError::io("copy to temporary file", tmp.path(), e))?;
    metadata::copy_permissions(tmp.as_file(), &src_meta)
        .map_err(|e| SortError::io("set permissions on temporary file", tmp.path(), e))?;

    tmp.persist_noclobber(dst).map_err(|e| {
        // Dropping the returned handle deletes the temp file.
        let tempfile::PersistError { error, file } = e;
        drop(file);
        SortError::io("publish copy", dst, error)
    })?;
    let _ = util::fsync_dir(dest_dir);

    Ok(copied)
}

pub(crate) fn parent_dir(path: &Path) -> Result<&Path, SortError> {
    path.parent().ok_or_else(|| {
        SortError::io(
            "resolve destination directory",
            path,
            io::Error::new(io::ErrorKind::InvalidInput, "destination has no parent"),
        )
    })
}
