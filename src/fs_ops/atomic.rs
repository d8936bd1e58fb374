//! Atomic publish primitive.
//! - Renames without ever replacing an occupant.
//! - Reports cross-device failures as `SortError::CrossDevice` so callers can fall back to copy.
//! - On Unix, best-effort fsync of the destination directory after the rename.

use std::io;
use std::path::Path;

use super::util::{fsync_dir, is_cross_device};
use crate::errors::SortError;

/// Rename `src` onto the free name `dst` using `rename`.
pub(crate) fn publish_with<F>(src: &Path, dst: &Path, rename: F) -> Result<(), SortError>
where
    F: Fn(&Path, &Path) -> io::Result<()>,
{
    match rename(src, dst) {
        Ok(()) => {
            // Ignore fsync errors to avoid turning a successful rename into a failure.
            if let Some(parent) = dst.parent() {
                let _ = fsync_dir(parent);
            }
            Ok(())
        }
        Err(e) if is_cross_device(&e) => Err(SortError::CrossDevice {
            src: src.to_path_buf(),
            dst: dst.to_path_buf(),
        }),
        Err(e) => Err(SortError::io("rename into place", dst, e)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fs_ops::util::rename_noreplace;
    use std::fs;
    use tempfile::tempdir;

    #[cfg(unix)]
    #[test]
    fn exdev_becomes_cross_device() {
        let td = tempdir().unwrap();
        let err = publish_with(&td.path().join("a"), &td.path().join("b"), |_, _| {
            Err(io::Error::from_raw_os_error(libc::EXDEV))
        })
        .unwrap_err();
        assert!(matches!(err, SortError::CrossDevice { .. }));
    }

    #[test]
    fn occupied_destination_is_reported() {
        let td = tempdir().unwrap();
        let a = td.path().join("a");
        let b = td.path().join("b");
        fs::write(&a, b"a").unwrap();
        fs::write(&b, b"b").unwrap();
        let err = publish_with(&a, &b, rename_noreplace).unwrap_err();
        assert_eq!(fs::read(&b).unwrap(), b"b");
        assert!(matches!(err, SortError::DestinationExists(_)));
    }
}
