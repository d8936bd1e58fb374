//! Streaming copy between two already-open files.
//!
//! Features:
//! - In-kernel `copy_file_range` on Linux, buffered 1 MiB copy elsewhere or when unsupported.
//! - Full fsync so the bytes are durable before the caller publishes the file.
//!
//! Snapshot semantics: the source is read once from its current offset to EOF; if it grows
//! concurrently, the additional bytes are not included.

use std::fs::File;
use std::io::{self, BufReader, BufWriter, Write};

const BUF_SIZE: usize = 1024 * 1024;

/// Copy every remaining byte of `src` into `dst`.
pub(crate) fn copy_into(src: &mut File, dst: &mut File) -> io::Result<u64> {
    #[cfg(target_os = "linux")]
    {
        if let Some(bytes) = copy_file_range_all(src, dst)? {
            dst.sync_all()?;
            return Ok(bytes);
        }
    }

    let mut reader = BufReader::with_capacity(BUF_SIZE, src);
    let mut writer = BufWriter::with_capacity(BUF_SIZE, dst);
    let bytes = io::copy(&mut reader, &mut writer)?;
    writer.flush()?;
    writer.get_ref().sync_all()?;
    Ok(bytes)
}

/// Returns Ok(None) when the kernel or filesystem cannot do the copy and nothing was written yet.
#[cfg(target_os = "linux")]
fn copy_file_range_all(src: &File, dst: &File) -> io::Result<Option<u64>> {
    use std::os::unix::io::AsRawFd;

    let chunk: usize = 16 * 1024 * 1024;
    let mut total: u64 = 0;
    loop {
        let rc = unsafe {
            libc::copy_file_range(
                src.as_raw_fd(),
                std::ptr::null_mut(),
                dst.as_raw_fd(),
                std::ptr::null_mut(),
                chunk,
                0,
            )
        };
        if rc > 0 {
            total += rc as u64;
            continue;
        }
        if rc == 0 {
            return Ok(Some(total));
        }
        let err = io::Error::last_os_error();
        let unsupported = matches!(
            err.raw_os_error(),
            Some(code) if code == libc::EXDEV
                || code == libc::ENOSYS
                || code == libc::EINVAL
                || code == libc::EPERM
                || code == libc::EOPNOTSUPP
        );
        if total == 0 && unsupported {
            return Ok(None);
        }
        // Partial copy then error; the caller discards the temp file.
        return Err(err);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::{self, OpenOptions};
    use tempfile::tempdir;

    fn open_pair(src: &std::path::Path, dst: &std::path::Path) -> (File, File) {
        let s = File::open(src).unwrap();
        let d = OpenOptions::new().write(true).create_new(true).open(dst).unwrap();
        (s, d)
    }

    #[test]
    fn copy_small_file_ok() {
        let dir = tempdir().unwrap();
        let src_path = dir.path().join("src.jpg");
        let dst_path = dir.path().join("dst.jpg");
        fs::write(&src_path, b"hello world").unwrap();

        let (mut s, mut d) = open_pair(&src_path, &dst_path);
        assert_eq!(copy_into(&mut s, &mut d).unwrap(), 11);
        assert_eq!(fs::read(&dst_path).unwrap(), b"hello world");
    }

    #[test]
    fn copy_zero_length_ok() {
        let dir = tempdir().unwrap();
        let src_path = dir.path().join("empty");
        let dst_path = dir.path().join("out");
        File::create(&src_path).unwrap();

        let (mut s, mut d) = open_pair(&src_path, &dst_path);
        assert_eq!(copy_into(&mut s, &mut d).unwrap(), 0);
        assert_eq!(fs::metadata(&dst_path).unwrap().len(), 0);
    }

    #[test]
    fn large_file_copy_boundary() {
        let dir = tempdir().unwrap();
        let src = dir.path().join("big.mov");
        let dst = dir.path().join("big.out");

        let size = 2 * BUF_SIZE + 123;
        let data: Vec<u8> = (0..size).map(|i| (i % 251) as u8).collect();
        fs::write(&src, &data).unwrap();

        let (mut s, mut d) = open_pair(&src, &dst);
        assert_eq!(copy_into(&mut s, &mut d).unwrap() as usize, size);
        assert_eq!(fs::read(&dst).unwrap(), data);
    }
}
