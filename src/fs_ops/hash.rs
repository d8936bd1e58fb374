//! Streaming SHA-256 content hashes for duplicate detection.
//!
//! When exiftool rewrites tags in place it keeps the untouched bytes as `<file>_original`.
//! Hashing that sidecar instead of the file keeps a file and its tagged archive copy equal, so a
//! second run over the same inputs still sees them as duplicates.

use sha2::{Digest, Sha256};
use std::ffi::OsString;
use std::fs::File;
use std::io::{self, Read};
use std::path::{Path, PathBuf};

use crate::errors::SortError;

const CHUNK_SIZE: usize = 1024 * 1024;

/// Suffix exiftool appends to its pre-modification backup.
pub const ORIGINAL_SUFFIX: &str = "_original";

/// Path whose bytes represent `path`'s content: the sidecar when present, else `path` itself.
pub fn hash_source_for(path: &Path) -> PathBuf {
    let mut sidecar = OsString::from(path.as_os_str());
    sidecar.push(ORIGINAL_SUFFIX);
    let sidecar = PathBuf::from(sidecar);
    if sidecar.is_file() {
        sidecar
    } else {
        path.to_path_buf()
    }
}

/// Lowercase hex SHA-256 of `path`'s content (sidecar-aware).
pub fn content_hash(path: &Path) -> Result<String, SortError> {
    let target = hash_source_for(path);
    sha256_file(&target).map_err(|e| SortError::io("hash", &target, e))
}

pub(crate) fn sha256_file(path: &Path) -> io::Result<String> {
    let mut file = File::open(path)?;
    let mut hasher = Sha256::new();
    let mut buffer = vec![0u8; CHUNK_SIZE];
    loop {
        let n = file.read(&mut buffer)?;
        if n == 0 {
            break;
        }
        hasher.update(&buffer[..n]);
    }
    Ok(hex::encode(hasher.finalize()))
}
