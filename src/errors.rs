//! Typed error definitions for sortmedia.
//! Per-file failures are reported through `SortError` so the engine can count and log them
//! with a stable code; application plumbing wraps them in `anyhow`.

use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::fs_ops::helpers::build_message;

#[derive(Debug, Error)]
pub enum SortError {
    /// Rename refused because source and destination live on different filesystems.
    #[error("cross-device rename '{src}' -> '{dst}'")]
    CrossDevice { src: PathBuf, dst: PathBuf },

    #[error("destination already exists: {0}")]
    DestinationExists(PathBuf),

    #[error("too many collisions resolving {path}: gave up after {probes} probes")]
    CollisionLimitExceeded { path: PathBuf, probes: u32 },

    #[error("no usable metadata for {path}: {reason}")]
    MetadataUnavailable { path: PathBuf, reason: String },

    #[error("metadata extraction failed for {path}: {reason}")]
    ExtractionFailed { path: PathBuf, reason: String },

    #[error("writing tags to {path} failed: {reason}")]
    MetadataWriteFailed { path: PathBuf, reason: String },

    #[error("{name} is not available: {reason}")]
    CollaboratorUnavailable { name: String, reason: String },

    #[error("Permission denied on {path}: {context}")]
    PermissionDenied { path: PathBuf, context: String },

    #[error("path too long: {path}: {context}")]
    PathTooLong { path: PathBuf, context: String },

    #[error("Insufficient disk space for destination {dest}: need {required} bytes, have {available} bytes")]
    InsufficientSpace {
        required: u64,
        available: u64,
        dest: PathBuf,
    },

    #[error("Operation interrupted by user")]
    Interrupted,

    #[error("{message}")]
    Io {
        path: PathBuf,
        message: String,
        #[source]
        source: io::Error,
    },
}

impl SortError {
    /// Classify an io error raised while performing `op` on `path`.
    pub fn io(op: &str, path: &Path, err: io::Error) -> Self {
        let message = build_message(op, path, &err);
        if err.kind() == io::ErrorKind::AlreadyExists {
            return SortError::DestinationExists(path.to_path_buf());
        }
        if err.kind() == io::ErrorKind::PermissionDenied {
            return SortError::PermissionDenied {
                path: path.to_path_buf(),
                context: message,
            };
        }
        if is_name_too_long(&err) {
            return SortError::PathTooLong {
                path: path.to_path_buf(),
                context: message,
            };
        }
        SortError::Io {
            path: path.to_path_buf(),
            message,
            source: err,
        }
    }

    /// Stable numeric code used in structured logs and exit reporting.
    pub fn code(&self) -> u16 {
        match self {
            SortError::CrossDevice { .. } => 10,
            SortError::DestinationExists(_) => 11,
            SortError::CollisionLimitExceeded { .. } => 12,
            SortError::MetadataUnavailable { .. } => 20,
            SortError::ExtractionFailed { .. } => 21,
            SortError::CollaboratorUnavailable { .. } => 22,
            SortError::MetadataWriteFailed { .. } => 23,
            SortError::PermissionDenied { .. } => 30,
            SortError::PathTooLong { .. } => 31,
            SortError::InsufficientSpace { .. } => 32,
            SortError::Interrupted => 40,
            SortError::Io { .. } => 50,
        }
    }

    /// Short machine-friendly label for the `kind` log field.
    pub fn kind(&self) -> &'static str {
        match self {
            SortError::CrossDevice { .. } => "cross_device",
            SortError::DestinationExists(_) => "destination_exists",
            SortError::CollisionLimitExceeded { .. } => "collision_limit",
            SortError::MetadataUnavailable { .. } => "metadata_unavailable",
            SortError::ExtractionFailed { .. } => "extraction_failed",
            SortError::CollaboratorUnavailable { .. } => "collaborator_unavailable",
            SortError::MetadataWriteFailed { .. } => "metadata_write_failed",
            SortError::PermissionDenied { .. } => "permission_denied",
            SortError::PathTooLong { .. } => "path_too_long",
            SortError::InsufficientSpace { .. } => "insufficient_space",
            SortError::Interrupted => "interrupted",
            SortError::Io { .. } => "io",
        }
    }
}

fn is_name_too_long(err: &io::Error) -> bool {
    match err.raw_os_error() {
        #[cfg(unix)]
        Some(code) => code == libc::ENAMETOOLONG,
        // ERROR_FILENAME_EXCED_RANGE
        #[cfg(windows)]
        Some(code) => code == 206,
        #[cfg(not(any(unix, windows)))]
        Some(_) => false,
        None => false,
    }
}
