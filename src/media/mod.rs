//! Media metadata seam.
//!
//! The pipeline only sees a typed `MediaRecord`; how capture time, make and model are found is up
//! to a `MetadataProvider`. Tags are written back through a `MetadataWriter`. The exiftool-backed
//! pair lives in `exiftool`; tests plug in their own.

pub mod adjust;
pub mod datetime;
pub mod exiftool;
pub mod normalize;

use chrono::NaiveDateTime;
use std::path::{Path, PathBuf};

use crate::errors::SortError;

pub use adjust::TimeAdjustment;
pub use exiftool::{ExifTool, ExifToolProvider, ExifToolWriter};

/// Provider fields as they came back, keyed by their original tag names.
pub type RawFields = serde_json::Map<String, serde_json::Value>;

/// What the pipeline knows about one source file.
#[derive(Debug, Clone, PartialEq)]
pub struct MediaRecord {
    pub source: PathBuf,
    /// Extension as found on the source, without the dot.
    pub extension: String,
    /// Capture time with any requested adjustment already applied.
    pub captured: Option<NaiveDateTime>,
    pub make: String,
    pub model: String,
    pub raw: RawFields,
}

impl MediaRecord {
    pub fn new(
        source: impl Into<PathBuf>,
        captured: Option<NaiveDateTime>,
        make: impl Into<String>,
        model: impl Into<String>,
    ) -> Self {
        let source = source.into();
        let extension = extension_of(&source);
        Self {
            source,
            extension,
            captured,
            make: make.into(),
            model: model.into(),
            raw: RawFields::new(),
        }
    }

    pub fn with_raw(mut self, raw: RawFields) -> Self {
        self.raw = raw;
        self
    }
}

pub(crate) fn extension_of(path: &Path) -> String {
    path.extension()
        .map(|e| e.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// Source of capture metadata.
///
/// Implementations apply `adjust` to whatever timestamp they find and do their own fallback
/// when embedded tags are missing. `MetadataUnavailable` and `ExtractionFailed` fail the file.
pub trait MetadataProvider: Send + Sync {
    fn extract(&self, path: &Path, adjust: &TimeAdjustment) -> Result<MediaRecord, SortError>;
}

/// Writes capture time, album and keywords back into an archived file.
pub trait MetadataWriter: Send + Sync {
    fn write(
        &self,
        path: &Path,
        captured: NaiveDateTime,
        album: Option<&str>,
        tags: &[String],
    ) -> Result<(), SortError>;
}

/// Writer used when tag writing is turned off.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopWriter;

impl MetadataWriter for NoopWriter {
    fn write(
        &self,
        _path: &Path,
        _captured: NaiveDateTime,
        _album: Option<&str>,
        _tags: &[String],
    ) -> Result<(), SortError> {
        Ok(())
    }
}
