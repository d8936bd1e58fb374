//! exiftool-backed metadata provider and writer.
//!
//! exiftool is run once per file with `-json -G`, so keys arrive group-qualified
//! (`EXIF:DateTimeOriginal`, `QuickTime:CreateDate`). Both spellings are accepted because older
//! versions and some formats drop the group. Writing uses exiftool's default backup behavior,
//! which leaves `<file>_original` next to the rewritten file; duplicate detection relies on it.

use chrono::NaiveDateTime;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use tracing::{debug, warn};

use super::datetime::{self, EXIF_DATETIME_FORMAT};
use super::normalize::{normalize_make, normalize_model};
use super::{MediaRecord, MetadataProvider, MetadataWriter, RawFields, TimeAdjustment};
use crate::errors::SortError;

const PROGRAM: &str = "exiftool";
const MAKE_KEYS: [&str; 3] = ["EXIF:Make", "Make", "MakerNotes:Make"];
const MODEL_KEYS: [&str; 3] = ["EXIF:Model", "Model", "MakerNotes:Model"];
const QUERY_TAGS: [&str; 6] = [
    "-DateTimeOriginal",
    "-SubSecTimeOriginal",
    "-ModifyDate",
    "-CreateDate",
    "-Make",
    "-Model",
];

/// Location of a usable exiftool executable.
#[derive(Debug, Clone)]
pub struct ExifTool {
    program: PathBuf,
}

impl ExifTool {
    /// Find `exiftool` on PATH.
    pub fn locate() -> Result<Self, SortError> {
        Self::locate_named(PROGRAM)
    }

    pub fn locate_named(name: &str) -> Result<Self, SortError> {
        let program = which::which(name).map_err(|e| SortError::CollaboratorUnavailable {
            name: name.to_string(),
            reason: format!("{e}; install exiftool and make sure it is on PATH"),
        })?;
        debug!(program = %program.display(), "found exiftool");
        Ok(Self { program })
    }

    pub fn program(&self) -> &Path {
        &self.program
    }
}

#[derive(Debug, Clone)]
pub struct ExifToolProvider {
    tool: ExifTool,
}

impl ExifToolProvider {
    pub fn new(tool: ExifTool) -> Self {
        Self { tool }
    }

    fn query(&self, path: &Path) -> Result<RawFields, SortError> {
        let output = Command::new(&self.tool.program)
            .arg("-json")
            .arg("-G")
            .args(QUERY_TAGS)
            .arg(path)
            .output()
            .map_err(|e| SortError::ExtractionFailed {
                path: path.to_path_buf(),
                reason: format!("spawn exiftool: {e}"),
            })?;
        if !output.status.success() && output.stdout.is_empty() {
            return Err(SortError::MetadataUnavailable {
                path: path.to_path_buf(),
                reason: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }
        parse_json_output(path, &output.stdout)
    }
}

impl MetadataProvider for ExifToolProvider {
    fn extract(&self, path: &Path, adjust: &TimeAdjustment) -> Result<MediaRecord, SortError> {
        let meta = fs::metadata(path).map_err(|e| SortError::MetadataUnavailable {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        let raw = match self.query(path) {
            Ok(raw) => raw,
            Err(e @ SortError::MetadataUnavailable { .. }) => {
                warn!(path = %path.display(), code = e.code(), kind = e.kind(), error = %e, "no embedded metadata; using file name and mtime");
                RawFields::new()
            }
            Err(e) => return Err(e),
        };
        Ok(record_from_fields(path, raw, meta.modified().ok(), adjust))
    }
}

/// Turn exiftool fields into a record, walking the timestamp fallback chain.
pub fn record_from_fields(
    path: &Path,
    raw: RawFields,
    modified: Option<std::time::SystemTime>,
    adjust: &TimeAdjustment,
) -> MediaRecord {
    let captured = datetime::resolve_timestamp(path, &raw, modified).map(|(ts, source)| {
        debug!(path = %path.display(), source = source.as_str(), %ts, "resolved capture time");
        adjust.apply(ts)
    });
    let make = normalize_make(first_str(&raw, &MAKE_KEYS));
    let model = normalize_model(&make, first_str(&raw, &MODEL_KEYS));
    MediaRecord::new(path, captured, make, model).with_raw(raw)
}

/// exiftool prints a JSON array with one object per file.
pub fn parse_json_output(path: &Path, stdout: &[u8]) -> Result<RawFields, SortError> {
    let entries: Vec<RawFields> =
        serde_json::from_slice(stdout).map_err(|e| SortError::ExtractionFailed {
            path: path.to_path_buf(),
            reason: format!("unreadable exiftool output: {e}"),
        })?;
    let mut fields = entries.into_iter().next().unwrap_or_default();
    fields.remove("SourceFile");
    Ok(fields)
}

fn first_str<'a>(raw: &'a RawFields, keys: &[&str]) -> Option<&'a str> {
    keys.iter()
        .find_map(|k| raw.get(*k).and_then(|v| v.as_str()))
        .filter(|s| !s.trim().is_empty())
}

#[derive(Debug, Clone)]
pub struct ExifToolWriter {
    tool: ExifTool,
}

impl ExifToolWriter {
    pub fn new(tool: ExifTool) -> Self {
        Self { tool }
    }
}

impl MetadataWriter for ExifToolWriter {
    fn write(
        &self,
        path: &Path,
        captured: NaiveDateTime,
        album: Option<&str>,
        tags: &[String],
    ) -> Result<(), SortError> {
        let stamp = captured.format(EXIF_DATETIME_FORMAT).to_string();
        let mut cmd = Command::new(&self.tool.program);
        cmd.arg(format!("-EXIF:DateTimeOriginal={stamp}"))
            .arg(format!("-EXIF:CreateDate={stamp}"))
            .arg(format!("-EXIF:ModifyDate={stamp}"));
        if let Some(album) = album {
            cmd.arg(format!("-XMP:Album={album}"));
        }
        for tag in tags {
            cmd.arg(format!("-Keywords={tag}"));
        }
        let output = cmd
            .arg(path)
            .output()
            .map_err(|e| SortError::MetadataWriteFailed {
                path: path.to_path_buf(),
                reason: format!("spawn exiftool: {e}"),
            })?;
        if !output.status.success() {
            return Err(SortError::MetadataWriteFailed {
                path: path.to_path_buf(),
                reason: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }
        debug!(path = %path.display(), album = ?album, tags = tags.len(), "wrote tags");
        Ok(())
    }
}
