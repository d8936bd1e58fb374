//! Shared fixtures: an in-process metadata provider and writers that record what they were asked.
#![allow(dead_code)]

use chrono::{NaiveDate, NaiveDateTime};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use sortmedia::SortError;
use sortmedia::media::{MediaRecord, MetadataProvider, MetadataWriter, TimeAdjustment};

pub fn ts(y: i32, mo: u32, d: u32, h: u32, mi: u32, s: u32, micro: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(y, mo, d)
        .unwrap()
        .and_hms_micro_opt(h, mi, s, micro)
        .unwrap()
}

/// 2024-01-15 12:30:45.123456
pub fn sample_ts() -> NaiveDateTime {
    ts(2024, 1, 15, 12, 30, 45, 123_456)
}

#[derive(Clone)]
pub struct Meta {
    pub captured: Option<NaiveDateTime>,
    pub make: &'static str,
    pub model: &'static str,
}

/// Provider answering from a table keyed by file name; unknown names get `default`.
/// Names containing "broken" fail extraction.
pub struct FakeProvider {
    default: Meta,
    by_name: HashMap<String, Meta>,
}

impl FakeProvider {
    pub fn new(captured: Option<NaiveDateTime>, make: &'static str, model: &'static str) -> Self {
        Self {
            default: Meta {
                captured,
                make,
                model,
            },
            by_name: HashMap::new(),
        }
    }

    pub fn canon() -> Self {
        Self::new(Some(sample_ts()), "Canon", "EOS 5D")
    }

    pub fn with(mut self, name: &str, meta: Meta) -> Self {
        self.by_name.insert(name.to_string(), meta);
        self
    }
}

impl MetadataProvider for FakeProvider {
    fn extract(&self, path: &Path, adjust: &TimeAdjustment) -> Result<MediaRecord, SortError> {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        if name.contains("broken") {
            return Err(SortError::ExtractionFailed {
                path: path.to_path_buf(),
                reason: "unreadable test fixture".into(),
            });
        }
        let meta = self.by_name.get(&name).unwrap_or(&self.default);
        Ok(MediaRecord::new(
            path,
            meta.captured.map(|t| adjust.apply(t)),
            meta.make,
            meta.model,
        ))
    }
}

#[derive(Default)]
pub struct RecordingWriter {
    pub calls: Mutex<Vec<(PathBuf, NaiveDateTime, Option<String>, Vec<String>)>>,
}

impl RecordingWriter {
    pub fn count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

impl MetadataWriter for RecordingWriter {
    fn write(
        &self,
        path: &Path,
        captured: NaiveDateTime,
        album: Option<&str>,
        tags: &[String],
    ) -> Result<(), SortError> {
        self.calls.lock().unwrap().push((
            path.to_path_buf(),
            captured,
            album.map(str::to_string),
            tags.to_vec(),
        ));
        Ok(())
    }
}

pub struct FailingWriter;

impl MetadataWriter for FailingWriter {
    fn write(
        &self,
        path: &Path,
        _captured: NaiveDateTime,
        _album: Option<&str>,
        _tags: &[String],
    ) -> Result<(), SortError> {
        Err(SortError::MetadataWriteFailed {
            path: path.to_path_buf(),
            reason: "writer disabled in test".into(),
        })
    }
}

pub fn write_file(path: &Path, content: &[u8]) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(path, content).unwrap();
}

/// Every regular file under `root`, relative and sorted.
pub fn files_under(root: &Path) -> Vec<PathBuf> {
    let mut out: Vec<PathBuf> = walkdir::WalkDir::new(root)
        .into_iter()
        .filter_map(Result::ok)
        .filter(|e| e.file_type().is_file())
        .map(|e| e.path().strip_prefix(root).unwrap().to_path_buf())
        .collect();
    out.sort();
    out
}
