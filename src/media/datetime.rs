//! Capture-time resolution from provider fields, then the file name, then the file's mtime.

use chrono::{DateTime, Local, NaiveDate, NaiveDateTime, NaiveTime, Timelike};
use regex::Regex;
use std::path::Path;
use std::sync::LazyLock;
use std::time::SystemTime;

use super::RawFields;

/// Timestamp layout used by EXIF and QuickTime tags.
pub const EXIF_DATETIME_FORMAT: &str = "%Y:%m:%d %H:%M:%S";

const PHOTO_KEYS: [&str; 4] = [
    "EXIF:DateTimeOriginal",
    "DateTimeOriginal",
    "EXIF:ModifyDate",
    "ModifyDate",
];
const SUBSEC_KEYS: [&str; 2] = ["EXIF:SubSecTimeOriginal", "SubSecTimeOriginal"];
const VIDEO_KEYS: [&str; 2] = ["QuickTime:CreateDate", "CreateDate"];

static FILE_NAME_TS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(\d{8}).?(\d{6})?.?(\d+)?").expect("file name timestamp regex must compile")
});

/// Where a resolved timestamp came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimestampSource {
    Embedded,
    FileName,
    FileModified,
}

impl TimestampSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            TimestampSource::Embedded => "embedded",
            TimestampSource::FileName => "file_name",
            TimestampSource::FileModified => "file_modified",
        }
    }
}

/// Walk the fallback chain; None only when every source is missing or unparsable.
pub fn resolve_timestamp(
    path: &Path,
    raw: &RawFields,
    modified: Option<SystemTime>,
) -> Option<(NaiveDateTime, TimestampSource)> {
    if let Some(ts) = from_fields(raw) {
        return Some((ts, TimestampSource::Embedded));
    }
    if let Some(ts) = path
        .file_name()
        .and_then(|n| n.to_str())
        .and_then(from_file_name)
    {
        return Some((ts, TimestampSource::FileName));
    }
    modified.map(|m| (DateTime::<Local>::from(m).naive_local(), TimestampSource::FileModified))
}

/// Photo tags first (with subseconds), then video creation date.
pub fn from_fields(raw: &RawFields) -> Option<NaiveDateTime> {
    for key in PHOTO_KEYS {
        if let Some(ts) = field_str(raw, key).and_then(|s| parse_exif_datetime(&s)) {
            let micros = SUBSEC_KEYS
                .iter()
                .find_map(|k| field_str(raw, k))
                .map(|s| parse_subseconds(&s))
                .unwrap_or(0);
            return ts.with_nanosecond(micros * 1_000).or(Some(ts));
        }
    }
    VIDEO_KEYS
        .iter()
        .find_map(|k| field_str(raw, k).and_then(|s| parse_exif_datetime(&s)))
}

/// `YYYYMMDD`, optionally followed by `HHMMSS` and a fraction, anywhere in the name.
pub fn from_file_name(name: &str) -> Option<NaiveDateTime> {
    let caps = FILE_NAME_TS.captures(name)?;
    let date = NaiveDate::parse_from_str(&caps[1], "%Y%m%d").ok()?;
    let Some(time) = caps.get(2) else {
        return date.and_hms_opt(0, 0, 0);
    };
    let time = NaiveTime::parse_from_str(time.as_str(), "%H%M%S").ok()?;
    let ts = date.and_time(time);
    match caps.get(3) {
        Some(frac) => ts.with_nanosecond(parse_subseconds(frac.as_str()) * 1_000),
        None => Some(ts),
    }
}

/// Subsecond digits padded or truncated to microseconds.
pub fn parse_subseconds(s: &str) -> u32 {
    let digits: String = s
        .trim()
        .chars()
        .take_while(|c| c.is_ascii_digit())
        .take(6)
        .collect();
    format!("{digits:0<6}").parse().unwrap_or(0)
}

fn parse_exif_datetime(s: &str) -> Option<NaiveDateTime> {
    // Tags may carry a fraction or zone suffix after the first 19 characters.
    let head = s.trim().get(..19)?;
    NaiveDateTime::parse_from_str(head, EXIF_DATETIME_FORMAT).ok()
}

fn field_str(raw: &RawFields, key: &str) -> Option<String> {
    match raw.get(key)? {
        serde_json::Value::String(s) if !s.trim().is_empty() => Some(s.clone()),
        serde_json::Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}
