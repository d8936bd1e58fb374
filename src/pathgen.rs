//! Canonical archive paths.
//!
//! A media file lands at `YYYY/MM/YYYY-MM-DD/YYYYMMDD-HHMMSS.ffffff_Make-Model[_N].ext`, or at
//! `unknown/unknown_Make-Model[_N].ext` when no capture time is known. Everything here is pure:
//! the same record, naming config and increment always produce the same candidate.

use chrono::{Datelike, NaiveDate, NaiveDateTime, NaiveTime, Timelike};
use regex::Regex;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use crate::media::MediaRecord;

/// Largest supported number of subsecond digits (microseconds).
pub const MAX_PRECISION: u8 = 6;

const UNKNOWN_DIR: &str = "unknown";
const UNKNOWN_STEM: &str = "unknown";
const UNKNOWN_CAMERA: &str = "Unknown";

static NAME_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^(?:(?P<date>\d{8})-(?P<time>\d{6})(?:\.(?P<frac>\d{1,6}))?|unknown)_(?P<camera>.+?)(?:_(?P<inc>[1-9]\d*))?(?:\.(?P<ext>[A-Za-z0-9]+))?$",
    )
    .expect("archive file name regex must compile")
});

/// How the camera segment joins make and model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NamingStyle {
    /// `Make-Model`
    #[default]
    Modern,
    /// `MakeModel`, as written by older archives.
    Legacy,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NamingConfig {
    precision: u8,
    style: NamingStyle,
}

impl NamingConfig {
    /// Precision above `MAX_PRECISION` is clamped.
    pub fn new(precision: u8, style: NamingStyle) -> Self {
        Self {
            precision: precision.min(MAX_PRECISION),
            style,
        }
    }

    pub fn precision(&self) -> u8 {
        self.precision
    }

    pub fn style(&self) -> NamingStyle {
        self.style
    }
}

impl Default for NamingConfig {
    fn default() -> Self {
        Self::new(MAX_PRECISION, NamingStyle::Modern)
    }
}

/// A destination relative to an archive root.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DestinationCandidate {
    dir: PathBuf,
    stem: String,
    extension: String,
    increment: u32,
}

impl DestinationCandidate {
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Timestamp and camera segment, without increment or extension.
    pub fn stem(&self) -> &str {
        &self.stem
    }

    pub fn extension(&self) -> &str {
        &self.extension
    }

    pub fn increment(&self) -> u32 {
        self.increment
    }

    pub fn with_increment(&self, increment: u32) -> Self {
        Self {
            increment,
            ..self.clone()
        }
    }

    /// Same file name, placed in another relative directory.
    pub fn with_dir(&self, dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            ..self.clone()
        }
    }

    pub fn file_name(&self) -> String {
        let mut name = self.stem.clone();
        if self.increment > 0 {
            name.push_str(&format!("_{}", self.increment));
        }
        if !self.extension.is_empty() {
            name.push('.');
            name.push_str(&self.extension);
        }
        name
    }

    pub fn relative_path(&self) -> PathBuf {
        self.dir.join(self.file_name())
    }

    pub fn path_in(&self, root: &Path) -> PathBuf {
        root.join(self.relative_path())
    }
}

/// Parts recovered from an archive file name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedName {
    pub captured: Option<NaiveDateTime>,
    pub camera: String,
    pub increment: u32,
    pub extension: String,
}

/// Build the destination for `record`.
pub fn build(record: &MediaRecord, naming: &NamingConfig, increment: u32) -> DestinationCandidate {
    let camera = camera_segment(&record.make, &record.model, naming.style());
    compose_parts(record.captured, &camera, &record.extension, increment, naming)
}

/// Rebuild a candidate from a parsed file name.
pub fn compose(parsed: &ParsedName, naming: &NamingConfig) -> DestinationCandidate {
    compose_parts(
        parsed.captured,
        &parsed.camera,
        &parsed.extension,
        parsed.increment,
        naming,
    )
}

/// Parse a file name produced by `build` with the same naming config.
///
/// Returns None when the name does not follow the archive format or its subsecond digits do not
/// match the configured precision.
pub fn parse_file_name(name: &str, naming: &NamingConfig) -> Option<ParsedName> {
    let caps = NAME_RE.captures(name)?;

    let captured = match (caps.name("date"), caps.name("time")) {
        (Some(date), Some(time)) => {
            let frac = caps.name("frac").map(|m| m.as_str()).unwrap_or("");
            if frac.len() != naming.precision() as usize {
                return None;
            }
            let date = NaiveDate::parse_from_str(date.as_str(), "%Y%m%d").ok()?;
            let time = NaiveTime::parse_from_str(time.as_str(), "%H%M%S").ok()?;
            let micros: u32 = format!("{frac:0<6}").parse().ok()?;
            Some(date.and_time(time).with_nanosecond(micros * 1_000)?)
        }
        _ => None,
    };

    let increment = match caps.name("inc") {
        Some(m) => m.as_str().parse().ok()?,
        None => 0,
    };

    Some(ParsedName {
        captured,
        camera: caps["camera"].to_string(),
        increment,
        extension: caps
            .name("ext")
            .map(|m| m.as_str().to_ascii_lowercase())
            .unwrap_or_default(),
    })
}

fn compose_parts(
    captured: Option<NaiveDateTime>,
    camera: &str,
    extension: &str,
    increment: u32,
    naming: &NamingConfig,
) -> DestinationCandidate {
    let (dir, ts_stem) = match captured {
        Some(ts) => (date_dir(&ts), timestamp_stem(&ts, naming.precision())),
        None => (PathBuf::from(UNKNOWN_DIR), UNKNOWN_STEM.to_string()),
    };
    DestinationCandidate {
        dir,
        stem: format!("{ts_stem}_{camera}"),
        extension: extension.trim_start_matches('.').to_lowercase(),
        increment,
    }
}

fn date_dir(ts: &NaiveDateTime) -> PathBuf {
    PathBuf::from(format!("{:04}", ts.year()))
        .join(format!("{:02}", ts.month()))
        .join(ts.format("%Y-%m-%d").to_string())
}

fn timestamp_stem(ts: &NaiveDateTime, precision: u8) -> String {
    let base = ts.format("%Y%m%d-%H%M%S").to_string();
    if precision == 0 {
        return base;
    }
    // Leap-second nanos can exceed one second; keep them within six digits.
    let micros = (ts.nanosecond() / 1_000).min(999_999);
    let digits = format!("{micros:06}");
    format!("{base}.{}", &digits[..precision as usize])
}

fn camera_segment(make: &str, model: &str, style: NamingStyle) -> String {
    let make = sanitize_segment(make);
    let model = sanitize_segment(model);
    match (make.is_empty(), model.is_empty()) {
        (false, false) => match style {
            NamingStyle::Modern => format!("{make}-{model}"),
            NamingStyle::Legacy => format!("{make}{model}"),
        },
        (false, true) => make,
        (true, false) => model,
        (true, true) => UNKNOWN_CAMERA.to_string(),
    }
}

/// `_` is reserved for the increment suffix, so it never appears inside a camera segment.
fn sanitize_segment(s: &str) -> String {
    s.chars()
        .filter(|c| !c.is_whitespace())
        .map(|c| if matches!(c, '/' | '\\' | '_') { '-' } else { c })
        .collect()
}
