//! XML configuration support.
//! - Loads settings from config.xml (quick_xml + serde).
//! - A missing file means defaults; a malformed file or an unknown field is an error.
//!
//! Notes:
//! - This module only reads the config file; value checks happen in `Config::validate`.

use anyhow::{Context, Result};
use quick_xml::de::from_str as from_xml_str;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

use super::paths::config_path;
use crate::config::types::{Config, LogLevel};

/// Struct mirroring the XML config for deserialization.
#[derive(Debug, Deserialize)]
#[serde(rename = "config")]
#[serde(deny_unknown_fields)]
struct XmlConfig {
    #[serde(default, deserialize_with = "de_trimmed_opt")]
    precision: Option<u8>,
    #[serde(default, deserialize_with = "de_trimmed_opt")]
    old_naming: Option<bool>,
    #[serde(default, deserialize_with = "de_trimmed_opt")]
    workers: Option<usize>,
    #[serde(default, deserialize_with = "de_trimmed_opt")]
    queue_depth: Option<usize>,
    raw_path: Option<String>,
    #[serde(default, deserialize_with = "de_trimmed_opt")]
    write_tags: Option<bool>,
    log_level: Option<String>,
    log_file: Option<String>,
}

// Trims surrounding whitespace before parsing; empty or unparsable values fall back to defaults.
fn de_trimmed_opt<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: serde::Deserializer<'de>,
    T: std::str::FromStr,
{
    let opt: Option<String> = Option::deserialize(deserializer)?;
    Ok(opt.and_then(|s| s.trim().parse::<T>().ok()))
}

fn non_empty_path(s: Option<&str>) -> Option<PathBuf> {
    s.map(str::trim)
        .filter(|t| !t.is_empty())
        .map(PathBuf::from)
}

// Map XmlConfig -> Config
fn xml_to_config(parsed: XmlConfig) -> Config {
    let mut cfg = Config::default();

    if let Some(p) = parsed.precision {
        cfg.precision = p;
    }
    if let Some(v) = parsed.old_naming {
        cfg.old_naming = v;
    }
    if let Some(w) = parsed.workers {
        cfg.workers = w;
    }
    cfg.queue_depth = parsed.queue_depth;
    cfg.raw_path = non_empty_path(parsed.raw_path.as_deref());
    if let Some(v) = parsed.write_tags {
        cfg.write_tags = v;
    }
    if let Some(s) = parsed.log_level.as_deref()
        && let Ok(level) = s.trim().parse::<LogLevel>()
    {
        cfg.log_level = level;
    }
    cfg.log_file = non_empty_path(parsed.log_file.as_deref());

    cfg
}

/// Load a Config from a specific XML file path (quick_xml).
pub fn load_config_from_xml_path(path: &Path) -> Result<Config> {
    let contents = fs::read_to_string(path)
        .with_context(|| format!("read config xml '{}'", path.display()))?;
    let parsed: XmlConfig = from_xml_str(&contents)
        .with_context(|| format!("parse config xml '{}'", path.display()))?;
    Ok(xml_to_config(parsed))
}

/// Load the config in use (`SORTMEDIA_CONFIG` or the default path).
/// Returns the path it came from, or `None` when no file exists and defaults apply.
pub fn load_config() -> Result<(Config, Option<PathBuf>)> {
    let path = config_path()?;
    if !path.exists() {
        debug!(path = %path.display(), "no config file; using defaults");
        return Ok((Config::default(), None));
    }
    let cfg = load_config_from_xml_path(&path)?;
    Ok((cfg, Some(path)))
}
