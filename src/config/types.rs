//! `Config` (settings shared by all commands) and `LogLevel`.

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use super::DEFAULT_PRECISION;
use crate::engine::default_workers;
use crate::pathgen::{NamingConfig, NamingStyle};

/// Console verbosity, from `--log-level`, `-d` or `<log_level>`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum LogLevel {
    /// Errors only
    Quiet,
    /// One line per transferred file
    #[default]
    Normal,
    /// Adds resolution details
    Info,
    /// Adds per-file state transitions
    Debug,
}

impl LogLevel {
    /// Case-insensitive; accepts a few synonyms such as `verbose` and `trace`.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_ascii_lowercase().as_str() {
            "quiet" | "error" | "none" => Some(LogLevel::Quiet),
            "normal" => Some(LogLevel::Normal),
            "info" | "verbose" | "detailed" => Some(LogLevel::Info),
            "debug" | "trace" => Some(LogLevel::Debug),
            _ => None,
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            LogLevel::Quiet => "quiet",
            LogLevel::Normal => "normal",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
        };
        f.write_str(s)
    }
}

impl FromStr for LogLevel {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| format!("invalid log level: '{s}'"))
    }
}

/// Settings shared by every command; CLI flags override them per run.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// Subsecond digits in file names (clamped to 6)
    pub precision: u8,
    /// Join make and model without a dash
    pub old_naming: bool,
    pub workers: usize,
    /// Files waiting for a worker; `None` means twice the worker count
    pub queue_depth: Option<usize>,
    /// Separate archive root for camera RAW files
    pub raw_path: Option<PathBuf>,
    /// Write capture time, album and keywords into archived files
    pub write_tags: bool,
    /// Console verbosity
    pub log_level: LogLevel,
    /// Optional path to a log file
    pub log_file: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            precision: DEFAULT_PRECISION,
            old_naming: false,
            workers: default_workers(),
            queue_depth: None,
            raw_path: None,
            write_tags: true,
            log_level: LogLevel::Normal,
            log_file: None,
        }
    }
}

impl Config {
    pub fn naming(&self) -> NamingConfig {
        let style = if self.old_naming {
            NamingStyle::Legacy
        } else {
            NamingStyle::Modern
        };
        NamingConfig::new(self.precision, style)
    }

    pub fn effective_queue_depth(&self) -> usize {
        self.queue_depth
            .unwrap_or_else(|| self.workers.saturating_mul(2))
    }
}
