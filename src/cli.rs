//! CLI definition and parsing.
//! Defines Args (global flags plus `process` / `verify` subcommands) and applies them over the
//! loaded config.
//!
//! Notes:
//! - --debug is a shorthand for --log-level debug.
//! - Flags that are not given leave the config value alone.

use anyhow::Result;
use clap::{ArgGroup, Parser, Subcommand, ValueHint};
use std::path::PathBuf;

use crate::config::types::{Config, LogLevel};
use crate::engine::{AlbumSource, RunOptions, TransferMode};
use crate::media::TimeAdjustment;
use crate::verify::VerifyOptions;

/// Organize photos and videos into a date-based archive.
/// CLI flags override config values (which are loaded from XML if present).
#[derive(Parser, Debug, Clone)]
#[command(
    author,
    version,
    about = "Organize photos and videos into a date-based archive",
    arg_required_else_help = true
)]
pub struct Args {
    /// Enable debug logging (equivalent to `--log-level debug`).
    #[arg(short = 'd', long, global = true)]
    pub debug: bool,

    /// Set log level. One of: quiet, normal, info, debug.
    #[arg(long, global = true, help = "Set log level: quiet, normal, info, debug")]
    pub log_level: Option<String>,

    /// Emit logs in structured JSON (includes timestamp, level, and structured fields).
    #[arg(long, global = true)]
    pub json: bool,

    /// Read settings from this XML file instead of SORTMEDIA_CONFIG or the default location.
    #[arg(long, global = true, value_name = "FILE", value_hint = ValueHint::FilePath)]
    pub config: Option<PathBuf>,

    /// Print the config file location in use and exit.
    #[arg(long)]
    pub print_config: bool,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Copy or move media files into the archive.
    Process(ProcessArgs),
    /// Check archived file names against their metadata.
    Verify(VerifyArgs),
}

#[derive(clap::Args, Debug, Clone)]
#[command(group(ArgGroup::new("mode").required(true).args(["copy", "move_files"])))]
pub struct ProcessArgs {
    /// Files or directories to import.
    #[arg(required = true, value_name = "SOURCE", value_hint = ValueHint::AnyPath)]
    pub sources: Vec<PathBuf>,

    /// Archive root.
    #[arg(value_name = "DEST", value_hint = ValueHint::DirPath)]
    pub destination: PathBuf,

    /// Copy files, leaving the sources in place.
    #[arg(short = 'c', long)]
    pub copy: bool,

    /// Move files into the archive.
    #[arg(short = 'm', long = "move")]
    pub move_files: bool,

    /// Show what would be done, but do not modify files.
    #[arg(long, visible_alias = "pretend")]
    pub dry_run: bool,

    /// Descend into subdirectories of SOURCE.
    #[arg(short = 'r', long)]
    pub recursive: bool,

    /// Number of worker threads.
    #[arg(short = 'w', long)]
    pub workers: Option<usize>,

    /// Files waiting for a worker (default: twice the worker count).
    #[arg(long)]
    pub queue_depth: Option<usize>,

    /// Subsecond digits in file names (0-6).
    #[arg(short = 'p', long)]
    pub precision: Option<u8>,

    /// Name cameras `MakeModel` instead of `Make-Model`.
    #[arg(long)]
    pub old_naming: bool,

    /// Separate archive root for camera RAW files.
    #[arg(long, value_hint = ValueHint::DirPath)]
    pub raw_path: Option<PathBuf>,

    /// Shift capture times by [-]HH:MM:SS.
    #[arg(long, allow_hyphen_values = true, value_name = "[-]HH:MM:SS")]
    pub time_adjust: Option<String>,

    /// Shift capture times by whole days.
    #[arg(long, allow_hyphen_values = true, value_name = "DAYS")]
    pub day_adjust: Option<i64>,

    /// Album name written into every archived file.
    #[arg(long, conflicts_with = "album_from_directory")]
    pub album: Option<String>,

    /// Use each file's parent directory name as its album.
    #[arg(long)]
    pub album_from_directory: bool,

    /// Keyword written into archived files (repeatable).
    #[arg(short = 't', long = "tag", value_name = "TAG")]
    pub tags: Vec<String>,

    /// Do not write any metadata into archived files.
    #[arg(long)]
    pub no_tags: bool,

    /// Exit with status 1 when any file failed.
    #[arg(long)]
    pub fail_on_error: bool,
}

#[derive(clap::Args, Debug, Clone)]
pub struct VerifyArgs {
    /// Archive directories to check (walked recursively).
    #[arg(required = true, value_name = "DIR", value_hint = ValueHint::DirPath)]
    pub dirs: Vec<PathBuf>,

    /// Rename mismatched files to their expected names.
    #[arg(long)]
    pub fix: bool,

    /// Subsecond digits in file names (0-6).
    #[arg(short = 'p', long)]
    pub precision: Option<u8>,

    /// Expect `MakeModel` camera names.
    #[arg(long)]
    pub old_naming: bool,

    /// Number of worker threads.
    #[arg(short = 'w', long)]
    pub workers: Option<usize>,
}

impl Args {
    /// Effective log level derived from flags.
    /// Precedence: --debug > --log-level value > None (use config default).
    pub fn effective_log_level(&self) -> Option<LogLevel> {
        if self.debug {
            return Some(LogLevel::Debug);
        }
        self.log_level.as_deref().and_then(LogLevel::parse)
    }

    /// Apply CLI overrides to a loaded Config (in-place). No-ops for unset flags.
    pub fn apply_overrides(&self, cfg: &mut Config) {
        if let Some(level) = self.effective_log_level() {
            cfg.log_level = level;
        }
        match &self.command {
            Some(Command::Process(p)) => p.apply_overrides(cfg),
            Some(Command::Verify(v)) => v.apply_overrides(cfg),
            None => {}
        }
    }
}

impl ProcessArgs {
    pub fn mode(&self) -> TransferMode {
        if self.move_files {
            TransferMode::Move
        } else {
            TransferMode::Copy
        }
    }

    pub fn apply_overrides(&self, cfg: &mut Config) {
        if let Some(w) = self.workers {
            cfg.workers = w;
        }
        if let Some(q) = self.queue_depth {
            cfg.queue_depth = Some(q);
        }
        if let Some(p) = self.precision {
            cfg.precision = p;
        }
        if self.old_naming {
            cfg.old_naming = true;
        }
        if let Some(raw) = &self.raw_path {
            cfg.raw_path = Some(raw.clone());
        }
        if self.no_tags {
            cfg.write_tags = false;
        }
    }

    /// Options for one run, from these flags over the merged config.
    pub fn run_options(&self, cfg: &Config) -> Result<RunOptions> {
        let mut opts = RunOptions::new(self.sources.clone(), &self.destination, self.mode());
        opts.raw_destination = cfg.raw_path.clone();
        opts.dry_run = self.dry_run;
        opts.recursive = self.recursive;
        opts.workers = cfg.workers;
        opts.queue_depth = cfg.effective_queue_depth();
        opts.naming = cfg.naming();
        opts.adjust = TimeAdjustment::new(self.time_adjust.as_deref(), self.day_adjust)?;
        opts.album = match (&self.album, self.album_from_directory) {
            (Some(name), _) => AlbumSource::Fixed(name.clone()),
            (None, true) => AlbumSource::ParentDirectory,
            (None, false) => AlbumSource::None,
        };
        opts.tags = self.tags.clone();
        Ok(opts)
    }
}

impl VerifyArgs {
    pub fn apply_overrides(&self, cfg: &mut Config) {
        if let Some(w) = self.workers {
            cfg.workers = w;
        }
        if let Some(p) = self.precision {
            cfg.precision = p;
        }
        if self.old_naming {
            cfg.old_naming = true;
        }
    }

    pub fn verify_options(&self, cfg: &Config) -> VerifyOptions {
        let mut opts = VerifyOptions::new(self.dirs.clone());
        opts.fix = self.fix;
        opts.naming = cfg.naming();
        opts.workers = cfg.workers;
        opts
    }
}

pub fn parse() -> Args {
    Args::parse()
}
