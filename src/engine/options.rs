//! Options for one organizing run.

use anyhow::{Result, bail};
use std::fs;
use std::path::{Path, PathBuf};

use crate::media::TimeAdjustment;
use crate::pathgen::NamingConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TransferMode {
    #[default]
    Copy,
    Move,
}

impl TransferMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransferMode::Copy => "copy",
            TransferMode::Move => "move",
        }
    }
}

/// Album written alongside the capture time.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum AlbumSource {
    #[default]
    None,
    Fixed(String),
    /// Name of the directory the source file sits in.
    ParentDirectory,
}

impl AlbumSource {
    pub fn album_for(&self, source: &Path) -> Option<String> {
        match self {
            AlbumSource::None => None,
            AlbumSource::Fixed(name) => Some(name.clone()),
            AlbumSource::ParentDirectory => source
                .parent()
                .and_then(|p| p.file_name())
                .map(|n| n.to_string_lossy().into_owned()),
        }
    }
}

pub fn default_workers() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1)
}

#[derive(Debug, Clone)]
pub struct RunOptions {
    pub sources: Vec<PathBuf>,
    pub destination: PathBuf,
    /// RAW files go here instead of `destination` when set.
    pub raw_destination: Option<PathBuf>,
    pub mode: TransferMode,
    pub dry_run: bool,
    pub recursive: bool,
    pub workers: usize,
    pub queue_depth: usize,
    pub naming: NamingConfig,
    pub adjust: TimeAdjustment,
    pub album: AlbumSource,
    pub tags: Vec<String>,
}

impl RunOptions {
    pub fn new(sources: Vec<PathBuf>, destination: impl Into<PathBuf>, mode: TransferMode) -> Self {
        let workers = default_workers();
        Self {
            sources,
            destination: destination.into(),
            raw_destination: None,
            mode,
            dry_run: false,
            recursive: false,
            workers,
            queue_depth: workers * 2,
            naming: NamingConfig::default(),
            adjust: TimeAdjustment::none(),
            album: AlbumSource::None,
            tags: Vec::new(),
        }
    }

    /// Root a record with extension `ext` is archived under.
    pub fn root_for(&self, ext: &str) -> &Path {
        match &self.raw_destination {
            Some(raw) if super::discover::is_raw_extension(ext) => raw,
            _ => &self.destination,
        }
    }

    /// Check the options before any file is touched.
    pub fn validate(&self) -> Result<()> {
        if self.workers == 0 {
            bail!("workers must be at least 1");
        }
        if self.queue_depth == 0 {
            bail!("queue depth must be at least 1");
        }
        if self.sources.is_empty() {
            bail!("no source paths given");
        }
        let dest = comparable(&self.destination);
        for src in &self.sources {
            if fs::symlink_metadata(src).is_err() {
                bail!("source does not exist: {}", src.display());
            }
            if comparable(src) == dest {
                bail!(
                    "destination {} is the same as source {}",
                    self.destination.display(),
                    src.display()
                );
            }
        }
        if let Ok(meta) = fs::metadata(&self.destination)
            && !meta.is_dir()
        {
            bail!("destination is not a directory: {}", self.destination.display());
        }
        Ok(())
    }
}

fn comparable(path: &Path) -> PathBuf {
    fs::canonicalize(path)
        .or_else(|_| std::path::absolute(path))
        .unwrap_or_else(|_| path.to_path_buf())
}
