//! Config validation logic.
//! Rejects settings that would stall or misroute a run before any file is touched.

use anyhow::{Result, bail};
use std::path::Path;
use tracing::warn;

use super::types::Config;
use crate::pathgen::MAX_PRECISION;

impl Config {
    /// Validate numeric limits and configured paths.
    pub fn validate(&self) -> Result<()> {
        ensure_positive(self.workers, "workers")?;
        if let Some(depth) = self.queue_depth {
            ensure_positive(depth, "queue_depth")?;
        }
        if self.precision > MAX_PRECISION {
            warn!(
                precision = self.precision,
                max = MAX_PRECISION,
                "precision above maximum; using maximum"
            );
        }
        if let Some(raw) = self.raw_path.as_deref() {
            ensure_dir_or_absent(raw, "raw_path")?;
        }
        if let Some(log) = self.log_file.as_deref()
            && log.is_dir()
        {
            bail!("log_file is a directory: {}", log.display());
        }
        Ok(())
    }
}

fn ensure_positive(value: usize, name: &str) -> Result<()> {
    if value == 0 {
        bail!("{name} must be at least 1");
    }
    Ok(())
}

/// Missing directories are created on first use; an existing non-directory is an error.
fn ensure_dir_or_absent(path: &Path, name: &str) -> Result<()> {
    if path.exists() && !path.is_dir() {
        bail!("{name} exists but isn't a directory: {}", path.display());
    }
    Ok(())
}
