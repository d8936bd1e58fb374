//! Default path helpers and symlink checks.
//! Determines OS-appropriate config/log paths and detects symlinked ancestors for safety.

use anyhow::{Result, anyhow};
use dirs::{config_dir, data_dir};
use std::env;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use super::CONFIG_ENV_VAR;

/// Config file in use: `SORTMEDIA_CONFIG` when set, else the OS default.
pub fn config_path() -> Result<PathBuf> {
    if let Some(p) = env::var_os(CONFIG_ENV_VAR) {
        let p = PathBuf::from(p);
        // A directory means "config.xml inside it".
        if p.is_dir() {
            return Ok(p.join("config.xml"));
        }
        return Ok(p);
    }
    default_config_path()
}

/// `<config dir>/sortmedia/config.xml`.
pub fn default_config_path() -> Result<PathBuf> {
    app_dir(config_dir(), &[".config"]).map(|d| d.join("config.xml"))
}

/// `<data dir>/sortmedia/sortmedia.log`.
pub fn default_log_path() -> Result<PathBuf> {
    app_dir(data_dir(), &[".local", "share"]).map(|d| d.join("sortmedia.log"))
}

/// `base/sortmedia`, or `$HOME/<home_rel...>/sortmedia` when the platform has no such directory.
fn app_dir(base: Option<PathBuf>, home_rel: &[&str]) -> Result<PathBuf> {
    let base = match base {
        Some(b) => b,
        None => {
            let home = env::var_os("HOME")
                .ok_or_else(|| anyhow!("cannot locate a per-user directory: HOME is not set"))?;
            home_rel.iter().fold(PathBuf::from(home), |p, seg| p.join(seg))
        }
    };
    Ok(base.join("sortmedia"))
}

/// True when an existing ancestor of `path` (not `path` itself) is a symlink.
pub fn path_has_symlink_ancestor(path: &Path) -> io::Result<bool> {
    for anc in path.ancestors().skip(1).filter(|a| !a.as_os_str().is_empty()) {
        match fs::symlink_metadata(anc) {
            Ok(meta) if meta.file_type().is_symlink() => return Ok(true),
            Ok(_) => {}
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => return Err(e),
        }
    }
    Ok(false)
}
