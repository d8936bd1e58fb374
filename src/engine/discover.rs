//! Source discovery.
//! Expands the given roots into supported media files. Runs on the calling thread and is
//! consumed lazily, so a full work queue naturally throttles the walk. Because workers publish
//! while the walk is still going, directories listed in `exclude` (the run's own archive roots)
//! are pruned from the walk.

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use walkdir::{DirEntry, WalkDir};

use crate::fs_ops::TEMP_PREFIX;
use crate::fs_ops::hash::ORIGINAL_SUFFIX;

/// Extensions the organizer handles (lower-case, no dot).
pub const MEDIA_EXTENSIONS: &[&str] = &[
    "jpg", "jpeg", "png", "tiff", "tif", "heic", "arw", "cr2", "crw", "dcr", "dng", "mrw", "nef",
    "nrw", "orf", "pef", "ptx", "raw", "rw2", "rwl", "srf", "sr2", "srw", "x3f", "mov", "mp4",
    "m4v", "avi", "mpg", "mpeg",
];

/// Camera RAW formats; routed to the RAW destination when one is configured.
pub const RAW_EXTENSIONS: &[&str] = &[
    "arw", "cr2", "crw", "dcr", "dng", "mrw", "nef", "nrw", "orf", "pef", "ptx", "raw", "rw2",
    "rwl", "srf", "sr2", "srw", "x3f",
];

pub fn is_supported(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| MEDIA_EXTENSIONS.contains(&e.to_ascii_lowercase().as_str()))
}

pub fn is_raw_extension(ext: &str) -> bool {
    RAW_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str())
}

/// One item produced by the walk.
#[derive(Debug)]
pub enum Discovered {
    Media(PathBuf),
    Unsupported(PathBuf),
    Failed { path: PathBuf, error: String },
}

/// Leftovers from our own copies and exiftool backups are never sources.
fn is_ignored(path: &Path) -> bool {
    let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
        return false;
    };
    name.starts_with(TEMP_PREFIX) || name.ends_with(ORIGINAL_SUFFIX)
}

fn identity(path: &Path) -> PathBuf {
    fs::canonicalize(path)
        .or_else(|_| std::path::absolute(path))
        .unwrap_or_else(|_| path.to_path_buf())
}

fn is_excluded(entry: &DirEntry, excluded: &[PathBuf]) -> bool {
    !excluded.is_empty() && entry.file_type().is_dir() && excluded.contains(&identity(entry.path()))
}

/// Walk `roots` and yield every regular file once, never descending into `exclude`.
pub fn discover<'a>(
    roots: &'a [PathBuf],
    recursive: bool,
    exclude: &[PathBuf],
) -> impl Iterator<Item = Discovered> + use<'a> {
    let max_depth = if recursive { usize::MAX } else { 1 };
    let mut seen: HashSet<PathBuf> = HashSet::new();
    let excluded: Arc<Vec<PathBuf>> = Arc::new(exclude.iter().map(|p| identity(p)).collect());

    roots
        .iter()
        .flat_map(move |root| {
            let excluded = Arc::clone(&excluded);
            WalkDir::new(root)
                .max_depth(max_depth)
                .follow_links(false)
                .into_iter()
                .filter_entry(move |e| !is_excluded(e, &excluded))
        })
        .filter_map(move |entry| {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    let path = e.path().map(Path::to_path_buf).unwrap_or_default();
                    return Some(Discovered::Failed {
                        path,
                        error: e.to_string(),
                    });
                }
            };
            let path = entry.path();
            let ft = entry.file_type();
            let is_file = ft.is_file() || (ft.is_symlink() && path.is_file());
            if !is_file || is_ignored(path) {
                return None;
            }
            if !seen.insert(identity(path)) {
                return None;
            }
            if is_supported(path) {
                Some(Discovered::Media(path.to_path_buf()))
            } else {
                Some(Discovered::Unsupported(path.to_path_buf()))
            }
        })
}
