//! Collision resolution for archive destinations.
//!
//! Policy:
//! - A free candidate is used as-is and nothing is hashed.
//! - An occupant with the same content hash makes the source a duplicate.
//! - Otherwise `_1`, `_2`, ... are probed in order until a free slot or a matching occupant
//!   turns up. The increment only moves forward.
//!
//! Notes:
//! - This only reads the filesystem. Publishing is no-clobber, so a slot claimed by another
//!   worker after resolution is caught at rename time and resolved again from there.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::trace;

use super::hash::content_hash;
use crate::errors::SortError;
use crate::pathgen::DestinationCandidate;

/// Occupied slots inspected before giving up on one file.
pub const MAX_COLLISION_PROBES: u32 = 1000;

/// Where a source should go, and whether that slot already holds the same content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    pub candidate: DestinationCandidate,
    pub path: PathBuf,
    pub duplicate: bool,
}

/// Resolve `candidate` (relative to `root`) for `source`.
pub fn resolve(
    source: &Path,
    root: &Path,
    candidate: &DestinationCandidate,
) -> Result<Resolution, SortError> {
    let first = candidate.path_in(root);
    if !is_occupied(&first)? {
        return Ok(Resolution {
            candidate: candidate.clone(),
            path: first,
            duplicate: false,
        });
    }

    let source_hash = content_hash(source)?;
    let mut current = candidate.clone();
    let mut path = first;
    let mut probes: u32 = 0;
    loop {
        if occupant_matches(&path, &source_hash)? {
            trace!(src = %source.display(), dest = %path.display(), "occupant has identical content");
            return Ok(Resolution {
                candidate: current,
                path,
                duplicate: true,
            });
        }

        probes += 1;
        if probes == 3 {
            trace!(src = %source.display(), dir = %root.join(candidate.dir()).display(), "collision: several occupied slots, continuing to probe");
        }
        if probes >= MAX_COLLISION_PROBES {
            return Err(SortError::CollisionLimitExceeded {
                path: candidate.path_in(root),
                probes,
            });
        }

        current = current.with_increment(current.increment() + 1);
        path = current.path_in(root);
        if !is_occupied(&path)? {
            return Ok(Resolution {
                candidate: current,
                path,
                duplicate: false,
            });
        }
    }
}

/// Symlink-aware existence check; a dangling link still occupies the name.
pub(crate) fn is_occupied(path: &Path) -> Result<bool, SortError> {
    match fs::symlink_metadata(path) {
        Ok(_) => Ok(true),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
        Err(e) => Err(SortError::io("inspect destination", path, e)),
    }
}

fn occupant_matches(path: &Path, source_hash: &str) -> Result<bool, SortError> {
    let meta = fs::symlink_metadata(path).map_err(|e| SortError::io("inspect destination", path, e))?;
    if !meta.is_file() {
        return Ok(false);
    }
    Ok(content_hash(path)? == source_hash)
}
