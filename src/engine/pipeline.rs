//! Per-file pipeline: metadata, destination, collision check, transfer, tag write.
//!
//! Each file walks a small state machine:
//! `Pending -> MetadataResolved -> PathResolved -> {Duplicate | Ready} -> {Skipped | Transferred | Failed}`.
//! Transitions are logged at trace level. A failure at any step fails this file only.

use std::path::{Path, PathBuf};
use tracing::{debug, error, info, trace, warn};

use super::Engine;
use super::context::RunContext;
use super::options::TransferMode;
use crate::errors::SortError;
use crate::fs_ops::collision::{self, Resolution};
use crate::fs_ops::{copy_file, move_file};
use crate::media::MediaRecord;
use crate::pathgen;

/// Times one file may go back to collision resolution because its slot was taken under it.
pub const MAX_PUBLISH_ATTEMPTS: u32 = 16;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileState {
    Pending,
    MetadataResolved,
    PathResolved,
    Duplicate,
    Ready,
    Skipped,
    Transferred,
    Failed,
}

impl FileState {
    pub fn as_str(&self) -> &'static str {
        match self {
            FileState::Pending => "pending",
            FileState::MetadataResolved => "metadata_resolved",
            FileState::PathResolved => "path_resolved",
            FileState::Duplicate => "duplicate",
            FileState::Ready => "ready",
            FileState::Skipped => "skipped",
            FileState::Transferred => "transferred",
            FileState::Failed => "failed",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            FileState::Skipped | FileState::Transferred | FileState::Failed
        )
    }
}

/// What happened to one source file.
#[derive(Debug)]
pub struct TransferOutcome {
    pub source: PathBuf,
    pub destination: Option<PathBuf>,
    pub duplicate: bool,
    pub bytes: u64,
    pub state: FileState,
    pub dry_run: bool,
    pub error: Option<SortError>,
    /// Tag writing failed; the transfer itself still stands.
    pub write_error: Option<SortError>,
}

impl TransferOutcome {
    fn pending(source: &Path, dry_run: bool) -> Self {
        Self {
            source: source.to_path_buf(),
            destination: None,
            duplicate: false,
            bytes: 0,
            state: FileState::Pending,
            dry_run,
            error: None,
            write_error: None,
        }
    }

    fn advance(&mut self, next: FileState) {
        if self.state == next {
            return;
        }
        trace!(
            src = %self.source.display(),
            from = self.state.as_str(),
            to = next.as_str(),
            "state transition"
        );
        self.state = next;
    }
}

impl Engine<'_> {
    pub(crate) fn process_file(&self, source: &Path, ctx: &RunContext) -> TransferOutcome {
        let mut outcome = TransferOutcome::pending(source, self.options.dry_run);
        if let Err(e) = self.drive(&mut outcome) {
            error!(
                code = e.code(),
                kind = e.kind(),
                src = %source.display(),
                error = %e,
                "file failed"
            );
            outcome.advance(FileState::Failed);
            outcome.error = Some(e);
        }

        let stats = ctx.stats();
        match outcome.state {
            FileState::Transferred => stats.record_processed(outcome.bytes),
            FileState::Skipped if outcome.duplicate => stats.record_duplicate(),
            FileState::Skipped => stats.record_skipped(),
            FileState::Failed => stats.record_error(),
            other => {
                // drive() always ends in a terminal state or an error
                warn!(src = %source.display(), state = other.as_str(), "file ended in a non-terminal state");
                stats.record_error();
            }
        }
        outcome
    }

    fn drive(&self, outcome: &mut TransferOutcome) -> Result<(), SortError> {
        let opts = self.options;
        let source = outcome.source.clone();

        let record = self.provider.extract(&source, &opts.adjust)?;
        outcome.advance(FileState::MetadataResolved);

        let root = opts.root_for(&record.extension);
        let candidate = pathgen::build(&record, &opts.naming, 0);
        outcome.advance(FileState::PathResolved);

        let mut resolution = collision::resolve(&source, root, &candidate)?;
        let mut attempts: u32 = 0;
        loop {
            if resolution.duplicate {
                info!(src = %source.display(), dest = %resolution.path.display(), "duplicate of archived file; skipping");
                outcome.destination = Some(resolution.path);
                outcome.duplicate = true;
                outcome.advance(FileState::Duplicate);
                outcome.advance(FileState::Skipped);
                return Ok(());
            }
            outcome.advance(FileState::Ready);

            // The slot may have been taken since it was resolved.
            if collision::is_occupied(&resolution.path)? {
                resolution = self.resolve_again(&source, root, resolution, &mut attempts)?;
                continue;
            }

            if opts.dry_run {
                info!(
                    src = %source.display(),
                    dest = %resolution.path.display(),
                    mode = opts.mode.as_str(),
                    "dry-run: would transfer"
                );
                outcome.destination = Some(resolution.path);
                outcome.advance(FileState::Transferred);
                return Ok(());
            }

            let result = match opts.mode {
                TransferMode::Copy => copy_file(&source, &resolution.path),
                TransferMode::Move => move_file(&source, &resolution.path),
            };
            match result {
                Ok(bytes) => {
                    info!(
                        src = %source.display(),
                        dest = %resolution.path.display(),
                        bytes,
                        mode = opts.mode.as_str(),
                        "transferred"
                    );
                    outcome.bytes = bytes;
                    outcome.destination = Some(resolution.path);
                    outcome.advance(FileState::Transferred);
                    break;
                }
                Err(SortError::DestinationExists(_)) => {
                    resolution = self.resolve_again(&source, root, resolution, &mut attempts)?;
                }
                Err(e) => return Err(e),
            }
        }

        if let Some(dest) = outcome.destination.as_deref() {
            outcome.write_error = self.write_tags(dest, &record);
        }
        Ok(())
    }

    fn resolve_again(
        &self,
        source: &Path,
        root: &Path,
        lost: Resolution,
        attempts: &mut u32,
    ) -> Result<Resolution, SortError> {
        *attempts += 1;
        if *attempts > MAX_PUBLISH_ATTEMPTS {
            return Err(SortError::CollisionLimitExceeded {
                path: lost.path,
                probes: *attempts,
            });
        }
        debug!(
            src = %source.display(),
            dest = %lost.path.display(),
            attempt = *attempts,
            "destination taken before publish; resolving again"
        );
        collision::resolve(source, root, &lost.candidate)
    }

    fn write_tags(&self, dest: &Path, record: &MediaRecord) -> Option<SortError> {
        let captured = record.captured?;
        let album = self.options.album.album_for(&record.source);
        match self
            .writer
            .write(dest, captured, album.as_deref(), &self.options.tags)
        {
            Ok(()) => None,
            Err(e) => {
                warn!(
                    code = e.code(),
                    kind = e.kind(),
                    dest = %dest.display(),
                    error = %e,
                    "could not write tags; file kept"
                );
                Some(e)
            }
        }
    }
}
