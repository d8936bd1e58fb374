//! Orchestration of an organizing run.
//! Discovery feeds a bounded queue on the calling thread; a fixed pool of workers takes each
//! file through the pipeline in `pipeline.rs`. Counters and the cancel flag live in a
//! per-run `RunContext`.

use anyhow::Result;
use std::fs;
use std::path::PathBuf;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

pub mod context;
pub mod discover;
pub mod options;
pub mod pipeline;
pub(crate) mod pool;

pub use context::{CancelToken, RunContext, RunStats, StatsSnapshot};
pub use discover::{Discovered, MEDIA_EXTENSIONS, RAW_EXTENSIONS, discover};
pub use options::{AlbumSource, RunOptions, TransferMode, default_workers};
pub use pipeline::{FileState, MAX_PUBLISH_ATTEMPTS, TransferOutcome};

use crate::fs_ops::io_error_with_help;
use crate::media::{MetadataProvider, MetadataWriter};

/// Totals for a finished (or cancelled) run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunReport {
    pub stats: StatsSnapshot,
    pub submitted: u64,
    pub cancelled: bool,
    pub elapsed: Duration,
}

pub struct Engine<'a> {
    options: &'a RunOptions,
    provider: &'a dyn MetadataProvider,
    writer: &'a dyn MetadataWriter,
}

impl<'a> Engine<'a> {
    pub fn new(
        options: &'a RunOptions,
        provider: &'a dyn MetadataProvider,
        writer: &'a dyn MetadataWriter,
    ) -> Self {
        Self {
            options,
            provider,
            writer,
        }
    }

    pub fn options(&self) -> &RunOptions {
        self.options
    }

    pub fn run(&self, ctx: &RunContext) -> Result<RunReport> {
        self.run_with(ctx, |_| {})
    }

    /// Run and hand every outcome to `observe` as it completes (from worker threads).
    pub fn run_with<F>(&self, ctx: &RunContext, observe: F) -> Result<RunReport>
    where
        F: Fn(&TransferOutcome) + Sync,
    {
        let opts = self.options;
        opts.validate()?;
        let archive_roots: Vec<PathBuf> = std::iter::once(&opts.destination)
            .chain(opts.raw_destination.as_ref())
            .cloned()
            .collect();
        if !opts.dry_run {
            // Created up front so discovery can recognize them by canonical path.
            for root in &archive_roots {
                fs::create_dir_all(root).map_err(io_error_with_help("create archive root", root))?;
            }
        }
        let started = Instant::now();
        debug!(
            sources = opts.sources.len(),
            dest = %opts.destination.display(),
            workers = opts.workers,
            queue_depth = opts.queue_depth,
            mode = opts.mode.as_str(),
            dry_run = opts.dry_run,
            "starting run"
        );

        let stats = ctx.stats();
        let walk = discover(&opts.sources, opts.recursive, &archive_roots);
        let files = walk.filter_map(|item| match item {
            Discovered::Media(path) => Some(path),
            Discovered::Unsupported(path) => {
                debug!(path = %path.display(), "unsupported file type; skipping");
                stats.record_skipped();
                None
            }
            Discovered::Failed { path, error } => {
                warn!(path = %path.display(), %error, "could not read source entry");
                stats.record_error();
                None
            }
        });

        let submitted = pool::run_bounded(
            opts.workers,
            opts.queue_depth,
            ctx.cancel_token(),
            files,
            |source| {
                let outcome = self.process_file(&source, ctx);
                observe(&outcome);
            },
        )?;

        let report = RunReport {
            stats: stats.snapshot(),
            submitted,
            cancelled: ctx.is_cancelled(),
            elapsed: started.elapsed(),
        };
        info!(
            processed = report.stats.processed,
            duplicates = report.stats.duplicates,
            skipped = report.stats.skipped,
            errors = report.stats.errors,
            bytes = report.stats.bytes,
            cancelled = report.cancelled,
            elapsed_ms = report.elapsed.as_millis() as u64,
            "run finished"
        );
        Ok(report)
    }
}
