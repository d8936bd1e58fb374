//! Archive verification.
//! Recomputes the expected name of every archived file from its metadata and reports (or, with
//! `fix`, repairs) names that no longer match. Repairs go through the same collision rules as a
//! normal run, so an identical file already holding the expected name is left alone.

use anyhow::{Result, bail};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::{debug, error, info, warn};

use crate::engine::pool::run_bounded;
use crate::engine::{CancelToken, Discovered, default_workers, discover};
use crate::errors::SortError;
use crate::fs_ops::{move_file, resolve};
use crate::media::{MetadataProvider, TimeAdjustment};
use crate::pathgen::{self, NamingConfig};

#[derive(Debug, Clone)]
pub struct VerifyOptions {
    pub dirs: Vec<PathBuf>,
    pub fix: bool,
    pub naming: NamingConfig,
    pub workers: usize,
}

impl VerifyOptions {
    pub fn new(dirs: Vec<PathBuf>) -> Self {
        Self {
            dirs,
            fix: false,
            naming: NamingConfig::default(),
            workers: default_workers(),
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.workers == 0 {
            bail!("workers must be at least 1");
        }
        if self.dirs.is_empty() {
            bail!("no directories given");
        }
        for dir in &self.dirs {
            if !dir.is_dir() {
                bail!("not a directory: {}", dir.display());
            }
        }
        Ok(())
    }
}

#[derive(Debug, Default)]
pub struct VerifyStats {
    verified: AtomicU64,
    matched: AtomicU64,
    mismatches: AtomicU64,
    fixed: AtomicU64,
    errors: AtomicU64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct VerifySnapshot {
    pub verified: u64,
    pub matched: u64,
    pub mismatches: u64,
    pub fixed: u64,
    pub errors: u64,
}

impl VerifyStats {
    fn bump(counter: &AtomicU64) {
        counter.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> VerifySnapshot {
        VerifySnapshot {
            verified: self.verified.load(Ordering::Relaxed),
            matched: self.matched.load(Ordering::Relaxed),
            mismatches: self.mismatches.load(Ordering::Relaxed),
            fixed: self.fixed.load(Ordering::Relaxed),
            errors: self.errors.load(Ordering::Relaxed),
        }
    }
}

#[derive(Debug)]
pub enum VerifyOutcome {
    Matched(PathBuf),
    Mismatch {
        current: PathBuf,
        expected: PathBuf,
    },
    Fixed {
        from: PathBuf,
        to: PathBuf,
    },
    /// The expected name is held by a file with identical content.
    DuplicateOf {
        current: PathBuf,
        occupant: PathBuf,
    },
    Failed {
        path: PathBuf,
        error: SortError,
    },
}

pub struct Verifier<'a> {
    options: &'a VerifyOptions,
    provider: &'a dyn MetadataProvider,
}

impl<'a> Verifier<'a> {
    pub fn new(options: &'a VerifyOptions, provider: &'a dyn MetadataProvider) -> Self {
        Self { options, provider }
    }

    pub fn run(&self, cancel: &CancelToken) -> Result<VerifySnapshot> {
        self.run_with(cancel, |_| {})
    }

    pub fn run_with<F>(&self, cancel: &CancelToken, observe: F) -> Result<VerifySnapshot>
    where
        F: Fn(&VerifyOutcome) + Sync,
    {
        self.options.validate()?;
        let stats = VerifyStats::default();
        let files = discover(&self.options.dirs, true, &[]).filter_map(|item| match item {
            Discovered::Media(path) => Some(path),
            Discovered::Unsupported(_) => None,
            Discovered::Failed { path, error } => {
                warn!(path = %path.display(), %error, "could not read archive entry");
                VerifyStats::bump(&stats.errors);
                None
            }
        });

        let workers = self.options.workers;
        run_bounded(workers, workers * 2, cancel, files, |path| {
            let outcome = self.verify_file(&path, &stats);
            observe(&outcome);
        })?;

        let snap = stats.snapshot();
        info!(
            verified = snap.verified,
            matched = snap.matched,
            mismatches = snap.mismatches,
            fixed = snap.fixed,
            errors = snap.errors,
            "verify finished"
        );
        Ok(snap)
    }

    fn verify_file(&self, path: &Path, stats: &VerifyStats) -> VerifyOutcome {
        VerifyStats::bump(&stats.verified);
        match self.check(path, stats) {
            Ok(outcome) => outcome,
            Err(e) => {
                error!(code = e.code(), kind = e.kind(), path = %path.display(), error = %e, "verify failed");
                VerifyStats::bump(&stats.errors);
                VerifyOutcome::Failed {
                    path: path.to_path_buf(),
                    error: e,
                }
            }
        }
    }

    fn check(&self, path: &Path, stats: &VerifyStats) -> Result<VerifyOutcome, SortError> {
        let naming = &self.options.naming;
        let record = self.provider.extract(path, &TimeAdjustment::none())?;
        let current = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let increment = pathgen::parse_file_name(&current, naming)
            .map(|p| p.increment)
            .unwrap_or(0);
        let expected = pathgen::build(&record, naming, increment).with_dir("");
        let expected_name = expected.file_name();

        if current.eq_ignore_ascii_case(&expected_name) {
            debug!(path = %path.display(), "name matches metadata");
            VerifyStats::bump(&stats.matched);
            return Ok(VerifyOutcome::Matched(path.to_path_buf()));
        }

        VerifyStats::bump(&stats.mismatches);
        let dir = path.parent().unwrap_or(Path::new(""));
        if !self.options.fix {
            return Ok(VerifyOutcome::Mismatch {
                current: path.to_path_buf(),
                expected: dir.join(expected_name),
            });
        }

        let resolution = resolve(path, dir, &expected.with_increment(0))?;
        if resolution.path == path {
            VerifyStats::bump(&stats.matched);
            return Ok(VerifyOutcome::Matched(path.to_path_buf()));
        }
        if resolution.duplicate {
            info!(path = %path.display(), occupant = %resolution.path.display(), "expected name held by identical file; leaving in place");
            return Ok(VerifyOutcome::DuplicateOf {
                current: path.to_path_buf(),
                occupant: resolution.path,
            });
        }
        move_file(path, &resolution.path)?;
        info!(from = %path.display(), to = %resolution.path.display(), "renamed to match metadata");
        VerifyStats::bump(&stats.fixed);
        Ok(VerifyOutcome::Fixed {
            from: path.to_path_buf(),
            to: resolution.path,
        })
    }
}
