//! Per-run coordination state.
//! One `RunContext` is built at run start and shared by reference with every task: the
//! cancellation flag set by the Ctrl-C handler and the run-wide counters.
//!
//! Notes:
//! - Relaxed atomics are sufficient for a one-way "stop" flag and independent counters.
//! - `CancelToken::cancel()` is safe to call from a signal handler thread.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

/// Cooperative cancellation flag shared by a run and whoever may interrupt it.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation (idempotent).
    #[inline]
    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    #[inline]
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// Run-wide counters updated concurrently by workers.
#[derive(Debug, Default)]
pub struct RunStats {
    processed: AtomicU64,
    duplicates: AtomicU64,
    skipped: AtomicU64,
    errors: AtomicU64,
    bytes: AtomicU64,
}

/// Plain copy of the counters at one point in time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StatsSnapshot {
    /// Files transferred (or that would be, in dry-run).
    pub processed: u64,
    pub duplicates: u64,
    /// Files found but not handled, e.g. unsupported extensions.
    pub skipped: u64,
    pub errors: u64,
    pub bytes: u64,
}

impl RunStats {
    pub fn record_processed(&self, bytes: u64) {
        self.processed.fetch_add(1, Ordering::Relaxed);
        self.bytes.fetch_add(bytes, Ordering::Relaxed);
    }

    pub fn record_duplicate(&self) {
        self.duplicates.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_skipped(&self) {
        self.skipped.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_error(&self) {
        self.errors.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            processed: self.processed.load(Ordering::Relaxed),
            duplicates: self.duplicates.load(Ordering::Relaxed),
            skipped: self.skipped.load(Ordering::Relaxed),
            errors: self.errors.load(Ordering::Relaxed),
            bytes: self.bytes.load(Ordering::Relaxed),
        }
    }
}

#[derive(Debug, Default)]
pub struct RunContext {
    stats: RunStats,
    cancel: CancelToken,
}

impl RunContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Context whose cancellation is driven by an existing token.
    pub fn with_cancel(cancel: CancelToken) -> Self {
        Self {
            stats: RunStats::default(),
            cancel,
        }
    }

    pub fn stats(&self) -> &RunStats {
        &self.stats
    }

    pub fn cancel_token(&self) -> &CancelToken {
        &self.cancel
    }

    #[inline]
    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cancel_is_shared_between_clones() {
        let token = CancelToken::new();
        let ctx = RunContext::with_cancel(token.clone());
        assert!(!ctx.is_cancelled());
        token.cancel();
        assert!(ctx.is_cancelled());
        token.cancel();
        assert!(ctx.cancel_token().is_cancelled());
    }

    #[test]
    fn counters_accumulate_across_threads() {
        let stats = RunStats::default();
        std::thread::scope(|s| {
            for _ in 0..4 {
                s.spawn(|| {
                    for _ in 0..100 {
                        stats.record_processed(2);
                        stats.record_error();
                    }
                });
            }
        });
        let snap = stats.snapshot();
        assert_eq!(snap.processed, 400);
        assert_eq!(snap.bytes, 800);
        assert_eq!(snap.errors, 400);
        assert_eq!(snap.duplicates, 0);
    }
}
