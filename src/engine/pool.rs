//! Bounded worker pool.
//! A fixed set of workers drains a bounded queue while the calling thread feeds it. Producers
//! block when the queue is full; cancellation stops submission and turns queued items into
//! no-ops so the run winds down without starting new work.

use anyhow::{Context, Result};
use crossbeam_channel::bounded;
use tracing::{debug, trace};

use super::context::CancelToken;

/// Run `job` over `items` on `workers` threads with at most `queue_depth` items waiting.
/// Returns how many items were submitted.
pub(crate) fn run_bounded<I, T, F>(
    workers: usize,
    queue_depth: usize,
    cancel: &CancelToken,
    items: I,
    job: F,
) -> Result<u64>
where
    I: IntoIterator<Item = T>,
    T: Send,
    F: Fn(T) + Sync,
{
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(workers)
        .thread_name(|i| format!("sortmedia-worker-{i}"))
        .build()
        .context("failed to start worker pool")?;
    let (tx, rx) = bounded::<T>(queue_depth);
    let job = &job;
    let mut submitted: u64 = 0;

    pool.in_place_scope(|scope| {
        for _ in 0..workers {
            let rx = rx.clone();
            scope.spawn(move |_| {
                for item in rx.iter() {
                    if cancel.is_cancelled() {
                        trace!("cancelled; dropping queued item");
                        continue;
                    }
                    job(item);
                }
            });
        }
        drop(rx);

        for item in items {
            if cancel.is_cancelled() {
                debug!(submitted, "cancellation requested; no further submissions");
                break;
            }
            if tx.send(item).is_err() {
                break;
            }
            submitted += 1;
        }
        drop(tx);
    });

    Ok(submitted)
}
