/*!
 * Watcher
 *
 * The single background thread behind an executor. It keeps the working set
 * of outstanding requests, sleeps until the closest deadline or the next
 * arrival, and interrupts whatever has expired.
 */

use super::pending::{Drained, PendingSet};
use super::request::Request;
use super::stats::ExecutorStats;
use crate::core::errors::ExecutorError;
use crate::core::limits::WATCHER_INITIAL_CAPACITY;
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Instant;
use tracing::{debug, trace};

/// Spawn the watcher thread for `pending`
pub(crate) fn spawn(
    pending: Arc<PendingSet>,
    stats: Arc<ExecutorStats>,
    name: String,
    stack_size: usize,
) -> Result<JoinHandle<()>, ExecutorError> {
    thread::Builder::new()
        .name(name)
        .stack_size(stack_size)
        .spawn(move || run(&pending, &stats))
        .map_err(ExecutorError::Spawn)
}

fn run(pending: &PendingSet, stats: &ExecutorStats) {
    debug!("Timeout watcher started");
    let mut requests: Vec<Arc<Request>> = Vec::with_capacity(WATCHER_INITIAL_CAPACITY);

    loop {
        // Only block for arrivals when there is nothing to time
        match pending.drain(requests.is_empty()) {
            Drained::Closed => break,
            Drained::Arrivals(arrivals) => {
                requests.extend(arrivals.into_iter().filter(|r| !r.is_done()));
            }
        }

        let closest = match requests.iter().map(|r| r.deadline()).min() {
            Some(deadline) => deadline,
            None => continue,
        };

        let now = pending.wait_for_deadline_or_arrival(closest);
        stats.record_wakeup();

        let delivered = interrupt_expired(&requests, now);
        if delivered > 0 {
            stats.record_interrupts(delivered);
            trace!(delivered, "Interrupted expired requests");
        }

        requests.retain(|r| !r.is_done());
    }

    if !requests.is_empty() {
        stats.record_abandoned(requests.len());
    }
    debug!(outstanding = requests.len(), "Timeout watcher stopped");
}

/// Interrupt every request expired at `now`, one batch per owning thread
fn interrupt_expired(requests: &[Arc<Request>], now: Instant) -> usize {
    let mut batches: Vec<Vec<&Request>> = Vec::new();
    for request in requests.iter().filter(|r| r.expired(now)) {
        let request: &Request = request;
        match batches
            .iter_mut()
            .find(|batch| Arc::ptr_eq(batch[0].owner(), request.owner()))
        {
            Some(batch) => batch.push(request),
            None => batches.push(vec![request]),
        }
    }

    batches.iter().map(|batch| Request::interrupt_all(batch)).sum()
}
