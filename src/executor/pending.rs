/*!
 * Pending Set
 *
 * Arrival queue between guarded calls and the watcher, plus the condition
 * variable the watcher sleeps on.
 *
 * Every wait re-checks its predicate under the lock before and after
 * parking, and arrivals stay queued until drained, so a submit that races a
 * wait is never lost.
 */

use super::request::Request;
use crate::core::clock::Clock;
use crate::core::errors::ExecutorError;
use parking_lot::{Condvar, Mutex};
use std::sync::Arc;
use std::time::Instant;

#[derive(Debug, Default)]
struct Inner {
    arrivals: Vec<Arc<Request>>,
    closed: bool,
}

/// Result of draining the arrival queue
#[derive(Debug)]
pub(crate) enum Drained {
    /// Newly submitted requests (possibly none when not blocking)
    Arrivals(Vec<Arc<Request>>),
    /// The set is closed and nothing is left to drain
    Closed,
}

#[derive(Debug)]
pub(crate) struct PendingSet {
    inner: Mutex<Inner>,
    arrived: Condvar,
    clock: Arc<dyn Clock>,
}

impl PendingSet {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            inner: Mutex::new(Inner::default()),
            arrived: Condvar::new(),
            clock,
        }
    }

    /// Queue a request and wake the watcher
    pub fn submit(&self, request: Arc<Request>) -> Result<(), ExecutorError> {
        let mut inner = self.inner.lock();
        if inner.closed {
            return Err(ExecutorError::Closed);
        }
        inner.arrivals.push(request);
        self.arrived.notify_one();
        Ok(())
    }

    /// Take every queued arrival
    ///
    /// With `block`, waits until at least one request arrives or the set
    /// closes.
    pub fn drain(&self, block: bool) -> Drained {
        let mut inner = self.inner.lock();
        if block {
            while inner.arrivals.is_empty() && !inner.closed {
                self.arrived.wait(&mut inner);
            }
        }

        if inner.closed && inner.arrivals.is_empty() {
            Drained::Closed
        } else {
            Drained::Arrivals(std::mem::take(&mut inner.arrivals))
        }
    }

    /// Sleep until `deadline`, a new arrival, or close, and return the time
    pub fn wait_for_deadline_or_arrival(&self, deadline: Instant) -> Instant {
        let mut inner = self.inner.lock();
        loop {
            let now = self.clock.now();
            if now >= deadline || !inner.arrivals.is_empty() || inner.closed {
                return now;
            }
            self.arrived.wait_for(&mut inner, deadline - now);
        }
    }

    /// Refuse further submissions and wake the watcher. Idempotent.
    pub fn close(&self) {
        let mut inner = self.inner.lock();
        inner.closed = true;
        self.arrived.notify_all();
    }

    pub fn is_closed(&self) -> bool {
        self.inner.lock().closed
    }
}
