/*!
 * Timeout Executor
 *
 * One watcher thread multiplexing every outstanding deadline:
 * - PendingSet: arrival queue and the condvar the watcher sleeps on
 * - Watcher: drains arrivals, sleeps to the closest deadline, interrupts
 * - Request: per-call record with a single-transition done flag
 * - Lifecycle: the lazily created process-wide executor
 *
 * No per-call timer thread is ever spawned.
 */

mod config;
mod lifecycle;
mod pending;
mod request;
mod stats;
mod watcher;

pub use config::ExecutorConfig;
pub use lifecycle::{ensure_executor, install, shutdown, ShutdownGuard};
pub(crate) use lifecycle::register as register_global;
pub use request::Outcome;
pub use stats::StatsSnapshot;

use crate::core::clock::Clock;
use crate::core::errors::ExecutorError;
use crate::core::id::GuardId;
use crate::core::errors::Expired;
use crate::signals::{Interrupt, Owner, Scope, Signal, SignalKind};
use parking_lot::Mutex;
use pending::PendingSet;
use request::Request;
use stats::ExecutorStats;
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};
use tracing::{debug, trace, warn};

/// Shared timeout-tracking executor
///
/// Usually reached through [`timeout`](crate::timeout) and the process-wide
/// lifecycle, but can be owned directly. Dropping it shuts the watcher down.
///
/// # Example
///
/// ```
/// use std::time::Duration;
/// use timeout_guard::{Executor, ExecutorConfig, Timeout};
///
/// let executor = Executor::spawn(ExecutorConfig::default()).unwrap();
/// let value = Timeout::new(Some(Duration::from_secs(1)))
///     .on(&executor)
///     .run(|_| Ok::<_, std::io::Error>(7))
///     .unwrap();
/// assert_eq!(value, 7);
/// ```
#[derive(Debug)]
pub struct Executor {
    pending: Arc<PendingSet>,
    stats: Arc<ExecutorStats>,
    watcher: Mutex<Option<JoinHandle<()>>>,
    config: ExecutorConfig,
}

impl Executor {
    /// Create an executor and start its watcher thread
    pub fn spawn(config: ExecutorConfig) -> Result<Self, ExecutorError> {
        let pending = Arc::new(PendingSet::new(Arc::clone(&config.clock)));
        let stats = Arc::new(ExecutorStats::default());
        let handle = watcher::spawn(
            Arc::clone(&pending),
            Arc::clone(&stats),
            config.thread_name.clone(),
            config.stack_size,
        )?;

        debug!(thread = %config.thread_name, "Timeout executor created");

        Ok(Self {
            pending,
            stats,
            watcher: Mutex::new(Some(handle)),
            config,
        })
    }

    /// Track a new deadline for the calling thread
    ///
    /// The deadline is capped by any guard already active on the thread.
    /// `message` falls back to the configured default. The returned
    /// registration marks the request done when finished or dropped,
    /// whichever comes first.
    ///
    /// Returns `None` when the deadline is beyond what `Instant` can
    /// represent and no enclosing guard caps it; such a call never expires.
    pub(crate) fn register(
        &self,
        duration: Duration,
        kind: SignalKind,
        message: Option<Arc<str>>,
    ) -> Result<Option<Registration>, ExecutorError> {
        let id = GuardId::next();
        let owner = Owner::current();
        let message = message.unwrap_or_else(|| Arc::clone(&self.config.default_message));
        let now = self.config.clock.now();
        // a nested guard expires no later than the guards around it
        let deadline = match (now.checked_add(duration), owner.enclosing_deadline()) {
            (Some(own), Some(enclosing)) => own.min(enclosing),
            (Some(own), None) => own,
            (None, Some(enclosing)) => enclosing,
            (None, None) => {
                trace!(guard_id = id.as_u64(), "Deadline out of range, running unguarded");
                return Ok(None);
            }
        };

        let signal = Signal::new(kind, Arc::clone(&message));
        let request = Arc::new(Request::new(id, Arc::clone(&owner), deadline, signal));
        self.pending.submit(Arc::clone(&request))?;
        owner.enter(id, deadline);
        self.stats.record_submit();
        trace!(guard_id = id.as_u64(), timeout_ms = duration.as_millis() as u64, "Request submitted");

        Ok(Some(Registration {
            request,
            owner,
            message,
            stats: Arc::clone(&self.stats),
            clock: Arc::clone(&self.config.clock),
            started: now,
            duration,
            finished: false,
        }))
    }

    /// Whether submissions are accepted and the watcher is running
    pub fn is_alive(&self) -> bool {
        if self.pending.is_closed() {
            return false;
        }
        self.watcher
            .lock()
            .as_ref()
            .map(|h| !h.is_finished())
            .unwrap_or(false)
    }

    /// Close the pending set and wait for the watcher to exit. Idempotent.
    pub fn shutdown(&self) {
        self.pending.close();

        let handle = self.watcher.lock().take();
        if let Some(handle) = handle {
            if handle.thread().id() == thread::current().id() {
                return;
            }
            if handle.join().is_err() {
                warn!(thread = %self.config.thread_name, "Timeout watcher panicked");
            }
            debug!(thread = %self.config.thread_name, "Timeout executor shut down");
        }
    }

    /// Current activity counters
    pub fn stats(&self) -> StatsSnapshot {
        self.stats.snapshot()
    }

    pub fn config(&self) -> &ExecutorConfig {
        &self.config
    }
}

impl Drop for Executor {
    fn drop(&mut self) {
        self.shutdown();
    }
}

/// Live request of one guarded call
///
/// Finishing is the guaranteed-cleanup step of a guard: it runs on return,
/// error, and unwind alike.
#[derive(Debug)]
pub(crate) struct Registration {
    request: Arc<Request>,
    owner: Arc<Owner>,
    message: Arc<str>,
    stats: Arc<ExecutorStats>,
    clock: Arc<dyn Clock>,
    started: Instant,
    duration: Duration,
    finished: bool,
}

impl Registration {
    #[inline]
    pub fn id(&self) -> GuardId {
        self.request.id()
    }

    /// Scope handed to the guarded work
    pub fn scope(&self) -> Scope {
        Scope::bounded(
            self.request.id(),
            self.duration,
            Some(self.request.deadline()),
            Arc::clone(&self.owner),
            Arc::clone(&self.clock),
        )
    }

    /// Default timeout signal for this call
    pub fn expired(&self) -> Expired {
        Expired::new(self.id(), Arc::clone(&self.message), self.elapsed())
    }

    /// Time since the guard started
    pub fn elapsed(&self) -> Duration {
        self.clock.now().saturating_duration_since(self.started)
    }

    /// Mark the request done
    ///
    /// Returns the outcome and, when interrupted, the signal if the work never
    /// observed it.
    pub fn finish(&mut self) -> (Outcome, Option<Interrupt>) {
        let outcome = self.request.finish();
        let unobserved = self.owner.take(self.request.id());

        if !self.finished {
            self.finished = true;
            self.owner.exit(self.request.id());
            if outcome == Outcome::FinishedNaturally {
                self.stats.record_finish();
            }
        }

        (outcome, unobserved)
    }
}

impl Drop for Registration {
    fn drop(&mut self) {
        if !self.finished {
            self.finish();
        }
    }
}
