/*!
 * Guard Scope
 *
 * Handle passed to guarded work. It exposes the remaining time budget and the
 * cooperative cancellation points at which interrupts are observed.
 *
 * Work that never reaches a checkpoint and never parks cannot be interrupted.
 * Its guard still reports the expiry once the work returns.
 */

use super::interrupt::Interrupt;
use super::owner::Owner;
use crate::core::clock::{Clock, MonotonicClock};
use crate::core::id::GuardId;
use crate::core::limits::MAX_PARK_SLICE;
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

/// Budget and cancellation handle of one guarded call
///
/// # Example
///
/// ```
/// use std::time::Duration;
/// use timeout_guard::{timeout, Interrupt};
///
/// let result = timeout(Some(Duration::from_millis(20)), |scope| {
///     scope.sleep(Duration::from_secs(5))?;
///     Ok::<_, Interrupt>("finished")
/// });
/// assert!(result.unwrap_err().is_timeout());
/// ```
#[derive(Debug)]
pub struct Scope {
    id: Option<GuardId>,
    duration: Option<Duration>,
    deadline: Option<Instant>,
    owner: Arc<Owner>,
    clock: Arc<dyn Clock>,
}

impl Scope {
    pub(crate) fn bounded(
        id: GuardId,
        duration: Duration,
        deadline: Option<Instant>,
        owner: Arc<Owner>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            id: Some(id),
            duration: Some(duration),
            deadline,
            owner,
            clock,
        }
    }

    /// Scope without a deadline of its own
    ///
    /// Interrupts of guards enclosing the current thread are still observed.
    pub fn unbounded() -> Self {
        Self {
            id: None,
            duration: None,
            deadline: None,
            owner: Owner::current(),
            clock: Arc::new(MonotonicClock),
        }
    }

    /// Id of the guard this scope belongs to (`None` in pass-through mode)
    #[inline]
    pub fn id(&self) -> Option<GuardId> {
        self.id
    }

    /// Duration the guard was started with
    #[inline]
    pub fn duration(&self) -> Option<Duration> {
        self.duration
    }

    #[inline]
    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Time left before the deadline, zero once it has passed
    pub fn remaining(&self) -> Option<Duration> {
        self.deadline
            .map(|d| d.saturating_duration_since(self.clock.now()))
    }

    /// Whether an interrupt is waiting to be observed on this thread
    #[inline]
    pub fn is_interrupted(&self) -> bool {
        self.owner.has_pending()
    }

    /// Cancellation point
    ///
    /// Returns the pending interrupt of the innermost expired guard on this
    /// thread. Default-kind interrupts are returned again by every later
    /// checkpoint until their guard exits.
    #[inline]
    pub fn checkpoint(&self) -> Result<(), Interrupt> {
        match self.owner.poll() {
            Some(interrupt) => Err(interrupt),
            None => Ok(()),
        }
    }

    /// Sleep for `duration`, waking early when interrupted
    ///
    /// A duration too large to add to the clock parks until interrupted.
    pub fn sleep(&self, duration: Duration) -> Result<(), Interrupt> {
        match self.clock.now().checked_add(duration) {
            Some(until) => self.park_until(until),
            None => loop {
                self.checkpoint()?;
                thread::park_timeout(MAX_PARK_SLICE);
            },
        }
    }

    /// Park until `until`, waking early when interrupted
    ///
    /// Also returns when the thread is unparked by anything else and the
    /// instant has passed. Spurious unparks are absorbed.
    pub fn park_until(&self, until: Instant) -> Result<(), Interrupt> {
        loop {
            self.checkpoint()?;

            let now = self.clock.now();
            if now >= until {
                return Ok(());
            }

            thread::park_timeout((until - now).min(MAX_PARK_SLICE));
        }
    }
}
