/*!
 * Timeout Builder
 *
 * Type-state builder for guarded calls. The signal kind is encoded in the
 * type so each mode resolves its own way:
 *
 * - `Timeout<DefaultSignal>`: expiry resolves to [`Error::Expired`], whatever
 *   the work did with the interrupt
 * - `Timeout<Raising<E>>`: expiry is an ordinary `E` the work may catch
 */

use crate::core::clock::MonotonicClock;
use crate::core::errors::{Error, ExecutorError, Expired};
use crate::core::id::GuardId;
use crate::core::limits::DEFAULT_TIMEOUT_MESSAGE;
use crate::executor::{self, Executor, Outcome, Registration};
use crate::monitoring::span_guarded;
use crate::scheduler::{self, DeadlineScheduler};
use crate::signals::{Interrupt, Owner, Scope, SignalKind};
use std::any::type_name;
use std::marker::PhantomData;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::debug;

/// Default signal kind marker
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultSignal;

/// Custom signal kind marker: expiry is raised as `E::from(Interrupt)`
#[derive(Debug)]
pub struct Raising<E> {
    _kind: PhantomData<fn() -> E>,
}

impl<E> Clone for Raising<E> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<E> Copy for Raising<E> {}

/// Guarded call under construction
///
/// # Example
///
/// ```
/// use std::time::Duration;
/// use timeout_guard::{Interrupt, Timeout};
///
/// #[derive(Debug)]
/// struct TooSlow(String);
///
/// impl From<Interrupt> for TooSlow {
///     fn from(i: Interrupt) -> Self {
///         TooSlow(i.message().to_string())
///     }
/// }
///
/// let result = Timeout::new(Some(Duration::from_millis(10)))
///     .message("lookup took too long")
///     .raising::<TooSlow>()
///     .run(|scope| {
///         scope.sleep(Duration::from_secs(5))?;
///         Ok(())
///     });
///
/// let err = result.unwrap_err().into_work().unwrap();
/// assert_eq!(err.0, "lookup took too long");
/// ```
#[derive(Debug, Clone)]
#[must_use = "a timeout does nothing until `run` is called"]
pub struct Timeout<'a, K = DefaultSignal> {
    pub(crate) duration: Option<Duration>,
    pub(crate) message: Option<Arc<str>>,
    pub(crate) executor: Option<&'a Executor>,
    pub(crate) kind: K,
}

impl<'a> Timeout<'a, DefaultSignal> {
    /// Guard for `duration`; `None` or zero runs the work unguarded
    pub fn new(duration: Option<Duration>) -> Self {
        Self {
            duration,
            message: None,
            executor: None,
            kind: DefaultSignal,
        }
    }

    /// Raise expiry as the caller's own error type instead
    pub fn raising<E>(self) -> Timeout<'a, Raising<E>>
    where
        E: From<Interrupt>,
    {
        Timeout {
            duration: self.duration,
            message: self.message,
            executor: self.executor,
            kind: Raising { _kind: PhantomData },
        }
    }

    /// Run `work` under the deadline
    pub fn run<T, E, F>(self, work: F) -> Result<T, Error<E>>
    where
        F: FnOnce(&Scope) -> Result<T, E>,
    {
        let Some(duration) = self.active_duration() else {
            return work(&Scope::unbounded()).map_err(Error::Work);
        };

        if let Some(scheduler) = scheduler::current() {
            let message = self.delegated_message();
            let delegated = delegate(scheduler.as_ref(), duration, work);
            return match delegated.result {
                Some(result) if !delegated.elapsed => result.map_err(Error::Work),
                _ => Err(Error::Expired(Expired::new(
                    delegated.id,
                    message,
                    delegated.started.elapsed(),
                ))),
            };
        }

        let Some(mut registration) = self.register(duration, SignalKind::Default)? else {
            return work(&Scope::unbounded()).map_err(Error::Work);
        };
        let _span = span_guarded(registration.id(), duration).entered();
        let result = {
            let scope = registration.scope();
            work(&scope)
        };

        match registration.finish() {
            (Outcome::Interrupted, _) => {
                let expired = registration.expired();
                debug!(
                    guard_id = expired.origin().as_u64(),
                    elapsed_ms = expired.elapsed().as_millis() as u64,
                    "Guarded call expired"
                );
                Err(Error::Expired(expired))
            }
            (Outcome::FinishedNaturally, _) => result.map_err(Error::Work),
        }
    }
}

impl<'a, E> Timeout<'a, Raising<E>>
where
    E: From<Interrupt>,
{
    /// Run `work` under the deadline
    ///
    /// If the work swallows the interrupt the call succeeds. If it never
    /// observed the interrupt, the signal is raised on exit unless the work
    /// failed on its own.
    pub fn run<T, F>(self, work: F) -> Result<T, Error<E>>
    where
        F: FnOnce(&Scope) -> Result<T, E>,
    {
        let Some(duration) = self.active_duration() else {
            return work(&Scope::unbounded()).map_err(Error::Work);
        };

        if let Some(scheduler) = scheduler::current() {
            let message = self.delegated_message();
            let delegated = delegate(scheduler.as_ref(), duration, work);
            return match delegated.result {
                Some(result) if !delegated.elapsed => result.map_err(Error::Work),
                _ => Err(Error::Work(E::from(Interrupt::new(
                    delegated.id,
                    SignalKind::Custom(type_name::<E>()),
                    message,
                )))),
            };
        }

        let Some(mut registration) =
            self.register(duration, SignalKind::Custom(type_name::<E>()))?
        else {
            return work(&Scope::unbounded()).map_err(Error::Work);
        };
        let _span = span_guarded(registration.id(), duration).entered();
        let result = {
            let scope = registration.scope();
            work(&scope)
        };

        match (registration.finish(), result) {
            ((Outcome::Interrupted, Some(unobserved)), Ok(_)) => {
                debug!(
                    guard_id = unobserved.origin().as_u64(),
                    "Raising unobserved timeout signal"
                );
                Err(Error::Work(E::from(unobserved)))
            }
            (_, result) => result.map_err(Error::Work),
        }
    }
}

impl<'a, K> Timeout<'a, K> {
    /// Message carried by the timeout signal (default "execution expired")
    pub fn message(mut self, message: impl Into<Arc<str>>) -> Self {
        self.message = Some(message.into());
        self
    }

    /// Track the deadline on `executor` instead of the process-wide one
    pub fn on(mut self, executor: &'a Executor) -> Self {
        self.executor = Some(executor);
        self
    }

    pub(crate) fn active_duration(&self) -> Option<Duration> {
        self.duration.filter(|d| !d.is_zero())
    }

    pub(crate) fn delegated_message(&self) -> Arc<str> {
        self.message
            .clone()
            .unwrap_or_else(|| Arc::from(DEFAULT_TIMEOUT_MESSAGE))
    }

    fn register(
        &self,
        duration: Duration,
        kind: SignalKind,
    ) -> Result<Option<Registration>, ExecutorError> {
        match self.executor {
            Some(executor) => executor.register(duration, kind, self.message.clone()),
            None => executor::register_global(duration, kind, self.message.clone()),
        }
    }
}

/// Work handed to a scheduler, and what became of it
struct Delegated<T, E> {
    id: GuardId,
    started: Instant,
    result: Option<Result<T, E>>,
    elapsed: bool,
}

fn delegate<T, E, F>(scheduler: &dyn DeadlineScheduler, duration: Duration, work: F) -> Delegated<T, E>
where
    F: FnOnce(&Scope) -> Result<T, E>,
{
    let id = GuardId::next();
    let started = Instant::now();
    let deadline = started.checked_add(duration);
    let mut work = Some(work);
    let mut result = None;

    let status = scheduler.timeout_after(duration, &mut || {
        if let Some(work) = work.take() {
            let scope = Scope::bounded(
                id,
                duration,
                deadline,
                Owner::current(),
                Arc::new(MonotonicClock),
            );
            result = Some(work(&scope));
        }
    });

    debug!(
        guard_id = id.as_u64(),
        elapsed = status.is_err(),
        "Guarded call delegated to scheduler"
    );

    Delegated {
        id,
        started,
        result,
        elapsed: status.is_err(),
    }
}
