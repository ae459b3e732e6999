/*!
 * Error Types
 * Centralized error handling with thiserror and miette
 */

use super::id::GuardId;
use miette::Diagnostic;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

/// Result type for guarded calls
pub type GuardResult<T, E> = Result<T, Error<E>>;

/// Errors from the shared executor
#[derive(Error, Debug, Diagnostic)]
pub enum ExecutorError {
    #[error("timeout executor is shut down")]
    #[diagnostic(
        code(executor::closed),
        help("The executor was closed. Use the process-wide guard entry point, which recreates it.")
    )]
    Closed,

    #[error("failed to spawn watcher thread: {0}")]
    #[diagnostic(
        code(executor::spawn_failed),
        help("The OS refused a new thread. Check thread limits and the configured stack size.")
    )]
    Spawn(#[source] std::io::Error),
}

/// Default timeout signal
///
/// Produced when a guard without an explicit signal kind reaches its deadline.
/// It carries the id of the guard that raised it, so a catch site can tell
/// whether the expiry is its own or one passing through from a nested call.
#[derive(Error, Debug, Clone, PartialEq, Eq, Diagnostic)]
#[error("{message}")]
#[diagnostic(
    code(timeout::expired),
    help("The guarded work did not finish before its deadline.")
)]
pub struct Expired {
    origin: GuardId,
    message: Arc<str>,
    elapsed: Duration,
}

impl Expired {
    pub(crate) fn new(origin: GuardId, message: Arc<str>, elapsed: Duration) -> Self {
        Self {
            origin,
            message,
            elapsed,
        }
    }

    /// Guard that raised this signal
    #[inline]
    pub fn origin(&self) -> GuardId {
        self.origin
    }

    /// Signal message
    #[inline]
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Time between the guard starting and giving up
    #[inline]
    pub fn elapsed(&self) -> Duration {
        self.elapsed
    }

    /// Whether this signal belongs to the guard with `id`
    #[inline]
    pub fn is_from(&self, id: GuardId) -> bool {
        self.origin == id
    }
}

/// Outcome of a guarded call that did not return a value
#[derive(Error, Debug)]
pub enum Error<E> {
    /// Deadline reached under the default signal kind
    #[error(transparent)]
    Expired(#[from] Expired),

    /// Error produced by the guarded work (including custom timeout signals)
    #[error("guarded work failed: {0}")]
    Work(#[source] E),

    /// No executor could be provided
    #[error(transparent)]
    Unavailable(#[from] ExecutorError),
}

impl<E> Error<E> {
    /// Check if this is a default timeout signal
    #[inline(always)]
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Expired(_))
    }

    /// Check if this is a work error
    #[inline(always)]
    pub fn is_work_error(&self) -> bool {
        matches!(self, Self::Work(_))
    }

    /// Borrow the timeout signal, if any
    pub fn expired(&self) -> Option<&Expired> {
        match self {
            Self::Expired(e) => Some(e),
            _ => None,
        }
    }

    /// Take the work error, if any
    pub fn into_work(self) -> Option<E> {
        match self {
            Self::Work(e) => Some(e),
            _ => None,
        }
    }

    /// Map the work error, keeping signal and executor errors as they are
    pub fn map_work<F, U>(self, f: F) -> Error<U>
    where
        F: FnOnce(E) -> U,
    {
        match self {
            Self::Expired(e) => Error::Expired(e),
            Self::Work(e) => Error::Work(f(e)),
            Self::Unavailable(e) => Error::Unavailable(e),
        }
    }
}
