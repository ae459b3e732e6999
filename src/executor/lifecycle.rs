/*!
 * Executor Lifecycle
 *
 * The process-wide executor is created on the first guarded call, under a
 * double-checked lock so concurrent first callers share one instance. A dead
 * or shut-down executor is replaced on the next call.
 *
 * Shutdown is explicit: call [`shutdown`], or hold the [`ShutdownGuard`]
 * returned by [`install`] for the life of `main`.
 */

use super::config::ExecutorConfig;
use super::{Executor, Registration};
use crate::core::errors::ExecutorError;
use crate::signals::SignalKind;
use parking_lot::RwLock;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

static EXECUTOR: RwLock<Option<Arc<Executor>>> = parking_lot::const_rwlock(None);

/// Process-wide executor, creating it if needed
pub fn ensure_executor() -> Result<Arc<Executor>, ExecutorError> {
    if let Some(executor) = EXECUTOR.read().as_ref().filter(|e| e.is_alive()) {
        return Ok(Arc::clone(executor));
    }

    let mut slot = EXECUTOR.write();
    if let Some(executor) = slot.as_ref().filter(|e| e.is_alive()) {
        return Ok(Arc::clone(executor));
    }

    let executor = Arc::new(Executor::spawn(ExecutorConfig::from_env())?);
    if slot.replace(Arc::clone(&executor)).is_some() {
        info!("Replaced dead timeout executor");
    }
    Ok(executor)
}

/// Register a deadline on the process-wide executor
///
/// A shutdown racing the call closes the executor between lookup and submit;
/// the submit is retried once on the replacement.
pub(crate) fn register(
    duration: Duration,
    kind: SignalKind,
    message: Option<Arc<str>>,
) -> Result<Option<Registration>, ExecutorError> {
    match ensure_executor()?.register(duration, kind, message.clone()) {
        Err(ExecutorError::Closed) => ensure_executor()?.register(duration, kind, message),
        other => other,
    }
}

/// Shut down the process-wide executor and join its watcher
///
/// Safe to call more than once. A later guarded call starts a fresh executor.
pub fn shutdown() {
    let executor = EXECUTOR.write().take();
    if let Some(executor) = executor {
        executor.shutdown();
    }
}

/// Registered shutdown action for the process-wide executor
///
/// ```
/// fn main() {
///     let _timeouts = timeout_guard::install();
///     // guarded work ...
/// } // watcher joined here
/// ```
#[derive(Debug)]
#[must_use = "the executor is shut down when this guard is dropped"]
pub struct ShutdownGuard {
    _private: (),
}

/// Register the process-wide shutdown action
pub fn install() -> ShutdownGuard {
    ShutdownGuard { _private: () }
}

impl Drop for ShutdownGuard {
    fn drop(&mut self) {
        shutdown();
    }
}
