/*!
 * Timeout Guard
 *
 * Bound the wall-clock time of a unit of work. One shared watcher thread per
 * process tracks every outstanding deadline and interrupts the owning thread
 * when one expires; interruption is observed at [`Scope`] checkpoints.
 *
 * ```
 * use std::time::Duration;
 * use timeout_guard::timeout;
 *
 * let result = timeout(Some(Duration::from_millis(20)), |scope| {
 *     scope.sleep(Duration::from_secs(5))?;
 *     Ok::<_, timeout_guard::Interrupt>(())
 * });
 * assert!(result.unwrap_err().is_timeout());
 * ```
 *
 * # Shutdown
 *
 * Joining the watcher at process exit is opt-in. Nothing shuts the shared
 * executor down on its own: hold the [`ShutdownGuard`] returned by
 * [`install`] in `main`, or call [`shutdown`] yourself. Without either, the
 * watcher thread is never joined and simply ends with the process.
 *
 * ```
 * fn main() {
 *     let _timeouts = timeout_guard::install();
 *     let value = timeout_guard::timeout(Some(std::time::Duration::from_secs(1)), |_| {
 *         Ok::<_, timeout_guard::Interrupt>(1)
 *     });
 *     assert_eq!(value.unwrap(), 1);
 * } // `_timeouts` dropped: watcher joined
 * ```
 */

pub mod core;
pub mod executor;
pub mod guard;
pub mod monitoring;
pub mod scheduler;
pub mod signals;

// Re-exports
pub use crate::core::{Error, ExecutorError, Expired, GuardId, GuardResult};
pub use executor::{
    ensure_executor, install, shutdown, Executor, ExecutorConfig, Outcome, ShutdownGuard,
    StatsSnapshot,
};
pub use guard::{timeout, DefaultSignal, Raising, Timeout};
pub use monitoring::init_tracing;
pub use scheduler::{timeout_async, DeadlineScheduler, Elapsed};
pub use signals::{Interrupt, Scope, SignalKind};
