/*!
 * Deadline Scheduler Traits
 * Interface for execution contexts with a native deadline primitive
 */

use std::time::Duration;
use thiserror::Error;

/// The scheduler's own deadline fired before the work completed
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("deadline elapsed")]
pub struct Elapsed;

/// Cooperative scheduler able to bound work by a deadline itself
///
/// When one is installed for the current thread, guarded calls are handed to
/// it instead of the shared watcher. The guard maps `Err(Elapsed)` onto its
/// usual contract (signal kind and message).
pub trait DeadlineScheduler: Send + Sync {
    /// Run `work`, cancelling it natively once `duration` has elapsed
    ///
    /// Returns `Ok(())` only if `work` ran to completion in time.
    fn timeout_after(&self, duration: Duration, work: &mut dyn FnMut()) -> Result<(), Elapsed>;
}
