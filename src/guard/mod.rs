/*!
 * Timeout Guards
 *
 * Public entry point: run a unit of work under a wall-clock deadline.
 *
 * ## Modes
 *
 * - **Pass-through**: `None` or zero duration calls the work directly, with no
 *   tracking at all
 * - **Default signal**: expiry resolves to [`Error::Expired`] carrying this
 *   call's id; the work cannot swallow it
 * - **Custom signal**: expiry is raised as the work's own error type and can
 *   be caught like any other error
 *
 * ## Guarantees
 *
 * - The request is marked done on every exit path, unwinding included
 * - No interrupt is delivered before the deadline, and none after the work
 *   finished
 * - Cleanup in the work is never re-interrupted or time-boxed
 *
 * Interruption is cooperative: work observes it at [`Scope`] checkpoints and
 * `park`-based waits. Work that never yields runs to completion; its guard
 * then reports the expiry.
 */

mod timeout;

pub use timeout::{DefaultSignal, Raising, Timeout};

use crate::core::errors::Error;
use crate::signals::Scope;
use std::time::Duration;

/// Run `work` with a default-signal deadline of `duration`
///
/// # Example
///
/// ```
/// use std::time::Duration;
/// use timeout_guard::timeout;
///
/// let answer = timeout(Some(Duration::from_secs(1)), |_| Ok::<_, std::io::Error>(42));
/// assert_eq!(answer.unwrap(), 42);
/// ```
pub fn timeout<T, E, F>(duration: Option<Duration>, work: F) -> Result<T, Error<E>>
where
    F: FnOnce(&Scope) -> Result<T, E>,
{
    Timeout::new(duration).run(work)
}
