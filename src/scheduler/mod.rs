/*!
 * Scheduler Module
 * Alternate deadline strategies selected at call time
 *
 * - DeadlineScheduler: per-thread pluggable strategy for synchronous guards
 * - Async guards: futures bounded by tokio's native timer
 */

mod async_guard;
pub mod traits;

pub use async_guard::timeout_async;
pub use traits::{DeadlineScheduler, Elapsed};

use std::cell::RefCell;
use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

thread_local! {
    static CURRENT: RefCell<Option<Arc<dyn DeadlineScheduler>>> = const { RefCell::new(None) };
}

/// Scheduler installed for the calling thread, if any
pub fn current() -> Option<Arc<dyn DeadlineScheduler>> {
    CURRENT.with(|current| current.borrow().clone())
}

/// Install `scheduler` for the calling thread
///
/// The previous scheduler (or none) is restored when the returned handle is
/// dropped.
pub fn install(scheduler: Arc<dyn DeadlineScheduler>) -> SchedulerHandle {
    let previous = CURRENT.with(|current| current.borrow_mut().replace(scheduler));
    SchedulerHandle {
        previous,
        _not_send: PhantomData,
    }
}

/// Restores the previously installed scheduler on drop
#[must_use = "the scheduler is uninstalled when this handle is dropped"]
pub struct SchedulerHandle {
    previous: Option<Arc<dyn DeadlineScheduler>>,
    // restores a thread-local, so it must stay on the installing thread
    _not_send: PhantomData<*const ()>,
}

impl fmt::Debug for SchedulerHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SchedulerHandle")
            .field("has_previous", &self.previous.is_some())
            .finish()
    }
}

impl Drop for SchedulerHandle {
    fn drop(&mut self) {
        let previous = self.previous.take();
        CURRENT.with(|current| *current.borrow_mut() = previous);
    }
}
