/*!
 * Interrupt Mailbox
 *
 * Each thread that runs guarded work owns one mailbox. The watcher pushes
 * interrupts into it and unparks the thread; the work drains it at its own
 * checkpoints.
 *
 * Delivery rules:
 * - The interrupt of the innermost guard (largest id) is surfaced first
 * - Default-kind interrupts stay pending until their guard exits, so catching
 *   one does not make it go away
 * - Custom-kind interrupts are removed when surfaced, like ordinary errors
 *
 * The mailbox also records the deadlines of the guards active on its thread,
 * so a nested guard never outlives the guard around it.
 */

use super::interrupt::Interrupt;
use crate::core::id::GuardId;
use parking_lot::Mutex;
use std::sync::Arc;
use std::thread::{self, Thread};
use std::time::Instant;

/// Execution context a request belongs to
#[derive(Debug)]
pub(crate) struct Owner {
    thread: Thread,
    pending: Mutex<Vec<Interrupt>>,
    active: Mutex<Vec<(GuardId, Instant)>>,
}

thread_local! {
    static CURRENT: Arc<Owner> = Arc::new(Owner::new(thread::current()));
}

impl Owner {
    fn new(thread: Thread) -> Self {
        Self {
            thread,
            pending: Mutex::new(Vec::new()),
            active: Mutex::new(Vec::new()),
        }
    }

    /// Mailbox of the calling thread
    pub fn current() -> Arc<Owner> {
        CURRENT.with(Arc::clone)
    }

    /// Queue interrupts and wake the owning thread if it is parked
    pub fn deliver_all(&self, interrupts: impl IntoIterator<Item = Interrupt>) {
        self.pending.lock().extend(interrupts);
        self.thread.unpark();
    }

    /// Surface the next interrupt the work should see
    pub fn poll(&self) -> Option<Interrupt> {
        let mut pending = self.pending.lock();
        let index = pending
            .iter()
            .enumerate()
            .max_by_key(|(_, i)| i.origin())
            .map(|(index, _)| index)?;

        if pending[index].kind().is_default() {
            Some(pending[index].clone())
        } else {
            Some(pending.swap_remove(index))
        }
    }

    pub fn has_pending(&self) -> bool {
        !self.pending.lock().is_empty()
    }

    /// Earliest deadline among the guards active on this thread
    pub fn enclosing_deadline(&self) -> Option<Instant> {
        self.active.lock().iter().map(|(_, deadline)| *deadline).min()
    }

    pub fn enter(&self, id: GuardId, deadline: Instant) {
        self.active.lock().push((id, deadline));
    }

    pub fn exit(&self, id: GuardId) {
        self.active.lock().retain(|(active, _)| *active != id);
    }

    /// Remove the interrupt raised by `id`, returning it if the work never took it
    pub fn take(&self, id: GuardId) -> Option<Interrupt> {
        let mut pending = self.pending.lock();
        let index = pending.iter().position(|i| i.is_from(id))?;
        Some(pending.swap_remove(index))
    }
}
