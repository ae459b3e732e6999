/*!
 * Timeout Request
 *
 * Per-call record tracked by the watcher. The finish/interrupt race is
 * settled by a single lock per request: exactly one of them moves the state
 * out of `Pending`.
 */

use crate::core::id::GuardId;
use crate::signals::{Owner, Signal};
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Instant;

/// Request state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Pending,
    Interrupted,
    Finished,
}

/// How a request ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// The watcher delivered the signal
    Interrupted,
    /// The work was done before the watcher got to it
    FinishedNaturally,
}

#[derive(Debug)]
pub(crate) struct Request {
    id: GuardId,
    owner: Arc<Owner>,
    deadline: Instant,
    signal: Signal,
    state: Mutex<State>,
}

impl Request {
    pub fn new(id: GuardId, owner: Arc<Owner>, deadline: Instant, signal: Signal) -> Self {
        Self {
            id,
            owner,
            deadline,
            signal,
            state: Mutex::new(State::Pending),
        }
    }

    #[inline]
    pub fn id(&self) -> GuardId {
        self.id
    }

    #[inline]
    pub fn deadline(&self) -> Instant {
        self.deadline
    }

    #[inline]
    pub fn expired(&self, now: Instant) -> bool {
        now >= self.deadline
    }

    pub fn is_done(&self) -> bool {
        *self.state.lock() != State::Pending
    }

    /// Deliver the signal unless the request is already done
    ///
    /// Returns `true` if this call delivered it.
    pub fn interrupt(&self) -> bool {
        Self::interrupt_all(&[self]) == 1
    }

    /// Deliver the signals of every still-pending request in `batch`
    ///
    /// All requests must share one owner. Their state locks are held until
    /// the owner's mailbox holds every interrupt of the batch, so a guard on
    /// that thread finishing in between still sees itself interrupted.
    /// Returns how many were delivered.
    pub fn interrupt_all(batch: &[&Request]) -> usize {
        let Some(first) = batch.first() else {
            return 0;
        };
        debug_assert!(batch.iter().all(|r| Arc::ptr_eq(&r.owner, &first.owner)));

        let mut pending: Vec<_> = batch
            .iter()
            .map(|r| (*r, r.state.lock()))
            .filter(|(_, state)| **state == State::Pending)
            .collect();
        if pending.is_empty() {
            return 0;
        }

        first
            .owner
            .deliver_all(pending.iter().map(|(r, _)| r.signal.raise(r.id)));
        for (_, state) in pending.iter_mut() {
            **state = State::Interrupted;
        }
        pending.len()
    }

    #[inline]
    pub fn owner(&self) -> &Arc<Owner> {
        &self.owner
    }

    /// Mark the request done and report which side won
    pub fn finish(&self) -> Outcome {
        let mut state = self.state.lock();
        match *state {
            State::Pending => {
                *state = State::Finished;
                Outcome::FinishedNaturally
            }
            State::Finished => Outcome::FinishedNaturally,
            State::Interrupted => Outcome::Interrupted,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::signals::SignalKind;
    use std::time::Duration;

    fn request(deadline: Instant) -> (Request, Arc<Owner>) {
        let owner = Owner::current();
        let signal = Signal::new(SignalKind::Default, Arc::from("execution expired"));
        (
            Request::new(GuardId::next(), Arc::clone(&owner), deadline, signal),
            owner,
        )
    }

    #[test]
    fn test_expired_predicate() {
        let now = Instant::now();
        let (req, _) = request(now + Duration::from_millis(10));
        assert!(!req.expired(now));
        assert!(req.expired(now + Duration::from_millis(10)));
        assert!(req.expired(now + Duration::from_secs(1)));
    }

    #[test]
    fn test_interrupt_after_finish_is_noop() {
        let (req, owner) = request(Instant::now());
        assert_eq!(req.finish(), Outcome::FinishedNaturally);
        assert!(req.is_done());
        assert!(!req.interrupt());
        assert!(owner.take(req.id()).is_none());
    }

    #[test]
    fn test_interrupt_wins_once() {
        let (req, owner) = request(Instant::now());
        assert!(req.interrupt());
        assert!(!req.interrupt());
        assert_eq!(req.finish(), Outcome::Interrupted);

        let delivered = owner.take(req.id());
        assert_eq!(delivered.map(|i| i.origin()), Some(req.id()));
        assert!(owner.take(req.id()).is_none());
    }

    #[test]
    fn test_batch_skips_finished() {
        let owner = Owner::current();
        let signal = || Signal::new(SignalKind::Default, Arc::from("execution expired"));
        let now = Instant::now();
        let a = Request::new(GuardId::next(), Arc::clone(&owner), now, signal());
        let b = Request::new(GuardId::next(), Arc::clone(&owner), now, signal());
        b.finish();

        assert_eq!(Request::interrupt_all(&[&a, &b]), 1);
        assert_eq!(a.finish(), Outcome::Interrupted);
        assert_eq!(b.finish(), Outcome::FinishedNaturally);
        assert!(owner.take(a.id()).is_some());
        assert!(owner.take(b.id()).is_none());
    }
}
