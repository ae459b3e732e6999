/*!
 * Executor Statistics
 * Lock-free counters updated on the hot path, read as a snapshot
 */

use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};

/// Live counters shared by an executor and its watcher
#[derive(Debug, Default)]
pub(crate) struct ExecutorStats {
    submitted: AtomicU64,
    interrupted: AtomicU64,
    finished: AtomicU64,
    wakeups: AtomicU64,
    abandoned: AtomicU64,
}

impl ExecutorStats {
    #[inline(always)]
    pub fn record_submit(&self) {
        self.submitted.fetch_add(1, Ordering::Relaxed);
    }

    #[inline(always)]
    pub fn record_interrupts(&self, count: usize) {
        self.interrupted.fetch_add(count as u64, Ordering::Relaxed);
    }

    #[inline(always)]
    pub fn record_finish(&self) {
        self.finished.fetch_add(1, Ordering::Relaxed);
    }

    #[inline(always)]
    pub fn record_wakeup(&self) {
        self.wakeups.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_abandoned(&self, count: usize) {
        self.abandoned.fetch_add(count as u64, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            submitted: self.submitted.load(Ordering::Relaxed),
            interrupted: self.interrupted.load(Ordering::Relaxed),
            finished_naturally: self.finished.load(Ordering::Relaxed),
            watcher_wakeups: self.wakeups.load(Ordering::Relaxed),
            abandoned: self.abandoned.load(Ordering::Relaxed),
        }
    }
}

/// Point-in-time view of executor activity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct StatsSnapshot {
    /// Requests handed to the watcher
    pub submitted: u64,
    /// Requests the watcher delivered a signal to
    pub interrupted: u64,
    /// Requests whose work finished first
    pub finished_naturally: u64,
    /// Times the watcher woke from its deadline wait
    pub watcher_wakeups: u64,
    /// Requests still outstanding when the watcher shut down
    pub abandoned: u64,
}

impl StatsSnapshot {
    /// Requests submitted but not yet resolved
    pub fn outstanding(&self) -> u64 {
        self.submitted
            .saturating_sub(self.interrupted + self.finished_naturally + self.abandoned)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_snapshot_counts() {
        let stats = ExecutorStats::default();
        stats.record_submit();
        stats.record_submit();
        stats.record_submit();
        stats.record_interrupts(1);
        stats.record_finish();

        let snap = stats.snapshot();
        assert_eq!(snap.submitted, 3);
        assert_eq!(snap.interrupted, 1);
        assert_eq!(snap.finished_naturally, 1);
        assert_eq!(snap.outstanding(), 1);
    }
}
