/*!
 * Scheduler Delegation Tests
 *
 * A thread with a scheduler installed hands its guarded calls to it instead
 * of the shared watcher.
 */

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};
use timeout_guard::scheduler::{self, DeadlineScheduler, Elapsed};
use timeout_guard::{timeout, Executor, ExecutorConfig, Interrupt, Timeout};

/// Runs the work in place and reports an overrun afterwards
#[derive(Default)]
struct CountingScheduler {
    calls: AtomicUsize,
}

impl DeadlineScheduler for CountingScheduler {
    fn timeout_after(&self, duration: Duration, work: &mut dyn FnMut()) -> Result<(), Elapsed> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let start = Instant::now();
        work();
        if start.elapsed() >= duration {
            Err(Elapsed)
        } else {
            Ok(())
        }
    }
}

#[test]
fn test_scheduler_receives_guarded_calls() {
    let scheduler = Arc::new(CountingScheduler::default());
    let _handle = scheduler::install(scheduler.clone());

    assert_eq!(timeout(Some(Duration::from_secs(1)), |_| Ok::<_, Interrupt>(7)).unwrap(), 7);

    let late = timeout(Some(Duration::from_millis(5)), |_| {
        thread::sleep(Duration::from_millis(25));
        Ok::<_, Interrupt>(())
    });
    assert!(late.unwrap_err().is_timeout());

    assert_eq!(scheduler.calls.load(Ordering::SeqCst), 2);
}

#[test]
fn test_pass_through_skips_scheduler() {
    let scheduler = Arc::new(CountingScheduler::default());
    let _handle = scheduler::install(scheduler.clone());

    timeout(None, |_| Ok::<_, Interrupt>(())).unwrap();
    timeout(Some(Duration::ZERO), |_| Ok::<_, Interrupt>(())).unwrap();

    assert_eq!(scheduler.calls.load(Ordering::SeqCst), 0);
}

#[test]
fn test_scheduler_is_per_thread() {
    let scheduler = Arc::new(CountingScheduler::default());
    let _handle = scheduler::install(scheduler.clone());
    let executor = Executor::spawn(ExecutorConfig::new().with_thread_name("per-thread-watcher")).unwrap();

    thread::scope(|s| {
        s.spawn(|| {
            assert!(scheduler::current().is_none());
            Timeout::new(Some(Duration::from_secs(1)))
                .on(&executor)
                .run(|_| Ok::<_, Interrupt>(()))
                .unwrap();
        });
    });

    assert_eq!(scheduler.calls.load(Ordering::SeqCst), 0);
    assert_eq!(executor.stats().submitted, 1);
}

#[test]
fn test_handle_restores_previous() {
    assert!(scheduler::current().is_none());
    {
        let _outer = scheduler::install(Arc::new(CountingScheduler::default()));
        let inner = Arc::new(CountingScheduler::default());
        {
            let _inner = scheduler::install(inner.clone());
            timeout(Some(Duration::from_secs(1)), |_| Ok::<_, Interrupt>(())).unwrap();
        }
        assert_eq!(inner.calls.load(Ordering::SeqCst), 1);
        assert!(scheduler::current().is_some());
    }
    assert!(scheduler::current().is_none());
}

#[test]
fn test_max_duration_delegated_without_deadline() {
    let scheduler = Arc::new(CountingScheduler::default());
    let _handle = scheduler::install(scheduler.clone());

    let value = timeout(Some(Duration::MAX), |scope| {
        assert!(scope.deadline().is_none());
        assert!(scope.id().is_some());
        Ok::<_, Interrupt>(11)
    });

    assert_eq!(value.unwrap(), 11);
    assert_eq!(scheduler.calls.load(Ordering::SeqCst), 1);
}
