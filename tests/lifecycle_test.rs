/*!
 * Error Lifecycle Tests
 *
 * How an expiry travels through work that does or does not catch it, for
 * both signal kinds, and how cleanup and the caller see it.
 */

use serial_test::serial;
use std::cell::Cell;
use std::time::{Duration, Instant};
use timeout_guard::{timeout, Interrupt, Timeout};

#[derive(Debug)]
enum Failure {
    Slow(Interrupt),
}

impl From<Interrupt> for Failure {
    fn from(i: Interrupt) -> Self {
        Failure::Slow(i)
    }
}

#[derive(Debug, Clone, Copy)]
enum Kind {
    Default,
    Custom,
}

/// What ran, and what the caller saw
#[derive(Debug, Default)]
struct Lifecycle {
    inner_attempted: Cell<bool>,
    inner_rescue: Cell<bool>,
    inner_else: Cell<bool>,
    inner_ensure: Cell<bool>,
    inner_ensure_finished: Cell<bool>,
    outer_rescue: bool,
    outer_else: bool,
}

struct Ensure<'a>(&'a Lifecycle);

impl Drop for Ensure<'_> {
    fn drop(&mut self) {
        self.0.inner_ensure.set(true);
        let until = Instant::now() + Duration::from_millis(100);
        while Instant::now() < until {}
        self.0.inner_ensure_finished.set(true);
    }
}

fn busy(scope: &timeout_guard::Scope) -> Result<(), Interrupt> {
    loop {
        scope.checkpoint()?;
    }
}

/// Spin under a 1ms deadline; `rescue` decides whether the work catches
fn subject(kind: Kind, rescue: bool) -> Lifecycle {
    let mut life = Lifecycle::default();
    let deadline = Some(Duration::from_millis(1));

    let failed = match kind {
        Kind::Default => timeout(deadline, |scope| -> Result<(), Interrupt> {
            let _ensure = Ensure(&life);
            life.inner_attempted.set(true);
            match busy(scope) {
                Err(_) if rescue => life.inner_rescue.set(true),
                Err(interrupt) => return Err(interrupt),
                Ok(()) => life.inner_else.set(true),
            }
            Ok(())
        })
        .is_err(),
        Kind::Custom => Timeout::new(deadline)
            .raising::<Failure>()
            .run(|scope| {
                let _ensure = Ensure(&life);
                life.inner_attempted.set(true);
                match busy(scope) {
                    Err(_) if rescue => life.inner_rescue.set(true),
                    Err(interrupt) => return Err(Failure::from(interrupt)),
                    Ok(()) => life.inner_else.set(true),
                }
                Ok(())
            })
            .is_err(),
    };

    life.outer_rescue = failed;
    life.outer_else = !failed;
    assert!(life.outer_rescue ^ life.outer_else);
    life
}

fn assert_ran_to_cleanup(life: &Lifecycle) {
    assert!(life.inner_attempted.get());
    assert!(!life.inner_else.get());
    assert!(life.inner_ensure.get());
    assert!(life.inner_ensure_finished.get());
}

#[test]
#[serial]
fn test_default_signal_uncaught() {
    let life = subject(Kind::Default, false);
    assert_ran_to_cleanup(&life);
    assert!(!life.inner_rescue.get());
    assert!(life.outer_rescue);
}

#[test]
#[serial]
fn test_default_signal_caught_still_reaches_caller() {
    let life = subject(Kind::Default, true);
    assert_ran_to_cleanup(&life);
    assert!(life.inner_rescue.get());
    assert!(life.outer_rescue);
}

#[test]
#[serial]
fn test_custom_signal_uncaught() {
    let life = subject(Kind::Custom, false);
    assert_ran_to_cleanup(&life);
    assert!(!life.inner_rescue.get());
    assert!(life.outer_rescue);
}

#[test]
#[serial]
fn test_custom_signal_caught_is_handled() {
    let life = subject(Kind::Custom, true);
    assert_ran_to_cleanup(&life);
    assert!(life.inner_rescue.get());
    assert!(!life.outer_rescue);
    assert!(life.outer_else);
}

#[test]
#[serial]
fn test_custom_error_carries_interrupt() {
    let err = Timeout::new(Some(Duration::from_millis(5)))
        .message("spun too long")
        .raising::<Failure>()
        .run(|scope| busy(scope).map_err(Failure::from))
        .unwrap_err();

    match err.into_work() {
        Some(Failure::Slow(interrupt)) => {
            assert_eq!(interrupt.message(), "spun too long");
            assert!(!interrupt.kind().is_default());
        }
        None => panic!("expected the custom signal"),
    }
}
