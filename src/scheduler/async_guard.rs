/*!
 * Async Guards
 *
 * Futures are bounded by tokio's own timer rather than the shared watcher:
 * dropping a future at its next await point is the runtime's native
 * cancellation. Expiry is mapped onto the same contract as synchronous
 * guards.
 *
 * Requires a tokio runtime with the time driver enabled.
 */

use crate::core::errors::{Error, Expired};
use crate::core::id::GuardId;
use crate::guard::{DefaultSignal, Raising, Timeout};
use crate::signals::{Interrupt, SignalKind};
use std::any::type_name;
use std::future::Future;
use std::time::Instant;
use tracing::debug;

impl<'a> Timeout<'a, DefaultSignal> {
    /// Await `future` under the deadline
    ///
    /// ```
    /// use std::time::Duration;
    /// use timeout_guard::Timeout;
    /// # let rt = tokio::runtime::Builder::new_current_thread().enable_time().build().unwrap();
    /// # rt.block_on(async {
    /// let result = Timeout::new(Some(Duration::from_millis(10)))
    ///     .run_async(async {
    ///         tokio::time::sleep(Duration::from_secs(5)).await;
    ///         Ok::<_, std::io::Error>(())
    ///     })
    ///     .await;
    /// assert!(result.unwrap_err().is_timeout());
    /// # });
    /// ```
    pub async fn run_async<T, E, Fut>(self, future: Fut) -> Result<T, Error<E>>
    where
        Fut: Future<Output = Result<T, E>>,
    {
        let Some(duration) = self.active_duration() else {
            return future.await.map_err(Error::Work);
        };

        let id = GuardId::next();
        let start = Instant::now();
        match tokio::time::timeout(duration, future).await {
            Ok(result) => result.map_err(Error::Work),
            Err(_) => {
                debug!(guard_id = id.as_u64(), "Async guarded call expired");
                Err(Error::Expired(Expired::new(
                    id,
                    self.delegated_message(),
                    start.elapsed(),
                )))
            }
        }
    }
}

impl<'a, E> Timeout<'a, Raising<E>>
where
    E: From<Interrupt>,
{
    /// Await `future` under the deadline, raising expiry as `E`
    pub async fn run_async<T, Fut>(self, future: Fut) -> Result<T, Error<E>>
    where
        Fut: Future<Output = Result<T, E>>,
    {
        let Some(duration) = self.active_duration() else {
            return future.await.map_err(Error::Work);
        };

        let id = GuardId::next();
        match tokio::time::timeout(duration, future).await {
            Ok(result) => result.map_err(Error::Work),
            Err(_) => {
                debug!(guard_id = id.as_u64(), "Async guarded call expired");
                Err(Error::Work(E::from(Interrupt::new(
                    id,
                    SignalKind::Custom(type_name::<E>()),
                    self.delegated_message(),
                ))))
            }
        }
    }
}

/// Await `future` with a default-signal deadline
///
/// `None` or a zero duration awaits it unguarded.
pub async fn timeout_async<T, E, Fut>(
    duration: Option<std::time::Duration>,
    future: Fut,
) -> Result<T, Error<E>>
where
    Fut: Future<Output = Result<T, E>>,
{
    Timeout::new(duration).run_async(future).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[derive(Debug, PartialEq)]
    struct Slow(String);

    impl From<Interrupt> for Slow {
        fn from(i: Interrupt) -> Self {
            Slow(i.message().to_string())
        }
    }

    #[tokio::test]
    async fn test_async_completes() {
        let result = timeout_async(Some(Duration::from_secs(1)), async { Ok::<_, Slow>(5) }).await;
        assert_eq!(result.unwrap(), 5);
    }

    #[tokio::test]
    async fn test_async_expires() {
        let result = timeout_async(Some(Duration::from_millis(20)), async {
            tokio::time::sleep(Duration::from_secs(5)).await;
            Ok::<_, Slow>(())
        })
        .await;

        let err = result.unwrap_err();
        assert_eq!(err.expired().map(|e| e.message()), Some("execution expired"));
    }

    #[tokio::test]
    async fn test_async_custom_kind() {
        let result = Timeout::new(Some(Duration::from_millis(20)))
            .message("too slow")
            .raising::<Slow>()
            .run_async(async {
                tokio::time::sleep(Duration::from_secs(5)).await;
                Ok(())
            })
            .await;

        assert_eq!(result.unwrap_err().into_work(), Some(Slow("too slow".into())));
    }

    #[tokio::test]
    async fn test_async_pass_through() {
        let result = timeout_async(Some(Duration::ZERO), async {
            tokio::time::sleep(Duration::from_millis(10)).await;
            Ok::<_, Slow>("ok")
        })
        .await;
        assert_eq!(result.unwrap(), "ok");
    }
}
