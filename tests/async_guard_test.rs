/*!
 * Async Guard Tests
 */

use std::time::Duration;
use timeout_guard::{timeout_async, Interrupt, Timeout};

#[derive(Debug, PartialEq)]
enum FetchError {
    TimedOut(String),
}

impl From<Interrupt> for FetchError {
    fn from(i: Interrupt) -> Self {
        FetchError::TimedOut(i.message().to_string())
    }
}

#[tokio::test]
async fn test_concurrent_futures_expire_independently() {
    let fast = timeout_async(Some(Duration::from_secs(1)), async {
        tokio::time::sleep(Duration::from_millis(10)).await;
        Ok::<_, std::io::Error>("fast")
    });
    let slow = timeout_async(Some(Duration::from_millis(20)), async {
        tokio::time::sleep(Duration::from_secs(5)).await;
        Ok::<_, std::io::Error>("slow")
    });

    let (fast, slow) = tokio::join!(fast, slow);
    assert_eq!(fast.unwrap(), "fast");
    assert!(slow.unwrap_err().is_timeout());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_custom_kind_on_multi_thread_runtime() {
    let result = Timeout::new(Some(Duration::from_millis(10)))
        .message("fetch too slow")
        .raising::<FetchError>()
        .run_async(async {
            tokio::time::sleep(Duration::from_secs(5)).await;
            Ok(())
        })
        .await;

    assert_eq!(
        result.unwrap_err().into_work(),
        Some(FetchError::TimedOut("fetch too slow".to_string()))
    );
}

#[test]
fn test_block_on_helper() {
    let value = tokio_test::block_on(timeout_async(None, async { Ok::<_, std::io::Error>(5) }));
    assert_eq!(value.unwrap(), 5);
}
