// Bounded polling
//
// `repeat_while` re-runs an async action until its result no longer
// asks for a retry. Failures of the action are never retried.

use std::future::Future;
use std::time::Duration;

use tracing::trace;

use crate::error::Error;

/// Invoke `action` until `should_retry` returns `false` for its result.
///
/// At most `max_attempts` invocations are made, with `interval` slept
/// between consecutive invocations. An action failure is returned
/// immediately. When every attempt still asks for a retry the call fails
/// with [`Error::MaxAttemptsReached`]; `max_attempts == 0` fails without
/// invoking `action` at all. There is no cancellation hook.
pub async fn repeat_while<T, E, F, Fut, P>(
    mut action: F,
    mut should_retry: P,
    max_attempts: u32,
    interval: Duration,
) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    P: FnMut(&T) -> bool,
    E: From<Error>,
{
    for attempt in 1..=max_attempts {
        trace!(attempt, remaining = max_attempts - attempt, "polling");
        let result = action().await?;
        if !should_retry(&result) {
            return Ok(result);
        }
        // No trailing sleep once the last attempt has been spent.
        if attempt < max_attempts {
            tokio::time::sleep(interval).await;
        }
    }

    Err(Error::MaxAttemptsReached {
        attempts: max_attempts,
    }
    .into())
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicU32, Ordering};

    use tokio::time::Instant;

    use super::*;

    const INTERVAL: Duration = Duration::from_millis(5000);

    #[tokio::test(start_paused = true)]
    async fn zero_attempts_never_invokes_action() {
        let counter = AtomicU32::new(0);
        let calls = &counter;
        let result: Result<u32, Error> = repeat_while(
            move || async move {
                calls.fetch_add(1, Ordering::SeqCst);
                Ok(1)
            },
            |_| false,
            0,
            INTERVAL,
        )
        .await;

        assert!(matches!(result, Err(Error::MaxAttemptsReached { attempts: 0 })));
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn satisfied_first_result_returns_without_sleeping() {
        let start = Instant::now();
        let result: Result<&str, Error> =
            repeat_while(|| async { Ok("done") }, |_| false, 30, INTERVAL).await;

        assert_eq!(tokio_test::assert_ok!(result), "done");
        assert_eq!(start.elapsed(), Duration::ZERO);
    }

    #[tokio::test(start_paused = true)]
    async fn always_retry_exhausts_every_attempt() {
        let counter = AtomicU32::new(0);
        let calls = &counter;
        let start = Instant::now();
        let result: Result<u32, Error> = repeat_while(
            move || async move { Ok(calls.fetch_add(1, Ordering::SeqCst)) },
            |_| true,
            4,
            INTERVAL,
        )
        .await;

        assert!(matches!(result, Err(Error::MaxAttemptsReached { attempts: 4 })));
        assert_eq!(calls.load(Ordering::SeqCst), 4);
        assert_eq!(start.elapsed(), INTERVAL * 3);
    }

    #[tokio::test(start_paused = true)]
    async fn returns_first_result_that_stops_retrying() {
        let counter = AtomicU32::new(0);
        let calls = &counter;
        let result: Result<u32, Error> = repeat_while(
            move || async move { Ok(calls.fetch_add(1, Ordering::SeqCst) + 1) },
            |n| *n < 3,
            30,
            INTERVAL,
        )
        .await;

        assert_eq!(tokio_test::assert_ok!(result), 3);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn action_failure_is_not_retried() {
        let counter = AtomicU32::new(0);
        let calls = &counter;
        let result: Result<u32, Error> = repeat_while(
            move || async move {
                calls.fetch_add(1, Ordering::SeqCst);
                Err(Error::LicenseRegistration)
            },
            |_| true,
            30,
            INTERVAL,
        )
        .await;

        assert!(matches!(result, Err(Error::LicenseRegistration)));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
