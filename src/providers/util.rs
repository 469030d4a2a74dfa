use anyhow::Error;
use std::future::Future;
use std::time::Duration;
use tracing::debug;

/// Retries an async operation while its failures look transient
///
/// # Parameters
/// - `operation`: Closure returning a future
/// - `retries`: Number of retry attempts (total runs = 1 initial + retries)
/// - `delay_ms`: Milliseconds between retry attempts
/// - `is_transient`: Decides whether a failure is worth another attempt
///
/// # Returns
/// Either the successful result or the last error
pub async fn with_retry<F, Fut, T, E>(
    mut operation: F,
    retries: usize,
    delay_ms: u64,
    is_transient: impl Fn(&E) -> bool,
) -> Result<T, Error>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: std::error::Error + Send + Sync + 'static,
{
    let mut attempt = 1;
    loop {
        match operation().await {
            Ok(val) => return Ok(val),
            Err(err) => {
                if attempt > retries || !is_transient(&err) {
                    return Err(Error::from(err));
                }
                debug!(
                    "Attempt {}/{} failed: {}. Retrying...",
                    attempt, retries, err
                );
                attempt += 1;
                tokio::time::sleep(Duration::from_millis(delay_ms)).await;
            }
        }
    }
}

/// Connection and timeout failures may succeed on a second try.
pub fn is_transient(err: &reqwest::Error) -> bool {
    err.is_connect() || err.is_timeout()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn interrupted(err: &io::Error) -> bool {
        err.kind() == io::ErrorKind::Interrupted
    }

    #[tokio::test]
    async fn test_retries_transient_failures() {
        let calls = AtomicUsize::new(0);
        let result = with_retry(
            || async {
                if calls.fetch_add(1, Ordering::SeqCst) < 2 {
                    Err(io::Error::new(io::ErrorKind::Interrupted, "flaky"))
                } else {
                    Ok(7)
                }
            },
            3,
            0,
            interrupted,
        )
        .await;

        assert_eq!(result.unwrap(), 7);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_gives_up_after_retries() {
        let calls = AtomicUsize::new(0);
        let result: Result<(), Error> = with_retry(
            || async {
                calls.fetch_add(1, Ordering::SeqCst);
                Err(io::Error::new(io::ErrorKind::Interrupted, "down"))
            },
            2,
            0,
            interrupted,
        )
        .await;

        assert!(result.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_permanent_failure_is_not_retried() {
        let calls = AtomicUsize::new(0);
        let result: Result<(), Error> = with_retry(
            || async {
                calls.fetch_add(1, Ordering::SeqCst);
                Err(io::Error::new(io::ErrorKind::PermissionDenied, "nope"))
            },
            3,
            0,
            interrupted,
        )
        .await;

        assert_eq!(result.unwrap_err().to_string(), "nope");
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
