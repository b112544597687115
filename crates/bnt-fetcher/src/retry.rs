//! One-shot retry for transient source failures.
//!
//! Source politeness rules allow exactly one immediate retry on a
//! transient failure (timeout, 5xx); auth, quota, and parse errors are
//! returned as-is.

use std::future::Future;

use crate::FetchError;

pub(crate) async fn retry_transient_once<T, F, Fut>(
    source_name: &str,
    mut operation: F,
) -> Result<T, FetchError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, FetchError>>,
{
    match operation().await {
        Ok(value) => Ok(value),
        Err(err) if err.is_transient() => {
            tracing::warn!(
                source = source_name,
                error = %err,
                "transient source error, retrying once"
            );
            operation().await
        }
        Err(err) => Err(err),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;

    fn transient() -> FetchError {
        FetchError::UnexpectedStatus {
            status: 502,
            url: "https://example.com".to_string(),
        }
    }

    fn permanent() -> FetchError {
        FetchError::Quota {
            source_name: "newsapi".to_string(),
        }
    }

    #[tokio::test]
    async fn succeeds_without_retry() {
        let calls = Arc::new(AtomicU32::new(0));
        let c = Arc::clone(&calls);
        let result = retry_transient_once("test", || {
            let c = Arc::clone(&c);
            async move {
                c.fetch_add(1, Ordering::SeqCst);
                Ok::<u32, FetchError>(7)
            }
        })
        .await;
        assert_eq!(result.unwrap(), 7);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn retries_transient_exactly_once() {
        let calls = Arc::new(AtomicU32::new(0));
        let c = Arc::clone(&calls);
        let result = retry_transient_once("test", || {
            let c = Arc::clone(&c);
            async move {
                c.fetch_add(1, Ordering::SeqCst);
                Err::<u32, FetchError>(transient())
            }
        })
        .await;
        assert!(result.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 2, "one retry, no more");
    }

    #[tokio::test]
    async fn does_not_retry_quota() {
        let calls = Arc::new(AtomicU32::new(0));
        let c = Arc::clone(&calls);
        let result = retry_transient_once("test", || {
            let c = Arc::clone(&c);
            async move {
                c.fetch_add(1, Ordering::SeqCst);
                Err::<u32, FetchError>(permanent())
            }
        })
        .await;
        assert!(matches!(result, Err(FetchError::Quota { .. })));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
