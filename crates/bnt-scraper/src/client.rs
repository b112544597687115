//! HTTP client for article pages.

use std::time::Duration;

use reqwest::Client;

use crate::error::ScrapeError;
use crate::retry::retry_with_backoff;

/// Page fetcher with timeout, `User-Agent`, and retry policy.
///
/// Transient failures (timeout, connection errors, 429, 5xx) are retried
/// with exponential backoff up to `max_retries` additional attempts;
/// everything else is returned to the caller, which downgrades the item
/// rather than failing the stage.
#[derive(Debug, Clone)]
pub struct PageClient {
    client: Client,
    max_retries: u32,
    backoff_base_ms: u64,
}

impl PageClient {
    /// # Errors
    ///
    /// Returns [`ScrapeError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed.
    pub fn new(
        timeout_secs: u64,
        user_agent: &str,
        max_retries: u32,
        backoff_base_ms: u64,
    ) -> Result<Self, ScrapeError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .user_agent(user_agent)
            .build()?;
        Ok(Self {
            client,
            max_retries,
            backoff_base_ms,
        })
    }

    /// Fetch a page and return its HTML body.
    ///
    /// # Errors
    ///
    /// Returns [`ScrapeError::Http`] on network failure or
    /// [`ScrapeError::UnexpectedStatus`] on a non-2xx response, after
    /// retries are exhausted.
    pub async fn fetch_page(&self, url: &str) -> Result<String, ScrapeError> {
        retry_with_backoff(self.max_retries, self.backoff_base_ms, || async {
            let response = self.client.get(url).send().await?;
            let status = response.status();
            if !status.is_success() {
                return Err(ScrapeError::UnexpectedStatus {
                    status: status.as_u16(),
                    url: url.to_string(),
                });
            }
            Ok(response.text().await?)
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn returns_body_on_success() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/story"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>hi</html>"))
            .mount(&server)
            .await;

        let client = PageClient::new(5, "bnt-test/0.1", 0, 0).unwrap();
        let body = client
            .fetch_page(&format!("{}/story", server.uri()))
            .await
            .unwrap();
        assert_eq!(body, "<html>hi</html>");
    }

    #[tokio::test]
    async fn surfaces_permanent_status_without_retry() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/gone"))
            .respond_with(ResponseTemplate::new(404))
            .expect(1)
            .mount(&server)
            .await;

        let client = PageClient::new(5, "bnt-test/0.1", 3, 0).unwrap();
        let err = client
            .fetch_page(&format!("{}/gone", server.uri()))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            ScrapeError::UnexpectedStatus { status: 404, .. }
        ));
    }

    #[tokio::test]
    async fn retries_server_errors() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/flaky"))
            .respond_with(ResponseTemplate::new(503))
            .up_to_n_times(1)
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/flaky"))
            .respond_with(ResponseTemplate::new(200).set_body_string("recovered"))
            .mount(&server)
            .await;

        let client = PageClient::new(5, "bnt-test/0.1", 1, 0).unwrap();
        let body = client
            .fetch_page(&format!("{}/flaky", server.uri()))
            .await
            .unwrap();
        assert_eq!(body, "recovered");
    }
}
