use std::time::Duration;

use reqwest::Client;

use crate::FetchError;

/// HTTP client shared by all news sources.
///
/// Carries the configured timeout and `User-Agent`; every request made
/// through it inherits both.
#[derive(Debug, Clone)]
pub struct NewsClient {
    pub(crate) client: Client,
}

impl NewsClient {
    /// # Errors
    ///
    /// Returns [`FetchError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed.
    pub fn new(timeout_secs: u64, user_agent: &str) -> Result<Self, FetchError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .user_agent(user_agent)
            .build()?;
        Ok(Self { client })
    }
}
