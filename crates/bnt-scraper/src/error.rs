use thiserror::Error;

#[derive(Debug, Error)]
pub enum ScrapeError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("unexpected HTTP status {status} from {url}")]
    UnexpectedStatus { status: u16, url: String },
}

impl ScrapeError {
    /// True for transient conditions worth a backoff retry: network-level
    /// failures (timeout, connection reset), 429, and 5xx.
    #[must_use]
    pub fn is_transient(&self) -> bool {
        match self {
            ScrapeError::Http(e) => {
                e.is_timeout() || e.is_connect() || e.status().is_some_and(|s| s.is_server_error())
            }
            ScrapeError::UnexpectedStatus { status, .. } => {
                *status == 429 || (500..600).contains(status)
            }
        }
    }
}
