//! Analyzer error types.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum AnalyzerError {
    #[error("model request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("model API error ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("model rate limit hit")]
    RateLimited,

    #[error("no API key configured for the completion model")]
    MissingApiKey,

    #[error("model response missing completion text")]
    EmptyCompletion,
}

impl AnalyzerError {
    /// Whether a retry could plausibly succeed.
    #[must_use]
    pub fn is_transient(&self) -> bool {
        match self {
            AnalyzerError::Http(e) => {
                e.is_timeout()
                    || e.is_connect()
                    || e.status().is_some_and(|s| s.is_server_error())
            }
            AnalyzerError::Api { status, .. } => (500..600).contains(status),
            AnalyzerError::RateLimited => true,
            AnalyzerError::MissingApiKey | AnalyzerError::EmptyCompletion => false,
        }
    }
}
