use thiserror::Error;

/// Errors surfaced by the news sources.
///
/// Auth and quota failures are distinct variants so the fetcher can decide
/// not to retry them; everything else is classified by [`FetchError::is_transient`].
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("XML parse error: {0}")]
    Xml(#[from] quick_xml::Error),

    #[error("JSON deserialization error for {context}: {source}")]
    Deserialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    /// 401/403 from a query API: credentials problem, never retried.
    #[error("auth failure from {source_name} (status {status})")]
    Auth { source_name: String, status: u16 },

    /// 429 from a query API: quota exhausted, never retried this run.
    #[error("quota exhausted for {source_name}")]
    Quota { source_name: String },

    #[error("unexpected HTTP status {status} from {url}")]
    UnexpectedStatus { status: u16, url: String },
}

impl FetchError {
    /// True for failures worth exactly one immediate retry: network-level
    /// errors (timeout, connection reset) and 5xx responses.
    #[must_use]
    pub fn is_transient(&self) -> bool {
        match self {
            FetchError::Http(e) => {
                e.is_timeout() || e.is_connect() || e.status().is_some_and(|s| s.is_server_error())
            }
            FetchError::UnexpectedStatus { status, .. } => (500..600).contains(status),
            FetchError::Xml(_)
            | FetchError::Deserialize { .. }
            | FetchError::Auth { .. }
            | FetchError::Quota { .. } => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn server_errors_are_transient() {
        let err = FetchError::UnexpectedStatus {
            status: 503,
            url: "https://example.com".to_string(),
        };
        assert!(err.is_transient());
    }

    #[test]
    fn client_errors_are_not_transient() {
        let err = FetchError::UnexpectedStatus {
            status: 404,
            url: "https://example.com".to_string(),
        };
        assert!(!err.is_transient());
    }

    #[test]
    fn auth_and_quota_are_never_transient() {
        assert!(!FetchError::Auth {
            source_name: "newsapi".to_string(),
            status: 401
        }
        .is_transient());
        assert!(!FetchError::Quota {
            source_name: "newsapi".to_string()
        }
        .is_transient());
    }

    #[test]
    fn parse_failures_are_not_transient() {
        let source = serde_json::from_str::<()>("nope").unwrap_err();
        let err = FetchError::Deserialize {
            context: "test".to_string(),
            source,
        };
        assert!(!err.is_transient());
    }
}
