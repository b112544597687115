//! Keyword-search API source.
//!
//! Speaks the NewsAPI-style response shape: a JSON object with an
//! `articles` array of `{title, url, description, publishedAt, source}`.

use percent_encoding::{utf8_percent_encode, NON_ALPHANUMERIC};
use serde::Deserialize;

use crate::client::NewsClient;
use crate::error::FetchError;
use crate::types::{parse_published, FeedEntry};

#[derive(Debug, Deserialize)]
struct ApiResponse {
    #[serde(default)]
    articles: Vec<ApiArticle>,
}

#[derive(Debug, Deserialize)]
struct ApiArticle {
    title: Option<String>,
    url: Option<String>,
    description: Option<String>,
    #[serde(rename = "publishedAt")]
    published_at: Option<String>,
}

/// Issue one keyword search against a query API.
///
/// Auth (401/403) and quota (429) responses map to their dedicated error
/// variants so callers can skip retries; 5xx maps to a transient
/// [`FetchError::UnexpectedStatus`].
///
/// # Errors
///
/// Returns [`FetchError`] on network, status, or parse failure.
pub async fn search(
    client: &NewsClient,
    source_name: &str,
    endpoint: &str,
    api_key: Option<&str>,
    page_size: Option<u32>,
    query: &str,
) -> Result<Vec<FeedEntry>, FetchError> {
    let encoded = utf8_percent_encode(query, NON_ALPHANUMERIC).to_string();
    // Endpoints may already carry fixed query parameters.
    let separator = if endpoint.contains('?') { '&' } else { '?' };
    let mut url = format!("{endpoint}{separator}q={encoded}");
    if let Some(size) = page_size {
        url.push_str(&format!("&pageSize={size}"));
    }

    let mut request = client.client.get(&url);
    if let Some(key) = api_key {
        request = request.header("Authorization", key);
    }

    let response = request.send().await?;
    let status = response.status().as_u16();
    match status {
        200..=299 => {}
        401 | 403 => {
            return Err(FetchError::Auth {
                source_name: source_name.to_string(),
                status,
            })
        }
        429 => {
            return Err(FetchError::Quota {
                source_name: source_name.to_string(),
            })
        }
        _ => {
            return Err(FetchError::UnexpectedStatus { status, url });
        }
    }

    let body = response.text().await?;
    let parsed: ApiResponse =
        serde_json::from_str(&body).map_err(|e| FetchError::Deserialize {
            context: format!("search response from {source_name}"),
            source: e,
        })?;

    Ok(parsed
        .articles
        .into_iter()
        .filter_map(|article| {
            let link = article.url.unwrap_or_default();
            if link.is_empty() {
                return None;
            }
            Some(FeedEntry {
                title: article.title.unwrap_or_default(),
                link,
                summary: article.description.unwrap_or_default(),
                published_at: article.published_at.as_deref().and_then(parse_published),
            })
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client() -> NewsClient {
        NewsClient::new(5, "bnt-test/0.1").unwrap()
    }

    #[tokio::test]
    async fn parses_newsapi_shape() {
        let server = MockServer::start().await;
        let body = serde_json::json!({
            "status": "ok",
            "articles": [
                {
                    "title": "Acme in the news",
                    "url": "https://example.com/acme",
                    "description": "Acme did a thing.",
                    "publishedAt": "2024-10-02T13:00:00Z",
                    "source": {"name": "Example"}
                },
                {
                    "title": "No url, dropped",
                    "description": "Missing link."
                }
            ]
        });
        Mock::given(method("GET"))
            .and(path("/v2/everything"))
            .and(query_param("q", "acme OR acme corp"))
            .respond_with(ResponseTemplate::new(200).set_body_json(body))
            .mount(&server)
            .await;

        let entries = search(
            &client(),
            "newsapi",
            &format!("{}/v2/everything", server.uri()),
            None,
            None,
            "acme OR acme corp",
        )
        .await
        .unwrap();

        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].link, "https://example.com/acme");
        assert!(entries[0].published_at.is_some());
    }

    #[tokio::test]
    async fn endpoint_with_fixed_query_params_keeps_them() {
        let server = MockServer::start().await;
        let body = serde_json::json!({"status": "ok", "articles": []});
        Mock::given(method("GET"))
            .and(path("/v2/everything"))
            .and(query_param("language", "en"))
            .and(query_param("q", "acme"))
            .respond_with(ResponseTemplate::new(200).set_body_json(body))
            .expect(1)
            .mount(&server)
            .await;

        let entries = search(
            &client(),
            "newsapi",
            &format!("{}/v2/everything?language=en", server.uri()),
            None,
            None,
            "acme",
        )
        .await
        .unwrap();
        assert!(entries.is_empty());
    }

    #[tokio::test]
    async fn maps_auth_status() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(401))
            .mount(&server)
            .await;

        let err = search(&client(), "newsapi", &server.uri(), Some("bad-key"), None, "q")
            .await
            .unwrap_err();
        assert!(matches!(err, FetchError::Auth { status: 401, .. }));
    }

    #[tokio::test]
    async fn maps_quota_status() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(429))
            .mount(&server)
            .await;

        let err = search(&client(), "newsapi", &server.uri(), None, None, "q")
            .await
            .unwrap_err();
        assert!(matches!(err, FetchError::Quota { .. }));
    }

    #[tokio::test]
    async fn malformed_body_is_a_deserialize_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
            .mount(&server)
            .await;

        let err = search(&client(), "newsapi", &server.uri(), None, None, "q")
            .await
            .unwrap_err();
        assert!(matches!(err, FetchError::Deserialize { .. }));
        assert!(!err.is_transient());
    }
}
