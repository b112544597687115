//! Completion model abstraction and the OpenAI-compatible HTTP client.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde_json::{json, Value};

use crate::error::AnalyzerError;

/// A text-completion model. The analyzer only needs one call: prompt in,
/// raw text out. Tests substitute stubs; production wires [`OpenAiClient`].
#[async_trait]
pub trait CompletionModel: Send + Sync {
    async fn complete(&self, prompt: &str, max_tokens: u32) -> Result<String, AnalyzerError>;
}

/// Chat-completions client for OpenAI-compatible endpoints.
///
/// `base_url` is configurable so local or proxy deployments work; the path
/// appended is always `/chat/completions`. Temperature is pinned to zero
/// for reproducible analysis output.
pub struct OpenAiClient {
    client: Client,
    base_url: String,
    api_key: String,
    model: String,
}

impl OpenAiClient {
    /// # Errors
    ///
    /// Returns [`AnalyzerError::MissingApiKey`] when `api_key` is absent,
    /// or [`AnalyzerError::Http`] if the HTTP client cannot be built.
    pub fn new(
        base_url: &str,
        api_key: Option<&str>,
        model: &str,
        timeout_secs: u64,
        user_agent: &str,
    ) -> Result<Self, AnalyzerError> {
        let api_key = api_key
            .filter(|k| !k.trim().is_empty())
            .ok_or(AnalyzerError::MissingApiKey)?;
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .user_agent(user_agent)
            .build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            model: model.to_string(),
        })
    }
}

#[async_trait]
impl CompletionModel for OpenAiClient {
    async fn complete(&self, prompt: &str, max_tokens: u32) -> Result<String, AnalyzerError> {
        let body = json!({
            "model": self.model,
            "messages": [{"role": "user", "content": prompt}],
            "temperature": 0.0,
            "max_tokens": max_tokens,
            "response_format": {"type": "json_object"},
        });

        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if status.as_u16() == 429 {
            return Err(AnalyzerError::RateLimited);
        }
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(AnalyzerError::Api {
                status: status.as_u16(),
                message: message.chars().take(200).collect(),
            });
        }

        let payload: Value = response.json().await?;
        payload["choices"][0]["message"]["content"]
            .as_str()
            .map(str::to_string)
            .ok_or(AnalyzerError::EmptyCompletion)
    }
}
