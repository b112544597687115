//! Application configuration assembled from environment variables.

use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Environment {
    Development,
    Test,
    Production,
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Environment::Development => write!(f, "development"),
            Environment::Test => write!(f, "test"),
            Environment::Production => write!(f, "production"),
        }
    }
}

#[derive(Clone)]
pub struct AppConfig {
    pub env: Environment,
    pub log_level: String,
    /// Root directory of the file-backed run store.
    pub data_dir: PathBuf,
    pub brands_path: PathBuf,
    pub sources_path: PathBuf,

    pub request_timeout_secs: u64,
    pub user_agent: String,
    pub max_concurrent_sources: usize,
    pub max_articles_per_brand: usize,

    pub scrape_timeout_secs: u64,
    pub scrape_workers: usize,

    pub analyze_workers: usize,
    /// Bodies shorter than this skip the model call entirely.
    pub min_body_chars: usize,
    /// Bodies are truncated to this many chars before prompting.
    pub max_body_chars: usize,
    pub summary_min_words: u32,
    pub summary_max_words: u32,
    pub model: String,
    pub model_base_url: String,
    pub model_api_key: Option<String>,
    pub model_max_tokens: u32,

    /// Additional attempts after the first failure for transient errors.
    pub max_retries: u32,
    pub backoff_base_ms: u64,
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("env", &self.env)
            .field("log_level", &self.log_level)
            .field("data_dir", &self.data_dir)
            .field("brands_path", &self.brands_path)
            .field("sources_path", &self.sources_path)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .field("user_agent", &self.user_agent)
            .field("max_concurrent_sources", &self.max_concurrent_sources)
            .field("max_articles_per_brand", &self.max_articles_per_brand)
            .field("scrape_timeout_secs", &self.scrape_timeout_secs)
            .field("scrape_workers", &self.scrape_workers)
            .field("analyze_workers", &self.analyze_workers)
            .field("min_body_chars", &self.min_body_chars)
            .field("max_body_chars", &self.max_body_chars)
            .field("summary_min_words", &self.summary_min_words)
            .field("summary_max_words", &self.summary_max_words)
            .field("model", &self.model)
            .field("model_base_url", &self.model_base_url)
            .field(
                "model_api_key",
                &self.model_api_key.as_ref().map(|_| "[redacted]"),
            )
            .field("model_max_tokens", &self.model_max_tokens)
            .field("max_retries", &self.max_retries)
            .field("backoff_base_ms", &self.backoff_base_ms)
            .finish()
    }
}
