use crate::app_config::{AppConfig, Environment};
use crate::ConfigError;

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if values are invalid.
pub fn load_app_config() -> Result<AppConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_app_config_from_env()
}

/// Load application configuration from environment variables already in the
/// process, without touching `.env` files.
///
/// # Errors
///
/// Returns `ConfigError` if values are invalid.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// The parsing/validation logic is decoupled from the real environment so it
/// can be tested with a pure `HashMap` lookup.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    use std::path::PathBuf;

    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let parse_u32 = |var: &str, default: &str| -> Result<u32, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<u32>().map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        })
    };

    let parse_u64 = |var: &str, default: &str| -> Result<u64, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<u64>().map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        })
    };

    let parse_usize = |var: &str, default: &str| -> Result<usize, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<usize>()
            .map_err(|e| ConfigError::InvalidEnvVar {
                var: var.to_string(),
                reason: e.to_string(),
            })
    };

    let env = parse_environment(&or_default("BNT_ENV", "development"));
    let log_level = or_default("BNT_LOG_LEVEL", "info");
    let data_dir = PathBuf::from(or_default("BNT_DATA_DIR", "./data"));
    let brands_path = PathBuf::from(or_default("BNT_BRANDS_PATH", "./config/brands.yaml"));
    let sources_path = PathBuf::from(or_default("BNT_SOURCES_PATH", "./config/sources.yaml"));

    let request_timeout_secs = parse_u64("BNT_REQUEST_TIMEOUT_SECS", "20")?;
    let user_agent = or_default("BNT_USER_AGENT", "bnt/0.1 (brand-news-tracker)");
    let max_concurrent_sources = parse_usize("BNT_MAX_CONCURRENT_SOURCES", "2")?;
    let max_articles_per_brand = parse_usize("BNT_MAX_ARTICLES_PER_BRAND", "20")?;

    let scrape_timeout_secs = parse_u64("BNT_SCRAPE_TIMEOUT_SECS", "15")?;
    let scrape_workers = parse_usize("BNT_SCRAPE_WORKERS", "4")?;

    let analyze_workers = parse_usize("BNT_ANALYZE_WORKERS", "2")?;
    let min_body_chars = parse_usize("BNT_MIN_BODY_CHARS", "120")?;
    let max_body_chars = parse_usize("BNT_MAX_BODY_CHARS", "8000")?;
    let summary_min_words = parse_u32("BNT_SUMMARY_MIN_WORDS", "50")?;
    let summary_max_words = parse_u32("BNT_SUMMARY_MAX_WORDS", "250")?;
    let model = or_default("BNT_MODEL", "gpt-4o-mini");
    let model_base_url = or_default("BNT_MODEL_BASE_URL", "https://api.openai.com/v1");
    let model_api_key = lookup("OPENAI_API_KEY").ok();
    let model_max_tokens = parse_u32("BNT_MODEL_MAX_TOKENS", "1024")?;

    let max_retries = parse_u32("BNT_MAX_RETRIES", "1")?;
    let backoff_base_ms = parse_u64("BNT_BACKOFF_BASE_MS", "500")?;

    if summary_min_words > summary_max_words {
        return Err(ConfigError::InvalidEnvVar {
            var: "BNT_SUMMARY_MIN_WORDS".to_string(),
            reason: format!(
                "min words ({summary_min_words}) exceeds max words ({summary_max_words})"
            ),
        });
    }

    Ok(AppConfig {
        env,
        log_level,
        data_dir,
        brands_path,
        sources_path,
        request_timeout_secs,
        user_agent,
        max_concurrent_sources,
        max_articles_per_brand,
        scrape_timeout_secs,
        scrape_workers,
        analyze_workers,
        min_body_chars,
        max_body_chars,
        summary_min_words,
        summary_max_words,
        model,
        model_base_url,
        model_api_key,
        model_max_tokens,
        max_retries,
        backoff_base_ms,
    })
}

/// Parse a string into an `Environment` variant.
///
/// Unrecognized values default to `Environment::Development`.
fn parse_environment(s: &str) -> Environment {
    match s {
        "production" => Environment::Production,
        "test" => Environment::Test,
        _ => Environment::Development,
    }
}
