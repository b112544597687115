//! News source configuration (`config/sources.yaml`).

use std::collections::HashSet;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::ConfigError;

/// A configured news source. The pipeline consults sources in file order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceSpec {
    pub name: String,
    #[serde(flatten)]
    pub kind: SourceKind,
}

/// Closed set of source variants, dispatched by the `kind` tag.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum SourceKind {
    /// A syndication feed pulled once per run; entries are keyword-filtered.
    Feed { url: String },
    /// A keyword search API queried once per brand per run.
    Api {
        endpoint: String,
        /// Name of the env var holding the API key, if the API needs one.
        api_key_env: Option<String>,
        /// Max results requested per call.
        page_size: Option<u32>,
    },
}

impl SourceSpec {
    fn url(&self) -> &str {
        match &self.kind {
            SourceKind::Feed { url } => url,
            SourceKind::Api { endpoint, .. } => endpoint,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct SourcesFile {
    pub sources: Vec<SourceSpec>,
}

/// Load and validate the sources configuration from a YAML file.
///
/// An empty source list parses fine here; the pipeline rejects it at run
/// start as a configuration fault.
///
/// # Errors
///
/// Returns `ConfigError` if the file cannot be read, parsed, or fails validation.
pub fn load_sources(path: &Path) -> Result<SourcesFile, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::FileIo {
        path: path.display().to_string(),
        source: e,
    })?;

    let sources_file: SourcesFile = serde_yaml::from_str(&content)?;

    validate_sources(&sources_file)?;

    Ok(sources_file)
}

fn validate_sources(sources_file: &SourcesFile) -> Result<(), ConfigError> {
    let mut seen_names = HashSet::new();

    for source in &sources_file.sources {
        if source.name.trim().is_empty() {
            return Err(ConfigError::Validation(
                "source name must be non-empty".to_string(),
            ));
        }

        if !seen_names.insert(source.name.to_lowercase()) {
            return Err(ConfigError::Validation(format!(
                "duplicate source name: '{}'",
                source.name
            )));
        }

        let url = source.url();
        if !url.starts_with("http://") && !url.starts_with("https://") {
            return Err(ConfigError::Validation(format!(
                "source '{}' has a non-http(s) URL: '{url}'",
                source.name
            )));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_feed_and_api_variants() {
        let yaml = r"
sources:
  - name: google-news
    kind: feed
    url: https://news.google.com/rss
  - name: newsapi
    kind: api
    endpoint: https://newsapi.org/v2/everything
    api_key_env: NEWSAPI_KEY
    page_size: 25
";
        let file: SourcesFile = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(file.sources.len(), 2);
        assert!(matches!(file.sources[0].kind, SourceKind::Feed { .. }));
        match &file.sources[1].kind {
            SourceKind::Api {
                api_key_env,
                page_size,
                ..
            } => {
                assert_eq!(api_key_env.as_deref(), Some("NEWSAPI_KEY"));
                assert_eq!(*page_size, Some(25));
            }
            SourceKind::Feed { .. } => panic!("expected api variant"),
        }
        assert!(validate_sources(&file).is_ok());
    }

    #[test]
    fn rejects_unknown_kind() {
        let yaml = r"
sources:
  - name: mystery
    kind: scrapyard
    url: https://example.com
";
        assert!(serde_yaml::from_str::<SourcesFile>(yaml).is_err());
    }

    #[test]
    fn validate_rejects_duplicate_names() {
        let yaml = r"
sources:
  - name: feed
    kind: feed
    url: https://a.example.com/rss
  - name: Feed
    kind: feed
    url: https://b.example.com/rss
";
        let file: SourcesFile = serde_yaml::from_str(yaml).unwrap();
        let err = validate_sources(&file).unwrap_err();
        assert!(err.to_string().contains("duplicate source name"));
    }

    #[test]
    fn validate_rejects_non_http_url() {
        let yaml = r"
sources:
  - name: local
    kind: feed
    url: file:///etc/passwd
";
        let file: SourcesFile = serde_yaml::from_str(yaml).unwrap();
        let err = validate_sources(&file).unwrap_err();
        assert!(err.to_string().contains("non-http"));
    }

    #[test]
    fn empty_source_list_is_valid_at_load_time() {
        let file: SourcesFile = serde_yaml::from_str("sources: []").unwrap();
        assert!(validate_sources(&file).is_ok());
        assert!(file.sources.is_empty());
    }
}
