//! Shared data model and configuration for the BNT pipeline.
//!
//! Holds the article types that flow through the fetch → scrape → analyze
//! stages, the brand/source configuration files, and the env-var driven
//! `AppConfig`. Everything here is plain data: no I/O beyond config loading.

pub mod app_config;
pub mod articles;
pub mod brands;
pub mod cancel;
pub mod config;
pub mod sources;

use thiserror::Error;

pub use app_config::{AppConfig, Environment};
pub use articles::{
    AnalysisStatus, AnalyzedArticle, CandidateArticle, ScrapeStatus, ScrapedArticle, Sentiment,
    NEUTRAL_BAND,
};
pub use brands::{load_brands, BrandProfile, BrandsFile};
pub use cancel::CancelToken;
pub use config::load_app_config;
pub use sources::{load_sources, SourceKind, SourceSpec, SourcesFile};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    FileIo {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config file: {0}")]
    FileParse(#[from] serde_yaml::Error),

    #[error("invalid configuration: {0}")]
    Validation(String),

    #[error("invalid value for env var {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },
}
