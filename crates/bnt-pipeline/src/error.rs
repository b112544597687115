//! Orchestrator error types.

use thiserror::Error;

use bnt_fetcher::FetchError;
use bnt_scraper::ScrapeError;
use bnt_store::StoreError;

/// Failures that abort a run before or after the stages. Per-item and
/// per-source failures inside a stage never surface here.
#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("no brands selected for this run")]
    NoBrands,

    #[error("no sources configured")]
    NoSources,

    #[error("unknown brand: {0}")]
    UnknownBrand(String),

    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error(transparent)]
    Scrape(#[from] ScrapeError),

    #[error(transparent)]
    Store(#[from] StoreError),
}
