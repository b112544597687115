//! Orchestrates the ingestion pipeline: fetch, scrape, analyze, commit.

pub mod error;
pub mod pipeline;

pub use error::PipelineError;
pub use pipeline::Pipeline;
