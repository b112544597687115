//! Content scraper: turns candidate articles into scraped articles.
//!
//! Fetches each candidate's URL with a per-request timeout, extracts the
//! main textual body with a best-effort heuristic, and reports per-item
//! outcomes as scrape statuses. A broken or slow site costs one worker
//! slot at most; it cannot stall the pool.

pub mod client;
pub mod error;
pub mod extract;
pub mod scrape;

mod retry;

pub use client::PageClient;
pub use error::ScrapeError;
pub use extract::{clean_text, Extractor};
pub use scrape::scrape_all;
