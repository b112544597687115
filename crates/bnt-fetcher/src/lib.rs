//! News fetcher: discovers candidate articles for tracked brands.
//!
//! Dispatches over the configured source variants (syndication feeds and
//! keyword-search APIs), matches results against brand keywords with
//! fan-out, and filters the matches through the dedup index. Per-source
//! failures are counted and logged; they never abort the fetch.

pub mod error;
pub mod feed;
pub mod fetch;
pub mod matching;
pub mod search;
pub mod types;

mod client;
mod retry;

pub use client::NewsClient;
pub use error::FetchError;
pub use fetch::{fetch_candidates, FetchOptions, FetchOutcome};
pub use types::FeedEntry;
