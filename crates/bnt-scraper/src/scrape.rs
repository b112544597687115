//! The scrape operation: candidates → scraped articles with a worker pool.

use futures::stream::{self, StreamExt};

use bnt_core::{CancelToken, CandidateArticle, ScrapeStatus, ScrapedArticle};

use crate::client::PageClient;
use crate::extract::Extractor;

/// Scrape all candidates with bounded concurrency.
///
/// Each candidate is an independent unit of work with its own timeout; one
/// hung site occupies a single worker slot until its timeout fires. Output
/// order is not input order.
///
/// When `cancel` fires, items not yet admitted to a worker are skipped and
/// omitted from the result; in-flight items finish normally.
pub async fn scrape_all(
    client: &PageClient,
    extractor: &Extractor,
    candidates: Vec<CandidateArticle>,
    workers: usize,
    cancel: &CancelToken,
) -> Vec<ScrapedArticle> {
    let total = candidates.len();
    let results: Vec<Option<ScrapedArticle>> = stream::iter(candidates)
        .map(|candidate| async move {
            if cancel.is_cancelled() {
                tracing::debug!(url = %candidate.url, "cancelled before scrape, skipping");
                return None;
            }
            Some(scrape_one(client, extractor, candidate).await)
        })
        .buffer_unordered(workers.max(1))
        .collect()
        .await;

    let scraped: Vec<ScrapedArticle> = results.into_iter().flatten().collect();
    tracing::info!(
        total,
        scraped = scraped.len(),
        failed = scraped
            .iter()
            .filter(|a| a.scrape_status == ScrapeStatus::Failed)
            .count(),
        "scrape stage complete"
    );
    scraped
}

async fn scrape_one(
    client: &PageClient,
    extractor: &Extractor,
    candidate: CandidateArticle,
) -> ScrapedArticle {
    match client.fetch_page(&candidate.url).await {
        Ok(html) => match extractor.extract(&candidate.url, &html) {
            Some(body) => ScrapedArticle {
                candidate,
                body,
                scrape_status: ScrapeStatus::Ok,
            },
            None => {
                tracing::debug!(url = %candidate.url, "no qualifying content block");
                let snippet = candidate.snippet.clone();
                ScrapedArticle {
                    candidate,
                    body: snippet,
                    scrape_status: ScrapeStatus::Partial,
                }
            }
        },
        Err(e) => {
            tracing::warn!(url = %candidate.url, error = %e, "page fetch failed");
            ScrapedArticle {
                candidate,
                body: String::new(),
                scrape_status: ScrapeStatus::Failed,
            }
        }
    }
}
