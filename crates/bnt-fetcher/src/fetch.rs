//! The fetch operation: sources → matched candidates → dedup filter.

use std::collections::{HashMap, HashSet};

use futures::stream::{self, StreamExt};
use uuid::Uuid;

use bnt_core::{BrandProfile, CandidateArticle, SourceKind, SourceSpec};
use bnt_store::SeenIndex;

use crate::client::NewsClient;
use crate::feed::fetch_feed;
use crate::matching::{keyword_match, matching_brands};
use crate::retry::retry_transient_once;
use crate::search::search;
use crate::types::FeedEntry;

#[derive(Debug, Clone)]
pub struct FetchOptions {
    /// Bypass the persisted seen-lookup (accepted keys are still recorded,
    /// and within-run duplicates still collapse).
    pub force_refresh: bool,
    pub max_concurrent_sources: usize,
    pub max_articles_per_brand: usize,
}

impl Default for FetchOptions {
    fn default() -> Self {
        Self {
            force_refresh: false,
            max_concurrent_sources: 2,
            max_articles_per_brand: 20,
        }
    }
}

/// Result of one fetch pass.
#[derive(Debug)]
pub struct FetchOutcome {
    /// Unseen candidates, already recorded in the dedup index.
    pub candidates: Vec<CandidateArticle>,
    /// Matched candidates before deduplication (fan-out included).
    pub fetched: u32,
    /// Candidates dropped by the dedup filter.
    pub deduped_out: u32,
    /// Sources that reported at least one error this pass.
    pub source_failures: u32,
}

/// Fetch candidate articles for `brands` from `sources`.
///
/// Sources are polled with bounded concurrency; a failing source is logged
/// and counted, contributing whatever it managed before the failure.
/// Matched candidates flow through the dedup filter in source order, and
/// every accepted key is recorded immediately so a concurrent pass cannot
/// double-process it.
pub async fn fetch_candidates(
    client: &NewsClient,
    brands: &[BrandProfile],
    sources: &[SourceSpec],
    seen: &SeenIndex,
    run_id: Uuid,
    opts: &FetchOptions,
) -> FetchOutcome {
    let concurrency = opts.max_concurrent_sources.max(1);

    let mut collected: Vec<(usize, Vec<CandidateArticle>, bool)> =
        stream::iter(sources.iter().enumerate().map(|(index, source)| async move {
            let (candidates, failed) = collect_source(client, source, brands).await;
            (index, candidates, failed)
        }))
        .buffer_unordered(concurrency)
        .collect()
        .await;

    // Restore source order so the dedup filter's first-wins behavior is
    // deterministic across runs.
    collected.sort_by_key(|(index, _, _)| *index);

    let mut fetched: u32 = 0;
    let mut deduped_out: u32 = 0;
    let mut source_failures: u32 = 0;
    let mut in_run: HashSet<String> = HashSet::new();
    let mut per_brand: HashMap<String, usize> = HashMap::new();
    let mut accepted = Vec::new();

    for (_, candidates, failed) in collected {
        if failed {
            source_failures += 1;
        }
        for candidate in candidates {
            fetched += 1;
            let key = candidate.dedup_key();

            if in_run.contains(&key) {
                deduped_out += 1;
                continue;
            }
            if !opts.force_refresh && seen.seen(&key) {
                deduped_out += 1;
                continue;
            }

            let count = per_brand.entry(candidate.brand_slug.clone()).or_insert(0);
            if *count >= opts.max_articles_per_brand {
                tracing::debug!(
                    brand = %candidate.brand_slug,
                    url = %candidate.url,
                    "per-brand article cap reached, skipping candidate"
                );
                continue;
            }
            *count += 1;

            in_run.insert(key.clone());
            seen.record(&key, run_id);
            accepted.push(candidate);
        }
    }

    tracing::info!(
        fetched,
        deduped_out,
        source_failures,
        accepted = accepted.len(),
        "fetch pass complete"
    );

    FetchOutcome {
        candidates: accepted,
        fetched,
        deduped_out,
        source_failures,
    }
}

/// Poll one source for all brands. Returns the matched candidates and
/// whether the source reported any error.
async fn collect_source(
    client: &NewsClient,
    source: &SourceSpec,
    brands: &[BrandProfile],
) -> (Vec<CandidateArticle>, bool) {
    match &source.kind {
        SourceKind::Feed { url } => {
            match retry_transient_once(&source.name, || fetch_feed(client, url)).await {
                Ok(entries) => {
                    let candidates = match_entries(&source.name, &entries, brands);
                    tracing::debug!(
                        source = %source.name,
                        entries = entries.len(),
                        matched = candidates.len(),
                        "collected feed entries"
                    );
                    (candidates, false)
                }
                Err(e) => {
                    tracing::warn!(source = %source.name, error = %e, "feed fetch failed");
                    (Vec::new(), true)
                }
            }
        }
        SourceKind::Api {
            endpoint,
            api_key_env,
            page_size,
        } => {
            let api_key = api_key_env
                .as_deref()
                .and_then(|var| std::env::var(var).ok());
            let mut candidates = Vec::new();
            let mut failed = false;

            // One call per brand per run; keywords OR-joined into the query.
            for brand in brands {
                let query = brand.keywords.join(" OR ");
                let result = retry_transient_once(&source.name, || {
                    search(
                        client,
                        &source.name,
                        endpoint,
                        api_key.as_deref(),
                        *page_size,
                        &query,
                    )
                })
                .await;

                match result {
                    Ok(entries) => {
                        // Keyword-check API results too: a noisy API must not
                        // attach unrelated articles to the brand.
                        for entry in &entries {
                            let text = format!("{} {}", entry.title, entry.summary);
                            if keyword_match(brand, &text) {
                                candidates.push(entry_to_candidate(
                                    entry,
                                    &source.name,
                                    &brand.slug(),
                                ));
                            }
                        }
                    }
                    Err(e) => {
                        tracing::warn!(
                            source = %source.name,
                            brand = %brand.slug(),
                            error = %e,
                            "search API call failed"
                        );
                        failed = true;
                    }
                }
            }

            (candidates, failed)
        }
    }
}

fn match_entries(
    source_name: &str,
    entries: &[FeedEntry],
    brands: &[BrandProfile],
) -> Vec<CandidateArticle> {
    let mut candidates = Vec::new();
    for entry in entries {
        let text = format!("{} {}", entry.title, entry.summary);
        for brand in matching_brands(brands, &text) {
            candidates.push(entry_to_candidate(entry, source_name, &brand.slug()));
        }
    }
    candidates
}

fn entry_to_candidate(entry: &FeedEntry, source_name: &str, brand_slug: &str) -> CandidateArticle {
    CandidateArticle {
        brand_slug: brand_slug.to_string(),
        source: source_name.to_string(),
        url: entry.link.clone(),
        title: entry.title.clone(),
        snippet: entry.summary.clone(),
        published_at: entry.published_at,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn brand(name: &str, keywords: &[&str]) -> BrandProfile {
        BrandProfile {
            name: name.to_string(),
            keywords: keywords.iter().map(ToString::to_string).collect(),
            domains: None,
            notes: None,
        }
    }

    fn feed_source(name: &str, url: String) -> SourceSpec {
        SourceSpec {
            name: name.to_string(),
            kind: SourceKind::Feed { url },
        }
    }

    fn client() -> NewsClient {
        NewsClient::new(5, "bnt-test/0.1").unwrap()
    }

    fn rss(items: &[(&str, &str, &str)]) -> String {
        let body: String = items
            .iter()
            .map(|(title, link, desc)| {
                format!(
                    "<item><title>{title}</title><link>{link}</link><description>{desc}</description></item>"
                )
            })
            .collect();
        format!(r#"<?xml version="1.0"?><rss version="2.0"><channel>{body}</channel></rss>"#)
    }

    async fn mount_feed(server: &MockServer, route: &str, body: String) {
        Mock::given(method("GET"))
            .and(path(route.to_string()))
            .respond_with(ResponseTemplate::new(200).set_body_string(body))
            .mount(server)
            .await;
    }

    #[tokio::test]
    async fn matches_and_records_unseen_candidates() {
        let server = MockServer::start().await;
        mount_feed(
            &server,
            "/rss",
            rss(&[
                ("Acme ships a thing", "https://example.com/a", "acme news"),
                ("Globex earnings", "https://example.com/b", "globex news"),
                ("Unrelated story", "https://example.com/c", "weather"),
            ]),
        )
        .await;

        let brands = vec![brand("Acme", &["acme"]), brand("Globex", &["globex"])];
        let sources = vec![feed_source("feed", format!("{}/rss", server.uri()))];
        let seen = SeenIndex::new();
        let run = Uuid::new_v4();

        let outcome = fetch_candidates(
            &client(),
            &brands,
            &sources,
            &seen,
            run,
            &FetchOptions::default(),
        )
        .await;

        assert_eq!(outcome.fetched, 2);
        assert_eq!(outcome.deduped_out, 0);
        assert_eq!(outcome.candidates.len(), 2);
        assert_eq!(seen.len(), 2, "accepted keys are recorded immediately");
    }

    #[tokio::test]
    async fn same_url_survives_once_across_brands() {
        let server = MockServer::start().await;
        mount_feed(
            &server,
            "/rss",
            rss(&[(
                "Acme and Globex announce merger",
                "https://example.com/merger",
                "both brands mentioned: acme globex",
            )]),
        )
        .await;

        let brands = vec![brand("Acme", &["acme"]), brand("Globex", &["globex"])];
        let sources = vec![feed_source("feed", format!("{}/rss", server.uri()))];
        let seen = SeenIndex::new();

        let outcome = fetch_candidates(
            &client(),
            &brands,
            &sources,
            &seen,
            Uuid::new_v4(),
            &FetchOptions::default(),
        )
        .await;

        // Fan-out produces two matched candidates, dedup keeps one.
        assert_eq!(outcome.fetched, 2);
        assert_eq!(outcome.deduped_out, 1);
        assert_eq!(outcome.candidates.len(), 1);
    }

    #[tokio::test]
    async fn already_seen_keys_are_filtered() {
        let server = MockServer::start().await;
        mount_feed(
            &server,
            "/rss",
            rss(&[
                ("Acme old story", "https://example.com/old", "acme"),
                ("Acme new story", "https://example.com/new", "acme"),
            ]),
        )
        .await;

        let brands = vec![brand("Acme", &["acme"])];
        let sources = vec![feed_source("feed", format!("{}/rss", server.uri()))];
        let seen = SeenIndex::new();
        seen.record("https://example.com/old", Uuid::new_v4());

        let outcome = fetch_candidates(
            &client(),
            &brands,
            &sources,
            &seen,
            Uuid::new_v4(),
            &FetchOptions::default(),
        )
        .await;

        assert_eq!(outcome.fetched, 2);
        assert_eq!(outcome.deduped_out, 1);
        assert_eq!(outcome.candidates.len(), 1);
        assert_eq!(outcome.candidates[0].url, "https://example.com/new");
    }

    #[tokio::test]
    async fn force_refresh_bypasses_seen_lookup() {
        let server = MockServer::start().await;
        mount_feed(
            &server,
            "/rss",
            rss(&[("Acme story", "https://example.com/old", "acme")]),
        )
        .await;

        let brands = vec![brand("Acme", &["acme"])];
        let sources = vec![feed_source("feed", format!("{}/rss", server.uri()))];
        let seen = SeenIndex::new();
        seen.record("https://example.com/old", Uuid::new_v4());

        let outcome = fetch_candidates(
            &client(),
            &brands,
            &sources,
            &seen,
            Uuid::new_v4(),
            &FetchOptions {
                force_refresh: true,
                ..FetchOptions::default()
            },
        )
        .await;

        assert_eq!(outcome.candidates.len(), 1);
        assert_eq!(outcome.deduped_out, 0);
    }

    #[tokio::test]
    async fn failing_source_is_counted_and_others_proceed() {
        let server = MockServer::start().await;
        mount_feed(
            &server,
            "/good",
            rss(&[("Acme story", "https://example.com/a", "acme")]),
        )
        .await;
        Mock::given(method("GET"))
            .and(path("/bad"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let brands = vec![brand("Acme", &["acme"])];
        let sources = vec![
            feed_source("bad-feed", format!("{}/bad", server.uri())),
            feed_source("good-feed", format!("{}/good", server.uri())),
        ];
        let seen = SeenIndex::new();

        let outcome = fetch_candidates(
            &client(),
            &brands,
            &sources,
            &seen,
            Uuid::new_v4(),
            &FetchOptions::default(),
        )
        .await;

        assert_eq!(outcome.source_failures, 1);
        assert_eq!(outcome.candidates.len(), 1);
    }

    #[tokio::test]
    async fn per_brand_cap_limits_accepted_candidates() {
        let server = MockServer::start().await;
        mount_feed(
            &server,
            "/rss",
            rss(&[
                ("Acme one", "https://example.com/1", "acme"),
                ("Acme two", "https://example.com/2", "acme"),
                ("Acme three", "https://example.com/3", "acme"),
            ]),
        )
        .await;

        let brands = vec![brand("Acme", &["acme"])];
        let sources = vec![feed_source("feed", format!("{}/rss", server.uri()))];
        let seen = SeenIndex::new();

        let outcome = fetch_candidates(
            &client(),
            &brands,
            &sources,
            &seen,
            Uuid::new_v4(),
            &FetchOptions {
                max_articles_per_brand: 2,
                ..FetchOptions::default()
            },
        )
        .await;

        assert_eq!(outcome.candidates.len(), 2);
        // Capped candidates are not recorded as seen, so a later run can pick
        // them up.
        assert_eq!(seen.len(), 2);
    }
}
