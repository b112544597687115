//! Run orchestration: fetch, scrape, analyze, commit.
//!
//! Stages run as hard barriers: scraping starts only when fetching is
//! done, analysis only when scraping is done. A cancel request is honored
//! at stage boundaries and between items inside a stage; whatever finished
//! before the stop is still committed, marked `cancelled`.

use std::path::PathBuf;
use std::sync::Arc;

use chrono::Utc;

use bnt_analyzer::{analyze_all, AnalyzeOptions, CompletionModel};
use bnt_core::{AnalysisStatus, AppConfig, BrandProfile, CancelToken, ScrapeStatus, SourceSpec};
use bnt_fetcher::{fetch_candidates, FetchOptions, NewsClient};
use bnt_scraper::{scrape_all, Extractor, PageClient};
use bnt_store::{PipelineRun, RunStatus, RunStore, SeenIndex};

use crate::error::PipelineError;

/// The orchestrator. Owns the stage clients and the dedup index; commits
/// exactly one [`PipelineRun`] per [`run`](Pipeline::run) call, including
/// empty and cancelled runs.
pub struct Pipeline {
    config: AppConfig,
    brands: Vec<BrandProfile>,
    sources: Vec<SourceSpec>,
    store: Arc<dyn RunStore>,
    seen: SeenIndex,
    seen_path: Option<PathBuf>,
    model: Arc<dyn CompletionModel>,
    news_client: NewsClient,
    page_client: PageClient,
    extractor: Extractor,
    cancel: CancelToken,
}

impl Pipeline {
    /// # Errors
    ///
    /// Returns [`PipelineError`] if either HTTP client cannot be built.
    pub fn new(
        config: AppConfig,
        brands: Vec<BrandProfile>,
        sources: Vec<SourceSpec>,
        store: Arc<dyn RunStore>,
        model: Arc<dyn CompletionModel>,
    ) -> Result<Self, PipelineError> {
        let news_client = NewsClient::new(config.request_timeout_secs, &config.user_agent)?;
        let page_client = PageClient::new(
            config.scrape_timeout_secs,
            &config.user_agent,
            config.max_retries,
            config.backoff_base_ms,
        )?;
        Ok(Self {
            config,
            brands,
            sources,
            store,
            seen: SeenIndex::new(),
            seen_path: None,
            model,
            news_client,
            page_client,
            extractor: Extractor::new(),
            cancel: CancelToken::new(),
        })
    }

    /// Use a pre-loaded dedup index, persisted to `path` after each run.
    #[must_use]
    pub fn with_seen(mut self, seen: SeenIndex, path: Option<PathBuf>) -> Self {
        self.seen = seen;
        self.seen_path = path;
        self
    }

    /// Handle for requesting cancellation from another task (for example a
    /// ctrl-c handler).
    #[must_use]
    pub fn cancel_token(&self) -> CancelToken {
        self.cancel.clone()
    }

    /// Execute one full pass and commit the resulting run.
    ///
    /// `brand_filter` selects brands by slug; empty means all configured
    /// brands. Per-source and per-item failures are absorbed into counters
    /// and statuses; only selection errors and storage failures abort.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::UnknownBrand`] for a filter entry matching
    /// no configured brand, [`PipelineError::NoBrands`] /
    /// [`PipelineError::NoSources`] for empty configuration, and
    /// [`PipelineError::Store`] when the commit itself fails.
    pub async fn run(
        &self,
        brand_filter: &[String],
        force_refresh: bool,
    ) -> Result<PipelineRun, PipelineError> {
        let brands = self.select_brands(brand_filter)?;
        if brands.is_empty() {
            return Err(PipelineError::NoBrands);
        }
        if self.sources.is_empty() {
            return Err(PipelineError::NoSources);
        }

        let slugs: Vec<String> = brands.iter().map(BrandProfile::slug).collect();
        let mut run = PipelineRun::begin(slugs);
        tracing::info!(
            run_id = %run.id,
            brands = run.brands.len(),
            sources = self.sources.len(),
            force_refresh,
            "run started"
        );

        let candidates = if self.cancel.is_cancelled() {
            Vec::new()
        } else {
            let outcome = fetch_candidates(
                &self.news_client,
                &brands,
                &self.sources,
                &self.seen,
                run.id,
                &FetchOptions {
                    force_refresh,
                    max_concurrent_sources: self.config.max_concurrent_sources,
                    max_articles_per_brand: self.config.max_articles_per_brand,
                },
            )
            .await;
            run.counters.fetched = outcome.fetched;
            run.counters.deduped_out = outcome.deduped_out;
            run.counters.source_failures = outcome.source_failures;
            outcome.candidates
        };

        let scraped = if self.cancel.is_cancelled() {
            Vec::new()
        } else {
            scrape_all(
                &self.page_client,
                &self.extractor,
                candidates,
                self.config.scrape_workers,
                &self.cancel,
            )
            .await
        };
        for article in &scraped {
            match article.scrape_status {
                ScrapeStatus::Failed => run.counters.scrape_failed += 1,
                ScrapeStatus::Partial => run.counters.scrape_partial += 1,
                ScrapeStatus::Ok => {}
            }
        }

        let analyzed = if self.cancel.is_cancelled() {
            Vec::new()
        } else {
            analyze_all(
                self.model.as_ref(),
                scraped,
                &AnalyzeOptions {
                    workers: self.config.analyze_workers,
                    min_body_chars: self.config.min_body_chars,
                    max_body_chars: self.config.max_body_chars,
                    summary_min_words: self.config.summary_min_words,
                    summary_max_words: self.config.summary_max_words,
                    max_tokens: self.config.model_max_tokens,
                    max_retries: self.config.max_retries,
                    backoff_base_ms: self.config.backoff_base_ms,
                },
                &self.cancel,
            )
            .await
        };
        for article in &analyzed {
            match article.analysis_status {
                AnalysisStatus::Failed => run.counters.analysis_failed += 1,
                AnalysisStatus::Degraded => run.counters.analysis_degraded += 1,
                AnalysisStatus::Ok => {}
            }
        }

        run.articles = analyzed;
        run.completed_at = Some(Utc::now());
        run.status = if self.cancel.is_cancelled() {
            RunStatus::Cancelled
        } else {
            RunStatus::Completed
        };

        self.store.commit(&run)?;
        if let Some(path) = &self.seen_path {
            self.seen.persist(path)?;
        }

        tracing::info!(
            run_id = %run.id,
            status = ?run.status,
            articles = run.articles.len(),
            fetched = run.counters.fetched,
            deduped_out = run.counters.deduped_out,
            source_failures = run.counters.source_failures,
            "run committed"
        );
        Ok(run)
    }

    fn select_brands(&self, filter: &[String]) -> Result<Vec<BrandProfile>, PipelineError> {
        if filter.is_empty() {
            return Ok(self.brands.clone());
        }
        let mut selected = Vec::with_capacity(filter.len());
        for wanted in filter {
            let slug = wanted.trim().to_lowercase();
            match self.brands.iter().find(|b| b.slug() == slug) {
                Some(brand) => selected.push(brand.clone()),
                None => return Err(PipelineError::UnknownBrand(wanted.clone())),
            }
        }
        Ok(selected)
    }
}
