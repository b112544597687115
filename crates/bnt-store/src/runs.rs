//! Pipeline run records and per-stage counters.

use bnt_core::AnalyzedArticle;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Per-stage counters accumulated over one run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunCounters {
    /// Candidates matched to a brand, before deduplication.
    pub fetched: u32,
    /// Candidates dropped because their dedup key was already seen.
    pub deduped_out: u32,
    /// Sources that contributed nothing this run due to an error.
    pub source_failures: u32,
    pub scrape_failed: u32,
    pub scrape_partial: u32,
    pub analysis_failed: u32,
    pub analysis_degraded: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RunStatus {
    Completed,
    /// Stopped early by an external cancel request; the committed articles
    /// are the items that finished before the stop.
    Cancelled,
}

/// One pass of the orchestrator. The atomic unit committed to storage:
/// a run that found nothing still commits, so "ran and found nothing" is
/// distinguishable from "never ran".
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineRun {
    pub id: Uuid,
    pub started_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
    pub status: RunStatus,
    /// Slugs of the brands this run covered.
    pub brands: Vec<String>,
    pub counters: RunCounters,
    pub articles: Vec<AnalyzedArticle>,
}

impl PipelineRun {
    /// A fresh run in progress over the given brands.
    #[must_use]
    pub fn begin(brands: Vec<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            started_at: Utc::now(),
            completed_at: None,
            status: RunStatus::Completed,
            brands,
            counters: RunCounters::default(),
            articles: Vec::new(),
        }
    }

    #[must_use]
    pub fn summary(&self) -> RunSummary {
        RunSummary {
            id: self.id,
            started_at: self.started_at,
            status: self.status,
            article_count: self.articles.len(),
            counters: self.counters,
        }
    }
}

/// Lightweight listing entry for a stored run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunSummary {
    pub id: Uuid,
    pub started_at: DateTime<Utc>,
    pub status: RunStatus,
    pub article_count: usize,
    pub counters: RunCounters,
}
