//! Article records at each pipeline stage.
//!
//! A `CandidateArticle` comes out of the fetcher, gains a body in the
//! scraper (`ScrapedArticle`), and gains analysis fields in the analyzer
//! (`AnalyzedArticle`). Per-item failures are status fields, never errors.

use chrono::{DateTime, DurationRound, TimeDelta, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use url::Url;

/// Half-width of the polarity band treated as neutral. A `neutral` label
/// with `|polarity|` above this is relabeled from the polarity sign.
pub const NEUTRAL_BAND: f64 = 0.2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sentiment {
    Positive,
    Negative,
    Neutral,
}

impl Sentiment {
    /// Label implied by a polarity score alone.
    #[must_use]
    pub fn from_polarity(polarity: f64) -> Self {
        if polarity > NEUTRAL_BAND {
            Sentiment::Positive
        } else if polarity < -NEUTRAL_BAND {
            Sentiment::Negative
        } else {
            Sentiment::Neutral
        }
    }

    /// Whether `polarity` is sign-consistent with this label.
    #[must_use]
    pub fn consistent_with(self, polarity: f64) -> bool {
        match self {
            Sentiment::Positive => polarity >= 0.0,
            Sentiment::Negative => polarity <= 0.0,
            Sentiment::Neutral => polarity.abs() <= NEUTRAL_BAND,
        }
    }
}

impl std::fmt::Display for Sentiment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Sentiment::Positive => write!(f, "positive"),
            Sentiment::Negative => write!(f, "negative"),
            Sentiment::Neutral => write!(f, "neutral"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScrapeStatus {
    /// Body extracted from the page.
    Ok,
    /// Page fetched but no qualifying content block; body is the snippet.
    Partial,
    /// Fetch failed; only the candidate metadata is usable.
    Failed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnalysisStatus {
    Ok,
    /// Model output required repair (clamped polarity, defaulted fields).
    Degraded,
    /// No usable model output; summary is the templated fallback.
    Failed,
}

/// An article reference discovered by the fetcher, not yet scraped.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CandidateArticle {
    /// Slug of the brand this candidate was matched under.
    pub brand_slug: String,
    /// Name of the source that produced it.
    pub source: String,
    pub url: String,
    pub title: String,
    /// Source-provided summary/description. May be empty.
    pub snippet: String,
    pub published_at: Option<DateTime<Utc>>,
}

impl CandidateArticle {
    /// Identity used for deduplication across sources and runs.
    ///
    /// Primary key is the normalized URL (scheme + lowercased host + path,
    /// query and fragment stripped). When the URL does not parse, falls back
    /// to a hash of title, source, and the published timestamp rounded to
    /// the hour.
    #[must_use]
    pub fn dedup_key(&self) -> String {
        normalize_url(&self.url).unwrap_or_else(|| {
            let rounded = self
                .published_at
                .and_then(|ts| ts.duration_trunc(TimeDelta::hours(1)).ok())
                .map(|ts| ts.to_rfc3339())
                .unwrap_or_default();
            let mut hasher = Sha256::new();
            hasher.update(self.title.trim().to_lowercase());
            hasher.update("|");
            hasher.update(&self.source);
            hasher.update("|");
            hasher.update(rounded);
            format!("{:x}", hasher.finalize())
        })
    }
}

/// Normalize a URL to scheme + host + path, dropping query, fragment, and
/// any trailing slash. Returns `None` for unparseable or host-less URLs.
#[must_use]
pub fn normalize_url(raw: &str) -> Option<String> {
    let url = Url::parse(raw.trim()).ok()?;
    let host = url.host_str()?.to_lowercase();
    let path = url.path().trim_end_matches('/');
    Some(format!("{}://{}{}", url.scheme(), host, path))
}

/// A candidate plus its extracted full-text body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScrapedArticle {
    pub candidate: CandidateArticle,
    /// Extracted body text. Empty when scraping failed.
    pub body: String,
    pub scrape_status: ScrapeStatus,
}

impl ScrapedArticle {
    /// The best text available for analysis: the body when present,
    /// otherwise the source snippet.
    #[must_use]
    pub fn usable_text(&self) -> &str {
        if self.body.trim().is_empty() {
            &self.candidate.snippet
        } else {
            &self.body
        }
    }
}

/// The fully enriched record committed at the end of a run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalyzedArticle {
    #[serde(flatten)]
    pub scraped: ScrapedArticle,
    pub summary: String,
    /// Topic strings in the model's stated relevance order.
    pub topics: Vec<String>,
    pub sentiment: Sentiment,
    /// Sentiment intensity in [-1.0, 1.0], sign-consistent with the label.
    pub polarity: f64,
    pub analysis_status: AnalysisStatus,
}
