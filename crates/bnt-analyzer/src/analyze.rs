//! The analyze operation: scraped articles → analyzed articles.

use futures::stream::{self, StreamExt};

use bnt_core::{AnalysisStatus, AnalyzedArticle, CancelToken, ScrapedArticle, Sentiment};

use crate::error::AnalyzerError;
use crate::model::CompletionModel;
use crate::parse::{parse_raw, validate};
use crate::prompt::{build_prompt, PromptOptions};
use crate::retry::retry_with_backoff;

/// Fallback summary length when the text has no sentence boundary.
const FALLBACK_CHARS: usize = 200;

#[derive(Debug, Clone, Copy)]
pub struct AnalyzeOptions {
    pub workers: usize,
    /// Usable text shorter than this skips the model entirely.
    pub min_body_chars: usize,
    pub max_body_chars: usize,
    pub summary_min_words: u32,
    pub summary_max_words: u32,
    pub max_tokens: u32,
    pub max_retries: u32,
    pub backoff_base_ms: u64,
}

impl Default for AnalyzeOptions {
    fn default() -> Self {
        Self {
            workers: 2,
            min_body_chars: 120,
            max_body_chars: 8000,
            summary_min_words: 50,
            summary_max_words: 250,
            max_tokens: 1024,
            max_retries: 1,
            backoff_base_ms: 500,
        }
    }
}

/// Analyze all articles with bounded concurrency.
///
/// Every input article yields exactly one output article; model failures
/// become `failed` records with a templated summary and neutral sentiment,
/// never dropped items. When `cancel` fires, items not yet admitted to a
/// worker are skipped and omitted from the result.
pub async fn analyze_all(
    model: &dyn CompletionModel,
    articles: Vec<ScrapedArticle>,
    opts: &AnalyzeOptions,
    cancel: &CancelToken,
) -> Vec<AnalyzedArticle> {
    let total = articles.len();
    let results: Vec<Option<AnalyzedArticle>> = stream::iter(articles)
        .map(|article| async move {
            if cancel.is_cancelled() {
                tracing::debug!(url = %article.candidate.url, "cancelled before analysis, skipping");
                return None;
            }
            Some(analyze_one(model, article, opts).await)
        })
        .buffer_unordered(opts.workers.max(1))
        .collect()
        .await;

    let analyzed: Vec<AnalyzedArticle> = results.into_iter().flatten().collect();
    tracing::info!(
        total,
        analyzed = analyzed.len(),
        failed = analyzed
            .iter()
            .filter(|a| a.analysis_status == AnalysisStatus::Failed)
            .count(),
        "analysis stage complete"
    );
    analyzed
}

async fn analyze_one(
    model: &dyn CompletionModel,
    article: ScrapedArticle,
    opts: &AnalyzeOptions,
) -> AnalyzedArticle {
    let text = article.usable_text();
    if text.chars().count() < opts.min_body_chars {
        tracing::debug!(
            url = %article.candidate.url,
            chars = text.chars().count(),
            "text below analysis threshold"
        );
        return failed(article);
    }

    let prompt = build_prompt(
        &article.candidate.title,
        text,
        &PromptOptions {
            max_body_chars: opts.max_body_chars,
            summary_min_words: opts.summary_min_words,
            summary_max_words: opts.summary_max_words,
        },
    );

    let completion = retry_with_backoff(opts.max_retries, opts.backoff_base_ms, || {
        model.complete(&prompt, opts.max_tokens)
    })
    .await;

    let raw = match completion {
        Ok(raw) => raw,
        Err(e) => {
            tracing::warn!(url = %article.candidate.url, error = %e, "model call failed");
            return failed(article);
        }
    };

    let Some(parsed) = parse_raw(&raw) else {
        tracing::warn!(url = %article.candidate.url, "model output was not parseable JSON");
        return failed(article);
    };

    let validated = validate(parsed);
    let summary = validated
        .summary
        .unwrap_or_else(|| fallback_summary(&article));
    AnalyzedArticle {
        summary,
        topics: validated.topics,
        sentiment: validated.sentiment,
        polarity: validated.polarity,
        analysis_status: validated.status,
        scraped: article,
    }
}

fn failed(article: ScrapedArticle) -> AnalyzedArticle {
    AnalyzedArticle {
        summary: fallback_summary(&article),
        topics: Vec::new(),
        sentiment: Sentiment::Neutral,
        polarity: 0.0,
        analysis_status: AnalysisStatus::Failed,
        scraped: article,
    }
}

/// Templated summary used when no model summary is available: the first
/// sentence of the usable text, else its first 200 characters, else the
/// title. Never empty for a titled article.
#[must_use]
pub fn fallback_summary(article: &ScrapedArticle) -> String {
    let text = article.usable_text().trim();
    if text.is_empty() {
        return article.candidate.title.trim().to_string();
    }
    if let Some(end) = text.find(['.', '!', '?']) {
        let first = text[..=end].trim();
        if !first.is_empty() {
            return first.to_string();
        }
    }
    text.chars()
        .take(FALLBACK_CHARS)
        .collect::<String>()
        .trim_end()
        .to_string()
}
