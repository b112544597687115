//! Parsing and validation of raw model output.
//!
//! The model's text is parsed as JSON directly; when that fails, one
//! repair pass strips markdown fences and hunts for the first balanced
//! object before giving up. Validation then enforces the polarity range
//! and the sentiment/polarity sign agreement, flagging every repair so
//! the article lands as `degraded` rather than `ok`.

use serde::Deserialize;
use serde_json::Value;

use bnt_core::{AnalysisStatus, Sentiment};

/// The model's answer as deserialized, before validation. Every field is
/// optional because the model is not trusted to produce any of them.
#[derive(Debug, Deserialize)]
pub struct RawAnalysis {
    pub summary: Option<String>,
    pub topics: Option<Vec<Value>>,
    pub sentiment: Option<String>,
    pub polarity: Option<f64>,
}

/// A validated analysis ready to attach to an article. `summary` is `None`
/// when the model produced nothing usable; the caller substitutes the
/// templated fallback.
#[derive(Debug)]
pub struct ValidatedAnalysis {
    pub summary: Option<String>,
    pub topics: Vec<String>,
    pub sentiment: Sentiment,
    pub polarity: f64,
    pub status: AnalysisStatus,
}

/// Parse raw model text into a [`RawAnalysis`], repairing once if needed.
///
/// Returns `None` when neither the raw text nor the repaired candidate is
/// a JSON object with recognizable fields.
#[must_use]
pub fn parse_raw(raw: &str) -> Option<RawAnalysis> {
    if let Ok(parsed) = serde_json::from_str::<RawAnalysis>(raw) {
        return Some(parsed);
    }
    let repaired = repair(raw)?;
    serde_json::from_str::<RawAnalysis>(&repaired).ok()
}

/// Strip markdown fences and extract the first balanced `{...}` substring.
fn repair(raw: &str) -> Option<String> {
    let defenced = raw
        .trim()
        .trim_start_matches("```json")
        .trim_start_matches("```")
        .trim_end_matches("```")
        .trim();
    if defenced != raw && serde_json::from_str::<Value>(defenced).is_ok() {
        return Some(defenced.to_string());
    }
    balanced_object(defenced)
}

/// The first top-level `{...}` in `text`, tracking strings and escapes so
/// braces inside string values do not confuse the depth count.
fn balanced_object(text: &str) -> Option<String> {
    let start = text.find('{')?;
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;
    for (i, ch) in text[start..].char_indices() {
        if escaped {
            escaped = false;
            continue;
        }
        match ch {
            '\\' if in_string => escaped = true,
            '"' => in_string = !in_string,
            '{' if !in_string => depth += 1,
            '}' if !in_string => {
                depth -= 1;
                if depth == 0 {
                    return Some(text[start..=start + i].to_string());
                }
            }
            _ => {}
        }
    }
    None
}

/// Enforce the polarity range and sentiment/polarity agreement.
///
/// Any correction (clamp, relabel, defaulted field) downgrades the status
/// to `degraded`; a fully well-formed answer stays `ok`.
#[must_use]
pub fn validate(raw: RawAnalysis) -> ValidatedAnalysis {
    let mut degraded = false;

    let polarity = match raw.polarity {
        Some(p) if p.is_finite() => {
            if (-1.0..=1.0).contains(&p) {
                p
            } else {
                degraded = true;
                p.clamp(-1.0, 1.0)
            }
        }
        _ => {
            degraded = true;
            0.0
        }
    };

    let sentiment = match raw.sentiment.as_deref().map(str::trim) {
        Some("positive") => Sentiment::Positive,
        Some("negative") => Sentiment::Negative,
        Some("neutral") => Sentiment::Neutral,
        _ => {
            degraded = true;
            Sentiment::from_polarity(polarity)
        }
    };
    let sentiment = if sentiment.consistent_with(polarity) {
        sentiment
    } else {
        degraded = true;
        Sentiment::from_polarity(polarity)
    };

    let topics = match raw.topics {
        Some(values) => {
            let mut topics = Vec::with_capacity(values.len());
            for value in values {
                match value.as_str().map(str::trim) {
                    Some(topic) if !topic.is_empty() => topics.push(topic.to_string()),
                    _ => degraded = true,
                }
            }
            topics
        }
        None => {
            degraded = true;
            Vec::new()
        }
    };

    let summary = raw
        .summary
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty());
    if summary.is_none() {
        degraded = true;
    }

    ValidatedAnalysis {
        summary,
        topics,
        sentiment,
        polarity,
        status: if degraded {
            AnalysisStatus::Degraded
        } else {
            AnalysisStatus::Ok
        },
    }
}
