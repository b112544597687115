use chrono::{DateTime, Utc};

/// A single entry pulled from a feed or search API, before brand matching.
#[derive(Debug, Clone)]
pub struct FeedEntry {
    pub title: String,
    pub link: String,
    /// Source-provided description with HTML stripped. May be empty.
    pub summary: String,
    pub published_at: Option<DateTime<Utc>>,
}

/// Parse the timestamp formats news sources actually emit: RFC 2822
/// (`Wed, 02 Oct 2024 13:00:00 GMT`) and RFC 3339. Anything else is `None`.
#[must_use]
pub fn parse_published(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    DateTime::parse_from_rfc2822(raw)
        .or_else(|_| DateTime::parse_from_rfc3339(raw))
        .map(|ts| ts.with_timezone(&Utc))
        .ok()
}
