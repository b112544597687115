//! Best-effort main-content extraction.
//!
//! No DOM is built: boilerplate containers are cut with tag-block regexes
//! and the body is reassembled from paragraph elements. The heuristic keeps
//! the largest contiguous run of qualifying paragraphs, which is what
//! survives of an article once navigation, scripts, and asides are gone.

use std::collections::HashMap;

use regex::Regex;
use reqwest::Url;

/// Containers whose entire content is discarded before paragraph scanning.
const BOILERPLATE_TAGS: &[&str] = &[
    "script", "style", "noscript", "iframe", "svg", "nav", "header", "footer", "aside",
];

/// Paragraphs shorter than this are treated as navigation or metadata.
const MIN_PARAGRAPH_LEN: usize = 50;

/// Extracts article bodies from HTML.
///
/// Optionally carries per-domain overrides: a regex whose first capture
/// group selects the content container for that domain. Overrides are a
/// tuning knob, never required for correctness; the generic heuristic is
/// the fallback for every domain.
pub struct Extractor {
    min_paragraph_len: usize,
    overrides: HashMap<String, Regex>,
    strip_blocks: Vec<Regex>,
    paragraph: Regex,
    tag: Regex,
}

impl Extractor {
    #[must_use]
    pub fn new() -> Self {
        let strip_blocks = BOILERPLATE_TAGS
            .iter()
            .map(|tag| {
                Regex::new(&format!(r"(?is)<{tag}\b.*?</{tag}\s*>")).expect("valid strip regex")
            })
            .collect();
        Self {
            min_paragraph_len: MIN_PARAGRAPH_LEN,
            overrides: HashMap::new(),
            strip_blocks,
            paragraph: Regex::new(r"(?is)<p\b[^>]*>(.*?)</p>").expect("valid paragraph regex"),
            tag: Regex::new(r"(?s)<[^>]*>").expect("valid tag regex"),
        }
    }

    /// Register a content-container pattern for one domain. The pattern's
    /// first capture group is taken as the article container.
    ///
    /// # Errors
    ///
    /// Returns [`regex::Error`] if `pattern` does not compile.
    pub fn with_override(mut self, domain: &str, pattern: &str) -> Result<Self, regex::Error> {
        self.overrides
            .insert(domain.to_lowercase(), Regex::new(pattern)?);
        Ok(self)
    }

    /// Extract the main body text of `html`.
    ///
    /// Returns `None` when no qualifying content block is found; the
    /// caller downgrades the item to `partial` rather than treating this
    /// as an error.
    #[must_use]
    pub fn extract(&self, url: &str, html: &str) -> Option<String> {
        if let Some(from_override) = self.extract_with_override(url, html) {
            return Some(from_override);
        }
        self.extract_generic(html)
    }

    fn extract_with_override(&self, url: &str, html: &str) -> Option<String> {
        let domain = Url::parse(url).ok()?.host_str()?.to_lowercase();
        let pattern = self.overrides.get(&domain)?;
        let container = pattern.captures(html)?.get(1)?.as_str();
        let text = clean_text(&decode_entities(&self.tag.replace_all(container, " ")));
        if text.len() < self.min_paragraph_len {
            return None;
        }
        Some(text)
    }

    fn extract_generic(&self, html: &str) -> Option<String> {
        let mut stripped = html.to_string();
        for block in &self.strip_blocks {
            stripped = block.replace_all(&stripped, " ").into_owned();
        }

        // Paragraphs in document order; a short paragraph breaks contiguity.
        let paragraphs: Vec<Option<String>> = self
            .paragraph
            .captures_iter(&stripped)
            .map(|cap| {
                let inner = cap.get(1).map_or("", |m| m.as_str());
                let text = clean_text(&decode_entities(&self.tag.replace_all(inner, " ")));
                (text.len() >= self.min_paragraph_len).then_some(text)
            })
            .collect();

        let mut best: Vec<String> = Vec::new();
        let mut current: Vec<String> = Vec::new();
        for paragraph in paragraphs {
            match paragraph {
                Some(text) => current.push(text),
                None => {
                    if block_len(&current) > block_len(&best) {
                        best = std::mem::take(&mut current);
                    } else {
                        current.clear();
                    }
                }
            }
        }
        if block_len(&current) > block_len(&best) {
            best = current;
        }

        if best.is_empty() {
            None
        } else {
            Some(best.join("\n\n"))
        }
    }
}

impl Default for Extractor {
    fn default() -> Self {
        Self::new()
    }
}

fn block_len(block: &[String]) -> usize {
    block.iter().map(String::len).sum()
}

/// Normalize whitespace and drop non-printable characters.
#[must_use]
pub fn clean_text(text: &str) -> String {
    let mut result = String::with_capacity(text.len());
    let mut pending_space = false;
    for ch in text.chars() {
        if ch.is_control() || ch.is_whitespace() {
            pending_space = true;
            continue;
        }
        if pending_space && !result.is_empty() {
            result.push(' ');
        }
        pending_space = false;
        result.push(ch);
    }
    result
}

fn decode_entities(text: &str) -> String {
    // `&amp;` goes last so text like `&amp;lt;` decodes to the literal
    // `&lt;` instead of double-decoding to `<`.
    text.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&apos;", "'")
        .replace("&nbsp;", " ")
        .replace("&amp;", "&")
}
