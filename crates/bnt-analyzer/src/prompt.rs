//! Prompt assembly for article analysis.

/// Knobs the prompt text depends on.
#[derive(Debug, Clone, Copy)]
pub struct PromptOptions {
    /// Body text is truncated to at most this many characters before it is
    /// placed in the prompt.
    pub max_body_chars: usize,
    pub summary_min_words: u32,
    pub summary_max_words: u32,
}

/// Build the analysis prompt for one article.
///
/// The model is instructed to answer with a single JSON object carrying
/// `summary`, `topics`, `sentiment`, and `polarity`; nothing else.
#[must_use]
pub fn build_prompt(title: &str, body: &str, opts: &PromptOptions) -> String {
    let body = truncate_at_sentence(body, opts.max_body_chars);
    format!(
        "You are a news analyst. Analyze the article below and respond with \
         only a JSON object, no prose and no markdown, with exactly these keys:\n\
         - \"summary\": a {min}-{max} word summary of the article\n\
         - \"topics\": an array of short topic strings, most relevant first\n\
         - \"sentiment\": one of \"positive\", \"negative\", or \"neutral\"\n\
         - \"polarity\": a number between -1.0 and 1.0, sign-consistent with the sentiment\n\
         \n\
         Title: {title}\n\
         \n\
         Article:\n{body}",
        min = opts.summary_min_words,
        max = opts.summary_max_words,
    )
}

/// Truncate `text` to at most `max_chars` characters, preferring to cut at
/// the last sentence boundary past the halfway point. Falls back to a hard
/// cut at a character boundary when no suitable boundary exists.
#[must_use]
pub fn truncate_at_sentence(text: &str, max_chars: usize) -> String {
    let chars: Vec<char> = text.chars().collect();
    if chars.len() <= max_chars {
        return text.to_string();
    }
    let window = &chars[..max_chars];
    let boundary = window
        .iter()
        .rposition(|c| matches!(c, '.' | '!' | '?'))
        .filter(|&i| i + 1 >= max_chars / 2);
    match boundary {
        Some(i) => window[..=i].iter().collect(),
        None => window.iter().collect::<String>().trim_end().to_string(),
    }
}
