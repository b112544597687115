//! Content analyzer: summaries, topics, and sentiment via a generative model.
//!
//! The model is an untrusted producer: its raw text is parsed defensively,
//! repaired once when malformed, and validated against the sentiment and
//! polarity invariants before anything flows downstream. Articles whose
//! text is too short never reach the model; they get a templated fallback.

pub mod analyze;
pub mod error;
pub mod model;
pub mod parse;
pub mod prompt;

mod retry;

pub use analyze::{analyze_all, fallback_summary, AnalyzeOptions};
pub use error::AnalyzerError;
pub use model::{CompletionModel, OpenAiClient};
