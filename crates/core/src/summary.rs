//! Summarization of deck text through an external completion service.
//!
//! Nothing here talks to the network. Callers supply a [`CompletionClient`]
//! and a [`SummaryConfig`] at call time; similarity scoring never depends on
//! this module.

use crate::{Error, Result};
use std::time::Duration;

/// Default model identifier passed to the completion service.
pub const DEFAULT_MODEL: &str = "gpt-4o-mini";

/// Default maximum number of characters per chunk.
pub const DEFAULT_CHUNK_CHARS: usize = 4000;

/// Placeholder chunk used when the text to summarize is empty.
const EMPTY_PLACEHOLDER: &str = "(empty)";

/// Settings for one summarization session.
#[derive(Debug, Clone)]
pub struct SummaryConfig {
    /// Credential for the completion service.
    pub api_key: String,
    /// Model identifier.
    pub model: String,
    /// Maximum characters sent per chunk in the map step.
    pub max_chunk_chars: usize,
    /// Per-request timeout the client must honor.
    pub timeout: Duration,
}

impl SummaryConfig {
    /// Create a config with the given credential and default settings.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            model: DEFAULT_MODEL.to_string(),
            max_chunk_chars: DEFAULT_CHUNK_CHARS,
            timeout: Duration::from_secs(60),
        }
    }

    /// Set the model identifier.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Set the chunk size in characters (at least 1).
    pub fn with_max_chunk_chars(mut self, max_chars: usize) -> Self {
        self.max_chunk_chars = max_chars.max(1);
        self
    }

    /// Set the request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// A text-completion service.
///
/// Implementations map transport, auth, and quota failures to
/// [`Error::ExternalService`].
pub trait CompletionClient {
    /// Send `prompt` and return the completion text.
    fn complete(&self, config: &SummaryConfig, prompt: &str) -> Result<String>;
}

/// Split text into sequential chunks of at most `max_chars` characters.
///
/// NUL characters are replaced by spaces first. Chunks do not overlap and
/// ignore word boundaries. Empty input yields a single placeholder chunk.
pub fn chunk_text(text: &str, max_chars: usize) -> Vec<String> {
    let max_chars = max_chars.max(1);
    let chars: Vec<char> = text.replace('\0', " ").chars().collect();

    if chars.is_empty() {
        return vec![EMPTY_PLACEHOLDER.to_string()];
    }

    chars
        .chunks(max_chars)
        .map(|chunk| chunk.iter().collect())
        .collect()
}

fn chunk_prompt(index: usize, total: usize, chunk: &str) -> String {
    format!(
        "You are a presentation consultant. Summarize the following content as 3-6 \
         bullet points, one sentence each, without repetition or filler, then list \
         3-6 keywords as #hashtags.\n\n[Part {}/{}]\n{}",
        index, total, chunk
    )
}

fn combine_prompt(partials: &[String]) -> String {
    format!(
        "Below are partial summaries of one presentation. Merge them into a final \
         presentation summary:\n\
         1) Start with a 2-3 sentence overview (TL;DR).\n\
         2) Then list 5-8 key points (at most 25 words each).\n\
         3) Finally list 5-10 keywords as #hashtags.\n\n\
         === Partial summaries ===\n{}",
        partials.join("\n\n---\n\n")
    )
}

fn diff_prompt(summary_a: &str, summary_b: &str) -> String {
    format!(
        "Compare the two presentation summaries below:\n\
         1) Shared themes (as bullet points).\n\
         2) Points unique to each side (3-6 for A, 3-6 for B).\n\
         3) If the two were merged into one presentation, a suggested outline (3-5 sections).\n\n\
         [Summary A]\n{}\n\n[Summary B]\n{}",
        summary_a, summary_b
    )
}

/// Map-reduce summarizer over a completion client.
pub struct Summarizer<'a, C: CompletionClient> {
    client: &'a C,
    config: SummaryConfig,
}

impl<'a, C: CompletionClient> Summarizer<'a, C> {
    /// Create a summarizer using `client` with the given settings.
    pub fn new(client: &'a C, config: SummaryConfig) -> Self {
        Self { client, config }
    }

    fn complete(&self, prompt: &str) -> Result<String> {
        self.client
            .complete(&self.config, prompt)
            .map(|text| text.trim().to_string())
    }

    /// Summarize each chunk, then merge the partial summaries into one.
    pub fn summarize(&self, text: &str) -> Result<String> {
        let chunks = chunk_text(text, self.config.max_chunk_chars);
        let total = chunks.len();
        log::debug!("Summarizing {} chunk(s) with model {}", total, self.config.model);

        let partials = chunks
            .iter()
            .enumerate()
            .map(|(idx, chunk)| self.complete(&chunk_prompt(idx + 1, total, chunk)))
            .collect::<Result<Vec<_>>>()?;

        self.complete(&combine_prompt(&partials))
    }

    /// Ask for shared themes, differences, and a merge outline of two summaries.
    pub fn compare_summaries(&self, summary_a: &str, summary_b: &str) -> Result<String> {
        self.complete(&diff_prompt(summary_a, summary_b))
    }
}

/// Summaries of two decks and the comparison between them.
#[derive(Debug, Clone)]
pub struct SummaryComparison {
    /// Summary of the first deck.
    pub summary_a: String,
    /// Summary of the second deck.
    pub summary_b: String,
    /// Shared themes, differences, and merge suggestions.
    pub diff: String,
}

/// Summarize two deck texts and compare the summaries.
///
/// Any failure is reported as [`Error::ExternalService`] so callers can show
/// it as a non-fatal message next to the similarity score.
pub fn summarize_pair<C: CompletionClient>(
    client: &C,
    config: SummaryConfig,
    text_a: &str,
    text_b: &str,
) -> Result<SummaryComparison> {
    let summarizer = Summarizer::new(client, config);
    let run = || -> Result<SummaryComparison> {
        let summary_a = summarizer.summarize(text_a)?;
        let summary_b = summarizer.summarize(text_b)?;
        let diff = summarizer.compare_summaries(&summary_a, &summary_b)?;
        Ok(SummaryComparison {
            summary_a,
            summary_b,
            diff,
        })
    };

    run().map_err(|e| match e {
        e @ Error::ExternalService(_) => e,
        other => Error::ExternalService(other.to_string()),
    })
}
