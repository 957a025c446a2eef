//! Text tokenization for TF-IDF vectorization.
//!
//! Splits text into lowercase word tokens of at least two word characters,
//! after Unicode canonical composition so that precomposed and decomposed
//! accents produce the same terms.

use regex::Regex;
use std::sync::LazyLock;
use unicode_normalization::UnicodeNormalization;

/// Regex matching a token: two or more word characters between word boundaries.
static TOKEN_REGEX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\b\w\w+\b").unwrap());

/// Tokenizer used to turn deck text into terms.
#[derive(Debug, Clone)]
pub struct Tokenizer {
    /// Whether to lowercase text before matching tokens.
    lowercase: bool,
}

impl Default for Tokenizer {
    fn default() -> Self {
        Self { lowercase: true }
    }
}

impl Tokenizer {
    /// Create a tokenizer that lowercases its input.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set whether to lowercase text before tokenizing.
    pub fn with_lowercase(mut self, lowercase: bool) -> Self {
        self.lowercase = lowercase;
        self
    }

    /// Prepare text for matching: NFC composition, then optional lowercasing.
    fn prepare(&self, text: &str) -> String {
        let composed: String = text.nfc().collect();
        if self.lowercase {
            composed.to_lowercase()
        } else {
            composed
        }
    }

    /// Split text into tokens, in the order they appear.
    pub fn tokenize(&self, text: &str) -> Vec<String> {
        let prepared = self.prepare(text);
        TOKEN_REGEX
            .find_iter(&prepared)
            .map(|m| m.as_str().to_string())
            .collect()
    }
}
