//! Word and n-gram tokenizer for transaction text.
//!
//! Words are matched with a regex, optionally lower-cased, filtered against a
//! stop-word list, and then expanded into contiguous n-grams joined by a
//! single space. N-grams are built after stop-word removal, so none of them
//! contains a stop word.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::error::{ClassifyError, Result};

/// A word character followed by at least one word-ish character.
/// Interior `_`, `-` and `.` keep merchant names like `amazon.fr` whole.
pub const DEFAULT_TOKEN_PATTERN: &str = r"(?u)\b\w[a-zA-Z0-9_\-.]+\b";

/// Generic payment / invoice / card terms found in French bank exports.
pub const DEFAULT_STOP_WORDS: &[&str] = &["carte", "cb", "du", "facture", "paiement"];

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TokenizerConfig {
    pub token_pattern: String,
    /// Inclusive (min, max) n-gram lengths
    pub ngram_range: (usize, usize),
    pub lowercase: bool,
    pub stop_words: Vec<String>,
}

impl Default for TokenizerConfig {
    fn default() -> Self {
        Self {
            token_pattern: DEFAULT_TOKEN_PATTERN.to_string(),
            ngram_range: (1, 3),
            lowercase: true,
            stop_words: DEFAULT_STOP_WORDS.iter().map(|s| s.to_string()).collect(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Tokenizer {
    pattern: Regex,
    ngram_range: (usize, usize),
    lowercase: bool,
    stop_words: HashSet<String>,
}

impl Tokenizer {
    pub fn new(config: &TokenizerConfig) -> Result<Self> {
        let (min, max) = config.ngram_range;
        if min == 0 || min > max {
            return Err(ClassifyError::InvalidNgramRange { min, max });
        }

        Ok(Self {
            pattern: Regex::new(&config.token_pattern)?,
            ngram_range: config.ngram_range,
            lowercase: config.lowercase,
            stop_words: config.stop_words.iter().cloned().collect(),
        })
    }

    pub fn is_stop_word(&self, word: &str) -> bool {
        self.stop_words.contains(word)
    }

    /// Words of `text` after case folding and stop-word removal, in order.
    pub fn words(&self, text: &str) -> Vec<String> {
        let folded;
        let text = if self.lowercase {
            folded = text.to_lowercase();
            folded.as_str()
        } else {
            text
        };

        self.pattern
            .find_iter(text)
            .map(|m| m.as_str())
            .filter(|w| !self.is_stop_word(w))
            .map(str::to_string)
            .collect()
    }

    /// All feature tokens of `text`: every n-gram for n in the configured
    /// range, shortest n first, left to right within each n.
    pub fn tokenize(&self, text: &str) -> Vec<String> {
        let words = self.words(text);
        let (min, max) = self.ngram_range;

        let mut tokens = Vec::new();
        for n in min..=max.min(words.len()) {
            for window in words.windows(n) {
                tokens.push(window.join(" "));
            }
        }
        tokens
    }
}
