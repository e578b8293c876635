//! Question text normalization.
//!
//! Turns a raw question into a [`NormalizedDocument`]: the canonical token
//! sequence and the tokens joined by single spaces. Every token is lowercase
//! ASCII alphabetic and normalizing `cleaned_text` again returns it unchanged.
//!
//! # Examples
//!
//! ```
//! use edusolve::analysis::normalizer::TextNormalizer;
//!
//! let normalizer = TextNormalizer::new().unwrap();
//! let doc = normalizer.normalize("How do plants perform photosynthesis?").unwrap();
//!
//! assert_eq!(doc.cleaned_text, "plant perform photosynthesis");
//! assert_eq!(doc.tokens, vec!["plant", "perform", "photosynthesis"]);
//! ```

use log::warn;
use serde::{Deserialize, Serialize};

use crate::analysis::analyzer::{Analyzer, QuestionAnalyzer};
use crate::analysis::tokenizer::WhitespaceTokenizer;
use crate::error::Result;

/// Below this many characters of cleaned text a question carries no usable signal.
pub const MIN_SIGNAL_CHARS: usize = 2;

/// The normalized form of a question.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NormalizedDocument {
    /// Tokens joined by single spaces.
    pub cleaned_text: String,
    /// Canonical token sequence.
    pub tokens: Vec<String>,
}

impl NormalizedDocument {
    fn from_tokens(tokens: Vec<String>) -> Self {
        NormalizedDocument {
            cleaned_text: tokens.join(" "),
            tokens,
        }
    }

    /// Whether the cleaned text is too short to classify.
    pub fn is_insufficient(&self) -> bool {
        self.cleaned_text.chars().count() < MIN_SIGNAL_CHARS
    }
}

/// Normalizes question text through the question analysis chain.
#[derive(Clone, Debug)]
pub struct TextNormalizer {
    analyzer: QuestionAnalyzer,
}

impl TextNormalizer {
    /// Create a normalizer with the standard question analyzer.
    pub fn new() -> Result<Self> {
        Ok(TextNormalizer {
            analyzer: QuestionAnalyzer::new()?,
        })
    }

    /// Normalize `text`, propagating any analysis error.
    pub fn normalize(&self, text: &str) -> Result<NormalizedDocument> {
        let tokens = self.analyzer.analyze(text)?.map(|t| t.text).collect();
        Ok(NormalizedDocument::from_tokens(tokens))
    }

    /// Normalize `text`, falling back to a plain whitespace split of the
    /// original string if analysis fails.
    pub fn normalize_lenient(&self, text: &str) -> NormalizedDocument {
        match self.normalize(text) {
            Ok(doc) => doc,
            Err(e) => {
                warn!("Text normalization failed, using raw text: {e}");
                NormalizedDocument {
                    cleaned_text: text.to_string(),
                    tokens: WhitespaceTokenizer::split(text),
                }
            }
        }
    }
}
