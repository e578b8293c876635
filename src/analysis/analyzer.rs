//! Analyzers that combine char filters, a tokenizer and token filters.
//!
//! - [`pipeline::PipelineAnalyzer`] - Generic configurable pipeline
//! - [`question::QuestionAnalyzer`] - The fixed pipeline for student questions

use crate::analysis::token::TokenStream;
use crate::error::Result;

/// Trait for analyzers that convert text into processed tokens.
pub trait Analyzer: Send + Sync {
    /// Analyze the given text and return a stream of tokens.
    fn analyze(&self, text: &str) -> Result<TokenStream>;

    /// Get the name of this analyzer (for debugging and configuration).
    fn name(&self) -> &str;
}

pub mod pipeline;
pub mod question;

pub use pipeline::PipelineAnalyzer;
pub use question::QuestionAnalyzer;
