//! The analysis chain applied to every student question.
//!
//! ```text
//! strip URLs → strip emails → strip non-letters → collapse whitespace
//!   → UAX #29 words → lowercase → URL remnants → stop words → lemmatize
//!   → stop words
//! ```
//!
//! The trailing stop pass drops lemmas such as `will` (from `wills`) that only
//! become stop words after lemmatization, so analyzing the joined output a
//! second time changes nothing. The URL remnant pass catches text such as
//! `HTTPClient` that only matches the URL pattern once lowercased.

use std::sync::Arc;

use crate::analysis::analyzer::Analyzer;
use crate::analysis::analyzer::pipeline::PipelineAnalyzer;
use crate::analysis::char_filter::pattern_replace::PatternReplaceCharFilter;
use crate::analysis::token::TokenStream;
use crate::analysis::token_filter::{LemmaFilter, LowercaseFilter, StopFilter, UrlRemnantFilter};
use crate::analysis::tokenizer::UnicodeWordTokenizer;
use crate::error::Result;

/// Analyzer for free-text student questions.
#[derive(Clone, Debug)]
pub struct QuestionAnalyzer {
    inner: PipelineAnalyzer,
}

impl QuestionAnalyzer {
    /// Build the question analysis chain.
    pub fn new() -> Result<Self> {
        let stop = Arc::new(StopFilter::new());
        let inner = PipelineAnalyzer::new(Arc::new(UnicodeWordTokenizer::new()))
            .add_char_filter(Arc::new(PatternReplaceCharFilter::strip_urls()?))
            .add_char_filter(Arc::new(PatternReplaceCharFilter::strip_emails()?))
            .add_char_filter(Arc::new(PatternReplaceCharFilter::strip_non_letters()?))
            .add_char_filter(Arc::new(PatternReplaceCharFilter::collapse_whitespace()?))
            .add_filter(Arc::new(LowercaseFilter::new()))
            .add_filter(Arc::new(UrlRemnantFilter::new()?))
            .add_filter(stop.clone())
            .add_filter(Arc::new(LemmaFilter::new()))
            .add_filter(stop)
            .with_name("question");

        Ok(QuestionAnalyzer { inner })
    }

    /// The underlying pipeline.
    pub fn pipeline(&self) -> &PipelineAnalyzer {
        &self.inner
    }
}

impl Analyzer for QuestionAnalyzer {
    fn analyze(&self, text: &str) -> Result<TokenStream> {
        self.inner.analyze(text)
    }

    fn name(&self) -> &str {
        self.inner.name()
    }
}
