//! Text analysis for student questions.
//!
//! The building blocks (char filters, tokenizers and token filters) compose into
//! a [`analyzer::PipelineAnalyzer`]. [`normalizer::TextNormalizer`] wraps the
//! fixed question chain and produces the [`normalizer::NormalizedDocument`]
//! that every classifier consumes.

pub mod analyzer;
pub mod char_filter;
pub mod normalizer;
pub mod token;
pub mod token_filter;
pub mod tokenizer;

pub use normalizer::{NormalizedDocument, TextNormalizer};
