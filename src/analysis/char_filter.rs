//! Char filter implementations for text cleaning.
//!
//! Char filters rewrite the raw string before it reaches the tokenizer. The
//! question pipeline uses them to strip URLs, email addresses and every
//! non-letter character, and to collapse runs of whitespace.
//!
//! # Examples
//!
//! ```
//! use edusolve::analysis::char_filter::CharFilter;
//! use edusolve::analysis::char_filter::pattern_replace::PatternReplaceCharFilter;
//!
//! let filter = PatternReplaceCharFilter::new(r"\d+", "").unwrap();
//! assert_eq!(filter.filter("Solve 2x + 5"), "Solve x + ");
//! ```

/// Trait for character filters that transform text before tokenization.
pub trait CharFilter: Send + Sync {
    /// Apply this filter to the input text and return the rewritten text.
    fn filter(&self, input: &str) -> String;

    /// Get the name of this char filter.
    fn name(&self) -> &'static str;
}

pub mod pattern_replace;
