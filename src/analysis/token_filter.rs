//! Token filter implementations for token transformation.
//!
//! Filters receive the token stream produced by a tokenizer and return a new
//! stream. The question pipeline chains them as:
//!
//! ```text
//! Tokenizer → Lowercase → URL Remnants → Stop Words → Lemmatizer → Stop Words
//! ```
//!
//! # Available Filters
//!
//! - [`lowercase::LowercaseFilter`] - Converts tokens to lowercase
//! - [`stop::StopFilter`] - Removes stop words
//! - [`lemma::LemmaFilter`] - Reduces nouns to their dictionary form
//! - [`length::LengthFilter`] - Drops tokens below a minimum length
//! - [`url::UrlRemnantFilter`] - Cuts URL-shaped text that only appears after lowercasing
//!
//! # Examples
//!
//! ```
//! use edusolve::analysis::token_filter::Filter;
//! use edusolve::analysis::token_filter::lowercase::LowercaseFilter;
//! use edusolve::analysis::token::Token;
//!
//! let filter = LowercaseFilter::new();
//! let tokens = vec![Token::new("Hello", 0), Token::new("WORLD", 1)];
//! let filtered: Vec<_> = filter.filter(Box::new(tokens.into_iter()))
//!     .unwrap()
//!     .collect();
//!
//! assert_eq!(filtered[0].text, "hello");
//! assert_eq!(filtered[1].text, "world");
//! ```

use crate::analysis::token::TokenStream;
use crate::error::Result;

/// Trait for filters that transform token streams.
pub trait Filter: Send + Sync {
    /// Apply this filter to a token stream.
    fn filter(&self, tokens: TokenStream) -> Result<TokenStream>;

    /// Get the name of this filter.
    fn name(&self) -> &'static str;
}

pub mod lemma;
pub mod length;
pub mod lowercase;
pub mod stop;
pub mod url;

pub use lemma::LemmaFilter;
pub use length::LengthFilter;
pub use lowercase::LowercaseFilter;
pub use stop::StopFilter;
pub use url::UrlRemnantFilter;
