//! URL remnant filter implementation.
//!
//! The URL char filter is case-sensitive and runs before punctuation is
//! stripped, so `HTTPClient` or `w.wwhat` slip past it and only look like a
//! URL once lowercased. This filter applies the same pattern to each token,
//! keeping the part before the match and dropping tokens left empty.

use regex::Regex;

use crate::analysis::char_filter::pattern_replace::URL_PATTERN;
use crate::analysis::token::{Token, TokenStream};
use crate::analysis::token_filter::Filter;
use crate::error::{EduSolveError, Result};

/// A filter that cuts URL-shaped text out of tokens.
#[derive(Clone, Debug)]
pub struct UrlRemnantFilter {
    pattern: Regex,
}

impl UrlRemnantFilter {
    /// Create a filter matching the URL char filter's pattern.
    pub fn new() -> Result<Self> {
        let pattern = Regex::new(URL_PATTERN)
            .map_err(|e| EduSolveError::analysis(format!("Invalid regex pattern: {e}")))?;
        Ok(UrlRemnantFilter { pattern })
    }
}

impl Filter for UrlRemnantFilter {
    fn filter(&self, tokens: TokenStream) -> Result<TokenStream> {
        let filtered_tokens: Vec<Token> = tokens
            .filter_map(|token| {
                if token.is_stopped() {
                    return Some(token);
                }
                match self.pattern.find(&token.text) {
                    None => Some(token),
                    Some(m) if m.start() == 0 => None,
                    Some(m) => Some(token.with_text(&token.text[..m.start()])),
                }
            })
            .collect();

        Ok(Box::new(filtered_tokens.into_iter()))
    }

    fn name(&self) -> &'static str {
        "url_remnant"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_url_remnant_filter() {
        let filter = UrlRemnantFilter::new().unwrap();
        let tokens = vec![
            Token::new("httpclient", 0),
            Token::new("wwwhat", 1),
            Token::new("class", 2),
            Token::new("xhttpy", 3),
            Token::new("http", 4),
        ];

        let result: Vec<String> = filter
            .filter(Box::new(tokens.into_iter()))
            .unwrap()
            .map(|t| t.text)
            .collect();

        assert_eq!(result, vec!["class", "x", "http"]);
        assert_eq!(filter.name(), "url_remnant");
    }
}
