//! Whitespace tokenizer implementation.
//!
//! The simplest possible split. The normalizer falls back to it when the full
//! analysis pipeline fails.

use crate::analysis::token::{Token, TokenStream};
use crate::analysis::tokenizer::Tokenizer;
use crate::error::Result;

/// A tokenizer that splits text on whitespace.
#[derive(Clone, Debug, Default)]
pub struct WhitespaceTokenizer;

impl WhitespaceTokenizer {
    /// Create a new whitespace tokenizer.
    pub fn new() -> Self {
        WhitespaceTokenizer
    }

    /// Split without going through the token stream machinery.
    pub fn split(text: &str) -> Vec<String> {
        text.split_whitespace().map(str::to_string).collect()
    }
}

impl Tokenizer for WhitespaceTokenizer {
    fn tokenize(&self, text: &str) -> Result<TokenStream> {
        let mut tokens = Vec::new();
        let mut position = 0;
        let mut start: Option<usize> = None;

        for (idx, ch) in text.char_indices() {
            if ch.is_whitespace() {
                if let Some(s) = start.take() {
                    tokens.push(Token::with_offsets(&text[s..idx], position, s, idx));
                    position += 1;
                }
            } else if start.is_none() {
                start = Some(idx);
            }
        }

        if let Some(s) = start {
            tokens.push(Token::with_offsets(&text[s..], position, s, text.len()));
        }

        Ok(Box::new(tokens.into_iter()))
    }

    fn name(&self) -> &'static str {
        "whitespace"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_whitespace_tokenizer() {
        let tokenizer = WhitespaceTokenizer::new();
        let tokens: Vec<Token> = tokenizer.tokenize("  what is\tDNA? ").unwrap().collect();

        assert_eq!(tokens.len(), 3);
        assert_eq!(tokens[0].text, "what");
        assert_eq!(tokens[0].start_offset, 2);
        assert_eq!(tokens[2].text, "DNA?");
        assert_eq!(tokens[2].position, 2);
        assert_eq!(tokens[2].end_offset, 14);
    }

    #[test]
    fn test_split_helper() {
        assert_eq!(
            WhitespaceTokenizer::split("a  b\nc"),
            vec!["a".to_string(), "b".to_string(), "c".to_string()]
        );
    }
}
