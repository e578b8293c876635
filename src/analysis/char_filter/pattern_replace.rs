use regex::Regex;

use super::CharFilter;
use crate::error::{EduSolveError, Result};

/// Matches `http…`, `https…` and `www…` runs up to the next whitespace.
pub const URL_PATTERN: &str = r"http\S+|www\S+|https\S+";

/// Matches anything shaped like `user@host`.
pub const EMAIL_PATTERN: &str = r"\S+@\S+";

/// Matches every character that is not an ASCII letter or whitespace.
pub const NON_LETTER_PATTERN: &str = r"[^a-zA-Z\s]";

/// Matches runs of whitespace.
pub const WHITESPACE_PATTERN: &str = r"\s+";

/// A char filter that replaces every match of a regex pattern.
#[derive(Clone, Debug)]
pub struct PatternReplaceCharFilter {
    pattern: Regex,
    replacement: String,
    name: &'static str,
}

impl PatternReplaceCharFilter {
    /// Create a new pattern replace char filter.
    pub fn new(pattern: &str, replacement: &str) -> Result<Self> {
        Ok(Self {
            pattern: Regex::new(pattern)
                .map_err(|e| EduSolveError::analysis(format!("Invalid regex pattern: {e}")))?,
            replacement: replacement.to_string(),
            name: "pattern_replace",
        })
    }

    /// Filter that deletes URLs.
    pub fn strip_urls() -> Result<Self> {
        Ok(Self::new(URL_PATTERN, "")?.with_name("strip_urls"))
    }

    /// Filter that deletes email addresses.
    pub fn strip_emails() -> Result<Self> {
        Ok(Self::new(EMAIL_PATTERN, "")?.with_name("strip_emails"))
    }

    /// Filter that deletes digits, punctuation and any non-ASCII letter.
    pub fn strip_non_letters() -> Result<Self> {
        Ok(Self::new(NON_LETTER_PATTERN, "")?.with_name("strip_non_letters"))
    }

    /// Filter that collapses whitespace runs into a single space.
    pub fn collapse_whitespace() -> Result<Self> {
        Ok(Self::new(WHITESPACE_PATTERN, " ")?.with_name("collapse_whitespace"))
    }

    fn with_name(mut self, name: &'static str) -> Self {
        self.name = name;
        self
    }

    /// Get the regex pattern used by this filter.
    pub fn pattern(&self) -> &str {
        self.pattern.as_str()
    }
}

impl CharFilter for PatternReplaceCharFilter {
    fn filter(&self, input: &str) -> String {
        self.pattern
            .replace_all(input, self.replacement.as_str())
            .into_owned()
    }

    fn name(&self) -> &'static str {
        self.name
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pattern_replace() {
        let filter = PatternReplaceCharFilter::new(r"(\d+)", "NUM").unwrap();
        assert_eq!(filter.filter("Year 2024"), "Year NUM");
        assert_eq!(filter.name(), "pattern_replace");
    }

    #[test]
    fn test_strip_urls() {
        let filter = PatternReplaceCharFilter::strip_urls().unwrap();
        assert_eq!(
            filter.filter("see https://example.com/a?b=1 and www.wiki.org now"),
            "see  and  now"
        );
    }

    #[test]
    fn test_strip_emails() {
        let filter = PatternReplaceCharFilter::strip_emails().unwrap();
        assert_eq!(filter.filter("mail teacher@school.edu today"), "mail  today");
    }

    #[test]
    fn test_strip_non_letters() {
        let filter = PatternReplaceCharFilter::strip_non_letters().unwrap();
        assert_eq!(filter.filter("Solve 2x + 5 = 15!"), "Solve x    ");
        assert_eq!(filter.filter("Newton's café"), "Newtons caf");
    }

    #[test]
    fn test_collapse_whitespace() {
        let filter = PatternReplaceCharFilter::collapse_whitespace().unwrap();
        assert_eq!(filter.filter("a \t\n  b"), "a b");
        assert_eq!(filter.name(), "collapse_whitespace");
    }
}
