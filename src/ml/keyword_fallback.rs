//! Keyword fallback for low-confidence subject predictions.
//!
//! When the subject model is unsure, the raw question is scanned for curated
//! per-subject keywords. Matching is whole-word (`\bkeyword\b`), so
//! "cartography" does not count as "art". The subject with the most distinct
//! keyword hits wins. On a tie the subject declared first in the lexicon wins.
//!
//! # Examples
//!
//! ```
//! use edusolve::ml::keyword_fallback::KeywordFallbackResolver;
//! use edusolve::ml::model::ClassificationResult;
//!
//! let resolver = KeywordFallbackResolver::with_defaults(0.40).unwrap();
//! let result = resolver.resolve(
//!     "What is the capital of France?",
//!     ClassificationResult::new("Mathematics", 0.2),
//! );
//! assert_eq!(result.label, "Geography");
//! assert!((result.confidence - 0.65).abs() < 1e-12);
//! ```

use log::{debug, info};
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::{EduSolveError, Result};
use crate::ml::model::ClassificationResult;

/// Confidence assigned before any keyword is counted.
const BASE_CONFIDENCE: f64 = 0.50;
/// Confidence added per matched keyword.
const CONFIDENCE_PER_MATCH: f64 = 0.15;
/// Upper bound for a keyword-derived confidence.
const MAX_CONFIDENCE: f64 = 0.75;

/// Ordered list of subjects and their keywords.
///
/// Declaration order is the tie-break order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeywordLexicon {
    entries: Vec<(String, Vec<String>)>,
}

impl KeywordLexicon {
    pub fn new(entries: Vec<(String, Vec<String>)>) -> Self {
        Self { entries }
    }

    pub fn entries(&self) -> &[(String, Vec<String>)] {
        &self.entries
    }

    pub fn subjects(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(subject, _)| subject.as_str())
    }
}

impl Default for KeywordLexicon {
    fn default() -> Self {
        let table: &[(&str, &[&str])] = &[
            (
                "Computer Science",
                &[
                    "python", "java", "code", "programming", "algorithm", "function", "variable",
                    "loop", "array", "class", "object", "software", "database", "api", "html",
                    "css", "javascript", "computer",
                ],
            ),
            (
                "Mathematics",
                &[
                    "calculus", "derivative", "integral", "algebra", "equation", "solve",
                    "calculate", "theorem", "proof", "matrix", "vector", "geometry",
                    "trigonometry", "statistics", "probability",
                ],
            ),
            (
                "Biology",
                &[
                    "cell", "dna", "photosynthesis", "evolution", "organism", "bacteria", "virus",
                    "protein", "gene", "biology", "species",
                ],
            ),
            (
                "Chemistry",
                &[
                    "atom", "molecule", "chemical", "reaction", "element", "compound", "bond",
                    "acid", "base", "chemistry", "periodic",
                ],
            ),
            (
                "Physics",
                &[
                    "force", "velocity", "acceleration", "energy", "motion", "gravity", "wave",
                    "electricity", "physics", "momentum",
                ],
            ),
            (
                "English",
                &[
                    "shakespeare", "poem", "novel", "literature", "author", "metaphor", "grammar",
                    "writing", "essay", "story",
                ],
            ),
            (
                "History",
                &[
                    "war", "ancient", "empire", "civilization", "century", "revolution",
                    "historical", "history", "president",
                ],
            ),
            (
                "Geography",
                &[
                    "capital", "country", "continent", "ocean", "mountain", "river", "climate",
                    "geography", "map", "location",
                ],
            ),
        ];

        Self::new(
            table
                .iter()
                .map(|(subject, keywords)| {
                    (
                        subject.to_string(),
                        keywords.iter().map(|k| k.to_string()).collect(),
                    )
                })
                .collect(),
        )
    }
}

/// Applies the keyword lexicon below a confidence threshold.
#[derive(Debug, Clone)]
pub struct KeywordFallbackResolver {
    threshold: f64,
    /// Compiled whole-word patterns, in lexicon order.
    patterns: Vec<(String, Vec<Regex>)>,
}

impl KeywordFallbackResolver {
    /// Compile `lexicon`. Predictions below `threshold` are re-examined.
    pub fn new(lexicon: &KeywordLexicon, threshold: f64) -> Result<Self> {
        let patterns = lexicon
            .entries()
            .iter()
            .map(|(subject, keywords)| {
                let compiled = keywords
                    .iter()
                    .map(|keyword| {
                        Regex::new(&format!(r"\b{}\b", regex::escape(&keyword.to_lowercase())))
                            .map_err(|e| {
                                EduSolveError::invalid_config(format!(
                                    "keyword '{keyword}' for {subject}: {e}"
                                ))
                            })
                    })
                    .collect::<Result<Vec<_>>>()?;
                Ok((subject.clone(), compiled))
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            threshold,
            patterns,
        })
    }

    /// Resolver over the default lexicon.
    pub fn with_defaults(threshold: f64) -> Result<Self> {
        Self::new(&KeywordLexicon::default(), threshold)
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    /// Best-matching subject and its distinct keyword count, if any keyword hits.
    pub fn best_match(&self, text: &str) -> Option<(&str, usize)> {
        let lowered = text.to_lowercase();
        let mut best: Option<(&str, usize)> = None;

        for (subject, keywords) in &self.patterns {
            let count = keywords.iter().filter(|re| re.is_match(&lowered)).count();
            if count > 0 && best.is_none_or(|(_, best_count)| count > best_count) {
                best = Some((subject.as_str(), count));
            }
        }
        best
    }

    /// Keep `predicted` unless its confidence is below the threshold and the
    /// question matches a subject's keywords.
    pub fn resolve(&self, raw_text: &str, predicted: ClassificationResult) -> ClassificationResult {
        if predicted.confidence >= self.threshold {
            return predicted;
        }

        match self.best_match(raw_text) {
            Some((subject, count)) => {
                let confidence =
                    (BASE_CONFIDENCE + CONFIDENCE_PER_MATCH * count as f64).min(MAX_CONFIDENCE);
                info!(
                    "Keyword fallback: {} ({:.2}) -> {} ({:.2}), {} keyword(s)",
                    predicted.label, predicted.confidence, subject, confidence, count
                );
                ClassificationResult::new(subject, confidence)
            }
            None => {
                debug!(
                    "Keyword fallback found no keywords, keeping {} ({:.2})",
                    predicted.label, predicted.confidence
                );
                predicted
            }
        }
    }
}
