//! TF-IDF vectorizer over word n-grams.
//!
//! Fitting counts n-grams per document, prunes terms by document frequency,
//! keeps the `max_features` most frequent terms and assigns columns in
//! lexicographic term order. Transforming uses raw counts, smoothed IDF
//! `ln((1 + n) / (1 + df)) + 1` and L2 row normalization. The vocabulary is
//! frozen after fitting: unseen n-grams get zero weight.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use log::debug;
use serde::{Deserialize, Serialize};

use crate::analysis::analyzer::{Analyzer, PipelineAnalyzer};
use crate::analysis::token_filter::{LengthFilter, StopFilter};
use crate::analysis::tokenizer::WhitespaceTokenizer;
use crate::error::{EduSolveError, Result};
use crate::ml::MLError;

/// Configuration for a [`TfIdfVectorizer`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VectorizerConfig {
    /// Smallest and largest n-gram length, inclusive.
    pub ngram_range: (usize, usize),
    /// Keep at most this many terms, ranked by corpus term frequency.
    pub max_features: Option<usize>,
    /// Drop terms that occur in fewer documents than this.
    pub min_df: usize,
    /// Drop terms that occur in more than this fraction of documents.
    pub max_df: f64,
    /// Remove the extended English stop words before building n-grams.
    pub remove_stop_words: bool,
    /// Tokens shorter than this are ignored.
    pub min_token_chars: usize,
}

impl VectorizerConfig {
    /// Settings used by the subject model.
    pub fn subject() -> Self {
        Self {
            ngram_range: (1, 3),
            max_features: Some(200),
            min_df: 1,
            max_df: 0.95,
            remove_stop_words: true,
            min_token_chars: 2,
        }
    }

    /// Settings used by the difficulty model.
    pub fn difficulty() -> Self {
        Self {
            ngram_range: (1, 2),
            max_features: Some(150),
            min_df: 1,
            max_df: 0.95,
            remove_stop_words: false,
            min_token_chars: 2,
        }
    }
}

impl Default for VectorizerConfig {
    fn default() -> Self {
        Self::subject()
    }
}

#[derive(Serialize, Deserialize)]
struct VectorizerState {
    config: VectorizerConfig,
    vocabulary: BTreeMap<String, usize>,
    idf: Vec<f64>,
    n_documents: usize,
}

/// TF-IDF vectorizer for text feature extraction.
#[derive(Clone, Serialize, Deserialize)]
#[serde(from = "VectorizerState", into = "VectorizerState")]
pub struct TfIdfVectorizer {
    config: VectorizerConfig,
    /// Term -> column.
    vocabulary: BTreeMap<String, usize>,
    /// Inverse document frequency per column.
    idf: Vec<f64>,
    /// Number of documents seen during fitting.
    n_documents: usize,
    analyzer: PipelineAnalyzer,
}

impl std::fmt::Debug for TfIdfVectorizer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TfIdfVectorizer")
            .field("config", &self.config)
            .field("vocabulary_size", &self.vocabulary.len())
            .field("n_documents", &self.n_documents)
            .field("analyzer", &self.analyzer.name())
            .finish()
    }
}

impl From<VectorizerState> for TfIdfVectorizer {
    fn from(state: VectorizerState) -> Self {
        let analyzer = Self::build_analyzer(&state.config);
        Self {
            config: state.config,
            vocabulary: state.vocabulary,
            idf: state.idf,
            n_documents: state.n_documents,
            analyzer,
        }
    }
}

impl From<TfIdfVectorizer> for VectorizerState {
    fn from(vectorizer: TfIdfVectorizer) -> Self {
        Self {
            config: vectorizer.config,
            vocabulary: vectorizer.vocabulary,
            idf: vectorizer.idf,
            n_documents: vectorizer.n_documents,
        }
    }
}

impl TfIdfVectorizer {
    /// Create an unfitted vectorizer.
    pub fn new(config: VectorizerConfig) -> Self {
        let analyzer = Self::build_analyzer(&config);
        Self {
            config,
            vocabulary: BTreeMap::new(),
            idf: Vec::new(),
            n_documents: 0,
            analyzer,
        }
    }

    fn build_analyzer(config: &VectorizerConfig) -> PipelineAnalyzer {
        let analyzer = PipelineAnalyzer::new(Arc::new(WhitespaceTokenizer::new()))
            .add_filter(Arc::new(LengthFilter::new(config.min_token_chars)))
            .with_name("tfidf");

        if config.remove_stop_words {
            analyzer.add_filter(Arc::new(StopFilter::extended()))
        } else {
            analyzer
        }
    }

    /// Fit the vocabulary and IDF weights on normalized documents.
    pub fn fit(&mut self, documents: &[String]) -> Result<()> {
        if documents.is_empty() {
            return Err(MLError::InsufficientTrainingData {
                min_samples: 1,
                actual: 0,
            }
            .into());
        }

        let n_documents = documents.len();
        let mut document_frequency: BTreeMap<String, usize> = BTreeMap::new();
        let mut term_frequency: HashMap<String, usize> = HashMap::new();

        for doc in documents {
            for (term, count) in self.count_ngrams(doc)? {
                *term_frequency.entry(term.clone()).or_insert(0) += count;
                *document_frequency.entry(term).or_insert(0) += 1;
            }
        }

        let max_doc_count = self.config.max_df * n_documents as f64;
        let min_doc_count = self.config.min_df;
        if max_doc_count < min_doc_count as f64 {
            return Err(MLError::TrainingFailed {
                message: "max_df corresponds to fewer documents than min_df".to_string(),
            }
            .into());
        }

        // BTreeMap iteration keeps candidates in lexicographic order
        let mut kept: Vec<(String, usize)> = document_frequency
            .iter()
            .filter(|&(_, &df)| df as f64 <= max_doc_count && df >= min_doc_count)
            .map(|(term, _)| (term.clone(), term_frequency.get(term).copied().unwrap_or(0)))
            .collect();

        if let Some(limit) = self.config.max_features {
            // stable sort, so equal frequencies stay in term order
            kept.sort_by(|a, b| b.1.cmp(&a.1));
            kept.truncate(limit);
            kept.sort_by(|a, b| a.0.cmp(&b.0));
        }

        if kept.is_empty() {
            return Err(MLError::TrainingFailed {
                message: "After pruning, no terms remain".to_string(),
            }
            .into());
        }

        let vocabulary: BTreeMap<String, usize> = kept
            .into_iter()
            .enumerate()
            .map(|(idx, (term, _))| (term, idx))
            .collect();

        let mut idf = vec![0.0; vocabulary.len()];
        for (term, &idx) in &vocabulary {
            let df = document_frequency.get(term).copied().unwrap_or(0);
            idf[idx] = ((1.0 + n_documents as f64) / (1.0 + df as f64)).ln() + 1.0;
        }

        debug!(
            "Fitted TF-IDF vocabulary: {} terms from {} documents",
            vocabulary.len(),
            n_documents
        );

        self.vocabulary = vocabulary;
        self.idf = idf;
        self.n_documents = n_documents;

        Ok(())
    }

    /// Transform a normalized document into an L2-normalized TF-IDF vector.
    pub fn transform(&self, document: &str) -> Result<Vec<f64>> {
        if !self.is_fitted() {
            return Err(MLError::ModelNotTrained {
                message: "TF-IDF vectorizer has no vocabulary".to_string(),
            }
            .into());
        }

        let mut features = vec![0.0; self.vocabulary.len()];
        for (term, count) in self.count_ngrams(document)? {
            if let Some(&idx) = self.vocabulary.get(&term) {
                let (Some(slot), Some(idf)) = (features.get_mut(idx), self.idf.get(idx)) else {
                    return Err(MLError::InvalidFeatureVector {
                        message: format!("term '{term}' maps to column {idx} out of range"),
                    }
                    .into());
                };
                *slot = count as f64 * idf;
            }
        }

        let norm = features.iter().map(|v| v * v).sum::<f64>().sqrt();
        if norm > 0.0 {
            for value in &mut features {
                *value /= norm;
            }
        }

        Ok(features)
    }

    /// Fit on `documents` and return their feature vectors.
    pub fn fit_transform(&mut self, documents: &[String]) -> Result<Vec<Vec<f64>>> {
        self.fit(documents)?;
        documents.iter().map(|doc| self.transform(doc)).collect()
    }

    fn count_ngrams(&self, text: &str) -> Result<HashMap<String, usize>> {
        let tokens: Vec<String> = self.analyzer.analyze(text)?.map(|t| t.text).collect();
        let (min_n, max_n) = self.config.ngram_range;

        let mut counts = HashMap::new();
        for n in min_n.max(1)..=max_n {
            for window in tokens.windows(n) {
                *counts.entry(window.join(" ")).or_insert(0) += 1;
            }
        }
        Ok(counts)
    }

    /// Check that the vocabulary columns are exactly `0..len` and every
    /// column has a finite IDF weight.
    pub fn validate(&self) -> Result<()> {
        let invalid = |message: String| -> EduSolveError {
            MLError::InvalidFeatureVector { message }.into()
        };

        if self.idf.len() != self.vocabulary.len() {
            return Err(invalid(format!(
                "{} IDF weights for {} terms",
                self.idf.len(),
                self.vocabulary.len()
            )));
        }
        let mut seen = vec![false; self.vocabulary.len()];
        for (term, &idx) in &self.vocabulary {
            match seen.get_mut(idx) {
                Some(slot) if !*slot => *slot = true,
                Some(_) => return Err(invalid(format!("column {idx} is assigned twice"))),
                None => {
                    return Err(invalid(format!(
                        "term '{term}' maps to column {idx} out of range"
                    )));
                }
            }
        }
        if self.idf.iter().any(|w| !w.is_finite()) {
            return Err(invalid("non-finite IDF weight".to_string()));
        }
        Ok(())
    }

    pub fn is_fitted(&self) -> bool {
        !self.vocabulary.is_empty()
    }

    /// Get the size of the vocabulary.
    pub fn vocabulary_size(&self) -> usize {
        self.vocabulary.len()
    }

    /// Terms in column order.
    pub fn terms(&self) -> Vec<&str> {
        let mut terms = vec![""; self.vocabulary.len()];
        for (term, &idx) in &self.vocabulary {
            if let Some(slot) = terms.get_mut(idx) {
                *slot = term.as_str();
            }
        }
        terms
    }

    pub fn idf(&self) -> &[f64] {
        &self.idf
    }

    pub fn config(&self) -> &VectorizerConfig {
        &self.config
    }
}
