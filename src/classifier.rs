//! Question classification facade.
//!
//! [`QuestionClassifier`] runs the whole chain for one question: normalize,
//! predict the subject, revisit a low-confidence subject with the keyword
//! fallback, then predict the difficulty. [`QuestionClassifier::classify`]
//! always produces a result.
//!
//! # Examples
//!
//! ```no_run
//! use edusolve::classifier::QuestionClassifier;
//! use edusolve::config::ClassifierConfig;
//!
//! let classifier = QuestionClassifier::from_config(ClassifierConfig::default()).unwrap();
//! let result = classifier.classify("What is the derivative of x squared?");
//! println!("{} ({:.2})", result.subject, result.subject_confidence);
//! ```

use std::sync::Arc;

use log::{debug, warn};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::config::ClassifierConfig;
use crate::error::{EduSolveError, Result};
use crate::ml::corpus::TrainingRecord;
use crate::ml::keyword_fallback::{KeywordFallbackResolver, KeywordLexicon};
use crate::ml::registry::{InitOutcome, ModelRegistry};
use crate::ml::task::{DIFFICULTIES, GENERAL_SUBJECT, SUBJECTS, Task};

/// Subject and difficulty of one question.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuestionClassification {
    pub subject: String,
    pub subject_confidence: f64,
    pub difficulty: String,
    pub difficulty_confidence: f64,
}

impl QuestionClassification {
    /// Result reported when classification fails outright.
    pub fn general() -> Self {
        Self {
            subject: GENERAL_SUBJECT.to_string(),
            subject_confidence: 0.5,
            difficulty: Task::Difficulty.default_label().to_string(),
            difficulty_confidence: 0.5,
        }
    }
}

/// Outcome for one question of a batch.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BatchEntry {
    /// Position in the input.
    pub index: usize,
    pub question: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub classification: Option<QuestionClassification>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl BatchEntry {
    pub fn is_ok(&self) -> bool {
        self.classification.is_some()
    }
}

/// Label sets a classifier reports.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LabelSets {
    pub subjects: Vec<String>,
    pub difficulties: Vec<String>,
}

/// Trim `question` and check its length in characters.
pub fn validate_question<'a>(question: &'a str, config: &ClassifierConfig) -> Result<&'a str> {
    let trimmed = question.trim();
    let chars = trimmed.chars().count();
    if chars < config.min_question_chars {
        return Err(EduSolveError::invalid_argument(format!(
            "question must be at least {} characters",
            config.min_question_chars
        )));
    }
    if chars > config.max_question_chars {
        return Err(EduSolveError::invalid_argument(format!(
            "question must be at most {} characters",
            config.max_question_chars
        )));
    }
    Ok(trimmed)
}

/// Classifies questions by subject and difficulty.
#[derive(Debug, Clone)]
pub struct QuestionClassifier {
    registry: Arc<ModelRegistry>,
    resolver: KeywordFallbackResolver,
}

impl QuestionClassifier {
    /// Classifier over `registry` with the default keyword lexicon.
    pub fn new(registry: Arc<ModelRegistry>) -> Result<Self> {
        Self::with_lexicon(registry, &KeywordLexicon::default())
    }

    /// Classifier over `registry` with a custom keyword lexicon.
    pub fn with_lexicon(registry: Arc<ModelRegistry>, lexicon: &KeywordLexicon) -> Result<Self> {
        let resolver =
            KeywordFallbackResolver::new(lexicon, registry.config().low_confidence_threshold)?;
        Ok(Self { registry, resolver })
    }

    /// Classifier with its own registry built from `config`.
    pub fn from_config(config: ClassifierConfig) -> Result<Self> {
        config.validate()?;
        Self::new(Arc::new(ModelRegistry::new(config)?))
    }

    pub fn registry(&self) -> &Arc<ModelRegistry> {
        &self.registry
    }

    pub fn config(&self) -> &ClassifierConfig {
        self.registry.config()
    }

    /// Classify one question. Never fails.
    pub fn classify(&self, question: &str) -> QuestionClassification {
        match self.try_classify(question) {
            Ok(result) => result,
            Err(e) => {
                warn!("Classification failed, reporting {GENERAL_SUBJECT}: {e}");
                QuestionClassification::general()
            }
        }
    }

    /// Classify one question, propagating normalization errors.
    pub fn try_classify(&self, question: &str) -> Result<QuestionClassification> {
        let document = self.registry.normalizer().normalize(question)?;
        debug!("Normalized question: {:?}", document.cleaned_text);

        let predicted = self.registry.get(Task::Subject).predict(&document);
        let subject = self.resolver.resolve(question, predicted);
        let difficulty = self.registry.get(Task::Difficulty).predict(&document);

        Ok(QuestionClassification {
            subject: subject.label,
            subject_confidence: subject.confidence,
            difficulty: difficulty.label,
            difficulty_confidence: difficulty.confidence,
        })
    }

    /// Trim and length-check `question` against the configured bounds.
    pub fn validate<'a>(&self, question: &'a str) -> Result<&'a str> {
        validate_question(question, self.config())
    }

    /// Classify up to `max_batch_size` questions. Each question is validated
    /// on its own; invalid ones get an error entry. Entries keep input order.
    pub fn classify_batch<S: AsRef<str> + Sync>(&self, questions: &[S]) -> Result<Vec<BatchEntry>> {
        if questions.is_empty() {
            return Err(EduSolveError::invalid_argument("batch is empty"));
        }
        let limit = self.config().max_batch_size;
        if questions.len() > limit {
            return Err(EduSolveError::invalid_argument(format!(
                "batch of {} questions exceeds the limit of {limit}",
                questions.len()
            )));
        }

        // initialize both slots before fanning out
        self.registry.warm_up();

        let entries = questions
            .par_iter()
            .enumerate()
            .map(|(index, question)| {
                let question = question.as_ref();
                match self.validate(question) {
                    Ok(valid) => BatchEntry {
                        index,
                        question: question.to_string(),
                        classification: Some(self.classify(valid)),
                        error: None,
                    },
                    Err(e) => BatchEntry {
                        index,
                        question: question.to_string(),
                        classification: None,
                        error: Some(e.to_string()),
                    },
                }
            })
            .collect();
        Ok(entries)
    }

    /// Retrain both models on `records` and swap them in.
    pub fn retrain(&self, records: &[TrainingRecord]) -> Result<Vec<(Task, InitOutcome)>> {
        self.registry.retrain(records)
    }

    /// All labels this classifier can report.
    pub fn labels(&self) -> LabelSets {
        LabelSets {
            subjects: SUBJECTS.iter().map(|s| s.to_string()).collect(),
            difficulties: DIFFICULTIES.iter().map(|s| s.to_string()).collect(),
        }
    }
}
