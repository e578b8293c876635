//! # EduSolve
//!
//! Subject and difficulty classification for free-text student questions.
//!
//! ## Features
//!
//! - Text analysis pipeline: char filters, tokenizers and token filters
//! - TF-IDF n-gram features with a frozen vocabulary
//! - Gradient boosting (subject) and random forest (difficulty) classifiers
//! - Keyword fallback for low-confidence subject predictions
//! - JSON model persistence with lazy, swappable per-task models
//!
//! ```no_run
//! use edusolve::prelude::*;
//!
//! let classifier = QuestionClassifier::from_config(ClassifierConfig::default()).unwrap();
//! let result = classifier.classify("Explain the structure of an atom");
//! assert!((0.0..=1.0).contains(&result.subject_confidence));
//! ```

pub mod analysis;
pub mod classifier;
pub mod cli;
pub mod config;
pub mod error;
pub mod ml;

pub mod prelude {
    pub use crate::analysis::{NormalizedDocument, TextNormalizer};
    pub use crate::classifier::{BatchEntry, QuestionClassification, QuestionClassifier};
    pub use crate::config::ClassifierConfig;
    pub use crate::error::{EduSolveError, Result};
    pub use crate::ml::{ClassificationResult, InitOutcome, ModelRegistry, Task, TrainingRecord};
}

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
