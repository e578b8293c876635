//! Classifier configuration.
//!
//! Every field has a default, so a configuration file only needs the keys it
//! changes:
//!
//! ```
//! use edusolve::config::ClassifierConfig;
//!
//! let config: ClassifierConfig =
//!     serde_json::from_str(r#"{"low_confidence_threshold": 0.3}"#).unwrap();
//! assert_eq!(config.low_confidence_threshold, 0.3);
//! assert_eq!(config.max_batch_size, 100);
//! ```

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{EduSolveError, Result};
use crate::ml::gradient_boosting::GradientBoostingConfig;
use crate::ml::random_forest::RandomForestConfig;
use crate::ml::task::Task;
use crate::ml::vectorizer::VectorizerConfig;

/// Configuration for training, persistence and classification.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassifierConfig {
    /// Directory holding persisted models.
    pub models_dir: PathBuf,
    /// Subject predictions below this confidence go through the keyword fallback.
    pub low_confidence_threshold: f64,
    /// Training on fewer samples logs a warning.
    pub min_recommended_samples: usize,
    /// Maximum number of questions per batch.
    pub max_batch_size: usize,
    /// Shortest accepted question, in characters after trimming.
    pub min_question_chars: usize,
    /// Longest accepted question, in characters after trimming.
    pub max_question_chars: usize,
    pub subject_vectorizer: VectorizerConfig,
    pub difficulty_vectorizer: VectorizerConfig,
    pub subject_model: GradientBoostingConfig,
    pub difficulty_model: RandomForestConfig,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            models_dir: PathBuf::from("./models"),
            low_confidence_threshold: 0.40,
            min_recommended_samples: 5,
            max_batch_size: 100,
            min_question_chars: 3,
            max_question_chars: 5000,
            subject_vectorizer: VectorizerConfig::subject(),
            difficulty_vectorizer: VectorizerConfig::difficulty(),
            subject_model: GradientBoostingConfig::default(),
            difficulty_model: RandomForestConfig::default(),
        }
    }
}

impl ClassifierConfig {
    /// Read a JSON configuration file.
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Use `dir` for persisted models.
    pub fn with_models_dir<P: Into<PathBuf>>(mut self, dir: P) -> Self {
        self.models_dir = dir.into();
        self
    }

    /// Vectorizer settings for `task`.
    pub fn vectorizer(&self, task: Task) -> &VectorizerConfig {
        match task {
            Task::Subject => &self.subject_vectorizer,
            Task::Difficulty => &self.difficulty_vectorizer,
        }
    }

    /// Reject settings no classifier could run with.
    pub fn validate(&self) -> Result<()> {
        if !(0.0..=1.0).contains(&self.low_confidence_threshold) {
            return Err(EduSolveError::invalid_config(format!(
                "low_confidence_threshold must be within [0, 1], got {}",
                self.low_confidence_threshold
            )));
        }
        if self.min_question_chars > self.max_question_chars {
            return Err(EduSolveError::invalid_config(
                "min_question_chars exceeds max_question_chars",
            ));
        }
        if self.max_batch_size == 0 {
            return Err(EduSolveError::invalid_config("max_batch_size must be positive"));
        }
        for (name, vectorizer) in [
            ("subject_vectorizer", &self.subject_vectorizer),
            ("difficulty_vectorizer", &self.difficulty_vectorizer),
        ] {
            let (min_n, max_n) = vectorizer.ngram_range;
            if min_n == 0 || min_n > max_n {
                return Err(EduSolveError::invalid_config(format!(
                    "{name}.ngram_range must satisfy 1 <= min <= max"
                )));
            }
            if vectorizer.max_df <= 0.0 || vectorizer.max_df > 1.0 {
                return Err(EduSolveError::invalid_config(format!(
                    "{name}.max_df must be within (0, 1]"
                )));
            }
        }
        if !(self.subject_model.subsample > 0.0 && self.subject_model.subsample <= 1.0) {
            return Err(EduSolveError::invalid_config(
                "subject_model.subsample must be within (0, 1]",
            ));
        }
        if self.difficulty_model.n_estimators == 0 {
            return Err(EduSolveError::invalid_config(
                "difficulty_model.n_estimators must be positive",
            ));
        }
        Ok(())
    }
}
