//! Machine learning for question classification.
//!
//! Each [`Task`] (subject, difficulty) owns a [`TrainedModel`]: a TF-IDF
//! vectorizer, a tree ensemble and a label encoder. The [`ModelRegistry`]
//! holds one model per task, loads them lazily and swaps them atomically on
//! retraining. Low-confidence subject predictions are revisited by the
//! [`KeywordFallbackResolver`].

pub mod corpus;
pub mod estimator;
pub mod gradient_boosting;
pub mod keyword_fallback;
pub mod label_encoder;
pub mod model;
pub mod prior;
pub mod random_forest;
pub mod registry;
pub mod task;
pub mod tree;
pub mod vectorizer;

pub use corpus::TrainingRecord;
pub use estimator::{Estimator, ProbabilisticClassifier};
pub use gradient_boosting::{GradientBoostingClassifier, GradientBoostingConfig};
pub use keyword_fallback::{KeywordFallbackResolver, KeywordLexicon};
pub use label_encoder::LabelEncoder;
pub use model::{ClassificationResult, ModelMetadata, Provenance, TrainedModel};
pub use prior::PriorClassifier;
pub use random_forest::{RandomForestClassifier, RandomForestConfig};
pub use registry::{InitOutcome, ModelRegistry, ModelStatus};
pub use task::Task;
pub use vectorizer::{TfIdfVectorizer, VectorizerConfig};

/// Machine learning error types.
#[derive(Debug, thiserror::Error)]
pub enum MLError {
    #[error("Model not trained: {message}")]
    ModelNotTrained { message: String },

    #[error("Invalid feature vector: {message}")]
    InvalidFeatureVector { message: String },

    #[error("Training data insufficient: need at least {min_samples} samples, got {actual}")]
    InsufficientTrainingData { min_samples: usize, actual: usize },

    #[error("Training failed: {message}")]
    TrainingFailed { message: String },

    #[error("Unknown label: {label}")]
    UnknownLabel { label: String },

    #[error("Model loading failed: {path}: {reason}")]
    ModelLoadError { path: String, reason: String },

    #[error("Model saving failed: {path}: {reason}")]
    ModelSaveError { path: String, reason: String },
}

/// Index of the largest value. Ties go to the lowest index.
pub(crate) fn argmax(values: &[f64]) -> Option<usize> {
    let mut best: Option<(usize, f64)> = None;
    for (idx, &value) in values.iter().enumerate() {
        match best {
            Some((_, best_value)) if value <= best_value => {}
            _ => best = Some((idx, value)),
        }
    }
    best.map(|(idx, _)| idx)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_argmax_prefers_first() {
        assert_eq!(argmax(&[0.2, 0.4, 0.4]), Some(1));
        assert_eq!(argmax(&[0.5]), Some(0));
        assert_eq!(argmax(&[]), None);
    }

    #[test]
    fn test_error_messages() {
        let err = MLError::InsufficientTrainingData {
            min_samples: 5,
            actual: 2,
        };
        assert_eq!(
            err.to_string(),
            "Training data insufficient: need at least 5 samples, got 2"
        );
    }
}
