//! A trained per-task model: vectorizer, estimator and label encoder.
//!
//! Training never fails. If the ensemble cannot be fitted, the model falls
//! back to a [`PriorClassifier`]. Prediction never fails either. Inputs
//! without usable signal and internal errors both produce the task default.
//!
//! A model persists as two JSON files in the models directory:
//! `<task>_model.json` (metadata, vectorizer, estimator) and
//! `<task>_encoder.json` (label encoder).

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};

use crate::analysis::NormalizedDocument;
use crate::config::ClassifierConfig;
use crate::error::Result;
use crate::ml::estimator::{Estimator, ProbabilisticClassifier};
use crate::ml::gradient_boosting::GradientBoostingClassifier;
use crate::ml::label_encoder::LabelEncoder;
use crate::ml::prior::PriorClassifier;
use crate::ml::random_forest::RandomForestClassifier;
use crate::ml::task::Task;
use crate::ml::vectorizer::TfIdfVectorizer;
use crate::ml::{MLError, argmax};

/// A label with its confidence in `[0, 1]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassificationResult {
    pub label: String,
    pub confidence: f64,
}

impl ClassificationResult {
    pub fn new<S: Into<String>>(label: S, confidence: f64) -> Self {
        Self {
            label: label.into(),
            confidence: if confidence.is_nan() {
                0.0
            } else {
                confidence.clamp(0.0, 1.0)
            },
        }
    }

    /// The hardcoded prediction for inputs without usable signal.
    pub fn default_for(task: Task) -> Self {
        Self::new(task.default_label(), task.default_confidence())
    }
}

/// Where the training data of a model came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Provenance {
    /// Caller-supplied training records.
    Corpus,
    /// The bundled sample questions.
    BundledCorpus,
}

/// Information about how and when a model was trained.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelMetadata {
    pub task: Task,
    /// Name of the estimator, `prior` for the fallback.
    pub estimator: String,
    pub training_samples: usize,
    pub vocabulary_size: usize,
    pub trained_at: DateTime<Utc>,
    pub provenance: Provenance,
}

#[derive(Serialize)]
struct PersistedModelRef<'a> {
    metadata: &'a ModelMetadata,
    vectorizer: &'a Option<TfIdfVectorizer>,
    estimator: &'a Estimator,
}

#[derive(Deserialize)]
struct PersistedModel {
    metadata: ModelMetadata,
    vectorizer: Option<TfIdfVectorizer>,
    estimator: Estimator,
}

/// Everything needed to classify text for one task.
#[derive(Debug, Clone)]
pub struct TrainedModel {
    metadata: ModelMetadata,
    /// `None` for prior models, which ignore their input.
    vectorizer: Option<TfIdfVectorizer>,
    estimator: Estimator,
    encoder: LabelEncoder,
}

impl TrainedModel {
    /// Train a model on normalized `documents` and their `labels`.
    ///
    /// Falls back to the prior classifier if fitting fails for any reason.
    pub fn train(
        task: Task,
        documents: &[String],
        labels: &[String],
        config: &ClassifierConfig,
        provenance: Provenance,
    ) -> Self {
        if documents.len() < config.min_recommended_samples {
            warn!(
                "Training {} model on only {} samples, at least {} recommended",
                task,
                documents.len(),
                config.min_recommended_samples
            );
        }

        match Self::fit(task, documents, labels, config, provenance) {
            Ok(model) => {
                info!(
                    "Trained {} model: {} on {} samples, {} classes, {} features",
                    task,
                    model.metadata.estimator,
                    model.metadata.training_samples,
                    model.encoder.len(),
                    model.metadata.vocabulary_size
                );
                model
            }
            Err(e) => {
                warn!("Training {task} model failed, using class prior: {e}");
                Self::prior(task, labels, provenance)
            }
        }
    }

    /// Fit the full pipeline, propagating every error.
    pub fn fit(
        task: Task,
        documents: &[String],
        labels: &[String],
        config: &ClassifierConfig,
        provenance: Provenance,
    ) -> Result<Self> {
        if documents.len() != labels.len() {
            return Err(MLError::TrainingFailed {
                message: format!("{} documents for {} labels", documents.len(), labels.len()),
            }
            .into());
        }

        let encoder = LabelEncoder::fit(labels);
        let y = encoder.encode_all(labels)?;

        let mut vectorizer = TfIdfVectorizer::new(config.vectorizer(task).clone());
        let x = vectorizer.fit_transform(documents)?;

        let estimator = match task {
            Task::Subject => Estimator::GradientBoosting(GradientBoostingClassifier::fit(
                &config.subject_model,
                &x,
                &y,
                encoder.len(),
            )?),
            Task::Difficulty => Estimator::RandomForest(RandomForestClassifier::fit(
                &config.difficulty_model,
                &x,
                &y,
                encoder.len(),
            )?),
        };

        Ok(Self {
            metadata: ModelMetadata {
                task,
                estimator: estimator.name().to_string(),
                training_samples: documents.len(),
                vocabulary_size: vectorizer.vocabulary_size(),
                trained_at: Utc::now(),
                provenance,
            },
            vectorizer: Some(vectorizer),
            estimator,
            encoder,
        })
    }

    /// The trivial model predicting the most frequent label of `labels`.
    /// Without labels it predicts the task default with certainty.
    pub fn prior(task: Task, labels: &[String], provenance: Provenance) -> Self {
        let encoder = LabelEncoder::fit(labels);
        let fitted = encoder
            .encode_all(labels)
            .and_then(|y| PriorClassifier::fit(&y, encoder.len()));

        let (encoder, prior) = match fitted {
            Ok(prior) => (encoder, prior),
            Err(_) => (
                LabelEncoder::fit(&[task.default_label()]),
                PriorClassifier::certain(),
            ),
        };

        Self {
            metadata: ModelMetadata {
                task,
                estimator: "prior".to_string(),
                training_samples: labels.len(),
                vocabulary_size: 0,
                trained_at: Utc::now(),
                provenance,
            },
            vectorizer: None,
            estimator: Estimator::Prior(prior),
            encoder,
        }
    }

    /// Classify a normalized document. Never fails.
    pub fn predict(&self, document: &NormalizedDocument) -> ClassificationResult {
        if document.is_insufficient() {
            debug!(
                "Insufficient text for {} model, using default prediction",
                self.task()
            );
            return ClassificationResult::default_for(self.task());
        }

        match self.try_predict(&document.cleaned_text) {
            Ok(result) => result,
            Err(e) => {
                warn!("{} prediction failed, using default: {e}", self.task());
                ClassificationResult::default_for(self.task())
            }
        }
    }

    /// Classify normalized text, propagating errors.
    pub fn try_predict(&self, cleaned_text: &str) -> Result<ClassificationResult> {
        let features = match &self.vectorizer {
            Some(vectorizer) => vectorizer.transform(cleaned_text)?,
            None => Vec::new(),
        };

        let proba = self.estimator.predict_proba(&features)?;
        if proba.len() != self.encoder.len() {
            return Err(MLError::InvalidFeatureVector {
                message: format!(
                    "{} probabilities for {} labels",
                    proba.len(),
                    self.encoder.len()
                ),
            }
            .into());
        }

        let best = argmax(&proba).ok_or_else(|| MLError::ModelNotTrained {
            message: format!("{} model has no classes", self.task()),
        })?;
        let label = self.encoder.decode(best).ok_or_else(|| MLError::UnknownLabel {
            label: best.to_string(),
        })?;

        Ok(ClassificationResult::new(label, proba[best]))
    }

    /// Path of the model file for `task` in `dir`.
    pub fn model_path(dir: &Path, task: Task) -> PathBuf {
        dir.join(format!("{}_model.json", task.name()))
    }

    /// Path of the encoder file for `task` in `dir`.
    pub fn encoder_path(dir: &Path, task: Task) -> PathBuf {
        dir.join(format!("{}_encoder.json", task.name()))
    }

    /// Write the model and encoder files into `dir`.
    pub fn save(&self, dir: &Path) -> Result<()> {
        std::fs::create_dir_all(dir)?;

        let persisted = PersistedModelRef {
            metadata: &self.metadata,
            vectorizer: &self.vectorizer,
            estimator: &self.estimator,
        };
        write_json(&Self::model_path(dir, self.task()), &persisted)?;
        write_json(&Self::encoder_path(dir, self.task()), &self.encoder)?;

        debug!("Saved {} model to {}", self.task(), dir.display());
        Ok(())
    }

    /// Read the model for `task` from `dir`, rejecting files whose contents
    /// do not fit together.
    pub fn load(dir: &Path, task: Task) -> Result<Self> {
        let model_path = Self::model_path(dir, task);
        let encoder_path = Self::encoder_path(dir, task);

        let persisted: PersistedModel = read_json(&model_path)?;
        let encoder: LabelEncoder = read_json(&encoder_path)?;

        let load_error = |reason: String| MLError::ModelLoadError {
            path: model_path.display().to_string(),
            reason,
        };

        if persisted.metadata.task != task {
            return Err(load_error(format!("holds a {} model", persisted.metadata.task)).into());
        }
        if encoder.is_empty() || encoder.len() != persisted.estimator.n_classes() {
            return Err(load_error(format!(
                "{} encoded labels for {} estimator classes",
                encoder.len(),
                persisted.estimator.n_classes()
            ))
            .into());
        }
        if persisted.vectorizer.is_some() == persisted.estimator.is_prior() {
            return Err(load_error("vectorizer does not match the estimator".to_string()).into());
        }
        if let Some(vectorizer) = &persisted.vectorizer {
            vectorizer.validate().map_err(|e| load_error(e.to_string()))?;
        }
        persisted
            .estimator
            .validate()
            .map_err(|e| load_error(e.to_string()))?;

        Ok(Self {
            metadata: persisted.metadata,
            vectorizer: persisted.vectorizer,
            estimator: persisted.estimator,
            encoder,
        })
    }

    /// Like [`TrainedModel::load`], but absent or corrupt files give `None`.
    pub fn try_load(dir: &Path, task: Task) -> Option<Self> {
        if !Self::model_path(dir, task).exists() || !Self::encoder_path(dir, task).exists() {
            debug!("No persisted {} model in {}", task, dir.display());
            return None;
        }

        match Self::load(dir, task) {
            Ok(model) => Some(model),
            Err(e) => {
                warn!("Ignoring unreadable {task} model: {e}");
                None
            }
        }
    }

    pub fn task(&self) -> Task {
        self.metadata.task
    }

    pub fn metadata(&self) -> &ModelMetadata {
        &self.metadata
    }

    pub fn labels(&self) -> &[String] {
        self.encoder.classes()
    }

    pub fn estimator(&self) -> &Estimator {
        &self.estimator
    }

    pub fn is_prior(&self) -> bool {
        self.estimator.is_prior()
    }
}

fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let save_error = |reason: String| MLError::ModelSaveError {
        path: path.display().to_string(),
        reason,
    };

    let json = serde_json::to_string(value).map_err(|e| save_error(e.to_string()))?;
    let tmp = path.with_extension("json.tmp");
    std::fs::write(&tmp, json).map_err(|e| save_error(e.to_string()))?;
    std::fs::rename(&tmp, path).map_err(|e| save_error(e.to_string()))?;
    Ok(())
}

fn read_json<T: for<'de> Deserialize<'de>>(path: &Path) -> Result<T> {
    let load_error = |reason: String| MLError::ModelLoadError {
        path: path.display().to_string(),
        reason,
    };

    let content = std::fs::read_to_string(path).map_err(|e| load_error(e.to_string()))?;
    let value = serde_json::from_str(&content).map_err(|e| load_error(e.to_string()))?;
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::TextNormalizer;

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    fn doc(normalizer: &TextNormalizer, text: &str) -> NormalizedDocument {
        normalizer.normalize(text).unwrap()
    }

    #[test]
    fn test_train_and_predict_difficulty() {
        let normalizer = TextNormalizer::new().unwrap();
        let docs = strings(&[
            "basic addition number",
            "simple addition count",
            "basic number count",
            "prove theorem eigenvalue",
            "prove differential equation",
            "eigenvalue differential theorem",
        ]);
        let labels = strings(&["Easy", "Easy", "Easy", "Hard", "Hard", "Hard"]);

        let model = TrainedModel::train(
            Task::Difficulty,
            &docs,
            &labels,
            &ClassifierConfig::default(),
            Provenance::Corpus,
        );
        assert!(!model.is_prior());
        assert_eq!(model.labels(), &["Easy", "Hard"]);
        assert_eq!(model.metadata().estimator, "random_forest");

        let result = model.predict(&doc(&normalizer, "Prove the theorem about eigenvalues"));
        assert_eq!(result.label, "Hard");
        assert!((0.0..=1.0).contains(&result.confidence));
    }

    #[test]
    fn test_insufficient_input_uses_default() {
        let normalizer = TextNormalizer::new().unwrap();
        let model = TrainedModel::prior(Task::Subject, &strings(&["Physics"]), Provenance::Corpus);

        for text in ["", "a", "?!?"] {
            assert_eq!(
                model.predict(&doc(&normalizer, text)),
                ClassificationResult::new("Mathematics", 0.5)
            );
        }
    }

    #[test]
    fn test_unfittable_corpus_falls_back_to_prior() {
        let docs = strings(&["same word", "same word", "same word"]);
        let labels = strings(&["Physics", "Biology", "Physics"]);

        let model = TrainedModel::train(
            Task::Subject,
            &docs,
            &labels,
            &ClassifierConfig::default(),
            Provenance::Corpus,
        );
        assert!(model.is_prior());

        let result = model.try_predict("anything at all").unwrap();
        assert_eq!(result.label, "Physics");
        assert!((result.confidence - 2.0 / 3.0).abs() < 1e-12);
    }

    #[test]
    fn test_prior_tie_goes_to_first_label() {
        let model = TrainedModel::prior(
            Task::Difficulty,
            &strings(&["Medium", "Easy"]),
            Provenance::Corpus,
        );
        let result = model.try_predict("whatever").unwrap();
        assert_eq!(result, ClassificationResult::new("Easy", 0.5));

        let empty = TrainedModel::prior(Task::Difficulty, &[], Provenance::BundledCorpus);
        assert_eq!(
            empty.try_predict("x").unwrap(),
            ClassificationResult::new("Medium", 1.0)
        );
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let docs = strings(&[
            "velocity force motion",
            "gravity force mass",
            "cell membrane organism",
            "organism gene protein",
        ]);
        let labels = strings(&["Physics", "Physics", "Biology", "Biology"]);
        let config = ClassifierConfig::default();

        let model = TrainedModel::train(Task::Subject, &docs, &labels, &config, Provenance::Corpus);
        model.save(dir.path()).unwrap();

        assert!(TrainedModel::model_path(dir.path(), Task::Subject).exists());
        assert!(TrainedModel::encoder_path(dir.path(), Task::Subject).exists());

        let loaded = TrainedModel::load(dir.path(), Task::Subject).unwrap();
        assert_eq!(loaded.labels(), model.labels());
        assert_eq!(loaded.metadata(), model.metadata());

        let a = model.try_predict("force velocity").unwrap();
        let b = loaded.try_predict("force velocity").unwrap();
        assert_eq!(a.label, b.label);
        assert!((a.confidence - b.confidence).abs() < 1e-9);

        // wrong task under the same directory
        assert!(TrainedModel::try_load(dir.path(), Task::Difficulty).is_none());
    }

    #[test]
    fn test_corrupt_files_are_ignored() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(TrainedModel::model_path(dir.path(), Task::Subject), "{").unwrap();
        std::fs::write(TrainedModel::encoder_path(dir.path(), Task::Subject), "[]").unwrap();

        assert!(TrainedModel::load(dir.path(), Task::Subject).is_err());
        assert!(TrainedModel::try_load(dir.path(), Task::Subject).is_none());
    }

    #[test]
    fn test_confidence_is_clamped() {
        assert_eq!(ClassificationResult::new("A", 1.5).confidence, 1.0);
        assert_eq!(ClassificationResult::new("A", -0.1).confidence, 0.0);
        assert_eq!(ClassificationResult::new("A", f64::NAN).confidence, 0.0);
    }
}
