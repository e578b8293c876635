//! Holder for the per-task models.
//!
//! Each task has one slot, `RwLock<Option<Arc<TrainedModel>>>`. Readers clone
//! the `Arc` under a short read lock and predict without holding it. Retraining
//! builds the replacement model first and swaps the `Arc` under the write
//! lock, so a reader sees either the old or the new model.

use std::sync::Arc;

use log::{debug, info, warn};
use parking_lot::RwLock;
use serde::Serialize;

use crate::analysis::TextNormalizer;
use crate::config::ClassifierConfig;
use crate::error::Result;
use crate::ml::MLError;
use crate::ml::corpus::{self, TrainingRecord};
use crate::ml::model::{ModelMetadata, Provenance, TrainedModel};
use crate::ml::task::Task;

/// How a slot got its model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum InitOutcome {
    /// Read from the models directory.
    Loaded,
    /// Trained on caller-supplied records.
    Trained,
    /// Trained on the bundled sample questions.
    DefaultTrained,
    /// Fitting failed and the class prior was installed instead.
    TrivialFallback,
}

/// Snapshot of one slot, for status reporting.
#[derive(Debug, Clone, Serialize)]
pub struct ModelStatus {
    pub task: Task,
    pub initialized: bool,
    pub labels: Vec<String>,
    pub metadata: Option<ModelMetadata>,
}

type Slot = RwLock<Option<Arc<TrainedModel>>>;

/// The subject and difficulty models of one classifier.
#[derive(Debug)]
pub struct ModelRegistry {
    config: ClassifierConfig,
    normalizer: TextNormalizer,
    subject: Slot,
    difficulty: Slot,
}

impl ModelRegistry {
    /// Create a registry with empty slots. Nothing is loaded until a model is
    /// first requested.
    pub fn new(config: ClassifierConfig) -> Result<Self> {
        Ok(Self {
            config,
            normalizer: TextNormalizer::new()?,
            subject: RwLock::new(None),
            difficulty: RwLock::new(None),
        })
    }

    pub fn config(&self) -> &ClassifierConfig {
        &self.config
    }

    pub fn normalizer(&self) -> &TextNormalizer {
        &self.normalizer
    }

    fn slot(&self, task: Task) -> &Slot {
        match task {
            Task::Subject => &self.subject,
            Task::Difficulty => &self.difficulty,
        }
    }

    /// The model for `task`, initializing the slot on first use.
    pub fn get(&self, task: Task) -> Arc<TrainedModel> {
        if let Some(model) = self.slot(task).read().as_ref() {
            return Arc::clone(model);
        }

        let mut guard = self.slot(task).write();
        // another thread may have initialized the slot while we waited
        if let Some(model) = guard.as_ref() {
            return Arc::clone(model);
        }

        let (model, outcome) = self.obtain(task);
        debug!("Lazily initialized {task} model: {outcome:?}");
        let model = Arc::new(model);
        *guard = Some(Arc::clone(&model));
        model
    }

    /// The installed model for `task`, without initializing.
    pub fn current(&self, task: Task) -> Option<Arc<TrainedModel>> {
        self.slot(task).read().clone()
    }

    /// (Re)initialize the slot for `task` from disk, or from the bundled
    /// corpus when nothing usable is persisted.
    pub fn initialize(&self, task: Task) -> InitOutcome {
        let (model, outcome) = self.obtain(task);
        self.install(model);
        outcome
    }

    /// Load `task` from the models directory. Returns `false` when no usable
    /// model was found, in which case the default model was trained instead.
    pub fn load(&self, task: Task) -> bool {
        self.initialize(task) == InitOutcome::Loaded
    }

    /// Initialize every slot that is still empty.
    pub fn warm_up(&self) {
        for task in Task::ALL {
            self.get(task);
        }
    }

    /// Train both models on `records`, install them and persist them.
    ///
    /// The new models are installed before saving, so a save error leaves
    /// them in use but not on disk.
    pub fn retrain(&self, records: &[TrainingRecord]) -> Result<Vec<(Task, InitOutcome)>> {
        if records.is_empty() {
            return Err(MLError::InsufficientTrainingData {
                min_samples: 1,
                actual: 0,
            }
            .into());
        }
        self.train_and_install(records, Provenance::Corpus, InitOutcome::Trained)
    }

    /// Retrain both models on the bundled sample questions.
    pub fn retrain_default(&self) -> Result<Vec<(Task, InitOutcome)>> {
        self.train_and_install(
            &corpus::default_corpus(),
            Provenance::BundledCorpus,
            InitOutcome::DefaultTrained,
        )
    }

    fn train_and_install(
        &self,
        records: &[TrainingRecord],
        provenance: Provenance,
        success: InitOutcome,
    ) -> Result<Vec<(Task, InitOutcome)>> {
        let documents: Vec<String> = records
            .iter()
            .map(|r| self.normalizer.normalize_lenient(&r.question).cleaned_text)
            .collect();

        let (subject, difficulty) = rayon::join(
            || self.train(Task::Subject, &documents, records, provenance),
            || self.train(Task::Difficulty, &documents, records, provenance),
        );

        let mut outcomes = Vec::with_capacity(2);
        let mut installed = Vec::with_capacity(2);
        for model in [subject, difficulty] {
            let outcome = if model.is_prior() {
                InitOutcome::TrivialFallback
            } else {
                success
            };
            outcomes.push((model.task(), outcome));
            installed.push(self.install_shared(Arc::new(model)));
        }

        for model in &installed {
            model.save(&self.config.models_dir)?;
        }
        info!(
            "Retrained models on {} records, saved to {}",
            records.len(),
            self.config.models_dir.display()
        );
        Ok(outcomes)
    }

    /// Put `model` into its task's slot, returning the model it replaced.
    pub fn install(&self, model: TrainedModel) -> Option<Arc<TrainedModel>> {
        let model = Arc::new(model);
        let task = model.task();
        self.slot(task).write().replace(model)
    }

    fn install_shared(&self, model: Arc<TrainedModel>) -> Arc<TrainedModel> {
        *self.slot(model.task()).write() = Some(Arc::clone(&model));
        model
    }

    /// Persist the installed model for `task`.
    pub fn save(&self, task: Task) -> Result<()> {
        let model = self.current(task).ok_or_else(|| MLError::ModelNotTrained {
            message: format!("no {task} model installed"),
        })?;
        model.save(&self.config.models_dir)
    }

    /// One entry per task, in [`Task::ALL`] order.
    pub fn status(&self) -> Vec<ModelStatus> {
        Task::ALL
            .iter()
            .map(|&task| match self.current(task) {
                Some(model) => ModelStatus {
                    task,
                    initialized: true,
                    labels: model.labels().to_vec(),
                    metadata: Some(model.metadata().clone()),
                },
                None => ModelStatus {
                    task,
                    initialized: false,
                    labels: Vec::new(),
                    metadata: None,
                },
            })
            .collect()
    }

    fn obtain(&self, task: Task) -> (TrainedModel, InitOutcome) {
        let dir = &self.config.models_dir;
        if let Some(model) = TrainedModel::try_load(dir, task) {
            info!("Loaded {} model from {}", task, dir.display());
            return (model, InitOutcome::Loaded);
        }

        info!("No usable {task} model, training on bundled sample questions");
        let records = corpus::default_corpus();
        let documents: Vec<String> = records
            .iter()
            .map(|r| self.normalizer.normalize_lenient(&r.question).cleaned_text)
            .collect();
        let model = self.train(task, &documents, &records, Provenance::BundledCorpus);

        if let Err(e) = model.save(dir) {
            warn!("Could not persist default {task} model: {e}");
        }

        let outcome = if model.is_prior() {
            InitOutcome::TrivialFallback
        } else {
            InitOutcome::DefaultTrained
        };
        (model, outcome)
    }

    fn train(
        &self,
        task: Task,
        documents: &[String],
        records: &[TrainingRecord],
        provenance: Provenance,
    ) -> TrainedModel {
        let labels: Vec<String> = records.iter().map(|r| r.label(task).to_string()).collect();
        TrainedModel::train(task, documents, &labels, &self.config, provenance)
    }
}
