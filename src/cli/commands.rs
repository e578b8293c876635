//! Command implementations for the EduSolve CLI.

use std::path::Path;
use std::time::Instant;

use anyhow::Context;
use log::{debug, info};

use crate::classifier::QuestionClassifier;
use crate::cli::args::*;
use crate::cli::output::*;
use crate::config::ClassifierConfig;
use crate::error::{EduSolveError, Result};
use crate::ml::corpus;
use crate::ml::{Task, TrainedModel};

/// Execute a CLI command.
pub fn execute_command(args: EduSolveArgs) -> Result<()> {
    let config = resolve_config(&args)?;
    debug!("Using models directory {}", config.models_dir.display());

    match &args.command {
        Command::Classify(classify_args) => classify(classify_args, config, &args),
        Command::Batch(batch_args) => batch(batch_args, config, &args),
        Command::Train(train_args) => train(train_args, config, &args),
        Command::Labels => labels(config, &args),
        Command::Status(status_args) => status(status_args, config, &args),
    }
}

/// Build the classifier configuration: file first, then CLI overrides.
pub fn resolve_config(args: &EduSolveArgs) -> Result<ClassifierConfig> {
    let config = match &args.config {
        Some(path) => {
            info!("Loading configuration from {}", path.display());
            ClassifierConfig::load_from_file(path)?
        }
        None => ClassifierConfig::default(),
    };

    Ok(match &args.models_dir {
        Some(dir) => config.with_models_dir(dir),
        None => config,
    })
}

fn classify(args: &ClassifyArgs, config: ClassifierConfig, cli_args: &EduSolveArgs) -> Result<()> {
    let classifier = QuestionClassifier::from_config(config)?;
    let question = classifier.validate(&args.question)?;
    let result = classifier.classify(question);
    output_result("Classification", &result, cli_args)
}

fn batch(args: &BatchArgs, config: ClassifierConfig, cli_args: &EduSolveArgs) -> Result<()> {
    let questions = read_questions(&args.file)?;
    let classifier = QuestionClassifier::from_config(config)?;
    let entries = classifier.classify_batch(questions.as_slice())?;
    output_result("Batch classification", &entries, cli_args)
}

fn read_questions(path: &Path) -> Result<Vec<String>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read questions from {}", path.display()))?;
    let questions: Vec<String> = serde_json::from_str(&content)
        .with_context(|| format!("{} is not a JSON array of strings", path.display()))?;
    Ok(questions)
}

fn train(args: &TrainArgs, config: ClassifierConfig, cli_args: &EduSolveArgs) -> Result<()> {
    let start_time = Instant::now();
    let (records, bundled_corpus) = match &args.data {
        Some(path) => corpus::load_or_default(path)?,
        None => (corpus::default_corpus(), true),
    };

    if cli_args.verbosity() > 1 {
        for task in Task::ALL {
            println!("{task} labels: {:?}", corpus::label_counts(&records, task));
        }
    }

    let models_dir = config.models_dir.display().to_string();
    let classifier = QuestionClassifier::from_config(config)?;
    let outcomes = if bundled_corpus {
        classifier.registry().retrain_default()?
    } else {
        classifier.retrain(&records)?
    };

    let summary = TrainingSummary {
        records: records.len(),
        bundled_corpus,
        models_dir,
        outcomes: outcomes
            .into_iter()
            .map(|(task, outcome)| TaskOutcome { task, outcome })
            .collect(),
        duration_ms: start_time.elapsed().as_millis() as u64,
    };
    output_result("Training complete", &summary, cli_args)
}

fn labels(config: ClassifierConfig, cli_args: &EduSolveArgs) -> Result<()> {
    let classifier = QuestionClassifier::from_config(config)?;
    output_result("Labels", &classifier.labels(), cli_args)
}

fn status(args: &StatusArgs, config: ClassifierConfig, cli_args: &EduSolveArgs) -> Result<()> {
    let classifier = QuestionClassifier::from_config(config)?;
    let registry = classifier.registry();

    if args.init {
        registry.warm_up();
    } else {
        // report what is on disk without training anything
        for task in Task::ALL {
            if let Some(model) = TrainedModel::try_load(&registry.config().models_dir, task) {
                registry.install(model);
            }
        }
    }

    let status = registry.status();
    if status.iter().all(|s| !s.initialized) && !args.init {
        return Err(EduSolveError::InvalidOperation(format!(
            "no models found in {}, run `edusolve train` or `edusolve status --init`",
            registry.config().models_dir.display()
        )));
    }
    output_result("Model status", &status, cli_args)
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn test_models_dir_overrides_config_file() {
        let dir = tempfile::tempdir().unwrap();
        let config_path = dir.path().join("edusolve.json");
        std::fs::write(
            &config_path,
            r#"{"models_dir": "from-file", "max_batch_size": 10}"#,
        )
        .unwrap();

        let args = EduSolveArgs::try_parse_from([
            "edusolve",
            "--config",
            config_path.to_str().unwrap(),
            "--models-dir",
            "from-flag",
            "labels",
        ])
        .unwrap();
        let config = resolve_config(&args).unwrap();
        assert_eq!(config.models_dir, std::path::PathBuf::from("from-flag"));
        assert_eq!(config.max_batch_size, 10);
    }

    #[test]
    fn test_read_questions() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("questions.json");
        std::fs::write(&path, r#"["What is pH?", "Define a noun"]"#).unwrap();
        assert_eq!(read_questions(&path).unwrap().len(), 2);

        std::fs::write(&path, r#"{"question": "What is pH?"}"#).unwrap();
        assert!(read_questions(&path).is_err());
        assert!(read_questions(&dir.path().join("missing.json")).is_err());
    }

    #[test]
    fn test_train_with_records() {
        let dir = tempfile::tempdir().unwrap();
        let data = dir.path().join("train.json");
        let models = dir.path().join("models");
        std::fs::write(
            &data,
            r#"[
                {"question": "What is the speed of light?", "subject": "Physics", "difficulty": "Easy"},
                {"question": "Explain quantum entanglement", "subject": "Physics", "difficulty": "Hard"},
                {"question": "What is a noun?", "subject": "English", "difficulty": "Easy"}
            ]"#,
        )
        .unwrap();

        let args = EduSolveArgs::try_parse_from([
            "edusolve",
            "-q",
            "--format",
            "json",
            "--models-dir",
            models.to_str().unwrap(),
            "train",
            "--data",
            data.to_str().unwrap(),
        ])
        .unwrap();
        execute_command(args).unwrap();

        assert!(models.join("subject_model.json").exists());
        assert!(models.join("difficulty_encoder.json").exists());
    }
}
