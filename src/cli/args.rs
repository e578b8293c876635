//! Command line argument parsing for the EduSolve CLI using clap.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use serde::{Deserialize, Serialize};

/// EduSolve - subject and difficulty classification for student questions
#[derive(Parser, Debug, Clone)]
#[command(name = "edusolve")]
#[command(about = "Classify student questions by subject and difficulty")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(author = "EduSolve Contributors")]
#[command(long_about = None)]
pub struct EduSolveArgs {
    /// Verbosity level (0=quiet, 1=normal, 2=verbose, 3=debug)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Quiet mode (overrides verbose)
    #[arg(short, long)]
    pub quiet: bool,

    /// Output format
    #[arg(short = 'f', long = "format", default_value = "human")]
    pub output_format: OutputFormat,

    /// Pretty-print JSON output
    #[arg(long)]
    pub pretty: bool,

    /// Directory holding persisted models (overrides the config file)
    #[arg(long, value_name = "DIR", env = "EDUSOLVE_MODELS_DIR")]
    pub models_dir: Option<PathBuf>,

    /// Classifier configuration file (JSON)
    #[arg(short, long, value_name = "CONFIG_FILE")]
    pub config: Option<PathBuf>,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Command,
}

impl EduSolveArgs {
    /// Get the effective verbosity level
    pub fn verbosity(&self) -> u8 {
        if self.quiet {
            0
        } else {
            match self.verbose {
                0 => 1,
                n => n,
            }
        }
    }
}

/// Available CLI commands
#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Classify a single question
    Classify(ClassifyArgs),

    /// Classify a JSON array of questions
    Batch(BatchArgs),

    /// Train both models and save them to the models directory
    Train(TrainArgs),

    /// List the subject and difficulty labels
    Labels,

    /// Show the state of each model
    Status(StatusArgs),
}

/// Arguments for classifying one question
#[derive(Parser, Debug, Clone)]
pub struct ClassifyArgs {
    /// Question text
    #[arg(value_name = "QUESTION")]
    pub question: String,
}

/// Arguments for batch classification
#[derive(Parser, Debug, Clone)]
pub struct BatchArgs {
    /// JSON file containing an array of question strings
    #[arg(value_name = "FILE")]
    pub file: PathBuf,
}

/// Arguments for training
#[derive(Parser, Debug, Clone)]
pub struct TrainArgs {
    /// Training records (JSON array of {question, subject, difficulty}).
    /// A missing or empty file falls back to the bundled sample questions.
    #[arg(short, long, value_name = "DATA_FILE")]
    pub data: Option<PathBuf>,
}

/// Arguments for status
#[derive(Parser, Debug, Clone)]
pub struct StatusArgs {
    /// Load or train missing models before reporting
    #[arg(long)]
    pub init: bool,
}

/// Output formats
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Human-readable output
    Human,
    /// JSON output
    Json,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_command() {
        let args =
            EduSolveArgs::try_parse_from(["edusolve", "classify", "What is gravity?"]).unwrap();

        if let Command::Classify(classify_args) = args.command {
            assert_eq!(classify_args.question, "What is gravity?");
        } else {
            panic!("Expected Classify command");
        }
    }

    #[test]
    fn test_train_command() {
        let args =
            EduSolveArgs::try_parse_from(["edusolve", "train", "--data", "data/train.json"])
                .unwrap();

        if let Command::Train(train_args) = args.command {
            assert_eq!(train_args.data, Some(PathBuf::from("data/train.json")));
        } else {
            panic!("Expected Train command");
        }

        let args = EduSolveArgs::try_parse_from(["edusolve", "train"]).unwrap();
        assert!(matches!(args.command, Command::Train(TrainArgs { data: None })));
    }

    #[test]
    fn test_global_options() {
        let args = EduSolveArgs::try_parse_from([
            "edusolve",
            "--models-dir",
            "/tmp/models",
            "--config",
            "edusolve.json",
            "--format",
            "json",
            "--pretty",
            "batch",
            "questions.json",
        ])
        .unwrap();

        assert_eq!(args.models_dir, Some(PathBuf::from("/tmp/models")));
        assert_eq!(args.config, Some(PathBuf::from("edusolve.json")));
        assert_eq!(args.output_format, OutputFormat::Json);
        assert!(args.pretty);
        if let Command::Batch(batch_args) = args.command {
            assert_eq!(batch_args.file, PathBuf::from("questions.json"));
        } else {
            panic!("Expected Batch command");
        }
    }

    #[test]
    fn test_verbosity_levels() {
        // Default verbosity
        let args = EduSolveArgs::try_parse_from(["edusolve", "labels"]).unwrap();
        assert_eq!(args.verbosity(), 1);

        let args = EduSolveArgs::try_parse_from(["edusolve", "-v", "labels"]).unwrap();
        assert_eq!(args.verbosity(), 1);

        let args = EduSolveArgs::try_parse_from(["edusolve", "-vvv", "labels"]).unwrap();
        assert_eq!(args.verbosity(), 3);

        // Quiet flag
        let args = EduSolveArgs::try_parse_from(["edusolve", "--quiet", "-vv", "labels"]).unwrap();
        assert_eq!(args.verbosity(), 0);
    }

    #[test]
    fn test_status_command() {
        let args = EduSolveArgs::try_parse_from(["edusolve", "status", "--init"]).unwrap();
        assert!(matches!(args.command, Command::Status(StatusArgs { init: true })));
    }
}
