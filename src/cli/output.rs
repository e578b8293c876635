//! Output formatting for CLI commands.

use serde::Serialize;

use crate::classifier::{BatchEntry, LabelSets, QuestionClassification};
use crate::cli::args::{EduSolveArgs, OutputFormat};
use crate::error::Result;
use crate::ml::registry::{InitOutcome, ModelStatus};
use crate::ml::task::Task;

/// Result structure for a training run.
#[derive(Debug, Serialize)]
pub struct TrainingSummary {
    pub records: usize,
    pub bundled_corpus: bool,
    pub models_dir: String,
    pub outcomes: Vec<TaskOutcome>,
    pub duration_ms: u64,
}

/// Training outcome of one task.
#[derive(Debug, Serialize)]
pub struct TaskOutcome {
    pub task: Task,
    pub outcome: InitOutcome,
}

/// Human-readable rendering of a command result.
pub trait HumanOutput {
    fn print_human(&self);
}

/// Output a result in the selected format.
pub fn output_result<T: Serialize + HumanOutput>(
    message: &str,
    result: &T,
    args: &EduSolveArgs,
) -> Result<()> {
    match args.output_format {
        OutputFormat::Human => {
            if args.verbosity() > 1 {
                println!("{message}");
                println!();
            }
            result.print_human();
            Ok(())
        }
        OutputFormat::Json => output_json(result, args),
    }
}

fn output_json<T: Serialize>(result: &T, args: &EduSolveArgs) -> Result<()> {
    let json = if args.pretty {
        serde_json::to_string_pretty(result)?
    } else {
        serde_json::to_string(result)?
    };

    println!("{json}");
    Ok(())
}

fn format_confidence(confidence: f64) -> String {
    format!("{:.1}%", confidence * 100.0)
}

impl HumanOutput for QuestionClassification {
    fn print_human(&self) {
        println!(
            "Subject:    {} ({})",
            self.subject,
            format_confidence(self.subject_confidence)
        );
        println!(
            "Difficulty: {} ({})",
            self.difficulty,
            format_confidence(self.difficulty_confidence)
        );
    }
}

impl HumanOutput for Vec<BatchEntry> {
    fn print_human(&self) {
        for entry in self {
            match (&entry.classification, &entry.error) {
                (Some(c), _) => println!(
                    "[{}] {} ({}) / {} ({})  {}",
                    entry.index,
                    c.subject,
                    format_confidence(c.subject_confidence),
                    c.difficulty,
                    format_confidence(c.difficulty_confidence),
                    entry.question
                ),
                (None, error) => println!(
                    "[{}] error: {}  {}",
                    entry.index,
                    error.as_deref().unwrap_or("unknown"),
                    entry.question
                ),
            }
        }
        let failed = self.iter().filter(|e| !e.is_ok()).count();
        println!();
        println!("{} classified, {} rejected", self.len() - failed, failed);
    }
}

impl HumanOutput for LabelSets {
    fn print_human(&self) {
        println!("Subjects:");
        for subject in &self.subjects {
            println!("  {subject}");
        }
        println!("Difficulties:");
        for difficulty in &self.difficulties {
            println!("  {difficulty}");
        }
    }
}

impl HumanOutput for Vec<ModelStatus> {
    fn print_human(&self) {
        for status in self {
            match &status.metadata {
                Some(metadata) => {
                    println!("{}:", status.task);
                    println!("  estimator:  {}", metadata.estimator);
                    println!("  samples:    {}", metadata.training_samples);
                    println!("  vocabulary: {}", metadata.vocabulary_size);
                    println!("  trained at: {}", metadata.trained_at.to_rfc3339());
                    println!("  labels:     {}", status.labels.join(", "));
                }
                None => println!("{}: not loaded", status.task),
            }
        }
    }
}

impl HumanOutput for TrainingSummary {
    fn print_human(&self) {
        let source = if self.bundled_corpus {
            "bundled sample questions"
        } else {
            "training data"
        };
        println!("Trained on {} records ({source})", self.records);
        for outcome in &self.outcomes {
            println!("  {}: {:?}", outcome.task, outcome.outcome);
        }
        println!("Saved to {} in {} ms", self.models_dir, self.duration_ms);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_confidence() {
        assert_eq!(format_confidence(0.5), "50.0%");
        assert_eq!(format_confidence(0.654), "65.4%");
    }

    #[test]
    fn test_summary_serializes() {
        let summary = TrainingSummary {
            records: 3,
            bundled_corpus: false,
            models_dir: "models".to_string(),
            outcomes: vec![TaskOutcome {
                task: Task::Subject,
                outcome: InitOutcome::Trained,
            }],
            duration_ms: 12,
        };
        let value = serde_json::to_value(&summary).unwrap();
        assert_eq!(value["outcomes"][0]["task"], "subject");
        assert_eq!(value["outcomes"][0]["outcome"], "trained");
    }
}
