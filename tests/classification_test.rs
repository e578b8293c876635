//! Integration tests for end-to-end question classification.

use std::sync::Arc;

use edusolve::analysis::TextNormalizer;
use edusolve::classifier::QuestionClassifier;
use edusolve::config::ClassifierConfig;
use edusolve::ml::corpus::{canonical_difficulty_examples, canonical_subject_examples};
use edusolve::ml::model::{ClassificationResult, Provenance, TrainedModel};
use edusolve::ml::registry::ModelRegistry;
use edusolve::ml::task::{DIFFICULTIES, SUBJECTS, Task};

fn test_config(dir: &std::path::Path) -> ClassifierConfig {
    ClassifierConfig::default().with_models_dir(dir)
}

fn train_canonical(
    task: Task,
    examples: &[(&str, &str)],
    normalizer: &TextNormalizer,
) -> TrainedModel {
    let documents: Vec<String> = examples
        .iter()
        .map(|(text, _)| normalizer.normalize(text).unwrap().cleaned_text)
        .collect();
    let labels: Vec<String> = examples.iter().map(|(_, label)| label.to_string()).collect();
    TrainedModel::train(
        task,
        &documents,
        &labels,
        &ClassifierConfig::default(),
        Provenance::Corpus,
    )
}

#[test]
fn test_canonical_subject_sentences() {
    let normalizer = TextNormalizer::new().unwrap();
    let examples = canonical_subject_examples();
    let model = train_canonical(Task::Subject, &examples, &normalizer);
    assert!(!model.is_prior());

    let correct = examples
        .iter()
        .filter(|(text, label)| {
            let result = model.predict(&normalizer.normalize(text).unwrap());
            assert!((0.0..=1.0).contains(&result.confidence));
            result.label == *label
        })
        .count();
    assert!(correct >= 6, "only {correct}/7 canonical sentences recovered");
}

#[test]
fn test_canonical_difficulty_sentences() {
    let normalizer = TextNormalizer::new().unwrap();
    let examples = canonical_difficulty_examples();
    let model = train_canonical(Task::Difficulty, &examples, &normalizer);

    // too few rows to split, so every prediction is the forest's vote
    for (text, _) in &examples {
        let result = model.predict(&normalizer.normalize(text).unwrap());
        assert!(DIFFICULTIES.contains(&result.label.as_str()));
        assert!((0.0..=1.0).contains(&result.confidence));
    }
}

#[test]
fn test_inputs_without_signal_get_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let classifier = QuestionClassifier::from_config(test_config(dir.path())).unwrap();

    for question in ["", "a", "?!.", "   ", "12345"] {
        let result = classifier.classify(question);
        assert_eq!(result.subject, "Mathematics", "input {question:?}");
        assert_eq!(result.subject_confidence, 0.5);
        assert_eq!(result.difficulty, "Medium");
        assert_eq!(result.difficulty_confidence, 0.5);
    }
}

#[test]
fn test_confidence_bounds_on_bundled_models() {
    let dir = tempfile::tempdir().unwrap();
    let classifier = QuestionClassifier::from_config(test_config(dir.path())).unwrap();

    for question in [
        "How do I solve a quadratic equation?",
        "Why is the sky blue?",
        "Summarize the causes of the First World War",
        "What does a for loop do in Python?",
        "zzz qqq",
        "Explain https://example.com to me, mail bob@example.com",
    ] {
        let result = classifier.classify(question);
        assert!(SUBJECTS.contains(&result.subject.as_str()), "{result:?}");
        assert!(DIFFICULTIES.contains(&result.difficulty.as_str()), "{result:?}");
        assert!((0.0..=1.0).contains(&result.subject_confidence));
        assert!((0.0..=1.0).contains(&result.difficulty_confidence));
    }
}

#[test]
fn test_keyword_fallback_overrides_unsure_model() {
    let dir = tempfile::tempdir().unwrap();
    let registry = Arc::new(ModelRegistry::new(test_config(dir.path())).unwrap());

    // uniform prior over all subjects: confidence 1/8, below the threshold
    let labels: Vec<String> = SUBJECTS.iter().map(|s| s.to_string()).collect();
    registry.install(TrainedModel::prior(Task::Subject, &labels, Provenance::Corpus));

    let classifier = QuestionClassifier::new(Arc::clone(&registry)).unwrap();
    let result = classifier.classify("what is the capital of France");
    assert_eq!(result.subject, "Geography");
    assert!((result.subject_confidence - 0.65).abs() < 1e-12);

    // no keyword hit keeps the model's answer
    let result = classifier.classify("tell me something interesting");
    assert_eq!(result.subject, "Biology");
    assert!((result.subject_confidence - 0.125).abs() < 1e-12);
}

#[test]
fn test_whole_word_keyword_matching() {
    let dir = tempfile::tempdir().unwrap();
    let registry = Arc::new(ModelRegistry::new(test_config(dir.path())).unwrap());
    let labels: Vec<String> = ["History", "English", "Biology"]
        .iter()
        .map(|s| s.to_string())
        .collect();
    registry.install(TrainedModel::prior(Task::Subject, &labels, Provenance::Corpus));
    let classifier = QuestionClassifier::new(registry).unwrap();

    // "war" must not match inside "warfare"
    let result = classifier.classify("cartography warfare");
    assert_eq!(result.subject, "Biology");
    assert!((result.subject_confidence - 1.0 / 3.0).abs() < 1e-12);

    let result = classifier.classify("the war of cartography");
    assert_eq!(result.subject, "History");
    assert!((result.subject_confidence - 0.65).abs() < 1e-12);
}

#[test]
fn test_single_class_corpus() {
    let dir = tempfile::tempdir().unwrap();
    let classifier = QuestionClassifier::from_config(test_config(dir.path())).unwrap();

    let records = vec![
        edusolve::ml::TrainingRecord::new("What is kinetic energy?", "Physics", "Easy"),
        edusolve::ml::TrainingRecord::new("How does gravity work?", "Physics", "Easy"),
        edusolve::ml::TrainingRecord::new("Define momentum", "Physics", "Easy"),
    ];
    classifier.retrain(&records).unwrap();

    let result = classifier.classify("What is the speed of sound?");
    assert_eq!(result.subject, "Physics");
    assert_eq!(result.subject_confidence, 1.0);
    assert_eq!(result.difficulty, "Easy");
    assert_eq!(result.difficulty_confidence, 1.0);
}

#[test]
fn test_result_constructor_clamps() {
    let result = ClassificationResult::new("Physics", 3.0);
    assert_eq!(result.confidence, 1.0);
}
