//! Criterion benchmarks for EduSolve.
//!
//! Covers the hot paths of question classification:
//! - Text normalization
//! - TF-IDF vectorization
//! - End-to-end classification, single and batch
//! - Model training on the bundled corpus

use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use edusolve::analysis::TextNormalizer;
use edusolve::classifier::QuestionClassifier;
use edusolve::config::ClassifierConfig;
use edusolve::ml::corpus::default_corpus;
use edusolve::ml::model::{Provenance, TrainedModel};
use edusolve::ml::task::Task;
use edusolve::ml::vectorizer::{TfIdfVectorizer, VectorizerConfig};
use std::hint::black_box;

/// Generate synthetic questions for benchmarking.
fn generate_questions(count: usize) -> Vec<String> {
    let stems = [
        "What is the derivative of",
        "Explain how",
        "Why does",
        "Who discovered",
        "Describe the role of",
        "How do I calculate",
    ];
    let topics = [
        "photosynthesis in plants",
        "the French Revolution",
        "kinetic energy and momentum",
        "a binary search algorithm",
        "the quadratic formula",
        "tectonic plates near the ocean",
        "a metaphor in a poem",
        "covalent chemical bonds",
    ];

    (0..count)
        .map(|i| format!("{} {}?", stems[i % stems.len()], topics[(i * 7) % topics.len()]))
        .collect()
}

fn normalized_corpus(normalizer: &TextNormalizer) -> (Vec<String>, Vec<String>) {
    default_corpus()
        .into_iter()
        .map(|r| (normalizer.normalize_lenient(&r.question).cleaned_text, r.subject))
        .unzip()
}

/// Benchmark text normalization.
fn bench_normalization(c: &mut Criterion) {
    let mut group = c.benchmark_group("normalization");
    let normalizer = TextNormalizer::new().unwrap();
    let questions = generate_questions(100);

    group.bench_function("normalize_single_question", |b| {
        b.iter(|| normalizer.normalize(black_box(&questions[0])).unwrap())
    });

    group.throughput(Throughput::Elements(100));
    group.bench_function("normalize_batch_questions", |b| {
        b.iter(|| {
            for question in &questions {
                black_box(normalizer.normalize(question).unwrap());
            }
        })
    });

    group.finish();
}

/// Benchmark TF-IDF fitting and transformation.
fn bench_vectorizer(c: &mut Criterion) {
    let mut group = c.benchmark_group("vectorizer");
    let normalizer = TextNormalizer::new().unwrap();
    let (documents, _) = normalized_corpus(&normalizer);

    group.bench_function("fit_subject_vocabulary", |b| {
        b.iter(|| {
            let mut vectorizer = TfIdfVectorizer::new(VectorizerConfig::subject());
            vectorizer.fit(black_box(&documents)).unwrap();
            vectorizer
        })
    });

    let mut vectorizer = TfIdfVectorizer::new(VectorizerConfig::subject());
    vectorizer.fit(&documents).unwrap();
    group.throughput(Throughput::Elements(documents.len() as u64));
    group.bench_function("transform_corpus", |b| {
        b.iter(|| {
            for document in &documents {
                black_box(vectorizer.transform(document).unwrap());
            }
        })
    });

    group.finish();
}

/// Benchmark end-to-end classification against a warmed-up registry.
fn bench_classification(c: &mut Criterion) {
    let mut group = c.benchmark_group("classification");
    let dir = tempfile::tempdir().unwrap();
    let classifier =
        QuestionClassifier::from_config(ClassifierConfig::default().with_models_dir(dir.path()))
            .unwrap();
    classifier.registry().warm_up();
    let questions = generate_questions(100);

    group.bench_function("classify_single_question", |b| {
        b.iter(|| classifier.classify(black_box(&questions[1])))
    });

    for size in [10usize, 100] {
        group.throughput(Throughput::Elements(size as u64));
        group.bench_with_input(BenchmarkId::new("classify_batch", size), &size, |b, &size| {
            b.iter(|| classifier.classify_batch(black_box(&questions[..size])).unwrap())
        });
    }

    group.finish();
}

/// Benchmark model training on the bundled corpus.
fn bench_training(c: &mut Criterion) {
    let mut group = c.benchmark_group("training");
    group.sample_size(10);
    let normalizer = TextNormalizer::new().unwrap();
    let (documents, labels) = normalized_corpus(&normalizer);
    let difficulty_labels: Vec<String> = default_corpus().into_iter().map(|r| r.difficulty).collect();
    let config = ClassifierConfig::default();

    group.bench_function("train_subject_gradient_boosting", |b| {
        b.iter(|| {
            TrainedModel::train(
                Task::Subject,
                black_box(&documents),
                &labels,
                &config,
                Provenance::BundledCorpus,
            )
        })
    });

    group.bench_function("train_difficulty_random_forest", |b| {
        b.iter(|| {
            TrainedModel::train(
                Task::Difficulty,
                black_box(&documents),
                &difficulty_labels,
                &config,
                Provenance::BundledCorpus,
            )
        })
    });

    group.finish();
}

criterion_group!(
    benches,
    bench_normalization,
    bench_vectorizer,
    bench_classification,
    bench_training
);
criterion_main!(benches);
