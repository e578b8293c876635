//! Training corpus: record format, loading and the bundled sample set.

use std::collections::BTreeMap;
use std::path::Path;

use log::{info, warn};
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::ml::task::Task;

/// One labeled question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrainingRecord {
    pub question: String,
    pub subject: String,
    pub difficulty: String,
}

impl TrainingRecord {
    pub fn new(question: &str, subject: &str, difficulty: &str) -> Self {
        Self {
            question: question.to_string(),
            subject: subject.to_string(),
            difficulty: difficulty.to_string(),
        }
    }

    /// The label of this record for `task`.
    pub fn label(&self, task: Task) -> &str {
        match task {
            Task::Subject => &self.subject,
            Task::Difficulty => &self.difficulty,
        }
    }
}

/// Read a JSON array of [`TrainingRecord`]s.
pub fn load_training_data(path: &Path) -> Result<Vec<TrainingRecord>> {
    let content = std::fs::read_to_string(path)?;
    let records: Vec<TrainingRecord> = serde_json::from_str(&content)?;
    info!("Loaded {} training records from {}", records.len(), path.display());
    Ok(records)
}

/// Load records from `path`, or the bundled corpus when the file is missing or
/// empty. The flag is `true` when the bundled corpus was used.
pub fn load_or_default(path: &Path) -> Result<(Vec<TrainingRecord>, bool)> {
    if !path.exists() {
        warn!(
            "Training data {} not found, using bundled sample questions",
            path.display()
        );
        return Ok((default_corpus(), true));
    }

    let records = load_training_data(path)?;
    if records.is_empty() {
        warn!(
            "Training data {} is empty, using bundled sample questions",
            path.display()
        );
        return Ok((default_corpus(), true));
    }
    Ok((records, false))
}

/// Number of records per label for `task`.
pub fn label_counts(records: &[TrainingRecord], task: Task) -> BTreeMap<String, usize> {
    let mut counts = BTreeMap::new();
    for record in records {
        *counts.entry(record.label(task).to_string()).or_insert(0) += 1;
    }
    counts
}

const SAMPLE_QUESTIONS: &[(&str, &str, &str)] = &[
    ("How do I solve a quadratic equation using the quadratic formula?", "Mathematics", "Medium"),
    ("What is the derivative of x squared?", "Mathematics", "Easy"),
    ("Explain the Pythagorean theorem", "Mathematics", "Medium"),
    ("How to find the area of a circle?", "Mathematics", "Easy"),
    ("What is integration in calculus?", "Mathematics", "Hard"),
    ("Solve for x in the equation 2x + 5 = 15", "Mathematics", "Easy"),
    ("What is Newton's second law of motion?", "Physics", "Medium"),
    ("Explain the relationship between velocity and acceleration", "Physics", "Medium"),
    ("What is the speed of light?", "Physics", "Easy"),
    ("How does gravity work?", "Physics", "Medium"),
    ("What is kinetic energy?", "Physics", "Easy"),
    ("Explain electromagnetic waves", "Physics", "Hard"),
    ("What is the atomic number of oxygen?", "Chemistry", "Easy"),
    ("Explain the structure of an atom", "Chemistry", "Medium"),
    ("What is a chemical bond?", "Chemistry", "Easy"),
    ("How does photosynthesis work chemically?", "Chemistry", "Hard"),
    ("What is pH scale?", "Chemistry", "Easy"),
    ("Explain oxidation and reduction", "Chemistry", "Medium"),
    ("What is photosynthesis in plants?", "Biology", "Medium"),
    ("How does DNA replication work?", "Biology", "Hard"),
    ("What is mitosis?", "Biology", "Medium"),
    ("Explain the human circulatory system", "Biology", "Medium"),
    ("What are cells made of?", "Biology", "Easy"),
    ("How do vaccines work?", "Biology", "Medium"),
    ("Who wrote Romeo and Juliet?", "English", "Easy"),
    ("What is a metaphor in literature?", "English", "Medium"),
    ("Explain verb tenses", "English", "Easy"),
    ("What is Shakespeare famous for?", "English", "Easy"),
    ("Define a noun", "English", "Easy"),
    ("What is alliteration?", "English", "Easy"),
    ("Who was the first president of the United States?", "History", "Easy"),
    ("When did World War 2 end?", "History", "Easy"),
    ("What was the Renaissance?", "History", "Medium"),
    ("Explain the French Revolution", "History", "Medium"),
    ("Who was Napoleon Bonaparte?", "History", "Medium"),
    ("What is the capital of France?", "Geography", "Easy"),
    ("What are tectonic plates?", "Geography", "Medium"),
    ("Explain climate change", "Geography", "Hard"),
    ("What is the largest ocean?", "Geography", "Easy"),
    ("Where is Mount Everest located?", "Geography", "Easy"),
    ("How do I write a for loop in Python?", "Computer Science", "Easy"),
    ("What is a variable in programming?", "Computer Science", "Easy"),
    ("Explain how a binary search algorithm works", "Computer Science", "Medium"),
    ("What is object oriented programming?", "Computer Science", "Medium"),
    ("How does a database index speed up queries?", "Computer Science", "Hard"),
    ("What is the difference between HTML and CSS?", "Computer Science", "Easy"),
];

/// The bundled sample corpus used for cold-start training.
pub fn default_corpus() -> Vec<TrainingRecord> {
    SAMPLE_QUESTIONS
        .iter()
        .map(|&(question, subject, difficulty)| TrainingRecord::new(question, subject, difficulty))
        .collect()
}

/// One keyword-dense sentence per core subject.
pub fn canonical_subject_examples() -> Vec<(&'static str, &'static str)> {
    vec![
        ("calculate derivative integrate solve equation", "Mathematics"),
        ("velocity acceleration force motion physics", "Physics"),
        ("atomic molecular chemical reaction element", "Chemistry"),
        ("photosynthesis cell mitosis biology organism", "Biology"),
        ("literature poem novel story character", "English"),
        ("historical event ancient civilization empire", "History"),
        ("geographic location map coordinates climate", "Geography"),
    ]
}

/// One keyword-dense sentence per difficulty level.
pub fn canonical_difficulty_examples() -> Vec<(&'static str, &'static str)> {
    vec![
        ("basic simple addition number", "Easy"),
        ("derive solve quadratic equation calculus", "Medium"),
        ("prove theorem eigenvalues differential equation", "Hard"),
    ]
}
