//! The two classification tasks and their label sets.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Subject labels, in display order.
pub const SUBJECTS: &[&str] = &[
    "Mathematics",
    "Physics",
    "Chemistry",
    "Biology",
    "English",
    "History",
    "Geography",
    "Computer Science",
];

/// Difficulty labels, easiest first.
pub const DIFFICULTIES: &[&str] = &["Easy", "Medium", "Hard"];

/// Subject reported when classification fails outright.
pub const GENERAL_SUBJECT: &str = "General";

/// A classification task with its own model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Task {
    Subject,
    Difficulty,
}

impl Task {
    pub const ALL: [Task; 2] = [Task::Subject, Task::Difficulty];

    /// Name used for persisted files and logs.
    pub fn name(&self) -> &'static str {
        match self {
            Task::Subject => "subject",
            Task::Difficulty => "difficulty",
        }
    }

    /// Labels this task can emit.
    pub fn labels(&self) -> &'static [&'static str] {
        match self {
            Task::Subject => SUBJECTS,
            Task::Difficulty => DIFFICULTIES,
        }
    }

    /// Label returned when the input carries no usable signal.
    pub fn default_label(&self) -> &'static str {
        match self {
            Task::Subject => "Mathematics",
            Task::Difficulty => "Medium",
        }
    }

    /// Confidence paired with [`Task::default_label`].
    pub fn default_confidence(&self) -> f64 {
        0.5
    }
}

impl fmt::Display for Task {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
