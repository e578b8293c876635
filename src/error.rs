//! Error types for the EduSolve library.
//!
//! All fallible operations in the crate return [`Result`], whose error side is
//! the [`EduSolveError`] enum. Model-specific failures are described by
//! [`MLError`](crate::ml::MLError) and convert into `EduSolveError` through `?`.
//!
//! # Examples
//!
//! ```
//! use edusolve::error::{EduSolveError, Result};
//!
//! fn example_operation() -> Result<()> {
//!     Err(EduSolveError::invalid_argument("Invalid input"))
//! }
//!
//! match example_operation() {
//!     Ok(_) => println!("Success"),
//!     Err(e) => eprintln!("Error: {}", e),
//! }
//! ```

use std::io;

use thiserror::Error;

use crate::ml::MLError;

/// The main error type for EduSolve operations.
#[derive(Error, Debug)]
pub enum EduSolveError {
    /// I/O errors (model files, corpus files)
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Analysis-related errors (cleaning, tokenization, filtering)
    #[error("Analysis error: {0}")]
    Analysis(String),

    /// Model training, persistence and inference errors
    #[error(transparent)]
    Model(#[from] MLError),

    /// Invalid operation
    #[error("Invalid operation: {0}")]
    InvalidOperation(String),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Generic error for other cases
    #[error("Error: {0}")]
    Other(String),

    /// Generic anyhow error
    #[error("Anyhow error: {0}")]
    Anyhow(#[from] anyhow::Error),
}

/// Result type alias for operations that may fail with EduSolveError.
pub type Result<T> = std::result::Result<T, EduSolveError>;

impl EduSolveError {
    /// Create a new analysis error.
    pub fn analysis<S: Into<String>>(msg: S) -> Self {
        EduSolveError::Analysis(msg.into())
    }

    /// Create a new invalid configuration error.
    pub fn invalid_config<S: Into<String>>(msg: S) -> Self {
        EduSolveError::Other(format!("Invalid configuration: {}", msg.into()))
    }

    /// Create a new invalid argument error.
    pub fn invalid_argument<S: Into<String>>(msg: S) -> Self {
        EduSolveError::Other(format!("Invalid argument: {}", msg.into()))
    }
}
