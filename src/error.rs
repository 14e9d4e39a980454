//! Error types for moea-harness
//!
//! This module defines all error types used throughout the library.

use std::path::PathBuf;

use thiserror::Error;

/// Error type for genome shape problems
#[derive(Debug, Error, Clone, PartialEq)]
pub enum GenomeError {
    /// Two genomes (or a genome and its problem) disagree on length
    #[error("Dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    /// Invalid genome structure
    #[error("Invalid genome structure: {0}")]
    InvalidStructure(String),
}

/// Error type for operator failures
#[derive(Debug, Error, Clone, PartialEq)]
pub enum OperatorError {
    /// Crossover operation failed
    #[error("Crossover failed: {0}")]
    CrossoverFailed(String),

    /// Parents cannot be recombined
    #[error("Incompatible parents: {0}")]
    Incompatible(#[from] GenomeError),
}

/// Error type for the progress log sink
#[derive(Debug, Error)]
pub enum LogError {
    /// IO error while creating or writing the log
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// A record could not be encoded
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The log file exists and overwriting is disabled
    #[error("Log file already exists: {}", .0.display())]
    AlreadyExists(PathBuf),

    /// A record was written before `init_logging`
    #[error("Logger used before init_logging")]
    NotInitialized,
}

/// Top-level error type for evolution runs
#[derive(Debug, Error)]
pub enum EvolutionError {
    /// Genome error
    #[error("Genome error: {0}")]
    Genome(#[from] GenomeError),

    /// Operator error
    #[error("Operator error: {0}")]
    Operator(#[from] OperatorError),

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    Configuration(String),

    /// An externally supplied population has the wrong size
    #[error("Population size mismatch: expected {expected}, got {actual}")]
    PopulationSizeMismatch { expected: usize, actual: usize },

    /// Progress log failure
    #[error("Logging error: {0}")]
    Logging(#[from] LogError),

    /// Empty population
    #[error("Empty population")]
    EmptyPopulation,
}

/// Result type alias for evolution operations
pub type EvoResult<T> = Result<T, EvolutionError>;

/// Result of a variation operator
///
/// `Failed` is recoverable: engines fall back to the unmodified parent.
#[derive(Debug, Clone)]
pub enum OperatorResult<T> {
    /// Operation succeeded
    Success(T),
    /// Operation failed
    Failed(OperatorError),
}

impl<T> OperatorResult<T> {
    /// Get the value if successful
    pub fn value(self) -> Option<T> {
        match self {
            Self::Success(v) => Some(v),
            Self::Failed(_) => None,
        }
    }

    /// Check if the operation succeeded
    pub fn is_ok(&self) -> bool {
        matches!(self, Self::Success(_))
    }

    /// Map the successful value
    pub fn map<U, F: FnOnce(T) -> U>(self, f: F) -> OperatorResult<U> {
        match self {
            Self::Success(v) => OperatorResult::Success(f(v)),
            Self::Failed(e) => OperatorResult::Failed(e),
        }
    }

    /// Convert into a standard `Result`
    pub fn into_result(self) -> Result<T, OperatorError> {
        match self {
            Self::Success(v) => Ok(v),
            Self::Failed(e) => Err(e),
        }
    }
}

impl<T> From<Result<T, OperatorError>> for OperatorResult<T> {
    fn from(result: Result<T, OperatorError>) -> Self {
        match result {
            Ok(v) => Self::Success(v),
            Err(e) => Self::Failed(e),
        }
    }
}
