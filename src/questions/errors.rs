//! Question configuration and encoding errors

use thiserror::Error;

use crate::content::ContentError;

/// Result type for question encoding
pub type QuestionResult<T> = Result<T, QuestionError>;

/// Result type for configuration validation
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Failure while encoding one question. Raised before anything is
/// appended to the pool document, so a failed add leaves the pool
/// untouched.
#[derive(Debug, Error)]
pub enum QuestionError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Content(#[from] ContentError),
}

/// Caller-supplied question parameters are inconsistent or incomplete.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Numeric bounds are reversed: low {low} > high {high}")]
    ReversedBounds { low: f64, high: f64 },

    #[error("Question '{0}' has no answers")]
    NoAnswers(String),

    #[error("Correct answer index {index} is out of range for {count} answers")]
    AnswerIndexOutOfRange { index: usize, count: usize },

    #[error("Question '{0}' selects no correct answers")]
    NoCorrectAnswers(String),

    #[error("Expected {expected} weights, got {actual}")]
    WeightCountMismatch { expected: usize, actual: usize },

    #[error("Display order is not a permutation of 0..{0}")]
    InvalidPermutation(usize),

    #[error("Blank '{0}' has no acceptable patterns")]
    EmptyBlank(String),

    #[error("Question '{0}' has no blanks")]
    NoBlanks(String),

    #[error("Question '{0}' has no answer pairs")]
    NoPairs(String),

    #[error("Variable '{0}' has an empty choice list")]
    NoChoices(String),

    #[error("Calculated question gave up after {0} rejected draws")]
    DrawsExhausted(usize),
}
