//! Error types for validation and derivation.

use serde::Serialize;
use thiserror::Error;

use crate::models::InputField;

/// A single rejected input, reported before any derivation runs.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ValidationError {
    #[error("{field} is required and must be {}", .field.requirement())]
    MissingOrInvalidField { field: InputField },

    #[error("{field} cannot equal the entry price")]
    ConflictingInput { field: InputField },
}

impl ValidationError {
    pub fn field(&self) -> InputField {
        match self {
            Self::MissingOrInvalidField { field } | Self::ConflictingInput { field } => *field,
        }
    }
}

/// Terminal failure while deriving metrics. No partial result accompanies it.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CalcError {
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Division by zero: {0}")]
    DivisionByZero(String),

    #[error("Arithmetic overflow while computing {0}")]
    Overflow(String),
}

/// Failure of a full validate-then-derive evaluation.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EvaluationError {
    #[error("Input validation failed with {} error(s)", .0.len())]
    Invalid(Vec<ValidationError>),

    #[error(transparent)]
    Derivation(#[from] CalcError),
}

impl EvaluationError {
    /// Every message, one per line item.
    pub fn messages(&self) -> Vec<String> {
        match self {
            Self::Invalid(errors) => errors.iter().map(ToString::to_string).collect(),
            Self::Derivation(e) => vec![e.to_string()],
        }
    }
}

impl From<Vec<ValidationError>> for EvaluationError {
    fn from(errors: Vec<ValidationError>) -> Self {
        Self::Invalid(errors)
    }
}
