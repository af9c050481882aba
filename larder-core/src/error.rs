use crate::recipe::RecipeId;
use serde::Serialize;
use thiserror::Error;

/// One structural problem with an input field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldViolation {
    pub field: String,
    pub message: String,
}

impl FieldViolation {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// Transport-independent classification of a [`RecipeError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    NotFound,
    InvalidArgument,
    ValidationFailed,
    Conflict,
    Unexpected,
}

#[derive(Error, Debug)]
pub enum RecipeError {
    #[error("Recipe {0} not found")]
    NotFound(RecipeId),

    #[error("{0}")]
    InvalidArgument(String),

    /// A mutator refused to move the aggregate into a state that breaks an invariant.
    #[error("{0}")]
    InvalidAggregateState(String),

    #[error("Validation failed")]
    ValidationFailed(Vec<FieldViolation>),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Unexpected error: {0}")]
    Unexpected(String),
}

impl RecipeError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            RecipeError::NotFound(_) => ErrorKind::NotFound,
            RecipeError::InvalidArgument(_) | RecipeError::InvalidAggregateState(_) => {
                ErrorKind::InvalidArgument
            }
            RecipeError::ValidationFailed(_) => ErrorKind::ValidationFailed,
            RecipeError::Conflict(_) => ErrorKind::Conflict,
            RecipeError::Unexpected(_) => ErrorKind::Unexpected,
        }
    }
}

/// Failure reported by a [`crate::store::RecipeStore`] implementation.
#[derive(Error, Debug)]
pub enum StoreError {
    /// Uniqueness or integrity constraint violated.
    #[error("{0}")]
    Conflict(String),

    /// The aggregate vanished between load and write.
    #[error("Recipe {0} no longer exists")]
    Missing(RecipeId),

    /// Stored data could not be turned back into a valid aggregate.
    #[error("Corrupt recipe data: {0}")]
    Corrupt(String),

    #[error("Store unavailable: {0}")]
    Unavailable(String),

    #[error("Store error: {0}")]
    Backend(String),
}

impl From<StoreError> for RecipeError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Conflict(message) => RecipeError::Conflict(message),
            StoreError::Missing(id) => RecipeError::NotFound(id),
            other => RecipeError::Unexpected(other.to_string()),
        }
    }
}

pub type RecipeResult<T> = Result<T, RecipeError>;
