use crate::api::{ErrorResponse, Violation};
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use larder_core::{ErrorKind, FieldViolation, RecipeError};

/// Handler error: a core failure on its way to becoming an HTTP response.
#[derive(Debug)]
pub struct ApiError(pub RecipeError);

impl From<RecipeError> for ApiError {
    fn from(err: RecipeError) -> Self {
        Self(err)
    }
}

impl From<Vec<FieldViolation>> for ApiError {
    fn from(violations: Vec<FieldViolation>) -> Self {
        Self(RecipeError::ValidationFailed(violations))
    }
}

pub type ApiResult<T> = Result<T, ApiError>;

pub fn status_for(kind: ErrorKind) -> StatusCode {
    match kind {
        ErrorKind::NotFound => StatusCode::NOT_FOUND,
        ErrorKind::InvalidArgument | ErrorKind::ValidationFailed => StatusCode::BAD_REQUEST,
        ErrorKind::Conflict => StatusCode::CONFLICT,
        ErrorKind::Unexpected => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = status_for(self.0.kind());

        let body = match self.0 {
            RecipeError::ValidationFailed(violations) => ErrorResponse {
                error: "Validation failed".to_string(),
                violations: Some(
                    violations
                        .into_iter()
                        .map(|v| Violation {
                            field: v.field,
                            message: v.message,
                        })
                        .collect(),
                ),
            },
            RecipeError::Unexpected(detail) => {
                tracing::error!("Unexpected error: {}", detail);
                ErrorResponse {
                    error: "Unexpected error".to_string(),
                    violations: None,
                }
            }
            other => ErrorResponse {
                error: other.to_string(),
                violations: None,
            },
        };

        (status, Json(body)).into_response()
    }
}
