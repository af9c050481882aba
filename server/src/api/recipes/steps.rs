use super::StepRequest;
use crate::api::ErrorResponse;
use crate::error::ApiResult;
use crate::validation::validated;
use crate::AppState;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use larder_core::RecipeId;

/// Replace all steps. They are stored ordered by position; ties keep request order.
#[utoipa::path(
    put,
    path = "/api/recipes/{id}/steps",
    tag = "recipes",
    params(
        ("id" = i64, Path, description = "Recipe ID")
    ),
    request_body = Vec<StepRequest>,
    responses(
        (status = 204, description = "Steps replaced"),
        (status = 400, description = "Invalid request", body = ErrorResponse),
        (status = 404, description = "Recipe not found", body = ErrorResponse)
    )
)]
pub async fn replace_steps(
    State(service): State<AppState>,
    Path(id): Path<i64>,
    Json(request): Json<Vec<StepRequest>>,
) -> ApiResult<StatusCode> {
    let request = validated(request)?;
    service.replace_steps(
        RecipeId::new(id),
        request.into_iter().map(Into::into).collect(),
    )?;
    Ok(StatusCode::NO_CONTENT)
}
