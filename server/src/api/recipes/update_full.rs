use super::RecipeRequest;
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

/// Replace everything about a recipe, children included.
#[utoipa::path(
    put,
    path = "/api/recipes/{id}/full",
    tag = "recipes",
    params(
        ("id" = i64, Path, description = "Recipe ID")
    ),
    request_body = RecipeRequest,
    responses(
        (status = 204, description = "Recipe replaced"),
        (status = 400, description = "Invalid request", body = ErrorResponse),
        (status = 404, description = "Recipe not found", body = ErrorResponse)
    )
)]
pub async fn update_full_recipe(
    State(service): State<AppState>,
    Path(id): Path<i64>,
    Json(request): Json<RecipeRequest>,
) -> ApiResult<StatusCode> {
    let request = validated(request)?;
    service.update_full(RecipeId::new(id), request.into_draft())?;
    Ok(StatusCode::NO_CONTENT)
}
