use super::RecipeBaseRequest;
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

/// Replace title, description, times, diet tags and categories.
/// Ingredients and steps are left alone.
#[utoipa::path(
    put,
    path = "/api/recipes/{id}",
    tag = "recipes",
    params(
        ("id" = i64, Path, description = "Recipe ID")
    ),
    request_body = RecipeBaseRequest,
    responses(
        (status = 204, description = "Recipe updated"),
        (status = 400, description = "Invalid request", body = ErrorResponse),
        (status = 404, description = "Recipe not found", body = ErrorResponse)
    )
)]
pub async fn update_recipe(
    State(service): State<AppState>,
    Path(id): Path<i64>,
    Json(request): Json<RecipeBaseRequest>,
) -> ApiResult<StatusCode> {
    let request = validated(request)?;
    service.update_base(RecipeId::new(id), request.into_base())?;
    Ok(StatusCode::NO_CONTENT)
}
