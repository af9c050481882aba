use super::IngredientRequest;
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

#[utoipa::path(
    put,
    path = "/api/recipes/{id}/ingredients",
    tag = "recipes",
    params(
        ("id" = i64, Path, description = "Recipe ID")
    ),
    request_body = Vec<IngredientRequest>,
    responses(
        (status = 204, description = "Ingredients replaced"),
        (status = 400, description = "Invalid request", body = ErrorResponse),
        (status = 404, description = "Recipe not found", body = ErrorResponse)
    )
)]
pub async fn replace_ingredients(
    State(service): State<AppState>,
    Path(id): Path<i64>,
    Json(request): Json<Vec<IngredientRequest>>,
) -> ApiResult<StatusCode> {
    let request = validated(request)?;
    service.replace_ingredients(
        RecipeId::new(id),
        request.into_iter().map(Into::into).collect(),
    )?;
    Ok(StatusCode::NO_CONTENT)
}
