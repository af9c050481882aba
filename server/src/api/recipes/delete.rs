use crate::api::ErrorResponse;
use crate::error::ApiResult;
use crate::AppState;
use axum::{
    extract::{Path, State},
    http::StatusCode,
};
use larder_core::RecipeId;

#[utoipa::path(
    delete,
    path = "/api/recipes/{id}",
    tag = "recipes",
    params(
        ("id" = i64, Path, description = "Recipe ID")
    ),
    responses(
        (status = 204, description = "Recipe deleted"),
        (status = 404, description = "Recipe not found", body = ErrorResponse)
    )
)]
pub async fn delete_recipe(
    State(service): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<StatusCode> {
    service.delete(RecipeId::new(id))?;
    Ok(StatusCode::NO_CONTENT)
}
