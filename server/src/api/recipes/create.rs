use super::RecipeRequest;
use crate::api::ErrorResponse;
use crate::error::ApiResult;
use crate::validation::validated;
use crate::AppState;
use axum::{
    extract::State,
    http::{header, StatusCode},
    response::IntoResponse,
    Json,
};
use larder_core::RecipeError;
use serde::Serialize;
use utoipa::ToSchema;

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct CreateRecipeResponse {
    pub id: i64,
}

#[utoipa::path(
    post,
    path = "/api/recipes",
    tag = "recipes",
    request_body = RecipeRequest,
    responses(
        (status = 201, description = "Recipe created successfully", body = CreateRecipeResponse,
            headers(("Location" = String, description = "URL of the new recipe"))),
        (status = 400, description = "Invalid request", body = ErrorResponse)
    )
)]
pub async fn create_recipe(
    State(service): State<AppState>,
    Json(request): Json<RecipeRequest>,
) -> ApiResult<impl IntoResponse> {
    let request = validated(request)?;
    let recipe = service.create(request.into_draft())?;

    let id = recipe
        .id()
        .ok_or_else(|| RecipeError::Unexpected("saved recipe has no id".to_string()))?
        .get();
    Ok((
        StatusCode::CREATED,
        [(header::LOCATION, format!("/api/recipes/{}", id))],
        Json(CreateRecipeResponse { id }),
    ))
}
