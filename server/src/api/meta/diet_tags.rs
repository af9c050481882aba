use axum::{response::IntoResponse, Json};
use larder_core::catalog;
use larder_core::{DietGroup, DietTag};
use serde::Serialize;
use utoipa::ToSchema;

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct DietTagInfo {
    pub name: DietTag,
    pub group: DietGroup,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct DietTagsResponse {
    /// Catalog order
    pub tags: Vec<DietTagInfo>,
}

#[utoipa::path(
    get,
    path = "/api/meta/diet-tags",
    tag = "meta",
    responses(
        (status = 200, description = "All diet tags with their group", body = DietTagsResponse)
    )
)]
pub async fn list_diet_tags() -> impl IntoResponse {
    let tags = catalog::all_tags()
        .map(|tag| DietTagInfo {
            name: tag,
            group: tag.group(),
        })
        .collect();

    Json(DietTagsResponse { tags })
}
