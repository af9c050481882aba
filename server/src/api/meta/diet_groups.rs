use axum::{response::IntoResponse, Json};
use larder_core::catalog;
use larder_core::{DietGroup, DietTag};
use serde::Serialize;
use utoipa::ToSchema;

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct DietGroupInfo {
    pub group: DietGroup,
    /// A recipe may carry at most one tag from an exclusive group
    pub exclusive: bool,
    pub tags: Vec<DietTag>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct DietGroupsResponse {
    pub groups: Vec<DietGroupInfo>,
}

#[utoipa::path(
    get,
    path = "/api/meta/diet-groups",
    tag = "meta",
    responses(
        (status = 200, description = "Diet tags grouped by kind", body = DietGroupsResponse)
    )
)]
pub async fn list_diet_groups() -> impl IntoResponse {
    let groups = catalog::grouped()
        .into_iter()
        .map(|(group, tags)| DietGroupInfo {
            group,
            exclusive: group.is_exclusive(),
            tags,
        })
        .collect();

    Json(DietGroupsResponse { groups })
}
