//! Read-only catalog listings so clients can build pickers without hardcoding enums.

pub mod diet_groups;
pub mod diet_tags;
pub mod units;

use crate::AppState;
use axum::routing::get;
use axum::Router;
use utoipa::OpenApi;

/// Returns the router for /api/meta endpoints (mounted at /api/meta)
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/units", get(units::list_units))
        .route("/diet-tags", get(diet_tags::list_diet_tags))
        .route("/diet-groups", get(diet_groups::list_diet_groups))
}

#[derive(OpenApi)]
#[openapi(
    paths(
        units::list_units,
        diet_tags::list_diet_tags,
        diet_groups::list_diet_groups,
    ),
    components(schemas(
        units::UnitsResponse,
        diet_tags::DietTagsResponse,
        diet_tags::DietTagInfo,
        diet_groups::DietGroupsResponse,
        diet_groups::DietGroupInfo,
        larder_core::DietGroup,
    ))
)]
pub struct ApiDoc;
