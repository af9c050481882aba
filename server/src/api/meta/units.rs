use axum::{response::IntoResponse, Json};
use larder_core::Unit;
use serde::Serialize;
use utoipa::ToSchema;

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct UnitsResponse {
    pub units: Vec<Unit>,
}

#[utoipa::path(
    get,
    path = "/api/meta/units",
    tag = "meta",
    responses(
        (status = 200, description = "All ingredient units", body = UnitsResponse)
    )
)]
pub async fn list_units() -> impl IntoResponse {
    Json(UnitsResponse {
        units: Unit::ALL.to_vec(),
    })
}
