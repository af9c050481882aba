pub mod meta;
pub mod recipes;

use crate::AppState;
use axum::Router;
use serde::Serialize;
use utoipa::{OpenApi, ToSchema};

/// Shared error response used by all endpoints
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ErrorResponse {
    pub error: String,
    /// Present only for field validation failures
    #[serde(skip_serializing_if = "Option::is_none")]
    pub violations: Option<Vec<Violation>>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct Violation {
    /// Path to the offending field, e.g. `ingredients[2].amount`
    pub field: String,
    pub message: String,
}

/// All API routes, relative to the server root
pub fn router() -> Router<AppState> {
    Router::new()
        .nest("/api/recipes", recipes::router())
        .nest("/api/meta", meta::router())
}

/// Generate the complete OpenAPI spec by merging all module specs
pub fn openapi() -> utoipa::openapi::OpenApi {
    #[derive(OpenApi)]
    #[openapi(
        info(title = "Larder API", description = "Recipe catalog"),
        components(schemas(ErrorResponse, Violation))
    )]
    struct BaseApi;

    let mut spec = BaseApi::openapi();

    let modules: Vec<utoipa::openapi::OpenApi> =
        vec![recipes::ApiDoc::openapi(), meta::ApiDoc::openapi()];

    for module_spec in modules {
        spec.paths.paths.extend(module_spec.paths.paths);

        if let Some(module_components) = module_spec.components {
            if let Some(spec_components) = spec.components.as_mut() {
                spec_components.schemas.extend(module_components.schemas);
            }
        }
    }

    spec
}
