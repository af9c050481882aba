use super::get::RecipeResponse;
use crate::api::ErrorResponse;
use crate::error::ApiResult;
use crate::AppState;
use axum::{
    extract::{Query, State},
    response::IntoResponse,
    Json,
};
use larder_core::{Page, PageRequest, Sort, DEFAULT_PAGE_SIZE};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ListRecipesParams {
    /// Case-insensitive text matched against title, description and categories
    pub q: Option<String>,
    /// Zero-based page number (default: 0)
    pub page: Option<u32>,
    /// Page size, clamped to 1..=100 (default: 20)
    pub size: Option<u32>,
    /// `field[,asc|desc]` where field is id, title, prep_minutes or cook_minutes (default: id,desc)
    pub sort: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct RecipePageResponse {
    pub content: Vec<RecipeResponse>,
    /// Zero-based page number
    pub number: u32,
    pub size: u32,
    pub total_elements: u64,
    pub total_pages: u64,
    pub last: bool,
}

impl From<Page<RecipeResponse>> for RecipePageResponse {
    fn from(page: Page<RecipeResponse>) -> Self {
        Self {
            content: page.content,
            number: page.number,
            size: page.size,
            total_elements: page.total_elements,
            total_pages: page.total_pages,
            last: page.last,
        }
    }
}

impl ListRecipesParams {
    fn page_request(&self) -> ApiResult<PageRequest> {
        let sort = match self.sort.as_deref() {
            Some(sort) => Sort::parse(sort)?,
            None => Sort::default(),
        };
        Ok(PageRequest::new(
            self.page.unwrap_or(0),
            self.size.unwrap_or(DEFAULT_PAGE_SIZE),
            sort,
        ))
    }
}

#[utoipa::path(
    get,
    path = "/api/recipes",
    tag = "recipes",
    params(ListRecipesParams),
    responses(
        (status = 200, description = "Page of recipes", body = RecipePageResponse),
        (status = 400, description = "Invalid paging or sort parameters", body = ErrorResponse)
    )
)]
pub async fn list_recipes(
    State(service): State<AppState>,
    Query(params): Query<ListRecipesParams>,
) -> ApiResult<impl IntoResponse> {
    let request = params.page_request()?;
    let page = service.find_paged(params.q.as_deref(), &request)?;
    Ok(Json(RecipePageResponse::from(page.map(RecipeResponse::from))))
}
