use crate::api::ErrorResponse;
use crate::error::ApiResult;
use crate::AppState;
use axum::{
    extract::{Path, State},
    response::IntoResponse,
    Json,
};
use larder_core::{DietTag, IngredientView, RecipeId, RecipeView, StepView, Unit};
use rust_decimal::Decimal;
use serde::Serialize;
use utoipa::ToSchema;

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct IngredientResponse {
    pub id: i64,
    pub name: String,
    #[schema(value_type = String, example = "250")]
    pub amount: Decimal,
    pub unit: Unit,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct StepResponse {
    pub id: i64,
    pub position: i32,
    pub text: String,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct RecipeResponse {
    pub id: i64,
    pub title: String,
    pub description: Option<String>,
    pub prep_minutes: i32,
    pub cook_minutes: i32,
    /// prep_minutes + cook_minutes
    pub total_minutes: i32,
    /// The single baseline diet tag, if any
    pub baseline_tag: Option<DietTag>,
    pub diet_tags: Vec<DietTag>,
    pub categories: Vec<String>,
    pub ingredients: Vec<IngredientResponse>,
    /// Ordered by position
    pub steps: Vec<StepResponse>,
}

impl From<IngredientView> for IngredientResponse {
    fn from(view: IngredientView) -> Self {
        Self {
            id: view.id,
            name: view.name,
            amount: view.amount,
            unit: view.unit,
        }
    }
}

impl From<StepView> for StepResponse {
    fn from(view: StepView) -> Self {
        Self {
            id: view.id,
            position: view.position,
            text: view.text,
        }
    }
}

impl From<RecipeView> for RecipeResponse {
    fn from(view: RecipeView) -> Self {
        Self {
            id: view.id.get(),
            title: view.title,
            description: view.description,
            prep_minutes: view.prep_minutes,
            cook_minutes: view.cook_minutes,
            total_minutes: view.total_minutes,
            baseline_tag: view.baseline_tag,
            diet_tags: view.tags,
            categories: view.categories,
            ingredients: view.ingredients.into_iter().map(Into::into).collect(),
            steps: view.steps.into_iter().map(Into::into).collect(),
        }
    }
}

#[utoipa::path(
    get,
    path = "/api/recipes/{id}",
    tag = "recipes",
    params(
        ("id" = i64, Path, description = "Recipe ID")
    ),
    responses(
        (status = 200, description = "Recipe details", body = RecipeResponse),
        (status = 404, description = "Recipe not found", body = ErrorResponse)
    )
)]
pub async fn get_recipe(
    State(service): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<impl IntoResponse> {
    let view = service.find_one(RecipeId::new(id))?;
    Ok(Json(RecipeResponse::from(view)))
}
