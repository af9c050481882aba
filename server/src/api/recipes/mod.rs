pub mod create;
pub mod delete;
pub mod get;
pub mod ingredients;
pub mod list;
pub mod steps;
pub mod update;
pub mod update_full;

use crate::AppState;
use axum::routing::{get, put};
use axum::Router;
use larder_core::{DietTag, IngredientSpec, RecipeBase, RecipeDraft, StepSpec, Unit};
use rust_decimal::Decimal;
use serde::Deserialize;
use utoipa::{OpenApi, ToSchema};

/// Scalar fields, diet tags and categories of a recipe.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct RecipeBaseRequest {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    pub prep_minutes: i32,
    pub cook_minutes: i32,
    /// At most one of VEGAN, VEGETARIAN, PESCETARIAN, OMNIVORE
    pub diet_tags: Vec<DietTag>,
    pub categories: Vec<String>,
}

impl RecipeBaseRequest {
    pub fn into_base(self) -> RecipeBase {
        RecipeBase {
            title: self.title,
            description: self.description,
            prep_minutes: self.prep_minutes,
            cook_minutes: self.cook_minutes,
            tags: self.diet_tags.into_iter().collect(),
            categories: self.categories.into_iter().collect(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct IngredientRequest {
    pub name: String,
    /// Decimal amount, e.g. "250" or "0.5"
    #[schema(value_type = String, example = "250")]
    pub amount: Decimal,
    pub unit: Unit,
}

impl From<IngredientRequest> for IngredientSpec {
    fn from(request: IngredientRequest) -> Self {
        IngredientSpec {
            name: request.name,
            amount: request.amount,
            unit: request.unit,
        }
    }
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct StepRequest {
    /// Ordering key. Need not be unique or contiguous.
    pub position: i32,
    pub text: String,
}

impl From<StepRequest> for StepSpec {
    fn from(request: StepRequest) -> Self {
        StepSpec {
            position: request.position,
            text: request.text,
        }
    }
}

/// A complete recipe: base fields plus ingredients and steps.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct RecipeRequest {
    #[serde(flatten)]
    pub base: RecipeBaseRequest,
    pub ingredients: Vec<IngredientRequest>,
    pub steps: Vec<StepRequest>,
}

impl RecipeRequest {
    pub fn into_draft(self) -> RecipeDraft {
        RecipeDraft {
            base: self.base.into_base(),
            ingredients: self.ingredients.into_iter().map(Into::into).collect(),
            steps: self.steps.into_iter().map(Into::into).collect(),
        }
    }
}

/// Returns the router for /api/recipes endpoints (mounted at /api/recipes)
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list::list_recipes).post(create::create_recipe))
        .route(
            "/{id}",
            get(get::get_recipe)
                .put(update::update_recipe)
                .delete(delete::delete_recipe),
        )
        .route("/{id}/full", put(update_full::update_full_recipe))
        .route(
            "/{id}/ingredients",
            put(ingredients::replace_ingredients),
        )
        .route("/{id}/steps", put(steps::replace_steps))
}

#[derive(OpenApi)]
#[openapi(
    paths(
        create::create_recipe,
        list::list_recipes,
        get::get_recipe,
        update::update_recipe,
        update_full::update_full_recipe,
        ingredients::replace_ingredients,
        steps::replace_steps,
        delete::delete_recipe,
    ),
    components(schemas(
        RecipeBaseRequest,
        RecipeRequest,
        IngredientRequest,
        StepRequest,
        create::CreateRecipeResponse,
        get::RecipeResponse,
        get::IngredientResponse,
        get::StepResponse,
        list::RecipePageResponse,
        DietTag,
        Unit,
    ))
)]
pub struct ApiDoc;
