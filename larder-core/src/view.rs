use crate::catalog::{DietTag, Unit};
use crate::error::RecipeError;
use crate::recipe::{Recipe, RecipeId};
use rust_decimal::Decimal;
use serde::Serialize;

/// Read-side projection of a persisted recipe, including derived fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RecipeView {
    pub id: RecipeId,
    pub title: String,
    pub description: Option<String>,
    pub prep_minutes: i32,
    pub cook_minutes: i32,
    pub total_minutes: i32,
    pub baseline_tag: Option<DietTag>,
    /// Catalog order
    pub tags: Vec<DietTag>,
    pub categories: Vec<String>,
    /// Creation order
    pub ingredients: Vec<IngredientView>,
    /// Position, then creation order
    pub steps: Vec<StepView>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IngredientView {
    pub id: i64,
    pub name: String,
    pub amount: Decimal,
    pub unit: Unit,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StepView {
    pub id: i64,
    pub position: i32,
    pub text: String,
}

fn unpersisted() -> RecipeError {
    RecipeError::Unexpected("cannot project a recipe that has not been persisted".to_string())
}

impl TryFrom<&Recipe> for RecipeView {
    type Error = RecipeError;

    fn try_from(recipe: &Recipe) -> Result<Self, Self::Error> {
        let id = recipe.id().ok_or_else(unpersisted)?;

        let mut ingredients = recipe
            .ingredients()
            .iter()
            .map(|i| {
                Ok(IngredientView {
                    id: i.id().ok_or_else(unpersisted)?,
                    name: i.name().to_string(),
                    amount: i.amount(),
                    unit: i.unit(),
                })
            })
            .collect::<Result<Vec<_>, RecipeError>>()?;
        ingredients.sort_by_key(|i| i.id);

        let mut steps = recipe
            .steps()
            .iter()
            .map(|s| {
                Ok(StepView {
                    id: s.id().ok_or_else(unpersisted)?,
                    position: s.position(),
                    text: s.text().to_string(),
                })
            })
            .collect::<Result<Vec<_>, RecipeError>>()?;
        steps.sort_by_key(|s| (s.position, s.id));

        Ok(Self {
            id,
            title: recipe.title().to_string(),
            description: recipe.description().map(str::to_string),
            prep_minutes: recipe.prep_minutes(),
            cook_minutes: recipe.cook_minutes(),
            total_minutes: recipe.total_minutes(),
            baseline_tag: recipe.baseline_tag(),
            tags: recipe.tags().iter().copied().collect(),
            categories: recipe.categories().iter().cloned().collect(),
            ingredients,
            steps,
        })
    }
}
