use crate::schema::{ingredients, recipe_categories, recipe_diet_tags, recipe_steps, recipes};
use diesel::prelude::*;
use larder_core::{IngredientRecord, Recipe, StepRecord, Unit};
use rust_decimal::Decimal;
use std::str::FromStr;

#[derive(Queryable, Selectable, Debug)]
#[diesel(table_name = recipes)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct RecipeRow {
    pub id: i64,
    pub title: String,
    pub description: Option<String>,
    pub prep_minutes: i32,
    pub cook_minutes: i32,
}

/// Scalar columns of a recipe, used for both insert and update.
#[derive(Insertable, AsChangeset)]
#[diesel(table_name = recipes)]
#[diesel(treat_none_as_null = true)]
pub struct RecipeChanges<'a> {
    pub title: &'a str,
    pub description: Option<&'a str>,
    pub prep_minutes: i32,
    pub cook_minutes: i32,
}

impl<'a> From<&'a Recipe> for RecipeChanges<'a> {
    fn from(recipe: &'a Recipe) -> Self {
        Self {
            title: recipe.title(),
            description: recipe.description(),
            prep_minutes: recipe.prep_minutes(),
            cook_minutes: recipe.cook_minutes(),
        }
    }
}

#[derive(Insertable)]
#[diesel(table_name = recipe_diet_tags)]
pub struct NewDietTag<'a> {
    pub recipe_id: i64,
    pub diet_tag: &'a str,
}

#[derive(Insertable)]
#[diesel(table_name = recipe_categories)]
pub struct NewCategory<'a> {
    pub recipe_id: i64,
    pub category: &'a str,
}

#[derive(Queryable, Selectable, Debug)]
#[diesel(table_name = ingredients)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct IngredientRow {
    pub id: i64,
    pub recipe_id: i64,
    pub name: String,
    pub amount: String,
    pub unit: String,
}

impl IngredientRow {
    pub fn into_record(self) -> Result<IngredientRecord, String> {
        let amount = Decimal::from_str(&self.amount)
            .map_err(|e| format!("ingredient {} amount {:?}: {}", self.id, self.amount, e))?;
        let unit = Unit::parse(&self.unit)
            .ok_or_else(|| format!("ingredient {} has unknown unit {:?}", self.id, self.unit))?;

        Ok(IngredientRecord {
            id: self.id,
            name: self.name,
            amount,
            unit,
        })
    }
}

#[derive(Insertable)]
#[diesel(table_name = ingredients)]
pub struct NewIngredient<'a> {
    pub recipe_id: i64,
    pub name: &'a str,
    pub amount: String,
    pub unit: &'static str,
}

#[derive(Queryable, Selectable, Debug)]
#[diesel(table_name = recipe_steps)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct StepRow {
    pub id: i64,
    pub recipe_id: i64,
    pub position: i32,
    pub text: String,
}

impl From<StepRow> for StepRecord {
    fn from(row: StepRow) -> Self {
        StepRecord {
            id: row.id,
            position: row.position,
            text: row.text,
        }
    }
}

#[derive(Insertable)]
#[diesel(table_name = recipe_steps)]
pub struct NewStep<'a> {
    pub recipe_id: i64,
    pub position: i32,
    pub text: &'a str,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(amount: &str, unit: &str) -> IngredientRow {
        IngredientRow {
            id: 1,
            recipe_id: 1,
            name: "salt".to_string(),
            amount: amount.to_string(),
            unit: unit.to_string(),
        }
    }

    #[test]
    fn test_ingredient_row_keeps_precision() {
        let record = row("0.125", "TSP").into_record().unwrap();
        assert_eq!(record.amount, Decimal::new(125, 3));
        assert_eq!(record.unit, Unit::Tsp);
    }

    #[test]
    fn test_ingredient_row_rejects_garbage() {
        assert!(row("a pinch", "G").into_record().is_err());
        assert!(row("1", "SPOONFUL").into_record().is_err());
    }
}
