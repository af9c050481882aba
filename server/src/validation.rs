//! Field-level checks on request bodies, run before anything reaches the core.
//!
//! Every rule is evaluated and all violations are reported together.

use crate::api::recipes::{IngredientRequest, RecipeBaseRequest, RecipeRequest, StepRequest};
use crate::error::ApiError;
use larder_core::FieldViolation;
use rust_decimal::Decimal;
use std::collections::BTreeSet;

pub const MAX_DESCRIPTION_CHARS: usize = 2000;
pub const MAX_DIET_TAGS: usize = 20;
pub const MAX_CATEGORIES: usize = 20;
pub const MAX_CATEGORY_CHARS: usize = 100;
pub const MAX_INGREDIENTS: usize = 100;
pub const MAX_STEPS: usize = 200;
pub const MAX_STEP_TEXT_CHARS: usize = 2000;

#[derive(Debug, Default)]
pub struct Violations(Vec<FieldViolation>);

impl Violations {
    pub fn check(&mut self, ok: bool, field: impl Into<String>, message: impl Into<String>) {
        if !ok {
            self.0.push(FieldViolation::new(field, message));
        }
    }

    pub fn not_blank(&mut self, value: &str, field: impl Into<String>) {
        self.check(!value.trim().is_empty(), field, "must not be blank");
    }

    pub fn max_chars(&mut self, value: &str, max: usize, field: impl Into<String>) {
        self.check(
            value.chars().count() <= max,
            field,
            format!("must be at most {} characters", max),
        );
    }

    pub fn max_items<T>(&mut self, items: &[T], max: usize, field: impl Into<String>) {
        self.check(
            items.len() <= max,
            field,
            format!("must contain at most {} items", max),
        );
    }

    pub fn into_result(self) -> Result<(), Vec<FieldViolation>> {
        if self.0.is_empty() {
            Ok(())
        } else {
            Err(self.0)
        }
    }
}

pub trait Validate {
    /// Record every problem with `self`, naming fields under `prefix`.
    fn validate(&self, prefix: &str, violations: &mut Violations);
}

fn field(prefix: &str, name: &str) -> String {
    if prefix.is_empty() {
        name.to_string()
    } else {
        format!("{}.{}", prefix, name)
    }
}

/// Return the value untouched if it is valid, or every violation found.
pub fn validated<T: Validate>(value: T) -> Result<T, ApiError> {
    let mut violations = Violations::default();
    value.validate("", &mut violations);
    violations.into_result()?;
    Ok(value)
}

impl Validate for RecipeBaseRequest {
    fn validate(&self, prefix: &str, v: &mut Violations) {
        v.not_blank(&self.title, field(prefix, "title"));
        if let Some(description) = &self.description {
            v.max_chars(description, MAX_DESCRIPTION_CHARS, field(prefix, "description"));
        }
        v.check(
            self.prep_minutes >= 0,
            field(prefix, "prep_minutes"),
            "must not be negative",
        );
        v.check(
            self.cook_minutes >= 0,
            field(prefix, "cook_minutes"),
            "must not be negative",
        );
        // Duplicates collapse into one tag
        let distinct_tags: Vec<_> = self
            .diet_tags
            .iter()
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();
        v.max_items(&distinct_tags, MAX_DIET_TAGS, field(prefix, "diet_tags"));
        v.max_items(&self.categories, MAX_CATEGORIES, field(prefix, "categories"));
        for (i, category) in self.categories.iter().enumerate() {
            let name = field(prefix, &format!("categories[{}]", i));
            v.not_blank(category, name.clone());
            v.max_chars(category, MAX_CATEGORY_CHARS, name);
        }
    }
}

impl Validate for IngredientRequest {
    fn validate(&self, prefix: &str, v: &mut Violations) {
        v.not_blank(&self.name, field(prefix, "name"));
        v.check(
            self.amount > Decimal::ZERO,
            field(prefix, "amount"),
            "must be greater than 0",
        );
    }
}

impl Validate for StepRequest {
    fn validate(&self, prefix: &str, v: &mut Violations) {
        v.check(
            self.position >= 0,
            field(prefix, "position"),
            "must not be negative",
        );
        v.not_blank(&self.text, field(prefix, "text"));
        v.max_chars(&self.text, MAX_STEP_TEXT_CHARS, field(prefix, "text"));
    }
}

impl Validate for Vec<IngredientRequest> {
    fn validate(&self, prefix: &str, v: &mut Violations) {
        let name = if prefix.is_empty() { "ingredients" } else { prefix };
        v.max_items(self, MAX_INGREDIENTS, name);
        for (i, ingredient) in self.iter().enumerate() {
            ingredient.validate(&format!("{}[{}]", name, i), v);
        }
    }
}

impl Validate for Vec<StepRequest> {
    fn validate(&self, prefix: &str, v: &mut Violations) {
        let name = if prefix.is_empty() { "steps" } else { prefix };
        v.max_items(self, MAX_STEPS, name);
        for (i, step) in self.iter().enumerate() {
            step.validate(&format!("{}[{}]", name, i), v);
        }
    }
}

impl Validate for RecipeRequest {
    fn validate(&self, prefix: &str, v: &mut Violations) {
        self.base.validate(prefix, v);
        self.ingredients.validate(&field(prefix, "ingredients"), v);
        self.steps.validate(&field(prefix, "steps"), v);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use larder_core::{DietTag, RecipeError, Unit};

    fn base() -> RecipeBaseRequest {
        RecipeBaseRequest {
            title: "Pad Thai".to_string(),
            description: Some("Rice noodles".to_string()),
            prep_minutes: 20,
            cook_minutes: 10,
            diet_tags: vec![DietTag::Pescetarian],
            categories: vec!["Thai".to_string()],
        }
    }

    fn violations<T: Validate>(value: T) -> Vec<FieldViolation> {
        match validated(value) {
            Ok(_) => vec![],
            Err(ApiError(RecipeError::ValidationFailed(violations))) => violations,
            Err(other) => panic!("unexpected error: {:?}", other),
        }
    }

    fn fields(violations: &[FieldViolation]) -> Vec<&str> {
        violations.iter().map(|v| v.field.as_str()).collect()
    }

    #[test]
    fn test_valid_base_passes() {
        assert!(violations(base()).is_empty());
    }

    #[test]
    fn test_collects_every_base_violation() {
        let request = RecipeBaseRequest {
            title: "   ".to_string(),
            description: Some("x".repeat(MAX_DESCRIPTION_CHARS + 1)),
            prep_minutes: -1,
            cook_minutes: -5,
            diet_tags: vec![],
            categories: vec!["".to_string(), "y".repeat(MAX_CATEGORY_CHARS + 1)],
        };

        let found = violations(request);
        assert_eq!(
            fields(&found),
            vec![
                "title",
                "description",
                "prep_minutes",
                "cook_minutes",
                "categories[0]",
                "categories[1]"
            ]
        );
    }

    #[test]
    fn test_description_limit_counts_characters() {
        let mut request = base();
        request.description = Some("é".repeat(MAX_DESCRIPTION_CHARS));
        assert!(violations(request).is_empty());
    }

    #[test]
    fn test_duplicate_diet_tags_count_once() {
        let mut request = base();
        request.diet_tags = vec![DietTag::NutFree; MAX_DIET_TAGS + 5];
        assert!(violations(request).is_empty());
    }

    #[test]
    fn test_too_many_categories() {
        let mut request = base();
        request.categories = (0..=MAX_CATEGORIES).map(|i| format!("c{}", i)).collect();
        assert_eq!(fields(&violations(request)), vec!["categories"]);
    }

    #[test]
    fn test_children_are_indexed() {
        let request = RecipeRequest {
            base: base(),
            ingredients: vec![
                IngredientRequest {
                    name: "noodles".to_string(),
                    amount: Decimal::new(200, 0),
                    unit: Unit::G,
                },
                IngredientRequest {
                    name: "".to_string(),
                    amount: Decimal::ZERO,
                    unit: Unit::Pcs,
                },
            ],
            steps: vec![StepRequest {
                position: -1,
                text: "soak".to_string(),
            }],
        };

        assert_eq!(
            fields(&violations(request)),
            vec!["ingredients[1].name", "ingredients[1].amount", "steps[0].position"]
        );
    }

    #[test]
    fn test_bare_step_list() {
        let steps = vec![
            StepRequest {
                position: 0,
                text: "ok".to_string(),
            },
            StepRequest {
                position: 1,
                text: "z".repeat(MAX_STEP_TEXT_CHARS + 1),
            },
        ];
        assert_eq!(fields(&violations(steps)), vec!["steps[1].text"]);
    }

    #[test]
    fn test_too_many_ingredients() {
        let ingredients: Vec<_> = (0..=MAX_INGREDIENTS)
            .map(|i| IngredientRequest {
                name: format!("item {}", i),
                amount: Decimal::ONE,
                unit: Unit::Pinch,
            })
            .collect();
        assert_eq!(fields(&violations(ingredients)), vec!["ingredients"]);
    }
}
