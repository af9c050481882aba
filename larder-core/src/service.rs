//! Recipe use cases.
//!
//! Each operation loads at most one aggregate, mutates it through its own methods
//! and hands it back to the store in a single `save`. The baseline rule is checked
//! here before any aggregate is touched, and again by the aggregate's mutators.

use crate::catalog::{count_baselines, DietTag};
use crate::error::{RecipeError, RecipeResult};
use crate::recipe::{IngredientSpec, Recipe, RecipeBase, RecipeDraft, RecipeId, StepSpec};
use crate::search;
use crate::store::{Page, PageRequest, RecipeStore};
use crate::view::RecipeView;
use std::collections::BTreeSet;
use std::sync::Arc;

#[derive(Debug, Clone)]
pub struct RecipeService {
    store: Arc<dyn RecipeStore>,
}

fn check_baselines(tags: &BTreeSet<DietTag>) -> RecipeResult<()> {
    let count = count_baselines(tags);
    if count > 1 {
        return Err(RecipeError::InvalidArgument(format!(
            "Only one baseline tag allowed (VEGAN/VEGETARIAN/PESCETARIAN/OMNIVORE), got {}",
            count
        )));
    }
    Ok(())
}

/// Stable sort by position; equal positions keep their input order.
fn sort_steps(mut steps: Vec<StepSpec>) -> Vec<StepSpec> {
    steps.sort_by_key(|s| s.position);
    steps
}

impl RecipeService {
    pub fn new(store: Arc<dyn RecipeStore>) -> Self {
        Self { store }
    }

    fn load(&self, id: RecipeId) -> RecipeResult<Recipe> {
        self.store
            .find_by_id(id)?
            .ok_or(RecipeError::NotFound(id))
    }

    /// Create a recipe with its children. Returns the persisted aggregate.
    pub fn create(&self, draft: RecipeDraft) -> RecipeResult<Recipe> {
        check_baselines(&draft.base.tags)?;
        let recipe = Recipe::new(draft)?;
        let saved = self.store.save(recipe)?;

        if let Some(id) = saved.id() {
            tracing::info!(
                recipe_id = id.get(),
                ingredients = saved.ingredients().len(),
                steps = saved.steps().len(),
                "Created recipe {}",
                id
            );
        }
        Ok(saved)
    }

    pub fn find_one(&self, id: RecipeId) -> RecipeResult<RecipeView> {
        let recipe = self.load(id)?;
        RecipeView::try_from(&recipe)
    }

    /// List recipes, filtered by `query` when it is not blank.
    pub fn find_paged(
        &self,
        query: Option<&str>,
        page: &PageRequest,
    ) -> RecipeResult<Page<RecipeView>> {
        tracing::debug!(
            query = ?search::normalize_query(query),
            page = page.page(),
            size = page.size(),
            sort = %page.sort(),
            "Listing recipes"
        );
        let found = search::find_page(self.store.as_ref(), query, page)?;

        let mut content = Vec::with_capacity(found.content.len());
        for recipe in &found.content {
            content.push(RecipeView::try_from(recipe)?);
        }
        Ok(Page {
            content,
            number: found.number,
            size: found.size,
            total_elements: found.total_elements,
            total_pages: found.total_pages,
            last: found.last,
        })
    }

    /// Overwrite scalars, tags and categories. Ingredients and steps are untouched.
    pub fn update_base(&self, id: RecipeId, base: RecipeBase) -> RecipeResult<()> {
        check_baselines(&base.tags)?;
        let mut recipe = self.load(id)?;
        recipe.apply_base(base)?;
        self.store.save(recipe)?;

        tracing::info!(recipe_id = id.get(), "Updated recipe {}", id);
        Ok(())
    }

    /// Overwrite everything, replacing both child collections in one save.
    pub fn update_full(&self, id: RecipeId, draft: RecipeDraft) -> RecipeResult<()> {
        let RecipeDraft {
            base,
            ingredients,
            steps,
        } = draft;
        check_baselines(&base.tags)?;

        let mut recipe = self.load(id)?;
        recipe.apply_base(base)?;
        recipe.replace_ingredients(ingredients);
        recipe.replace_steps(sort_steps(steps));
        self.store.save(recipe)?;

        tracing::info!(recipe_id = id.get(), "Replaced recipe {}", id);
        Ok(())
    }

    /// Replace all ingredients, keeping the given order.
    pub fn replace_ingredients(
        &self,
        id: RecipeId,
        ingredients: Vec<IngredientSpec>,
    ) -> RecipeResult<()> {
        let mut recipe = self.load(id)?;
        let count = ingredients.len();
        recipe.replace_ingredients(ingredients);
        self.store.save(recipe)?;

        tracing::info!(recipe_id = id.get(), count, "Replaced ingredients of recipe {}", id);
        Ok(())
    }

    /// Replace all steps, ordered by position.
    pub fn replace_steps(&self, id: RecipeId, steps: Vec<StepSpec>) -> RecipeResult<()> {
        let mut recipe = self.load(id)?;
        let count = steps.len();
        recipe.replace_steps(sort_steps(steps));
        self.store.save(recipe)?;

        tracing::info!(recipe_id = id.get(), count, "Replaced steps of recipe {}", id);
        Ok(())
    }

    pub fn delete(&self, id: RecipeId) -> RecipeResult<()> {
        if !self.store.delete_by_id(id)? {
            return Err(RecipeError::NotFound(id));
        }

        tracing::info!(recipe_id = id.get(), "Deleted recipe {}", id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn step(position: i32, text: &str) -> StepSpec {
        StepSpec {
            position,
            text: text.to_string(),
        }
    }

    #[test]
    fn test_check_baselines() {
        assert!(check_baselines(&BTreeSet::new()).is_ok());
        assert!(check_baselines(&[DietTag::Vegan, DietTag::NutFree].into()).is_ok());

        let err = check_baselines(&[DietTag::Vegan, DietTag::Omnivore].into()).unwrap_err();
        assert!(matches!(err, RecipeError::InvalidArgument(_)));
        assert!(err.to_string().contains("got 2"));
    }

    #[test]
    fn test_sort_steps_is_stable() {
        let sorted = sort_steps(vec![step(2, "b"), step(1, "a"), step(2, "c"), step(0, "z")]);
        let texts: Vec<_> = sorted.iter().map(|s| s.text.as_str()).collect();
        assert_eq!(texts, vec!["z", "a", "b", "c"]);
    }

    proptest! {
        #[test]
        fn prop_sort_steps_orders_by_position_stably(
            positions in prop::collection::vec(0i32..5, 0..30),
        ) {
            let input: Vec<_> = positions
                .iter()
                .enumerate()
                .map(|(i, &p)| step(p, &i.to_string()))
                .collect();

            let sorted = sort_steps(input);

            for pair in sorted.windows(2) {
                prop_assert!(pair[0].position <= pair[1].position);
                if pair[0].position == pair[1].position {
                    let a: usize = pair[0].text.parse().unwrap();
                    let b: usize = pair[1].text.parse().unwrap();
                    prop_assert!(a < b);
                }
            }
        }
    }
}
