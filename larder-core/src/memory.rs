//! In-memory [`RecipeStore`], used by tests and for running the service without a
//! database.

use crate::error::StoreError;
use crate::recipe::{IngredientRecord, Recipe, RecipeId, RecipeRecord, StepRecord};
use crate::search;
use crate::store::{Page, PageRequest, RecipeStore};
use parking_lot::RwLock;
use std::collections::BTreeMap;

#[derive(Debug, Default)]
struct State {
    recipes: BTreeMap<RecipeId, Recipe>,
    last_recipe_id: i64,
    last_ingredient_id: i64,
    last_step_id: i64,
    writes: usize,
}

/// Thread-safe map-backed store. Identifiers are assigned from counters that never
/// reuse a value, mirroring an autoincrement column.
#[derive(Debug, Default)]
pub struct InMemoryRecipeStore {
    state: RwLock<State>,
}

impl InMemoryRecipeStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored recipes.
    pub fn count(&self) -> usize {
        self.state.read().recipes.len()
    }

    /// Number of successful `save` and `delete_by_id` calls so far.
    pub fn write_count(&self) -> usize {
        self.state.read().writes
    }

    fn page_of(
        &self,
        page: &PageRequest,
        keep: impl Fn(&Recipe) -> bool,
    ) -> Result<Page<Recipe>, StoreError> {
        let state = self.state.read();
        let mut matching: Vec<&Recipe> = state.recipes.values().filter(|r| keep(r)).collect();
        let sort = page.sort();
        matching.sort_by(|a, b| sort.compare(a, b));

        let total = matching.len() as u64;
        let offset = usize::try_from(page.offset()).unwrap_or(usize::MAX);
        let content = matching
            .into_iter()
            .skip(offset)
            .take(page.size() as usize)
            .cloned()
            .collect();

        Ok(Page::new(content, page, total))
    }
}

impl RecipeStore for InMemoryRecipeStore {
    fn save(&self, recipe: Recipe) -> Result<Recipe, StoreError> {
        let mut state = self.state.write();

        let id = match recipe.id() {
            Some(id) if state.recipes.contains_key(&id) => id,
            Some(id) => return Err(StoreError::Missing(id)),
            None => {
                state.last_recipe_id += 1;
                RecipeId::new(state.last_recipe_id)
            }
        };

        let mut ingredients = Vec::with_capacity(recipe.ingredients().len());
        for ingredient in recipe.ingredients() {
            let id = match ingredient.id() {
                Some(id) => id,
                None => {
                    state.last_ingredient_id += 1;
                    state.last_ingredient_id
                }
            };
            ingredients.push(IngredientRecord {
                id,
                name: ingredient.name().to_string(),
                amount: ingredient.amount(),
                unit: ingredient.unit(),
            });
        }

        let mut steps = Vec::with_capacity(recipe.steps().len());
        for step in recipe.steps() {
            let id = match step.id() {
                Some(id) => id,
                None => {
                    state.last_step_id += 1;
                    state.last_step_id
                }
            };
            steps.push(StepRecord {
                id,
                position: step.position(),
                text: step.text().to_string(),
            });
        }

        let record = RecipeRecord {
            id,
            title: recipe.title().to_string(),
            description: recipe.description().map(str::to_string),
            prep_minutes: recipe.prep_minutes(),
            cook_minutes: recipe.cook_minutes(),
            tags: recipe.tags().clone(),
            categories: recipe.categories().clone(),
            ingredients,
            steps,
        };
        let saved =
            Recipe::rehydrate(record).map_err(|e| StoreError::Corrupt(e.to_string()))?;

        state.recipes.insert(id, saved.clone());
        state.writes += 1;
        Ok(saved)
    }

    fn find_by_id(&self, id: RecipeId) -> Result<Option<Recipe>, StoreError> {
        Ok(self.state.read().recipes.get(&id).cloned())
    }

    fn exists_by_id(&self, id: RecipeId) -> Result<bool, StoreError> {
        Ok(self.state.read().recipes.contains_key(&id))
    }

    fn delete_by_id(&self, id: RecipeId) -> Result<bool, StoreError> {
        let mut state = self.state.write();
        let removed = state.recipes.remove(&id).is_some();
        if removed {
            state.writes += 1;
        }
        Ok(removed)
    }

    fn find_all(&self, page: &PageRequest) -> Result<Page<Recipe>, StoreError> {
        self.page_of(page, |_| true)
    }

    fn search(&self, query: &str, page: &PageRequest) -> Result<Page<Recipe>, StoreError> {
        let needle = query.to_lowercase();
        self.page_of(page, |r| search::matches(r, &needle))
    }
}
