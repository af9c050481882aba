//! The recipe aggregate and its child entities.
//!
//! A [`Recipe`] owns its ingredients and steps by value. Children only remember the
//! identifier of the recipe that owns them, which is `None` until the recipe has
//! been persisted for the first time.
//!
//! Every mutator that can touch the tag set re-checks the baseline rule against the
//! prospective state before committing, so an error always leaves the aggregate as
//! it was.

use crate::catalog::{count_baselines, DietTag, Unit};
use crate::error::{RecipeError, RecipeResult};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// Store-assigned recipe identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecipeId(i64);

impl RecipeId {
    pub const fn new(id: i64) -> Self {
        Self(id)
    }

    pub const fn get(self) -> i64 {
        self.0
    }
}

impl fmt::Display for RecipeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i64> for RecipeId {
    fn from(id: i64) -> Self {
        Self(id)
    }
}

/// Input for one ingredient of a recipe.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IngredientSpec {
    pub name: String,
    pub amount: Decimal,
    pub unit: Unit,
}

/// Input for one preparation step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepSpec {
    pub position: i32,
    pub text: String,
}

/// Scalar fields plus tags and categories. Used by base updates.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecipeBase {
    pub title: String,
    pub description: Option<String>,
    pub prep_minutes: i32,
    pub cook_minutes: i32,
    pub tags: BTreeSet<DietTag>,
    pub categories: BTreeSet<String>,
}

/// Everything needed to build a complete recipe. Used by create and full update.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecipeDraft {
    pub base: RecipeBase,
    pub ingredients: Vec<IngredientSpec>,
    pub steps: Vec<StepSpec>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ingredient {
    id: Option<i64>,
    recipe_id: Option<RecipeId>,
    name: String,
    amount: Decimal,
    unit: Unit,
}

impl Ingredient {
    fn from_spec(spec: IngredientSpec, owner: Option<RecipeId>) -> Self {
        Self {
            id: None,
            recipe_id: owner,
            name: spec.name,
            amount: spec.amount,
            unit: spec.unit,
        }
    }

    pub fn id(&self) -> Option<i64> {
        self.id
    }

    /// Identifier of the owning recipe.
    pub fn recipe_id(&self) -> Option<RecipeId> {
        self.recipe_id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn amount(&self) -> Decimal {
        self.amount
    }

    pub fn unit(&self) -> Unit {
        self.unit
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Step {
    id: Option<i64>,
    recipe_id: Option<RecipeId>,
    position: i32,
    text: String,
}

impl Step {
    fn from_spec(spec: StepSpec, owner: Option<RecipeId>) -> Self {
        Self {
            id: None,
            recipe_id: owner,
            position: spec.position,
            text: spec.text,
        }
    }

    pub fn id(&self) -> Option<i64> {
        self.id
    }

    pub fn recipe_id(&self) -> Option<RecipeId> {
        self.recipe_id
    }

    pub fn position(&self) -> i32 {
        self.position
    }

    pub fn text(&self) -> &str {
        &self.text
    }
}

/// Persisted form of an ingredient, as handed back by a store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IngredientRecord {
    pub id: i64,
    pub name: String,
    pub amount: Decimal,
    pub unit: Unit,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepRecord {
    pub id: i64,
    pub position: i32,
    pub text: String,
}

/// Persisted form of a whole recipe. Stores build one of these and call
/// [`Recipe::rehydrate`], which re-checks the invariants.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecipeRecord {
    pub id: RecipeId,
    pub title: String,
    pub description: Option<String>,
    pub prep_minutes: i32,
    pub cook_minutes: i32,
    pub tags: BTreeSet<DietTag>,
    pub categories: BTreeSet<String>,
    pub ingredients: Vec<IngredientRecord>,
    pub steps: Vec<StepRecord>,
}

/// Aggregate root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Recipe {
    id: Option<RecipeId>,
    title: String,
    description: Option<String>,
    prep_minutes: i32,
    cook_minutes: i32,
    tags: BTreeSet<DietTag>,
    categories: BTreeSet<String>,
    ingredients: Vec<Ingredient>,
    steps: Vec<Step>,
}

fn ensure_single_baseline(tags: &BTreeSet<DietTag>) -> RecipeResult<()> {
    let count = count_baselines(tags);
    if count > 1 {
        return Err(RecipeError::InvalidAggregateState(format!(
            "Only one baseline tag allowed (VEGAN/VEGETARIAN/PESCETARIAN/OMNIVORE), got {}",
            count
        )));
    }
    Ok(())
}

impl Recipe {
    /// Build a new, not yet persisted recipe. Children are kept in the given order.
    pub fn new(draft: RecipeDraft) -> RecipeResult<Self> {
        let RecipeDraft {
            base,
            ingredients,
            steps,
        } = draft;

        let mut recipe = Self {
            id: None,
            title: String::new(),
            description: None,
            prep_minutes: 0,
            cook_minutes: 0,
            tags: BTreeSet::new(),
            categories: BTreeSet::new(),
            ingredients: Vec::new(),
            steps: Vec::new(),
        };
        recipe.apply_base(base)?;
        recipe.replace_ingredients(ingredients);
        recipe.replace_steps(steps);
        Ok(recipe)
    }

    /// Rebuild an aggregate from stored data.
    pub fn rehydrate(record: RecipeRecord) -> RecipeResult<Self> {
        ensure_single_baseline(&record.tags)?;
        let owner = Some(record.id);

        Ok(Self {
            id: owner,
            title: record.title,
            description: record.description,
            prep_minutes: record.prep_minutes,
            cook_minutes: record.cook_minutes,
            tags: record.tags,
            categories: record.categories,
            ingredients: record
                .ingredients
                .into_iter()
                .map(|i| Ingredient {
                    id: Some(i.id),
                    recipe_id: owner,
                    name: i.name,
                    amount: i.amount,
                    unit: i.unit,
                })
                .collect(),
            steps: record
                .steps
                .into_iter()
                .map(|s| Step {
                    id: Some(s.id),
                    recipe_id: owner,
                    position: s.position,
                    text: s.text,
                })
                .collect(),
        })
    }

    pub fn id(&self) -> Option<RecipeId> {
        self.id
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn prep_minutes(&self) -> i32 {
        self.prep_minutes
    }

    pub fn cook_minutes(&self) -> i32 {
        self.cook_minutes
    }

    pub fn tags(&self) -> &BTreeSet<DietTag> {
        &self.tags
    }

    pub fn categories(&self) -> &BTreeSet<String> {
        &self.categories
    }

    pub fn ingredients(&self) -> &[Ingredient] {
        &self.ingredients
    }

    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    /// Prep plus cook time, negative parts counted as zero. Never stored.
    pub fn total_minutes(&self) -> i32 {
        self.prep_minutes
            .max(0)
            .saturating_add(self.cook_minutes.max(0))
    }

    pub fn baseline_tag(&self) -> Option<DietTag> {
        self.tags.iter().copied().find(|tag| tag.is_baseline())
    }

    pub fn set_title(&mut self, title: impl Into<String>) {
        self.title = title.into();
    }

    pub fn set_description(&mut self, description: Option<String>) {
        self.description = description;
    }

    pub fn set_prep_minutes(&mut self, minutes: i32) {
        self.prep_minutes = minutes;
    }

    pub fn set_cook_minutes(&mut self, minutes: i32) {
        self.cook_minutes = minutes;
    }

    /// Replace the tag set. Fails without side effects on a second baseline tag.
    pub fn set_tags(&mut self, tags: BTreeSet<DietTag>) -> RecipeResult<()> {
        ensure_single_baseline(&tags)?;
        self.tags = tags;
        Ok(())
    }

    /// Add one tag. Returns whether the tag was newly inserted.
    pub fn add_tag(&mut self, tag: DietTag) -> RecipeResult<bool> {
        if self.tags.contains(&tag) {
            return Ok(false);
        }
        let mut next = self.tags.clone();
        next.insert(tag);
        ensure_single_baseline(&next)?;
        self.tags = next;
        Ok(true)
    }

    pub fn remove_tag(&mut self, tag: DietTag) -> bool {
        self.tags.remove(&tag)
    }

    /// Swap the baseline tag: any existing one is dropped, `tag` (if any) is added.
    pub fn set_baseline_tag(&mut self, tag: Option<DietTag>) -> RecipeResult<()> {
        if let Some(tag) = tag {
            if !tag.is_baseline() {
                return Err(RecipeError::InvalidArgument(format!(
                    "{} is not a baseline tag",
                    tag
                )));
            }
        }
        self.tags.retain(|t| !t.is_baseline());
        self.tags.extend(tag);
        Ok(())
    }

    pub fn set_categories(&mut self, categories: BTreeSet<String>) {
        self.categories = categories;
    }

    pub fn add_category(&mut self, category: impl Into<String>) -> bool {
        self.categories.insert(category.into())
    }

    pub fn remove_category(&mut self, category: &str) -> bool {
        self.categories.remove(category)
    }

    /// Overwrite scalars, tags and categories. Children are left alone.
    pub fn apply_base(&mut self, base: RecipeBase) -> RecipeResult<()> {
        // Tags first: the only fallible part, so a failure changes nothing.
        self.set_tags(base.tags)?;
        self.title = base.title;
        self.description = base.description;
        self.prep_minutes = base.prep_minutes;
        self.cook_minutes = base.cook_minutes;
        self.categories = base.categories;
        Ok(())
    }

    /// Drop every ingredient and install fresh ones built from `specs`, in order.
    pub fn replace_ingredients(&mut self, specs: Vec<IngredientSpec>) {
        let owner = self.id;
        self.ingredients = specs
            .into_iter()
            .map(|spec| Ingredient::from_spec(spec, owner))
            .collect();
    }

    /// Drop every step and install fresh ones built from `specs`, in order.
    pub fn replace_steps(&mut self, specs: Vec<StepSpec>) {
        let owner = self.id;
        self.steps = specs
            .into_iter()
            .map(|spec| Step::from_spec(spec, owner))
            .collect();
    }
}
