pub mod catalog;
pub mod error;
pub mod memory;
pub mod recipe;
pub mod search;
pub mod service;
pub mod store;
pub mod view;

pub use catalog::{DietGroup, DietTag, Unit};
pub use error::{ErrorKind, FieldViolation, RecipeError, RecipeResult, StoreError};
pub use memory::InMemoryRecipeStore;
pub use recipe::{
    Ingredient, IngredientRecord, IngredientSpec, Recipe, RecipeBase, RecipeDraft, RecipeId,
    RecipeRecord, Step, StepRecord, StepSpec,
};
pub use service::RecipeService;
pub use store::{
    Direction, Page, PageRequest, RecipeStore, Sort, SortField, DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE,
};
pub use view::{IngredientView, RecipeView, StepView};
