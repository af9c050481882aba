//! [`RecipeStore`] on SQLite through diesel.
//!
//! Every public call checks out one pooled connection and runs in one transaction.
//! Aggregates are loaded in batches: one query per table for a whole page.

use crate::db::{lower_unicode, DbPool};
use crate::models::{
    IngredientRow, NewCategory, NewDietTag, NewIngredient, NewStep, RecipeChanges, RecipeRow,
    StepRow,
};
use crate::schema::{ingredients, recipe_categories, recipe_diet_tags, recipe_steps, recipes};
use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, PoolError, PooledConnection};
use diesel::result::DatabaseErrorKind;
use diesel::sqlite::Sqlite;
use larder_core::recipe::{IngredientRecord, RecipeRecord, StepRecord};
use larder_core::search::like_pattern;
use larder_core::store::{Direction, Page, PageRequest, RecipeStore, SortField};
use larder_core::{DietTag, Recipe, RecipeId, StoreError};
use std::collections::{BTreeSet, HashMap};
use std::fmt;
use thiserror::Error;

type Conn = PooledConnection<ConnectionManager<SqliteConnection>>;

#[derive(Error, Debug)]
pub enum DbError {
    #[error(transparent)]
    Query(#[from] diesel::result::Error),

    #[error(transparent)]
    Pool(#[from] PoolError),

    #[error("{0}")]
    Corrupt(String),

    #[error("Recipe {0} no longer exists")]
    Missing(RecipeId),
}

impl From<DbError> for StoreError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::Query(diesel::result::Error::DatabaseError(kind, info)) => match kind {
                DatabaseErrorKind::UniqueViolation
                | DatabaseErrorKind::ForeignKeyViolation
                | DatabaseErrorKind::NotNullViolation
                | DatabaseErrorKind::CheckViolation => {
                    StoreError::Conflict(info.message().to_string())
                }
                _ => StoreError::Backend(info.message().to_string()),
            },
            DbError::Query(e) => StoreError::Backend(e.to_string()),
            DbError::Pool(e) => StoreError::Unavailable(e.to_string()),
            DbError::Corrupt(message) => StoreError::Corrupt(message),
            DbError::Missing(id) => StoreError::Missing(id),
        }
    }
}

#[derive(Clone)]
pub struct DieselRecipeStore {
    pool: DbPool,
}

impl fmt::Debug for DieselRecipeStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.pool.state();
        f.debug_struct("DieselRecipeStore")
            .field("connections", &state.connections)
            .field("idle_connections", &state.idle_connections)
            .finish()
    }
}

impl DieselRecipeStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    fn run<T>(
        &self,
        operation: &'static str,
        f: impl FnOnce(&mut SqliteConnection) -> Result<T, DbError>,
    ) -> Result<T, StoreError> {
        let _span = tracing::info_span!("db.query", operation).entered();
        let mut pooled: Conn = self.pool.get().map_err(DbError::from)?;
        let conn: &mut SqliteConnection = &mut pooled;
        let result = conn.transaction(f);
        if let Err(e) = &result {
            tracing::warn!("Recipe store {} failed: {}", operation, e);
        }
        Ok(result?)
    }
}

/// `recipes` filtered by an optional `LIKE` pattern over title, description and
/// categories. The pattern is already lowercased, and columns go through
/// [`lower_unicode`] so non-ASCII text matches regardless of case. The category
/// match is a subselect, so a recipe appears once no matter how many of its
/// fields match.
fn filtered(pattern: Option<&str>) -> recipes::BoxedQuery<'_, Sqlite> {
    let mut query = recipes::table.into_boxed();
    if let Some(pattern) = pattern {
        let in_category = recipe_categories::table
            .filter(
                lower_unicode(recipe_categories::category.nullable())
                    .like(pattern)
                    .escape('\\'),
            )
            .select(recipe_categories::recipe_id);
        query = query.filter(
            lower_unicode(recipes::title.nullable())
                .like(pattern)
                .escape('\\')
                .or(lower_unicode(recipes::description)
                    .like(pattern)
                    .escape('\\'))
                .or(recipes::id.eq_any(in_category)),
        );
    }
    query
}

fn load_page(
    conn: &mut SqliteConnection,
    pattern: Option<&str>,
    page: &PageRequest,
) -> Result<Page<Recipe>, DbError> {
    let total: i64 = filtered(pattern).count().get_result(conn)?;

    let sort = page.sort();
    let query = filtered(pattern);
    let query = match (sort.field, sort.direction) {
        (SortField::Id, Direction::Asc) => query.order_by(recipes::id.asc()),
        (SortField::Id, Direction::Desc) => query.order_by(recipes::id.desc()),
        (SortField::Title, Direction::Asc) => query.order_by(recipes::title.asc()),
        (SortField::Title, Direction::Desc) => query.order_by(recipes::title.desc()),
        (SortField::PrepMinutes, Direction::Asc) => query.order_by(recipes::prep_minutes.asc()),
        (SortField::PrepMinutes, Direction::Desc) => {
            query.order_by(recipes::prep_minutes.desc())
        }
        (SortField::CookMinutes, Direction::Asc) => query.order_by(recipes::cook_minutes.asc()),
        (SortField::CookMinutes, Direction::Desc) => {
            query.order_by(recipes::cook_minutes.desc())
        }
    };

    let offset = i64::try_from(page.offset()).unwrap_or(i64::MAX);
    let rows: Vec<RecipeRow> = query
        .then_order_by(recipes::id.asc())
        .limit(i64::from(page.size()))
        .offset(offset)
        .load(conn)?;

    let content = assemble(conn, rows)?;
    Ok(Page::new(content, page, u64::try_from(total).unwrap_or(0)))
}

/// Load the children of `rows` and build aggregates, preserving row order.
fn assemble(conn: &mut SqliteConnection, rows: Vec<RecipeRow>) -> Result<Vec<Recipe>, DbError> {
    if rows.is_empty() {
        return Ok(Vec::new());
    }
    let ids: Vec<i64> = rows.iter().map(|r| r.id).collect();

    let mut tags: HashMap<i64, BTreeSet<DietTag>> = HashMap::new();
    let tag_rows: Vec<(i64, String)> = recipe_diet_tags::table
        .filter(recipe_diet_tags::recipe_id.eq_any(&ids))
        .select((recipe_diet_tags::recipe_id, recipe_diet_tags::diet_tag))
        .load(conn)?;
    for (recipe_id, name) in tag_rows {
        let tag = DietTag::parse(&name).ok_or_else(|| {
            DbError::Corrupt(format!("recipe {} has unknown diet tag {:?}", recipe_id, name))
        })?;
        tags.entry(recipe_id).or_default().insert(tag);
    }

    let mut categories: HashMap<i64, BTreeSet<String>> = HashMap::new();
    let category_rows: Vec<(i64, String)> = recipe_categories::table
        .filter(recipe_categories::recipe_id.eq_any(&ids))
        .select((recipe_categories::recipe_id, recipe_categories::category))
        .load(conn)?;
    for (recipe_id, category) in category_rows {
        categories.entry(recipe_id).or_default().insert(category);
    }

    let mut ingredients_by_recipe: HashMap<i64, Vec<IngredientRecord>> = HashMap::new();
    let ingredient_rows: Vec<IngredientRow> = ingredients::table
        .filter(ingredients::recipe_id.eq_any(&ids))
        .order_by(ingredients::id.asc())
        .select(IngredientRow::as_select())
        .load(conn)?;
    for row in ingredient_rows {
        let recipe_id = row.recipe_id;
        let record = row.into_record().map_err(DbError::Corrupt)?;
        ingredients_by_recipe.entry(recipe_id).or_default().push(record);
    }

    let mut steps_by_recipe: HashMap<i64, Vec<StepRecord>> = HashMap::new();
    let step_rows: Vec<StepRow> = recipe_steps::table
        .filter(recipe_steps::recipe_id.eq_any(&ids))
        .order_by((recipe_steps::position.asc(), recipe_steps::id.asc()))
        .select(StepRow::as_select())
        .load(conn)?;
    for row in step_rows {
        steps_by_recipe
            .entry(row.recipe_id)
            .or_default()
            .push(row.into());
    }

    rows.into_iter()
        .map(|row| {
            let record = RecipeRecord {
                id: RecipeId::new(row.id),
                title: row.title,
                description: row.description,
                prep_minutes: row.prep_minutes,
                cook_minutes: row.cook_minutes,
                tags: tags.remove(&row.id).unwrap_or_default(),
                categories: categories.remove(&row.id).unwrap_or_default(),
                ingredients: ingredients_by_recipe.remove(&row.id).unwrap_or_default(),
                steps: steps_by_recipe.remove(&row.id).unwrap_or_default(),
            };
            Recipe::rehydrate(record)
                .map_err(|e| DbError::Corrupt(format!("recipe {}: {}", row.id, e)))
        })
        .collect()
}

fn load_one(conn: &mut SqliteConnection, id: RecipeId) -> Result<Option<Recipe>, DbError> {
    let row: Option<RecipeRow> = recipes::table
        .find(id.get())
        .select(RecipeRow::as_select())
        .first(conn)
        .optional()?;

    match row {
        Some(row) => Ok(assemble(conn, vec![row])?.pop()),
        None => Ok(None),
    }
}

fn write(conn: &mut SqliteConnection, recipe: &Recipe) -> Result<RecipeId, DbError> {
    let changes = RecipeChanges::from(recipe);
    let id = match recipe.id() {
        None => diesel::insert_into(recipes::table)
            .values(&changes)
            .returning(recipes::id)
            .get_result::<i64>(conn)?,
        Some(id) => {
            let updated = diesel::update(recipes::table.find(id.get()))
                .set(&changes)
                .execute(conn)?;
            if updated == 0 {
                return Err(DbError::Missing(id));
            }
            id.get()
        }
    };

    diesel::delete(recipe_diet_tags::table.filter(recipe_diet_tags::recipe_id.eq(id)))
        .execute(conn)?;
    let tags: Vec<NewDietTag> = recipe
        .tags()
        .iter()
        .map(|tag| NewDietTag {
            recipe_id: id,
            diet_tag: tag.as_str(),
        })
        .collect();
    if !tags.is_empty() {
        diesel::insert_into(recipe_diet_tags::table)
            .values(&tags)
            .execute(conn)?;
    }

    diesel::delete(recipe_categories::table.filter(recipe_categories::recipe_id.eq(id)))
        .execute(conn)?;
    let categories: Vec<NewCategory> = recipe
        .categories()
        .iter()
        .map(|category| NewCategory {
            recipe_id: id,
            category: category.as_str(),
        })
        .collect();
    if !categories.is_empty() {
        diesel::insert_into(recipe_categories::table)
            .values(&categories)
            .execute(conn)?;
    }

    // Children that already have an id are unchanged; anything else of this recipe goes.
    let kept_ingredients: Vec<i64> = recipe.ingredients().iter().filter_map(|i| i.id()).collect();
    diesel::delete(
        ingredients::table
            .filter(ingredients::recipe_id.eq(id))
            .filter(ingredients::id.ne_all(&kept_ingredients)),
    )
    .execute(conn)?;
    let new_ingredients: Vec<NewIngredient> = recipe
        .ingredients()
        .iter()
        .filter(|i| i.id().is_none())
        .map(|i| NewIngredient {
            recipe_id: id,
            name: i.name(),
            amount: i.amount().to_string(),
            unit: i.unit().as_str(),
        })
        .collect();
    if !new_ingredients.is_empty() {
        diesel::insert_into(ingredients::table)
            .values(&new_ingredients)
            .execute(conn)?;
    }

    let kept_steps: Vec<i64> = recipe.steps().iter().filter_map(|s| s.id()).collect();
    diesel::delete(
        recipe_steps::table
            .filter(recipe_steps::recipe_id.eq(id))
            .filter(recipe_steps::id.ne_all(&kept_steps)),
    )
    .execute(conn)?;
    let new_steps: Vec<NewStep> = recipe
        .steps()
        .iter()
        .filter(|s| s.id().is_none())
        .map(|s| NewStep {
            recipe_id: id,
            position: s.position(),
            text: s.text(),
        })
        .collect();
    if !new_steps.is_empty() {
        diesel::insert_into(recipe_steps::table)
            .values(&new_steps)
            .execute(conn)?;
    }

    Ok(RecipeId::new(id))
}

impl RecipeStore for DieselRecipeStore {
    fn save(&self, recipe: Recipe) -> Result<Recipe, StoreError> {
        self.run("save", |conn| {
            let id = write(conn, &recipe)?;
            load_one(conn, id)?.ok_or(DbError::Missing(id))
        })
    }

    fn find_by_id(&self, id: RecipeId) -> Result<Option<Recipe>, StoreError> {
        self.run("find_by_id", |conn| load_one(conn, id))
    }

    fn exists_by_id(&self, id: RecipeId) -> Result<bool, StoreError> {
        self.run("exists_by_id", |conn| {
            let exists = diesel::select(diesel::dsl::exists(recipes::table.find(id.get())))
                .get_result::<bool>(conn)?;
            Ok(exists)
        })
    }

    fn delete_by_id(&self, id: RecipeId) -> Result<bool, StoreError> {
        self.run("delete_by_id", |conn| {
            diesel::delete(ingredients::table.filter(ingredients::recipe_id.eq(id.get())))
                .execute(conn)?;
            diesel::delete(recipe_steps::table.filter(recipe_steps::recipe_id.eq(id.get())))
                .execute(conn)?;
            diesel::delete(
                recipe_categories::table.filter(recipe_categories::recipe_id.eq(id.get())),
            )
            .execute(conn)?;
            diesel::delete(recipe_diet_tags::table.filter(recipe_diet_tags::recipe_id.eq(id.get())))
                .execute(conn)?;
            let removed = diesel::delete(recipes::table.find(id.get())).execute(conn)?;
            Ok(removed > 0)
        })
    }

    fn find_all(&self, page: &PageRequest) -> Result<Page<Recipe>, StoreError> {
        self.run("find_all", |conn| load_page(conn, None, page))
    }

    fn search(&self, query: &str, page: &PageRequest) -> Result<Page<Recipe>, StoreError> {
        let pattern = like_pattern(query);
        self.run("search", |conn| load_page(conn, Some(&pattern), page))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::create_pool;
    use larder_core::recipe::{IngredientSpec, RecipeBase, RecipeDraft, StepSpec};
    use larder_core::store::Sort;
    use larder_core::Unit;
    use rust_decimal::Decimal;

    fn store() -> DieselRecipeStore {
        DieselRecipeStore::new(create_pool(":memory:", 1).unwrap())
    }

    fn draft(title: &str, tags: &[DietTag], categories: &[&str]) -> RecipeDraft {
        RecipeDraft {
            base: RecipeBase {
                title: title.to_string(),
                description: Some(format!("All about {}", title.to_lowercase())),
                prep_minutes: 15,
                cook_minutes: 45,
                tags: tags.iter().copied().collect(),
                categories: categories.iter().map(|c| c.to_string()).collect(),
            },
            ingredients: vec![
                IngredientSpec {
                    name: "chickpeas".to_string(),
                    amount: Decimal::new(2505, 1),
                    unit: Unit::G,
                },
                IngredientSpec {
                    name: "cumin".to_string(),
                    amount: Decimal::new(1, 0),
                    unit: Unit::Tsp,
                },
            ],
            steps: vec![
                StepSpec {
                    position: 2,
                    text: "simmer".to_string(),
                },
                StepSpec {
                    position: 1,
                    text: "toast spices".to_string(),
                },
            ],
        }
    }

    fn save_new(store: &DieselRecipeStore, title: &str, categories: &[&str]) -> Recipe {
        let recipe = Recipe::new(draft(title, &[DietTag::Vegan], categories)).unwrap();
        store.save(recipe).unwrap()
    }

    #[test]
    fn test_save_and_reload() {
        let store = store();
        let saved = save_new(&store, "Chana Masala", &["Curry", "Indian"]);
        let id = saved.id().unwrap();

        let loaded = store.find_by_id(id).unwrap().unwrap();
        assert_eq!(loaded, saved);
        assert_eq!(loaded.title(), "Chana Masala");
        assert_eq!(loaded.baseline_tag(), Some(DietTag::Vegan));
        assert_eq!(loaded.categories().len(), 2);
        assert_eq!(loaded.ingredients()[0].amount(), Decimal::new(2505, 1));
        assert!(loaded
            .ingredients()
            .iter()
            .all(|i| i.id().is_some() && i.recipe_id() == Some(id)));

        // Loaded steps come back ordered by position
        let texts: Vec<_> = loaded.steps().iter().map(|s| s.text()).collect();
        assert_eq!(texts, vec!["toast spices", "simmer"]);
    }

    #[test]
    fn test_update_replaces_tags_and_keeps_children() {
        let store = store();
        let mut recipe = save_new(&store, "Dal", &["Curry"]);
        let ingredient_ids: Vec<_> = recipe.ingredients().iter().map(|i| i.id()).collect();

        recipe.set_tags([DietTag::Omnivore, DietTag::LowFat].into()).unwrap();
        recipe.set_description(None);
        let updated = store.save(recipe).unwrap();

        assert_eq!(updated.baseline_tag(), Some(DietTag::Omnivore));
        assert_eq!(updated.tags().len(), 2);
        assert_eq!(updated.description(), None);
        let after: Vec<_> = updated.ingredients().iter().map(|i| i.id()).collect();
        assert_eq!(after, ingredient_ids);
    }

    #[test]
    fn test_replace_children_removes_old_rows() {
        let store = store();
        let mut recipe = save_new(&store, "Dal", &[]);
        let old_ids: Vec<_> = recipe.ingredients().iter().filter_map(|i| i.id()).collect();

        recipe.replace_ingredients(vec![IngredientSpec {
            name: "lentils".to_string(),
            amount: Decimal::new(300, 0),
            unit: Unit::G,
        }]);
        recipe.replace_steps(vec![]);
        let updated = store.save(recipe).unwrap();

        assert_eq!(updated.ingredients().len(), 1);
        assert!(!old_ids.contains(&updated.ingredients()[0].id().unwrap()));
        assert!(updated.steps().is_empty());

        let mut conn = store.pool.get().unwrap();
        let remaining: i64 = ingredients::table.count().get_result(&mut conn).unwrap();
        assert_eq!(remaining, 1);
    }

    #[test]
    fn test_save_of_deleted_recipe_is_missing() {
        let store = store();
        let recipe = save_new(&store, "Ghost", &[]);
        let id = recipe.id().unwrap();
        assert!(store.delete_by_id(id).unwrap());
        assert!(!store.delete_by_id(id).unwrap());

        let err = store.save(recipe).unwrap_err();
        assert!(matches!(err, StoreError::Missing(missing) if missing == id));
    }

    #[test]
    fn test_delete_cascades() {
        let store = store();
        let id = save_new(&store, "Hummus", &["Dips"]).id().unwrap();
        let other = save_new(&store, "Falafel", &["Street food"]).id().unwrap();

        store.delete_by_id(id).unwrap();

        assert!(!store.exists_by_id(id).unwrap());
        assert!(store.exists_by_id(other).unwrap());
        let mut conn = store.pool.get().unwrap();
        let orphans: i64 = ingredients::table
            .filter(ingredients::recipe_id.eq(id.get()))
            .count()
            .get_result(&mut conn)
            .unwrap();
        assert_eq!(orphans, 0);
        let categories: i64 = recipe_categories::table.count().get_result(&mut conn).unwrap();
        assert_eq!(categories, 1);
    }

    #[test]
    fn test_search_matches_each_recipe_once() {
        let store = store();
        let both = save_new(&store, "Poke Bowl", &["Bowls", "Bowl food"]).id().unwrap();
        save_new(&store, "Ramen Bowl", &[]);
        save_new(&store, "Granola", &["Breakfast bowls"]);
        save_new(&store, "Pancakes", &["Breakfast"]);

        let page = store.search("BOWL", &PageRequest::default()).unwrap();

        assert_eq!(page.total_elements, 3);
        assert_eq!(page.content.len(), 3);
        assert_eq!(page.content.iter().filter(|r| r.id() == Some(both)).count(), 1);
    }

    #[test]
    fn test_search_matches_description_and_escapes_wildcards() {
        let store = store();
        save_new(&store, "Lemonade", &[]);
        save_new(&store, "100% Rye", &[]);

        // Descriptions are "All about <title>"
        assert_eq!(store.search("about lemon", &PageRequest::default()).unwrap().total_elements, 1);
        assert_eq!(store.search("%", &PageRequest::default()).unwrap().total_elements, 1);
        assert_eq!(store.search("_", &PageRequest::default()).unwrap().total_elements, 0);
    }

    #[test]
    fn test_search_folds_non_ascii_case() {
        let store = store();
        save_new(&store, "CRÈME BRÛLÉE", &[]);
        save_new(&store, "Flan", &["ÉCLAIRS & PÂTISSERIE"]);

        assert_eq!(store.search("crème", &PageRequest::default()).unwrap().total_elements, 1);
        assert_eq!(store.search("Brûlée", &PageRequest::default()).unwrap().total_elements, 1);
        assert_eq!(store.search("pâtisserie", &PageRequest::default()).unwrap().total_elements, 1);
    }

    #[test]
    fn test_find_all_pages_and_sorts() {
        let store = store();
        let mut ids = Vec::new();
        for title in ["Cake", "Apple pie", "Bread"] {
            ids.push(save_new(&store, title, &[]).id().unwrap());
        }

        let newest = store.find_all(&PageRequest::new(0, 2, Sort::default())).unwrap();
        let got: Vec<_> = newest.content.iter().map(|r| r.id().unwrap()).collect();
        assert_eq!(got, vec![ids[2], ids[1]]);
        assert_eq!(newest.total_elements, 3);
        assert_eq!(newest.total_pages, 2);
        assert!(!newest.last);

        let by_title = Sort::new(SortField::Title, Direction::Asc);
        let page = store.find_all(&PageRequest::new(0, 10, by_title)).unwrap();
        let titles: Vec<_> = page.content.iter().map(|r| r.title()).collect();
        assert_eq!(titles, vec!["Apple pie", "Bread", "Cake"]);
        assert!(page.last);
    }

    #[test]
    fn test_corrupt_tag_rows_are_reported() {
        let store = store();
        let id = save_new(&store, "Odd", &[]).id().unwrap();
        {
            let mut conn = store.pool.get().unwrap();
            diesel::insert_into(recipe_diet_tags::table)
                .values(NewDietTag {
                    recipe_id: id.get(),
                    diet_tag: "OMNIVORE",
                })
                .execute(&mut conn)
                .unwrap();
        }

        let err = store.find_by_id(id).unwrap_err();
        assert!(matches!(err, StoreError::Corrupt(_)));
    }
}
