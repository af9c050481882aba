//! Free-text recipe search.
//!
//! A query matches a recipe when its title, description or any category contains
//! the query as a case-insensitive substring. Stores run the actual query; these
//! helpers keep the normalization and matching rules in one place.

use crate::error::StoreError;
use crate::recipe::Recipe;
use crate::store::{Page, PageRequest, RecipeStore};

/// Trim a raw query. Absent or blank queries mean "no filter".
pub fn normalize_query(query: Option<&str>) -> Option<&str> {
    query.map(str::trim).filter(|q| !q.is_empty())
}

/// Run the filtered query when there is one, otherwise list everything.
pub fn find_page(
    store: &dyn RecipeStore,
    query: Option<&str>,
    page: &PageRequest,
) -> Result<Page<Recipe>, StoreError> {
    match normalize_query(query) {
        Some(q) => store.search(q, page),
        None => store.find_all(page),
    }
}

/// Whether `recipe` matches an already lowercased needle.
pub fn matches(recipe: &Recipe, needle_lower: &str) -> bool {
    let contains = |haystack: &str| haystack.to_lowercase().contains(needle_lower);

    contains(recipe.title())
        || recipe.description().is_some_and(contains)
        || recipe.categories().iter().any(|c| contains(c.as_str()))
}

/// Build a `LIKE` pattern matching `query` anywhere, for use with `ESCAPE '\'`.
pub fn like_pattern(query: &str) -> String {
    let mut pattern = String::with_capacity(query.len() + 2);
    pattern.push('%');
    for c in query.to_lowercase().chars() {
        if matches!(c, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}
