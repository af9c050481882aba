//! Persistence port for recipe aggregates, plus the paging types it speaks.

use crate::error::{RecipeError, StoreError};
use crate::recipe::{Recipe, RecipeId};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;

pub const DEFAULT_PAGE_SIZE: u32 = 20;
pub const MAX_PAGE_SIZE: u32 = 100;

/// Field a recipe page can be ordered by.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortField {
    #[default]
    Id,
    Title,
    PrepMinutes,
    CookMinutes,
}

impl SortField {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortField::Id => "id",
            SortField::Title => "title",
            SortField::PrepMinutes => "prep_minutes",
            SortField::CookMinutes => "cook_minutes",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "id" => Some(SortField::Id),
            "title" => Some(SortField::Title),
            "prep_minutes" | "prepMinutes" => Some(SortField::PrepMinutes),
            "cook_minutes" | "cookMinutes" => Some(SortField::CookMinutes),
            _ => None,
        }
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    Asc,
    #[default]
    Desc,
}

/// Ordering of a page. Ties are always broken by ascending identifier.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Sort {
    pub field: SortField,
    pub direction: Direction,
}

impl Sort {
    pub const fn new(field: SortField, direction: Direction) -> Self {
        Self { field, direction }
    }

    /// Parse `field` or `field,asc|desc`. A bare field sorts ascending.
    pub fn parse(s: &str) -> Result<Self, RecipeError> {
        let (field, direction) = match s.split_once(',') {
            Some((field, direction)) => (field.trim(), Some(direction.trim())),
            None => (s.trim(), None),
        };

        let field = SortField::parse(field)
            .ok_or_else(|| RecipeError::InvalidArgument(format!("Unknown sort field: {}", field)))?;

        let direction = match direction.map(str::to_ascii_lowercase).as_deref() {
            None | Some("asc") => Direction::Asc,
            Some("desc") => Direction::Desc,
            Some(other) => {
                return Err(RecipeError::InvalidArgument(format!(
                    "Unknown sort direction: {}",
                    other
                )))
            }
        };

        Ok(Self { field, direction })
    }

    /// Compare two persisted recipes the way a store orders them.
    pub fn compare(&self, a: &Recipe, b: &Recipe) -> Ordering {
        let primary = match self.field {
            SortField::Id => a.id().cmp(&b.id()),
            SortField::Title => a.title().cmp(b.title()),
            SortField::PrepMinutes => a.prep_minutes().cmp(&b.prep_minutes()),
            SortField::CookMinutes => a.cook_minutes().cmp(&b.cook_minutes()),
        };
        let primary = match self.direction {
            Direction::Asc => primary,
            Direction::Desc => primary.reverse(),
        };
        primary.then_with(|| a.id().cmp(&b.id()))
    }
}

impl fmt::Display for Sort {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let direction = match self.direction {
            Direction::Asc => "asc",
            Direction::Desc => "desc",
        };
        write!(f, "{},{}", self.field.as_str(), direction)
    }
}

/// Which slice of a result set to return.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    page: u32,
    size: u32,
    sort: Sort,
}

impl Default for PageRequest {
    fn default() -> Self {
        Self::new(0, DEFAULT_PAGE_SIZE, Sort::default())
    }
}

impl PageRequest {
    /// Zero-based `page`; `size` is clamped to `1..=MAX_PAGE_SIZE`.
    pub fn new(page: u32, size: u32, sort: Sort) -> Self {
        Self {
            page,
            size: size.clamp(1, MAX_PAGE_SIZE),
            sort,
        }
    }

    pub fn page(&self) -> u32 {
        self.page
    }

    pub fn size(&self) -> u32 {
        self.size
    }

    pub fn sort(&self) -> Sort {
        self.sort
    }

    pub fn offset(&self) -> u64 {
        u64::from(self.page) * u64::from(self.size)
    }
}

/// One page of results plus metadata about the whole result set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Page<T> {
    pub content: Vec<T>,
    /// Zero-based page index
    pub number: u32,
    pub size: u32,
    pub total_elements: u64,
    pub total_pages: u64,
    pub last: bool,
}

impl<T> Page<T> {
    pub fn new(content: Vec<T>, request: &PageRequest, total_elements: u64) -> Self {
        let size = u64::from(request.size());
        let total_pages = total_elements.div_ceil(size);
        Self {
            content,
            number: request.page(),
            size: request.size(),
            total_elements,
            total_pages,
            last: u64::from(request.page()) + 1 >= total_pages,
        }
    }

    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            content: self.content.into_iter().map(f).collect(),
            number: self.number,
            size: self.size,
            total_elements: self.total_elements,
            total_pages: self.total_pages,
            last: self.last,
        }
    }
}

/// Durable storage for recipe aggregates.
///
/// Every call is its own unit of work. Implementations must be thread-safe; there is
/// no concurrency control within one aggregate, so the last `save` wins.
pub trait RecipeStore: Send + Sync + fmt::Debug {
    /// Insert (no id yet) or update. Assigns identifiers to the recipe and to any
    /// child without one, removes children no longer present, and returns the
    /// persisted aggregate.
    fn save(&self, recipe: Recipe) -> Result<Recipe, StoreError>;

    fn find_by_id(&self, id: RecipeId) -> Result<Option<Recipe>, StoreError>;

    fn exists_by_id(&self, id: RecipeId) -> Result<bool, StoreError>;

    /// Remove the recipe and everything it owns, in one unit of work. Returns
    /// `false` when there was no such recipe.
    fn delete_by_id(&self, id: RecipeId) -> Result<bool, StoreError>;

    fn find_all(&self, page: &PageRequest) -> Result<Page<Recipe>, StoreError>;

    /// Case-insensitive substring match on title, description or any category.
    /// Each recipe appears at most once regardless of how many fields match.
    fn search(&self, query: &str, page: &PageRequest) -> Result<Page<Recipe>, StoreError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_metadata() {
        let request = PageRequest::new(2, 5, Sort::default());
        let page = Page::new(vec!["a", "b"], &request, 12);
        assert_eq!(page.number, 2);
        assert_eq!(page.size, 5);
        assert_eq!(page.total_elements, 12);
        assert_eq!(page.total_pages, 3);
        assert!(page.last);

        let first = Page::new(vec!["a"; 5], &PageRequest::new(0, 5, Sort::default()), 12);
        assert!(!first.last);
    }

    #[test]
    fn test_empty_page_is_last() {
        let page: Page<()> = Page::new(vec![], &PageRequest::default(), 0);
        assert_eq!(page.total_pages, 0);
        assert!(page.last);
    }

    #[test]
    fn test_exact_multiple_of_size() {
        let page: Page<()> = Page::new(vec![], &PageRequest::new(1, 10, Sort::default()), 20);
        assert_eq!(page.total_pages, 2);
        assert!(page.last);
    }

    #[test]
    fn test_page_size_clamped() {
        assert_eq!(PageRequest::new(0, 0, Sort::default()).size(), 1);
        assert_eq!(PageRequest::new(0, 5000, Sort::default()).size(), MAX_PAGE_SIZE);
        assert_eq!(PageRequest::new(3, 20, Sort::default()).offset(), 60);
    }

    #[test]
    fn test_default_sort_is_newest_first() {
        let request = PageRequest::default();
        assert_eq!(request.size(), DEFAULT_PAGE_SIZE);
        assert_eq!(request.sort(), Sort::new(SortField::Id, Direction::Desc));
    }

    #[test]
    fn test_parse_sort() {
        assert_eq!(
            Sort::parse("title,asc").unwrap(),
            Sort::new(SortField::Title, Direction::Asc)
        );
        assert_eq!(
            Sort::parse("prepMinutes,DESC").unwrap(),
            Sort::new(SortField::PrepMinutes, Direction::Desc)
        );
        assert_eq!(
            Sort::parse("cook_minutes").unwrap(),
            Sort::new(SortField::CookMinutes, Direction::Asc)
        );
        assert!(Sort::parse("calories,asc").is_err());
        assert!(Sort::parse("title,sideways").is_err());
        assert_eq!(Sort::parse("id,desc").unwrap().to_string(), "id,desc");
    }

    #[test]
    fn test_page_map_keeps_metadata() {
        let page = Page::new(vec![1, 2, 3], &PageRequest::new(0, 3, Sort::default()), 7);
        let mapped = page.map(|n| n * 10);
        assert_eq!(mapped.content, vec![10, 20, 30]);
        assert_eq!(mapped.total_pages, 3);
        assert!(!mapped.last);
    }
}
