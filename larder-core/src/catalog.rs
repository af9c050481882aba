//! Fixed catalogs: diet tags grouped by kind, and ingredient units.
//!
//! Both tables are compile-time constants. Group membership is a pure function
//! of the tag, so the baseline rule can be checked without any lookup state.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Group a diet tag belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DietGroup {
    /// Primary dietary classification. At most one per recipe.
    Baseline,
    /// Free-from tags, freely combinable.
    AllergenFree,
    /// Macro/lifestyle tags, freely combinable.
    Macro,
    /// Religious, ethical and technique tags, freely combinable.
    Other,
}

impl DietGroup {
    /// All groups in declaration order
    pub const ALL: &'static [DietGroup] = &[
        DietGroup::Baseline,
        DietGroup::AllergenFree,
        DietGroup::Macro,
        DietGroup::Other,
    ];

    /// Whether a recipe may hold at most one tag from this group.
    pub const fn is_exclusive(self) -> bool {
        matches!(self, DietGroup::Baseline)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            DietGroup::Baseline => "BASELINE",
            DietGroup::AllergenFree => "ALLERGEN_FREE",
            DietGroup::Macro => "MACRO",
            DietGroup::Other => "OTHER",
        }
    }
}

impl fmt::Display for DietGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Diet/classification tag.
///
/// Variant order is the catalog order exposed to clients, and `Ord` follows it,
/// so a `BTreeSet<DietTag>` iterates in catalog order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DietTag {
    Vegan,
    Vegetarian,
    Pescetarian,
    Omnivore,

    GlutenFree,
    LactoseFree,
    NutFree,

    Halal,
    Kosher,

    LowCarb,
    HighProtein,
    LowFat,

    NoBake,
}

impl DietTag {
    /// All tags in declaration order
    pub const ALL: &'static [DietTag] = &[
        DietTag::Vegan,
        DietTag::Vegetarian,
        DietTag::Pescetarian,
        DietTag::Omnivore,
        DietTag::GlutenFree,
        DietTag::LactoseFree,
        DietTag::NutFree,
        DietTag::Halal,
        DietTag::Kosher,
        DietTag::LowCarb,
        DietTag::HighProtein,
        DietTag::LowFat,
        DietTag::NoBake,
    ];

    pub const fn group(self) -> DietGroup {
        match self {
            DietTag::Vegan | DietTag::Vegetarian | DietTag::Pescetarian | DietTag::Omnivore => {
                DietGroup::Baseline
            }
            DietTag::GlutenFree | DietTag::LactoseFree | DietTag::NutFree => {
                DietGroup::AllergenFree
            }
            DietTag::LowCarb | DietTag::HighProtein | DietTag::LowFat => DietGroup::Macro,
            DietTag::Halal | DietTag::Kosher | DietTag::NoBake => DietGroup::Other,
        }
    }

    pub const fn is_baseline(self) -> bool {
        matches!(self.group(), DietGroup::Baseline)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            DietTag::Vegan => "VEGAN",
            DietTag::Vegetarian => "VEGETARIAN",
            DietTag::Pescetarian => "PESCETARIAN",
            DietTag::Omnivore => "OMNIVORE",
            DietTag::GlutenFree => "GLUTEN_FREE",
            DietTag::LactoseFree => "LACTOSE_FREE",
            DietTag::NutFree => "NUT_FREE",
            DietTag::Halal => "HALAL",
            DietTag::Kosher => "KOSHER",
            DietTag::LowCarb => "LOW_CARB",
            DietTag::HighProtein => "HIGH_PROTEIN",
            DietTag::LowFat => "LOW_FAT",
            DietTag::NoBake => "NO_BAKE",
        }
    }

    /// Parse the storage/wire name. Exact match, case-sensitive.
    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|tag| tag.as_str() == s)
    }
}

impl fmt::Display for DietTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Every known tag in declaration order.
pub fn all_tags() -> impl Iterator<Item = DietTag> + Clone {
    DietTag::ALL.iter().copied()
}

/// Tags belonging to `group`, in declaration order.
pub fn tags_in_group(group: DietGroup) -> impl Iterator<Item = DietTag> + Clone {
    all_tags().filter(move |tag| tag.group() == group)
}

pub fn group_of(tag: DietTag) -> DietGroup {
    tag.group()
}

pub fn baselines() -> impl Iterator<Item = DietTag> + Clone {
    tags_in_group(DietGroup::Baseline)
}

pub fn non_baselines() -> impl Iterator<Item = DietTag> + Clone {
    all_tags().filter(|tag| !tag.is_baseline())
}

/// Catalog grouped for selection UIs: every group in declaration order with its tags.
pub fn grouped() -> Vec<(DietGroup, Vec<DietTag>)> {
    DietGroup::ALL
        .iter()
        .map(|&group| (group, tags_in_group(group).collect()))
        .collect()
}

/// Number of baseline tags in `tags`. Duplicates are counted once per occurrence,
/// so callers should pass a set.
pub fn count_baselines<'a>(tags: impl IntoIterator<Item = &'a DietTag>) -> usize {
    tags.into_iter().filter(|tag| tag.is_baseline()).count()
}

/// Ingredient unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "UPPERCASE")]
pub enum Unit {
    /// Gram
    G,
    /// Kilogram
    Kg,
    /// Millilitre
    Ml,
    /// Litre
    L,
    /// Teaspoon
    Tsp,
    /// Tablespoon
    Tbsp,
    Cup,
    /// Pieces
    Pcs,
    Pinch,
}

impl Unit {
    pub const ALL: &'static [Unit] = &[
        Unit::G,
        Unit::Kg,
        Unit::Ml,
        Unit::L,
        Unit::Tsp,
        Unit::Tbsp,
        Unit::Cup,
        Unit::Pcs,
        Unit::Pinch,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Unit::G => "G",
            Unit::Kg => "KG",
            Unit::Ml => "ML",
            Unit::L => "L",
            Unit::Tsp => "TSP",
            Unit::Tbsp => "TBSP",
            Unit::Cup => "CUP",
            Unit::Pcs => "PCS",
            Unit::Pinch => "PINCH",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|unit| unit.as_str() == s)
    }
}

impl fmt::Display for Unit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
