use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::Catalog;
use crate::poi::{Category, PointOfInterest, UnknownCategory};

#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum CategoryFilter {
    #[default]
    All,
    Only(Category),
}

impl CategoryFilter {
    pub fn accepts(&self, category: Category) -> bool {
        match self {
            CategoryFilter::All => true,
            CategoryFilter::Only(c) => *c == category,
        }
    }
}

impl From<Category> for CategoryFilter {
    fn from(c: Category) -> Self {
        CategoryFilter::Only(c)
    }
}

impl fmt::Display for CategoryFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CategoryFilter::All => f.write_str("all"),
            CategoryFilter::Only(c) => c.fmt(f),
        }
    }
}

impl TryFrom<String> for CategoryFilter {
    type Error = UnknownCategory;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<CategoryFilter> for String {
    fn from(f: CategoryFilter) -> Self {
        f.to_string()
    }
}

/// Parses the values carried by the map's filter buttons: `all` or a category.
impl FromStr for CategoryFilter {
    type Err = UnknownCategory;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s == "all" {
            return Ok(CategoryFilter::All);
        }
        s.parse::<Category>().map(CategoryFilter::Only)
    }
}

/// Computes the visible subset of `catalog`.
///
/// Pure and deterministic. Category and search apply conjunctively; the
/// search is a case-insensitive substring match of the trimmed text against
/// name or description, and empty text matches everything.
///
/// Ordering contract:
/// - results keep catalog order.
pub fn visible<'a>(
    catalog: &'a Catalog,
    category: CategoryFilter,
    search: &str,
) -> Vec<&'a PointOfInterest> {
    let needle = search.trim().to_lowercase();
    catalog
        .iter()
        .filter(|poi| category.accepts(poi.category()))
        .filter(|poi| poi.matches_lowercase(&needle))
        .collect()
}

/// The active filter inputs of one view.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterState {
    pub category: CategoryFilter,
    pub search: String,
}

impl FilterState {
    pub fn new(category: CategoryFilter, search: impl Into<String>) -> Self {
        Self {
            category,
            search: search.into(),
        }
    }

    pub fn visible<'a>(&self, catalog: &'a Catalog) -> Vec<&'a PointOfInterest> {
        visible(catalog, self.category, &self.search)
    }
}
