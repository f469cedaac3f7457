//! Catalog filter/sort query.
//!
//! The storefront client sends its filter panel as a flat query string
//! (`filter[name]=..&filter[minPrice]=..&tags[]=1&tags[]=4&sort=price&sortType=inc`).
//! [`CatalogQuery::from_pairs`] turns it into a typed query and
//! [`CatalogQuery::predicates`] reduces it to the conjunctive predicate list
//! the repository renders into SQL.

use serde::Serialize;

use super::catalog::{CategoryId, TagId};
use super::money::Money;
use crate::error::{AppError, Result};

pub const DEFAULT_PAGE_LIMIT: u32 = 20;
pub const MAX_PAGE_LIMIT: u32 = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortKey {
    Rating,
    Price,
    Reviews,
    #[default]
    Date,
}

impl SortKey {
    fn parse(raw: &str) -> Result<Self> {
        match raw {
            "rating" => Ok(SortKey::Rating),
            "price" => Ok(SortKey::Price),
            "reviews" => Ok(SortKey::Reviews),
            "date" => Ok(SortKey::Date),
            other => Err(AppError::Validation(format!("Unknown sort key: {}", other))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortDirection {
    #[default]
    Ascending,
    Descending,
}

impl SortDirection {
    /// The client's `inc` arrow lists the largest values first.
    fn parse(raw: &str) -> Self {
        if raw == "inc" {
            SortDirection::Descending
        } else {
            SortDirection::Ascending
        }
    }
}

/// One conjunct of the catalog WHERE clause
#[derive(Debug, Clone, PartialEq)]
pub enum Predicate {
    Active,
    TitleContains(String),
    PriceAtLeast(Money),
    PriceAtMost(Money),
    FreeDelivery,
    InStock,
    HasAnyTag(Vec<TagId>),
    InCategoryTree(CategoryId),
}

#[derive(Debug, Clone, PartialEq)]
pub struct CatalogQuery {
    pub name: Option<String>,
    pub min_price: Option<Money>,
    pub max_price: Option<Money>,
    pub free_delivery: bool,
    pub available: bool,
    pub tags: Vec<TagId>,
    pub category: Option<CategoryId>,
    pub sort: SortKey,
    pub direction: SortDirection,
    pub page: u32,
    pub limit: u32,
}

impl Default for CatalogQuery {
    fn default() -> Self {
        Self {
            name: None,
            min_price: None,
            max_price: None,
            free_delivery: false,
            available: false,
            tags: Vec::new(),
            category: None,
            sort: SortKey::default(),
            direction: SortDirection::default(),
            page: 1,
            limit: DEFAULT_PAGE_LIMIT,
        }
    }
}

impl CatalogQuery {
    /// Parse decoded query-string pairs. Unknown keys are ignored.
    pub fn from_pairs<K, V>(pairs: impl IntoIterator<Item = (K, V)>) -> Result<Self>
    where
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let mut query = CatalogQuery::default();

        for (key, value) in pairs {
            let value = value.as_ref().trim();
            match key.as_ref() {
                "filter[name]" if !value.is_empty() => query.name = Some(value.to_string()),
                "filter[minPrice]" if !value.is_empty() => {
                    query.min_price = Some(parse_price("filter[minPrice]", value)?)
                }
                "filter[maxPrice]" if !value.is_empty() => {
                    query.max_price = Some(parse_price("filter[maxPrice]", value)?)
                }
                "filter[freeDelivery]" => query.free_delivery = value == "true",
                "filter[available]" => query.available = value == "true",
                "tags[]" | "tags" if !value.is_empty() => {
                    query.tags.push(parse_id("tags[]", value)?);
                }
                "category" if !value.is_empty() => {
                    query.category = Some(parse_id("category", value)?)
                }
                "sort" if !value.is_empty() => query.sort = SortKey::parse(value)?,
                "sortType" => query.direction = SortDirection::parse(value),
                "currentPage" if !value.is_empty() => {
                    query.page = parse_positive("currentPage", value)?
                }
                "limit" if !value.is_empty() => {
                    query.limit = parse_positive("limit", value)?.min(MAX_PAGE_LIMIT)
                }
                _ => {}
            }
        }

        query.tags.sort_unstable();
        query.tags.dedup();
        Ok(query)
    }

    /// True when the price bounds can never match
    pub fn is_empty_range(&self) -> bool {
        matches!((self.min_price, self.max_price), (Some(min), Some(max)) if min > max)
    }

    /// Conjunctive predicates, one per active filter
    pub fn predicates(&self) -> Vec<Predicate> {
        let mut predicates = vec![Predicate::Active];

        if let Some(name) = &self.name {
            predicates.push(Predicate::TitleContains(name.clone()));
        }
        if let Some(min) = self.min_price {
            predicates.push(Predicate::PriceAtLeast(min));
        }
        if let Some(max) = self.max_price {
            predicates.push(Predicate::PriceAtMost(max));
        }
        if self.free_delivery {
            predicates.push(Predicate::FreeDelivery);
        }
        if self.available {
            predicates.push(Predicate::InStock);
        }
        if !self.tags.is_empty() {
            predicates.push(Predicate::HasAnyTag(self.tags.clone()));
        }
        if let Some(category) = self.category {
            predicates.push(Predicate::InCategoryTree(category));
        }

        predicates
    }

    pub fn offset(&self) -> u32 {
        (self.page.saturating_sub(1)).saturating_mul(self.limit)
    }
}

/// One page of results
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    pub items: Vec<T>,
    pub current_page: u32,
    pub last_page: u32,
}

impl<T> Page<T> {
    pub fn new(items: Vec<T>, current_page: u32, limit: u32, total: i64) -> Self {
        let limit = i64::from(limit.max(1));
        let last_page = ((total + limit - 1) / limit).max(1);
        Self {
            items,
            current_page,
            last_page: u32::try_from(last_page).unwrap_or(u32::MAX),
        }
    }

    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            items: self.items.into_iter().map(f).collect(),
            current_page: self.current_page,
            last_page: self.last_page,
        }
    }
}

fn parse_price(key: &str, raw: &str) -> Result<Money> {
    let major: f64 = raw
        .parse()
        .map_err(|_| AppError::Validation(format!("{} must be a number", key)))?;
    Money::from_major(major).map_err(AppError::from)
}

fn parse_id(key: &str, raw: &str) -> Result<i64> {
    raw.parse()
        .map_err(|_| AppError::Validation(format!("{} must be an integer id", key)))
}

fn parse_positive(key: &str, raw: &str) -> Result<u32> {
    match raw.parse::<u32>() {
        Ok(n) if n >= 1 => Ok(n),
        _ => Err(AppError::Validation(format!(
            "{} must be a positive integer",
            key
        ))),
    }
}
