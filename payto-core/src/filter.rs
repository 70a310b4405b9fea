//! Search and categorical filtering shared by every list page.
//!
//! A record matches when the trimmed search term is a case-insensitive
//! substring of any of its searched fields and every categorical filter
//! accepts it. An empty term and the `"all"` filter value match everything.

use serde::{Deserialize, Deserializer};
use std::str::FromStr;

/// Sentinel filter value meaning "no filter".
pub const ALL: &str = "all";

/// Records that can be matched against a free-text term.
pub trait Searchable {
    /// Fields the search box looks at.
    fn search_fields(&self) -> Vec<&str>;

    fn matches_term(&self, term: &SearchTerm) -> bool {
        term.matches(&self.search_fields())
    }
}

/// A normalized search term.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchTerm(String);

impl SearchTerm {
    pub fn new(raw: &str) -> Self {
        Self(raw.trim().to_lowercase())
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn matches(&self, fields: &[&str]) -> bool {
        self.is_empty()
            || fields
                .iter()
                .any(|field| field.to_lowercase().contains(&self.0))
    }
}

impl<'de> Deserialize<'de> for SearchTerm {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = Option::<String>::deserialize(deserializer)?;
        Ok(SearchTerm::new(raw.as_deref().unwrap_or_default()))
    }
}

/// A categorical filter: either everything or one value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Filter<T> {
    All,
    Only(T),
}

impl<T> Default for Filter<T> {
    fn default() -> Self {
        Filter::All
    }
}

impl<T: PartialEq> Filter<T> {
    pub fn accepts(&self, value: &T) -> bool {
        match self {
            Filter::All => true,
            Filter::Only(expected) => expected == value,
        }
    }
}

impl<T> Filter<T> {
    pub fn is_all(&self) -> bool {
        matches!(self, Filter::All)
    }

    /// Test with a projection, for filters over derived values.
    pub fn accepts_by<F: FnOnce(&T) -> bool>(&self, predicate: F) -> bool {
        match self {
            Filter::All => true,
            Filter::Only(expected) => predicate(expected),
        }
    }
}

impl<T: FromStr> FromStr for Filter<T> {
    type Err = T::Err;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let trimmed = raw.trim();
        if trimmed.is_empty() || trimmed.eq_ignore_ascii_case(ALL) {
            Ok(Filter::All)
        } else {
            trimmed.parse().map(Filter::Only)
        }
    }
}

impl<'de, T> Deserialize<'de> for Filter<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = Option::<String>::deserialize(deserializer)?;
        raw.as_deref()
            .unwrap_or(ALL)
            .parse()
            .map_err(serde::de::Error::custom)
    }
}

/// Keep the records matching `term` and accepted by `predicate`, in order.
pub fn filter_records<'a, T, P>(records: &'a [T], term: &SearchTerm, predicate: P) -> Vec<&'a T>
where
    T: Searchable,
    P: Fn(&T) -> bool,
{
    records
        .iter()
        .filter(|record| record.matches_term(term) && predicate(record))
        .collect()
}
