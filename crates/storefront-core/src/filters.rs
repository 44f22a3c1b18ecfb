//! Browse filter state and its query-parameter projection.
//!
//! [`FilterState`] is the canonical in-memory form of the shopper's filters.
//! [`FilterState::query_params`] projects it onto the product API's query
//! string, emitting at most one parameter per field and only for fields that
//! differ from their defaults.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

pub const DEFAULT_PRICE_MIN: f64 = 0.0;
pub const DEFAULT_PRICE_MAX: f64 = 500.0;

/// Inclusive price bounds. Always replaced as a unit by [`FilterUpdate`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PriceRange {
    pub min: f64,
    pub max: f64,
}

impl PriceRange {
    #[must_use]
    pub fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    // Exact comparison: any deviation from the literal default counts.
    #[allow(clippy::float_cmp)]
    #[must_use]
    pub fn min_is_active(&self) -> bool {
        self.min != DEFAULT_PRICE_MIN
    }

    #[allow(clippy::float_cmp)]
    #[must_use]
    pub fn max_is_active(&self) -> bool {
        self.max != DEFAULT_PRICE_MAX
    }

    #[must_use]
    pub fn is_active(&self) -> bool {
        self.min_is_active() || self.max_is_active()
    }
}

impl Default for PriceRange {
    fn default() -> Self {
        Self {
            min: DEFAULT_PRICE_MIN,
            max: DEFAULT_PRICE_MAX,
        }
    }
}

/// The shopper's current browse filters.
///
/// Text fields are inactive when empty. `category` is the display name kept
/// for breadcrumbs; `category_id` is what the API filters on.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct FilterState {
    pub category: String,
    pub category_id: String,
    pub color: String,
    pub size: String,
    pub style: String,
    pub brand: String,
    pub gender: String,
    pub price_range: PriceRange,
}

impl FilterState {
    /// Returns `true` if any field deviates from its default.
    #[must_use]
    pub fn is_active(&self) -> bool {
        [
            &self.category,
            &self.category_id,
            &self.color,
            &self.size,
            &self.style,
            &self.brand,
            &self.gender,
        ]
        .iter()
        .any(|field| !field.is_empty())
            || self.price_range.is_active()
    }

    /// Shallow field-level merge. Fields absent from `update` are untouched.
    /// The price range is replaced whole, and is not validated.
    pub fn merge(&mut self, update: FilterUpdate) {
        let FilterUpdate {
            category,
            category_id,
            color,
            size,
            style,
            brand,
            gender,
            price_range,
        } = update;

        if let Some(v) = category {
            self.category = v;
        }
        if let Some(v) = category_id {
            self.category_id = v;
        }
        if let Some(v) = color {
            self.color = v;
        }
        if let Some(v) = size {
            self.size = v;
        }
        if let Some(v) = style {
            self.style = v;
        }
        if let Some(v) = brand {
            self.brand = v;
        }
        if let Some(v) = gender {
            self.gender = v;
        }
        if let Some(range) = price_range {
            self.price_range = range;
        }
    }

    /// Derives the query parameters for the product API.
    ///
    /// `color`, `style` and `gender` are lowercased; `size` and `brand` pass
    /// through verbatim. A legacy `category` with no `category_id` still emits
    /// `category_id` from the (empty) id field.
    #[must_use]
    pub fn query_params(&self) -> QueryParams {
        let mut params = QueryParams::default();

        if !self.category_id.is_empty() || !self.category.is_empty() {
            params.insert("category_id", ParamValue::Text(self.category_id.clone()));
        }

        if !self.color.is_empty() {
            params.insert("color", ParamValue::Text(self.color.to_lowercase()));
        }
        if !self.size.is_empty() {
            params.insert("size", ParamValue::Text(self.size.clone()));
        }
        if !self.style.is_empty() {
            params.insert("style", ParamValue::Text(self.style.to_lowercase()));
        }
        if !self.brand.is_empty() {
            params.insert("brand", ParamValue::Text(self.brand.clone()));
        }
        if !self.gender.is_empty() {
            params.insert("gender", ParamValue::Text(self.gender.to_lowercase()));
        }

        if self.price_range.min_is_active() {
            params.insert("min_price", ParamValue::Number(self.price_range.min));
        }
        if self.price_range.max_is_active() {
            params.insert("max_price", ParamValue::Number(self.price_range.max));
        }

        params
    }
}

/// A partial update to [`FilterState`]. `None` leaves a field unchanged;
/// `Some(String::new())` clears it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterUpdate {
    pub category: Option<String>,
    pub category_id: Option<String>,
    pub color: Option<String>,
    pub size: Option<String>,
    pub style: Option<String>,
    pub brand: Option<String>,
    pub gender: Option<String>,
    pub price_range: Option<PriceRange>,
}

impl FilterUpdate {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn category(mut self, value: impl Into<String>) -> Self {
        self.category = Some(value.into());
        self
    }

    #[must_use]
    pub fn category_id(mut self, value: impl Into<String>) -> Self {
        self.category_id = Some(value.into());
        self
    }

    #[must_use]
    pub fn color(mut self, value: impl Into<String>) -> Self {
        self.color = Some(value.into());
        self
    }

    #[must_use]
    pub fn size(mut self, value: impl Into<String>) -> Self {
        self.size = Some(value.into());
        self
    }

    #[must_use]
    pub fn style(mut self, value: impl Into<String>) -> Self {
        self.style = Some(value.into());
        self
    }

    #[must_use]
    pub fn brand(mut self, value: impl Into<String>) -> Self {
        self.brand = Some(value.into());
        self
    }

    #[must_use]
    pub fn gender(mut self, value: impl Into<String>) -> Self {
        self.gender = Some(value.into());
        self
    }

    #[must_use]
    pub fn price_range(mut self, min: f64, max: f64) -> Self {
        self.price_range = Some(PriceRange::new(min, max));
        self
    }

    /// Returns `true` if the update would not touch any field.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// A single query-parameter value. Numbers stay numeric until the transport
/// writes them into the query string.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ParamValue {
    Text(String),
    Number(f64),
}

impl fmt::Display for ParamValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParamValue::Text(s) => f.write_str(s),
            ParamValue::Number(n) => write!(f, "{n}"),
        }
    }
}

/// Transport-ready parameters derived from a [`FilterState`].
///
/// Keys are ordered, so two param sets built from equal states compare and
/// serialize identically.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(transparent)]
pub struct QueryParams(BTreeMap<&'static str, ParamValue>);

impl QueryParams {
    fn insert(&mut self, key: &'static str, value: ParamValue) {
        self.0.insert(key, value);
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<&ParamValue> {
        self.0.get(key)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &ParamValue)> {
        self.0.iter().map(|(k, v)| (*k, v))
    }

    /// Renders every parameter as a `(name, value)` string pair for a URL
    /// query string.
    #[must_use]
    pub fn to_query_pairs(&self) -> Vec<(&'static str, String)> {
        self.iter().map(|(k, v)| (k, v.to_string())).collect()
    }
}

#[cfg(test)]
#[path = "filters_test.rs"]
mod tests;
