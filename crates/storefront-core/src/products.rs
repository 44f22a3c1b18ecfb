//! Product records as the browse core sees them.
//!
//! The product API is loosely typed: numeric fields arrive as JSON numbers on
//! some endpoints and as decimal strings (`"12.99"`) on others, and optional
//! counters are frequently omitted. [`RawProduct`] accepts any of those shapes
//! and [`RawProduct::validate`] turns it into a [`Product`] with the defaulting
//! rules applied. Only `price` is mandatory.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::CoreError;

/// A validated product, read-only to the filter pipeline and discount engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    /// Backend identifier, stored as a string to avoid precision loss.
    pub id: String,
    pub name: Option<String>,
    pub brand: Option<String>,
    pub category: Option<String>,
    pub price: f64,
    /// Units sold to date. `0` when the backend omits it.
    pub sales_count: u64,
    /// Mean review score in `[0, 5]`.
    pub average_rating: f64,
    /// Units on hand. May be negative for back-ordered items.
    pub stock: i64,
}

impl Product {
    /// Creates a product with the given id and price and every counter at zero.
    ///
    /// For trusted input only; API records go through [`RawProduct::validate`].
    /// `price` must be finite.
    #[must_use]
    pub fn new(id: impl Into<String>, price: f64) -> Self {
        debug_assert!(price.is_finite(), "product price must be finite, got {price}");
        Self {
            id: id.into(),
            name: None,
            brand: None,
            category: None,
            price,
            sales_count: 0,
            average_rating: 0.0,
            stock: 0,
        }
    }
}

/// A product exactly as the API returned it, before validation.
///
/// Every field is optional and untyped. Both `snake_case` and `camelCase`
/// spellings are accepted.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawProduct {
    #[serde(default, alias = "_id")]
    pub id: Option<Value>,
    #[serde(default)]
    pub name: Option<Value>,
    #[serde(default)]
    pub brand: Option<Value>,
    #[serde(default)]
    pub category: Option<Value>,
    #[serde(default)]
    pub price: Option<Value>,
    #[serde(default, alias = "salesCount")]
    pub sales_count: Option<Value>,
    #[serde(default, alias = "averageRating")]
    pub average_rating: Option<Value>,
    #[serde(default)]
    pub stock: Option<Value>,
}

impl RawProduct {
    /// Validates the record into a [`Product`].
    ///
    /// Missing or mistyped counters (`sales_count`, `average_rating`, `stock`)
    /// default to `0`.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::InvalidProductData`] when `price` is absent, is not
    /// numeric, or is not finite.
    pub fn validate(self) -> Result<Product, CoreError> {
        let id = self.id.as_ref().map(id_string).unwrap_or_default();

        let price = match self.price.as_ref() {
            None | Some(Value::Null) => {
                return Err(CoreError::InvalidProductData {
                    product_id: display_id(&id),
                    reason: "missing price".to_string(),
                });
            }
            Some(value) => lenient_f64(value).ok_or_else(|| CoreError::InvalidProductData {
                product_id: display_id(&id),
                reason: format!("price is not a finite number: {value}"),
            })?,
        };

        Ok(Product {
            name: self.name.as_ref().and_then(text),
            brand: self.brand.as_ref().and_then(text),
            category: self.category.as_ref().and_then(text),
            price,
            sales_count: self.sales_count.as_ref().map_or(0, count),
            average_rating: self
                .average_rating
                .as_ref()
                .and_then(lenient_f64)
                .unwrap_or(0.0),
            stock: self.stock.as_ref().map_or(0, signed_count),
            id,
        })
    }
}

fn display_id(id: &str) -> String {
    if id.is_empty() {
        "<unknown>".to_string()
    } else {
        id.to_string()
    }
}

fn id_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

fn text(value: &Value) -> Option<String> {
    value.as_str().filter(|s| !s.is_empty()).map(str::to_owned)
}

/// Reads a JSON number or numeric string as a finite `f64`.
fn lenient_f64(value: &Value) -> Option<f64> {
    let parsed = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    parsed.filter(|v| v.is_finite())
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn count(value: &Value) -> u64 {
    if let Some(n) = value.as_u64() {
        return n;
    }
    lenient_f64(value).filter(|v| *v > 0.0).map_or(0, |v| v as u64)
}

#[allow(clippy::cast_possible_truncation)]
fn signed_count(value: &Value) -> i64 {
    if let Some(n) = value.as_i64() {
        return n;
    }
    lenient_f64(value).map_or(0, |v| v as i64)
}
