//! Response shapes for `GET /products`.
//!
//! The API wraps results in an envelope:
//!
//! ```json
//! { "success": true, "data": [ { "id": 1, "price": 49.99, ... } ] }
//! { "success": false, "message": "Invalid category" }
//! ```
//!
//! Some older endpoints return a bare JSON array of products with no
//! envelope. Both shapes are accepted. An object carrying neither `success`
//! nor a product list is treated as a failure. Product records themselves stay
//! untyped ([`RawProduct`]) until [`ProductsResponse::into_products`]
//! validates them.

use serde::Deserialize;
use storefront_core::{Product, RawProduct};

use crate::error::ClientError;

#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum ProductsResponse {
    Bare(Vec<RawProduct>),
    Envelope(Envelope),
}

#[derive(Debug, Deserialize)]
pub struct Envelope {
    /// Absent on some endpoints; treated as `true` when a product list is present.
    #[serde(default)]
    pub success: Option<bool>,
    #[serde(default, alias = "products")]
    pub data: Option<Vec<RawProduct>>,
    #[serde(default, alias = "error")]
    pub message: Option<String>,
}

impl ProductsResponse {
    /// Validates every record into a [`Product`].
    ///
    /// # Errors
    ///
    /// - [`ClientError::Api`] if the envelope reports `success: false`, or has
    ///   neither `success` nor a product list.
    /// - [`ClientError::InvalidProduct`] for the first record without a usable price.
    pub fn into_products(self) -> Result<Vec<Product>, ClientError> {
        let raw = match self {
            ProductsResponse::Bare(raw) => raw,
            ProductsResponse::Envelope(Envelope {
                success,
                data,
                message,
            }) => match (success, data) {
                (Some(false), _) => {
                    return Err(ClientError::Api {
                        message: message.unwrap_or_else(|| "product request failed".to_string()),
                    });
                }
                (None, None) => {
                    return Err(ClientError::Api {
                        message: message
                            .unwrap_or_else(|| "response carried no product data".to_string()),
                    });
                }
                (_, data) => data.unwrap_or_default(),
            },
        };

        raw.into_iter()
            .map(|r| r.validate().map_err(ClientError::from))
            .collect()
    }
}
