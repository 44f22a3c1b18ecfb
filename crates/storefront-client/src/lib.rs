//! HTTP fetch collaborator for the storefront product API.
//!
//! [`CatalogClient`] turns a [`storefront_core::QueryParams`] set into a
//! `GET /products` request, retries transient failures, and validates the
//! returned records into [`storefront_core::Product`]s.

pub mod client;
pub mod error;
pub mod types;

mod retry;

pub use client::CatalogClient;
pub use error::ClientError;
pub use types::ProductsResponse;
