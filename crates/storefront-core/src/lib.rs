pub mod app_config;
pub mod catalog;
pub mod config;
pub mod discount;
pub mod filters;
pub mod pipeline;
pub mod products;

pub use app_config::{AppConfig, Environment};
pub use catalog::{BrowseSession, CatalogView, FetchError, FetchOutcome, ProductSource};
pub use config::{load_app_config, load_app_config_from_env};
pub use discount::{
    add_sale_info, add_sale_info_with, calculate_discount, calculate_listing_discount,
    rank_by_discount, sale_listing_from_raw, DiscountStrategy, SaleProduct, SaleTag,
};
pub use filters::{FilterState, FilterUpdate, ParamValue, PriceRange, QueryParams};
pub use pipeline::{FetchDecision, FetchRequest, FilterPipeline, SkipReason, SubscriptionId};
pub use products::{Product, RawProduct};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CoreError {
    #[error("invalid product data for {product_id}: {reason}")]
    InvalidProductData { product_id: String, reason: String },
}
