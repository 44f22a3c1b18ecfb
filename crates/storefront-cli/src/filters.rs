//! Filter flags shared by the `params` and `browse` subcommands.

use clap::{Args, ValueEnum};
use storefront_core::filters::{DEFAULT_PRICE_MAX, DEFAULT_PRICE_MIN};
use storefront_core::{DiscountStrategy, FilterState, FilterUpdate};

#[derive(Debug, Clone, Default, PartialEq, Args)]
pub struct FilterArgs {
    /// Category name (e.g. Shoes)
    #[arg(long)]
    pub category: Option<String>,
    /// Backend category identifier
    #[arg(long = "category-id")]
    pub category_id: Option<String>,
    #[arg(long)]
    pub color: Option<String>,
    #[arg(long)]
    pub size: Option<String>,
    #[arg(long)]
    pub style: Option<String>,
    #[arg(long)]
    pub brand: Option<String>,
    #[arg(long)]
    pub gender: Option<String>,
    /// Lower price bound (default 0)
    #[arg(long = "price-min")]
    pub price_min: Option<f64>,
    /// Upper price bound (default 500)
    #[arg(long = "price-max")]
    pub price_max: Option<f64>,
}

impl FilterArgs {
    /// Only flags that were passed end up in the update. A single price flag
    /// keeps the other bound at its default.
    #[must_use]
    pub fn to_update(&self) -> FilterUpdate {
        let mut update = FilterUpdate {
            category: self.category.clone(),
            category_id: self.category_id.clone(),
            color: self.color.clone(),
            size: self.size.clone(),
            style: self.style.clone(),
            brand: self.brand.clone(),
            gender: self.gender.clone(),
            price_range: None,
        };
        if self.price_min.is_some() || self.price_max.is_some() {
            update = update.price_range(
                self.price_min.unwrap_or(DEFAULT_PRICE_MIN),
                self.price_max.unwrap_or(DEFAULT_PRICE_MAX),
            );
        }
        update
    }

    #[must_use]
    pub fn to_state(&self) -> FilterState {
        let mut state = FilterState::default();
        state.merge(self.to_update());
        state
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum SaleArg {
    Tiered,
    Listing,
}

impl From<SaleArg> for DiscountStrategy {
    fn from(value: SaleArg) -> Self {
        match value {
            SaleArg::Tiered => DiscountStrategy::Tiered,
            SaleArg::Listing => DiscountStrategy::Listing,
        }
    }
}
