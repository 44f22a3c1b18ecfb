//! Rule-based sale discounts derived from a product's own signals.
//!
//! Two formulas coexist, one per listing surface:
//!
//! - [`DiscountStrategy::Tiered`]: additive bonuses for sales, rating and
//!   stock on top of a base of 10, capped at 60. Used by the sale page.
//! - [`DiscountStrategy::Listing`]: a single tier picked from `sales_count`
//!   alone, plus a bonus for the first five ranked items, capped at 50.
//!
//! Neither formula is random; the same product always gets the same discount.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::products::{Product, RawProduct};
use crate::CoreError;

pub const BASE_DISCOUNT: u8 = 10;
pub const MAX_TIERED_DISCOUNT: u8 = 60;
pub const MAX_LISTING_DISCOUNT: u8 = 50;
/// Ranked positions `0..LISTING_FEATURED_SLOTS` get [`LISTING_FEATURED_BONUS`].
pub const LISTING_FEATURED_SLOTS: usize = 5;
pub const LISTING_FEATURED_BONUS: u8 = 5;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DiscountStrategy {
    #[default]
    Tiered,
    Listing,
}

impl DiscountStrategy {
    /// Discount for `product` at position `rank` in the incoming list.
    /// `rank` only matters for [`DiscountStrategy::Listing`].
    #[must_use]
    pub fn discount(self, product: &Product, rank: usize) -> u8 {
        match self {
            DiscountStrategy::Tiered => calculate_discount(product),
            DiscountStrategy::Listing => calculate_listing_discount(product, rank),
        }
    }
}

impl fmt::Display for DiscountStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DiscountStrategy::Tiered => write!(f, "tiered"),
            DiscountStrategy::Listing => write!(f, "listing"),
        }
    }
}

impl FromStr for DiscountStrategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "tiered" => Ok(DiscountStrategy::Tiered),
            "listing" => Ok(DiscountStrategy::Listing),
            other => Err(format!(
                "unknown discount strategy \"{other}\"; expected tiered or listing"
            )),
        }
    }
}

/// Badge shown on a sale card.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SaleTag {
    #[serde(rename = "Hot Deal")]
    HotDeal,
    #[serde(rename = "Great Deal")]
    GreatDeal,
    #[serde(rename = "On Sale")]
    OnSale,
}

impl SaleTag {
    #[must_use]
    pub fn for_discount(discount: u8) -> Self {
        if discount >= 30 {
            SaleTag::HotDeal
        } else if discount >= 20 {
            SaleTag::GreatDeal
        } else {
            SaleTag::OnSale
        }
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            SaleTag::HotDeal => "Hot Deal",
            SaleTag::GreatDeal => "Great Deal",
            SaleTag::OnSale => "On Sale",
        }
    }
}

impl fmt::Display for SaleTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A product with its derived sale fields. The wrapped product is a copy;
/// the source record is never modified.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SaleProduct {
    #[serde(flatten)]
    pub product: Product,
    pub discount_percentage: u8,
    /// `price * (1 - discount / 100)`, unrounded.
    pub sale_price: f64,
    /// `price - sale_price`, unrounded.
    pub savings: f64,
    pub tag: SaleTag,
    pub is_on_sale: bool,
}

impl SaleProduct {
    #[must_use]
    pub fn new(product: Product, discount_percentage: u8) -> Self {
        let sale_price = product.price * (1.0 - f64::from(discount_percentage) / 100.0);
        let savings = product.price - sale_price;
        Self {
            discount_percentage,
            sale_price,
            savings,
            tag: SaleTag::for_discount(discount_percentage),
            is_on_sale: discount_percentage > BASE_DISCOUNT,
            product,
        }
    }
}

/// Additive tiered discount: base 10, plus sales, rating and stock bonuses,
/// capped at 60.
#[must_use]
pub fn calculate_discount(product: &Product) -> u8 {
    let sales_bonus = match product.sales_count {
        n if n > 100 => 25,
        n if n > 50 => 20,
        n if n > 20 => 15,
        n if n > 10 => 10,
        _ => 0,
    };

    let rating_bonus = if product.average_rating >= 4.5 {
        10
    } else if product.average_rating >= 4.0 {
        5
    } else {
        0
    };

    let stock_bonus = match product.stock {
        n if n > 100 => 10,
        n if n > 50 => 5,
        _ => 0,
    };

    (BASE_DISCOUNT + sales_bonus + rating_bonus + stock_bonus).min(MAX_TIERED_DISCOUNT)
}

/// Listing-page discount: one tier from `sales_count`, plus a bonus for the
/// first five ranked positions, capped at 50.
#[must_use]
pub fn calculate_listing_discount(product: &Product, rank: usize) -> u8 {
    let tier = match product.sales_count {
        n if n > 100 => 50,
        n if n > 50 => 40,
        n if n > 20 => 30,
        n if n > 10 => 20,
        _ => BASE_DISCOUNT,
    };

    let featured = if rank < LISTING_FEATURED_SLOTS {
        LISTING_FEATURED_BONUS
    } else {
        0
    };

    (tier + featured).min(MAX_LISTING_DISCOUNT)
}

/// Attaches tiered sale fields to each product, preserving order.
#[must_use]
pub fn add_sale_info(products: &[Product]) -> Vec<SaleProduct> {
    add_sale_info_with(products, DiscountStrategy::Tiered)
}

/// Attaches sale fields computed with `strategy`, preserving order. Input
/// order is the rank used by [`DiscountStrategy::Listing`].
#[must_use]
pub fn add_sale_info_with(products: &[Product], strategy: DiscountStrategy) -> Vec<SaleProduct> {
    products
        .iter()
        .enumerate()
        .map(|(rank, product)| {
            let discount = strategy.discount(product, rank);
            tracing::trace!(
                product_id = %product.id,
                %strategy,
                rank,
                discount,
                "computed sale discount"
            );
            SaleProduct::new(product.clone(), discount)
        })
        .collect()
}

/// Stable sort, highest discount first. Equal discounts keep their input order.
#[must_use]
pub fn rank_by_discount(mut products: Vec<SaleProduct>) -> Vec<SaleProduct> {
    products.sort_by(|a, b| b.discount_percentage.cmp(&a.discount_percentage));
    products
}

/// Validates raw API records, prices them with `strategy`, and ranks them.
///
/// # Errors
///
/// Returns [`CoreError::InvalidProductData`] for the first record without a
/// usable price. No partial listing is returned.
pub fn sale_listing_from_raw(
    raw: Vec<RawProduct>,
    strategy: DiscountStrategy,
) -> Result<Vec<SaleProduct>, CoreError> {
    let products = raw
        .into_iter()
        .map(RawProduct::validate)
        .collect::<Result<Vec<_>, _>>()?;
    Ok(rank_by_discount(add_sale_info_with(&products, strategy)))
}

#[cfg(test)]
#[path = "discount_test.rs"]
mod tests;
