//! Command handlers for `params` and `browse`.
//!
//! `params` is offline: it only derives query parameters. `browse` loads the
//! config, builds a [`CatalogClient`] and runs a single session activation
//! with the requested filters already applied, so exactly one request is
//! issued.

use storefront_client::CatalogClient;
use storefront_core::{
    AppConfig, BrowseSession, DiscountStrategy, FilterPipeline, Product, SaleProduct,
};

use crate::filters::FilterArgs;

/// JSON report printed by `params`.
pub(crate) fn params_report(filters: &FilterArgs) -> serde_json::Value {
    let state = filters.to_state();
    serde_json::json!({
        "active": state.is_active(),
        "params": state.query_params(),
    })
}

pub(crate) fn run_params(filters: &FilterArgs) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(&params_report(filters))?);
    Ok(())
}

/// Fetches products for `filters` and prints them, optionally as a ranked
/// sale listing.
///
/// # Errors
///
/// Returns an error if the client cannot be built or the fetch fails. The
/// failure text is the message the catalog view stored.
pub(crate) async fn run_browse(
    config: &AppConfig,
    filters: &FilterArgs,
    sale: Option<DiscountStrategy>,
    json: bool,
) -> anyhow::Result<()> {
    let client = CatalogClient::from_config(config)
        .map_err(|e| anyhow::anyhow!("failed to build catalog client: {e}"))?;
    let pipeline = FilterPipeline::with_state(filters.to_state());
    let mut session = BrowseSession::with_pipeline(client, pipeline);

    let outcome = session.activate().await;
    tracing::debug!(?outcome, "browse session activated");

    if let Some(message) = session.view().error() {
        anyhow::bail!("product fetch failed: {message}");
    }

    match sale {
        Some(strategy) => {
            let listing = session.sale_listing(strategy);
            if json {
                println!("{}", serde_json::to_string_pretty(&listing)?);
            } else {
                println!("{} products ({strategy} pricing)", listing.len());
                for item in &listing {
                    println!("{}", format_sale_line(item));
                }
            }
        }
        None => {
            let products = session.view().products();
            if json {
                println!("{}", serde_json::to_string_pretty(products)?);
            } else {
                println!("{} products", products.len());
                for product in products {
                    println!("{}", format_product_line(product));
                }
            }
        }
    }

    Ok(())
}

fn display_name(product: &Product) -> &str {
    product.name.as_deref().unwrap_or("(unnamed)")
}

pub(crate) fn format_product_line(product: &Product) -> String {
    format!(
        "{:<10} {:<32} {:>9.2}  sold {:<5} rating {:.1}",
        product.id,
        display_name(product),
        product.price,
        product.sales_count,
        product.average_rating,
    )
}

pub(crate) fn format_sale_line(item: &SaleProduct) -> String {
    format!(
        "{:<10} {:<32} {:>3}% off  {:>9.2} -> {:>9.2}  save {:.2}  [{}]",
        item.product.id,
        display_name(&item.product),
        item.discount_percentage,
        item.product.price,
        item.sale_price,
        item.savings,
        item.tag,
    )
}
