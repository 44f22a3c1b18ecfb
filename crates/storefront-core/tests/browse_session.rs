//! End-to-end tests for `BrowseSession` against an in-memory product source.
//!
//! The fake source records every parameter set it was asked for, so the tests
//! can assert exactly when the session reaches the network.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use storefront_core::{
    BrowseSession, DiscountStrategy, FetchError, FetchOutcome, FilterUpdate, ParamValue, Product,
    ProductSource, QueryParams, SaleTag, SkipReason,
};

#[derive(Clone, Default)]
struct RecordingSource {
    calls: Arc<Mutex<Vec<QueryParams>>>,
    fail_with: Option<String>,
    products: Vec<Product>,
}

impl RecordingSource {
    fn with_products(products: Vec<Product>) -> Self {
        Self {
            products,
            ..Self::default()
        }
    }

    fn failing(message: &str) -> Self {
        Self {
            fail_with: Some(message.to_string()),
            ..Self::default()
        }
    }

    fn calls(&self) -> Vec<QueryParams> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl ProductSource for RecordingSource {
    async fn fetch_products(&self, params: &QueryParams) -> Result<Vec<Product>, FetchError> {
        self.calls.lock().unwrap().push(params.clone());
        match &self.fail_with {
            Some(message) => Err(FetchError::new(message.clone())),
            None => Ok(self.products.clone()),
        }
    }
}

fn product(id: &str, price: f64, sales_count: u64) -> Product {
    Product {
        sales_count,
        ..Product::new(id, price)
    }
}

// ---------------------------------------------------------------------------
// fetch triggering
// ---------------------------------------------------------------------------

#[tokio::test]
async fn activation_fetches_unfiltered_once() {
    let source = RecordingSource::default();
    let mut session = BrowseSession::new(source.clone());

    assert_eq!(session.activate().await, FetchOutcome::Stored { request_id: 1 });
    assert_eq!(
        session.activate().await,
        FetchOutcome::Skipped(SkipReason::Unchanged)
    );

    let calls = source.calls();
    assert_eq!(calls.len(), 1);
    assert!(calls[0].is_empty());
}

#[tokio::test]
async fn identical_apply_calls_fetch_once() {
    let source = RecordingSource::default();
    let mut session = BrowseSession::new(source.clone());

    session.apply_filters_and_fetch(None).await;
    session.apply_filters_and_fetch(None).await;

    assert_eq!(source.calls().len(), 1);
}

#[tokio::test]
async fn filter_change_sends_derived_params() {
    let source = RecordingSource::default();
    let mut session = BrowseSession::new(source.clone());
    session.activate().await;

    session
        .set_filters(
            FilterUpdate::new()
                .category_id("3")
                .category("shoes")
                .color("Red"),
        )
        .await;

    let calls = source.calls();
    assert_eq!(calls.len(), 2);
    assert_eq!(
        calls[1].get("category_id"),
        Some(&ParamValue::Text("3".to_string()))
    );
    assert_eq!(
        calls[1].get("color"),
        Some(&ParamValue::Text("red".to_string()))
    );
}

#[tokio::test]
async fn reset_to_defaults_skips_automatic_refetch() {
    let source = RecordingSource::default();
    let mut session = BrowseSession::new(source.clone());
    session.activate().await;
    session.set_filters(FilterUpdate::new().brand("Acme")).await;

    assert_eq!(
        session.reset_filters().await,
        FetchOutcome::Skipped(SkipReason::NoActiveFilters)
    );
    assert_eq!(source.calls().len(), 2);
    assert!(!session.is_filter_active());
}

#[tokio::test]
async fn explicit_apply_after_clearing_fetches_unfiltered() {
    let source = RecordingSource::default();
    let mut session = BrowseSession::new(source.clone());
    session.activate().await;
    session.set_filters(FilterUpdate::new().brand("Acme")).await;

    session
        .apply_filters_and_fetch(Some(FilterUpdate::new().brand("")))
        .await;

    let calls = source.calls();
    assert_eq!(calls.len(), 3);
    assert!(calls[2].is_empty());
}

#[tokio::test]
async fn explicit_apply_after_reset_replaces_filtered_products() {
    let source = RecordingSource::with_products(vec![product("p-1", 20.0, 0)]);
    let mut session = BrowseSession::new(source.clone());
    session.activate().await;
    session.set_filters(FilterUpdate::new().color("red")).await;
    session.reset_filters().await;

    assert_eq!(
        session.apply_filters_and_fetch(None).await,
        FetchOutcome::Stored { request_id: 3 }
    );

    let calls = source.calls();
    assert_eq!(calls.len(), 3);
    assert!(calls[2].is_empty());
    assert_eq!(session.view().latest_request_id(), 3);
}

// ---------------------------------------------------------------------------
// stored results
// ---------------------------------------------------------------------------

#[tokio::test]
async fn fetched_products_are_stored_in_view() {
    let source = RecordingSource::with_products(vec![product("1", 10.0, 0)]);
    let mut session = BrowseSession::new(source);
    session.activate().await;

    assert_eq!(session.view().products().len(), 1);
    assert!(session.view().error().is_none());
    assert!(!session.view().is_loading());
}

#[tokio::test]
async fn fetch_failure_is_stored_as_message() {
    let mut session = BrowseSession::new(RecordingSource::failing("catalog offline"));

    assert_eq!(session.activate().await, FetchOutcome::Stored { request_id: 1 });
    assert!(session.view().products().is_empty());
    assert_eq!(session.view().error(), Some("catalog offline"));
}

#[tokio::test]
async fn sale_listing_ranks_current_products() {
    let source = RecordingSource::with_products(vec![
        product("slow", 100.0, 2),
        product("steady", 100.0, 30),
        product("hit", 100.0, 500),
    ]);
    let mut session = BrowseSession::new(source);
    session.activate().await;

    let listing = session.sale_listing(DiscountStrategy::Tiered);
    let ids: Vec<&str> = listing.iter().map(|s| s.product.id.as_str()).collect();
    assert_eq!(ids, vec!["hit", "steady", "slow"]);
    assert_eq!(listing[0].discount_percentage, 35);
    assert_eq!(listing[0].tag, SaleTag::HotDeal);
    assert!(!listing[2].is_on_sale);
}

#[tokio::test]
async fn listing_bonus_follows_arrival_order() {
    let source = RecordingSource::with_products(
        ["a", "b", "c", "d", "e", "late-hit"]
            .iter()
            .map(|id| product(id, 100.0, 0))
            .collect(),
    );
    let mut session = BrowseSession::new(source);
    session.activate().await;

    let listing = session.sale_listing(DiscountStrategy::Listing);
    let discounts: Vec<(&str, u8)> = listing
        .iter()
        .map(|s| (s.product.id.as_str(), s.discount_percentage))
        .collect();
    assert_eq!(
        discounts,
        vec![
            ("a", 15),
            ("b", 15),
            ("c", 15),
            ("d", 15),
            ("e", 15),
            ("late-hit", 10)
        ]
    );
}

#[tokio::test]
async fn observers_registered_on_session_pipeline_fire() {
    let hits = Arc::new(Mutex::new(0u32));
    let sink = Arc::clone(&hits);

    let mut session = BrowseSession::new(RecordingSource::default());
    session
        .pipeline_mut()
        .on_state_change(move |_, decision| {
            if decision.is_fetch() {
                *sink.lock().unwrap() += 1;
            }
        });

    session.activate().await;
    session.set_filters(FilterUpdate::new().size("M")).await;
    session.set_filters(FilterUpdate::new().size("M")).await;

    assert_eq!(*hits.lock().unwrap(), 2);
}
