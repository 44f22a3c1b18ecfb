//! Product list state for a browse session and the fetch collaborator seam.
//!
//! The pipeline decides *when* to fetch; a [`ProductSource`] performs the
//! fetch; [`CatalogView`] stores the outcome. Each request carries the id the
//! pipeline assigned, and the view only accepts a result for the most recently
//! issued id, so a slow response to an older request can never overwrite a
//! newer one.

use async_trait::async_trait;
use thiserror::Error;

use crate::discount::{add_sale_info_with, rank_by_discount, DiscountStrategy, SaleProduct};
use crate::filters::{FilterState, FilterUpdate, QueryParams};
use crate::pipeline::{FetchDecision, FetchRequest, FilterPipeline, SkipReason};
use crate::products::Product;

/// A failed fetch, reduced to the message shown to the shopper.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("{message}")]
pub struct FetchError {
    pub message: String,
}

impl FetchError {
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Anything that can return products for a set of query parameters.
#[async_trait]
pub trait ProductSource: Send + Sync {
    /// Fetches products matching `params`. An empty set means unfiltered.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError`] with a human-readable message on any failure.
    async fn fetch_products(&self, params: &QueryParams) -> Result<Vec<Product>, FetchError>;
}

/// What happened to a pipeline decision once it reached the session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchOutcome {
    /// The pipeline suppressed the fetch.
    Skipped(SkipReason),
    /// The fetch completed and its result was stored.
    Stored { request_id: u64 },
    /// The fetch completed after a newer request was issued; result dropped.
    Stale { request_id: u64 },
}

/// The product list currently shown, plus loading and error state.
#[derive(Debug, Clone, Default)]
pub struct CatalogView {
    products: Vec<Product>,
    error: Option<String>,
    loading: bool,
    latest_request_id: u64,
}

impl CatalogView {
    #[must_use]
    pub fn products(&self) -> &[Product] {
        &self.products
    }

    #[must_use]
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    #[must_use]
    pub fn is_loading(&self) -> bool {
        self.loading
    }

    #[must_use]
    pub fn latest_request_id(&self) -> u64 {
        self.latest_request_id
    }

    /// Records `request` as the newest in flight.
    pub fn begin(&mut self, request: &FetchRequest) {
        self.latest_request_id = self.latest_request_id.max(request.request_id);
        self.loading = true;
    }

    /// Stores `result` if `request_id` is the newest issued request.
    ///
    /// A failure clears the product list and keeps the message. Returns
    /// `false` when the result was stale and discarded.
    pub fn complete(
        &mut self,
        request_id: u64,
        result: Result<Vec<Product>, FetchError>,
    ) -> bool {
        if request_id != self.latest_request_id {
            tracing::warn!(
                request_id,
                latest = self.latest_request_id,
                "discarding stale product response"
            );
            return false;
        }

        self.loading = false;
        match result {
            Ok(products) => {
                tracing::debug!(request_id, count = products.len(), "stored products");
                self.products = products;
                self.error = None;
            }
            Err(err) => {
                tracing::warn!(request_id, error = %err, "product fetch failed");
                self.products.clear();
                self.error = Some(err.message);
            }
        }
        true
    }
}

/// One shopper's browse session: a pipeline, the view it feeds, and the
/// source it fetches from.
pub struct BrowseSession<S> {
    pipeline: FilterPipeline,
    view: CatalogView,
    source: S,
}

impl<S: ProductSource> BrowseSession<S> {
    #[must_use]
    pub fn new(source: S) -> Self {
        Self::with_pipeline(source, FilterPipeline::new())
    }

    #[must_use]
    pub fn with_pipeline(source: S, pipeline: FilterPipeline) -> Self {
        Self {
            pipeline,
            view: CatalogView::default(),
            source,
        }
    }

    #[must_use]
    pub fn pipeline(&self) -> &FilterPipeline {
        &self.pipeline
    }

    /// Mutable access for registering observers.
    pub fn pipeline_mut(&mut self) -> &mut FilterPipeline {
        &mut self.pipeline
    }

    #[must_use]
    pub fn view(&self) -> &CatalogView {
        &self.view
    }

    #[must_use]
    pub fn state(&self) -> &FilterState {
        self.pipeline.state()
    }

    #[must_use]
    pub fn is_filter_active(&self) -> bool {
        self.pipeline.is_filter_active()
    }

    #[must_use]
    pub fn build_query_params(&self) -> QueryParams {
        self.pipeline.build_query_params()
    }

    /// Performs the initial fetch. Later calls are no-ops until state changes.
    pub async fn activate(&mut self) -> FetchOutcome {
        let decision = self.pipeline.activate();
        self.run(decision).await
    }

    pub async fn set_filters(&mut self, update: FilterUpdate) -> FetchOutcome {
        let decision = self.pipeline.set_filters(update);
        self.run(decision).await
    }

    pub async fn reset_filters(&mut self) -> FetchOutcome {
        let decision = self.pipeline.reset_filters();
        self.run(decision).await
    }

    pub async fn apply_filters_and_fetch(&mut self, updates: Option<FilterUpdate>) -> FetchOutcome {
        let decision = self.pipeline.apply_filters_and_fetch(updates);
        self.run(decision).await
    }

    /// Current products priced with `strategy`, highest discount first.
    ///
    /// The listing variant's featured bonus goes to the first five products in
    /// arrival order, i.e. the order the source returned them.
    #[must_use]
    pub fn sale_listing(&self, strategy: DiscountStrategy) -> Vec<SaleProduct> {
        rank_by_discount(add_sale_info_with(self.view.products(), strategy))
    }

    async fn run(&mut self, decision: FetchDecision) -> FetchOutcome {
        let request = match decision {
            FetchDecision::Skip(reason) => return FetchOutcome::Skipped(reason),
            FetchDecision::Fetch(request) => request,
        };

        self.view.begin(&request);
        let result = self.source.fetch_products(&request.params).await;
        if self.view.complete(request.request_id, result) {
            FetchOutcome::Stored {
                request_id: request.request_id,
            }
        } else {
            FetchOutcome::Stale {
                request_id: request.request_id,
            }
        }
    }
}
