//! Filter pipeline: owns one session's [`FilterState`] and decides when a
//! state change warrants a product fetch.
//!
//! Every mutation is compared against a serialized snapshot of the previous
//! state. Two entry points apply the comparison differently:
//!
//! - Automatic refetch ([`FilterPipeline::set_filters`],
//!   [`FilterPipeline::reset_filters`]) fetches on the first evaluation and on
//!   any later snapshot change, except when the new state yields no query
//!   parameters at all.
//! - Explicit fetch ([`FilterPipeline::apply_filters_and_fetch`],
//!   [`FilterPipeline::activate`]) compares against the last *fetched*
//!   snapshot instead, so a state the automatic path skipped (e.g. a reset to
//!   defaults) is still fetched unfiltered on the next explicit call.
//!
//! Neither path fetches twice for an unchanged snapshot. Subscribers
//! registered with [`FilterPipeline::on_state_change`] see every decision.

use crate::filters::{FilterState, FilterUpdate, QueryParams};

/// A fetch the pipeline wants performed.
#[derive(Debug, Clone, PartialEq)]
pub struct FetchRequest {
    /// Monotonically increasing per pipeline, starting at 1.
    pub request_id: u64,
    pub params: QueryParams,
    /// `true` for the fetch issued on first activation.
    pub initial: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// The state snapshot matches the last evaluated one.
    Unchanged,
    /// The state changed but produces no query parameters.
    NoActiveFilters,
}

#[derive(Debug, Clone, PartialEq)]
pub enum FetchDecision {
    Fetch(FetchRequest),
    Skip(SkipReason),
}

impl FetchDecision {
    #[must_use]
    pub fn request(&self) -> Option<&FetchRequest> {
        match self {
            FetchDecision::Fetch(request) => Some(request),
            FetchDecision::Skip(_) => None,
        }
    }

    #[must_use]
    pub fn is_fetch(&self) -> bool {
        matches!(self, FetchDecision::Fetch(_))
    }
}

/// How the current snapshot relates to the previous one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Change {
    Initial,
    Changed,
    Unchanged,
}

/// Which refetch rule to apply.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trigger {
    Automatic,
    Explicit,
}

/// Serializes the whole filter state for snapshot comparison.
#[must_use]
pub fn snapshot(state: &FilterState) -> String {
    serde_json::to_string(state).unwrap_or_else(|e| {
        tracing::warn!(error = %e, "filter state did not serialize; using debug snapshot");
        format!("{state:?}")
    })
}

/// Classifies `current` against the previously evaluated snapshot.
#[must_use]
pub fn classify_change(previous: Option<&str>, current: &str) -> Change {
    match previous {
        None => Change::Initial,
        Some(prev) if prev == current => Change::Unchanged,
        Some(_) => Change::Changed,
    }
}

/// The refetch predicate. Returns `None` to fetch, or the reason to skip.
#[must_use]
pub fn skip_reason(change: Change, trigger: Trigger, params: &QueryParams) -> Option<SkipReason> {
    match (change, trigger) {
        (Change::Initial, _) => None,
        (Change::Unchanged, _) => Some(SkipReason::Unchanged),
        (Change::Changed, Trigger::Automatic) if params.is_empty() => {
            Some(SkipReason::NoActiveFilters)
        }
        (Change::Changed, _) => None,
    }
}

/// Handle returned by [`FilterPipeline::on_state_change`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Listener = Box<dyn FnMut(&FilterState, &FetchDecision) + Send>;

/// Canonical filter state for one browsing session, plus the snapshot guard
/// that suppresses redundant fetches.
pub struct FilterPipeline {
    state: FilterState,
    /// Last evaluated snapshot, fetched or skipped.
    last_snapshot: Option<String>,
    /// Last snapshot that produced a fetch.
    last_fetched_snapshot: Option<String>,
    last_request_id: u64,
    next_subscription: u64,
    listeners: Vec<(SubscriptionId, Listener)>,
}

impl std::fmt::Debug for FilterPipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FilterPipeline")
            .field("state", &self.state)
            .field("activated", &self.last_snapshot.is_some())
            .field("last_request_id", &self.last_request_id)
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

impl Default for FilterPipeline {
    fn default() -> Self {
        Self::new()
    }
}

impl FilterPipeline {
    /// Creates a pipeline holding the default filter state. Nothing is
    /// fetched until the first evaluation.
    #[must_use]
    pub fn new() -> Self {
        Self::with_state(FilterState::default())
    }

    /// Creates a pipeline seeded with `state`, e.g. restored from a URL.
    #[must_use]
    pub fn with_state(state: FilterState) -> Self {
        Self {
            state,
            last_snapshot: None,
            last_fetched_snapshot: None,
            last_request_id: 0,
            next_subscription: 0,
            listeners: Vec::new(),
        }
    }

    #[must_use]
    pub fn state(&self) -> &FilterState {
        &self.state
    }

    #[must_use]
    pub fn is_filter_active(&self) -> bool {
        self.state.is_active()
    }

    #[must_use]
    pub fn build_query_params(&self) -> QueryParams {
        self.state.query_params()
    }

    /// Returns `true` once the first evaluation has happened.
    #[must_use]
    pub fn is_activated(&self) -> bool {
        self.last_snapshot.is_some()
    }

    /// Registers an observer called after every evaluation with the new state
    /// and the fetch decision.
    pub fn on_state_change<F>(&mut self, listener: F) -> SubscriptionId
    where
        F: FnMut(&FilterState, &FetchDecision) + Send + 'static,
    {
        self.next_subscription += 1;
        let id = SubscriptionId(self.next_subscription);
        self.listeners.push((id, Box::new(listener)));
        id
    }

    /// Removes an observer. Returns `false` if `id` was not registered.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(sid, _)| *sid != id);
        self.listeners.len() != before
    }

    /// Evaluates the current state without changing it. The first call
    /// always yields the initial fetch.
    pub fn activate(&mut self) -> FetchDecision {
        self.evaluate(Trigger::Explicit)
    }

    /// Merges `update` into the state and applies the automatic refetch rule.
    pub fn set_filters(&mut self, update: FilterUpdate) -> FetchDecision {
        self.state.merge(update);
        self.evaluate(Trigger::Automatic)
    }

    /// Restores the default state and applies the automatic refetch rule.
    pub fn reset_filters(&mut self) -> FetchDecision {
        self.state = FilterState::default();
        self.evaluate(Trigger::Automatic)
    }

    /// Merges `updates` if given, then applies the explicit fetch rule. An
    /// empty parameter set is still fetched (unfiltered) when the state
    /// differs from the last fetched one.
    pub fn apply_filters_and_fetch(&mut self, updates: Option<FilterUpdate>) -> FetchDecision {
        if let Some(update) = updates {
            self.state.merge(update);
        }
        self.evaluate(Trigger::Explicit)
    }

    fn evaluate(&mut self, trigger: Trigger) -> FetchDecision {
        let current = snapshot(&self.state);
        let baseline = match trigger {
            Trigger::Automatic => self.last_snapshot.as_deref(),
            Trigger::Explicit => self.last_fetched_snapshot.as_deref(),
        };
        let change = classify_change(baseline, &current);
        let params = self.state.query_params();

        let decision = match skip_reason(change, trigger, &params) {
            Some(reason) => {
                tracing::debug!(?reason, ?trigger, "skipping product fetch");
                FetchDecision::Skip(reason)
            }
            None => {
                self.last_request_id += 1;
                tracing::debug!(
                    request_id = self.last_request_id,
                    params = params.len(),
                    ?trigger,
                    "filter state requires product fetch"
                );
                let initial = self.last_fetched_snapshot.is_none();
                self.last_fetched_snapshot = Some(current.clone());
                FetchDecision::Fetch(FetchRequest {
                    request_id: self.last_request_id,
                    params,
                    initial,
                })
            }
        };

        self.last_snapshot = Some(current);

        for (_, listener) in &mut self.listeners {
            listener(&self.state, &decision);
        }

        decision
    }
}

#[cfg(test)]
#[path = "pipeline_test.rs"]
mod tests;
