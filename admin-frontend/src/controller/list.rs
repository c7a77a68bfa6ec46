//! Generic controller behind every paginated list page.
//!
//! One instance exists per signed-in session and list. It owns the query,
//! the last successful result, the banner outcome and the loading flags.
//! State sits behind a plain mutex that is never held across an await.

use super::mutation::MutationError;
use super::outcome::{MutationOutcome, OutcomeSlot};
use super::pagination::PaginationView;
use super::query::{ListQuery, SortConfig};
use crate::config::ListSettings;
use crate::services::{AccessToken, ApiError, BackendClient};
use serde::de::DeserializeOwned;
use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

/// Static description of one list endpoint of the backend.
pub trait ListEndpoint: Send + Sync + 'static {
    type Item: DeserializeOwned + Clone + Send + Sync + 'static;

    /// Path of the list endpoint, e.g. `/documents`.
    const PATH: &'static str;
    /// Plural noun used in logs.
    const NAME: &'static str;
    const FETCH_ERROR: &'static str;
    /// Query parameters accepted as filters.
    const FILTERS: &'static [&'static str];
    /// Columns the list may be sorted by. Empty when the list is unsorted.
    const SORT_KEYS: &'static [&'static str] = &[];

    fn default_sort() -> Option<SortConfig> {
        None
    }

    fn item_id(item: &Self::Item) -> &str;
}

/// One page of a list endpoint.
#[derive(Debug, Clone, PartialEq)]
pub struct ListResult<T> {
    pub items: Vec<T>,
    pub total_pages: u32,
}

impl<T> Default for ListResult<T> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            total_pages: 1,
        }
    }
}

/// User intent coming from the table controls.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListIntent {
    Page(u32),
    Search(String),
    Filter { name: String, value: String },
    Sort(String),
    /// Back to page 1 with no search, no filters and the default sort.
    Reset,
}

#[derive(Debug, Clone, Copy)]
pub struct ControllerOptions {
    pub page_size: u32,
    pub window: u32,
    pub message_ttl: Duration,
}

impl ControllerOptions {
    pub fn documents(settings: &ListSettings) -> Self {
        Self {
            page_size: settings.page_size,
            window: settings.pagination_window,
            message_ttl: Duration::from_secs(settings.document_message_secs),
        }
    }

    pub fn users(settings: &ListSettings) -> Self {
        Self {
            page_size: settings.page_size,
            window: settings.pagination_window,
            message_ttl: Duration::from_secs(settings.user_message_secs),
        }
    }
}

/// Render-ready copy of the controller state.
#[derive(Debug, Clone)]
pub struct ListSnapshot<T> {
    pub query: ListQuery,
    pub items: Vec<T>,
    pub total_pages: u32,
    pub loaded: bool,
    pub outcome: Option<MutationOutcome>,
    pub loading: bool,
    pub mutating: bool,
    pub pagination: PaginationView,
    pub message_ttl_secs: u64,
}

struct ListState<T> {
    query: ListQuery,
    result: ListResult<T>,
    loaded: bool,
    outcome: OutcomeSlot,
    in_flight: usize,
    mutating: bool,
    issued: u64,
    applied: u64,
}

pub struct ListController<E: ListEndpoint> {
    backend: Arc<BackendClient>,
    options: ControllerOptions,
    state: Mutex<ListState<E::Item>>,
}

impl<E: ListEndpoint> ListController<E> {
    pub fn new(backend: Arc<BackendClient>, options: ControllerOptions) -> Self {
        let state = ListState {
            query: ListQuery::new(options.page_size, E::default_sort()),
            result: ListResult::default(),
            loaded: false,
            outcome: OutcomeSlot::new(options.message_ttl),
            in_flight: 0,
            mutating: false,
            issued: 0,
            applied: 0,
        };

        Self {
            backend,
            options,
            state: Mutex::new(state),
        }
    }

    pub fn backend(&self) -> &BackendClient {
        &self.backend
    }

    pub fn message_ttl(&self) -> Duration {
        self.options.message_ttl
    }

    fn lock(&self) -> MutexGuard<'_, ListState<E::Item>> {
        // State stays consistent between statements, so a poisoned lock is still usable.
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn query(&self) -> ListQuery {
        self.lock().query.clone()
    }

    /// Applies a table intent to the query. Unknown filters and sort keys
    /// are ignored. Returns whether the query changed.
    pub fn apply(&self, intent: ListIntent) -> bool {
        let mut state = self.lock();
        let before = state.query.clone();

        match intent {
            ListIntent::Page(page) => state.query.set_page(page),
            ListIntent::Search(term) => state.query.set_search(&term),
            ListIntent::Filter { name, value } => {
                if E::FILTERS.contains(&name.as_str()) {
                    state.query.set_filter(&name, &value);
                } else {
                    tracing::debug!(list = E::NAME, filter = %name, "Ignoring unknown filter");
                }
            }
            ListIntent::Sort(key) => {
                if E::SORT_KEYS.contains(&key.as_str()) {
                    state.query.toggle_sort(&key);
                } else {
                    tracing::debug!(list = E::NAME, sort = %key, "Ignoring unknown sort key");
                }
            }
            ListIntent::Reset => {
                state.query = ListQuery::new(self.options.page_size, E::default_sort());
            }
        }

        state.query != before
    }

    /// Loads the page the current query points at.
    ///
    /// A response is applied only if no later-issued fetch has been applied
    /// already. On failure the previous items stay in place and an error
    /// outcome is set.
    pub async fn fetch(&self, token: &AccessToken) -> Result<(), ApiError> {
        let (seq, params) = {
            let mut state = self.lock();
            state.issued += 1;
            state.in_flight += 1;
            (state.issued, state.query.to_params())
        };
        let _in_flight = InFlightGuard { controller: self };

        let response = self
            .backend
            .list::<E::Item>(token, E::PATH, &params)
            .await;

        let mut state = self.lock();
        if seq < state.applied {
            tracing::debug!(list = E::NAME, seq, applied = state.applied, "Discarding stale list response");
            return response.map(|_| ());
        }
        state.applied = seq;

        match response {
            Ok(result) => {
                state.result = result;
                state.loaded = true;
                state.outcome.clear_error();
                Ok(())
            }
            Err(err) => {
                tracing::error!(list = E::NAME, error = %err, "Failed to fetch list");
                state.outcome.set(MutationOutcome::error(err.user_message(E::FETCH_ERROR)));
                Err(err)
            }
        }
    }

    /// Runs one backend mutation under the loading flag.
    ///
    /// A second mutation while one is running is refused with
    /// [`MutationError::InProgress`] and leaves the state alone. When the
    /// backend was reached the list is refetched before the outcome is set,
    /// so the banner always describes the mutation.
    pub async fn mutate<F, Fut>(
        &self,
        token: &AccessToken,
        success_message: &str,
        operation: F,
    ) -> Result<(), MutationError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<(), MutationError>>,
    {
        {
            let mut state = self.lock();
            if state.mutating {
                return Err(MutationError::InProgress);
            }
            state.mutating = true;
            state.outcome.clear();
        }
        let _mutating = MutatingGuard { controller: self };

        let result = operation().await;

        let refetch = match &result {
            Ok(()) => true,
            Err(err) => err.touched_backend(),
        };
        if refetch {
            // A failed refetch is logged by fetch; the mutation outcome wins the banner.
            let _ = self.fetch(token).await;
        }

        let outcome = match &result {
            Ok(()) => {
                tracing::info!(list = E::NAME, message = success_message, "Mutation succeeded");
                MutationOutcome::success(success_message)
            }
            Err(err) => {
                tracing::warn!(list = E::NAME, error = %err, "Mutation failed");
                MutationOutcome::error(err.to_string())
            }
        };
        self.lock().outcome.set(outcome);

        result
    }

    /// Sets a banner without a backend call, e.g. for local validation errors.
    pub fn report(&self, outcome: MutationOutcome) {
        self.lock().outcome.set(outcome);
    }

    pub fn dismiss_outcome(&self) {
        self.lock().outcome.clear();
    }

    pub fn outcome(&self) -> Option<MutationOutcome> {
        self.lock().outcome.current()
    }

    pub fn find(&self, id: &str) -> Option<E::Item> {
        self.lock()
            .result
            .items
            .iter()
            .find(|item| E::item_id(item) == id)
            .cloned()
    }

    pub fn snapshot(&self) -> ListSnapshot<E::Item> {
        let mut state = self.lock();
        let outcome = state.outcome.current();
        let pagination = PaginationView::new(
            state.query.page(),
            state.result.total_pages,
            self.options.window,
        );

        ListSnapshot {
            query: state.query.clone(),
            items: state.result.items.clone(),
            total_pages: state.result.total_pages,
            loaded: state.loaded,
            outcome,
            loading: state.in_flight > 0,
            mutating: state.mutating,
            pagination,
            message_ttl_secs: state.outcome.ttl().as_secs(),
        }
    }
}

struct InFlightGuard<'a, E: ListEndpoint> {
    controller: &'a ListController<E>,
}

impl<E: ListEndpoint> Drop for InFlightGuard<'_, E> {
    fn drop(&mut self) {
        let mut state = self.controller.lock();
        state.in_flight = state.in_flight.saturating_sub(1);
    }
}

struct MutatingGuard<'a, E: ListEndpoint> {
    controller: &'a ListController<E>,
}

impl<E: ListEndpoint> Drop for MutatingGuard<'_, E> {
    fn drop(&mut self) {
        self.controller.lock().mutating = false;
    }
}
