use std::sync::Arc;
use std::time::{Duration, Instant};

use tracing::{info, warn};

use crate::api::{ApiError, Approach, SearchBackend, SearchRequest, SearchResponse};

/// Everything the renderers are allowed to see. Only [`QueryController`] writes it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UiState {
    pub query: String,
    pub approach: Approach,
    pub current_response: Option<SearchResponse>,
    pub loading: bool,
    pub error: Option<String>,
    pub query_time_ms: Option<u64>,
    pub data_ready: bool,
}

impl UiState {
    /// Inputs are disabled while a search is in flight or the backend is still preparing.
    pub fn inputs_locked(&self) -> bool {
        self.loading || !self.data_ready
    }
}

/// A dispatched search waiting for its HTTP call.
#[derive(Debug, Clone)]
pub struct SearchTask {
    pub request: SearchRequest,
    started: Instant,
}

/// Result of a [`SearchTask`], handed back to [`QueryController::apply_search`].
#[derive(Debug)]
pub struct SearchCompletion {
    pub request: SearchRequest,
    pub outcome: Result<SearchResponse, ApiError>,
    pub elapsed: Duration,
}

impl SearchTask {
    pub async fn run<B: SearchBackend + ?Sized>(self, backend: &B) -> SearchCompletion {
        let outcome = backend.search(&self.request).await;
        SearchCompletion {
            request: self.request,
            outcome,
            elapsed: self.started.elapsed(),
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct ReadinessTask;

impl ReadinessTask {
    pub async fn run<B: SearchBackend + ?Sized>(self, backend: &B) -> Result<String, ApiError> {
        backend.load_data().await
    }
}

/// Owns [`UiState`] and mediates every backend call.
///
/// State transitions happen in two synchronous steps around each call:
/// `dispatch_*` applies the "request started" transition and hands back a
/// task, `apply_*` folds the task's completion into the state. The async
/// helpers chain both for callers that can simply await.
pub struct QueryController<B: ?Sized> {
    backend: Arc<B>,
    state: UiState,
    last_request: Option<SearchRequest>,
}

impl<B: SearchBackend + ?Sized> QueryController<B> {
    pub fn new(backend: Arc<B>) -> QueryController<B> {
        QueryController {
            backend,
            state: UiState::default(),
            last_request: None,
        }
    }

    pub fn state(&self) -> &UiState {
        &self.state
    }

    pub fn backend(&self) -> Arc<B> {
        self.backend.clone()
    }

    /// Request of the most recent dispatched search, if any.
    pub fn last_request(&self) -> Option<&SearchRequest> {
        self.last_request.as_ref()
    }

    pub fn set_query(&mut self, query: String) {
        self.state.query = query;
    }

    pub fn set_approach(&mut self, approach: Approach) {
        self.state.approach = approach;
    }

    pub fn dispatch_readiness(&mut self) -> ReadinessTask {
        self.state.data_ready = false;
        ReadinessTask
    }

    pub fn apply_readiness(&mut self, outcome: Result<String, ApiError>) {
        match outcome {
            Ok(message) => info!("backend ready: {message}"),
            Err(e) => {
                warn!("readiness call failed: {:#}", e);
                self.state.error = Some(e.user_message());
            }
        }
        self.state.data_ready = true;
    }

    /// Starts a search unless the query is blank or another one is in flight.
    pub fn dispatch_search(
        &mut self,
        query: &str,
        approach: Approach,
        page: u32,
    ) -> Option<SearchTask> {
        if self.state.loading {
            return None;
        }
        let request = SearchRequest::new(query, approach, page)?;

        info!(
            "searching `{}` with {} (page {})",
            request.query, request.approach, request.page
        );
        self.state.loading = true;
        self.state.error = None;
        self.state.query_time_ms = None;
        self.last_request = Some(request.clone());

        Some(SearchTask {
            request,
            started: Instant::now(),
        })
    }

    /// Re-runs the last search on another page. Does nothing before the first
    /// successful search.
    pub fn dispatch_page(&mut self, page: u32) -> Option<SearchTask> {
        self.state.current_response.as_ref()?;
        let last = self.last_request.clone()?;
        self.dispatch_search(&last.query, last.approach, page)
    }

    pub fn dispatch_submit(&mut self) -> Option<SearchTask> {
        let query = self.state.query.clone();
        self.dispatch_search(&query, self.state.approach, 1)
    }

    pub fn apply_search(&mut self, completion: SearchCompletion) {
        let SearchCompletion {
            request,
            outcome,
            elapsed,
        } = completion;

        match outcome {
            Ok(response) => {
                let measured = elapsed.as_secs_f64() * 1000.0;
                let ms = response.processing_time_ms.unwrap_or(measured);
                info!(
                    "`{}` page {}: {} results in {ms:.0} ms",
                    request.query, response.page, response.total
                );
                self.state.query_time_ms = Some(ms.round() as u64);
                self.state.current_response = Some(response);
                self.state.error = None;
            }
            Err(e) => {
                warn!("search `{}` failed: {:#}", request.query, e);
                self.state.error = Some(e.user_message());
                self.state.current_response = None;
                self.state.query_time_ms = None;
            }
        }
        self.state.loading = false;
    }

    pub async fn initialize(&mut self) {
        let task = self.dispatch_readiness();
        let backend = self.backend.clone();
        let outcome = task.run(&*backend).await;
        self.apply_readiness(outcome);
    }

    pub async fn submit_search(&mut self, query: &str, approach: Approach, page: u32) {
        if let Some(task) = self.dispatch_search(query, approach, page) {
            self.run_search(task).await;
        }
    }

    pub async fn change_page(&mut self, page: u32) {
        if let Some(task) = self.dispatch_page(page) {
            self.run_search(task).await;
        }
    }

    async fn run_search(&mut self, task: SearchTask) {
        let backend = self.backend.clone();
        let completion = task.run(&*backend).await;
        self.apply_search(completion);
    }
}
