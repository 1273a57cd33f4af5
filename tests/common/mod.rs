#![allow(dead_code)]

use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use reqwest::StatusCode;

use gleaner::api::{
    ApiError, Endpoint, SearchBackend, SearchRequest, SearchResponse, SearchResultItem,
};

type SearchReply = Box<dyn Fn(&SearchRequest) -> Result<SearchResponse, ApiError> + Send + Sync>;
type LoadReply = Box<dyn Fn() -> Result<String, ApiError> + Send + Sync>;

/// In-memory backend that records every search request it receives.
pub struct FakeBackend {
    searches: Mutex<Vec<SearchRequest>>,
    loads: AtomicUsize,
    search_reply: SearchReply,
    load_reply: LoadReply,
}

impl FakeBackend {
    pub fn new<F>(search_reply: F) -> FakeBackend
    where
        F: Fn(&SearchRequest) -> Result<SearchResponse, ApiError> + Send + Sync + 'static,
    {
        FakeBackend {
            searches: Mutex::new(Vec::new()),
            loads: AtomicUsize::new(0),
            search_reply: Box::new(search_reply),
            load_reply: Box::new(|| Ok("Successfully loaded 3349 messages".to_string())),
        }
    }

    /// Answers every search with `total` hits spread over pages of ten.
    pub fn with_total(total: u64) -> FakeBackend {
        FakeBackend::new(move |req| Ok(page_response(req, total)))
    }

    pub fn failing_with(status: u16, message: Option<&str>) -> FakeBackend {
        let message = message.map(str::to_string);
        FakeBackend::new(move |_| Err(status_error(Endpoint::Search, status, message.clone())))
    }

    pub fn with_load_reply<F>(mut self, load_reply: F) -> FakeBackend
    where
        F: Fn() -> Result<String, ApiError> + Send + Sync + 'static,
    {
        self.load_reply = Box::new(load_reply);
        self
    }

    pub fn searches(&self) -> Vec<SearchRequest> {
        self.searches.lock().unwrap().clone()
    }

    pub fn load_calls(&self) -> usize {
        self.loads.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SearchBackend for FakeBackend {
    async fn load_data(&self) -> Result<String, ApiError> {
        self.loads.fetch_add(1, Ordering::SeqCst);
        (self.load_reply)()
    }

    async fn search(&self, request: &SearchRequest) -> Result<SearchResponse, ApiError> {
        self.searches.lock().unwrap().push(request.clone());
        (self.search_reply)(request)
    }
}

pub fn status_error(endpoint: Endpoint, status: u16, message: Option<String>) -> ApiError {
    ApiError::Status {
        endpoint,
        status: StatusCode::from_u16(status).unwrap(),
        message,
    }
}

pub fn item(n: u64) -> SearchResultItem {
    SearchResultItem {
        id: format!("msg-{n}"),
        user_id: format!("user-{}", n % 7),
        user_name: format!("Member {n}"),
        timestamp: "2025-05-05T07:47:20.159073+00:00".to_string(),
        message: format!("Please book a table for {n} at the usual place."),
    }
}

/// A well-formed response for `req` as if the backend held `total` hits.
pub fn page_response(req: &SearchRequest, total: u64) -> SearchResponse {
    let per_page = u64::from(req.per_page);
    let total_pages = total.div_ceil(per_page) as u32;
    let start = u64::from(req.page - 1) * per_page;
    let end = (start + per_page).min(total);
    SearchResponse {
        status: "success".to_string(),
        query: req.query.clone(),
        approach: req.approach.as_str().to_string(),
        total,
        items: (start..end).map(item).collect(),
        page: req.page,
        per_page: req.per_page,
        total_pages,
        processing_time_ms: Some(7.0),
    }
}
