use async_trait::async_trait;
use serde::Serialize;
use serde::de::DeserializeOwned;

pub mod error;
pub mod models;

pub use error::{ApiError, Endpoint};
pub use models::{
    Approach, ErrorBody, PER_PAGE, ReadinessResponse, SearchRequest, SearchResponse,
    SearchResultItem,
};

/// The two calls the UI makes against the search service.
#[async_trait]
pub trait SearchBackend: Send + Sync {
    /// Asks the backend to prepare its index. Returns the backend's status message.
    async fn load_data(&self) -> Result<String, ApiError>;

    async fn search(&self, request: &SearchRequest) -> Result<SearchResponse, ApiError>;
}

/// [`SearchBackend`] over HTTP.
#[derive(Debug, Clone)]
pub struct HttpBackend {
    client: reqwest::Client,
    base_url: String,
}

impl HttpBackend {
    pub fn new(base_url: &str) -> HttpBackend {
        HttpBackend {
            client: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn get_json<T, Q>(&self, endpoint: Endpoint, path: &str, query: &Q) -> Result<T, ApiError>
    where
        T: DeserializeOwned,
        Q: Serialize + ?Sized,
    {
        let url = format!("{}{}", self.base_url, path);
        tracing::debug!("GET {url}");

        let transport = |source| ApiError::Transport {
            base_url: self.base_url.clone(),
            source,
        };
        let res = self
            .client
            .get(&url)
            .query(query)
            .send()
            .await
            .map_err(transport)?;
        let status = res.status();
        let body = res.bytes().await.map_err(transport)?;

        if !status.is_success() {
            let message = serde_json::from_slice::<ErrorBody>(&body)
                .ok()
                .and_then(ErrorBody::into_message);
            return Err(ApiError::Status {
                endpoint,
                status,
                message,
            });
        }

        serde_json::from_slice(&body).map_err(|e| ApiError::Malformed(e.to_string()))
    }
}

#[async_trait]
impl SearchBackend for HttpBackend {
    async fn load_data(&self) -> Result<String, ApiError> {
        let res: ReadinessResponse = self
            .get_json(Endpoint::LoadData, "/load_data", &[] as &[(&str, &str)])
            .await?;
        Ok(res.message)
    }

    async fn search(&self, request: &SearchRequest) -> Result<SearchResponse, ApiError> {
        let res: SearchResponse = self
            .get_json(Endpoint::Search, "/search", &request.query_pairs())
            .await?;
        res.validate().map_err(ApiError::Malformed)?;
        Ok(res)
    }
}
