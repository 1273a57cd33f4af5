use reqwest::StatusCode;
use thiserror::Error;

/// Which endpoint a failure came from. Only affects the fallback banner text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endpoint {
    LoadData,
    Search,
}

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("failed to reach search backend at {base_url}: {source}")]
    Transport {
        base_url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("{endpoint:?} returned HTTP {status}")]
    Status {
        endpoint: Endpoint,
        status: StatusCode,
        message: Option<String>,
    },

    #[error("malformed response body: {0}")]
    Malformed(String),
}

impl ApiError {
    /// Text shown in the error banner.
    pub fn user_message(&self) -> String {
        match self {
            ApiError::Transport { base_url, source } => {
                format!("Failed to reach search backend at {base_url}: {source}")
            }
            ApiError::Status {
                message: Some(message),
                ..
            } => message.clone(),
            ApiError::Status {
                endpoint,
                status,
                message: None,
            } => match endpoint {
                Endpoint::LoadData => {
                    format!("HTTP {}: Failed to load data", status.as_u16())
                }
                Endpoint::Search => format!("HTTP {}: Search failed", status.as_u16()),
            },
            ApiError::Malformed(reason) => {
                format!("Search backend sent an unexpected response: {reason}")
            }
        }
    }
}
