use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Results per page. The backend accepts other values but the UI never asks for them.
pub const PER_PAGE: u32 = 10;

/// Backend-side ranking algorithm selected by the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Approach {
    #[default]
    TermFrequencyToken,
    SentenceEmbedding,
}

impl Approach {
    pub const ALL: [Approach; 2] = [Approach::TermFrequencyToken, Approach::SentenceEmbedding];

    /// Identifier sent in the `approach` query parameter.
    pub fn as_str(&self) -> &'static str {
        match self {
            Approach::TermFrequencyToken => "term_frequency_token",
            Approach::SentenceEmbedding => "sentence_embedding",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Approach::TermFrequencyToken => "Term Frequency",
            Approach::SentenceEmbedding => "Sentence Embedding",
        }
    }

    /// The approach after this one in selector order, wrapping around.
    pub fn next(&self) -> Approach {
        match self {
            Approach::TermFrequencyToken => Approach::SentenceEmbedding,
            Approach::SentenceEmbedding => Approach::TermFrequencyToken,
        }
    }
}

impl fmt::Display for Approach {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Approach {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Approach::ALL
            .into_iter()
            .find(|approach| approach.as_str() == s)
            .ok_or_else(|| {
                format!(
                    "unknown approach `{s}`, expected one of: term_frequency_token, sentence_embedding"
                )
            })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchRequest {
    pub query: String,
    pub approach: Approach,
    pub page: u32,
    pub per_page: u32,
}

impl SearchRequest {
    /// Returns `None` when the trimmed query is empty. Page 0 is clamped to 1.
    pub fn new(query: &str, approach: Approach, page: u32) -> Option<SearchRequest> {
        let query = query.trim();
        if query.is_empty() {
            return None;
        }
        Some(SearchRequest {
            query: query.to_string(),
            approach,
            page: page.max(1),
            per_page: PER_PAGE,
        })
    }

    /// Query-string pairs for `GET /search`.
    pub fn query_pairs(&self) -> [(&'static str, String); 4] {
        [
            ("q", self.query.clone()),
            ("approach", self.approach.as_str().to_string()),
            ("page", self.page.to_string()),
            ("per_page", self.per_page.to_string()),
        ]
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResultItem {
    pub id: String,
    pub user_id: String,
    pub user_name: String,
    pub timestamp: String,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResponse {
    pub status: String,
    pub query: String,
    pub approach: String,
    pub total: u64,
    pub items: Vec<SearchResultItem>,
    pub page: u32,
    pub per_page: u32,
    /// Missing from the backend's early-return zero-hit replies.
    #[serde(default)]
    pub total_pages: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub processing_time_ms: Option<f64>,
}

impl SearchResponse {
    /// Checks the invariants serde cannot express. The error string describes
    /// the first violation found.
    pub fn validate(&self) -> Result<(), String> {
        let last_page = self.total_pages.max(1);
        if self.page < 1 || self.page > last_page {
            return Err(format!(
                "page {} outside of 1..={last_page}",
                self.page
            ));
        }
        if let Some(ms) = self.processing_time_ms
            && (!ms.is_finite() || ms < 0.0)
        {
            return Err(format!("invalid processing_time_ms {ms}"));
        }
        let mut seen = HashSet::with_capacity(self.items.len());
        for item in &self.items {
            if !seen.insert(item.id.as_str()) {
                return Err(format!("duplicate item id `{}`", item.id));
            }
        }
        Ok(())
    }
}

/// Body of a successful `GET /load_data`.
#[derive(Debug, Clone, Deserialize)]
pub struct ReadinessResponse {
    #[serde(default)]
    pub message: String,
}

/// Error body shape shared by both endpoints. `/load_data` reports its
/// failure under `error`, `/search` under `message`.
#[derive(Debug, Default, Deserialize)]
pub struct ErrorBody {
    pub message: Option<String>,
    pub error: Option<String>,
}

impl ErrorBody {
    pub fn into_message(self) -> Option<String> {
        self.message
            .or(self.error)
            .map(|m| m.trim().to_string())
            .filter(|m| !m.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn response(page: u32, total_pages: u32) -> SearchResponse {
        SearchResponse {
            status: "success".into(),
            query: "coffee".into(),
            approach: "term_frequency_token".into(),
            total: 0,
            items: Vec::new(),
            page,
            per_page: PER_PAGE,
            total_pages,
            processing_time_ms: None,
        }
    }

    #[test]
    fn test_request_trims_and_rejects_blank() {
        assert!(SearchRequest::new("   ", Approach::default(), 1).is_none());
        assert!(SearchRequest::new("", Approach::default(), 1).is_none());

        let req = SearchRequest::new("  coffee beans \n", Approach::SentenceEmbedding, 0).unwrap();
        assert_eq!(req.query, "coffee beans");
        assert_eq!(req.page, 1);
        assert_eq!(req.per_page, 10);
    }

    #[test]
    fn test_approach_wire_names() {
        assert_eq!(
            "sentence_embedding".parse::<Approach>().unwrap(),
            Approach::SentenceEmbedding
        );
        assert!("bm25".parse::<Approach>().is_err());
        assert_eq!(
            serde_json::to_string(&Approach::TermFrequencyToken).unwrap(),
            "\"term_frequency_token\""
        );
        assert_eq!(Approach::SentenceEmbedding.next(), Approach::TermFrequencyToken);
    }

    #[test]
    fn test_validate_page_bounds() {
        assert!(response(1, 0).validate().is_ok());
        assert!(response(3, 3).validate().is_ok());
        assert!(response(0, 3).validate().is_err());
        assert!(response(4, 3).validate().is_err());
        assert!(response(2, 0).validate().is_err());
    }

    #[test]
    fn test_validate_duplicate_ids() {
        let item = SearchResultItem {
            id: "m-1".into(),
            user_id: "u-1".into(),
            user_name: "Ada".into(),
            timestamp: "2025-01-01T00:00:00Z".into(),
            message: "hi".into(),
        };
        let mut resp = response(1, 1);
        resp.items = vec![item.clone(), item];
        assert!(resp.validate().unwrap_err().contains("m-1"));
    }

    #[test]
    fn test_error_body_prefers_message() {
        let body: ErrorBody =
            serde_json::from_str(r#"{"status":"error","error":"upstream down"}"#).unwrap();
        assert_eq!(body.into_message().as_deref(), Some("upstream down"));

        let body: ErrorBody =
            serde_json::from_str(r#"{"message":"index unavailable","error":"x"}"#).unwrap();
        assert_eq!(body.into_message().as_deref(), Some("index unavailable"));

        let body: ErrorBody = serde_json::from_str(r#"{"message":"  "}"#).unwrap();
        assert_eq!(body.into_message(), None);
    }
}
