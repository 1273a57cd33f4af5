use std::sync::Arc;

use clap::Parser;

use gleaner::api::{Approach, Endpoint};
use gleaner::cli::{self, Cli};
use gleaner::config::Config;
use gleaner::controller::QueryController;

mod common;
use common::{FakeBackend, status_error};

#[cfg(test)]
mod run_once_tests {
    use super::*;

    #[tokio::test]
    async fn test_prints_plain_results() {
        let backend = Arc::new(FakeBackend::with_total(25));
        let mut controller = QueryController::new(backend.clone());
        let mut out = Vec::new();

        let state = cli::run_once(&mut controller, "coffee", Approach::default(), 2, &mut out)
            .await
            .unwrap();

        assert_eq!(backend.load_calls(), 1);
        assert!(cli::error_text(&state).is_none());

        let out = String::from_utf8(out).unwrap();
        assert!(out.starts_with("Found 25 results · 7 ms\n"), "{out}");
        assert!(out.contains("Member 10"));
        assert!(out.contains("Member 19"));
        assert!(!out.contains("Member 20"));
        assert!(out.trim_end().ends_with("« Previous 1 [2] 3 Next »"), "{out}");
    }

    #[tokio::test]
    async fn test_failed_search_prints_nothing() {
        let backend = Arc::new(FakeBackend::failing_with(500, Some("index unavailable")));
        let mut controller = QueryController::new(backend);
        let mut out = Vec::new();

        let state = cli::run_once(&mut controller, "coffee", Approach::default(), 1, &mut out)
            .await
            .unwrap();

        assert!(out.is_empty());
        assert_eq!(cli::error_text(&state).as_deref(), Some("index unavailable"));
    }

    #[tokio::test]
    async fn test_search_runs_after_failed_readiness() {
        let backend = Arc::new(
            FakeBackend::with_total(1)
                .with_load_reply(|| Err(status_error(Endpoint::LoadData, 500, None))),
        );
        let mut controller = QueryController::new(backend.clone());
        let mut out = Vec::new();

        let state = cli::run_once(&mut controller, "coffee", Approach::default(), 1, &mut out)
            .await
            .unwrap();

        assert_eq!(backend.searches().len(), 1);
        assert!(cli::error_text(&state).is_none());
        assert!(String::from_utf8(out).unwrap().starts_with("Found 1 result · 7 ms\n"));
    }
}

#[cfg(test)]
mod args_tests {
    use super::*;

    fn config() -> Config {
        Config {
            api_base_url: "http://localhost:5000".into(),
            log_file: None,
        }
    }

    #[test]
    fn test_defaults() {
        let cli = Cli::try_parse_from(["gleaner"]).unwrap();
        assert!(cli.query.is_none());
        assert_eq!(cli.approach, Approach::TermFrequencyToken);
        assert_eq!(cli.page, 1);
        assert_eq!(cli.api_url(&config()), "http://localhost:5000");
    }

    #[test]
    fn test_overrides() {
        let cli = Cli::try_parse_from([
            "gleaner",
            "--api-url",
            "http://search.internal:8080",
            "--approach",
            "sentence_embedding",
            "--page",
            "3",
            "dinner plans",
        ])
        .unwrap();
        assert_eq!(cli.query.as_deref(), Some("dinner plans"));
        assert_eq!(cli.approach, Approach::SentenceEmbedding);
        assert_eq!(cli.page, 3);
        assert_eq!(cli.api_url(&config()), "http://search.internal:8080");
    }

    #[test]
    fn test_rejects_unknown_approach() {
        assert!(Cli::try_parse_from(["gleaner", "--approach", "bm25"]).is_err());
    }
}
