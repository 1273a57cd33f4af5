use std::io::Write;

use anyhow::Result;
use clap::Parser;

use crate::api::{Approach, SearchBackend};
use crate::config::Config;
use crate::controller::{QueryController, UiState};
use crate::ui::results::{ResultRenderer, escape_controls};

#[derive(Debug, Parser)]
#[command(name = "gleaner", version, about = "Search messages from the terminal")]
pub struct Cli {
    /// Run a single search and print the results instead of opening the UI.
    pub query: Option<String>,

    /// Base URL of the search backend (overrides SEARCH_API_URL).
    #[arg(long)]
    pub api_url: Option<String>,

    #[arg(long, default_value = "term_frequency_token")]
    pub approach: Approach,

    /// Page to fetch in one-shot mode.
    #[arg(long, default_value_t = 1)]
    pub page: u32,

    /// Log at debug level.
    #[arg(short, long)]
    pub verbose: bool,
}

impl Cli {
    pub fn api_url(&self, config: &Config) -> String {
        self.api_url
            .clone()
            .unwrap_or_else(|| config.api_base_url.clone())
    }
}

/// Readiness call, one search, then the plain rendering. Returns the final
/// state so the caller can pick an exit code.
pub async fn run_once<B>(
    controller: &mut QueryController<B>,
    query: &str,
    approach: Approach,
    page: u32,
    out: &mut impl Write,
) -> Result<UiState>
where
    B: SearchBackend + ?Sized,
{
    controller.initialize().await;
    if let Some(error) = &controller.state().error {
        tracing::warn!("continuing after failed readiness call: {error}");
    }

    controller.submit_search(query, approach, page).await;

    let state = controller.state();
    if let Some(response) = &state.current_response {
        write!(
            out,
            "{}",
            ResultRenderer::new(response, state.query_time_ms).render_plain()
        )?;
    }
    Ok(state.clone())
}

/// Text for stderr when a one-shot search ends without results.
pub fn error_text(state: &UiState) -> Option<String> {
    state.error.as_deref().map(escape_controls)
}
