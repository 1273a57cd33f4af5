use std::process::ExitCode;
use std::sync::Arc;

use anyhow::bail;
use clap::Parser;
use gleaner::api::HttpBackend;
use gleaner::cli::{self, Cli};
use gleaner::config::CONFIG;
use gleaner::controller::QueryController;
use gleaner::logging::{self, LogTarget};

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();
    let backend = Arc::new(HttpBackend::new(&cli.api_url(&CONFIG)));

    let Some(query) = cli.query.as_deref() else {
        let target = match CONFIG.log_file.as_deref() {
            Some(path) => LogTarget::File(path),
            None => LogTarget::Discard,
        };
        logging::init(target, cli.verbose)?;
        tracing::info!("starting ui against {}", backend.base_url());

        gleaner::ui::run(backend).await?;
        return Ok(ExitCode::SUCCESS);
    };

    logging::init(LogTarget::Stderr, cli.verbose)?;
    if query.trim().is_empty() {
        bail!("query must not be blank");
    }

    let mut controller = QueryController::new(backend);
    let mut stdout = std::io::stdout().lock();
    let state = cli::run_once(&mut controller, query, cli.approach, cli.page, &mut stdout).await?;

    match cli::error_text(&state) {
        Some(error) => {
            eprintln!("error: {error}");
            Ok(ExitCode::FAILURE)
        }
        None => Ok(ExitCode::SUCCESS),
    }
}
