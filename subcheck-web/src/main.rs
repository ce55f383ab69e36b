use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use subcheck_core::AppConfig;
use subcheck_web::{AppState, DEFAULT_LOG_FILTER, app};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about = "Submission checker web server", long_about = None)]
struct Cli {
    /// TOML config file (falls back to SUBCHECK_CONFIG)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Listen address, e.g. 0.0.0.0:5000
    #[arg(long)]
    bind: Option<String>,

    /// External requirements table (TOML)
    #[arg(long)]
    requirements: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let cli = Cli::parse();
    let mut config = AppConfig::load(cli.config.as_deref())?;
    if let Some(bind) = cli.bind {
        config.bind = bind;
    }
    if let Some(req) = cli.requirements {
        config.requirements_path = Some(req);
    }
    if !config.search.is_configured() {
        tracing::warn!("search credentials not configured; plagiarism scanning is disabled");
    }

    let bind = config.bind.clone();
    let state = Arc::new(AppState::from_config(config)?);
    let purged = state.workspace.purge_stale();
    tracing::info!(
        domains = state.table.len(),
        purged,
        "starting on http://{bind}"
    );

    let listener = tokio::net::TcpListener::bind(&bind).await?;
    axum::serve(listener, app(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("failed to install Ctrl+C handler: {e}");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutting down");
}
