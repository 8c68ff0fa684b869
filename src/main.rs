use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use timecard::api::server::{start_server, AppState};
use timecard::backend::HttpBackend;
use timecard::cache::RecordCache;
use timecard::config::Config;

/// Browser-facing front end for the time-record backend service.
#[derive(Debug, Parser)]
#[command(name = "timecard", version, about)]
struct Cli {
    /// Path to the JSON config file. Defaults apply when omitted.
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let config = Config::load(cli.config.as_deref()).context("loading configuration")?;
    tracing::info!(
        backend = %config.backend.base_url,
        cache_idle_secs = config.cache.idle_secs,
        cache_max_entries = config.cache.max_entries,
        "Starting timecard"
    );

    let backend = Arc::new(HttpBackend::new(&config.backend));
    let records = Arc::new(RecordCache::new(backend, &config.cache));
    let state = AppState {
        records,
        page_length: config.server.page_length,
    };

    start_server(&config.server, state)
        .await
        .map_err(|e| anyhow::anyhow!("server error: {e}"))
}
