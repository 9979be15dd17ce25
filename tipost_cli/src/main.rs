mod cli;
mod render;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use tipost_core::app::{AppOptions, TiPostApp};
use tipost_core::config::{TiPostConfig, TiPostPaths};
use tipost_core::persistence::{MemoryStorage, Persistor};
use tipost_core::telemetry;
use tipost_core::ApiClient;

#[derive(Parser)]
#[command(author, version, about = "TiPost: browse, write and search short posts")]
struct Args {
    /// Base URL of the posts collection (overrides TIPOST_API_BASE_URL)
    #[arg(long)]
    base_url: Option<String>,
    /// Directory holding the persisted post list (overrides TIPOST_DATA_DIR)
    #[arg(long)]
    data_dir: Option<PathBuf>,
    /// Number of posts to load when hydrating (overrides TIPOST_FETCH_LIMIT)
    #[arg(long)]
    limit: Option<usize>,
    /// Fetch from the remote collection even when a persisted list exists
    #[arg(long)]
    refresh: bool,
    /// Keep state in memory only; nothing is read from or written to disk
    #[arg(long)]
    ephemeral: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    telemetry::init_tracing();
    let args = Args::parse();

    let mut config = TiPostConfig::from_env()?;
    if let Some(base_url) = args.base_url {
        config.api_base_url = base_url;
    }
    if let Some(dir) = args.data_dir {
        config.paths = TiPostPaths::from_base_dir(dir);
    }
    if let Some(limit) = args.limit {
        config.fetch_limit = limit;
    }

    let mut app = if args.ephemeral {
        let client = ApiClient::new(config.api_base_url.clone())?;
        let persistor = Persistor::new(Arc::new(MemoryStorage::new()));
        TiPostApp::new(client, persistor, AppOptions::from_config(&config))
    } else {
        TiPostApp::from_config(&config)?
    };
    tracing::info!(
        base_url = %app.client().base_url(),
        data_dir = %config.paths.data_dir.display(),
        restored = app.store().len(),
        "tipost ready"
    );

    if args.refresh || app.store().is_empty() {
        app.hydrate();
    }

    cli::run_cli(app).await
}
