//! wordtrack-ingest - clipboard vocabulary service
//!
//! Watches clipboard changes posted by the platform agent, extracts words,
//! enriches new ones from the dictionary service and keeps usage counts in
//! `wordtrack.db`. Serves the control API on port 5790 by default.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tokio::signal;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use wordtrack_common::events::EventBus;

use wordtrack_ingest::config::{CliOverrides, ServiceConfig};
use wordtrack_ingest::db::SqliteWordStore;
use wordtrack_ingest::services::FreeDictionaryClient;
use wordtrack_ingest::AppState;

/// Command-line arguments for wordtrack-ingest
#[derive(Parser, Debug)]
#[command(name = "wordtrack-ingest")]
#[command(about = "Clipboard vocabulary ingestion service")]
#[command(version)]
struct Args {
    /// Port to listen on (overrides [server] port)
    #[arg(short, long, env = "WORDTRACK_PORT")]
    port: Option<u16>,

    /// Folder holding wordtrack.db
    #[arg(short, long, env = "WORDTRACK_ROOT_FOLDER")]
    root_folder: Option<PathBuf>,

    /// Config file (default: <config dir>/wordtrack/wordtrack.toml)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Dictionary service base URL
    #[arg(long, env = "WORDTRACK_DICTIONARY_URL")]
    dictionary_url: Option<String>,

    /// Do not start clipboard monitoring at startup
    #[arg(long)]
    no_monitor: bool,
}

impl From<Args> for CliOverrides {
    fn from(args: Args) -> Self {
        CliOverrides {
            config_file: args.config,
            root_folder: args.root_folder,
            port: args.port,
            dictionary_url: args.dictionary_url,
            no_monitor: args.no_monitor,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let config = ServiceConfig::resolve(&args.into());

    // RUST_LOG wins over [logging] level
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| config.log_level.clone().into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!(
        "Starting wordtrack-ingest v{} [{}] built {} ({})",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH"),
        env!("BUILD_TIMESTAMP"),
        env!("BUILD_PROFILE"),
    );
    info!("Root folder: {}", config.root_folder.display());

    config
        .prepare_root_folder()
        .context("Failed to initialize root folder")?;

    info!("Database: {}", config.database_path.display());
    let pool = wordtrack_common::db::init_database(&config.database_path)
        .await
        .context("Failed to open database")?;
    let store = Arc::new(SqliteWordStore::new(pool));

    let dictionary = Arc::new(
        FreeDictionaryClient::new(&config.dictionary)
            .context("Failed to build dictionary client")?,
    );
    info!(
        base_url = %config.dictionary.base_url,
        max_concurrent = config.dictionary.max_concurrent_lookups,
        requests_per_second = config.dictionary.requests_per_second,
        "Dictionary client ready"
    );

    let event_bus = EventBus::new(100);
    let state = AppState::new(store, dictionary, event_bus, config.pipeline.clone());
    let monitor = state.monitor.clone();

    if config.pipeline.monitor_on_startup {
        monitor.start().await;
    } else {
        info!("Clipboard monitoring left off at startup");
    }

    let app = wordtrack_ingest::build_router(state);

    let addr = SocketAddr::from(([127, 0, 0, 1], config.port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;
    info!("Listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    if monitor.stop().await {
        info!("Clipboard monitoring stopped for shutdown");
    }

    info!("Shutdown complete");
    Ok(())
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                warn!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, shutting down");
        },
        _ = terminate => {
            info!("Received terminate signal, shutting down");
        },
    }
}
