//! lingua-api - Main entry point
//!
//! Jargon detection and rewrite service backed by a text-generation model,
//! with per-session glossary and preference storage in SQLite.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use lingua_common::config::{resolve_config_path, TomlConfig};
use tokio::signal;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use lingua_api::config::{resolve_model_config, GlossaryLimits};
use lingua_api::db::{self, SqliteDocumentStore};
use lingua_api::model::create_gateway;
use lingua_api::pipeline::PipelineSettings;
use lingua_api::{build_router, AppState, RouterOptions};

const DEFAULT_LOG_FILTER: &str = "lingua_api=info,tower_http=info";

/// Command-line arguments for lingua-api
#[derive(Parser, Debug)]
#[command(name = "lingua-api")]
#[command(about = "Jargon detection and rewrite service")]
#[command(version)]
struct Args {
    /// Path to TOML config file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Address to bind (overrides [server].host)
    #[arg(long, env = "LINGUA_HOST")]
    host: Option<String>,

    /// Port to listen on (overrides [server].port)
    #[arg(short, long, env = "LINGUA_PORT")]
    port: Option<u16>,

    /// SQLite database file (overrides [storage].database_path)
    #[arg(short, long, env = "LINGUA_DATABASE")]
    database: Option<PathBuf>,

    /// Keep session documents in memory only
    #[arg(long, conflicts_with = "database")]
    in_memory: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Config is read before tracing so that [logging].level can seed the filter
    let config_path = resolve_config_path(args.config.as_deref()).context("Failed to resolve config path")?;
    let config = match &config_path {
        Some(path) => TomlConfig::load(path).with_context(|| format!("Failed to load config {}", path.display()))?,
        None => TomlConfig::default(),
    };

    // Initialize tracing
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .or_else(|_| {
            tracing_subscriber::EnvFilter::try_new(config.logging.level.as_deref().unwrap_or(DEFAULT_LOG_FILTER))
        })
        .unwrap_or_else(|_| DEFAULT_LOG_FILTER.into());
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!(
        "Starting lingua-api v{} [{}] built {} ({})",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH"),
        env!("BUILD_TIMESTAMP"),
        env!("BUILD_PROFILE")
    );
    match &config_path {
        Some(path) => info!("Config file: {}", path.display()),
        None => warn!("No config file found, using built-in defaults"),
    }

    // Storage
    let pool = if args.in_memory {
        warn!("Using in-memory storage; session documents will not survive restart");
        db::init_memory_pool().await?
    } else {
        let db_path = args.database.clone().unwrap_or_else(|| config.database_path());
        info!("Database: {}", db_path.display());
        db::init_database_pool(&db_path).await?
    };
    let store = Arc::new(SqliteDocumentStore::new(pool));

    // Model provider
    let model_config = resolve_model_config(&config.model).context("Model configuration incomplete")?;
    info!(
        provider = %model_config.provider,
        model = %model_config.model,
        timeout_secs = model_config.timeout.as_secs(),
        "Model gateway configured"
    );
    let gateway = create_gateway(&model_config).context("Failed to create model gateway")?;

    let settings = PipelineSettings {
        model_timeout: model_config.timeout,
        glossary_limits: GlossaryLimits::from(config.limits.clone()),
    };
    let options = RouterOptions::from(&config.server);
    if options.expose_session_routes {
        info!("Session document routes mounted under /sessions/:session_id");
    }

    let app = build_router(AppState::new(store, gateway, settings, options));

    let host = args.host.unwrap_or_else(|| config.server.host.clone());
    let port = args.port.unwrap_or(config.server.port);
    let addr: SocketAddr = format!("{}:{}", host, port)
        .parse()
        .with_context(|| format!("Invalid listen address {}:{}", host, port))?;

    info!("Starting HTTP server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .context("Failed to bind to address")?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server shutdown complete");
    Ok(())
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                error!("Failed to install terminate handler: {}", e);
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
