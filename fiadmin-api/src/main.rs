//! fiadmin-api - bibliographic read service
//!
//! Assembles reference documents from the cataloguing database and forwards
//! search requests to the iAHx controller.

use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use fiadmin_api::{build_router, db, AppState};
use fiadmin_common::config::{ConfigOverrides, ServiceConfig};
use tracing::{error, info};

#[derive(Parser, Debug)]
#[command(name = "fiadmin-api")]
#[command(about = "Bibliographic read API and search passthrough")]
#[command(version)]
struct Args {
    /// TOML config file
    #[arg(short, long, env = "FIADMIN_CONFIG")]
    config: Option<PathBuf>,

    /// SQLite database file
    #[arg(short, long, env = "FIADMIN_DATABASE")]
    database: Option<PathBuf>,

    /// Address to listen on, e.g. 127.0.0.1:8000
    #[arg(short, long, env = "FIADMIN_BIND_ADDRESS")]
    bind: Option<String>,

    /// Base URL of the search service
    #[arg(long, env = "FIADMIN_SEARCH_SERVICE_URL")]
    search_service_url: Option<String>,

    /// Public site URL used in attachment links
    #[arg(long, env = "FIADMIN_SITE_BASE_URL")]
    site_base_url: Option<String>,

    /// File holding the version marker of assembled records
    #[arg(long, env = "FIADMIN_VERSION_FILE")]
    version_file: Option<PathBuf>,

    /// Search request timeout in seconds (none by default)
    #[arg(long, env = "FIADMIN_SEARCH_TIMEOUT_SECS")]
    search_timeout_secs: Option<u64>,

    /// Default log level when RUST_LOG is unset
    #[arg(long, env = "FIADMIN_LOG_LEVEL")]
    log_level: Option<String>,
}

impl From<Args> for ConfigOverrides {
    fn from(args: Args) -> Self {
        Self {
            config_file: args.config,
            database_path: args.database,
            bind_address: args.bind,
            search_service_url: args.search_service_url,
            site_base_url: args.site_base_url,
            version_file: args.version_file,
            search_timeout_secs: args.search_timeout_secs,
            log_level: args.log_level,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    // Log level may come from the config file, so resolve before tracing
    // is installed and report the config source afterwards
    let config = ServiceConfig::resolve(args.into())?;

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.log_level)),
        )
        .init();

    // Build identification first, before any database delays
    info!(
        "Starting fiadmin-api v{} [{}] built {} ({})",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH"),
        env!("BUILD_TIMESTAMP"),
        env!("BUILD_PROFILE")
    );

    match &config.config_file {
        Some(path) => info!("Loaded config file: {}", path.display()),
        None => info!("No config file found, using defaults"),
    }
    info!("Database path: {}", config.database_path.display());
    info!("Search service: {}", config.search_service_url);
    info!("Version file: {}", config.version_file.display());
    match config.search_timeout_secs {
        Some(secs) => info!("Search timeout: {}s", secs),
        None => info!("Search timeout: none"),
    }

    let pool = match db::connect_readonly(&config.database_path).await {
        Ok(pool) => {
            info!("✓ Connected to database (read-only)");
            pool
        }
        Err(e) => {
            error!("Failed to connect to database: {}", e);
            return Err(e);
        }
    };

    let bind_address = config.bind_address.clone();
    let state = AppState::new(pool, config)?;
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(&bind_address).await?;
    info!("fiadmin-api listening on http://{}", bind_address);
    info!("Health check: http://{}/health", bind_address);

    axum::serve(listener, app).await?;

    Ok(())
}
