//! wavesight-api - Trend submission and validation service
//!
//! Authoritative owner of the submission state machine, the earnings and
//! XP ledgers and the session store. Serves the HTTP API on port 5750 by
//! default.

use anyhow::Result;
use clap::Parser;
use std::sync::Arc;
use tracing::{error, info};
use wavesight_api::{build_router, AppState};
use wavesight_common::config::{RootFolderInitializer, RootFolderResolver};
use wavesight_common::db::init_database;
use wavesight_common::events::EventBus;
use wavesight_common::rewards::RewardsConfig;

const DEFAULT_PORT: u16 = 5750;
const EVENT_BUS_CAPACITY: usize = 256;

#[derive(Parser, Debug)]
#[command(name = "wavesight-api", version, about = "WaveSight trend tracking API")]
struct Args {
    /// Root folder holding the database (overrides WAVESIGHT_ROOT)
    #[arg(long)]
    root_folder: Option<String>,

    /// Listen port
    #[arg(long, default_value_t = DEFAULT_PORT)]
    port: u16,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    // Log build identification immediately, before any database delays
    info!("Starting WaveSight API (wavesight-api) v{}", env!("CARGO_PKG_VERSION"));

    let args = Args::parse();

    let resolver = RootFolderResolver::new("api").with_cli_arg(args.root_folder);
    let root_folder = resolver.resolve();

    let initializer = RootFolderInitializer::new(root_folder);
    initializer.ensure_directory_exists()?;

    let db_path = initializer.database_path();
    info!("Database path: {}", db_path.display());

    let pool = match init_database(&db_path).await {
        Ok(pool) => {
            info!("✓ Database initialized");
            pool
        }
        Err(e) => {
            error!("Failed to initialize database: {}", e);
            return Err(e.into());
        }
    };

    let rewards = RewardsConfig::load(&pool).await?;
    let bus = Arc::new(EventBus::new(EVENT_BUS_CAPACITY));

    let state = AppState::new(pool, bus, rewards);
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(("127.0.0.1", args.port)).await?;
    info!("wavesight-api listening on http://127.0.0.1:{}", args.port);
    info!("Health check: http://127.0.0.1:{}/health", args.port);

    axum::serve(listener, app).await?;

    Ok(())
}
