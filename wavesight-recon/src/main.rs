//! wavesight-recon - Ledger reconciliation job
//!
//! Recomputes denormalized profile snapshots and submission counters from
//! the append-only ledgers and the vote table. Run periodically (cron) or
//! on demand after incidents.

use anyhow::Result;
use clap::Parser;
use tracing::{error, info};
use wavesight_common::config::{RootFolderInitializer, RootFolderResolver};
use wavesight_common::db::init_database;
use wavesight_common::rewards::RewardsConfig;

#[derive(Parser, Debug)]
#[command(name = "wavesight-recon", version, about = "WaveSight ledger reconciliation")]
struct Args {
    /// Root folder holding the database (overrides WAVESIGHT_ROOT)
    #[arg(long)]
    root_folder: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    info!("Starting WaveSight reconciliation (wavesight-recon) v{}", env!("CARGO_PKG_VERSION"));

    let args = Args::parse();

    let resolver = RootFolderResolver::new("recon").with_cli_arg(args.root_folder);
    let root_folder = resolver.resolve();

    let initializer = RootFolderInitializer::new(root_folder);
    initializer.ensure_directory_exists()?;

    let db_path = initializer.database_path();
    info!("Database path: {}", db_path.display());

    let pool = init_database(&db_path).await?;
    let rewards = RewardsConfig::load(&pool).await?;

    match wavesight_recon::reconcile(&pool, &rewards).await {
        Ok(report) => {
            info!(
                "✓ Reconciliation complete: {} profiles checked, {} earnings / {} xp / {} submissions / {} tiers repaired",
                report.profiles_checked,
                report.earnings_repaired,
                report.xp_repaired,
                report.submissions_repaired,
                report.tiers_changed
            );
            Ok(())
        }
        Err(e) => {
            error!("Reconciliation failed: {}", e);
            Err(e.into())
        }
    }
}
