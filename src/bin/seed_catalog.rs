//! Loads a JSON catalog (sections, sub-sections, meals) into the database.
//!
//! Run with: cargo run --bin seed-catalog -- catalog.json

use std::{fs, path::PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;

use pizza_shop::{config, db, models::order_status::seed_states, seed};

#[derive(Debug, Parser)]
#[command(name = "seed-catalog", about = "Import a JSON catalog into the storefront database")]
struct Cli {
    /// Path to the catalog JSON file
    file: PathBuf,

    /// Database URL; defaults to the configured one
    #[arg(long, env = "DATABASE_URL")]
    database_url: Option<String>,

    /// Apply migrations before importing
    #[arg(long)]
    migrate: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut cfg = config::load_config().context("failed to load configuration")?;
    config::init_tracing(cfg.log_level(), cfg.log_json);
    if let Some(url) = cli.database_url {
        cfg.database_url = url;
    }

    let raw = fs::read_to_string(&cli.file)
        .with_context(|| format!("failed to read {}", cli.file.display()))?;
    let catalog: seed::CatalogFile = serde_json::from_str(&raw)
        .with_context(|| format!("{} is not a valid catalog", cli.file.display()))?;

    let pool = db::establish_connection_from_app_config(&cfg).await?;
    if cli.migrate {
        db::run_migrations(&pool).await?;
    }
    seed_states(&pool).await?;

    let report = seed::import_catalog(&pool, &catalog).await?;
    info!(
        "Imported {} sections, {} sub-sections, {} meals",
        report.sections, report.sub_sections, report.meals
    );
    Ok(())
}
