use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use trivia_api::{config::Settings, db, server::app::run_server, telemetry::init_tracing};

#[derive(Parser)]
#[clap(author, version, about, long_about = None)]
struct Cli {
    /// Configuration file, `configuration.toml` in the working directory is used when omitted
    #[clap(long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();
    let cli = Cli::parse();
    let settings = Settings::load(cli.config.as_deref())?;
    let pool = db::establish_connection(&settings.database)
        .await
        .context("Cannot connect to DB")?;

    tracing::info!("Running db migrations...");
    db::run_migrations(&pool).await?;

    run_server(settings, pool).await
}
