// Seed Journal - Web Server

use anyhow::{Context, Result};
use clap::Parser;
use seed_journal::api::{router, AppState};
use seed_journal::config::{LogConfig, StoreConfig};
use seed_journal::telemetry::init_tracing;

#[derive(Parser, Debug)]
#[command(name = "seed-journal-server")]
#[command(about = "JSON API for recording seed plantings and germination")]
struct ServerCli {
    /// Address to listen on
    #[arg(long, env = "SEED_JOURNAL_ADDR", default_value = "0.0.0.0:3000")]
    addr: String,

    #[command(flatten)]
    store: StoreConfig,

    #[command(flatten)]
    log: LogConfig,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = ServerCli::parse();
    init_tracing(&cli.log);

    let store = cli.store.open()?;
    let app = router(AppState::new(store));

    let listener = tokio::net::TcpListener::bind(&cli.addr)
        .await
        .with_context(|| format!("failed to bind to {}", cli.addr))?;

    println!("🌱 Seed Journal server running on http://{}", cli.addr);
    println!("   API: http://{}/api/plantings", cli.addr);
    tracing::info!(addr = %cli.addr, "server started");

    axum::serve(listener, app)
        .await
        .context("server stopped unexpectedly")?;

    Ok(())
}
