//! Noughts server binary.

use anyhow::Result;
use clap::Parser;
use noughts_server::{Gateway, SessionRegistry};
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Realtime two-player tic-tac-toe over websockets.
#[derive(Parser, Debug)]
#[command(name = "noughts_server", version, about)]
struct Cli {
    /// Host to bind to
    #[arg(long, default_value = "127.0.0.1")]
    host: String,

    /// Port to bind to
    #[arg(short, long, default_value = "3000")]
    port: u16,

    /// Directory of static client assets
    #[arg(long, default_value = "assets")]
    assets: PathBuf,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,tower_http=info")),
        )
        .init();

    let cli = Cli::parse();

    let registry = SessionRegistry::new();
    let app = noughts_server::router(Gateway::new(registry), cli.assets);

    let addr = format!("{}:{}", cli.host, cli.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!(%addr, "noughts server listening");
    axum::serve(listener, app).await?;

    Ok(())
}
