use clap::Parser;
use tracing_subscriber::EnvFilter;

use farm_api::cli::{self, Cli};
use farm_api::config;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present so cargo run picks up DATABASE_URL, JWT_SECRET, etc.
    let _ = dotenvy::dotenv();

    let default_filter = if config::config().api.enable_request_logging {
        "farm_api=debug,tower_http=debug"
    } else {
        "farm_api=info,tower_http=info"
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)),
        )
        .init();

    cli::run(Cli::parse()).await
}
