use anyhow::{bail, Context};
use clap::Args;
use tokio::net::TcpListener;
use tracing::info;

use crate::app::{app, AppState};
use crate::config;
use crate::database::migrations::Migrator;
use crate::database::{DatabaseManager, InMemoryFarmStore, PgFarmStore};

#[derive(Args, Debug)]
pub struct ServeArgs {
    #[arg(long, help = "Port to listen on (overrides FARM_API_PORT)")]
    pub port: Option<u16>,

    #[arg(long, help = "Keep farms in process memory instead of PostgreSQL")]
    pub in_memory: bool,

    #[arg(long, help = "Apply pending migrations before accepting requests")]
    pub migrate: bool,
}

pub async fn handle(args: ServeArgs) -> anyhow::Result<()> {
    let config = config::config();
    info!("Starting Farm API in {:?} mode", config.environment);

    let secret = config.security.jwt_secret.clone();
    if secret.is_empty() {
        bail!("JWT_SECRET must be set outside development");
    }
    if args.in_memory && crate::is_production!() {
        bail!("--in-memory is not available in production");
    }

    let (state, pool) = if args.in_memory {
        info!("Using in-memory farm store; data is lost on exit");
        (AppState::new(InMemoryFarmStore::new(), secret), None)
    } else {
        let pg = DatabaseManager::connect(&config.database)
            .await
            .context("failed to connect to database")?;
        if args.migrate {
            let applied = Migrator::new(pg.clone()).upgrade().await?;
            info!("Applied {} migration(s) at startup", applied.len());
        }
        (AppState::new(PgFarmStore::new(pg.clone()), secret), Some(pg))
    };

    let port = args.port.unwrap_or(config.server.port);
    let bind_addr = format!("{}:{}", config.server.host, port);
    let listener = TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", bind_addr))?;

    info!("Farm API listening on http://{}", bind_addr);

    axum::serve(listener, app(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    if let Some(pool) = pool {
        pool.close().await;
        info!("Closed database pool");
    }
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
