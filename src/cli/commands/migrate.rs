use anyhow::Context;
use clap::Subcommand;
use serde_json::json;

use crate::cli::utils::output_success;
use crate::cli::OutputFormat;
use crate::config;
use crate::database::migrations::Migrator;
use crate::database::DatabaseManager;

#[derive(Subcommand, Debug)]
pub enum MigrateCommands {
    #[command(about = "Apply all pending revisions")]
    Up,

    #[command(about = "Revert the most recent revision")]
    Down,

    #[command(about = "Show current and pending revisions")]
    Status,
}

pub async fn handle(cmd: MigrateCommands, output_format: OutputFormat) -> anyhow::Result<()> {
    let pool = DatabaseManager::connect(&config::config().database)
        .await
        .context("failed to connect to database")?;
    let migrator = Migrator::new(pool.clone());

    let result = match cmd {
        MigrateCommands::Up => {
            let applied = migrator.upgrade().await?;
            let message = if applied.is_empty() {
                "Schema already up to date".to_string()
            } else {
                format!("Applied {} revision(s)", applied.len())
            };
            output_success(output_format, &message, Some(json!({ "applied": applied })))
        }
        MigrateCommands::Down => match migrator.downgrade().await? {
            Some(revision) => output_success(
                output_format,
                &format!("Reverted revision {}", revision),
                Some(json!({ "reverted": revision })),
            ),
            None => output_success(output_format, "Nothing to revert", None),
        },
        MigrateCommands::Status => {
            let status = migrator.status().await?;
            output_success(
                output_format,
                &format!("Current revision {}", status.current),
                Some(json!({ "current": status.current, "pending": status.pending })),
            )
        }
    };

    pool.close().await;
    result
}
