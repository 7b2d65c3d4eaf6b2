pub mod commands;
pub mod utils;

use clap::{Parser, Subcommand};
use serde::{Deserialize, Serialize};

#[derive(Parser)]
#[command(name = "farm-api")]
#[command(about = "Farm API - serve the farm resource and manage its schema")]
#[command(version)]
pub struct Cli {
    #[arg(long, global = true, help = "Output in JSON format")]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    #[command(about = "Run the HTTP server")]
    Serve(commands::serve::ServeArgs),

    #[command(about = "Apply, revert or inspect schema migrations")]
    Migrate {
        #[command(subcommand)]
        cmd: commands::migrate::MigrateCommands,
    },

    #[command(about = "Issue a bearer token for local testing")]
    Token(commands::token::TokenArgs),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OutputFormat {
    Text,
    Json,
}

impl OutputFormat {
    pub fn from_cli(cli: &Cli) -> Self {
        if cli.json {
            OutputFormat::Json
        } else {
            OutputFormat::Text
        }
    }
}

pub async fn run(cli: Cli) -> anyhow::Result<()> {
    let output_format = OutputFormat::from_cli(&cli);

    match cli.command {
        Commands::Serve(args) => commands::serve::handle(args).await,
        Commands::Migrate { cmd } => commands::migrate::handle(cmd, output_format).await,
        Commands::Token(args) => commands::token::handle(args, output_format),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_serve_flags() {
        let cli = Cli::try_parse_from(["farm-api", "serve", "--port", "8080", "--in-memory"]).unwrap();
        match cli.command {
            Commands::Serve(args) => {
                assert_eq!(args.port, Some(8080));
                assert!(args.in_memory);
            }
            _ => panic!("expected serve"),
        }
    }

    #[test]
    fn parses_token_with_global_json() {
        let cli = Cli::try_parse_from(["farm-api", "token", "--user-id", "3", "--superuser", "--json"]).unwrap();
        assert_eq!(OutputFormat::from_cli(&cli), OutputFormat::Json);
        match cli.command {
            Commands::Token(args) => {
                assert_eq!(args.user_id, 3);
                assert!(args.superuser);
            }
            _ => panic!("expected token"),
        }
    }

    #[test]
    fn migrate_requires_subcommand() {
        assert!(Cli::try_parse_from(["farm-api", "migrate"]).is_err());
        assert!(Cli::try_parse_from(["farm-api", "migrate", "down"]).is_ok());
    }
}
