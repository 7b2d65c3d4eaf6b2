use clap::Args;
use serde_json::json;

use crate::auth::{generate_jwt, Claims};
use crate::cli::utils::output_success;
use crate::cli::OutputFormat;
use crate::config;

#[derive(Args, Debug)]
pub struct TokenArgs {
    #[arg(long, help = "User id to embed in the token")]
    pub user_id: i32,

    #[arg(long, help = "Grant superuser rights")]
    pub superuser: bool,

    #[arg(long, help = "Lifetime in hours (defaults to SECURITY_JWT_EXPIRY_HOURS)")]
    pub hours: Option<u64>,
}

pub fn handle(args: TokenArgs, output_format: OutputFormat) -> anyhow::Result<()> {
    let security = &config::config().security;
    let hours = args.hours.unwrap_or(security.jwt_expiry_hours);

    let claims = Claims::new(args.user_id, args.superuser, hours)?;
    let token = generate_jwt(&claims, &security.jwt_secret)?;

    output_success(
        output_format,
        &format!("Token issued for user {}", args.user_id),
        Some(json!({
            "token": token,
            "superuser": args.superuser,
            "expires_at": claims.exp,
        })),
    )
}
