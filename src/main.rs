//! Market API server
//!
//! Serves users, items and deals over JSON HTTP with token authentication.

use anyhow::{Context, Result};
use clap::Parser;
use market_api::{ApiServer, ApiServerConfig};
use market_auth::{Duration, TokenConfig};
use std::net::SocketAddr;
use tracing::info;
use tracing_subscriber::{prelude::*, EnvFilter};

/// Market backend - users, items and deals behind a token-protected API
#[derive(Parser, Debug)]
#[command(name = "market")]
#[command(about = "Run the market API server", long_about = None)]
#[command(version = env!("GIT_TAG"))]
#[command(long_version = concat!(env!("GIT_TAG"), "\nCommit: ", env!("GIT_HASH"), "\nBuilt: ", env!("BUILD_TIME")))]
struct Cli {
    /// Database connection URL (sqlite://market.db?mode=rwc, postgres://...)
    #[arg(long, env = "DATABASE_URL")]
    database_url: String,

    /// Secret used to sign and verify tokens
    #[arg(long, env = "MARKET_JWT_SECRET", hide_env_values = true)]
    jwt_secret: String,

    /// Address to bind the API server
    #[arg(long, env = "MARKET_BIND_ADDR", default_value = "0.0.0.0:8080")]
    bind_addr: SocketAddr,

    /// Access token lifetime in minutes
    #[arg(long, env = "MARKET_ACCESS_TTL_MINUTES", default_value = "15")]
    access_ttl_minutes: i64,

    /// Refresh token lifetime in days
    #[arg(long, env = "MARKET_REFRESH_TTL_DAYS", default_value = "7")]
    refresh_ttl_days: i64,

    /// Log level (trace, debug, info, warn, error); RUST_LOG takes precedence
    #[arg(long, default_value = "info")]
    log_level: String,

    /// Allow CORS requests from localhost origins
    #[arg(long)]
    cors: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(&cli.log_level)?;

    if cli.jwt_secret.is_empty() {
        anyhow::bail!("--jwt-secret must not be empty");
    }
    if cli.access_ttl_minutes <= 0 || cli.refresh_ttl_days <= 0 {
        anyhow::bail!("Token lifetimes must be positive");
    }

    info!("Connecting to database");
    let db = market_db::connect(&cli.database_url)
        .await
        .context("Failed to connect to database")?;

    market_db::migrate(&db)
        .await
        .context("Failed to run database migrations")?;

    let token_config = TokenConfig::new(cli.jwt_secret)
        .with_access_ttl(Duration::minutes(cli.access_ttl_minutes))
        .with_refresh_ttl(Duration::days(cli.refresh_ttl_days));

    let config = ApiServerConfig {
        bind_addr: cli.bind_addr,
        enable_cors: cli.cors,
        token_config,
    };

    let server = ApiServer::new(config, db).context("Invalid token configuration")?;
    server.start().await
}

fn init_logging(log_level: &str) -> Result<()> {
    let filter = EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new(log_level))?;

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_defaults() {
        let cli = Cli::try_parse_from([
            "market",
            "--database-url",
            "sqlite::memory:",
            "--jwt-secret",
            "secret",
        ])
        .unwrap();

        assert_eq!(cli.bind_addr, "0.0.0.0:8080".parse::<SocketAddr>().unwrap());
        assert_eq!(cli.access_ttl_minutes, 15);
        assert_eq!(cli.refresh_ttl_days, 7);
        assert_eq!(cli.log_level, "info");
        assert!(!cli.cors);
    }

    #[test]
    fn test_cli_requires_secret() {
        use clap::{error::ErrorKind, CommandFactory};

        // Detach the env fallback so an exported MARKET_JWT_SECRET cannot satisfy it
        let command = Cli::command().mut_arg("jwt_secret", |arg| arg.env(None::<&'static str>));
        let err = command
            .try_get_matches_from(["market", "--database-url", "sqlite::memory:"])
            .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::MissingRequiredArgument);
    }
}
