//! tokenctl: issue, inspect, revoke and rotate TokenLock tokens
//!
//! Reads the same configuration as the services embedding TokenLock
//! (optional file plus `TOKENLOCK__*` environment) and talks to the shared
//! Redis flag store. Results are printed to stdout as JSON; logs go to
//! stderr.

mod commands;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tl_shared::{init_tracing, AppConfig};

#[derive(Parser)]
#[command(name = "tokenctl", version, about = "Operate on TokenLock bearer tokens")]
struct Cli {
    /// Configuration file (TOML, YAML or JSON)
    #[arg(long, short, env = "TOKENLOCK_CONFIG", global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Issue a new token
    ///
    /// Prints the signed token and, with cookie lock on, the Set-Cookie
    /// header carrying the cookie secret. Does not contact Redis.
    Issue {
        /// Claim in key=value form; values are parsed as JSON when possible
        #[arg(long = "claim", short = 'c')]
        claims: Vec<String>,

        /// Lifetime in seconds, overriding the configured expiry
        #[arg(long)]
        expires_in: Option<i64>,
    },

    /// Verify a token and show its claims and markers
    Inspect {
        /// Signed token string
        token: String,

        /// Cookie secret issued alongside the token
        #[arg(long)]
        cookie_secret: Option<String>,
    },

    /// Revoke a token id for the configured expiry window
    Revoke {
        /// Token id (`jti`)
        jti: String,
    },

    /// Flag a token id for rotation on next use
    MarkPending {
        /// Token id (`jti`)
        jti: String,
    },

    /// Revoke a live token and issue its successor
    Rotate {
        /// Signed token string
        token: String,

        /// Cookie secret issued alongside the token
        #[arg(long)]
        cookie_secret: Option<String>,

        /// Replacement claims in key=value form instead of carrying the old ones
        #[arg(long = "claim", short = 'c')]
        claims: Vec<String>,
    },

    /// Show the revocation and rotation markers of a token id
    Status {
        /// Token id (`jti`)
        jti: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = AppConfig::load(cli.config.as_deref()).context("Failed to load configuration")?;
    init_tracing(&config.logging);

    let output = match cli.command {
        Command::Issue { claims, expires_in } => commands::issue(&config, &claims, expires_in)?,
        Command::Inspect {
            token,
            cookie_secret,
        } => commands::inspect(&config, &token, cookie_secret).await?,
        Command::Revoke { jti } => commands::revoke(&config, &jti).await?,
        Command::MarkPending { jti } => commands::mark_pending(&config, &jti).await?,
        Command::Rotate {
            token,
            cookie_secret,
            claims,
        } => commands::rotate(&config, &token, cookie_secret, &claims).await?,
        Command::Status { jti } => commands::status(&config, &jti).await?,
    };

    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}
