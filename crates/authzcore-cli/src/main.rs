//! Authzcore CLI - local experimentation with capabilities and the gateway.
//!
//! A thin wrapper, grounded in `aapi-cli/src/main.rs`'s `clap` derive shape
//! but re-pointed at the authorization core: `grant`, `authorize`,
//! `delegate`, `revoke` operate on capabilities directly (the core holds no
//! on-disk state, so each invocation reconstructs an issuer identity from
//! `--issuer-seed` rather than reading from a database); `serve` launches
//! the gateway HTTP server.

use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;

#[derive(Parser)]
#[command(name = "authzcore")]
#[command(author, version, about = "Authzcore Authorization Core CLI", long_about = None)]
struct Cli {
    /// Output format (json, plain)
    #[arg(short, long, default_value = "plain")]
    format: String,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Grant a fresh root capability
    Grant {
        /// Issuer principal id
        #[arg(short, long)]
        issuer: String,

        /// Subject principal id
        #[arg(short, long)]
        subject: String,

        /// Scope string, e.g. "tool:fs/method:read"
        #[arg(long)]
        scope: String,

        /// Time-to-live in seconds
        #[arg(long, default_value = "3600")]
        expires_in: i64,

        /// Whether the capability may be further delegated
        #[arg(long)]
        delegatable: bool,
    },

    /// Check whether a capability authorizes a (tool, method) pair
    Authorize {
        /// Hex-encoded 32-byte issuer signing seed, printed by `grant`
        #[arg(long)]
        issuer_seed: String,

        /// Issuer principal id (must match the capability's `issuer`)
        #[arg(short, long)]
        issuer: String,

        /// Path to a JSON-encoded capability, or "-" for stdin
        #[arg(short, long)]
        capability: String,

        #[arg(long)]
        tool: String,

        #[arg(long)]
        method: String,
    },

    /// Delegate a narrower child capability from a parent
    Delegate {
        #[arg(long)]
        issuer_seed: String,

        #[arg(short, long)]
        issuer: String,

        /// Path to the parent capability's JSON, or "-" for stdin
        #[arg(short, long)]
        parent: String,

        #[arg(long)]
        new_subject: String,

        #[arg(long)]
        narrowed_scope: String,

        #[arg(long)]
        expires_in: Option<i64>,

        #[arg(long)]
        delegatable: Option<bool>,
    },

    /// Revoke a capability id (effective only for the lifetime of this process)
    Revoke {
        #[arg(long)]
        issuer_seed: String,

        #[arg(short, long)]
        issuer: String,

        #[arg(long)]
        capability_id: String,
    },

    /// Start the gateway HTTP server
    Serve {
        #[arg(short = 'H', long, default_value = "0.0.0.0")]
        host: String,

        #[arg(short, long, default_value = "8080")]
        port: u16,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()))
        .with(tracing_subscriber::fmt::layer())
        .init();

    match cli.command {
        Commands::Grant {
            issuer,
            subject,
            scope,
            expires_in,
            delegatable,
        } => commands::grant::run(issuer, subject, scope, expires_in, delegatable, &cli.format)?,
        Commands::Authorize {
            issuer_seed,
            issuer,
            capability,
            tool,
            method,
        } => commands::authorize::run(issuer_seed, issuer, capability, tool, method, &cli.format)?,
        Commands::Delegate {
            issuer_seed,
            issuer,
            parent,
            new_subject,
            narrowed_scope,
            expires_in,
            delegatable,
        } => commands::delegate::run(
            issuer_seed,
            issuer,
            parent,
            new_subject,
            narrowed_scope,
            expires_in,
            delegatable,
            &cli.format,
        )?,
        Commands::Revoke {
            issuer_seed,
            issuer,
            capability_id,
        } => commands::revoke::run(issuer_seed, issuer, capability_id, &cli.format)?,
        Commands::Serve { host, port } => commands::serve::run(host, port).await?,
    }

    Ok(())
}
