//! evently CLI - run and inspect the evently backend
//!
//! - `evently serve` runs the HTTP server (configuration from the
//!   environment, `.env` honored)
//! - `evently routes` prints the route gate's classification table

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use clap::{Parser, Subcommand};
use evently_core::identity::JwtIdentityProvider;
use evently_core::AppConfig;
use evently_server::db::ConnectionCache;
use evently_server::gate::RouteGate;
use evently_server::{serve, AppState, ServerConfig};

mod tracing_setup;

#[derive(Parser, Debug)]
#[command(
    name = "evently",
    author,
    version,
    about = "Backend for the evently ticketing app"
)]
struct Cli {
    /// Enable debug logging
    #[arg(long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the HTTP server
    Serve(ServeArgs),
    /// Print the route gate's classification table
    Routes,
}

#[derive(Parser, Debug)]
struct ServeArgs {
    /// Bind address (overrides EVENTLY_BIND_ADDR)
    #[arg(long)]
    bind: Option<SocketAddr>,

    /// Allow any CORS origin (overrides EVENTLY_CORS_PERMISSIVE)
    #[arg(long)]
    cors_permissive: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    tracing_setup::init(cli.debug)?;

    match cli.command {
        Command::Serve(args) => run_serve(args).await,
        Command::Routes => run_routes(),
    }
}

async fn run_serve(args: ServeArgs) -> Result<()> {
    let config = AppConfig::from_env()?;

    let state = AppState::new(
        ConnectionCache::postgres(config.database_url.clone()),
        Arc::new(JwtIdentityProvider::new(
            &config.jwt_secret,
            &config.jwt_issuer,
        )),
        RouteGate::standard(),
        config.webhook_secret.clone(),
    );

    let server_config = ServerConfig {
        bind_addr: args.bind.unwrap_or(config.bind_addr),
        cors_permissive: args.cors_permissive || config.cors_permissive,
    };

    tracing::info!(version = env!("CARGO_PKG_VERSION"), "starting evently");
    serve(server_config, state).await?;
    Ok(())
}

fn run_routes() -> Result<()> {
    let gate = RouteGate::standard();
    println!("public routes:");
    for pattern in gate.patterns() {
        println!("  {pattern}");
    }
    println!("\neverything else requires a session token.");
    Ok(())
}
