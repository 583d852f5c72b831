//! conid_sync - Main Entry Point
//!
//! Verifies and refreshes broker contract ids in the symbol registry, then
//! reports whether anything changed.

use anyhow::Result;
use clap::Parser;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use conid_sync::config::load_config;
use conid_sync::resolve::ensure_con_ids;

/// CLI arguments for the application
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to configuration file
    #[arg(short, long, default_value = "config.toml")]
    config: String,

    /// Path to the symbol registry document (overrides config)
    #[arg(long)]
    registry: Option<String>,

    /// Gateway host (overrides config)
    #[arg(long)]
    host: Option<String>,

    /// Gateway port (overrides config)
    #[arg(long)]
    port: Option<u16>,

    /// Client identity for the gateway connection (overrides config)
    #[arg(long)]
    client_id: Option<i64>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info")]
    log_level: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Parse command line arguments
    let args = Args::parse();

    // Initialize logging
    let level = match args.log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(true)
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;

    // Load environment variables from .env file if present
    dotenvy::dotenv().ok();

    let mut config = load_config(Some(&args.config))?;
    if let Some(registry) = args.registry {
        config.registry.path = registry;
    }
    if let Some(host) = args.host {
        config.gateway.host = host;
    }
    if let Some(port) = args.port {
        config.gateway.port = port;
    }
    if let Some(client_id) = args.client_id {
        config.gateway.client_id = client_id;
    }

    info!(
        "Syncing {} against {}:{}",
        config.registry.path, config.gateway.host, config.gateway.port
    );

    let changed = ensure_con_ids(&config).await?;
    if changed {
        println!("registry updated: {}", config.registry.path);
    } else {
        println!("no changes");
    }

    Ok(())
}
