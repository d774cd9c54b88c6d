// Standalone MCP server binary

use anyhow::{Context, Result};
use clap::Parser;
use kuaidi100_mcp::server::McpServer;
use kuaidi100_mcp::tools::{register_kuaidi100_tools, ToolRegistry};
use kuaidi100_sdk::{ApiKey, ClientConfig, Kuaidi100Client, API_KEY_ENV, DEFAULT_BASE_URL};
use std::sync::Arc;

#[derive(Parser, Debug)]
#[command(name = "kuaidi100-mcp")]
#[command(about = "MCP server for Kuaidi100 parcel tracking and delivery estimates", long_about = None)]
struct Args {
    /// Kuaidi100 API base URL
    #[arg(long, env = "KUAIDI100_API_BASE_URL", default_value = DEFAULT_BASE_URL)]
    base_url: String,

    /// Emit logs as JSON
    #[arg(long)]
    log_json: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    // A missing .env file is fine
    let _ = dotenvy::dotenv();

    let args = Args::parse();
    init_tracing(args.log_json);

    // Exit before any tool is registered when the key is absent
    let api_key = match std::env::var(API_KEY_ENV).ok().map(ApiKey::new) {
        Some(Ok(key)) => key,
        Some(Err(e)) => {
            tracing::error!(error = %e, "{} is invalid", API_KEY_ENV);
            std::process::exit(1);
        }
        None => {
            tracing::error!("{} environment variable is not set", API_KEY_ENV);
            std::process::exit(1);
        }
    };

    let config = ClientConfig {
        base_url: kuaidi100_sdk::config::parse_base_url(&args.base_url)
            .context("Invalid API base URL")?,
        ..ClientConfig::new(api_key).context("Failed to build client configuration")?
    };
    tracing::info!(base_url = %config.base_url, "Kuaidi100 MCP server starting...");

    let client = Arc::new(Kuaidi100Client::from_config(config).context("Failed to create HTTP client")?);

    let mut registry = ToolRegistry::new();
    register_kuaidi100_tools(&mut registry, client);
    tracing::info!("Registered {} tools", registry.len());

    // Start MCP server
    let server = McpServer::new(registry);
    if let Err(e) = server.start().await {
        tracing::error!(error = ?e, "Server error");
        std::process::exit(1);
    }

    Ok(())
}

fn init_tracing(json: bool) {
    // stdout carries the protocol, so logs go to stderr
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "info".into());

    if json {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .with_target(false)
            .with_ansi(false)
            .init();
    }
}
