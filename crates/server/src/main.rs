//! ffwrapped-mcp server entry point.
//!
//! Boots the MCP server on stdio transport.
//! Logging goes to stderr to avoid interfering with the JSON-RPC protocol on stdout.

use anyhow::{Context, Result};
use ffwrapped_client::{SeasonRange, WrappedApi};
use ffwrapped_core::AppConfig;
use rmcp::service::serve_server;
use rmcp::transport::io::stdio;
use tracing_subscriber::EnvFilter;

mod error;
mod handler;
mod tools;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .json()
        .init();

    let config = AppConfig::load().context("loading configuration")?;
    tracing::info!(
        api_base_url = %config.api_base_url,
        persistent = config.store_path.is_some(),
        coalesce = config.coalesce_in_flight,
        "Starting ffwrapped-mcp server on stdio transport"
    );

    let api = WrappedApi::from_config(&config).await.context("building Wrapped API client")?;
    let handler = handler::WrappedServer::new(api, SeasonRange::from_config(&config));

    let server = serve_server(handler, stdio()).await?;
    server.waiting().await?;

    Ok(())
}
