//! TickTick MCP server library.
//!
//! Exposes the [`server::TickTickMcpServer`] handler, the operations behind its
//! tools and the TickTick client they run against. Used by the `ticktick-mcp`
//! binary and by the protocol tests.

pub mod application;
pub mod domain;
pub mod infrastructure;
pub mod server;

use std::sync::Arc;

use rmcp::ServiceExt;
use tracing_subscriber::EnvFilter;

use infrastructure::config::ClientConfig;
use infrastructure::ticktick_client::DefaultTickTickClient;
use server::TickTickMcpServer;

/// Serves the MCP protocol on stdin/stdout until the peer disconnects.
pub async fn run() -> anyhow::Result<()> {
    // stdout carries the protocol
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env().add_directive("ticktick_mcp=info".parse()?),
        )
        .with_writer(std::io::stderr)
        .init();

    let config = ClientConfig::from_env()?;
    let client = DefaultTickTickClient::from_config(&config)?;
    tracing::info!(
        v2_enabled = config.session_token.is_some(),
        can_refresh = config.can_refresh(),
        "ticktick-mcp starting (stdio transport)"
    );

    let server = TickTickMcpServer::new(Arc::new(client));
    let service = server.serve(rmcp::transport::io::stdio()).await?;
    service.waiting().await?;

    Ok(())
}
