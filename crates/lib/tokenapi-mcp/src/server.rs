//! MCP server runner for tokenapi-mcp.

use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use axum::routing::get;
use rmcp::transport::streamable_http_server::{
    StreamableHttpServerConfig,
    StreamableHttpService,
    session::local::LocalSessionManager,
};
use tokenapi_core::{Catalog, QueryExecutor};
use tokenapi_metrics::ToolMetrics;
use tracing::info;

use crate::{McpOptions, TokenApiMcp};

/// Path the streamable HTTP transport is mounted on.
pub const MCP_PATH: &str = "/mcp";

/// Interval between SSE keep-alive pings on open streams.
pub const SSE_KEEP_ALIVE: Duration = Duration::from_secs(15);
/// Reconnect delay advertised to SSE clients.
pub const SSE_RETRY: Duration = Duration::from_secs(3);

/// Configuration for the MCP streamable HTTP server.
#[derive(Debug, Clone)]
pub struct McpHttpServerConfig {
    pub addr: SocketAddr,
}

impl McpHttpServerConfig {
    #[must_use]
    pub const fn new(addr: SocketAddr) -> Self {
        Self { addr }
    }
}

impl Default for McpHttpServerConfig {
    fn default() -> Self {
        Self::new(SocketAddr::from(([0, 0, 0, 0], 8080)))
    }
}

/// Serves the MCP server over streamable HTTP until `shutdown` resolves.
///
/// Each session gets its own `TokenApiMcp` sharing the catalog and metrics.
///
/// # Errors
/// Returns any listener or server error.
pub async fn serve_streamable_http<E, F>(
    catalog: Arc<Catalog<E>>,
    metrics: Arc<ToolMetrics>,
    options: Arc<McpOptions>,
    config: McpHttpServerConfig,
    shutdown: F,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>>
where
    E: QueryExecutor + 'static,
    F: Future<Output = ()> + Send + 'static,
{
    let service: StreamableHttpService<TokenApiMcp<E>, LocalSessionManager> =
        StreamableHttpService::new(
            move || {
                Ok(TokenApiMcp::with_options(
                    catalog.clone(),
                    metrics.clone(),
                    options.clone(),
                ))
            },
            Arc::new(LocalSessionManager::default()),
            transport_config(),
        );

    let app = Router::new()
        .route("/health", get(|| async { "ok" }))
        .nest_service(MCP_PATH, service);
    let listener = tokio::net::TcpListener::bind(config.addr).await?;

    info!("MCP server listening on http://{}{MCP_PATH}", config.addr);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await?;
    Ok(())
}

/// Stateful sessions with SSE keep-alive.
fn transport_config() -> StreamableHttpServerConfig {
    StreamableHttpServerConfig {
        sse_keep_alive: Some(SSE_KEEP_ALIVE),
        sse_retry: Some(SSE_RETRY),
        stateful_mode: true,
        ..Default::default()
    }
}
