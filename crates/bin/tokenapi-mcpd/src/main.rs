//! Daemon entry point for the Token API MCP server.
//!
//! Loads configuration from the environment, connects the catalog to
//! ClickHouse, and serves MCP over streamable HTTP next to a Prometheus
//! metrics listener.

mod config;
mod logging;
mod shutdown;

use std::sync::Arc;

use tokenapi_core::{Catalog, ClickHouseClient};
use tokenapi_mcp::McpOptions;
use tokenapi_mcp::server::{McpHttpServerConfig, serve_streamable_http};
use tokenapi_metrics::ToolMetrics;
use tokenapi_metrics::server::{MetricsServer, MetricsServerConfig};
use tracing::info;

use crate::config::McpdConfig;
use crate::shutdown::{ServeResult, Shutdown};

#[tokio::main]
async fn main() -> ServeResult {
    let config = McpdConfig::from_args()?;
    logging::init_tracing(config.pretty_logging, config.verbose)?;
    info!(
        version = %config.version,
        url = %config.clickhouse.url,
        database = %config.clickhouse.database,
        "starting tokenapi-mcpd"
    );

    let client = ClickHouseClient::new(config.clickhouse.clone())?;
    let catalog = Arc::new(Catalog::new(client));
    let metrics = Arc::new(ToolMetrics::new()?);
    let options = Arc::new(McpOptions {
        version: config.version.clone(),
        expose_resources: config.expose_resources,
    });

    let shutdown = Shutdown::new();
    shutdown.on_signal();

    let mcp = serve_streamable_http(
        catalog,
        metrics.clone(),
        options,
        McpHttpServerConfig::new(config.mcp_addr),
        shutdown.stopped(),
    );
    let exporter = MetricsServer::new(metrics, MetricsServerConfig::new(config.metrics_addr))
        .serve(shutdown.stopped());

    let (mcp, exporter) = tokio::join!(
        shutdown.supervise("mcp", mcp),
        shutdown.supervise("metrics", exporter),
    );
    info!("tokenapi-mcpd stopped");
    mcp.and(exporter)
}
