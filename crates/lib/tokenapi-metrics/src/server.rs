//! Prometheus scrape server.
//!
//! Serves `GET /metrics` and `GET /health` on a listener separate from the MCP
//! transport; every other path is a 404.

use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use axum::extract::State;
use axum::http::StatusCode;
use axum::http::header::CONTENT_TYPE;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use tracing::{error, info};

use crate::{MetricsError, ToolMetrics};

pub const PROMETHEUS_CONTENT_TYPE: &str = "text/plain; version=0.0.4; charset=utf-8";

/// Configuration for the metrics HTTP server.
#[derive(Debug, Clone)]
pub struct MetricsServerConfig {
    pub addr: SocketAddr,
}

impl MetricsServerConfig {
    #[must_use]
    pub const fn new(addr: SocketAddr) -> Self {
        Self { addr }
    }
}

impl Default for MetricsServerConfig {
    fn default() -> Self {
        Self::new(SocketAddr::from(([0, 0, 0, 0], 9090)))
    }
}

/// HTTP server exposing a `ToolMetrics` registry.
#[derive(Debug)]
pub struct MetricsServer {
    config: MetricsServerConfig,
    metrics: Arc<ToolMetrics>,
}

impl MetricsServer {
    #[must_use]
    pub const fn new(metrics: Arc<ToolMetrics>, config: MetricsServerConfig) -> Self {
        Self { config, metrics }
    }

    /// Runs the HTTP server until `shutdown` resolves.
    ///
    /// # Errors
    /// Returns any listener or server error.
    pub async fn serve<F>(self, shutdown: F) -> Result<(), Box<dyn std::error::Error + Send + Sync>>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let addr = self.config.addr;
        let listener = tokio::net::TcpListener::bind(addr).await?;
        let app = build_router(self.metrics);

        info!("metrics server listening on http://{addr}/metrics");
        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown)
            .await?;
        Ok(())
    }
}

struct RenderError(MetricsError);

impl IntoResponse for RenderError {
    fn into_response(self) -> Response {
        error!(error = %self.0, "failed to render metrics");
        (StatusCode::INTERNAL_SERVER_ERROR, self.0.to_string()).into_response()
    }
}

/// Builds the `/metrics` + `/health` router.
#[must_use]
pub fn build_router(metrics: Arc<ToolMetrics>) -> Router {
    Router::new()
        .route("/metrics", get(render_metrics))
        .route("/health", get(health))
        .fallback(not_found)
        .with_state(metrics)
}

async fn render_metrics(State(metrics): State<Arc<ToolMetrics>>) -> Result<Response, RenderError> {
    let body = metrics.render().map_err(RenderError)?;
    Ok(([(CONTENT_TYPE, PROMETHEUS_CONTENT_TYPE)], body).into_response())
}

async fn health() -> &'static str {
    "OK"
}

async fn not_found() -> (StatusCode, &'static str) {
    (StatusCode::NOT_FOUND, "Not Found")
}
