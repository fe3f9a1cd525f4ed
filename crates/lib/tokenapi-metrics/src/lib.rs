//! Tool call metrics for tokenapi-mcp.
//!
//! `ToolMetrics` owns a private Prometheus registry with one call counter and
//! one duration histogram. It is constructed once and shared with the MCP
//! server; the scrape server in [`server`] renders it.

pub mod server;

use std::error::Error;
use std::fmt;
use std::future::Future;
use std::string::FromUtf8Error;

use prometheus::{
    Encoder,
    HistogramOpts,
    HistogramVec,
    IntCounterVec,
    Opts,
    Registry,
    TextEncoder,
};

pub use server::{MetricsServer, MetricsServerConfig};

pub const TOOL_CALLS_TOTAL: &str = "tokenapi_mcp_tool_calls_total";
pub const TOOL_CALL_DURATION_SECONDS: &str = "tokenapi_mcp_tool_call_duration_seconds";
pub const DURATION_BUCKETS: [f64; 11] = [
    0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0,
];

/// Outcome label recorded for each call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallStatus {
    Success,
    Error,
}

impl CallStatus {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::Error => "error",
        }
    }
}

#[derive(Debug)]
pub enum MetricsError {
    Prometheus(prometheus::Error),
    Encoding(FromUtf8Error),
}

impl fmt::Display for MetricsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Prometheus(err) => write!(f, "prometheus error: {err}"),
            Self::Encoding(err) => write!(f, "metrics output is not UTF-8: {err}"),
        }
    }
}

impl Error for MetricsError {}

impl From<prometheus::Error> for MetricsError {
    fn from(err: prometheus::Error) -> Self {
        Self::Prometheus(err)
    }
}

impl From<FromUtf8Error> for MetricsError {
    fn from(err: FromUtf8Error) -> Self {
        Self::Encoding(err)
    }
}

/// Call counter and duration histogram for MCP tools.
#[derive(Clone)]
pub struct ToolMetrics {
    registry: Registry,
    calls: IntCounterVec,
    duration: HistogramVec,
}

impl ToolMetrics {
    /// Creates the metric families in a fresh registry.
    ///
    /// # Errors
    /// Returns `MetricsError` if a metric cannot be created or registered.
    pub fn new() -> Result<Self, MetricsError> {
        let registry = Registry::new();
        let calls = IntCounterVec::new(
            Opts::new(TOOL_CALLS_TOTAL, "Total number of MCP tool calls"),
            &["tool_name", "status"],
        )?;
        let duration = HistogramVec::new(
            HistogramOpts::new(
                TOOL_CALL_DURATION_SECONDS,
                "Duration of MCP tool calls in seconds",
            )
            .buckets(DURATION_BUCKETS.to_vec()),
            &["tool_name"],
        )?;
        registry.register(Box::new(calls.clone()))?;
        registry.register(Box::new(duration.clone()))?;
        Ok(Self {
            registry,
            calls,
            duration,
        })
    }

    /// Awaits `call`, recording one count and one duration sample for `tool`.
    ///
    /// The result is returned untouched, errors included.
    ///
    /// # Errors
    /// Returns whatever error `call` resolves to.
    pub async fn track<T, E, F>(&self, tool: &str, call: F) -> Result<T, E>
    where
        F: Future<Output = Result<T, E>>,
    {
        let timer = self.duration.with_label_values(&[tool]).start_timer();
        let result = call.await;
        let status = if result.is_ok() {
            CallStatus::Success
        } else {
            CallStatus::Error
        };
        self.calls
            .with_label_values(&[tool, status.as_str()])
            .inc();
        timer.observe_duration();
        result
    }

    /// Renders the registry in Prometheus text exposition format.
    ///
    /// # Errors
    /// Returns `MetricsError` if encoding fails.
    pub fn render(&self) -> Result<String, MetricsError> {
        let mut buffer = Vec::new();
        TextEncoder::new().encode(&self.registry.gather(), &mut buffer)?;
        Ok(String::from_utf8(buffer)?)
    }

    /// Number of calls recorded for `tool` with `status`.
    #[must_use]
    pub fn call_count(&self, tool: &str, status: CallStatus) -> u64 {
        self.calls.with_label_values(&[tool, status.as_str()]).get()
    }

    /// Number of duration samples recorded for `tool`.
    #[must_use]
    pub fn observation_count(&self, tool: &str) -> u64 {
        self.duration.with_label_values(&[tool]).get_sample_count()
    }
}

impl fmt::Debug for ToolMetrics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ToolMetrics").finish_non_exhaustive()
    }
}
