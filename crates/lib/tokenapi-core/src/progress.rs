//! Optional progress reporting for long-running queries.

use futures::future::BoxFuture;

/// A single progress notification.
#[derive(Debug, Clone, PartialEq)]
pub struct ProgressUpdate {
    pub progress: f64,
    pub total: Option<f64>,
    pub message: Option<String>,
}

impl ProgressUpdate {
    /// Progress expressed as bytes of the response received so far.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn bytes(received: u64, total: Option<u64>) -> Self {
        Self {
            progress: received as f64,
            total: total.map(|total| total as f64),
            message: Some(format!("received {received} bytes")),
        }
    }
}

/// Receiver for progress updates emitted while a query is in flight.
///
/// Implementations must not fail; the executor awaits each report before
/// reading the next chunk and ignores whatever the sink does with it.
pub trait ProgressSink: Send + Sync {
    fn report(&self, update: ProgressUpdate) -> BoxFuture<'_, ()>;
}

/// Reports to `sink` if one is present.
pub async fn report(sink: Option<&dyn ProgressSink>, update: ProgressUpdate) {
    if let Some(sink) = sink {
        sink.report(update).await;
    }
}
