//! Coordinated shutdown of the daemon's listeners.
//!
//! One cancellation token drives every listener's graceful shutdown. It is
//! cancelled by a process signal or by any listener exiting, and every
//! listener is awaited to completion.

use std::error::Error;
use std::future::Future;
use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

pub type ServeResult = Result<(), Box<dyn Error + Send + Sync>>;

/// Time a listener gets to drain open connections once shutdown starts.
pub const DRAIN_TIMEOUT: Duration = Duration::from_secs(10);

/// Shared shutdown trigger for the daemon's listeners.
#[derive(Debug, Clone)]
pub struct Shutdown {
    cancel: CancellationToken,
    drain_timeout: Duration,
}

impl Shutdown {
    #[must_use]
    pub fn new() -> Self {
        Self::with_drain_timeout(DRAIN_TIMEOUT)
    }

    #[must_use]
    pub fn with_drain_timeout(drain_timeout: Duration) -> Self {
        Self {
            cancel: CancellationToken::new(),
            drain_timeout,
        }
    }

    pub fn trigger(&self) {
        self.cancel.cancel();
    }

    /// Resolves once shutdown is triggered.
    pub fn stopped(&self) -> impl Future<Output = ()> + Send + 'static {
        self.cancel.clone().cancelled_owned()
    }

    /// Triggers shutdown on ctrl-c or SIGTERM.
    pub fn on_signal(&self) {
        let shutdown = self.clone();
        tokio::spawn(async move {
            signal().await;
            info!("shutdown signal received");
            shutdown.trigger();
        });
    }

    /// Awaits `listener`, then triggers shutdown so its siblings drain as well.
    ///
    /// A listener still draining `drain_timeout` after shutdown started is
    /// abandoned.
    pub async fn supervise<F>(&self, name: &'static str, listener: F) -> ServeResult
    where
        F: Future<Output = ServeResult>,
    {
        let stopped = self.stopped();
        let drain_timeout = self.drain_timeout;
        let deadline = async move {
            stopped.await;
            tokio::time::sleep(drain_timeout).await;
        };
        let result = tokio::select! {
            result = listener => result,
            () = deadline => {
                warn!(listener = name, "listener did not drain in time");
                Ok(())
            }
        };
        match &result {
            Ok(()) => info!(listener = name, "listener stopped"),
            Err(err) => error!(listener = name, error = %err, "listener exited with an error"),
        }
        self.trigger();
        result
    }
}

impl Default for Shutdown {
    fn default() -> Self {
        Self::new()
    }
}

async fn signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            error!(error = %err, "failed to listen for ctrl-c");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{SignalKind, signal};

        match signal(SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(err) => {
                error!(error = %err, "failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {}
        () = terminate => {}
    }
}
