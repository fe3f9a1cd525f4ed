use futures::future::BoxFuture;
use rmcp::model::{Meta, ProgressNotificationParam, ProgressToken};
use rmcp::service::RequestContext;
use rmcp::{Peer, RoleServer};
use tokenapi_core::{ProgressSink, ProgressUpdate};
use tracing::debug;

/// Forwards query progress to the client as `notifications/progress`.
///
/// Only built when the request carried a progress token.
pub struct McpProgress {
    peer: Peer<RoleServer>,
    token: ProgressToken,
}

impl McpProgress {
    #[must_use]
    pub fn from_context(context: &RequestContext<RoleServer>) -> Option<Self> {
        let token = progress_token(&context.meta)?;
        Some(Self {
            peer: context.peer.clone(),
            token,
        })
    }

    /// Borrows an optional sink in the form the catalog expects.
    #[must_use]
    pub fn as_sink(progress: Option<&Self>) -> Option<&dyn ProgressSink> {
        progress.map(|sink| sink as &dyn ProgressSink)
    }
}

impl ProgressSink for McpProgress {
    fn report(&self, update: ProgressUpdate) -> BoxFuture<'_, ()> {
        Box::pin(async move {
            let sent = notification(self.token.clone(), update);
            if let Err(err) = self.peer.notify_progress(sent).await {
                debug!(error = %err, "progress notification dropped");
            }
        })
    }
}

fn progress_token(meta: &Meta) -> Option<ProgressToken> {
    meta.get_progress_token()
}

fn notification(token: ProgressToken, update: ProgressUpdate) -> ProgressNotificationParam {
    ProgressNotificationParam {
        progress_token: token,
        progress: update.progress,
        total: update.total,
        message: update.message,
    }
}
