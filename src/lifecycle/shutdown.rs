//! Shutdown coordination.

use std::future::Future;
use std::sync::Arc;

use tokio::sync::watch;

use crate::lifecycle::signals::shutdown_signal;

/// One-way stop latch shared by the server and the signal handler.
///
/// A waiter created after [`Shutdown::trigger`] resolves immediately.
#[derive(Debug, Clone)]
pub struct Shutdown {
    stopped: Arc<watch::Sender<bool>>,
}

impl Shutdown {
    pub fn new() -> Self {
        let (stopped, _) = watch::channel(false);
        Self {
            stopped: Arc::new(stopped),
        }
    }

    /// Flip the latch. Later calls are no-ops.
    pub fn trigger(&self) {
        if !self.stopped.send_replace(true) {
            tracing::info!("Shutdown triggered");
        }
    }

    pub fn is_triggered(&self) -> bool {
        *self.stopped.borrow()
    }

    /// A future that completes once the latch is flipped.
    pub fn wait(&self) -> impl Future<Output = ()> + Send + 'static {
        let mut rx = self.stopped.subscribe();
        async move {
            let _ = rx.wait_for(|stopped| *stopped).await;
        }
    }

    /// Flip the latch on SIGINT or SIGTERM.
    pub fn trigger_on_signal(&self) {
        let shutdown = self.clone();
        tokio::spawn(async move {
            shutdown_signal().await;
            shutdown.trigger();
        });
    }
}

impl Default for Shutdown {
    fn default() -> Self {
        Self::new()
    }
}
