use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::{interval, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

use crate::features::files::services::FeedView;

/// Keeps a mounted feed view in sync: one fetch right away, then one per
/// interval until the view is torn down.
pub struct FeedPoller {
    view: Arc<FeedView>,
    interval: Duration,
}

impl FeedPoller {
    pub fn new(view: Arc<FeedView>, interval: Duration) -> Self {
        Self { view, interval }
    }

    /// Run the poller on the runtime; the handle tears it down
    pub fn spawn(self) -> PollerHandle {
        let shutdown = CancellationToken::new();
        let task = tokio::spawn(self.run(shutdown.clone()));

        PollerHandle {
            shutdown,
            task: Some(task),
        }
    }

    /// Poll until `shutdown` is cancelled.
    ///
    /// Requests still in flight at shutdown are cancelled with it.
    pub async fn run(self, shutdown: CancellationToken) {
        tracing::info!(
            "Starting feed poller (every {} seconds)",
            self.interval.as_secs()
        );

        let mut ticker = interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                biased;
                _ = shutdown.cancelled() => break,
                _ = ticker.tick() => {}
            }

            self.view.sync_within(Some(&shutdown)).await;
        }

        tracing::info!("Feed poller stopped");
    }
}

/// Owner of a running poller; dropping it also stops the poller
pub struct PollerHandle {
    shutdown: CancellationToken,
    task: Option<JoinHandle<()>>,
}

impl PollerHandle {
    pub fn is_running(&self) -> bool {
        self.task.as_ref().is_some_and(|task| !task.is_finished())
    }

    /// Stop polling and wait for the task to finish
    pub async fn shutdown(mut self) {
        self.shutdown.cancel();

        if let Some(task) = self.task.take() {
            if let Err(e) = task.await {
                tracing::error!("Feed poller task failed: {:?}", e);
            }
        }
    }
}

impl Drop for PollerHandle {
    fn drop(&mut self) {
        self.shutdown.cancel();
    }
}
