//! The notification dispatcher is a stateful actor that fans status-change
//! events out to every registered notifier.

use crate::core::{Notifier, StatusChangedEvent};
use std::sync::Arc;
use tokio::sync::{broadcast, watch};
use tracing::{debug, error, info};

/// The `NotificationDispatcher` actor.
///
/// Notifiers run sequentially per event. A failing notifier is logged and
/// skipped; it never stops the remaining channels or the loop itself.
pub struct NotificationDispatcher {
    notifiers: Vec<Arc<dyn Notifier>>,
    event_rx: broadcast::Receiver<StatusChangedEvent>,
}

impl NotificationDispatcher {
    /// Creates a new `NotificationDispatcher`.
    pub fn new(
        notifiers: Vec<Arc<dyn Notifier>>,
        event_rx: broadcast::Receiver<StatusChangedEvent>,
    ) -> Self {
        Self {
            notifiers,
            event_rx,
        }
    }

    /// Runs the dispatcher's main loop until shutdown or channel close.
    pub async fn run(mut self, mut shutdown_rx: watch::Receiver<bool>) {
        info!(
            notifiers = self.notifiers.len(),
            "NotificationDispatcher started."
        );

        loop {
            tokio::select! {
                biased;
                _ = shutdown_rx.changed() => {
                    info!("NotificationDispatcher received shutdown signal.");
                    break;
                }
                result = self.event_rx.recv() => {
                    match result {
                        Ok(event) => {
                            debug!(instance = %event.instance, "Dispatching status change");
                            self.dispatch(&event).await;
                        }
                        Err(broadcast::error::RecvError::Lagged(n)) => {
                            error!("NotificationDispatcher lagged, dropping {} events.", n);
                        }
                        Err(broadcast::error::RecvError::Closed) => {
                            info!("Event channel closed. Shutting down NotificationDispatcher.");
                            break;
                        }
                    }
                }
            }
        }
    }

    /// Invokes every notifier for a single event, in registration order.
    pub async fn dispatch(&self, event: &StatusChangedEvent) {
        for notifier in &self.notifiers {
            if let Err(e) = notifier.notify(event).await {
                error!(
                    notifier = notifier.name(),
                    instance = %event.instance,
                    error = %e,
                    "Notifier failed for status change"
                );
            }
        }
    }
}
