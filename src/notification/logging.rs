//! A simple notifier that logs status changes.
//!
//! This serves as a basic implementation to validate the notification
//! pipeline and can be used for debugging purposes.

use crate::core::{InstanceStore, Notifier, StatusChangedEvent};
use crate::notification::NotifyError;
use async_trait::async_trait;
use std::sync::Arc;
use tracing::info;

/// Logs every status change as a structured `tracing` event.
pub struct LoggingNotifier {
    store: Arc<dyn InstanceStore>,
}

impl LoggingNotifier {
    pub fn new(store: Arc<dyn InstanceStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl Notifier for LoggingNotifier {
    fn name(&self) -> &str {
        "logging"
    }

    async fn notify(&self, event: &StatusChangedEvent) -> Result<(), NotifyError> {
        let instance = self
            .store
            .find(&event.instance)
            .await?
            .ok_or_else(|| NotifyError::InstanceNotFound(event.instance.clone()))?;

        info!(
            instance = %event.instance,
            name = %instance.registration.name,
            from = %instance.status(),
            to = %event.status_info.status,
            "Instance status changed"
        );
        Ok(())
    }
}
