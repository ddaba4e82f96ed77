//! A notifier that posts status changes to a generic webhook.

use crate::config::WebhookConfig;
use crate::core::{InstanceStore, Notifier, StatusChangedEvent};
use crate::notification::NotifyError;
use crate::template::{TemplateContext, TemplateRenderer};
use anyhow::anyhow;
use async_trait::async_trait;
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info, instrument};

/// Posts `{"text": ...}` payloads to a configured URL, one per event.
///
/// The message text is a template string resolved against the same context
/// as the mail notifier, so Slack-compatible endpoints get the same wording
/// as the mail subject by default.
pub struct WebhookNotifier {
    config: WebhookConfig,
    store: Arc<dyn InstanceStore>,
    renderer: TemplateRenderer,
    client: reqwest::Client,
}

impl WebhookNotifier {
    /// Creates a new `WebhookNotifier`.
    pub fn new(
        config: WebhookConfig,
        store: Arc<dyn InstanceStore>,
        renderer: TemplateRenderer,
    ) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()?;
        Ok(Self {
            config,
            store,
            renderer,
            client,
        })
    }
}

#[async_trait]
impl Notifier for WebhookNotifier {
    fn name(&self) -> &str {
        "webhook"
    }

    #[instrument(skip(self, event), fields(instance = %event.instance))]
    async fn notify(&self, event: &StatusChangedEvent) -> Result<(), NotifyError> {
        let instance = self
            .store
            .find(&event.instance)
            .await?
            .ok_or_else(|| NotifyError::InstanceNotFound(event.instance.clone()))?;

        let mut context = TemplateContext::new();
        context.insert("instance", &instance)?;
        context.insert("event", event)?;
        let text = self.renderer.render_str(&self.config.message, &context)?;

        let payload = json!({ "text": text });
        let response = self
            .client
            .post(&self.config.url)
            .json(&payload)
            .send()
            .await
            .map_err(|e| NotifyError::Delivery(e.into()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            error!(
                status = %status,
                body = %body,
                "Webhook rejected status-change notification"
            );
            return Err(NotifyError::Delivery(anyhow!(
                "webhook returned status {status}, body: {body}"
            )));
        }

        info!(status = %event.status_info.status, "Posted status change to webhook");
        Ok(())
    }
}
