//! Encapsulation for setting up the notification pipeline.

use crate::{
    config::Config,
    core::{InstanceStore, Notifier},
    notification::{
        dispatcher::NotificationDispatcher, logging::LoggingNotifier,
        mail::{MailNotifier, SmtpMailTransport}, webhook::WebhookNotifier,
    },
    template::TemplateRenderer,
    types::EventSender,
};
use anyhow::Result;
use std::sync::Arc;
use tokio::sync::{broadcast, watch};
use tracing::{info, warn};

const EVENT_CHANNEL_CAPACITY: usize = 256;

/// Sets up the notification pipeline for every channel enabled in the
/// configuration.
///
/// Returns an [`EventSender`] if at least one notifier is enabled, otherwise
/// `Ok(None)`. The pipeline stops once every sender clone has been dropped.
pub fn setup_notification_pipeline(
    config: &Config,
    store: Arc<dyn InstanceStore>,
) -> Result<Option<EventSender>> {
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let sender = setup_notification_pipeline_with_shutdown(config, store, shutdown_rx)?;
    if sender.is_some() {
        // Park the shutdown sender inside its own task so the channel stays
        // open; the dispatcher then only stops on event-channel close.
        tokio::spawn(async move {
            shutdown_tx.closed().await;
        });
    }
    Ok(sender)
}

/// Like [`setup_notification_pipeline`], for callers that own a shutdown
/// `watch` channel and want the dispatcher tied to it.
pub fn setup_notification_pipeline_with_shutdown(
    config: &Config,
    store: Arc<dyn InstanceStore>,
    shutdown_rx: watch::Receiver<bool>,
) -> Result<Option<EventSender>> {
    let notifiers = build_notifiers(config, &store)?;
    if notifiers.is_empty() {
        return Ok(None);
    }

    let (tx, _rx) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
    info!(notifiers = notifiers.len(), "Notification pipeline enabled.");

    let dispatcher = NotificationDispatcher::new(notifiers, tx.subscribe());
    tokio::spawn(dispatcher.run(shutdown_rx));
    Ok(Some(tx))
}

/// Builds the notifiers enabled in the configuration, skipping channels whose
/// settings are unusable.
fn build_notifiers(
    config: &Config,
    store: &Arc<dyn InstanceStore>,
) -> Result<Vec<Arc<dyn Notifier>>> {
    let mut notifiers: Vec<Arc<dyn Notifier>> = Vec::new();

    if config.notify.log_status_changes {
        notifiers.push(Arc::new(LoggingNotifier::new(store.clone())));
    }

    if let Some(mail_config) = &config.notify.mail {
        if mail_config.enabled {
            if mail_config.to.is_empty() {
                warn!("Mail notifications are enabled, but no recipients were provided. Mail notifications will be disabled.");
            } else if mail_config.from.is_empty() {
                warn!("Mail notifications are enabled, but no sender address was provided. Mail notifications will be disabled.");
            } else {
                let transport = Arc::new(SmtpMailTransport::new(&mail_config.smtp)?);
                notifiers.push(Arc::new(MailNotifier::new(
                    mail_config.clone(),
                    store.clone(),
                    TemplateRenderer::default(),
                    transport,
                )));
            }
        }
    }

    if let Some(webhook_config) = &config.notify.webhook {
        if webhook_config.enabled {
            if webhook_config.url.is_empty() {
                warn!("Webhook notifications are enabled, but no URL was provided. Webhook notifications will be disabled.");
            } else {
                notifiers.push(Arc::new(WebhookNotifier::new(
                    webhook_config.clone(),
                    store.clone(),
                    TemplateRenderer::default(),
                )?));
            }
        }
    }

    Ok(notifiers)
}
