//! Mail notifications for instance status changes.
//!
//! [`MailNotifier`] turns a status transition into a rendered HTML mail and
//! hands it to a [`MailTransport`]. The transport trait keeps SMTP out of the
//! notifier so tests can capture messages instead of delivering them.

use crate::config::{MailNotifierConfig, SmtpConfig};
use crate::core::{Instance, InstanceStore, MailMessage, Notifier, StatusChangedEvent};
use crate::notification::NotifyError;
use crate::template::{TemplateContext, TemplateError, TemplateRenderer};
use anyhow::Context;
use async_trait::async_trait;
use lettre::message::header::ContentType;
use lettre::message::Mailbox;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use std::sync::Arc;
use tracing::{info, instrument};

/// A trait for transports that can deliver rendered mail messages.
#[async_trait]
pub trait MailTransport: Send + Sync {
    /// Delivers a single fully rendered message.
    async fn send(&self, message: &MailMessage) -> anyhow::Result<()>;
}

/// Sends status-change mails for instances known to the store.
pub struct MailNotifier {
    config: MailNotifierConfig,
    store: Arc<dyn InstanceStore>,
    renderer: TemplateRenderer,
    transport: Arc<dyn MailTransport>,
}

impl MailNotifier {
    /// Creates a new `MailNotifier`.
    pub fn new(
        config: MailNotifierConfig,
        store: Arc<dyn InstanceStore>,
        renderer: TemplateRenderer,
        transport: Arc<dyn MailTransport>,
    ) -> Self {
        Self {
            config,
            store,
            renderer,
            transport,
        }
    }
}

#[async_trait]
impl Notifier for MailNotifier {
    fn name(&self) -> &str {
        "mail"
    }

    /// Resolves the instance, renders subject and body, then hands the
    /// message to the transport. Rendering happens entirely before the
    /// transport is touched, so a render failure produces no send at all.
    #[instrument(skip(self, event), fields(instance = %event.instance))]
    async fn notify(&self, event: &StatusChangedEvent) -> Result<(), NotifyError> {
        let instance = self
            .store
            .find(&event.instance)
            .await?
            .ok_or_else(|| NotifyError::InstanceNotFound(event.instance.clone()))?;

        let context = template_context(&instance, event)?;
        let subject = self.renderer.render_str(&self.config.subject, &context)?;
        let body = self.renderer.render(&self.config.template, &context)?;

        let message = MailMessage {
            to: self.config.to.clone(),
            cc: self.config.cc.clone(),
            from: self.config.from.clone(),
            subject,
            body,
        };

        self.transport
            .send(&message)
            .await
            .map_err(NotifyError::Delivery)?;

        info!(
            status = %event.status_info.status,
            recipients = message.to.len(),
            "Sent status-change mail"
        );
        Ok(())
    }
}

/// Binds the stored instance and the event under the names templates use.
fn template_context(
    instance: &Instance,
    event: &StatusChangedEvent,
) -> Result<TemplateContext, TemplateError> {
    let mut context = TemplateContext::new();
    context.insert("instance", instance)?;
    context.insert("event", event)?;
    Ok(context)
}

/// A [`MailTransport`] backed by an SMTP relay.
pub struct SmtpMailTransport {
    transport: AsyncSmtpTransport<Tokio1Executor>,
}

impl SmtpMailTransport {
    /// Creates a transport for the configured relay. Must be called inside
    /// a Tokio runtime: the connection pool spawns its maintenance task at
    /// build time. No connection is dialed until the first send.
    pub fn new(config: &SmtpConfig) -> anyhow::Result<Self> {
        let builder = if config.starttls {
            AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.host)
        } else {
            AsyncSmtpTransport::<Tokio1Executor>::relay(&config.host)
        }
        .with_context(|| format!("invalid SMTP relay: {}", config.host))?
        .port(config.port);

        let builder = match (&config.username, &config.password) {
            (Some(username), Some(password)) => {
                builder.credentials(Credentials::new(username.clone(), password.clone()))
            }
            _ => builder,
        };

        Ok(Self {
            transport: builder.build(),
        })
    }
}

#[async_trait]
impl MailTransport for SmtpMailTransport {
    async fn send(&self, message: &MailMessage) -> anyhow::Result<()> {
        let email = build_message(message)?;
        self.transport
            .send(email)
            .await
            .context("SMTP delivery failed")?;
        Ok(())
    }
}

fn build_message(message: &MailMessage) -> anyhow::Result<Message> {
    let mut builder = Message::builder()
        .from(parse_mailbox(&message.from)?)
        .subject(message.subject.clone())
        .header(ContentType::TEXT_HTML);
    for to in &message.to {
        builder = builder.to(parse_mailbox(to)?);
    }
    for cc in &message.cc {
        builder = builder.cc(parse_mailbox(cc)?);
    }
    builder
        .body(message.body.clone())
        .context("failed to build mail message")
}

fn parse_mailbox(address: &str) -> anyhow::Result<Mailbox> {
    address
        .parse::<Mailbox>()
        .with_context(|| format!("invalid mail address: {address}"))
}
