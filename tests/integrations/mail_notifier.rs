//! Integration tests for mail notifications.

use appwatch::config::{MailNotifierConfig, SmtpConfig};
use appwatch::core::{
    Instance, InstanceId, InstanceStore, MailMessage, Notifier, Registration, StatusChangedEvent,
    StatusInfo,
};
use appwatch::notification::mail::MailNotifier;
use appwatch::notification::test_utils::RecordingMailTransport;
use appwatch::notification::NotifyError;
use appwatch::store::{InMemoryInstanceStore, StoreError};
use appwatch::template::TemplateRenderer;
use async_trait::async_trait;
use std::sync::Arc;

const EXPECTED_MAIL_TEXT: &str = r#"<!DOCTYPE html>
<html>
<head>
    <meta http-equiv="Content-Type" content="text/html; charset=UTF-8" />
</head>
<body>
<span>App</span> (<span>-id-</span>)
status changed from <span>UNKNOWN</span> to <span>DOWN</span>
<br />
<span>http://health</span>
</body>
</html>
"#;

fn mail_config() -> MailNotifierConfig {
    MailNotifierConfig {
        enabled: true,
        to: vec!["foo@bar.com".to_string()],
        cc: vec!["bar@foo.com".to_string()],
        from: "SBA <no-reply@example.com>".to_string(),
        subject: "#{instance.id} is #{event.statusInfo.status}".to_string(),
        template: "status-changed".to_string(),
        smtp: SmtpConfig::default(),
    }
}

/// A freshly registered instance; its stored status is UNKNOWN.
fn test_instance() -> Instance {
    Instance::create(
        InstanceId::from("-id-"),
        Registration::new("App", "http://health"),
    )
}

async fn notifier_with_instance(
    config: MailNotifierConfig,
) -> (MailNotifier, Arc<RecordingMailTransport>, StatusChangedEvent) {
    let store = Arc::new(InMemoryInstanceStore::new());
    let instance = test_instance();
    let event = StatusChangedEvent::new(instance.id.clone(), instance.version, StatusInfo::down());
    store.save(instance).await;

    let transport = Arc::new(RecordingMailTransport::new());
    let notifier = MailNotifier::new(
        config,
        store,
        TemplateRenderer::default(),
        transport.clone(),
    );
    (notifier, transport, event)
}

/// A store whose backend is unreachable; every lookup fails.
struct FailingInstanceStore;

#[async_trait]
impl InstanceStore for FailingInstanceStore {
    async fn find(&self, _id: &InstanceId) -> Result<Option<Instance>, StoreError> {
        Err(StoreError::Lookup("backend unavailable".to_string()))
    }
}

#[tokio::test]
async fn sends_mail_with_rendered_subject_and_body() {
    // Arrange
    let (notifier, transport, event) = notifier_with_instance(mail_config()).await;

    // Act
    notifier.notify(&event).await.unwrap();

    // Assert: the whole message matches, not just fragments of it.
    let expected = MailMessage {
        to: vec!["foo@bar.com".to_string()],
        cc: vec!["bar@foo.com".to_string()],
        from: "SBA <no-reply@example.com>".to_string(),
        subject: "-id- is DOWN".to_string(),
        body: EXPECTED_MAIL_TEXT.to_string(),
    };
    assert_eq!(transport.sent(), vec![expected]);
}

#[tokio::test]
async fn same_event_renders_the_same_mail() {
    let (notifier, transport, event) = notifier_with_instance(mail_config()).await;

    notifier.notify(&event).await.unwrap();
    notifier.notify(&event).await.unwrap();

    let sent = transport.sent();
    assert_eq!(sent.len(), 2);
    assert_eq!(sent[0], sent[1]);
}

#[tokio::test]
async fn unknown_instance_sends_nothing() {
    let store = Arc::new(InMemoryInstanceStore::new());
    let transport = Arc::new(RecordingMailTransport::new());
    let notifier = MailNotifier::new(
        mail_config(),
        store,
        TemplateRenderer::default(),
        transport.clone(),
    );
    let event = StatusChangedEvent::new(InstanceId::from("ghost"), 0, StatusInfo::down());

    let result = notifier.notify(&event).await;

    assert!(matches!(result, Err(NotifyError::InstanceNotFound(id)) if id.as_str() == "ghost"));
    assert_eq!(transport.send_attempts(), 0);
}

#[tokio::test]
async fn store_failure_sends_nothing() {
    let transport = Arc::new(RecordingMailTransport::new());
    let notifier = MailNotifier::new(
        mail_config(),
        Arc::new(FailingInstanceStore),
        TemplateRenderer::default(),
        transport.clone(),
    );
    let event = StatusChangedEvent::new(InstanceId::from("-id-"), 0, StatusInfo::down());

    let result = notifier.notify(&event).await;

    assert!(matches!(result, Err(NotifyError::Store(_))));
    assert_eq!(transport.send_attempts(), 0);
}

#[tokio::test]
async fn transport_failure_surfaces_as_delivery_error() {
    let (notifier, transport, event) = notifier_with_instance(mail_config()).await;
    transport.set_failing(true);

    let result = notifier.notify(&event).await;

    assert!(matches!(result, Err(NotifyError::Delivery(_))));
    assert_eq!(transport.send_attempts(), 1);
    assert!(transport.sent().is_empty());
}

#[tokio::test]
async fn subject_render_failure_sends_nothing() {
    let mut config = mail_config();
    config.subject = "#{instance.nope} is #{event.statusInfo.status}".to_string();
    let (notifier, transport, event) = notifier_with_instance(config).await;

    let result = notifier.notify(&event).await;

    assert!(matches!(result, Err(NotifyError::Template(_))));
    assert_eq!(transport.send_attempts(), 0);
}

#[tokio::test]
async fn unregistered_body_template_sends_nothing() {
    let mut config = mail_config();
    config.template = "does-not-exist".to_string();
    let (notifier, transport, event) = notifier_with_instance(config).await;

    let result = notifier.notify(&event).await;

    assert!(matches!(result, Err(NotifyError::Template(_))));
    assert_eq!(transport.send_attempts(), 0);
}

#[tokio::test]
async fn custom_registered_template_is_used() {
    let store = Arc::new(InMemoryInstanceStore::new());
    let instance = test_instance();
    let event = StatusChangedEvent::new(instance.id.clone(), instance.version, StatusInfo::down());
    store.save(instance).await;

    let mut renderer = TemplateRenderer::default();
    renderer.register("status-changed", "#{instance.registration.name} went #{event.statusInfo.status}");

    let transport = Arc::new(RecordingMailTransport::new());
    let notifier = MailNotifier::new(mail_config(), store, renderer, transport.clone());

    notifier.notify(&event).await.unwrap();

    assert_eq!(transport.sent()[0].body, "App went DOWN");
}
