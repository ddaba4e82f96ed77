use crate::core::MailMessage;
use crate::notification::mail::MailTransport;
use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;

/// Fake mail transport for testing
///
/// Records every accepted message so tests can assert on complete
/// [`MailMessage`] values instead of delivery side effects.
pub struct RecordingMailTransport {
    sent: Mutex<Vec<MailMessage>>,
    attempts: AtomicUsize,
    fail: AtomicBool,
}

impl RecordingMailTransport {
    pub fn new() -> Self {
        Self {
            sent: Mutex::new(Vec::new()),
            attempts: AtomicUsize::new(0),
            fail: AtomicBool::new(false),
        }
    }

    /// Makes every following send attempt fail until reset.
    pub fn set_failing(&self, fail: bool) {
        self.fail.store(fail, Ordering::SeqCst);
    }

    /// Messages accepted so far, in send order.
    pub fn sent(&self) -> Vec<MailMessage> {
        self.sent.lock().unwrap().clone()
    }

    /// Number of times `send` was called, including failed attempts.
    pub fn send_attempts(&self) -> usize {
        self.attempts.load(Ordering::SeqCst)
    }
}

impl Default for RecordingMailTransport {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl MailTransport for RecordingMailTransport {
    async fn send(&self, message: &MailMessage) -> anyhow::Result<()> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        if self.fail.load(Ordering::SeqCst) {
            anyhow::bail!("smtp transport unavailable");
        }
        self.sent.lock().unwrap().push(message.clone());
        Ok(())
    }
}
