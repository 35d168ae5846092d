//! Notification dispatcher seam.
//!
//! The hosting application delivers local or push notifications; this core
//! only needs a `(title, body)` fire-and-forget contract. Failures are
//! logged and swallowed by the caller, never surfaced to the user and never
//! a reason to roll back the operation that triggered the notification.

pub mod error;

pub use error::NotifyError;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use tracing::info;

// ============================================================================
// NotificationSender
// ============================================================================

/// Best-effort notification dispatch.
#[allow(async_fn_in_trait)]
pub trait NotificationSender {
    /// Delivers a notification with the given title and body.
    async fn send(&self, title: &str, body: &str) -> Result<(), NotifyError>;
}

// ============================================================================
// LogSender
// ============================================================================

/// Dispatcher that only logs, used when no platform backend is wired up.
///
/// Never fails; the log line stands in for the notification.
#[derive(Debug, Default, Clone)]
pub struct LogSender;

impl NotificationSender for LogSender {
    async fn send(&self, title: &str, body: &str) -> Result<(), NotifyError> {
        info!(title, body, "notification");
        Ok(())
    }
}

// ============================================================================
// MockNotificationSender
// ============================================================================

/// Recording dispatcher for tests.
///
/// Captures every `(title, body)` pair and can be switched into a failing
/// mode to exercise the swallowed-failure paths.
#[derive(Debug, Default)]
pub struct MockNotificationSender {
    sent: Mutex<Vec<(String, String)>>,
    failing: AtomicBool,
}

impl MockNotificationSender {
    /// Creates a recording sender that always succeeds.
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes subsequent sends fail with [`NotifyError::SendFailed`].
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::Relaxed);
    }

    /// Returns all notifications recorded so far.
    pub fn sent(&self) -> Vec<(String, String)> {
        self.sent.lock().expect("sender lock poisoned").clone()
    }

    /// Number of notifications recorded so far.
    pub fn sent_count(&self) -> usize {
        self.sent.lock().expect("sender lock poisoned").len()
    }
}

impl NotificationSender for MockNotificationSender {
    async fn send(&self, title: &str, body: &str) -> Result<(), NotifyError> {
        if self.failing.load(Ordering::Relaxed) {
            return Err(NotifyError::SendFailed("mock failure".to_string()));
        }
        self.sent
            .lock()
            .expect("sender lock poisoned")
            .push((title.to_string(), body.to_string()));
        Ok(())
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_log_sender_always_succeeds() {
        let sender = LogSender;
        assert!(sender.send("Title", "Body").await.is_ok());
    }

    #[tokio::test]
    async fn test_mock_records_notifications() {
        let sender = MockNotificationSender::new();
        sender.send("New lottery ticket!", "From Alice").await.unwrap();
        sender.send("Reward", "25 points").await.unwrap();

        let sent = sender.sent();
        assert_eq!(sent.len(), 2);
        assert_eq!(sent[0].0, "New lottery ticket!");
        assert_eq!(sent[1].1, "25 points");
    }

    #[tokio::test]
    async fn test_mock_failing_mode() {
        let sender = MockNotificationSender::new();
        sender.set_failing(true);

        let err = sender.send("Title", "Body").await.unwrap_err();
        assert!(err.is_recoverable());
        assert_eq!(sender.sent_count(), 0);

        sender.set_failing(false);
        sender.send("Title", "Body").await.unwrap();
        assert_eq!(sender.sent_count(), 1);
    }
}
