//! Notification dispatch error types.

use thiserror::Error;

/// Errors that can occur when dispatching a notification.
///
/// Dispatch is best-effort by contract: callers log these and move on, and
/// no notification failure ever blocks or rolls back the operation that
/// triggered it.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum NotifyError {
    /// The dispatcher rejected or dropped the notification.
    #[error("notification send failed: {0}")]
    SendFailed(String),

    /// No notification backend is available on this platform.
    #[error("notification dispatcher is unavailable")]
    Unavailable,
}

impl NotifyError {
    /// Returns true if the originating operation should continue.
    ///
    /// Always true; notifications are fire-and-forget.
    #[must_use]
    pub fn is_recoverable(&self) -> bool {
        true
    }
}
