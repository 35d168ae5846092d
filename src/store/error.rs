//! Document store error types.

use thiserror::Error;

/// Errors that can occur against the external document store.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// The store could not be reached (network outage, backend down).
    #[error("document store is unavailable: {0}")]
    Unavailable(String),

    /// The caller is not allowed to read or write the record.
    #[error("permission denied for record '{0}'")]
    PermissionDenied(String),

    /// The addressed record does not exist.
    #[error("record '{0}' not found")]
    NotFound(String),

    /// An atomic transfer was rejected because the sender no longer holds
    /// a ticket at commit time.
    #[error("sender '{0}' no longer holds a ticket")]
    TicketGone(String),

    /// A record could not be encoded or decoded.
    #[error("record encoding failed: {0}")]
    Encoding(String),
}

impl StoreError {
    /// Returns true if retrying the operation later could succeed.
    ///
    /// Precondition failures (`NotFound`, `TicketGone`) and permission
    /// problems will not resolve on their own.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Unavailable(_))
    }

    /// Returns true if the failure is a rejected business precondition
    /// rather than an infrastructure problem.
    #[must_use]
    pub fn is_precondition(&self) -> bool {
        matches!(self, Self::NotFound(_) | Self::TicketGone(_))
    }
}
