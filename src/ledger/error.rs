//! Reward ledger error types.

use thiserror::Error;

use crate::store::StoreError;

/// Errors that can occur in the reward and ticket ledger.
#[derive(Debug, Error)]
pub enum LedgerError {
    /// The sender does not currently hold a lottery ticket.
    #[error("you don't hold a lottery ticket to send")]
    NoTicketHeld,

    /// The transfer recipient does not resolve to an existing user.
    #[error("recipient '{0}' not found")]
    RecipientNotFound(String),

    /// The acting user has no progress record.
    #[error("no progress record for user '{0}'")]
    UnknownUser(String),

    /// The transfer message exceeds the 100-character limit.
    #[error("transfer message is too long ({0} characters, limit is 100)")]
    MessageTooLong(usize),

    /// The external store failed; in-memory progress already shown to the
    /// user is not rolled back, so local and remote state may diverge until
    /// the next successful write.
    #[error("persistence failed: {0}")]
    Persistence(#[from] StoreError),
}

impl LedgerError {
    /// Returns true if retrying the operation later could succeed.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Persistence(err) => err.is_retryable(),
            _ => false,
        }
    }

    /// Returns true if this is a rejected business precondition, terminal
    /// for the operation and reported to the user immediately.
    #[must_use]
    pub fn is_precondition(&self) -> bool {
        matches!(
            self,
            Self::NoTicketHeld
                | Self::RecipientNotFound(_)
                | Self::UnknownUser(_)
                | Self::MessageTooLong(_)
        )
    }
}
