//! Document store seam.
//!
//! The persistent per-user progress records live in a hosted document
//! store. This module defines the contract the ledger consumes:
//!
//! - Point reads and writes of a record by user id
//! - An atomic multi-record commit for ticket transfers
//! - Ordered queries for leaderboard and daily-winner lookups
//! - A small notice collection for received-ticket notifications
//!
//! [`MemoryStore`] is a complete in-process implementation used as the
//! reference backend in tests and local development. Production backends
//! implement [`DocumentStore`] over their own transaction primitives; blind
//! overwrites of records racing a transfer are not a valid implementation.

pub mod error;

pub use error::StoreError;

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use crate::types::{TicketNotice, TicketTransfer, UserProgress, UserSummary};

// ============================================================================
// DocumentStore
// ============================================================================

/// Contract for the external document store.
#[allow(async_fn_in_trait)]
pub trait DocumentStore {
    /// Point read of a user record. `Ok(None)` when the record is absent.
    async fn get_user(&self, user_id: &str) -> Result<Option<UserProgress>, StoreError>;

    /// Creates the record if absent; returns the stored record either way.
    async fn create_user_if_absent(
        &self,
        user_id: &str,
        fresh: UserProgress,
    ) -> Result<UserProgress, StoreError>;

    /// Replaces an existing user record.
    ///
    /// Callers must hold the per-user write serialization (see the ledger)
    /// so this read-modify-write cycle cannot lose updates.
    async fn put_user(&self, user_id: &str, progress: &UserProgress) -> Result<(), StoreError>;

    /// Atomically commits a ticket transfer.
    ///
    /// Clears the sender's ticket flag, applies the receive fold to the
    /// recipient, and appends the notice, as a single indivisible unit. The
    /// sender's flag is re-checked at commit time; a sender that no longer
    /// holds a ticket fails the whole commit with [`StoreError::TicketGone`]
    /// and no record changes.
    async fn commit_transfer(
        &self,
        transfer: &TicketTransfer,
        notice: &TicketNotice,
    ) -> Result<(), StoreError>;

    /// Ordered query: up to `limit` users, points descending.
    async fn top_users(&self, limit: usize) -> Result<Vec<UserSummary>, StoreError>;

    /// Users currently holding a self-won ticket with a win timestamp at or
    /// after `since`.
    async fn ticket_holders_since(&self, since: u64) -> Result<Vec<UserSummary>, StoreError>;

    /// Unread ticket notices addressed to a user, oldest first.
    async fn unread_notices(&self, user_id: &str) -> Result<Vec<TicketNotice>, StoreError>;

    /// Marks a notice as read.
    async fn mark_notice_read(&self, notice_id: &str) -> Result<(), StoreError>;
}

// ============================================================================
// MemoryStore
// ============================================================================

#[derive(Debug, Default)]
struct Inner {
    users: HashMap<String, UserProgress>,
    notices: Vec<TicketNotice>,
}

/// In-process reference implementation of [`DocumentStore`].
///
/// Backed by a mutex-guarded map, so every operation is atomic with respect
/// to every other. An `offline` switch makes all operations fail with
/// [`StoreError::Unavailable`] for persistence-failure tests.
#[derive(Debug, Default)]
pub struct MemoryStore {
    inner: Mutex<Inner>,
    offline: AtomicBool,
}

impl MemoryStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Toggles simulated unavailability.
    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::Relaxed);
    }

    fn check_online(&self) -> Result<(), StoreError> {
        if self.offline.load(Ordering::Relaxed) {
            Err(StoreError::Unavailable("store is offline".to_string()))
        } else {
            Ok(())
        }
    }

    /// Number of stored user records.
    pub fn user_count(&self) -> usize {
        self.inner.lock().expect("store lock poisoned").users.len()
    }
}

impl DocumentStore for MemoryStore {
    async fn get_user(&self, user_id: &str) -> Result<Option<UserProgress>, StoreError> {
        self.check_online()?;
        let inner = self.inner.lock().expect("store lock poisoned");
        Ok(inner.users.get(user_id).cloned())
    }

    async fn create_user_if_absent(
        &self,
        user_id: &str,
        fresh: UserProgress,
    ) -> Result<UserProgress, StoreError> {
        self.check_online()?;
        let mut inner = self.inner.lock().expect("store lock poisoned");
        Ok(inner
            .users
            .entry(user_id.to_string())
            .or_insert(fresh)
            .clone())
    }

    async fn put_user(&self, user_id: &str, progress: &UserProgress) -> Result<(), StoreError> {
        self.check_online()?;
        let mut inner = self.inner.lock().expect("store lock poisoned");
        match inner.users.get_mut(user_id) {
            Some(record) => {
                *record = progress.clone();
                Ok(())
            }
            None => Err(StoreError::NotFound(user_id.to_string())),
        }
    }

    async fn commit_transfer(
        &self,
        transfer: &TicketTransfer,
        notice: &TicketNotice,
    ) -> Result<(), StoreError> {
        self.check_online()?;
        let mut inner = self.inner.lock().expect("store lock poisoned");

        // Validate the whole batch before touching anything
        let sender = inner
            .users
            .get(&transfer.sender_id)
            .ok_or_else(|| StoreError::NotFound(transfer.sender_id.clone()))?;
        if !sender.has_lottery_ticket {
            return Err(StoreError::TicketGone(transfer.sender_id.clone()));
        }
        let recipient = inner
            .users
            .get(&transfer.recipient_id)
            .ok_or_else(|| StoreError::NotFound(transfer.recipient_id.clone()))?;

        let sender_next = sender.after_sending_ticket();
        let recipient_next = recipient.after_receiving_ticket(&transfer.sender_name);

        inner
            .users
            .insert(transfer.sender_id.clone(), sender_next);
        inner
            .users
            .insert(transfer.recipient_id.clone(), recipient_next);
        inner.notices.push(notice.clone());

        Ok(())
    }

    async fn top_users(&self, limit: usize) -> Result<Vec<UserSummary>, StoreError> {
        self.check_online()?;
        let inner = self.inner.lock().expect("store lock poisoned");
        let mut summaries: Vec<UserSummary> = inner
            .users
            .iter()
            .map(|(id, progress)| UserSummary::from_progress(id, progress))
            .collect();
        // Points descending, user id as a deterministic tie-breaker
        summaries.sort_by(|a, b| {
            b.points
                .cmp(&a.points)
                .then_with(|| a.user_id.cmp(&b.user_id))
        });
        summaries.truncate(limit);
        Ok(summaries)
    }

    async fn ticket_holders_since(&self, since: u64) -> Result<Vec<UserSummary>, StoreError> {
        self.check_online()?;
        let inner = self.inner.lock().expect("store lock poisoned");
        let mut holders: Vec<UserSummary> = inner
            .users
            .iter()
            .filter(|(_, progress)| {
                progress.has_lottery_ticket
                    && progress.last_ticket_won_at.is_some_and(|won| won >= since)
            })
            .map(|(id, progress)| UserSummary::from_progress(id, progress))
            .collect();
        holders.sort_by(|a, b| a.user_id.cmp(&b.user_id));
        Ok(holders)
    }

    async fn unread_notices(&self, user_id: &str) -> Result<Vec<TicketNotice>, StoreError> {
        self.check_online()?;
        let inner = self.inner.lock().expect("store lock poisoned");
        Ok(inner
            .notices
            .iter()
            .filter(|notice| notice.unread && notice.recipient_id == user_id)
            .cloned()
            .collect())
    }

    async fn mark_notice_read(&self, notice_id: &str) -> Result<(), StoreError> {
        self.check_online()?;
        let mut inner = self.inner.lock().expect("store lock poisoned");
        match inner.notices.iter_mut().find(|n| n.id == notice_id) {
            Some(notice) => {
                notice.unread = false;
                Ok(())
            }
            None => Err(StoreError::NotFound(notice_id.to_string())),
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
