//! Reward and ticket ledger.
//!
//! Consumes focus-session completion events from the timer and maintains
//! the per-user progress records:
//!
//! - Points and session counters (+25 points per completed focus session)
//! - The modulo-3 ticket-eligibility counter and the lottery ticket flag
//! - Atomic ticket transfers between users, with a best-effort
//!   notification to the recipient
//! - Leaderboard and daily-winner lookups
//!
//! Reward writes are serialized per user through a FIFO-fair async mutex,
//! so a tick that fires while a previous reward write is still in flight
//! queues behind it instead of racing it. Nothing here ever blocks the
//! timer's tick loop; the timer only pushes events into a channel.

pub mod error;

pub use error::LedgerError;

use std::collections::HashMap;
use std::sync::{Arc, Mutex as StdMutex};

use tokio::sync::Mutex as AsyncMutex;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::cache::ProgressCache;
use crate::identity::UserContext;
use crate::notify::{NotificationSender, NotifyError};
use crate::store::{DocumentStore, StoreError};
use crate::types::{
    day_start, now_epoch_secs, TicketNotice, TicketTransfer, UserProgress, UserSummary,
    MAX_TRANSFER_MESSAGE_LEN,
};

// ============================================================================
// Results
// ============================================================================

/// Outcome of a completed focus session.
#[derive(Debug, Clone)]
pub struct SessionReward {
    /// The updated progress snapshot, for UI display
    pub progress: UserProgress,
    /// Whether this session won a lottery ticket; the caller presents the
    /// reward notification when set
    pub ticket_won: bool,
}

/// Outcome of a successful ticket transfer.
///
/// The transfer itself has committed; `notice` carries the result of the
/// best-effort recipient notification. A notice failure is already logged
/// and safe to ignore, it never rolls back the transfer.
#[derive(Debug)]
pub struct TransferReceipt {
    /// The committed transfer record
    pub transfer: TicketTransfer,
    /// Result of the recipient notification dispatch
    pub notice: Result<(), NotifyError>,
}

// ============================================================================
// RewardLedger
// ============================================================================

/// The ledger tracking points, session counts and ticket state per user.
pub struct RewardLedger<S, N> {
    store: S,
    notifier: N,
    cache: Option<ProgressCache>,
    /// Per-user write serialization; tokio mutexes are FIFO-fair, which
    /// gives session completions their per-user ordering guarantee. Every
    /// write to a record holds that record's lock; transfers hold the locks
    /// of both endpoints.
    locks: StdMutex<HashMap<String, Arc<AsyncMutex<()>>>>,
}

impl<S: DocumentStore, N: NotificationSender> RewardLedger<S, N> {
    /// Creates a ledger over the given store and notification dispatcher.
    pub fn new(store: S, notifier: N) -> Self {
        Self {
            store,
            notifier,
            cache: None,
            locks: StdMutex::new(HashMap::new()),
        }
    }

    /// Attaches a local cache for the daily ticket-progress snapshot.
    pub fn with_cache(mut self, cache: ProgressCache) -> Self {
        self.cache = Some(cache);
        self
    }

    /// Returns a reference to the underlying store.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Returns a reference to the notification dispatcher.
    pub fn notifier(&self) -> &N {
        &self.notifier
    }

    fn user_lock(&self, user_id: &str) -> Arc<AsyncMutex<()>> {
        let mut locks = self.locks.lock().expect("ledger lock poisoned");
        locks.entry(user_id.to_string()).or_default().clone()
    }

    /// Creates the progress record on first authentication.
    ///
    /// Idempotent; an existing record is returned unchanged.
    pub async fn initialize(&self, ctx: &UserContext) -> Result<UserProgress, LedgerError> {
        let fresh = UserProgress::new(ctx.display_name.clone(), now_epoch_secs());
        Ok(self.store.create_user_if_absent(&ctx.user_id, fresh).await?)
    }

    /// Point read of a progress record, for UI display.
    pub async fn progress(&self, user_id: &str) -> Result<Option<UserProgress>, LedgerError> {
        Ok(self.store.get_user(user_id).await?)
    }

    /// Applies one completed focus session to the acting user.
    ///
    /// Awards the fixed point reward, advances the session and streak
    /// counters, and sets the lottery ticket flag when the session count
    /// reaches a multiple of three. Invocations for the same user are
    /// applied in FIFO order even when a new tick fires before the previous
    /// write completed.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::Persistence`] when the store write fails; by
    /// then the caller may already be showing the advanced counters, and
    /// that divergence stands until the next successful write.
    pub async fn on_session_completed(
        &self,
        ctx: &UserContext,
    ) -> Result<SessionReward, LedgerError> {
        let lock = self.user_lock(&ctx.user_id);
        let _guard = lock.lock().await;

        let now = now_epoch_secs();
        let fresh = UserProgress::new(ctx.display_name.clone(), now);
        let current = self.store.create_user_if_absent(&ctx.user_id, fresh).await?;

        let (next, ticket_won) = current.after_completed_session(now);
        self.store.put_user(&ctx.user_id, &next).await?;

        debug!(
            user_id = %ctx.user_id,
            points = next.points,
            completed_sessions = next.completed_sessions,
            ticket_won,
            "focus session recorded"
        );

        // The daily snapshot is a convenience copy; a cache failure is not
        // a reason to fail the reward.
        if let Some(cache) = &self.cache {
            if let Err(err) = cache.save_ticket_progress(&ctx.user_id, next.ticket_progress, now) {
                warn!(user_id = %ctx.user_id, %err, "failed to cache ticket progress");
            }
        }

        Ok(SessionReward {
            progress: next,
            ticket_won,
        })
    }

    /// Transfers the acting user's lottery ticket to another user.
    ///
    /// The sender's flag is read fresh at transfer time and re-checked by
    /// the store at commit time, so a stale cached flag can never produce a
    /// half-applied transfer. Both endpoints' per-user locks are held across
    /// the commit, so a reward write racing the transfer on either record
    /// serializes against it instead of erasing it. On success the recipient
    /// gets a best-effort notification whose failure is logged and carried
    /// in the receipt.
    ///
    /// # Errors
    ///
    /// - [`LedgerError::NoTicketHeld`] if the sender holds no ticket
    /// - [`LedgerError::RecipientNotFound`] if the recipient record is absent
    /// - [`LedgerError::MessageTooLong`] for a message over 100 characters
    ///
    /// All precondition failures leave every record unchanged.
    pub async fn transfer_ticket(
        &self,
        ctx: &UserContext,
        recipient_id: &str,
        message: Option<String>,
    ) -> Result<TransferReceipt, LedgerError> {
        if let Some(text) = &message {
            let len = text.chars().count();
            if len > MAX_TRANSFER_MESSAGE_LEN {
                return Err(LedgerError::MessageTooLong(len));
            }
        }

        // Both endpoints' records change, so both per-user locks are held
        // for the whole commit. Id order keeps lock acquisition deadlock-free
        // and stops a reward write in flight on either side from overwriting
        // the transfer.
        let (first_id, second_id) = if ctx.user_id.as_str() <= recipient_id {
            (ctx.user_id.as_str(), recipient_id)
        } else {
            (recipient_id, ctx.user_id.as_str())
        };
        let first_lock = self.user_lock(first_id);
        let _first_guard = first_lock.lock().await;
        let second_lock = (first_id != second_id).then(|| self.user_lock(second_id));
        let _second_guard = match &second_lock {
            Some(lock) => Some(lock.lock().await),
            None => None,
        };

        let sender = self
            .store
            .get_user(&ctx.user_id)
            .await?
            .ok_or_else(|| LedgerError::UnknownUser(ctx.user_id.clone()))?;
        if !sender.has_lottery_ticket {
            return Err(LedgerError::NoTicketHeld);
        }

        if self.store.get_user(recipient_id).await?.is_none() {
            return Err(LedgerError::RecipientNotFound(recipient_id.to_string()));
        }

        let now = now_epoch_secs();
        let sender_name = ctx.display_name_or_friend().to_string();
        let transfer = TicketTransfer {
            id: Uuid::new_v4().to_string(),
            sender_id: ctx.user_id.clone(),
            recipient_id: recipient_id.to_string(),
            sender_name: sender_name.clone(),
            message,
            sent_at: now,
        };
        let notice = TicketNotice {
            id: Uuid::new_v4().to_string(),
            recipient_id: recipient_id.to_string(),
            sender_id: ctx.user_id.clone(),
            sender_name: sender_name.clone(),
            message: format!("{sender_name} sent you a lottery ticket!"),
            unread: true,
            created_at: now,
        };

        self.store
            .commit_transfer(&transfer, &notice)
            .await
            .map_err(|err| match err {
                StoreError::TicketGone(_) => LedgerError::NoTicketHeld,
                StoreError::NotFound(id) if id == recipient_id => {
                    LedgerError::RecipientNotFound(id)
                }
                other => LedgerError::Persistence(other),
            })?;

        let notice_result = self
            .notifier
            .send(
                "New lottery ticket!",
                &format!("You received a lottery ticket from {sender_name}!"),
            )
            .await;
        if let Err(err) = &notice_result {
            warn!(recipient_id, %err, "recipient notification failed");
        }

        Ok(TransferReceipt {
            transfer,
            notice: notice_result,
        })
    }

    /// Returns the sender name of an unviewed received ticket, if any.
    ///
    /// Used by the UI shell on startup to offer the "view ticket" prompt.
    pub async fn pending_ticket(&self, user_id: &str) -> Result<Option<String>, LedgerError> {
        let progress = self.store.get_user(user_id).await?;
        Ok(progress.and_then(|p| {
            if p.has_lottery_ticket && !p.ticket_viewed {
                p.received_ticket_from
            } else {
                None
            }
        }))
    }

    /// Marks a received ticket as viewed, clearing the sender reference.
    pub async fn acknowledge_ticket(&self, user_id: &str) -> Result<UserProgress, LedgerError> {
        let lock = self.user_lock(user_id);
        let _guard = lock.lock().await;

        let current = self
            .store
            .get_user(user_id)
            .await?
            .ok_or_else(|| LedgerError::UnknownUser(user_id.to_string()))?;
        let next = current.after_viewing_ticket();
        self.store.put_user(user_id, &next).await?;
        Ok(next)
    }

    /// Explicitly clears the user's ticket flag.
    pub async fn reset_ticket(&self, user_id: &str) -> Result<UserProgress, LedgerError> {
        let lock = self.user_lock(user_id);
        let _guard = lock.lock().await;

        let current = self
            .store
            .get_user(user_id)
            .await?
            .ok_or_else(|| LedgerError::UnknownUser(user_id.to_string()))?;
        let next = current.after_ticket_reset();
        self.store.put_user(user_id, &next).await?;
        Ok(next)
    }

    /// Drains the user's unread ticket notices, marking them read.
    pub async fn take_notices(&self, ctx: &UserContext) -> Result<Vec<TicketNotice>, LedgerError> {
        let lock = self.user_lock(&ctx.user_id);
        let _guard = lock.lock().await;

        let notices = self.store.unread_notices(&ctx.user_id).await?;
        for notice in &notices {
            self.store.mark_notice_read(&notice.id).await?;
        }

        if !notices.is_empty() {
            if let Some(current) = self.store.get_user(&ctx.user_id).await? {
                let mut next = current;
                next.unread_notifications =
                    next.unread_notifications.saturating_sub(notices.len() as u32);
                self.store.put_user(&ctx.user_id, &next).await?;
            }
        }

        Ok(notices)
    }

    /// Returns today's lottery winner, if someone won a ticket today.
    ///
    /// When several users hold a ticket won today, a user named in
    /// `prefer` wins the tie; otherwise the first holder is returned.
    pub async fn todays_winner(
        &self,
        prefer: Option<&str>,
    ) -> Result<Option<UserSummary>, LedgerError> {
        let since = day_start(now_epoch_secs());
        let holders = self.store.ticket_holders_since(since).await?;

        let preferred = prefer.and_then(|id| {
            holders
                .iter()
                .find(|summary| summary.user_id == id)
                .cloned()
        });
        Ok(preferred.or_else(|| holders.into_iter().next()))
    }

    /// Returns the top users by points, descending.
    pub async fn leaderboard(&self, limit: usize) -> Result<Vec<UserSummary>, LedgerError> {
        Ok(self.store.top_users(limit).await?)
    }
}

// ============================================================================
// Tests
// ============================================================================
