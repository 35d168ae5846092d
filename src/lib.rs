//! Gamified Pomodoro Core Library
//!
//! This library provides the core functionality for a gamified Pomodoro
//! focus timer. It includes:
//! - Timer engine driving focus/break sessions with a 1 Hz tick loop
//! - Reward ledger for points, session counts and lottery tickets
//! - Document store seam with an in-process reference backend
//! - Atomic ticket transfers between users with recipient notices
//! - Notification dispatch seam for reward and ticket alerts
//! - Local cache for timer settings and the daily ticket snapshot
//!
//! The timer produces events; the ledger consumes focus-session
//! completions and maintains per-user progress. A UI shell wires the two
//! together over the channel the timer engine is constructed with.

pub mod cache;
pub mod identity;
pub mod ledger;
pub mod notify;
pub mod store;
pub mod timer;
pub mod types;

// Re-export commonly used types for convenience
pub use types::{
    Phase, Rank, TicketNotice, TicketTransfer, TimerConfig, TimerState, UserProgress, UserSummary,
    POINTS_PER_SESSION, SESSIONS_FOR_TICKET,
};

// Re-export timer engine types
pub use timer::{TimerEngine, TimerEvent};

// Re-export ledger types
pub use ledger::{LedgerError, RewardLedger, SessionReward, TransferReceipt};

// Re-export store types
pub use store::{DocumentStore, MemoryStore, StoreError};

// Re-export notification types
pub use notify::{LogSender, MockNotificationSender, NotificationSender, NotifyError};

// Re-export identity and cache types
pub use identity::{AuthSession, UserContext};

pub use cache::{CacheError, ProgressCache};
