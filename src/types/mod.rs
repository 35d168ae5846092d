//! Core data types for the gamified focus timer.
//!
//! This module defines the data structures used for:
//! - Timer phase and state management
//! - Timer configuration with clamping and preset snapping
//! - Per-user progress records (points, sessions, streaks, tickets)
//! - Rank derivation from accumulated points
//! - Ticket transfer and notice records

use serde::{Deserialize, Serialize};
use std::time::{SystemTime, UNIX_EPOCH};

// ============================================================================
// Constants
// ============================================================================

/// Number of completed focus sessions required to win a lottery ticket.
pub const SESSIONS_FOR_TICKET: u32 = 3;

/// Points awarded per completed focus session (fixed, no variable scoring).
pub const POINTS_PER_SESSION: u64 = 25;

/// Allowed break durations in minutes. Break input snaps to the nearest.
pub const BREAK_PRESETS: [u32; 6] = [0, 1, 2, 3, 5, 10];

/// Maximum length of a ticket transfer message, in characters.
pub const MAX_TRANSFER_MESSAGE_LEN: usize = 100;

/// Seconds in a UTC calendar day.
const SECONDS_PER_DAY: u64 = 86_400;

// ============================================================================
// Time helpers
// ============================================================================

/// Returns the current time as seconds since the Unix epoch.
pub fn now_epoch_secs() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

/// Returns the UTC day number for an epoch-seconds timestamp.
///
/// Two timestamps share a day number exactly when they fall on the same
/// UTC calendar day.
pub fn epoch_day(epoch_secs: u64) -> u64 {
    epoch_secs / SECONDS_PER_DAY
}

/// Returns the first second of the UTC day containing the given timestamp.
pub fn day_start(epoch_secs: u64) -> u64 {
    epoch_day(epoch_secs) * SECONDS_PER_DAY
}

// ============================================================================
// Phase
// ============================================================================

/// The two alternating countdown modes of the timer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    /// Focused work session
    Focus,
    /// Break between focus sessions
    Break,
}

impl Phase {
    /// Returns the string representation of the phase.
    pub fn as_str(&self) -> &'static str {
        match self {
            Phase::Focus => "focus",
            Phase::Break => "break",
        }
    }

    /// Returns the other phase.
    pub fn toggled(&self) -> Self {
        match self {
            Phase::Focus => Phase::Break,
            Phase::Break => Phase::Focus,
        }
    }
}

impl Default for Phase {
    fn default() -> Self {
        Phase::Focus
    }
}

// ============================================================================
// TimerConfig
// ============================================================================

/// Configuration for the focus timer.
///
/// Out-of-range inputs are clamped rather than rejected: focus duration is
/// limited to 1-120 minutes and break duration snaps to the nearest preset
/// in [`BREAK_PRESETS`]. Unparseable input never produces an error; the
/// previous value is retained by the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimerConfig {
    /// Focus duration in minutes (clamped to 1-120)
    pub focus_minutes: u32,
    /// Break duration in minutes (snapped to a preset)
    pub break_minutes: u32,
}

impl Default for TimerConfig {
    fn default() -> Self {
        Self {
            focus_minutes: 25,
            break_minutes: 5,
        }
    }
}

impl TimerConfig {
    /// Clamps a focus duration to the valid 1-120 minute range.
    pub fn clamp_focus_minutes(minutes: u32) -> u32 {
        minutes.clamp(1, 120)
    }

    /// Snaps a break duration to the nearest preset.
    ///
    /// Ties resolve to the smaller preset: an input of 4 snaps to 3, and an
    /// input of 7 snaps to 5.
    pub fn snap_break_minutes(minutes: u32) -> u32 {
        let mut best = BREAK_PRESETS[0];
        for preset in BREAK_PRESETS {
            if preset.abs_diff(minutes) < best.abs_diff(minutes) {
                best = preset;
            }
        }
        best
    }

    /// Returns a copy with the focus duration replaced (clamped).
    pub fn with_focus_minutes(mut self, minutes: u32) -> Self {
        self.focus_minutes = Self::clamp_focus_minutes(minutes);
        self
    }

    /// Returns a copy with the break duration replaced (snapped).
    pub fn with_break_minutes(mut self, minutes: u32) -> Self {
        self.break_minutes = Self::snap_break_minutes(minutes);
        self
    }

    /// Returns the configured duration of a phase, in seconds.
    pub fn phase_seconds(&self, phase: Phase) -> u32 {
        match phase {
            Phase::Focus => self.focus_minutes * 60,
            Phase::Break => self.break_minutes * 60,
        }
    }
}

/// Parses a minutes value from free-form user input.
///
/// Returns `None` for non-numeric input, in which case the caller keeps the
/// previous value. Best-effort UI input handling; never an error.
pub fn parse_minutes(input: &str) -> Option<u32> {
    input.trim().parse::<u32>().ok()
}

// ============================================================================
// TimerState
// ============================================================================

/// Represents the current state of the countdown.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimerState {
    /// Current phase of the timer
    pub phase: Phase,
    /// Remaining seconds in the current phase
    pub remaining_seconds: u32,
    /// Whether the countdown is actively ticking
    pub running: bool,
    /// Timer configuration
    pub config: TimerConfig,
    /// True after a pause, until the next fresh start or reset
    #[serde(default)]
    paused: bool,
}

impl TimerState {
    /// Creates a new state in the Focus phase, idle, at the full duration.
    pub fn new(config: TimerConfig) -> Self {
        Self {
            phase: Phase::Focus,
            remaining_seconds: config.phase_seconds(Phase::Focus),
            running: false,
            config,
            paused: false,
        }
    }

    /// Starts the countdown.
    ///
    /// A fresh start (not preceded by a pause) resets the remaining time to
    /// the current phase's configured duration. Idempotent while running.
    pub fn start(&mut self) {
        if self.running {
            return;
        }
        if !self.paused {
            self.remaining_seconds = self.config.phase_seconds(self.phase);
        }
        self.paused = false;
        self.running = true;
    }

    /// Pauses the countdown, preserving the remaining time. Idempotent.
    pub fn pause(&mut self) {
        if self.running {
            self.running = false;
            self.paused = true;
        }
    }

    /// Resumes a paused countdown without resetting the remaining time.
    pub fn resume(&mut self) {
        if self.paused {
            self.paused = false;
            self.running = true;
        }
    }

    /// Stops the countdown and restores the current phase's full duration.
    pub fn reset(&mut self) {
        self.running = false;
        self.paused = false;
        self.remaining_seconds = self.config.phase_seconds(self.phase);
    }

    /// Decrements the countdown by one second.
    ///
    /// Returns true when the countdown reaches zero. Does nothing while the
    /// timer is not running; the remaining time never goes negative.
    pub fn tick(&mut self) -> bool {
        if !self.running {
            return false;
        }
        if self.remaining_seconds > 0 {
            self.remaining_seconds -= 1;
        }
        self.remaining_seconds == 0
    }

    /// Switches to the other phase and restores its full duration.
    pub fn switch_phase(&mut self) {
        self.phase = self.phase.toggled();
        self.remaining_seconds = self.config.phase_seconds(self.phase);
        self.paused = false;
    }

    /// Applies a new configuration.
    ///
    /// While the timer is idle, the current phase's new duration takes
    /// effect immediately; while running or paused, the countdown keeps its
    /// remaining time and the new duration applies from the next phase.
    pub fn set_config(&mut self, config: TimerConfig) {
        self.config = config;
        if !self.running && !self.paused {
            self.remaining_seconds = config.phase_seconds(self.phase);
        }
    }

    /// Returns true if the timer is paused (stopped with time preserved).
    pub fn is_paused(&self) -> bool {
        self.paused
    }
}

// ============================================================================
// Rank
// ============================================================================

/// A point-threshold-derived label with no functional effect beyond display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Rank {
    /// Fewer than 100 points
    Beginner,
    /// 100 points or more
    Intermediate,
    /// 250 points or more
    Advanced,
    /// 500 points or more
    Expert,
    /// 1000 points or more
    Master,
}

impl Rank {
    /// Derives the rank for a point total. Total over all non-negative inputs.
    pub fn from_points(points: u64) -> Self {
        if points >= 1000 {
            Rank::Master
        } else if points >= 500 {
            Rank::Expert
        } else if points >= 250 {
            Rank::Advanced
        } else if points >= 100 {
            Rank::Intermediate
        } else {
            Rank::Beginner
        }
    }

    /// Returns the display label of the rank.
    pub fn as_str(&self) -> &'static str {
        match self {
            Rank::Beginner => "Beginner",
            Rank::Intermediate => "Intermediate",
            Rank::Advanced => "Advanced",
            Rank::Expert => "Expert",
            Rank::Master => "Master",
        }
    }
}

impl std::fmt::Display for Rank {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// UserProgress
// ============================================================================

/// Persistent per-user progress record.
///
/// Owned by the document store; one record per user, created on first
/// authentication. All timestamps are seconds since the Unix epoch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProgress {
    /// Display name shown to other users
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub display_name: Option<String>,
    /// Accumulated points (monotonically non-decreasing except via reset)
    pub points: u64,
    /// Completed focus sessions
    pub completed_sessions: u32,
    /// Consecutive-session streak
    pub current_streak: u32,
    /// `completed_sessions % SESSIONS_FOR_TICKET`
    pub ticket_progress: u32,
    /// Whether the user currently holds a lottery ticket (at most one)
    pub has_lottery_ticket: bool,
    /// Display name of the sender of a received ticket, cleared on view
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub received_ticket_from: Option<String>,
    /// Whether a received ticket has been viewed
    #[serde(default)]
    pub ticket_viewed: bool,
    /// Total tickets ever received from other users
    #[serde(default)]
    pub tickets_received: u32,
    /// Unread ticket notices awaiting the user
    #[serde(default)]
    pub unread_notifications: u32,
    /// Timestamp of the most recent completed session
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub last_session_at: Option<u64>,
    /// Timestamp of the most recent self-won ticket
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub last_ticket_won_at: Option<u64>,
    /// Record creation timestamp
    pub created_at: u64,
}

impl UserProgress {
    /// Creates a zeroed record for a newly authenticated user.
    pub fn new(display_name: Option<String>, created_at: u64) -> Self {
        Self {
            display_name,
            points: 0,
            completed_sessions: 0,
            current_streak: 0,
            ticket_progress: 0,
            has_lottery_ticket: false,
            received_ticket_from: None,
            ticket_viewed: false,
            tickets_received: 0,
            unread_notifications: 0,
            last_session_at: None,
            last_ticket_won_at: None,
            created_at,
        }
    }

    /// Returns the rank derived from the current point total.
    pub fn rank(&self) -> Rank {
        Rank::from_points(self.points)
    }

    /// Folds one completed focus session into the record.
    ///
    /// Returns the new snapshot and whether this session won a ticket, i.e.
    /// the session count wrapped around a multiple of
    /// [`SESSIONS_FOR_TICKET`]. The input snapshot is left untouched.
    pub fn after_completed_session(&self, now: u64) -> (Self, bool) {
        let completed = self.completed_sessions + 1;
        let ticket_progress = completed % SESSIONS_FOR_TICKET;
        let ticket_won = ticket_progress == 0;

        let mut next = Self {
            points: self.points + POINTS_PER_SESSION,
            completed_sessions: completed,
            current_streak: self.current_streak + 1,
            ticket_progress,
            last_session_at: Some(now),
            ..self.clone()
        };
        if ticket_won {
            next.has_lottery_ticket = true;
            next.last_ticket_won_at = Some(now);
        }
        (next, ticket_won)
    }

    /// Folds an outgoing ticket transfer into the sender's record.
    pub fn after_sending_ticket(&self) -> Self {
        Self {
            has_lottery_ticket: false,
            ..self.clone()
        }
    }

    /// Folds an incoming ticket transfer into the recipient's record.
    pub fn after_receiving_ticket(&self, sender_name: &str) -> Self {
        Self {
            has_lottery_ticket: true,
            received_ticket_from: Some(sender_name.to_string()),
            ticket_viewed: false,
            tickets_received: self.tickets_received + 1,
            unread_notifications: self.unread_notifications + 1,
            ..self.clone()
        }
    }

    /// Marks a received ticket as viewed and clears the sender reference.
    pub fn after_viewing_ticket(&self) -> Self {
        Self {
            received_ticket_from: None,
            ticket_viewed: true,
            ..self.clone()
        }
    }

    /// Explicitly clears the ticket flag.
    pub fn after_ticket_reset(&self) -> Self {
        Self {
            has_lottery_ticket: false,
            ..self.clone()
        }
    }
}

// ============================================================================
// UserSummary
// ============================================================================

/// Read-only projection of a user record for leaderboard and winner views.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserSummary {
    /// Stable user id
    pub user_id: String,
    /// Display name, if the user set one
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub display_name: Option<String>,
    /// Accumulated points
    pub points: u64,
    /// Derived rank
    pub rank: Rank,
    /// Completed focus sessions
    pub completed_sessions: u32,
    /// Whether the user currently holds a ticket
    pub has_lottery_ticket: bool,
}

impl UserSummary {
    /// Builds a summary from a progress record.
    pub fn from_progress(user_id: &str, progress: &UserProgress) -> Self {
        Self {
            user_id: user_id.to_string(),
            display_name: progress.display_name.clone(),
            points: progress.points,
            rank: progress.rank(),
            completed_sessions: progress.completed_sessions,
            has_lottery_ticket: progress.has_lottery_ticket,
        }
    }
}

// ============================================================================
// TicketTransfer
// ============================================================================

/// Record of a completed ticket transfer.
///
/// Created at send time and not retained as mutable state; a
/// fire-and-forget side effect record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TicketTransfer {
    /// Unique transfer id
    pub id: String,
    /// Sending user id
    pub sender_id: String,
    /// Receiving user id
    pub recipient_id: String,
    /// Sender display name, as shown to the recipient
    pub sender_name: String,
    /// Optional message from the sender (at most 100 characters)
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub message: Option<String>,
    /// Transfer timestamp
    pub sent_at: u64,
}

// ============================================================================
// TicketNotice
// ============================================================================

/// Persisted notification document for a received ticket.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TicketNotice {
    /// Unique notice id
    pub id: String,
    /// Receiving user id
    pub recipient_id: String,
    /// Sending user id
    pub sender_id: String,
    /// Sender display name
    pub sender_name: String,
    /// Human-readable notice message
    pub message: String,
    /// Whether the notice is still unread
    pub unread: bool,
    /// Notice creation timestamp
    pub created_at: u64,
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    // ------------------------------------------------------------------------
    // Phase Tests
    // ------------------------------------------------------------------------

    mod phase_tests {
        use super::*;

        #[test]
        fn test_default_is_focus() {
            assert_eq!(Phase::default(), Phase::Focus);
        }

        #[test]
        fn test_as_str() {
            assert_eq!(Phase::Focus.as_str(), "focus");
            assert_eq!(Phase::Break.as_str(), "break");
        }

        #[test]
        fn test_toggled() {
            assert_eq!(Phase::Focus.toggled(), Phase::Break);
            assert_eq!(Phase::Break.toggled(), Phase::Focus);
        }

        #[test]
        fn test_serialize_deserialize() {
            let json = serde_json::to_string(&Phase::Focus).unwrap();
            assert_eq!(json, "\"focus\"");
            let phase: Phase = serde_json::from_str("\"break\"").unwrap();
            assert_eq!(phase, Phase::Break);
        }
    }

    // ------------------------------------------------------------------------
    // TimerConfig Tests
    // ------------------------------------------------------------------------

    mod timer_config_tests {
        use super::*;

        #[test]
        fn test_default_values() {
            let config = TimerConfig::default();
            assert_eq!(config.focus_minutes, 25);
            assert_eq!(config.break_minutes, 5);
        }

        #[test]
        fn test_clamp_focus_minutes() {
            assert_eq!(TimerConfig::clamp_focus_minutes(0), 1);
            assert_eq!(TimerConfig::clamp_focus_minutes(1), 1);
            assert_eq!(TimerConfig::clamp_focus_minutes(25), 25);
            assert_eq!(TimerConfig::clamp_focus_minutes(120), 120);
            assert_eq!(TimerConfig::clamp_focus_minutes(121), 120);
            assert_eq!(TimerConfig::clamp_focus_minutes(10_000), 120);
        }

        #[test]
        fn test_snap_break_minutes_exact() {
            for preset in BREAK_PRESETS {
                assert_eq!(TimerConfig::snap_break_minutes(preset), preset);
            }
        }

        #[test]
        fn test_snap_break_minutes_seven_resolves_to_five() {
            assert_eq!(TimerConfig::snap_break_minutes(7), 5);
        }

        #[test]
        fn test_snap_break_minutes_ties_resolve_down() {
            // 4 is equidistant from 3 and 5
            assert_eq!(TimerConfig::snap_break_minutes(4), 3);
        }

        #[test]
        fn test_snap_break_minutes_large_input() {
            assert_eq!(TimerConfig::snap_break_minutes(60), 10);
        }

        #[test]
        fn test_with_focus_minutes_clamps() {
            let config = TimerConfig::default().with_focus_minutes(500);
            assert_eq!(config.focus_minutes, 120);
        }

        #[test]
        fn test_with_break_minutes_snaps() {
            let config = TimerConfig::default().with_break_minutes(8);
            assert_eq!(config.break_minutes, 10);
        }

        #[test]
        fn test_phase_seconds() {
            let config = TimerConfig::default();
            assert_eq!(config.phase_seconds(Phase::Focus), 25 * 60);
            assert_eq!(config.phase_seconds(Phase::Break), 5 * 60);
        }

        #[test]
        fn test_parse_minutes_valid() {
            assert_eq!(parse_minutes("25"), Some(25));
            assert_eq!(parse_minutes("  7 "), Some(7));
            assert_eq!(parse_minutes("0"), Some(0));
        }

        #[test]
        fn test_parse_minutes_invalid() {
            assert_eq!(parse_minutes("abc"), None);
            assert_eq!(parse_minutes(""), None);
            assert_eq!(parse_minutes("-5"), None);
            assert_eq!(parse_minutes("2.5"), None);
        }

        #[test]
        fn test_serialize_deserialize() {
            let config = TimerConfig {
                focus_minutes: 45,
                break_minutes: 10,
            };
            let json = serde_json::to_string(&config).unwrap();
            assert!(json.contains("\"focusMinutes\":45"));
            let back: TimerConfig = serde_json::from_str(&json).unwrap();
            assert_eq!(back, config);
        }
    }

    // ------------------------------------------------------------------------
    // TimerState Tests
    // ------------------------------------------------------------------------

    mod timer_state_tests {
        use super::*;

        #[test]
        fn test_new_state() {
            let state = TimerState::new(TimerConfig::default());
            assert_eq!(state.phase, Phase::Focus);
            assert_eq!(state.remaining_seconds, 25 * 60);
            assert!(!state.running);
            assert!(!state.is_paused());
        }

        #[test]
        fn test_start_fresh_resets_remaining() {
            let mut state = TimerState::new(TimerConfig::default());
            state.remaining_seconds = 10;
            state.start();
            assert!(state.running);
            assert_eq!(state.remaining_seconds, 25 * 60);
        }

        #[test]
        fn test_start_is_idempotent_while_running() {
            let mut state = TimerState::new(TimerConfig::default());
            state.start();
            state.remaining_seconds = 100;
            state.start();
            assert!(state.running);
            assert_eq!(state.remaining_seconds, 100);
        }

        #[test]
        fn test_start_after_pause_preserves_remaining() {
            let mut state = TimerState::new(TimerConfig::default());
            state.start();
            state.remaining_seconds = 300;
            state.pause();
            state.start();
            assert!(state.running);
            assert_eq!(state.remaining_seconds, 300);
        }

        #[test]
        fn test_pause_preserves_remaining() {
            let mut state = TimerState::new(TimerConfig::default());
            state.start();
            state.remaining_seconds = 1000;
            state.pause();
            assert!(!state.running);
            assert!(state.is_paused());
            assert_eq!(state.remaining_seconds, 1000);
        }

        #[test]
        fn test_pause_twice_same_as_once() {
            let mut state = TimerState::new(TimerConfig::default());
            state.start();
            state.remaining_seconds = 42;
            state.pause();
            let snapshot = state.clone();
            state.pause();
            assert_eq!(state.running, snapshot.running);
            assert_eq!(state.is_paused(), snapshot.is_paused());
            assert_eq!(state.remaining_seconds, snapshot.remaining_seconds);
        }

        #[test]
        fn test_pause_while_idle_does_nothing() {
            let mut state = TimerState::new(TimerConfig::default());
            state.pause();
            assert!(!state.is_paused());
        }

        #[test]
        fn test_resume() {
            let mut state = TimerState::new(TimerConfig::default());
            state.start();
            state.remaining_seconds = 500;
            state.pause();
            state.resume();
            assert!(state.running);
            assert_eq!(state.remaining_seconds, 500);
        }

        #[test]
        fn test_resume_while_not_paused_does_nothing() {
            let mut state = TimerState::new(TimerConfig::default());
            state.resume();
            assert!(!state.running);
        }

        #[test]
        fn test_reset() {
            let mut state = TimerState::new(TimerConfig::default());
            state.start();
            state.remaining_seconds = 17;
            state.reset();
            assert!(!state.running);
            assert!(!state.is_paused());
            assert_eq!(state.remaining_seconds, 25 * 60);
        }

        #[test]
        fn test_tick_counts_down() {
            let mut state = TimerState::new(TimerConfig::default());
            state.start();
            state.remaining_seconds = 2;

            assert!(!state.tick());
            assert_eq!(state.remaining_seconds, 1);
            assert!(state.tick());
            assert_eq!(state.remaining_seconds, 0);
        }

        #[test]
        fn test_tick_never_goes_negative() {
            let mut state = TimerState::new(TimerConfig::default());
            state.start();
            state.remaining_seconds = 0;
            assert!(state.tick());
            assert_eq!(state.remaining_seconds, 0);
        }

        #[test]
        fn test_tick_while_not_running_is_noop() {
            let mut state = TimerState::new(TimerConfig::default());
            state.remaining_seconds = 10;
            assert!(!state.tick());
            assert_eq!(state.remaining_seconds, 10);
        }

        #[test]
        fn test_tick_monotone_until_zero() {
            let mut state = TimerState::new(TimerConfig::default());
            state.start();
            state.remaining_seconds = 30;
            let mut prev = state.remaining_seconds;
            for _ in 0..30 {
                state.tick();
                assert!(state.remaining_seconds <= prev);
                prev = state.remaining_seconds;
            }
            assert_eq!(state.remaining_seconds, 0);
        }

        #[test]
        fn test_switch_phase() {
            let mut state = TimerState::new(TimerConfig::default());
            state.switch_phase();
            assert_eq!(state.phase, Phase::Break);
            assert_eq!(state.remaining_seconds, 5 * 60);
            state.switch_phase();
            assert_eq!(state.phase, Phase::Focus);
            assert_eq!(state.remaining_seconds, 25 * 60);
        }

        #[test]
        fn test_set_config_while_idle_applies_immediately() {
            let mut state = TimerState::new(TimerConfig::default());
            state.set_config(TimerConfig::default().with_focus_minutes(45));
            assert_eq!(state.remaining_seconds, 45 * 60);
        }

        #[test]
        fn test_set_config_while_running_keeps_remaining() {
            let mut state = TimerState::new(TimerConfig::default());
            state.start();
            state.remaining_seconds = 100;
            state.set_config(TimerConfig::default().with_focus_minutes(45));
            assert_eq!(state.remaining_seconds, 100);
        }

        #[test]
        fn test_set_config_while_paused_keeps_remaining() {
            let mut state = TimerState::new(TimerConfig::default());
            state.start();
            state.remaining_seconds = 100;
            state.pause();
            state.set_config(TimerConfig::default().with_focus_minutes(45));
            assert_eq!(state.remaining_seconds, 100);
        }
    }

    // ------------------------------------------------------------------------
    // Rank Tests
    // ------------------------------------------------------------------------

    mod rank_tests {
        use super::*;

        #[test]
        fn test_thresholds() {
            assert_eq!(Rank::from_points(0), Rank::Beginner);
            assert_eq!(Rank::from_points(99), Rank::Beginner);
            assert_eq!(Rank::from_points(100), Rank::Intermediate);
            assert_eq!(Rank::from_points(249), Rank::Intermediate);
            assert_eq!(Rank::from_points(250), Rank::Advanced);
            assert_eq!(Rank::from_points(499), Rank::Advanced);
            assert_eq!(Rank::from_points(500), Rank::Expert);
            assert_eq!(Rank::from_points(999), Rank::Expert);
            assert_eq!(Rank::from_points(1000), Rank::Master);
            assert_eq!(Rank::from_points(u64::MAX), Rank::Master);
        }

        #[test]
        fn test_display() {
            assert_eq!(Rank::Beginner.to_string(), "Beginner");
            assert_eq!(Rank::Master.to_string(), "Master");
        }

        #[test]
        fn test_ordering() {
            assert!(Rank::Beginner < Rank::Intermediate);
            assert!(Rank::Expert < Rank::Master);
        }
    }

    // ------------------------------------------------------------------------
    // UserProgress Tests
    // ------------------------------------------------------------------------

    mod user_progress_tests {
        use super::*;

        fn user() -> UserProgress {
            UserProgress::new(Some("Alice".to_string()), 1000)
        }

        #[test]
        fn test_new_record_is_zeroed() {
            let progress = user();
            assert_eq!(progress.points, 0);
            assert_eq!(progress.completed_sessions, 0);
            assert_eq!(progress.ticket_progress, 0);
            assert!(!progress.has_lottery_ticket);
            assert_eq!(progress.rank(), Rank::Beginner);
        }

        #[test]
        fn test_after_completed_session_awards_points() {
            let (next, won) = user().after_completed_session(2000);
            assert_eq!(next.points, 25);
            assert_eq!(next.completed_sessions, 1);
            assert_eq!(next.current_streak, 1);
            assert_eq!(next.ticket_progress, 1);
            assert_eq!(next.last_session_at, Some(2000));
            assert!(!won);
            assert!(!next.has_lottery_ticket);
        }

        #[test]
        fn test_third_session_wins_ticket() {
            let mut progress = user();
            progress.completed_sessions = 2;
            progress.points = 50;
            progress.ticket_progress = 2;

            let (next, won) = progress.after_completed_session(3000);
            assert!(won);
            assert_eq!(next.completed_sessions, 3);
            assert_eq!(next.points, 75);
            assert_eq!(next.ticket_progress, 0);
            assert!(next.has_lottery_ticket);
            assert_eq!(next.last_ticket_won_at, Some(3000));
        }

        #[test]
        fn test_ticket_every_three_sessions() {
            let mut progress = user();
            let mut wins = 0;
            for i in 0..9 {
                let (next, won) = progress.after_completed_session(1000 + i);
                if won {
                    wins += 1;
                }
                progress = next;
            }
            assert_eq!(wins, 3);
            assert_eq!(progress.completed_sessions, 9);
            assert_eq!(progress.points, 225);
        }

        #[test]
        fn test_after_completed_session_leaves_input_untouched() {
            let progress = user();
            let _ = progress.after_completed_session(2000);
            assert_eq!(progress.points, 0);
            assert_eq!(progress.completed_sessions, 0);
        }

        #[test]
        fn test_after_sending_ticket_clears_flag() {
            let mut progress = user();
            progress.has_lottery_ticket = true;
            let next = progress.after_sending_ticket();
            assert!(!next.has_lottery_ticket);
            // Everything else untouched
            assert_eq!(next.points, progress.points);
        }

        #[test]
        fn test_after_receiving_ticket() {
            let progress = user();
            let next = progress.after_receiving_ticket("Bob");
            assert!(next.has_lottery_ticket);
            assert_eq!(next.received_ticket_from, Some("Bob".to_string()));
            assert!(!next.ticket_viewed);
            assert_eq!(next.tickets_received, 1);
            assert_eq!(next.unread_notifications, 1);
        }

        #[test]
        fn test_after_viewing_ticket_clears_sender() {
            let progress = user().after_receiving_ticket("Bob");
            let next = progress.after_viewing_ticket();
            assert!(next.ticket_viewed);
            assert_eq!(next.received_ticket_from, None);
            // The ticket itself stays
            assert!(next.has_lottery_ticket);
        }

        #[test]
        fn test_after_ticket_reset() {
            let mut progress = user();
            progress.has_lottery_ticket = true;
            assert!(!progress.after_ticket_reset().has_lottery_ticket);
        }

        #[test]
        fn test_serialize_uses_camel_case() {
            let progress = user();
            let json = serde_json::to_string(&progress).unwrap();
            assert!(json.contains("\"completedSessions\""));
            assert!(json.contains("\"hasLotteryTicket\""));
            assert!(json.contains("\"createdAt\""));
        }

        #[test]
        fn test_deserialize_defaults_optional_fields() {
            let json = r#"{
                "points": 75,
                "completedSessions": 3,
                "currentStreak": 3,
                "ticketProgress": 0,
                "hasLotteryTicket": true,
                "createdAt": 1000
            }"#;
            let progress: UserProgress = serde_json::from_str(json).unwrap();
            assert_eq!(progress.points, 75);
            assert!(progress.has_lottery_ticket);
            assert_eq!(progress.received_ticket_from, None);
            assert_eq!(progress.tickets_received, 0);
        }
    }

    // ------------------------------------------------------------------------
    // UserSummary Tests
    // ------------------------------------------------------------------------

    mod user_summary_tests {
        use super::*;

        #[test]
        fn test_from_progress() {
            let mut progress = UserProgress::new(Some("Alice".to_string()), 0);
            progress.points = 600;
            progress.completed_sessions = 24;
            progress.has_lottery_ticket = true;

            let summary = UserSummary::from_progress("user-a", &progress);
            assert_eq!(summary.user_id, "user-a");
            assert_eq!(summary.display_name, Some("Alice".to_string()));
            assert_eq!(summary.points, 600);
            assert_eq!(summary.rank, Rank::Expert);
            assert!(summary.has_lottery_ticket);
        }
    }

    // ------------------------------------------------------------------------
    // Time Helper Tests
    // ------------------------------------------------------------------------

    mod time_tests {
        use super::*;

        #[test]
        fn test_epoch_day() {
            assert_eq!(epoch_day(0), 0);
            assert_eq!(epoch_day(86_399), 0);
            assert_eq!(epoch_day(86_400), 1);
        }

        #[test]
        fn test_day_start() {
            assert_eq!(day_start(86_401), 86_400);
            assert_eq!(day_start(86_400), 86_400);
        }

        #[test]
        fn test_now_epoch_secs_is_recent() {
            // Well past 2020-01-01
            assert!(now_epoch_secs() > 1_577_836_800);
        }
    }
}
