//! Session timer state machine.
//!
//! This module drives the focus/break countdown:
//! - Phase transitions (Focus ↔ Break)
//! - Countdown with tokio::time::interval at a 1-second cadence
//! - Exactly one completion event per finished focus session
//! - Configuration changes with clamping and preset snapping

use anyhow::{Context, Result};
use tokio::sync::mpsc;
use tokio::time::{interval, Duration, MissedTickBehavior};

use crate::types::{Phase, TimerConfig, TimerState};

// ============================================================================
// TimerEvent
// ============================================================================

/// Timer events consumed by the UI shell and the reward ledger.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TimerEvent {
    /// Countdown started
    Started {
        /// Phase being counted down
        phase: Phase,
    },
    /// Countdown paused, remaining time preserved
    Paused,
    /// Countdown resumed from pause
    Resumed,
    /// Countdown reset to the full phase duration
    Reset,
    /// One second elapsed
    Tick {
        /// Remaining seconds
        remaining_seconds: u32,
    },
    /// A focus session ran to completion.
    ///
    /// Emitted exactly once per Focus phase that reaches zero, and always
    /// before the matching [`TimerEvent::PhaseSwitched`]. Break completion
    /// never produces this event.
    FocusSessionCompleted,
    /// The countdown rolled over into the other phase
    PhaseSwitched {
        /// Phase now being counted down
        phase: Phase,
    },
}

// ============================================================================
// TimerEngine
// ============================================================================

/// Timer engine that owns the countdown state and emits events.
///
/// The engine never performs I/O itself; reward handling subscribes to the
/// event channel, so a slow reward write can never stall the tick loop.
pub struct TimerEngine {
    /// Current timer state
    state: TimerState,
    /// Event sender channel
    event_tx: mpsc::UnboundedSender<TimerEvent>,
}

impl TimerEngine {
    /// Creates a new engine with the given configuration and event channel.
    pub fn new(config: TimerConfig, event_tx: mpsc::UnboundedSender<TimerEvent>) -> Self {
        Self {
            state: TimerState::new(config),
            event_tx,
        }
    }

    /// Runs the tick loop.
    ///
    /// Ticks once per second while the timer is running. Should be spawned
    /// as a separate tokio task; `pause` and `reset` take effect on the next
    /// tick boundary at the latest.
    pub async fn run(&mut self) -> Result<()> {
        let mut ticker = interval(Duration::from_secs(1));
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            ticker.tick().await;

            if !self.state.running {
                continue;
            }

            let completed = self.state.tick();

            self.event_tx
                .send(TimerEvent::Tick {
                    remaining_seconds: self.state.remaining_seconds,
                })
                .context("Failed to send tick event")?;

            if completed {
                self.handle_phase_complete()?;
            }
        }
    }

    /// Handles a countdown reaching zero.
    ///
    /// A completed Focus phase emits `FocusSessionCompleted` synchronously
    /// before the phase switches; a completed Break phase only rolls over.
    fn handle_phase_complete(&mut self) -> Result<()> {
        if self.state.phase == Phase::Focus {
            self.event_tx
                .send(TimerEvent::FocusSessionCompleted)
                .context("Failed to send focus completed event")?;
        }

        self.state.switch_phase();

        self.event_tx
            .send(TimerEvent::PhaseSwitched {
                phase: self.state.phase,
            })
            .context("Failed to send phase switched event")?;

        Ok(())
    }

    /// Starts the countdown. Idempotent while already running.
    pub fn start(&mut self) -> Result<()> {
        if self.state.running {
            return Ok(());
        }

        self.state.start();

        self.event_tx
            .send(TimerEvent::Started {
                phase: self.state.phase,
            })
            .context("Failed to send started event")?;

        Ok(())
    }

    /// Pauses the countdown, preserving the remaining time.
    pub fn pause(&mut self) -> Result<()> {
        if !self.state.running {
            return Ok(());
        }

        self.state.pause();

        self.event_tx
            .send(TimerEvent::Paused)
            .context("Failed to send paused event")?;

        Ok(())
    }

    /// Resumes a paused countdown without resetting the remaining time.
    pub fn resume(&mut self) -> Result<()> {
        if !self.state.is_paused() {
            return Ok(());
        }

        self.state.resume();

        self.event_tx
            .send(TimerEvent::Resumed)
            .context("Failed to send resumed event")?;

        Ok(())
    }

    /// Stops the countdown and restores the current phase's full duration.
    pub fn reset(&mut self) -> Result<()> {
        self.state.reset();

        self.event_tx
            .send(TimerEvent::Reset)
            .context("Failed to send reset event")?;

        Ok(())
    }

    /// Applies new durations, clamping and snapping out-of-range values.
    ///
    /// `None` means "keep the previous value" and is how unparseable input
    /// is handled: pass the result of [`crate::types::parse_minutes`], and
    /// invalid input becomes a silent no-op rather than an error. While the
    /// timer is idle the new duration applies to the countdown immediately.
    ///
    /// The engine does not persist settings. The hosting shell writes the
    /// accepted configuration (read back via [`Self::get_state`]) through
    /// [`crate::cache::ProgressCache::save_timer_config`] after every
    /// change, and restores it with
    /// [`crate::cache::ProgressCache::load_timer_config`] on startup.
    pub fn configure(&mut self, focus_minutes: Option<u32>, break_minutes: Option<u32>) {
        let mut config = self.state.config;
        if let Some(minutes) = focus_minutes {
            config = config.with_focus_minutes(minutes);
        }
        if let Some(minutes) = break_minutes {
            config = config.with_break_minutes(minutes);
        }
        self.state.set_config(config);
    }

    /// Returns a reference to the current timer state.
    pub fn get_state(&self) -> &TimerState {
        &self.state
    }

    /// Returns a mutable reference to the timer state (for testing).
    #[cfg(any(test, feature = "test-utils"))]
    pub fn get_state_mut(&mut self) -> &mut TimerState {
        &mut self.state
    }
}

// ============================================================================
// Tests
// ============================================================================
