//! Deadline-based countdown timer
//!
//! Remaining time is always recomputed from an absolute end timestamp, so a
//! slow or starved poll never makes the countdown drift.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

/// Timer mode (focus or one of the breaks)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimerMode {
    Focus,
    ShortBreak,
    LongBreak,
}

impl TimerMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            TimerMode::Focus => "focus",
            TimerMode::ShortBreak => "short_break",
            TimerMode::LongBreak => "long_break",
        }
    }

    pub fn is_break(&self) -> bool {
        !matches!(self, TimerMode::Focus)
    }
}

impl fmt::Display for TimerMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            TimerMode::Focus => "Focus",
            TimerMode::ShortBreak => "Short break",
            TimerMode::LongBreak => "Long break",
        };
        write!(f, "{label}")
    }
}

impl FromStr for TimerMode {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "focus" | "pomodoro" => Ok(TimerMode::Focus),
            "short_break" | "short-break" => Ok(TimerMode::ShortBreak),
            "long_break" | "long-break" => Ok(TimerMode::LongBreak),
            other => Err(format!("unknown timer mode: {other}")),
        }
    }
}

/// Observable timer state
///
/// While `is_running` is true, `target_end_epoch_ms` is set and
/// `remaining_seconds` is only a display value derived from it. While stopped,
/// `remaining_seconds` is authoritative and there is no deadline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimerState {
    pub mode: TimerMode,
    pub duration_seconds: i64,
    pub target_end_epoch_ms: Option<i64>,
    pub remaining_seconds: i64,
    pub is_running: bool,
}

impl TimerState {
    /// Create a stopped timer holding the full duration
    pub fn new(mode: TimerMode, duration_seconds: i64) -> Self {
        Self {
            mode,
            duration_seconds,
            target_end_epoch_ms: None,
            remaining_seconds: duration_seconds,
            is_running: false,
        }
    }

    /// Fraction of the configured duration already elapsed, in `0.0..=1.0`
    pub fn progress_fraction(&self) -> f32 {
        if self.duration_seconds <= 0 {
            return 1.0;
        }
        let elapsed = self.duration_seconds - self.remaining_seconds;
        (elapsed as f32 / self.duration_seconds as f32).clamp(0.0, 1.0)
    }
}

/// Result of one poll of a running timer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// Timer is not running; nothing changed
    Idle,
    /// Timer is still counting down
    Running { remaining_seconds: i64 },
    /// The deadline passed on this tick. Raised once per run.
    Completed,
}

/// Countdown anchored to an absolute epoch-millisecond deadline
#[derive(Debug, Clone)]
pub struct DeadlineTimer {
    state: TimerState,
    // Authoritative remainder while stopped; keeps the sub-second part a
    // floored `remaining_seconds` would drop on every pause.
    remaining_ms: i64,
}

impl DeadlineTimer {
    pub fn new(mode: TimerMode, duration_seconds: i64) -> Self {
        let duration_seconds = duration_seconds.max(0);
        Self {
            state: TimerState::new(mode, duration_seconds),
            remaining_ms: duration_seconds * 1000,
        }
    }

    pub fn state(&self) -> &TimerState {
        &self.state
    }

    pub fn is_running(&self) -> bool {
        self.state.is_running
    }

    pub fn mode(&self) -> TimerMode {
        self.state.mode
    }

    /// Load a new mode and duration, stopped at full length.
    ///
    /// A running timer is paused first so the elapsed time is captured
    /// before it is discarded.
    pub fn configure(&mut self, mode: TimerMode, duration_seconds: i64, now_ms: i64) {
        if self.state.is_running {
            self.pause(now_ms);
            tracing::debug!(
                "Reconfigured running {} timer with {}ms left",
                self.state.mode,
                self.remaining_ms
            );
        }
        *self = Self::new(mode, duration_seconds);
    }

    /// Start or resume. Returns false when already running.
    pub fn start(&mut self, now_ms: i64) -> bool {
        if self.state.is_running {
            return false;
        }
        if self.remaining_ms <= 0 {
            self.remaining_ms = self.state.duration_seconds * 1000;
        }
        self.state.target_end_epoch_ms = Some(now_ms + self.remaining_ms);
        self.state.remaining_seconds = self.remaining_ms / 1000;
        self.state.is_running = true;
        true
    }

    /// Recompute remaining time from the deadline
    pub fn tick(&mut self, now_ms: i64) -> TickOutcome {
        let Some(target) = self.state.target_end_epoch_ms.filter(|_| self.state.is_running) else {
            return TickOutcome::Idle;
        };

        let remaining_ms = self.clamp_remaining(target - now_ms);
        let remaining_seconds = remaining_ms / 1000;
        if remaining_seconds <= 0 {
            self.state.is_running = false;
            self.state.target_end_epoch_ms = None;
            self.state.remaining_seconds = 0;
            self.remaining_ms = 0;
            return TickOutcome::Completed;
        }

        self.state.remaining_seconds = remaining_seconds;
        TickOutcome::Running { remaining_seconds }
    }

    /// Stop the countdown, keeping what is left. Returns false when not running.
    pub fn pause(&mut self, now_ms: i64) -> bool {
        let Some(target) = self.state.target_end_epoch_ms.filter(|_| self.state.is_running) else {
            return false;
        };

        self.remaining_ms = self.clamp_remaining(target - now_ms);
        self.state.remaining_seconds = self.remaining_ms / 1000;
        self.state.target_end_epoch_ms = None;
        self.state.is_running = false;
        true
    }

    pub fn toggle(&mut self, now_ms: i64) -> bool {
        if self.state.is_running {
            self.pause(now_ms)
        } else {
            self.start(now_ms)
        }
    }

    /// Stop and restore the full duration of the current mode
    pub fn reset(&mut self) {
        let (mode, duration) = (self.state.mode, self.state.duration_seconds);
        *self = Self::new(mode, duration);
    }

    // A backward clock jump can push the deadline further away than the
    // configured duration; never show more than that.
    fn clamp_remaining(&self, remaining_ms: i64) -> i64 {
        remaining_ms.clamp(0, self.state.duration_seconds * 1000)
    }
}
