//! Mode to duration table and mode switching

use serde::{Deserialize, Serialize};

use super::timer_state::{DeadlineTimer, TimerMode};

/// Configured length of each mode, plus the long-break cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModeDurations {
    pub focus_seconds: i64,
    pub short_break_seconds: i64,
    pub long_break_seconds: i64,
    /// Every Nth completed focus session is followed by a long break
    pub long_break_every: u32,
}

impl Default for ModeDurations {
    fn default() -> Self {
        Self {
            focus_seconds: 25 * 60,
            short_break_seconds: 5 * 60,
            long_break_seconds: 15 * 60,
            long_break_every: 4,
        }
    }
}

impl ModeDurations {
    pub fn duration_for(&self, mode: TimerMode) -> i64 {
        match mode {
            TimerMode::Focus => self.focus_seconds,
            TimerMode::ShortBreak => self.short_break_seconds,
            TimerMode::LongBreak => self.long_break_seconds,
        }
    }
}

/// Owns the duration table and mediates every mode change of the timer
#[derive(Debug, Clone)]
pub struct ModeSelector {
    durations: ModeDurations,
    completed_focus_sessions: u32,
}

impl ModeSelector {
    pub fn new(durations: ModeDurations) -> Self {
        Self {
            durations,
            completed_focus_sessions: 0,
        }
    }

    pub fn durations(&self) -> &ModeDurations {
        &self.durations
    }

    pub fn duration_for(&self, mode: TimerMode) -> i64 {
        self.durations.duration_for(mode)
    }

    pub fn completed_focus_sessions(&self) -> u32 {
        self.completed_focus_sessions
    }

    /// Build a fresh stopped timer for `mode`
    pub fn timer_for(&self, mode: TimerMode) -> DeadlineTimer {
        DeadlineTimer::new(mode, self.duration_for(mode))
    }

    /// Pause the timer if it is running, then load the new mode at full length
    pub fn switch_mode(&self, timer: &mut DeadlineTimer, new_mode: TimerMode, now_ms: i64) {
        if timer.is_running() {
            timer.pause(now_ms);
        }
        timer.configure(new_mode, self.duration_for(new_mode), now_ms);
    }

    /// Count a completed focus session
    pub fn record_focus_completion(&mut self) -> u32 {
        self.completed_focus_sessions += 1;
        self.completed_focus_sessions
    }

    /// The break that follows the most recently completed focus session
    pub fn next_break(&self) -> TimerMode {
        let every = self.durations.long_break_every;
        if every > 0
            && self.completed_focus_sessions > 0
            && self.completed_focus_sessions % every == 0
        {
            TimerMode::LongBreak
        } else {
            TimerMode::ShortBreak
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_duration_table() {
        let selector = ModeSelector::new(ModeDurations::default());
        assert_eq!(selector.duration_for(TimerMode::Focus), 1500);
        assert_eq!(selector.duration_for(TimerMode::ShortBreak), 300);
        assert_eq!(selector.duration_for(TimerMode::LongBreak), 900);
    }

    #[test]
    fn test_switch_mode_while_running_loads_full_new_duration() {
        let selector = ModeSelector::new(ModeDurations::default());
        let mut timer = selector.timer_for(TimerMode::Focus);
        timer.start(0);
        timer.tick(200_000);

        selector.switch_mode(&mut timer, TimerMode::ShortBreak, 200_000);

        let state = timer.state();
        assert!(!state.is_running);
        assert_eq!(state.mode, TimerMode::ShortBreak);
        assert_eq!(state.remaining_seconds, 300);
        assert_eq!(state.target_end_epoch_ms, None);
    }

    #[test]
    fn test_long_break_every_fourth_focus_session() {
        let mut selector = ModeSelector::new(ModeDurations::default());
        let mut breaks = Vec::new();
        for _ in 0..8 {
            selector.record_focus_completion();
            breaks.push(selector.next_break());
        }

        assert_eq!(
            breaks,
            vec![
                TimerMode::ShortBreak,
                TimerMode::ShortBreak,
                TimerMode::ShortBreak,
                TimerMode::LongBreak,
                TimerMode::ShortBreak,
                TimerMode::ShortBreak,
                TimerMode::ShortBreak,
                TimerMode::LongBreak,
            ]
        );
    }

    #[test]
    fn test_zero_cycle_never_picks_long_break() {
        let mut selector = ModeSelector::new(ModeDurations {
            long_break_every: 0,
            ..ModeDurations::default()
        });
        selector.record_focus_completion();
        assert_eq!(selector.next_break(), TimerMode::ShortBreak);
    }
}
