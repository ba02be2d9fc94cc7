//! Pomodoro controller
//!
//! Owns the timer, the mode selector, the escalation tracker and the task
//! list, and wires them to the collaborators. Every operation is total: calls
//! that make no sense in the current state are reported as ignored instead of
//! failing.

use std::sync::Arc;
use chrono::{DateTime, Local, TimeZone};
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::{
    services::{reflection_url, Clock, KeyValueStore, Notifier, SessionRecord, SessionRepository, Tone},
    utils::format_clock,
};
use super::{
    escalation::{DialogVariant, DismissPolicy, EscalationTracker},
    mode_selector::{ModeDurations, ModeSelector},
    task_list::{TaskItem, TaskList},
    timer_state::{DeadlineTimer, TickOutcome, TimerMode, TimerState},
};

/// Produced once when a focus session runs to zero
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompletionEvent {
    pub mode: TimerMode,
    pub session_duration_seconds: i64,
    pub tasks_outstanding: Vec<String>,
    pub tasks_completed: Vec<String>,
    pub completed_at: DateTime<Local>,
}

/// The completion dialog as it should be rendered
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompletionDialog {
    pub variant: DialogVariant,
    pub title: String,
    pub message: String,
    pub reflect_label: String,
    /// Absent when skipping is not offered
    pub skip_label: Option<String>,
    pub dismissible: bool,
    pub session_id: Option<String>,
    pub reflection_url: String,
}

impl CompletionDialog {
    fn new(variant: DialogVariant, session_id: Option<String>, reflection_base: &str) -> Self {
        Self {
            variant,
            title: "Session Complete!".to_string(),
            message: variant.message().to_string(),
            reflect_label: variant.reflect_label().to_string(),
            skip_label: variant.skip_label().map(str::to_string),
            dismissible: variant.dismissible(),
            reflection_url: reflection_url(reflection_base, session_id.as_deref()),
            session_id,
        }
    }
}

/// Whether an operation changed anything
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    Applied,
    Ignored(&'static str),
}

impl Transition {
    pub fn is_applied(&self) -> bool {
        matches!(self, Transition::Applied)
    }
}

/// Everything a client needs to draw the timer page
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TimerSnapshot {
    pub timer: TimerState,
    /// Remaining time as `MM:SS`
    pub display: String,
    pub progress: f32,
    pub completed_focus_sessions: u32,
    pub consecutive_skips: u32,
    pub dialog: Option<CompletionDialog>,
    pub notices: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct ControllerSettings {
    pub durations: ModeDurations,
    pub dismiss_policy: DismissPolicy,
    pub reflection_base: String,
}

impl Default for ControllerSettings {
    fn default() -> Self {
        Self {
            durations: ModeDurations::default(),
            dismiss_policy: DismissPolicy::default(),
            reflection_base: "/reflection".to_string(),
        }
    }
}

#[derive(Clone)]
pub struct Collaborators {
    pub clock: Arc<dyn Clock>,
    pub notifier: Arc<dyn Notifier>,
    pub store: Arc<dyn KeyValueStore>,
    pub sessions: Arc<dyn SessionRepository>,
}

pub struct PomodoroController {
    timer: DeadlineTimer,
    modes: ModeSelector,
    escalation: EscalationTracker,
    tasks: TaskList,
    dialog: Option<CompletionDialog>,
    notices: Vec<String>,
    dismiss_policy: DismissPolicy,
    reflection_base: String,
    collaborators: Collaborators,
}

impl std::fmt::Debug for PomodoroController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PomodoroController")
            .field("timer", self.timer.state())
            .field("consecutive_skips", &self.escalation.consecutive_skips())
            .finish_non_exhaustive()
    }
}

impl PomodoroController {
    pub fn new(settings: ControllerSettings, collaborators: Collaborators) -> Self {
        let modes = ModeSelector::new(settings.durations);
        let store = collaborators.store.as_ref();
        let escalation = EscalationTracker::load(store);
        let tasks = TaskList::load(store);
        debug!(
            "Controller ready: {} consecutive skips, {} tasks",
            escalation.consecutive_skips(),
            tasks.items().len()
        );

        Self {
            timer: modes.timer_for(TimerMode::Focus),
            modes,
            escalation,
            tasks,
            dialog: None,
            notices: Vec::new(),
            dismiss_policy: settings.dismiss_policy,
            reflection_base: settings.reflection_base,
            collaborators,
        }
    }

    fn now_ms(&self) -> i64 {
        self.collaborators.clock.now_ms()
    }

    pub fn timer(&self) -> &TimerState {
        self.timer.state()
    }

    pub fn is_running(&self) -> bool {
        self.timer.is_running()
    }

    pub fn pending_dialog(&self) -> Option<&CompletionDialog> {
        self.dialog.as_ref()
    }

    pub fn consecutive_skips(&self) -> u32 {
        self.escalation.consecutive_skips()
    }

    pub fn notices(&self) -> &[String] {
        &self.notices
    }

    pub fn snapshot(&self) -> TimerSnapshot {
        let timer = self.timer.state().clone();
        TimerSnapshot {
            display: format_clock(timer.remaining_seconds),
            progress: timer.progress_fraction(),
            timer,
            completed_focus_sessions: self.modes.completed_focus_sessions(),
            consecutive_skips: self.escalation.consecutive_skips(),
            dialog: self.dialog.clone(),
            notices: self.notices.clone(),
        }
    }

    // A pending completion dialog freezes the timer until it is resolved. Only
    // reflecting resolves a mandatory one.
    fn dialog_block(&self) -> Option<&'static str> {
        match self.dialog.as_ref()?.variant {
            DialogVariant::Mandatory => Some("reflection is required before continuing"),
            DialogVariant::Neutral | DialogVariant::Nudge => {
                Some("the completion dialog must be resolved first")
            }
        }
    }

    pub fn start(&mut self) -> Transition {
        if let Some(reason) = self.dialog_block() {
            return Transition::Ignored(reason);
        }
        let now = self.now_ms();
        if !self.timer.start(now) {
            return Transition::Ignored("timer is already running");
        }
        info!("{} timer started ({}s left)", self.timer.mode(), self.timer.state().remaining_seconds);
        self.collaborators.notifier.play(Tone::Start);
        Transition::Applied
    }

    pub fn pause(&mut self) -> Transition {
        let now = self.now_ms();
        if !self.timer.pause(now) {
            return Transition::Ignored("timer is not running");
        }
        info!("{} timer paused ({}s left)", self.timer.mode(), self.timer.state().remaining_seconds);
        Transition::Applied
    }

    pub fn toggle(&mut self) -> Transition {
        if self.timer.is_running() {
            self.pause()
        } else {
            self.start()
        }
    }

    /// Stop and restore the current mode's full duration
    pub fn reset(&mut self) -> Transition {
        self.timer.reset();
        info!("{} timer reset", self.timer.mode());
        Transition::Applied
    }

    /// Recompute remaining time; drives completion when the deadline passes
    pub fn tick(&mut self) -> TickOutcome {
        let now = self.now_ms();
        let outcome = self.timer.tick(now);
        if outcome == TickOutcome::Completed {
            self.on_completed(now);
        }
        outcome
    }

    pub fn switch_mode(&mut self, mode: TimerMode) -> Transition {
        if let Some(reason) = self.dialog_block() {
            return Transition::Ignored(reason);
        }
        let now = self.now_ms();
        self.modes.switch_mode(&mut self.timer, mode, now);
        info!("Switched to {} ({}s)", mode, self.timer.state().duration_seconds);
        Transition::Applied
    }

    /// Continue without writing a reflection
    pub fn skip_reflection(&mut self) -> Transition {
        if self.dialog.is_none() {
            return Transition::Ignored("no completion dialog is pending");
        }
        if !self.escalation.on_user_skips(self.collaborators.store.as_ref()) {
            return Transition::Ignored("reflection is required before continuing");
        }
        self.dialog = None;
        self.enter_break();
        Transition::Applied
    }

    /// Head to the reflection flow. Always resets the skip counter and
    /// returns the route to open.
    pub fn reflect(&mut self) -> String {
        self.escalation.on_user_reflects(self.collaborators.store.as_ref());

        let url = match self.dialog.take() {
            Some(dialog) => {
                let now = self.now_ms();
                self.modes.switch_mode(&mut self.timer, TimerMode::Focus, now);
                dialog.reflection_url
            }
            None => reflection_url(&self.reflection_base, None),
        };
        info!("Opening reflection flow at {}", url);
        url
    }

    /// Click outside the completion dialog
    pub fn dismiss_dialog(&mut self) -> Transition {
        let Some(dialog) = &self.dialog else {
            return Transition::Ignored("no completion dialog is pending");
        };
        if !dialog.dismissible {
            return Transition::Ignored("this dialog cannot be dismissed");
        }
        match self.dismiss_policy {
            DismissPolicy::CountsAsSkip => self.skip_reflection(),
            DismissPolicy::Ignored => {
                debug!("Dialog dismissed without counting a skip");
                self.dialog = None;
                self.enter_break();
                Transition::Applied
            }
        }
    }

    pub fn tasks(&self) -> &[TaskItem] {
        self.tasks.items()
    }

    pub fn add_task(&mut self, text: &str) -> Option<TaskItem> {
        self.tasks.add(text, self.collaborators.store.as_ref())
    }

    pub fn toggle_task(&mut self, id: u64) -> Option<TaskItem> {
        self.tasks.toggle(id, self.collaborators.store.as_ref())
    }

    pub fn delete_task(&mut self, id: u64) -> bool {
        self.tasks.delete(id, self.collaborators.store.as_ref())
    }

    pub fn sessions(&self) -> Result<Vec<SessionRecord>, String> {
        self.collaborators.sessions.list()
    }

    pub fn clear_notices(&mut self) {
        self.notices.clear();
    }

    fn enter_break(&mut self) {
        let next = self.modes.next_break();
        let now = self.now_ms();
        self.modes.switch_mode(&mut self.timer, next, now);
        info!("Continuing with {}", next);
    }

    fn on_completed(&mut self, now_ms: i64) {
        self.collaborators.notifier.play(Tone::Complete);
        let mode = self.timer.mode();

        if mode.is_break() {
            info!("{} finished", mode);
            self.collaborators.notifier.toast("Break time is over. Get back to work!");
            self.timer.reset();
            return;
        }

        let event = CompletionEvent {
            mode,
            session_duration_seconds: self.timer.state().duration_seconds,
            tasks_outstanding: self.tasks.outstanding(),
            tasks_completed: self.tasks.completed(),
            completed_at: Local
                .timestamp_millis_opt(now_ms)
                .single()
                .unwrap_or_else(Local::now),
        };
        self.timer.reset();

        let session_id = match self.collaborators.sessions.record(&event) {
            Ok(id) => {
                info!("Focus session recorded as {}", id);
                Some(id)
            }
            Err(e) => {
                warn!("Failed to record focus session: {}", e);
                self.notices.push(format!("Session could not be saved: {}", e));
                None
            }
        };

        let completed = self.modes.record_focus_completion();
        let variant = self.escalation.on_focus_session_complete();
        info!("Focus session #{} complete, showing {:?} dialog", completed, variant);
        self.dialog = Some(CompletionDialog::new(variant, session_id, &self.reflection_base));
    }
}
