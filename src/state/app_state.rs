//! Shared application state
//!
//! Wraps the single `PomodoroController` for use from HTTP handlers and owns
//! the handle of the background tick poll.

use std::{
    sync::{Arc, Mutex},
    time::{Duration, Instant},
};
use chrono::{DateTime, Utc};
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::{
    services::SessionRecord,
    tasks::tick_poll_task,
    utils::format_uptime,
};
use super::{
    controller::{PomodoroController, TimerSnapshot, Transition},
    task_list::TaskItem,
    timer_state::{TickOutcome, TimerMode},
};

#[derive(Debug)]
pub struct AppState {
    controller: Mutex<PomodoroController>,
    /// Running tick poll, present only while the timer runs
    poll_handle: Mutex<Option<JoinHandle<()>>>,
    pub poll_interval: Duration,
    /// Server metadata
    pub start_time: Instant,
    pub port: u16,
    pub host: String,
    /// Last user action tracking
    pub last_action: Mutex<Option<String>>,
    pub last_action_time: Mutex<Option<DateTime<Utc>>>,
}

impl AppState {
    pub fn new(controller: PomodoroController, port: u16, host: String, poll_interval: Duration) -> Self {
        Self {
            controller: Mutex::new(controller),
            poll_handle: Mutex::new(None),
            poll_interval,
            start_time: Instant::now(),
            port,
            host,
            last_action: Mutex::new(None),
            last_action_time: Mutex::new(None),
        }
    }

    /// Run `action` against the controller, then bring the tick poll in line
    /// with whether the timer is running
    fn apply<R, F>(self: &Arc<Self>, action: Option<&str>, f: F) -> Result<(R, TimerSnapshot), String>
    where
        F: FnOnce(&mut PomodoroController) -> R,
    {
        let mut controller = self.controller.lock()
            .map_err(|e| format!("Failed to lock controller: {}", e))?;

        let result = f(&mut controller);
        let snapshot = controller.snapshot();
        // Synced under the controller lock so concurrent actions cannot apply
        // their poll changes out of order. Lock order is controller, then poll.
        self.sync_poll(controller.is_running());
        drop(controller);

        if let Some(action) = action {
            if let Ok(mut last_action) = self.last_action.lock() {
                *last_action = Some(action.to_string());
            }
            if let Ok(mut last_time) = self.last_action_time.lock() {
                *last_time = Some(Utc::now());
            }
        }

        Ok((result, snapshot))
    }

    // The poll handle is released on every path that leaves the timer
    // stopped, including completion from inside the poll itself. Callers hold
    // the controller lock.
    fn sync_poll(self: &Arc<Self>, running: bool) {
        let mut handle = match self.poll_handle.lock() {
            Ok(handle) => handle,
            Err(e) => {
                warn!("Failed to lock poll handle: {}", e);
                return;
            }
        };

        if running {
            let alive = handle.as_ref().is_some_and(|h| !h.is_finished());
            if !alive {
                debug!("Spawning tick poll every {:?}", self.poll_interval);
                *handle = Some(tokio::spawn(tick_poll_task(Arc::clone(self))));
            }
        } else if let Some(poll) = handle.take() {
            debug!("Releasing tick poll");
            poll.abort();
        }
    }

    /// Whether a tick poll is currently scheduled
    pub fn is_polling(&self) -> bool {
        self.poll_handle
            .lock()
            .map(|h| h.as_ref().is_some_and(|h| !h.is_finished()))
            .unwrap_or(false)
    }

    pub fn tick(self: &Arc<Self>) -> Result<TickOutcome, String> {
        self.apply(None, |c| c.tick()).map(|(outcome, _)| outcome)
    }

    /// Recompute and return the current snapshot
    pub fn status(self: &Arc<Self>) -> Result<TimerSnapshot, String> {
        self.apply(None, |c| {
            c.tick();
        })
        .map(|(_, snapshot)| snapshot)
    }

    pub fn start(self: &Arc<Self>) -> Result<(Transition, TimerSnapshot), String> {
        self.apply(Some("start"), |c| c.start())
    }

    pub fn pause(self: &Arc<Self>) -> Result<(Transition, TimerSnapshot), String> {
        self.apply(Some("pause"), |c| c.pause())
    }

    pub fn toggle(self: &Arc<Self>) -> Result<(Transition, TimerSnapshot), String> {
        self.apply(Some("toggle"), |c| c.toggle())
    }

    pub fn reset(self: &Arc<Self>) -> Result<(Transition, TimerSnapshot), String> {
        self.apply(Some("reset"), |c| c.reset())
    }

    pub fn switch_mode(self: &Arc<Self>, mode: TimerMode) -> Result<(Transition, TimerSnapshot), String> {
        self.apply(Some(mode.as_str()), |c| c.switch_mode(mode))
    }

    pub fn skip_reflection(self: &Arc<Self>) -> Result<(Transition, TimerSnapshot), String> {
        self.apply(Some("skip"), |c| c.skip_reflection())
    }

    pub fn dismiss_dialog(self: &Arc<Self>) -> Result<(Transition, TimerSnapshot), String> {
        self.apply(Some("dismiss"), |c| c.dismiss_dialog())
    }

    /// Resolve toward the reflection flow, returning its route
    pub fn reflect(self: &Arc<Self>) -> Result<(String, TimerSnapshot), String> {
        self.apply(Some("reflect"), |c| c.reflect())
    }

    pub fn clear_notices(self: &Arc<Self>) -> Result<TimerSnapshot, String> {
        self.apply(None, |c| c.clear_notices()).map(|(_, snapshot)| snapshot)
    }

    pub fn tasks(&self) -> Result<Vec<TaskItem>, String> {
        self.controller.lock()
            .map(|c| c.tasks().to_vec())
            .map_err(|e| format!("Failed to lock controller: {}", e))
    }

    pub fn add_task(self: &Arc<Self>, text: &str) -> Result<Option<TaskItem>, String> {
        self.apply(Some("add-task"), |c| c.add_task(text)).map(|(item, _)| item)
    }

    pub fn toggle_task(self: &Arc<Self>, id: u64) -> Result<Option<TaskItem>, String> {
        self.apply(Some("toggle-task"), |c| c.toggle_task(id)).map(|(item, _)| item)
    }

    pub fn delete_task(self: &Arc<Self>, id: u64) -> Result<bool, String> {
        self.apply(Some("delete-task"), |c| c.delete_task(id)).map(|(removed, _)| removed)
    }

    pub fn sessions(&self) -> Result<Vec<SessionRecord>, String> {
        self.controller.lock()
            .map_err(|e| format!("Failed to lock controller: {}", e))?
            .sessions()
    }

    pub fn get_uptime(&self) -> String {
        format_uptime(self.start_time.elapsed().as_secs())
    }

    pub fn get_last_action(&self) -> (Option<String>, Option<DateTime<Utc>>) {
        let last_action = self.last_action.lock().ok().and_then(|a| a.clone());
        let last_action_time = self.last_action_time.lock().ok().and_then(|t| *t);
        (last_action, last_action_time)
    }
}
