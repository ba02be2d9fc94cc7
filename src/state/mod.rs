//! State management module
//!
//! The timer core (deadline timer, mode selector, escalation tracker, task
//! list), the controller that owns it, and the shared application state.

pub mod app_state;
pub mod controller;
pub mod escalation;
pub mod mode_selector;
pub mod task_list;
pub mod timer_state;

// Re-export main types
pub use app_state::AppState;
pub use controller::{
    Collaborators, CompletionDialog, CompletionEvent, ControllerSettings, PomodoroController,
    TimerSnapshot, Transition,
};
pub use escalation::{variant_for, DialogVariant, DismissPolicy, EscalationTracker};
pub use mode_selector::{ModeDurations, ModeSelector};
pub use task_list::{TaskItem, TaskList};
pub use timer_state::{DeadlineTimer, TickOutcome, TimerMode, TimerState};
