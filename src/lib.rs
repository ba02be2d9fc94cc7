//! LockIn - A deadline-based Pomodoro timer served over HTTP
//!
//! This library provides the timer core (deadline timer, mode selector and
//! reflection escalation), the collaborator capabilities it talks through,
//! and the HTTP surface that drives it.

pub mod config;
pub mod state;
pub mod api;
pub mod services;
pub mod tasks;
pub mod utils;

// Re-export commonly used types
pub use config::Config;
pub use state::{AppState, PomodoroController};
pub use api::create_router;
pub use utils::signals::shutdown_signal;
