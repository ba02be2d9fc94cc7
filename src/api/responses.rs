//! API response structures

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{
    services::SessionRecord,
    state::{CompletionDialog, TaskItem, TimerSnapshot, Transition},
};

/// Response for timer and dialog actions
#[derive(Debug, Clone, Serialize)]
pub struct ApiResponse {
    /// `applied` or `ignored`
    pub status: String,
    pub message: String,
    pub timestamp: DateTime<Utc>,
    pub timer: TimerSnapshot,
}

impl ApiResponse {
    pub fn new(status: &str, message: String, timer: TimerSnapshot) -> Self {
        Self {
            status: status.to_string(),
            message,
            timestamp: Utc::now(),
            timer,
        }
    }

    /// Build a response describing what happened to the requested action
    pub fn from_transition(action: &str, transition: Transition, timer: TimerSnapshot) -> Self {
        match transition {
            Transition::Applied => Self::new("applied", format!("{} applied", action), timer),
            Transition::Ignored(reason) => Self::new("ignored", format!("{} ignored: {}", action, reason), timer),
        }
    }
}

/// Current timer with server metadata
#[derive(Debug, Clone, Serialize)]
pub struct StatusResponse {
    pub timer: TimerSnapshot,
    pub uptime: String,
    pub port: u16,
    pub host: String,
    pub polling: bool,
    pub last_action: Option<String>,
    pub last_action_time: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize)]
pub struct DialogResponse {
    pub dialog: Option<CompletionDialog>,
}

/// Where to send the user for the reflection flow
#[derive(Debug, Clone, Serialize)]
pub struct ReflectResponse {
    pub status: String,
    pub reflection_url: String,
    pub timestamp: DateTime<Utc>,
    pub timer: TimerSnapshot,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewTaskRequest {
    pub text: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct TasksResponse {
    pub tasks: Vec<TaskItem>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SessionsResponse {
    pub sessions: Vec<SessionRecord>,
}

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: DateTime<Utc>,
    pub version: String,
}

impl HealthResponse {
    /// Create a new health response
    pub fn ok() -> Self {
        Self {
            status: "ok".to_string(),
            timestamp: Utc::now(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}
