//! HTTP endpoint handlers

use std::sync::Arc;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
};
use tracing::{error, info, warn};

use crate::state::{AppState, TaskItem, TimerMode, TimerSnapshot, Transition};
use super::responses::{
    ApiResponse, DialogResponse, HealthResponse, NewTaskRequest, ReflectResponse,
    SessionsResponse, StatusResponse, TasksResponse,
};

type ActionResult = Result<(Transition, TimerSnapshot), String>;

fn action_response(action: &str, result: ActionResult) -> Result<Json<ApiResponse>, StatusCode> {
    match result {
        Ok((transition, timer)) => {
            if let Transition::Ignored(reason) = transition {
                info!("{} ignored: {}", action, reason);
            }
            Ok(Json(ApiResponse::from_transition(action, transition, timer)))
        }
        Err(e) => {
            error!("Failed to {}: {}", action, e);
            Err(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}

/// Handle GET /timer - Recompute and return the timer with server metadata
pub async fn timer_status_handler(State(state): State<Arc<AppState>>) -> Result<Json<StatusResponse>, StatusCode> {
    let timer = match state.status() {
        Ok(t) => t,
        Err(e) => {
            error!("Failed to get timer state: {}", e);
            return Err(StatusCode::INTERNAL_SERVER_ERROR);
        }
    };

    let (last_action, last_action_time) = state.get_last_action();

    Ok(Json(StatusResponse {
        timer,
        uptime: state.get_uptime(),
        port: state.port,
        host: state.host.clone(),
        polling: state.is_polling(),
        last_action,
        last_action_time,
    }))
}

/// Handle POST /timer/start
pub async fn start_handler(State(state): State<Arc<AppState>>) -> Result<Json<ApiResponse>, StatusCode> {
    action_response("start", state.start())
}

/// Handle POST /timer/pause
pub async fn pause_handler(State(state): State<Arc<AppState>>) -> Result<Json<ApiResponse>, StatusCode> {
    action_response("pause", state.pause())
}

/// Handle POST /timer/toggle
pub async fn toggle_handler(State(state): State<Arc<AppState>>) -> Result<Json<ApiResponse>, StatusCode> {
    action_response("toggle", state.toggle())
}

/// Handle POST /timer/reset
pub async fn reset_handler(State(state): State<Arc<AppState>>) -> Result<Json<ApiResponse>, StatusCode> {
    action_response("reset", state.reset())
}

/// Handle POST /timer/mode/:mode - Switch between focus and breaks
pub async fn switch_mode_handler(
    State(state): State<Arc<AppState>>,
    Path(mode): Path<String>,
) -> Result<Json<ApiResponse>, StatusCode> {
    let mode = match mode.parse::<TimerMode>() {
        Ok(mode) => mode,
        Err(e) => {
            warn!("Rejected mode switch: {}", e);
            return Err(StatusCode::BAD_REQUEST);
        }
    };
    action_response("switch mode", state.switch_mode(mode))
}

/// Handle GET /dialog - The pending completion dialog, if any
pub async fn dialog_handler(State(state): State<Arc<AppState>>) -> Result<Json<DialogResponse>, StatusCode> {
    match state.status() {
        Ok(timer) => Ok(Json(DialogResponse { dialog: timer.dialog })),
        Err(e) => {
            error!("Failed to get completion dialog: {}", e);
            Err(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}

/// Handle POST /dialog/skip - Continue without a reflection
pub async fn skip_handler(State(state): State<Arc<AppState>>) -> Result<Json<ApiResponse>, StatusCode> {
    action_response("skip reflection", state.skip_reflection())
}

/// Handle POST /dialog/dismiss - Click outside the dialog
pub async fn dismiss_handler(State(state): State<Arc<AppState>>) -> Result<Json<ApiResponse>, StatusCode> {
    action_response("dismiss", state.dismiss_dialog())
}

/// Handle POST /dialog/reflect - Go to the reflection flow
pub async fn reflect_handler(State(state): State<Arc<AppState>>) -> Result<Json<ReflectResponse>, StatusCode> {
    match state.reflect() {
        Ok((reflection_url, timer)) => Ok(Json(ReflectResponse {
            status: "applied".to_string(),
            reflection_url,
            timestamp: chrono::Utc::now(),
            timer,
        })),
        Err(e) => {
            error!("Failed to open reflection flow: {}", e);
            Err(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}

/// Handle DELETE /notices - Clear user-visible notices
pub async fn clear_notices_handler(State(state): State<Arc<AppState>>) -> Result<Json<TimerSnapshot>, StatusCode> {
    state.clear_notices().map(Json).map_err(|e| {
        error!("Failed to clear notices: {}", e);
        StatusCode::INTERNAL_SERVER_ERROR
    })
}

/// Handle GET /tasks
pub async fn list_tasks_handler(State(state): State<Arc<AppState>>) -> Result<Json<TasksResponse>, StatusCode> {
    match state.tasks() {
        Ok(tasks) => Ok(Json(TasksResponse { tasks })),
        Err(e) => {
            error!("Failed to list tasks: {}", e);
            Err(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}

/// Handle POST /tasks - Add a task; blank text is rejected
pub async fn add_task_handler(
    State(state): State<Arc<AppState>>,
    Json(request): Json<NewTaskRequest>,
) -> Result<(StatusCode, Json<TaskItem>), StatusCode> {
    match state.add_task(&request.text) {
        Ok(Some(task)) => Ok((StatusCode::CREATED, Json(task))),
        Ok(None) => Err(StatusCode::BAD_REQUEST),
        Err(e) => {
            error!("Failed to add task: {}", e);
            Err(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}

/// Handle POST /tasks/:id/toggle
pub async fn toggle_task_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<u64>,
) -> Result<Json<TaskItem>, StatusCode> {
    match state.toggle_task(id) {
        Ok(Some(task)) => Ok(Json(task)),
        Ok(None) => Err(StatusCode::NOT_FOUND),
        Err(e) => {
            error!("Failed to toggle task {}: {}", id, e);
            Err(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}

/// Handle DELETE /tasks/:id
pub async fn delete_task_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<u64>,
) -> StatusCode {
    match state.delete_task(id) {
        Ok(true) => StatusCode::NO_CONTENT,
        Ok(false) => StatusCode::NOT_FOUND,
        Err(e) => {
            error!("Failed to delete task {}: {}", id, e);
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

/// Handle GET /sessions - Recorded focus sessions, newest first
pub async fn sessions_handler(State(state): State<Arc<AppState>>) -> Result<Json<SessionsResponse>, StatusCode> {
    match state.sessions() {
        Ok(sessions) => Ok(Json(SessionsResponse { sessions })),
        Err(e) => {
            error!("Failed to list sessions: {}", e);
            Err(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}

/// Handle GET /health - Health check endpoint
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::ok())
}
