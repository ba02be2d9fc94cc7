//! HTTP API module
//!
//! The event surface of the timer: every button a client can press maps to
//! one endpoint here.

pub mod handlers;
pub mod responses;

use std::sync::Arc;
use axum::{
    routing::{delete, get, post},
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::state::AppState;
use handlers::*;

/// Create the HTTP router with all endpoints
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/timer", get(timer_status_handler))
        .route("/timer/start", post(start_handler))
        .route("/timer/pause", post(pause_handler))
        .route("/timer/toggle", post(toggle_handler))
        .route("/timer/reset", post(reset_handler))
        .route("/timer/mode/:mode", post(switch_mode_handler))
        .route("/dialog", get(dialog_handler))
        .route("/dialog/skip", post(skip_handler))
        .route("/dialog/dismiss", post(dismiss_handler))
        .route("/dialog/reflect", post(reflect_handler))
        .route("/notices", delete(clear_notices_handler))
        .route("/tasks", get(list_tasks_handler).post(add_task_handler))
        .route("/tasks/:id/toggle", post(toggle_task_handler))
        .route("/tasks/:id", delete(delete_task_handler))
        .route("/sessions", get(sessions_handler))
        .route("/health", get(health_handler))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
