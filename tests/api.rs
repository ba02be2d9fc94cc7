use std::{sync::Arc, time::Duration};

use axum::{
    body::{to_bytes, Body},
    http::{Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use tower::ServiceExt;

use lockin::{
    create_router,
    services::{ManualClock, MemorySessionStore, MemoryStore, TerminalNotifier},
    state::{AppState, Collaborators, ControllerSettings, ModeDurations, PomodoroController},
};

struct TestApp {
    router: Router,
    state: Arc<AppState>,
    clock: Arc<ManualClock>,
}

fn test_app() -> TestApp {
    let clock = Arc::new(ManualClock::new(1_700_000_000_000));
    let settings = ControllerSettings {
        durations: ModeDurations {
            focus_seconds: 60,
            short_break_seconds: 30,
            long_break_seconds: 45,
            long_break_every: 4,
        },
        ..ControllerSettings::default()
    };
    let controller = PomodoroController::new(
        settings,
        Collaborators {
            clock: clock.clone(),
            notifier: Arc::new(TerminalNotifier::new(false)),
            store: Arc::new(MemoryStore::new()),
            sessions: Arc::new(MemorySessionStore::new()),
        },
    );
    let state = Arc::new(AppState::new(
        controller,
        20554,
        "127.0.0.1".to_string(),
        Duration::from_millis(10),
    ));
    TestApp {
        router: create_router(Arc::clone(&state)),
        state,
        clock,
    }
}

async fn send(app: &TestApp, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let request = match body {
        Some(body) => Request::builder()
            .method(method)
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => Request::builder().method(method).uri(uri).body(Body::empty()).unwrap(),
    };

    let response = app.router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };
    (status, value)
}

#[tokio::test]
async fn test_health() {
    let app = test_app();
    let (status, body) = send(&app, "GET", "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn test_start_runs_and_pause_releases_poll() {
    let app = test_app();

    let (status, body) = send(&app, "GET", "/timer", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["timer"]["display"], "01:00");
    assert_eq!(body["polling"], false);

    let (status, body) = send(&app, "POST", "/timer/start", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "applied");
    assert_eq!(body["timer"]["timer"]["is_running"], true);
    assert!(app.state.is_polling());

    app.clock.advance(15_000);
    let (_, body) = send(&app, "GET", "/timer", None).await;
    assert_eq!(body["timer"]["timer"]["remaining_seconds"], 45);
    assert_eq!(body["last_action"], "start");

    let (_, body) = send(&app, "POST", "/timer/pause", None).await;
    assert_eq!(body["timer"]["timer"]["is_running"], false);
    assert!(!app.state.is_polling());
}

#[tokio::test]
async fn test_redundant_actions_are_ignored() {
    let app = test_app();

    let (status, body) = send(&app, "POST", "/timer/pause", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ignored");

    let (status, body) = send(&app, "POST", "/dialog/skip", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ignored");
}

#[tokio::test]
async fn test_switch_mode() {
    let app = test_app();

    let (status, body) = send(&app, "POST", "/timer/mode/short_break", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["timer"]["timer"]["mode"], "short_break");
    assert_eq!(body["timer"]["display"], "00:30");

    let (status, _) = send(&app, "POST", "/timer/mode/nap", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_focus_completion_opens_dialog_and_skip_starts_break() {
    let app = test_app();

    send(&app, "POST", "/timer/start", None).await;
    app.clock.advance(61_000);

    let (_, body) = send(&app, "GET", "/dialog", None).await;
    assert_eq!(body["dialog"]["variant"], "neutral");
    assert_eq!(body["dialog"]["skip_label"], "Continue Session");
    assert!(!app.state.is_polling());

    let (_, body) = send(&app, "GET", "/sessions", None).await;
    assert_eq!(body["sessions"].as_array().unwrap().len(), 1);

    let (_, body) = send(&app, "POST", "/dialog/skip", None).await;
    assert_eq!(body["status"], "applied");
    assert_eq!(body["timer"]["timer"]["mode"], "short_break");
    assert_eq!(body["timer"]["consecutive_skips"], 1);
    assert!(body["timer"]["dialog"].is_null());
}

#[tokio::test]
async fn test_reflect_resets_counter_and_returns_route() {
    let app = test_app();

    send(&app, "POST", "/timer/start", None).await;
    app.clock.advance(61_000);
    send(&app, "GET", "/timer", None).await;

    let (status, body) = send(&app, "POST", "/dialog/reflect", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["reflection_url"], "/reflection?session_id=1");
    assert_eq!(body["timer"]["consecutive_skips"], 0);
    assert_eq!(body["timer"]["timer"]["mode"], "focus");
}

#[tokio::test]
async fn test_task_lifecycle() {
    let app = test_app();

    let (status, task) = send(&app, "POST", "/tasks", Some(json!({ "text": "read chapter 3" }))).await;
    assert_eq!(status, StatusCode::CREATED);
    let id = task["id"].as_u64().unwrap();

    let (status, _) = send(&app, "POST", "/tasks", Some(json!({ "text": "   " }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, task) = send(&app, "POST", &format!("/tasks/{}/toggle", id), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(task["completed"], true);

    let (_, body) = send(&app, "GET", "/tasks", None).await;
    assert_eq!(body["tasks"].as_array().unwrap().len(), 1);

    let (status, _) = send(&app, "DELETE", &format!("/tasks/{}", id), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (status, _) = send(&app, "DELETE", &format!("/tasks/{}", id), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (status, _) = send(&app, "POST", "/tasks/42/toggle", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_poll_completes_session_on_its_own() {
    let app = test_app();

    app.state.start().unwrap();
    assert!(app.state.is_polling());
    app.clock.advance(61_000);
    tokio::time::sleep(Duration::from_millis(100)).await;

    assert_eq!(app.state.sessions().unwrap().len(), 1);
    assert!(!app.state.is_polling());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_poll_tracks_running_state_under_concurrent_toggles() {
    let app = test_app();

    let workers: Vec<_> = (0..8)
        .map(|_| {
            let state = Arc::clone(&app.state);
            tokio::spawn(async move {
                for _ in 0..200 {
                    state.toggle().unwrap();
                    tokio::task::yield_now().await;
                }
            })
        })
        .collect();
    for worker in workers {
        worker.await.unwrap();
    }

    let (_, body) = send(&app, "GET", "/timer", None).await;
    let running = body["timer"]["timer"]["is_running"].as_bool().unwrap();
    assert_eq!(app.state.is_polling(), running);
    assert_eq!(body["polling"], running);

    app.state.start().unwrap();
    assert!(app.state.is_polling());
}
