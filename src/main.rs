//! LockIn - A deadline-based Pomodoro timer served over HTTP
//!
//! This is the main entry point for the lockin application.

use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::info;

use lockin::{
    config::Config,
    state::{AppState, Collaborators, PomodoroController},
    api::create_router,
    services::{
        JsonFileStore, JsonlSessionStore, KeyValueStore, MemorySessionStore, MemoryStore,
        SessionRepository, SystemClock, TerminalNotifier,
    },
    utils::shutdown_signal,
};

type Stores = (Arc<dyn KeyValueStore>, Arc<dyn SessionRepository>);

fn open_stores(config: &Config) -> anyhow::Result<Stores> {
    if config.ephemeral {
        info!("Ephemeral mode: tasks, skip counter and sessions are kept in memory");
        return Ok((Arc::new(MemoryStore::new()), Arc::new(MemorySessionStore::new())));
    }

    let data_dir = config.resolved_data_dir();
    std::fs::create_dir_all(&data_dir)?;
    info!("Data directory: {}", data_dir.display());

    let store = JsonFileStore::open(data_dir.join("local.json")).map_err(anyhow::Error::msg)?;
    let sessions =
        JsonlSessionStore::open(data_dir.join("sessions.jsonl")).map_err(anyhow::Error::msg)?;
    Ok((Arc::new(store), Arc::new(sessions)))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::parse();

    // Initialize tracing with appropriate log level
    tracing_subscriber::fmt()
        .with_env_filter(format!("lockin={},tower_http=info", config.log_level()))
        .init();

    if let Err(e) = config.validate() {
        tracing::error!("Invalid configuration: {}", e);
        std::process::exit(2);
    }

    info!("Starting lockin server v{}", env!("CARGO_PKG_VERSION"));
    info!(
        "Configuration: host={}, port={}, focus={}min, short={}min, long={}min every {}",
        config.host,
        config.port,
        config.focus_minutes,
        config.short_break_minutes,
        config.long_break_minutes,
        config.long_break_every
    );

    let (store, sessions) = open_stores(&config)?;

    let controller = PomodoroController::new(
        config.controller_settings(),
        Collaborators {
            clock: Arc::new(SystemClock),
            notifier: Arc::new(TerminalNotifier::new(!config.quiet)),
            store,
            sessions,
        },
    );

    // Create application state; the tick poll is spawned on first start
    let state = Arc::new(AppState::new(
        controller,
        config.port,
        config.host.clone(),
        config.poll_interval(),
    ));

    // Create HTTP router with all endpoints
    let app = create_router(state);

    // Bind to the specified address
    let addr = config.address();
    let listener = TcpListener::bind(&addr).await?;

    info!("Server running on http://{}", addr);
    info!("Endpoints:");
    info!("  GET    /timer             - Current timer, dialog and notices");
    info!("  POST   /timer/start       - Start the countdown");
    info!("  POST   /timer/pause       - Pause the countdown");
    info!("  POST   /timer/toggle      - Start or pause");
    info!("  POST   /timer/reset       - Back to the full duration");
    info!("  POST   /timer/mode/:mode  - focus | short_break | long_break");
    info!("  GET    /dialog            - Pending completion dialog");
    info!("  POST   /dialog/skip       - Skip the reflection");
    info!("  POST   /dialog/reflect    - Go to the reflection flow");
    info!("  POST   /dialog/dismiss    - Click outside the dialog");
    info!("  GET    /tasks             - List tasks (POST to add)");
    info!("  GET    /sessions          - Recorded focus sessions");
    info!("  GET    /health            - Health check");

    // Setup graceful shutdown
    let server = axum::serve(listener, app);

    tokio::select! {
        result = server => {
            if let Err(e) = result {
                tracing::error!("Server error: {}", e);
            }
        }
        _ = shutdown_signal() => {
            info!("Shutdown signal received");
        }
    }

    info!("Server shutdown complete");
    Ok(())
}
