//! Countdown Key - a countdown timer control for a deck key or dial
//!
//! This is the main entry point for the countdown-key service.

use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{info, warn};

use countdown_key::{
    config::Config,
    services::{JsonFileStore, MemoryStore, SettingsStore, ShellCommandRunner, SystemClock},
    state::AppState,
    api::create_router,
    tasks::tick_task,
    utils::shutdown_signal,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::parse();

    // Initialize tracing with appropriate log level
    tracing_subscriber::fmt()
        .with_env_filter(format!("countdown_key={},tower_http=info", config.log_level()))
        .init();

    info!("Starting countdown-key v{}", env!("CARGO_PKG_VERSION"));

    let settings: Arc<dyn SettingsStore> = match config.settings_path() {
        Some(path) => {
            info!("Settings file: {}", path.display());
            Arc::new(JsonFileStore::open(path))
        }
        None => {
            warn!("Settings are not persisted");
            Arc::new(MemoryStore::new())
        }
    };

    let state = Arc::new(AppState::new(
        Arc::new(SystemClock),
        settings,
        Arc::new(ShellCommandRunner::new()),
        config.port,
        config.host.clone(),
    ));
    if let Err(e) = state.on_ready() {
        anyhow::bail!("Failed to initialize timer: {}", e);
    }

    // Start the tick background task
    let tick_state = Arc::clone(&state);
    let period = config.tick_interval();
    tokio::spawn(async move {
        tick_task(tick_state, period).await;
    });

    let app = create_router(state);

    let addr = config.address();
    let listener = TcpListener::bind(&addr).await?;

    info!("Server running on http://{}", addr);
    info!("Endpoints:");
    info!("  POST /input/:device/:event - Deck input (key|dial, short-up, hold-start, turn-cw, ...)");
    info!("  GET  /settings             - Current duration and command");
    info!("  PUT  /settings/duration    - Set duration in seconds");
    info!("  PUT  /settings/command     - Set completion command");
    info!("  GET  /status               - Timer snapshot and state");
    info!("  GET  /health               - Health check");

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
