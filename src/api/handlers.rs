//! HTTP endpoint handlers

use std::sync::Arc;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
};
use tracing::{error, info, warn};

use crate::state::{AppState, Device, DeviceEvent, Snapshot};
use super::responses::{HealthResponse, SettingValue, SettingsResponse, StatusResponse};

/// Handle POST /input/:device/:event - Dispatch a deck event
pub async fn input_handler(
    State(state): State<Arc<AppState>>,
    Path((device, event)): Path<(String, String)>,
) -> Result<Json<Snapshot>, StatusCode> {
    let (device, event) = match (device.parse::<Device>(), event.parse::<DeviceEvent>()) {
        (Ok(device), Ok(event)) => (device, event),
        (Err(e), _) | (_, Err(e)) => {
            warn!("Rejected input: {}", e);
            return Err(StatusCode::BAD_REQUEST);
        }
    };

    match state.on_input_event(device, event) {
        Ok(snapshot) => Ok(Json(snapshot)),
        Err(e) => {
            error!("Failed to handle input: {}", e);
            Err(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}

/// Handle GET /settings - Return the persisted settings
pub async fn settings_handler(State(state): State<Arc<AppState>>) -> Result<Json<SettingsResponse>, StatusCode> {
    let timer = state.get_timer().map_err(|e| {
        error!("Failed to get timer: {}", e);
        StatusCode::INTERNAL_SERVER_ERROR
    })?;

    Ok(Json(SettingsResponse {
        duration: timer.duration(),
        command: state.command(),
    }))
}

/// Handle PUT /settings/duration - Set the duration, clamped
pub async fn duration_handler(
    State(state): State<Arc<AppState>>,
    Json(body): Json<SettingValue<i64>>,
) -> Result<Json<Snapshot>, StatusCode> {
    match state.set_duration(body.value) {
        Ok(snapshot) => {
            info!("Duration updated via settings");
            Ok(Json(snapshot))
        }
        Err(e) => {
            error!("Failed to set duration: {}", e);
            Err(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}

/// Handle PUT /settings/command - Set the completion command
pub async fn command_handler(
    State(state): State<Arc<AppState>>,
    Json(body): Json<SettingValue<String>>,
) -> Json<SettingsResponse> {
    state.set_command(&body.value);
    let duration = state.get_timer().map(|t| t.duration()).unwrap_or_default();

    Json(SettingsResponse {
        duration,
        command: state.command(),
    })
}

/// Handle GET /status - Return the last snapshot and timer details
pub async fn status_handler(State(state): State<Arc<AppState>>) -> Result<Json<StatusResponse>, StatusCode> {
    let timer = match state.get_timer() {
        Ok(t) => t,
        Err(e) => {
            error!("Failed to get timer: {}", e);
            return Err(StatusCode::INTERNAL_SERVER_ERROR);
        }
    };

    let (last_action, last_action_time) = state.get_last_action();

    Ok(Json(StatusResponse {
        snapshot: state.current_snapshot(),
        phase: timer.phase(),
        duration: timer.duration(),
        command: state.command(),
        uptime: state.get_uptime(),
        port: state.port,
        host: state.host.clone(),
        last_action,
        last_action_time,
    }))
}

/// Handle GET /health - Health check endpoint
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::ok())
}

#[cfg(test)]
mod tests {
    use axum::{
        body::{self, Body},
        http::Request,
        Router,
    };
    use serde::de::DeserializeOwned;
    use tower::ServiceExt;

    use crate::api::create_router;
    use crate::state::app_state::tests::{fixture, Fixture};
    use crate::state::{InputKind, TimerPhase};
    use super::*;

    fn test_app() -> (Router, Fixture) {
        let f = fixture();
        f.state.on_ready().expect("ready");
        (create_router(Arc::clone(&f.state)), f)
    }

    async fn send<T: DeserializeOwned>(app: &Router, request: Request<Body>) -> (StatusCode, Option<T>) {
        let response = app.clone().oneshot(request).await.expect("response");
        let status = response.status();
        let body = body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body");
        (status, serde_json::from_slice(&body).ok())
    }

    fn post(uri: &str) -> Request<Body> {
        Request::post(uri).body(Body::empty()).expect("request")
    }

    fn put_json(uri: &str, json: serde_json::Value) -> Request<Body> {
        Request::put(uri)
            .header("content-type", "application/json")
            .body(Body::from(json.to_string()))
            .expect("request")
    }

    #[tokio::test]
    async fn health_reports_ok() {
        let (app, _f) = test_app();
        let request = Request::get("/health").body(Body::empty()).expect("request");
        let (status, body) = send::<HealthResponse>(&app, request).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body.expect("json").status, "ok");
    }

    #[tokio::test]
    async fn press_starts_and_status_reports_running() {
        let (app, f) = test_app();

        let (status, snap) = send::<Snapshot>(&app, post("/input/key/short-up")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(snap.expect("json").remaining_seconds, 30);

        f.clock.advance(12.0);
        f.state.on_tick().expect("tick");

        let request = Request::get("/status").body(Body::empty()).expect("request");
        let (status, body) = send::<StatusResponse>(&app, request).await;
        assert_eq!(status, StatusCode::OK);
        let body = body.expect("json");
        assert_eq!(body.phase, TimerPhase::Running);
        assert_eq!(body.snapshot.time_string, "00:18");
        assert_eq!(body.last_action, Some(InputKind::ShortPress));
    }

    #[tokio::test]
    async fn unknown_input_names_are_rejected() {
        let (app, _f) = test_app();
        let (status, _) = send::<Snapshot>(&app, post("/input/knob/short-up")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        let (status, _) = send::<Snapshot>(&app, post("/input/key/double-tap")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn dial_turn_updates_settings() {
        let (app, _f) = test_app();
        let (_, snap) = send::<Snapshot>(&app, post("/input/dial/turn-cw")).await;
        assert_eq!(snap.expect("json").remaining_seconds, 31);

        let request = Request::get("/settings").body(Body::empty()).expect("request");
        let (_, settings) = send::<SettingsResponse>(&app, request).await;
        assert_eq!(settings.expect("json").duration, 31);
    }

    #[tokio::test]
    async fn settings_writes_clamp_and_persist() {
        let (app, f) = test_app();

        let (status, snap) =
            send::<Snapshot>(&app, put_json("/settings/duration", serde_json::json!({ "value": 0 }))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(snap.expect("json").remaining_seconds, 1);

        let (_, snap) = send::<Snapshot>(
            &app,
            put_json("/settings/duration", serde_json::json!({ "value": 400_000 })),
        )
        .await;
        assert_eq!(snap.expect("json").time_string, "99:59:59");

        let (_, settings) = send::<SettingsResponse>(
            &app,
            put_json("/settings/command", serde_json::json!({ "value": "paplay bell.oga" })),
        )
        .await;
        let settings = settings.expect("json");
        assert_eq!(settings.command, "paplay bell.oga");
        assert_eq!(settings.duration, 359_999);
        assert_eq!(f.state.command(), "paplay bell.oga");
    }
}
