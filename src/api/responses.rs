//! API request and response structures

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::state::{InputKind, Snapshot, TimerPhase};

/// Body of the settings write endpoints
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SettingValue<T> {
    pub value: T,
}

/// Current persisted settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SettingsResponse {
    pub duration: u32,
    pub command: String,
}

/// Status response with the timer snapshot
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusResponse {
    pub snapshot: Snapshot,
    pub phase: TimerPhase,
    pub duration: u32,
    pub command: String,
    pub uptime: String,
    pub port: u16,
    pub host: String,
    pub last_action: Option<InputKind>,
    pub last_action_time: Option<DateTime<Utc>>,
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
