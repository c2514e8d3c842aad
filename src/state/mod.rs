//! State management module
//!
//! The countdown core, the input mapping, and the host state wrapping them.

pub mod countdown;
pub mod input;
pub mod app_state;

// Re-export main types
pub use countdown::{
    format_remaining, quantize_progress, CountdownTimer, Snapshot, TimerPhase,
    DEFAULT_DURATION_SECS, MAX_DURATION_SECS,
};
pub use input::{Device, DeviceEvent, InputKind};
pub use app_state::AppState;
