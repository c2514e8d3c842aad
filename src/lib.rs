//! Countdown Key - a countdown timer control for a deck key or dial
//!
//! The timer core tracks start/pause/resume/reset, reports remaining time and
//! progress on every tick, and signals exactly once per run when the countdown
//! reaches zero so the host can launch the completion command.

pub mod config;
pub mod state;
pub mod api;
pub mod services;
pub mod tasks;
pub mod utils;

// Re-export commonly used types
pub use config::Config;
pub use state::{AppState, CountdownTimer, Snapshot};
pub use api::create_router;
pub use utils::signals::shutdown_signal;
