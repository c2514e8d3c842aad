//! Background tasks module
//!
//! Tasks spawned next to the HTTP server; currently only the timer tick.

pub mod tick;

pub use tick::tick_task;
