//! External collaborators
//!
//! Clock, settings persistence and command execution. The timer core never
//! touches these directly; `AppState` wires them in.

pub mod clock;
pub mod command;
pub mod settings;

// Re-export main types
pub use clock::{Clock, ManualClock, SystemClock};
pub use command::{is_flatpak, prepare_command, CommandRunner, ShellCommandRunner};
pub use settings::{JsonFileStore, MemoryStore, SettingsStore, COMMAND_KEY, DURATION_KEY};
