//! Completion command execution

use std::{
    env,
    path::{Path, PathBuf},
    process::Stdio,
};

use tokio::{process::Command, runtime::Handle};
use tracing::{debug, error, info, warn};

/// Runs the completion command without waiting for it
pub trait CommandRunner: Send + Sync {
    /// Launch `command` detached. Blank commands are a no-op.
    fn spawn(&self, command: &str) -> Result<(), String>;
}

/// Check whether we are running inside a Flatpak sandbox
pub fn is_flatpak() -> bool {
    env::var_os("FLATPAK_ID").is_some() || Path::new("/.flatpak-info").exists()
}

/// Trim the command and wrap it for the host shell when sandboxed.
/// Returns `None` when there is nothing to run.
pub fn prepare_command(command: &str, sandboxed: bool) -> Option<String> {
    let command = command.trim();
    if command.is_empty() {
        return None;
    }

    if sandboxed {
        Some(format!("flatpak-spawn --host {}", command))
    } else {
        Some(command.to_string())
    }
}

/// Spawns through `sh -c` in a new process group with all stdio discarded
#[derive(Debug, Clone)]
pub struct ShellCommandRunner {
    sandboxed: bool,
    working_dir: Option<PathBuf>,
}

impl ShellCommandRunner {
    /// Detect the sandbox and use `$HOME` as the working directory
    pub fn new() -> Self {
        let sandboxed = is_flatpak();
        if sandboxed {
            info!("Flatpak sandbox detected, commands will run on the host");
        }
        Self {
            sandboxed,
            working_dir: env::var_os("HOME").filter(|home| !home.is_empty()).map(PathBuf::from),
        }
    }

    pub fn with_options(sandboxed: bool, working_dir: Option<PathBuf>) -> Self {
        Self { sandboxed, working_dir }
    }
}

impl Default for ShellCommandRunner {
    fn default() -> Self {
        Self::new()
    }
}

impl CommandRunner for ShellCommandRunner {
    fn spawn(&self, command: &str) -> Result<(), String> {
        let Some(command) = prepare_command(command, self.sandboxed) else {
            debug!("No completion command configured");
            return Ok(());
        };

        let handle = Handle::try_current()
            .map_err(|e| format!("Cannot spawn command outside the runtime: {}", e))?;

        let mut cmd = Command::new("sh");
        cmd.arg("-c")
            .arg(&command)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null());
        if let Some(dir) = &self.working_dir {
            cmd.current_dir(dir);
        }
        #[cfg(unix)]
        cmd.process_group(0);

        let mut child = cmd.spawn().map_err(|e| {
            let msg = format!("Failed to spawn '{}': {}", command, e);
            error!("{}", msg);
            msg
        })?;
        info!("Launched completion command '{}' (pid {:?})", command, child.id());

        // Reap in the background; the result is only logged
        handle.spawn(async move {
            match child.wait().await {
                Ok(status) if status.success() => debug!("Completion command '{}' finished", command),
                Ok(status) => warn!("Completion command '{}' exited with {}", command, status),
                Err(e) => warn!("Failed to wait for completion command '{}': {}", command, e),
            }
        });

        Ok(())
    }
}
