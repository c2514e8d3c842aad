//! Configuration and CLI argument handling

use std::{env, path::PathBuf, time::Duration};

use clap::Parser;

/// CLI argument parsing structure
#[derive(Parser, Debug)]
#[command(name = "countdown-key")]
#[command(about = "Countdown timer control for a deck key or dial")]
#[command(version)]
pub struct Config {
    /// Port to bind the server to
    #[arg(short, long, default_value = "20554")]
    pub port: u16,

    /// Host address to bind to
    #[arg(long, default_value = "127.0.0.1")]
    pub host: String,

    /// Settings file (defaults to ~/.config/countdown-key/settings.json)
    #[arg(short, long)]
    pub settings: Option<PathBuf>,

    /// Keep settings in memory only
    #[arg(long, conflicts_with = "settings")]
    pub no_persist: bool,

    /// Tick interval in milliseconds
    #[arg(long, default_value = "1000", value_parser = clap::value_parser!(u64).range(10..))]
    pub tick_ms: u64,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,
}

impl Config {
    /// Parse configuration from command line arguments
    pub fn parse() -> Self {
        Parser::parse()
    }

    /// Get the server address as a formatted string
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Get the appropriate log level based on verbose flag
    pub fn log_level(&self) -> &'static str {
        if self.verbose { "debug" } else { "info" }
    }

    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_ms)
    }

    /// Resolve the settings file, `None` when persistence is off or no
    /// home directory is known
    pub fn settings_path(&self) -> Option<PathBuf> {
        if self.no_persist {
            return None;
        }
        if let Some(path) = &self.settings {
            return Some(path.clone());
        }
        let home = env::var_os("HOME").filter(|home| !home.is_empty())?;
        Some(
            PathBuf::from(home)
                .join(".config")
                .join("countdown-key")
                .join("settings.json"),
        )
    }
}
