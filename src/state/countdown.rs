//! Countdown timer state machine
//!
//! Pure timing logic: callers pass the current instant in, nothing here reads
//! a clock, touches settings or spawns processes.

use serde::{Deserialize, Serialize};

/// Largest configurable duration, 99:59:59
pub const MAX_DURATION_SECS: u32 = 99 * 3600 + 59 * 60 + 59;

/// Duration used when nothing has been configured yet
pub const DEFAULT_DURATION_SECS: u32 = 30;

/// Run state derived from the start/pause timestamps
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimerPhase {
    Idle,
    Running,
    Paused,
}

/// Renderable result of a poll
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    /// Whole seconds left, truncated
    pub remaining_seconds: u32,
    /// `HH:MM:SS` or `MM:SS`
    pub time_string: String,
    /// Remaining fraction truncated to two decimals
    pub progress: f64,
    /// Set on exactly one poll per run: the completion action should run now
    pub fire: bool,
}

#[derive(Debug, Clone)]
pub struct CountdownTimer {
    duration: u32,
    start_time: Option<f64>,
    paused_time: Option<f64>,
    completion_fired: bool,
}

impl CountdownTimer {
    /// Create an idle timer. Values above the maximum are clamped; zero is
    /// kept as-is since it only comes from an unconfigured host default.
    pub fn new(duration: u32) -> Self {
        Self {
            duration: duration.min(MAX_DURATION_SECS),
            start_time: None,
            paused_time: None,
            completion_fired: false,
        }
    }

    pub fn duration(&self) -> u32 {
        self.duration
    }

    pub fn completion_fired(&self) -> bool {
        self.completion_fired
    }

    pub fn phase(&self) -> TimerPhase {
        match (self.start_time, self.paused_time) {
            (None, _) => TimerPhase::Idle,
            (Some(_), None) => TimerPhase::Running,
            (Some(_), Some(_)) => TimerPhase::Paused,
        }
    }

    /// Start from idle, pause while running, resume while paused
    pub fn toggle_start(&mut self, now: f64) {
        match (self.start_time, self.paused_time) {
            (None, _) => {
                self.start_time = Some(now);
                self.paused_time = None;
                self.completion_fired = false;
            }
            (Some(_), None) => {
                self.paused_time = Some(now);
            }
            (Some(start), Some(paused)) => {
                // Shift the start forward so the paused span is not counted
                self.start_time = Some(now - (paused - start));
                self.paused_time = None;
            }
        }
    }

    /// Back to idle. The completion latch is left alone; only a fresh start
    /// clears it, so a reset right after completion cannot re-fire.
    pub fn reset(&mut self) {
        self.start_time = None;
        self.paused_time = None;
    }

    /// Relative change, e.g. one dial detent. Applies in every phase; the
    /// start time is untouched so remaining time follows the new duration.
    pub fn adjust_duration(&mut self, delta: i64) {
        self.set_duration(i64::from(self.duration).saturating_add(delta));
    }

    /// Absolute change from a configuration field
    pub fn set_duration(&mut self, value: i64) {
        self.duration = value.clamp(1, i64::from(MAX_DURATION_SECS)) as u32;
    }

    /// Seconds elapsed in the current run, pauses excluded
    pub fn elapsed(&self, now: f64) -> f64 {
        match (self.start_time, self.paused_time) {
            (None, _) => 0.0,
            (Some(start), None) => now - start,
            (Some(start), Some(paused)) => paused - start,
        }
    }

    /// Fractional seconds left, never negative
    pub fn remaining(&self, now: f64) -> f64 {
        (f64::from(self.duration) - self.elapsed(now)).max(0.0)
    }

    /// Compute the snapshot for `now`. The only mutation is the completion
    /// latch, which is checked and set in the same call.
    pub fn poll(&mut self, now: f64) -> Snapshot {
        let remaining = self.remaining(now);
        let remaining_seconds = remaining.trunc() as u32;

        let mut progress = if self.duration > 0 {
            remaining / f64::from(self.duration)
        } else {
            1.0
        };
        if remaining_seconds == 0 {
            progress = 0.0;
        }

        let mut fire = false;
        if progress == 0.0 && !self.completion_fired {
            fire = true;
            self.completion_fired = true;
        }

        Snapshot {
            remaining_seconds,
            time_string: format_remaining(remaining_seconds),
            progress: quantize_progress(progress),
            fire,
        }
    }
}

impl Default for CountdownTimer {
    fn default() -> Self {
        Self::new(DEFAULT_DURATION_SECS)
    }
}

/// Format whole seconds as "HH:MM:SS" when an hour or more is left, else "MM:SS"
pub fn format_remaining(remaining: u32) -> String {
    let hours = remaining / 3600;
    let minutes = (remaining - hours * 3600) / 60;
    let seconds = remaining - hours * 3600 - minutes * 60;

    if hours > 0 {
        format!("{:02}:{:02}:{:02}", hours, minutes, seconds)
    } else {
        format!("{:02}:{:02}", minutes, seconds)
    }
}

/// Truncate to two decimals. Truncation, not rounding: 0.129 -> 0.12
pub fn quantize_progress(progress: f64) -> f64 {
    (progress * 100.0).floor() / 100.0
}
