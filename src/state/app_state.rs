//! Host wrapper around the countdown timer

use std::{
    sync::{Arc, Mutex},
    time::Instant,
};
use chrono::{DateTime, Utc};
use serde_json::{json, Value};
use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::services::{
    Clock, CommandRunner, SettingsStore, COMMAND_KEY, DURATION_KEY,
};
use super::{
    CountdownTimer, Device, DeviceEvent, InputKind, Snapshot, DEFAULT_DURATION_SECS,
    MAX_DURATION_SECS,
};

/// Application state shared by the tick task and the HTTP handlers
pub struct AppState {
    /// The timer; every read and transition happens under this one lock
    pub timer: Arc<Mutex<CountdownTimer>>,
    /// Collaborators
    pub clock: Arc<dyn Clock>,
    pub settings: Arc<dyn SettingsStore>,
    pub runner: Arc<dyn CommandRunner>,
    /// Server metadata
    pub start_time: Instant,
    pub port: u16,
    pub host: String,
    /// Last input tracking
    pub last_action: Arc<Mutex<Option<InputKind>>>,
    pub last_action_time: Arc<Mutex<Option<DateTime<Utc>>>>,
    /// Latest snapshot for renderers
    pub snapshot_tx: watch::Sender<Snapshot>,
    /// Keep the receiver alive to prevent channel closure
    pub _snapshot_rx: watch::Receiver<Snapshot>,
}

impl AppState {
    /// Create the state with an idle timer at the default duration.
    /// Call `on_ready` to load the configured duration.
    pub fn new(
        clock: Arc<dyn Clock>,
        settings: Arc<dyn SettingsStore>,
        runner: Arc<dyn CommandRunner>,
        port: u16,
        host: String,
    ) -> Self {
        let mut timer = CountdownTimer::default();
        let initial = timer.poll(clock.now());
        let (snapshot_tx, snapshot_rx) = watch::channel(initial);

        Self {
            timer: Arc::new(Mutex::new(timer)),
            clock,
            settings,
            runner,
            start_time: Instant::now(),
            port,
            host,
            last_action: Arc::new(Mutex::new(None)),
            last_action_time: Arc::new(Mutex::new(None)),
            snapshot_tx,
            _snapshot_rx: snapshot_rx,
        }
    }

    /// Apply a change to the timer under its lock
    fn with_timer<F, R>(&self, f: F) -> Result<R, String>
    where
        F: FnOnce(&mut CountdownTimer) -> R,
    {
        let mut timer = self.timer.lock()
            .map_err(|e| format!("Failed to lock timer: {}", e))?;
        Ok(f(&mut *timer))
    }

    /// Load the duration from settings and publish the first snapshot
    pub fn on_ready(&self) -> Result<Snapshot, String> {
        let duration = self.stored_duration();
        info!("Timer ready with duration {}s", duration);
        self.with_timer(|timer| *timer = CountdownTimer::new(duration))?;
        self.refresh()
    }

    /// Periodic tick from the host scheduler
    pub fn on_tick(&self) -> Result<Snapshot, String> {
        self.refresh()
    }

    /// Dispatch a raw deck event. Unmapped events return the last snapshot
    /// without recomputing it.
    pub fn on_input_event(&self, device: Device, event: DeviceEvent) -> Result<Snapshot, String> {
        let kind = InputKind::from_raw(device, event);
        debug!("Input {:?}/{:?} mapped to {}", device, event, kind);

        match kind {
            InputKind::ShortPress => {
                let now = self.clock.now();
                let phase = self.with_timer(|timer| {
                    timer.toggle_start(now);
                    timer.phase()
                })?;
                info!("Timer toggled, now {:?}", phase);
            }
            InputKind::Hold => {
                self.with_timer(|timer| timer.reset())?;
                info!("Timer reset");
            }
            InputKind::DialCw => self.adjust_duration(1)?,
            InputKind::DialCcw => self.adjust_duration(-1)?,
            InputKind::Other => return Ok(self.current_snapshot()),
        }

        self.record_action(kind);
        self.refresh()
    }

    /// Relative duration change, persisted
    pub fn adjust_duration(&self, delta: i64) -> Result<(), String> {
        let duration = self.with_timer(|timer| {
            timer.adjust_duration(delta);
            timer.duration()
        })?;
        debug!("Duration adjusted by {} to {}s", delta, duration);
        self.persist(DURATION_KEY, json!(duration));
        Ok(())
    }

    /// Absolute duration from the configuration surface, persisted and re-rendered
    pub fn set_duration(&self, value: i64) -> Result<Snapshot, String> {
        let duration = self.with_timer(|timer| {
            timer.set_duration(value);
            timer.duration()
        })?;
        info!("Duration set to {}s", duration);
        self.persist(DURATION_KEY, json!(duration));
        self.refresh()
    }

    /// Store the completion command
    pub fn set_command(&self, command: &str) {
        info!("Completion command set to '{}'", command);
        self.persist(COMMAND_KEY, json!(command));
    }

    /// Configured completion command, empty when unset or malformed
    pub fn command(&self) -> String {
        match self.settings.get(COMMAND_KEY, json!("")) {
            Value::String(command) => command,
            _ => String::new(),
        }
    }

    fn stored_duration(&self) -> u32 {
        self.settings
            .get(DURATION_KEY, json!(DEFAULT_DURATION_SECS))
            .as_u64()
            .map(|d| d.min(u64::from(MAX_DURATION_SECS)) as u32)
            .unwrap_or(DEFAULT_DURATION_SECS)
    }

    fn persist(&self, key: &str, value: Value) {
        if let Err(e) = self.settings.set(key, value) {
            warn!("Failed to persist {}: {}", key, e);
        }
    }

    /// Poll the timer, publish the snapshot and launch the completion
    /// command if this poll is the one that fired
    pub fn refresh(&self) -> Result<Snapshot, String> {
        let now = self.clock.now();
        let snapshot = self.with_timer(|timer| timer.poll(now))?;

        if snapshot.fire {
            info!("Countdown finished");
            self.run_completion_command();
        }

        self.snapshot_tx.send_replace(snapshot.clone());
        Ok(snapshot)
    }

    fn run_completion_command(&self) {
        let command = self.command();
        if let Err(e) = self.runner.spawn(&command) {
            warn!("Completion command failed to launch: {}", e);
        }
    }

    /// Last published snapshot
    pub fn current_snapshot(&self) -> Snapshot {
        self.snapshot_tx.borrow().clone()
    }

    /// Subscribe to snapshot updates
    pub fn subscribe(&self) -> watch::Receiver<Snapshot> {
        self.snapshot_tx.subscribe()
    }

    /// Copy of the current timer
    pub fn get_timer(&self) -> Result<CountdownTimer, String> {
        self.timer.lock()
            .map(|timer| timer.clone())
            .map_err(|e| format!("Failed to lock timer: {}", e))
    }

    fn record_action(&self, kind: InputKind) {
        if let Ok(mut last_action) = self.last_action.lock() {
            *last_action = Some(kind);
        }
        if let Ok(mut last_time) = self.last_action_time.lock() {
            *last_time = Some(Utc::now());
        }
    }

    /// Get last input information
    pub fn get_last_action(&self) -> (Option<InputKind>, Option<DateTime<Utc>>) {
        let last_action = self.last_action.lock().ok().and_then(|a| *a);
        let last_action_time = self.last_action_time.lock().ok().and_then(|t| *t);
        (last_action, last_action_time)
    }

    /// Calculate server uptime as a formatted string
    pub fn get_uptime(&self) -> String {
        let secs = self.start_time.elapsed().as_secs();
        let hours = secs / 3600;
        let minutes = (secs % 3600) / 60;
        let seconds = secs % 60;

        if hours > 0 {
            format!("{}h {}m {}s", hours, minutes, seconds)
        } else if minutes > 0 {
            format!("{}m {}s", minutes, seconds)
        } else {
            format!("{}s", seconds)
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::services::{ManualClock, MemoryStore};
    use crate::state::TimerPhase;

    /// Records commands instead of running them
    #[derive(Default)]
    pub(crate) struct RecordingRunner {
        pub commands: Mutex<Vec<String>>,
    }

    impl CommandRunner for RecordingRunner {
        fn spawn(&self, command: &str) -> Result<(), String> {
            self.commands.lock().unwrap().push(command.to_string());
            Ok(())
        }
    }

    pub(crate) struct Fixture {
        pub state: Arc<AppState>,
        pub clock: Arc<ManualClock>,
        pub settings: Arc<MemoryStore>,
        pub runner: Arc<RecordingRunner>,
    }

    pub(crate) fn fixture() -> Fixture {
        let clock = Arc::new(ManualClock::new(1_000.0));
        let settings = Arc::new(MemoryStore::new());
        let runner = Arc::new(RecordingRunner::default());
        let state = Arc::new(AppState::new(
            clock.clone(),
            settings.clone(),
            runner.clone(),
            0,
            "127.0.0.1".to_string(),
        ));
        Fixture { state, clock, settings, runner }
    }

    fn press(state: &AppState) -> Snapshot {
        state.on_input_event(Device::Key, DeviceEvent::ShortUp).unwrap()
    }

    #[test]
    fn test_ready_uses_default_duration() {
        let f = fixture();
        let snap = f.state.on_ready().unwrap();
        assert_eq!(snap.remaining_seconds, 30);
        assert_eq!(snap.time_string, "00:30");
        assert_eq!(f.state.current_snapshot(), snap);
    }

    #[test]
    fn test_ready_loads_stored_duration() {
        let f = fixture();
        f.settings.set(DURATION_KEY, json!(3725)).unwrap();
        let snap = f.state.on_ready().unwrap();
        assert_eq!(snap.time_string, "01:02:05");
    }

    #[test]
    fn test_malformed_stored_duration_falls_back() {
        let f = fixture();
        f.settings.set(DURATION_KEY, json!("ten minutes")).unwrap();
        assert_eq!(f.state.on_ready().unwrap().remaining_seconds, 30);

        f.settings.set(DURATION_KEY, json!(10_000_000)).unwrap();
        assert_eq!(f.state.on_ready().unwrap().remaining_seconds, MAX_DURATION_SECS);
    }

    #[test]
    fn test_press_cycle() {
        let f = fixture();
        f.state.on_ready().unwrap();

        press(&f.state);
        assert_eq!(f.state.get_timer().unwrap().phase(), TimerPhase::Running);
        f.clock.advance(10.0);
        assert_eq!(f.state.on_tick().unwrap().remaining_seconds, 20);

        press(&f.state);
        assert_eq!(f.state.get_timer().unwrap().phase(), TimerPhase::Paused);
        f.clock.advance(100.0);
        assert_eq!(f.state.on_tick().unwrap().remaining_seconds, 20);

        press(&f.state);
        f.clock.advance(5.0);
        assert_eq!(f.state.on_tick().unwrap().remaining_seconds, 15);

        let snap = f.state.on_input_event(Device::Dial, DeviceEvent::LongTouchPress).unwrap();
        assert_eq!(snap.remaining_seconds, 30);
        assert_eq!(f.state.get_timer().unwrap().phase(), TimerPhase::Idle);
        assert_eq!(f.state.get_last_action().0, Some(InputKind::Hold));
    }

    #[test]
    fn test_completion_command_runs_once() {
        let f = fixture();
        f.state.set_command("notify-send 'time is up'");
        f.state.set_duration(3).unwrap();
        press(&f.state);

        f.clock.advance(3.0);
        assert!(f.state.on_tick().unwrap().fire);
        f.clock.advance(1.0);
        assert!(!f.state.on_tick().unwrap().fire);
        assert!(!f.state.on_tick().unwrap().fire);

        // reset does not re-arm, only the next start does
        f.state.on_input_event(Device::Key, DeviceEvent::HoldStart).unwrap();
        f.state.on_tick().unwrap();
        assert_eq!(f.runner.commands.lock().unwrap().len(), 1);

        press(&f.state);
        f.clock.advance(3.0);
        f.state.on_tick().unwrap();
        assert_eq!(
            *f.runner.commands.lock().unwrap(),
            vec!["notify-send 'time is up'".to_string(); 2]
        );
    }

    #[test]
    fn test_dial_turns_persist_duration() {
        let f = fixture();
        f.state.on_ready().unwrap();

        let snap = f.state.on_input_event(Device::Dial, DeviceEvent::TurnCw).unwrap();
        assert_eq!(snap.remaining_seconds, 31);
        assert_eq!(f.settings.get(DURATION_KEY, json!(0)), json!(31));

        f.state.on_input_event(Device::Dial, DeviceEvent::TurnCcw).unwrap();
        f.state.on_input_event(Device::Dial, DeviceEvent::TurnCcw).unwrap();
        assert_eq!(f.settings.get(DURATION_KEY, json!(0)), json!(29));
    }

    #[test]
    fn test_dial_cannot_go_below_one_second() {
        let f = fixture();
        f.settings.set(DURATION_KEY, json!(1)).unwrap();
        f.state.on_ready().unwrap();
        f.state.on_input_event(Device::Dial, DeviceEvent::TurnCcw).unwrap();
        assert_eq!(f.state.get_timer().unwrap().duration(), 1);
        assert_eq!(f.settings.get(DURATION_KEY, json!(0)), json!(1));
    }

    #[test]
    fn test_unmapped_event_returns_stale_snapshot() {
        let f = fixture();
        f.state.on_ready().unwrap();
        press(&f.state);
        f.clock.advance(5.0);

        let snap = f.state.on_input_event(Device::Key, DeviceEvent::Down).unwrap();
        assert_eq!(snap.remaining_seconds, 30);
        assert_eq!(f.state.get_last_action().0, Some(InputKind::ShortPress));
    }

    #[test]
    fn test_shortening_duration_while_running_fires() {
        let f = fixture();
        f.state.set_command("beep");
        f.state.set_duration(10).unwrap();
        press(&f.state);
        f.clock.advance(8.0);

        let snap = f.state.set_duration(5).unwrap();
        assert_eq!(snap.remaining_seconds, 0);
        assert!(snap.fire);
        assert_eq!(f.runner.commands.lock().unwrap().len(), 1);
    }

    #[test]
    fn test_command_reads_default_when_unset() {
        let f = fixture();
        assert_eq!(f.state.command(), "");
        f.settings.set(COMMAND_KEY, json!(42)).unwrap();
        assert_eq!(f.state.command(), "");
    }

    #[test]
    fn test_subscribers_see_updates() {
        let f = fixture();
        let mut rx = f.state.subscribe();
        f.state.set_duration(90).unwrap();
        assert!(rx.has_changed().unwrap());
        assert_eq!(rx.borrow_and_update().time_string, "01:30");
    }
}
