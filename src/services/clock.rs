//! Time sources

use std::sync::Mutex;

use chrono::Utc;

/// Wall-clock source in fractional seconds
pub trait Clock: Send + Sync {
    fn now(&self) -> f64;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> f64 {
        Utc::now().timestamp_micros() as f64 / 1_000_000.0
    }
}

/// Clock that only moves when told to
#[derive(Debug, Default)]
pub struct ManualClock {
    now: Mutex<f64>,
}

impl ManualClock {
    pub fn new(start: f64) -> Self {
        Self { now: Mutex::new(start) }
    }

    pub fn set(&self, now: f64) {
        if let Ok(mut current) = self.now.lock() {
            *current = now;
        }
    }

    pub fn advance(&self, seconds: f64) {
        if let Ok(mut current) = self.now.lock() {
            *current += seconds;
        }
    }
}

impl Clock for ManualClock {
    fn now(&self) -> f64 {
        self.now.lock().map(|now| *now).unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_manual_clock() {
        let clock = ManualClock::new(10.0);
        assert_eq!(clock.now(), 10.0);
        clock.advance(2.5);
        assert_eq!(clock.now(), 12.5);
        clock.set(1.0);
        assert_eq!(clock.now(), 1.0);
    }

    #[test]
    fn test_system_clock_moves_forward() {
        let clock = SystemClock;
        let first = clock.now();
        assert!(first > 1_600_000_000.0);
        assert!(clock.now() >= first);
    }
}
