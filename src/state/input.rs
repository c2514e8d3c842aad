//! Input events and their mapping onto timer actions

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

/// Physical control that produced an event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Device {
    Key,
    Dial,
}

/// Raw event as reported by the deck
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DeviceEvent {
    Down,
    Up,
    ShortUp,
    ShortTouchPress,
    LongTouchPress,
    HoldStart,
    HoldStop,
    TurnCw,
    TurnCcw,
}

/// Semantic action the timer understands
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum InputKind {
    ShortPress,
    Hold,
    DialCw,
    DialCcw,
    Other,
}

impl InputKind {
    pub fn from_raw(device: Device, event: DeviceEvent) -> Self {
        use Device::*;
        use DeviceEvent::*;

        match (device, event) {
            (Key, ShortUp) | (Dial, ShortUp) | (Dial, ShortTouchPress) => InputKind::ShortPress,
            (Key, HoldStart) | (Dial, HoldStart) | (Dial, LongTouchPress) => InputKind::Hold,
            (Dial, TurnCw) => InputKind::DialCw,
            (Dial, TurnCcw) => InputKind::DialCcw,
            _ => InputKind::Other,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            InputKind::ShortPress => "short-press",
            InputKind::Hold => "hold",
            InputKind::DialCw => "dial-cw",
            InputKind::DialCcw => "dial-ccw",
            InputKind::Other => "other",
        }
    }
}

impl fmt::Display for InputKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Device {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "key" => Ok(Device::Key),
            "dial" => Ok(Device::Dial),
            other => Err(format!("Unknown device: {}", other)),
        }
    }
}

impl FromStr for DeviceEvent {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let event = match s.to_ascii_lowercase().replace('_', "-").as_str() {
            "down" => DeviceEvent::Down,
            "up" => DeviceEvent::Up,
            "short-up" => DeviceEvent::ShortUp,
            "short-touch-press" => DeviceEvent::ShortTouchPress,
            "long-touch-press" => DeviceEvent::LongTouchPress,
            "hold-start" => DeviceEvent::HoldStart,
            "hold-stop" => DeviceEvent::HoldStop,
            "turn-cw" => DeviceEvent::TurnCw,
            "turn-ccw" => DeviceEvent::TurnCcw,
            _ => return Err(format!("Unknown device event: {}", s)),
        };
        Ok(event)
    }
}
