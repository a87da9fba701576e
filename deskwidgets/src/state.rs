//! Widget state and its on-disk shape
//!
//! One `WidgetState` per overlay. The persisted file is a JSON array of these,
//! and every key may be missing: `display_mode` → `"time"`, `note_text` → `""`,
//! `countdown_seconds` → `0`, `reminders` → `[]`.

use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;

/// What an overlay shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DisplayMode {
    #[default]
    Time,
    Calendar,
    Note,
    Countdown,
    Quote,
    Reminder,
}

impl DisplayMode {
    /// The fixed cycle order.
    pub const ALL: [DisplayMode; 6] = [
        DisplayMode::Time,
        DisplayMode::Calendar,
        DisplayMode::Note,
        DisplayMode::Countdown,
        DisplayMode::Quote,
        DisplayMode::Reminder,
    ];

    /// Next mode in the cycle, wrapping after `Reminder`.
    pub fn next(self) -> Self {
        let idx = Self::ALL.iter().position(|m| *m == self).unwrap_or(0);
        Self::ALL[(idx + 1) % Self::ALL.len()]
    }

    pub fn as_str(self) -> &'static str {
        match self {
            DisplayMode::Time => "time",
            DisplayMode::Calendar => "calendar",
            DisplayMode::Note => "note",
            DisplayMode::Countdown => "countdown",
            DisplayMode::Quote => "quote",
            DisplayMode::Reminder => "reminder",
        }
    }
}

impl fmt::Display for DisplayMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownMode(pub String);

impl fmt::Display for UnknownMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown display mode {:?}", self.0)
    }
}

impl FromStr for DisplayMode {
    type Err = UnknownMode;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|m| m.as_str() == s)
            .ok_or_else(|| UnknownMode(s.to_string()))
    }
}

/// Unrecognised modes load as `Time` rather than failing the whole file.
impl<'de> Deserialize<'de> for DisplayMode {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Ok(raw.parse().unwrap_or_else(|e: UnknownMode| {
            tracing::warn!("{}, falling back to time", e);
            DisplayMode::Time
        }))
    }
}

/// Everything about an overlay that survives a restart.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WidgetState {
    pub display_mode: DisplayMode,
    pub note_text: String,
    pub countdown_seconds: u32,
    pub reminders: Vec<String>,
}
