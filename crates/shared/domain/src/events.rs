//! Events consumed by modules (`GameEvent`) and events produced for observers
//! (`ToggleModuleEvent`, `Notification`, `RefreshArrayListEvent`).

use serde::{Deserialize, Serialize};
use std::fmt;

/// The world a session is bound to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorldInfo {
    pub name: String,
}

impl WorldInfo {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

/// The local actor inside a world.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerInfo {
    pub name: String,
    pub creative: bool,
}

impl PlayerInfo {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into(), creative: false }
    }

    #[must_use]
    pub const fn creative(mut self, creative: bool) -> Self {
        self.creative = creative;
        self
    }
}

/// Events delivered to module listeners, one at a time, in order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GameEvent {
    Tick { tick: u64 },
    WorldChange { world: Option<WorldInfo> },
    Disconnect,
    KeyPress { key: i32 },
}

impl GameEvent {
    #[must_use]
    pub const fn kind(&self) -> EventKind {
        match self {
            Self::Tick { .. } => EventKind::Tick,
            Self::WorldChange { .. } => EventKind::WorldChange,
            Self::Disconnect => EventKind::Disconnect,
            Self::KeyPress { .. } => EventKind::KeyPress,
        }
    }
}

/// Discriminant of [`GameEvent`], used to register listeners.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum EventKind {
    Tick,
    WorldChange,
    Disconnect,
    KeyPress,
}

/// Published once per successful, non-suppressed enable/disable transition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToggleModuleEvent {
    pub name: String,
    pub hidden: bool,
    pub enabled: bool,
}

/// Published when a module's visibility in the HUD list changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RefreshArrayListEvent;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Info,
    Success,
    Error,
    Enabled,
    Disabled,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Info => "info",
            Self::Success => "success",
            Self::Error => "error",
            Self::Enabled => "enabled",
            Self::Disabled => "disabled",
        };
        f.write_str(label)
    }
}

/// A human-facing message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    pub title: String,
    pub message: String,
    pub severity: Severity,
}

impl Notification {
    /// The toggle message for a module transition.
    pub fn toggled(display_name: impl Into<String>, enabled: bool) -> Self {
        let (message, severity) = if enabled {
            ("Enabled", Severity::Enabled)
        } else {
            ("Disabled", Severity::Disabled)
        };
        Self { title: display_name.into(), message: message.to_owned(), severity }
    }
}

impl fmt::Display for Notification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}: {}", self.severity, self.title, self.message)
    }
}
