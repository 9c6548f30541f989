//! Player input as seen by modules, and payloads of the shared arbitration queues.

use serde::{Deserialize, Serialize};

/// What the crosshair currently points at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CrosshairTarget {
    #[default]
    None,
    Block,
    Entity,
}

/// Raw input for the current tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct InputState {
    pub attack_pressed: bool,
    pub use_pressed: bool,
    pub crosshair: CrosshairTarget,
}

impl InputState {
    #[must_use]
    pub const fn pressed(self, button: MouseButton) -> bool {
        match button {
            MouseButton::Left => self.attack_pressed,
            MouseButton::Right => self.use_pressed,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MouseButton {
    Left,
    Right,
}

/// A request to click `count` times during the current tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClickRequest {
    pub button: MouseButton,
    pub count: u32,
}

/// A requested view direction, in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rotation {
    pub yaw: f32,
    pub pitch: f32,
}

impl Rotation {
    #[must_use]
    pub const fn new(yaw: f32, pitch: f32) -> Self {
        Self { yaw, pitch }
    }
}
