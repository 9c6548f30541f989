use serde::{Deserialize, Serialize};
use std::fmt;

/// Keyboard binding of a module, stored as a raw key code.
///
/// Codes follow the GLFW key table; [`KeyBind::NONE`] means "unbound".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct KeyBind(i32);

impl KeyBind {
    pub const NONE: Self = Self(-1);

    #[must_use]
    pub const fn new(code: i32) -> Self {
        if code < 0 { Self::NONE } else { Self(code) }
    }

    #[must_use]
    pub const fn code(self) -> i32 {
        self.0
    }

    #[must_use]
    pub const fn is_bound(self) -> bool {
        self.0 >= 0
    }

    /// Whether a pressed key activates this bind.
    #[must_use]
    pub const fn matches(self, key: i32) -> bool {
        self.is_bound() && self.0 == key
    }
}

impl Default for KeyBind {
    fn default() -> Self {
        Self::NONE
    }
}

impl From<i32> for KeyBind {
    fn from(code: i32) -> Self {
        Self::new(code)
    }
}

impl fmt::Display for KeyBind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_bound() { write!(f, "key:{}", self.0) } else { f.write_str("none") }
    }
}
