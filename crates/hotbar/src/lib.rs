//! Facade crate for the hotbar module core.
//! Re-exports domain/kernel primitives and wires the built-in modules into a [`Client`].
//! Keep this crate thin: it should compose other crates, not implement module logic.
//!
//! ## Usage
//! - Add `hotbar` with the desired built-in modules (`autoclicker` is on by default).
//! - Build a [`Client`] with [`Client::init`], drive it with [`Client::tick`] and the session
//!   hooks, and persist [`Client::shutdown`]'s snapshots.

mod client;
mod error;

pub use crate::client::{Client, TickReport};
pub use crate::error::{ClientError, ClientErrorExt};
pub use hotbar_domain as domain;
pub use hotbar_event_bus as events;
pub use hotbar_kernel as kernel;

/// Built-in modules compiled into this build.
pub mod features {
    #[cfg(feature = "autoclicker")]
    pub use hotbar_autoclicker as autoclicker;

    /// Build-time enabled modules (by Cargo feature).
    pub const ENABLED: &[&str] = &[
        #[cfg(feature = "autoclicker")]
        "autoclicker",
    ];

    #[must_use]
    pub fn is_enabled(name: &str) -> bool {
        ENABLED.iter().any(|enabled| enabled.eq_ignore_ascii_case(name))
    }
}
