//! # Event Bus
//!
//! A type-safe broadcast bus that carries the events the module core *produces*:
//! toggle events, notifications and HUD refresh requests.
//!
//! ## Overview
//!
//! Channels are keyed by the Rust type of the event and backed by `tokio` broadcast
//! channels, so any number of observers (UI, scripting bridge, tests) can subscribe without
//! the producer knowing about them. Delivery order per event type is publication order.
//!
//! ## Features
//!
//! * **Type-Safe**: Events are identified by their Rust type.
//! * **Fan-out**: Every subscriber receives every event published after it subscribed.
//! * **Lock-light**: `FxHashMap` + `parking_lot::RwLock`, read-locked on the hot path.
//! * **Sync or async consumers**: [`EventReceiverExt::drain`] for tick-driven code,
//!   [`EventReceiverExt::next_event`] for tasks.
//!
//! # Example
//!
//! ```rust
//! use hotbar_event_bus::{EventBus, EventReceiverExt, EventBusError};
//!
//! #[derive(Clone, Debug, PartialEq)]
//! struct ModuleToggled { name: &'static str, enabled: bool }
//!
//! fn main() -> Result<(), EventBusError> {
//!     let bus = EventBus::new();
//!
//!     let mut rx = bus.subscribe::<ModuleToggled>()?;
//!     bus.publish(ModuleToggled { name: "AutoClicker", enabled: true })?;
//!
//!     let events = rx.drain();
//!     assert_eq!(events.len(), 1);
//!     assert!(events[0].enabled);
//!     Ok(())
//! }
//! ```

mod bus;
mod error;
mod receiver;

pub use bus::{Event, EventBus};
pub use error::{EventBusError, EventBusErrorExt};
pub use receiver::EventReceiverExt;
