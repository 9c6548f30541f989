//! Kernel of the module framework.
//!
//! * [`module`]: the activation state machine of a single module and the behaviour trait.
//! * [`registry`]: the [`ModuleManager`](registry::ModuleManager) that owns modules, routes events
//!   and publishes toggle notifications.
//! * [`request`]: priority arbitration of shared outputs between independent producers.
//! * [`value`]: the typed configuration tree of a module.
//!
//! Everything here runs on one logical thread; the owner of the manager is the serialization
//! point for callers on other threads.
//!
//! ## Arbitration
//! ```rust
//! use hotbar_kernel::request::RequestHandler;
//!
//! let mut aim: RequestHandler<&str, &str> = RequestHandler::new();
//! aim.submit("KillAura", 3, 2, "zombie");
//! aim.submit("Scaffold", 5, 1, "block below");
//! assert_eq!(aim.peek_winner(), Some(&"block below"));
//! aim.tick(1);
//! assert_eq!(aim.peek_winner(), Some(&"zombie"));
//! ```
#[cfg(not(target_arch = "wasm32"))]
pub mod config;
pub mod arbiters;
pub mod error;
pub mod module;
pub mod prelude;
pub mod registry;
pub mod request;
pub mod session;
pub mod value;

pub use hotbar_domain as domain;
