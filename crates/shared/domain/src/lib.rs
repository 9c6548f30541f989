//! # Domain Models
//!
//! This crate contains pure domain types with minimal dependencies (`serde`, `bitflags`).
//! Keep it lean: no I/O, no event dispatch, no state machines. Just data and simple helpers
//! shared by the kernel, the feature slices and the host.

pub mod bind;
pub mod category;
pub mod config;
pub mod constants;
pub mod events;
pub mod input;
