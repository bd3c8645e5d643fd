//! Debrid service abstraction.
//!
//! This module provides a `DebridClient` trait for turning magnet links into
//! direct HTTP links, with a TorBox implementation.

mod torbox;
mod types;

pub use torbox::TorBoxClient;
pub use types::*;
