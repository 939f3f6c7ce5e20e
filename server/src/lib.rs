//! CopyAnywhere server library.
//!
//! The core is the session relay in [`ws`]: WebSocket connections join a
//! named session and every frame one member sends is relayed to the others.
//! Around it sit file sharing and notes ([`api`], [`store`]) guarded by a
//! shared-password gate ([`auth`]).

#![warn(missing_docs)]
#![warn(clippy::pedantic)]

/// REST routes for files and notes.
pub mod api;
/// Shared-password access gate.
pub mod auth;
/// Shared handler state.
pub mod host;
/// Infrastructure components (config, server, telemetry).
pub mod infrastructure;
/// File and notes persistence.
pub mod store;
/// Session-scoped WebSocket relay.
pub mod ws;
