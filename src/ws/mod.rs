//! WebSocket layer: authenticated upgrade, connection loop, messages.
//!
//! The WebSocket endpoint at `/ws` pushes `new-application` and
//! `job-expired` events to authenticated clients and answers `ping`
//! commands.

pub mod connection;
pub mod handler;
pub mod messages;
