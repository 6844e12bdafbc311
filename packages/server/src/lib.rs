//! Hiroba server library.
//!
//! Connection-group broadcast over WebSocket: every connection joins one
//! named group and events published to a group fan out to its members.
//!
//! Layers:
//! - `domain`: value objects, entities, events and the registry/repository traits
//! - `usecase`: one use case per consumer operation
//! - `infrastructure`: in-memory implementations and wire DTOs
//! - `ui`: axum server, handlers and per-connection sessions

pub mod domain;
pub mod infrastructure;
pub mod ui;
pub mod usecase;
