//! Data Transfer Objects.
//!
//! DTOs are organized by protocol:
//! - `websocket`: frames exchanged with consumer connections
//! - `http`: HTTP API request and response bodies

pub mod conversion;
pub mod http;
pub mod websocket;
