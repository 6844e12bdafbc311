//! WebSocket consumer server implementation.

mod consumer;
mod handler;
mod server;
mod signal;
pub mod state;

pub use consumer::{ConsumerSession, FrameOutcome};
pub use server::Server;
pub use state::{AppState, ConsumerSettings};
