//! Repository implementations.

pub mod inmemory;

pub use inmemory::{InMemoryChatMessageRepository, InMemoryPostRepository};
