//! In-memory repositories backed by `tokio::sync::Mutex`.

pub mod chat_message;
pub mod post;

pub use chat_message::InMemoryChatMessageRepository;
pub use post::InMemoryPostRepository;
