//! Repository trait definitions.
//!
//! The persistence collaborators the consumers call into. Implementations
//! live in the infrastructure layer.

use async_trait::async_trait;

use super::{
    entity::{ChatMessage, LikeToggle},
    error::RepositoryError,
    value_object::{PostId, UserId},
};

/// Storage of chat messages.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ChatMessageRepository: Send + Sync {
    /// Persist one message.
    async fn save_chat_message(&self, message: ChatMessage) -> Result<(), RepositoryError>;

    /// Latest `limit` messages, oldest first.
    async fn recent_messages(&self, limit: usize) -> Result<Vec<ChatMessage>, RepositoryError>;
}

/// Storage of posts' likes.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PostRepository: Send + Sync {
    /// Authoritative like count. `RepositoryError::NotFound` for an unknown post.
    async fn get_like_count(&self, post_id: PostId) -> Result<u64, RepositoryError>;

    /// Add the user's like, or remove it if already present.
    async fn toggle_like(
        &self,
        post_id: PostId,
        user_id: UserId,
    ) -> Result<LikeToggle, RepositoryError>;
}
