//! Events published to groups.
//!
//! The set is closed: every event a consumer can produce has a variant here,
//! and the wire encoding is derived from the variant rather than from a
//! free-form `type` string.

use super::value_object::{PostId, UserId};

/// Fixed text attached to new post announcements.
pub const NEW_POST_MESSAGE: &str = "新しい投稿があります！";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GroupEvent {
    ChatMessage {
        message: String,
        username: String,
    },
    NewPostNotification {
        post_id: Option<PostId>,
        author: Option<String>,
        message: String,
    },
    LikeCountUpdate {
        post_id: Option<PostId>,
        like_count: u64,
        user_id: Option<UserId>,
    },
    CommentNotification(CommentPayload),
    NotificationMessage(Notification),
}

/// A comment relayed to the subscribers of a post, field for field.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommentPayload {
    pub post_id: Option<PostId>,
    pub comment_id: Option<i64>,
    pub author: Option<String>,
    pub content: Option<String>,
    pub created_at: Option<String>,
}

/// A notification for one user's inbox.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub notification_type: String,
    pub message: String,
    pub from_user: Option<String>,
    pub post_id: Option<PostId>,
}

impl GroupEvent {
    pub fn new_post(post_id: Option<PostId>, author: Option<String>) -> Self {
        GroupEvent::NewPostNotification {
            post_id,
            author,
            message: NEW_POST_MESSAGE.to_string(),
        }
    }

    /// Event name used in logs.
    pub fn kind(&self) -> &'static str {
        match self {
            GroupEvent::ChatMessage { .. } => "chat_message",
            GroupEvent::NewPostNotification { .. } => "new_post_notification",
            GroupEvent::LikeCountUpdate { .. } => "like_count_update",
            GroupEvent::CommentNotification(_) => "comment_notification",
            GroupEvent::NotificationMessage(_) => "notification_message",
        }
    }
}
