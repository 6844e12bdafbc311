//! WebSocket frame DTOs.

use serde::{Deserialize, Serialize};

/// Frames a client may send. Anything else is a malformed payload.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum InboundFrame {
    /// Chat text.
    Message { message: String },
    /// A post was created; announce it on the live feed.
    NewPost {
        post_id: Option<i64>,
        author: Option<String>,
    },
    /// A like changed; re-read the count and broadcast it.
    LikeUpdate {
        post_id: Option<i64>,
        user_id: Option<i64>,
    },
    /// A comment was added; relay it to the post's subscribers.
    NewComment {
        post_id: Option<i64>,
        comment_id: Option<i64>,
        author: Option<String>,
        content: Option<String>,
        created_at: Option<String>,
    },
}

/// `type` discriminator of outbound frames.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageType {
    NewPost,
    LikeUpdate,
    NewComment,
    Notification,
}

/// Chat broadcast. Carries no `type` field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessageFrame {
    pub message: String,
    pub username: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewPostFrame {
    pub r#type: MessageType,
    pub post_id: Option<i64>,
    pub author: Option<String>,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LikeUpdateFrame {
    pub r#type: MessageType,
    pub post_id: Option<i64>,
    pub like_count: u64,
    pub user_id: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewCommentFrame {
    pub r#type: MessageType,
    pub post_id: Option<i64>,
    pub comment_id: Option<i64>,
    pub author: Option<String>,
    pub content: Option<String>,
    pub created_at: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationFrame {
    pub r#type: MessageType,
    pub notification_type: String,
    pub message: String,
    pub from_user: Option<String>,
    pub post_id: Option<i64>,
}

/// Any frame the server sends.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum OutboundFrame {
    ChatMessage(ChatMessageFrame),
    NewPost(NewPostFrame),
    LikeUpdate(LikeUpdateFrame),
    NewComment(NewCommentFrame),
    Notification(NotificationFrame),
}
