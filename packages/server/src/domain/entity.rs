//! Domain entities.

use super::{
    consumer::ConsumerKind,
    value_object::{ConnectionId, GroupName, MessageBody, Timestamp, UserId, Username},
};

/// Display name used for chat messages without an authenticated author.
pub const ANONYMOUS_DISPLAY_NAME: &str = "匿名";

/// Who is on the other end of a connection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Principal {
    Authenticated { user_id: UserId, username: Username },
    Anonymous,
}

impl Principal {
    pub fn user_id(&self) -> Option<UserId> {
        match self {
            Principal::Authenticated { user_id, .. } => Some(*user_id),
            Principal::Anonymous => None,
        }
    }

    pub fn is_authenticated(&self) -> bool {
        matches!(self, Principal::Authenticated { .. })
    }

    pub fn display_name(&self) -> &str {
        match self {
            Principal::Authenticated { username, .. } => username.as_str(),
            Principal::Anonymous => ANONYMOUS_DISPLAY_NAME,
        }
    }
}

/// An admitted connection.
#[derive(Debug, Clone)]
pub struct Connection {
    pub id: ConnectionId,
    pub principal: Principal,
    pub kind: ConsumerKind,
    /// Group joined when the connection was opened.
    pub group: GroupName,
    pub connected_at: Timestamp,
}

/// A persisted chat message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatMessage {
    pub author: Option<UserId>,
    pub display_name: String,
    pub body: MessageBody,
    pub created_at: Timestamp,
}

impl ChatMessage {
    pub fn new(principal: &Principal, body: MessageBody, created_at: Timestamp) -> Self {
        Self {
            author: principal.user_id(),
            display_name: principal.display_name().to_string(),
            body,
            created_at,
        }
    }
}

/// Result of toggling a like.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LikeToggle {
    pub liked: bool,
    pub like_count: u64,
}
