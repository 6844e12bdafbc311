//! Consumer variants and their admission rules.
//!
//! A consumer binds one connection to one group. Which group, and whether
//! an anonymous principal may open it at all, depends on the variant.

use std::fmt;

use super::{
    entity::Principal,
    value_object::{GroupName, PostId},
};

/// The role a connection plays.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConsumerKind {
    /// The shared chat room.
    ChatRoom,
    /// Announcements of newly created posts.
    LiveFeed,
    /// Like and comment updates of a single post.
    PostUpdates(PostId),
    /// Receive-only notification inbox of the authenticated user.
    UserNotifications,
}

/// Lifecycle of an admitted consumer connection. `Closed` is terminal.
///
/// A connection that is still connecting has no session yet: the handler
/// admits or refuses it before one exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Open,
    Closed,
}

/// Reason a principal was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AdmissionDenied {
    pub kind: ConsumerKind,
}

impl ConsumerKind {
    pub fn requires_authentication(&self) -> bool {
        matches!(self, ConsumerKind::ChatRoom | ConsumerKind::UserNotifications)
    }

    /// Decide the Connecting → Open transition.
    ///
    /// Returns the group the connection joins once open.
    pub fn admit(&self, principal: &Principal) -> Result<GroupName, AdmissionDenied> {
        if self.requires_authentication() && !principal.is_authenticated() {
            return Err(AdmissionDenied { kind: *self });
        }

        match self {
            ConsumerKind::ChatRoom => Ok(GroupName::chat()),
            ConsumerKind::LiveFeed => Ok(GroupName::live_feed()),
            ConsumerKind::PostUpdates(post_id) => Ok(GroupName::post(*post_id)),
            ConsumerKind::UserNotifications => principal
                .user_id()
                .map(GroupName::user_notifications)
                .ok_or(AdmissionDenied { kind: *self }),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            ConsumerKind::ChatRoom => "chat",
            ConsumerKind::LiveFeed => "live_feed",
            ConsumerKind::PostUpdates(_) => "post",
            ConsumerKind::UserNotifications => "notifications",
        }
    }
}

impl fmt::Display for ConsumerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConsumerKind::PostUpdates(post_id) => write!(f, "post({post_id})"),
            other => f.write_str(other.name()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::value_object::{UserId, Username};

    fn alice() -> Principal {
        Principal::Authenticated {
            user_id: UserId::new(1),
            username: Username::new("alice".to_string()).unwrap(),
        }
    }

    #[test]
    fn test_chat_requires_authentication() {
        // テスト項目: チャットは匿名ユーザーを拒否し、認証済みユーザーを chat_chat に参加させる
        // given (前提条件):
        let kind = ConsumerKind::ChatRoom;

        // when (操作):
        let anonymous = kind.admit(&Principal::Anonymous);
        let authenticated = kind.admit(&alice());

        // then (期待する結果):
        assert_eq!(anonymous, Err(AdmissionDenied { kind }));
        assert_eq!(authenticated, Ok(GroupName::chat()));
    }

    #[test]
    fn test_live_feed_and_post_allow_anonymous() {
        // テスト項目: ライブフィードと投稿更新は匿名でも接続できる
        // given (前提条件):
        let post = ConsumerKind::PostUpdates(PostId::new(42));

        // when (操作):
        let feed_group = ConsumerKind::LiveFeed.admit(&Principal::Anonymous);
        let post_group = post.admit(&Principal::Anonymous);

        // then (期待する結果):
        assert_eq!(feed_group, Ok(GroupName::live_feed()));
        assert_eq!(post_group.unwrap().as_str(), "post_42");
    }

    #[test]
    fn test_notifications_group_is_keyed_by_user() {
        // テスト項目: 通知はユーザーごとのグループに参加し、匿名は拒否される
        // given (前提条件):
        let kind = ConsumerKind::UserNotifications;

        // when (操作):
        let group = kind.admit(&alice());
        let rejected = kind.admit(&Principal::Anonymous);

        // then (期待する結果):
        assert_eq!(group.unwrap().as_str(), "user_1_notifications");
        assert!(rejected.is_err());
    }

    #[test]
    fn test_display_includes_post_id() {
        // テスト項目: 投稿コンシューマーの表示名に投稿 ID が含まれる
        // given (前提条件) / when (操作):
        let shown = ConsumerKind::PostUpdates(PostId::new(3)).to_string();

        // then (期待する結果):
        assert_eq!(shown, "post(3)");
        assert_eq!(ConsumerKind::LiveFeed.to_string(), "live_feed");
    }
}
