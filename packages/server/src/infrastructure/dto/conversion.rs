//! Conversion logic between DTOs and domain types.

use hiroba_shared::time::millis_to_rfc3339;

use crate::domain::{
    ChatMessage, CommentPayload, GroupEvent, GroupSummary, LikeToggle, Notification, PostId,
};
use crate::infrastructure::dto::{http, websocket as dto};

// ========================================
// Domain → DTO
// ========================================

impl From<&GroupEvent> for dto::OutboundFrame {
    fn from(event: &GroupEvent) -> Self {
        match event {
            GroupEvent::ChatMessage { message, username } => {
                dto::OutboundFrame::ChatMessage(dto::ChatMessageFrame {
                    message: message.clone(),
                    username: username.clone(),
                })
            }
            GroupEvent::NewPostNotification {
                post_id,
                author,
                message,
            } => dto::OutboundFrame::NewPost(dto::NewPostFrame {
                r#type: dto::MessageType::NewPost,
                post_id: post_id.map(|id| id.value()),
                author: author.clone(),
                message: message.clone(),
            }),
            GroupEvent::LikeCountUpdate {
                post_id,
                like_count,
                user_id,
            } => dto::OutboundFrame::LikeUpdate(dto::LikeUpdateFrame {
                r#type: dto::MessageType::LikeUpdate,
                post_id: post_id.map(|id| id.value()),
                like_count: *like_count,
                user_id: user_id.map(|id| id.value()),
            }),
            GroupEvent::CommentNotification(comment) => {
                dto::OutboundFrame::NewComment(dto::NewCommentFrame {
                    r#type: dto::MessageType::NewComment,
                    post_id: comment.post_id.map(|id| id.value()),
                    comment_id: comment.comment_id,
                    author: comment.author.clone(),
                    content: comment.content.clone(),
                    created_at: comment.created_at.clone(),
                })
            }
            GroupEvent::NotificationMessage(notification) => {
                dto::OutboundFrame::Notification(dto::NotificationFrame {
                    r#type: dto::MessageType::Notification,
                    notification_type: notification.notification_type.clone(),
                    message: notification.message.clone(),
                    from_user: notification.from_user.clone(),
                    post_id: notification.post_id.map(|id| id.value()),
                })
            }
        }
    }
}

/// Serialize an event to the text frame sent to every member.
pub fn encode_event(event: &GroupEvent) -> Result<String, serde_json::Error> {
    serde_json::to_string(&dto::OutboundFrame::from(event))
}

impl From<ChatMessage> for http::ChatMessageDto {
    fn from(message: ChatMessage) -> Self {
        Self {
            user_id: message.author.map(|id| id.value()),
            username: message.display_name,
            content: message.body.into_string(),
            created_at: millis_to_rfc3339(message.created_at.value()),
        }
    }
}

impl From<GroupSummary> for http::GroupSummaryDto {
    fn from(summary: GroupSummary) -> Self {
        Self {
            name: summary.name.as_str().to_string(),
            member_count: summary.member_count,
        }
    }
}

impl From<LikeToggle> for http::ToggleLikeResponse {
    fn from(toggle: LikeToggle) -> Self {
        Self {
            liked: toggle.liked,
            like_count: toggle.like_count,
        }
    }
}

// ========================================
// DTO → Domain
// ========================================

impl From<http::PushNotificationRequest> for Notification {
    fn from(request: http::PushNotificationRequest) -> Self {
        Self {
            notification_type: request.notification_type,
            message: request.message,
            from_user: request.from_user,
            post_id: request.post_id.map(PostId::new),
        }
    }
}

/// Build the relayed comment from the fields of an inbound `new_comment` frame.
pub fn comment_payload(
    post_id: Option<i64>,
    comment_id: Option<i64>,
    author: Option<String>,
    content: Option<String>,
    created_at: Option<String>,
) -> CommentPayload {
    CommentPayload {
        post_id: post_id.map(PostId::new),
        comment_id,
        author,
        content,
        created_at,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{MessageBody, Timestamp, UserId};

    #[test]
    fn test_encode_chat_message_has_no_type_field() {
        // テスト項目: チャットのブロードキャストは message と username のみを持つ
        // given (前提条件):
        let event = GroupEvent::ChatMessage {
            message: "hello".to_string(),
            username: "alice".to_string(),
        };

        // when (操作):
        let json = encode_event(&event).unwrap();

        // then (期待する結果):
        assert_eq!(json, r#"{"message":"hello","username":"alice"}"#);
    }

    #[test]
    fn test_encode_like_count_update() {
        // テスト項目: いいね数更新は like_update フレームとしてフィールド順どおりに出力される
        // given (前提条件):
        let event = GroupEvent::LikeCountUpdate {
            post_id: Some(PostId::new(42)),
            like_count: 5,
            user_id: Some(UserId::new(7)),
        };

        // when (操作):
        let json = encode_event(&event).unwrap();

        // then (期待する結果):
        assert_eq!(
            json,
            r#"{"type":"like_update","post_id":42,"like_count":5,"user_id":7}"#
        );
    }

    #[test]
    fn test_encode_new_post_notification() {
        // テスト項目: 新規投稿通知は new_post フレームと固定メッセージになる
        // given (前提条件):
        let event = GroupEvent::new_post(Some(PostId::new(3)), Some("carol".to_string()));

        // when (操作):
        let value: serde_json::Value = serde_json::from_str(&encode_event(&event).unwrap()).unwrap();

        // then (期待する結果):
        assert_eq!(
            value,
            serde_json::json!({
                "type": "new_post",
                "post_id": 3,
                "author": "carol",
                "message": "新しい投稿があります！"
            })
        );
    }

    #[test]
    fn test_encode_comment_and_notification_keep_nulls() {
        // テスト項目: 値のないフィールドは null として出力される
        // given (前提条件):
        let comment = GroupEvent::CommentNotification(comment_payload(
            Some(1),
            None,
            Some("bob".to_string()),
            Some("nice".to_string()),
            None,
        ));
        let notification = GroupEvent::NotificationMessage(Notification {
            notification_type: "follow".to_string(),
            message: "bob followed you".to_string(),
            from_user: None,
            post_id: None,
        });

        // when (操作):
        let comment_json: serde_json::Value =
            serde_json::from_str(&encode_event(&comment).unwrap()).unwrap();
        let notification_json: serde_json::Value =
            serde_json::from_str(&encode_event(&notification).unwrap()).unwrap();

        // then (期待する結果):
        assert_eq!(
            comment_json,
            serde_json::json!({
                "type": "new_comment",
                "post_id": 1,
                "comment_id": null,
                "author": "bob",
                "content": "nice",
                "created_at": null
            })
        );
        assert_eq!(
            notification_json,
            serde_json::json!({
                "type": "notification",
                "notification_type": "follow",
                "message": "bob followed you",
                "from_user": null,
                "post_id": null
            })
        );
    }

    #[test]
    fn test_chat_message_to_http_dto() {
        // テスト項目: 保存済みメッセージが HTTP DTO に変換される
        // given (前提条件):
        let message = ChatMessage {
            author: Some(UserId::new(1)),
            display_name: "alice".to_string(),
            body: MessageBody::new("hello".to_string()).unwrap(),
            created_at: Timestamp::new(1_672_531_200_000),
        };

        // when (操作):
        let dto: http::ChatMessageDto = message.into();

        // then (期待する結果):
        assert_eq!(dto.user_id, Some(1));
        assert_eq!(dto.username, "alice");
        assert_eq!(dto.content, "hello");
        assert_eq!(dto.created_at.as_deref(), Some("2023-01-01T00:00:00.000Z"));
    }
}
