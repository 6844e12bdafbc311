//! HTTP API DTOs.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupSummaryDto {
    pub name: String,
    pub member_count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupDetailDto {
    pub name: String,
    pub members: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessageDto {
    pub user_id: Option<i64>,
    pub username: String,
    pub content: String,
    /// RFC 3339, UTC
    pub created_at: Option<String>,
}

/// Body of `POST /api/users/{user_id}/notifications`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PushNotificationRequest {
    pub notification_type: String,
    pub message: String,
    #[serde(default)]
    pub from_user: Option<String>,
    #[serde(default)]
    pub post_id: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PushNotificationResponse {
    pub delivered: usize,
}

/// Body of `POST /api/posts/{post_id}/likes`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToggleLikeRequest {
    pub user_id: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToggleLikeResponse {
    pub liked: bool,
    pub like_count: u64,
}
