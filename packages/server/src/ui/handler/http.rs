//! HTTP API endpoint handlers.

use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};

use crate::{
    domain::{GroupName, PostId, RepositoryError, UserId},
    infrastructure::dto::http::{
        ChatMessageDto, GroupDetailDto, GroupSummaryDto, PushNotificationRequest,
        PushNotificationResponse, ToggleLikeRequest, ToggleLikeResponse,
    },
    ui::state::AppState,
    usecase::UpdateLikeCountError,
};

/// Health check endpoint
pub async fn health_check() -> Json<serde_json::Value> {
    Json(serde_json::json!({"status": "ok"}))
}

/// Debug endpoint: every non-empty group with its member count
pub async fn list_groups(State(state): State<Arc<AppState>>) -> Json<Vec<GroupSummaryDto>> {
    let groups = state.get_groups_usecase.list().await;

    // Domain Model から DTO への変換
    Json(groups.into_iter().map(GroupSummaryDto::from).collect())
}

/// Debug endpoint: members of one group
pub async fn get_group_detail(
    State(state): State<Arc<AppState>>,
    Path(name): Path<String>,
) -> Result<Json<GroupDetailDto>, StatusCode> {
    let group = match GroupName::new(name) {
        Ok(group) => group,
        Err(e) => {
            tracing::warn!("{}", e);
            return Err(StatusCode::BAD_REQUEST);
        }
    };

    let members = state.get_groups_usecase.members(&group).await;
    Ok(Json(GroupDetailDto {
        name: group.as_str().to_string(),
        members: members.iter().map(|id| id.to_string()).collect(),
    }))
}

/// Recent chat messages, oldest first
pub async fn get_chat_messages(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<ChatMessageDto>>, StatusCode> {
    match state.chat_history_usecase.recent().await {
        Ok(messages) => Ok(Json(
            messages.into_iter().map(ChatMessageDto::from).collect(),
        )),
        Err(e) => {
            tracing::error!("Failed to load chat history: {}", e);
            Err(StatusCode::SERVICE_UNAVAILABLE)
        }
    }
}

/// Toggle a user's like on a post and broadcast the new count
pub async fn toggle_like(
    State(state): State<Arc<AppState>>,
    Path(post_id): Path<i64>,
    Json(request): Json<ToggleLikeRequest>,
) -> Result<Json<ToggleLikeResponse>, StatusCode> {
    match state
        .post_updates_usecase
        .toggle_like(PostId::new(post_id), UserId::new(request.user_id))
        .await
    {
        Ok(toggle) => Ok(Json(toggle.into())),
        Err(UpdateLikeCountError::Persistence(RepositoryError::NotFound(what))) => {
            tracing::warn!("Cannot toggle like: {} not found", what);
            Err(StatusCode::NOT_FOUND)
        }
        Err(e) => {
            tracing::error!("{}", e);
            Err(StatusCode::SERVICE_UNAVAILABLE)
        }
    }
}

/// Push a notification to every connection of a user
pub async fn push_notification(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<i64>,
    Json(request): Json<PushNotificationRequest>,
) -> Json<PushNotificationResponse> {
    let report = state
        .push_notification_usecase
        .execute(UserId::new(user_id), request.into())
        .await;

    tracing::info!(
        "Notification for user {} delivered to {} connection(s)",
        user_id,
        report.delivered
    );
    Json(PushNotificationResponse {
        delivered: report.delivered,
    })
}
