//! Per-connection consumer session.
//!
//! A session is created once a connection has been admitted (Open) and lives
//! until the socket closes. It dispatches inbound frames to the use cases of
//! its consumer variant and guarantees the connection leaves every group when
//! it ends, whichever side ended it.
//!
//! ## テスト実装の作業記録
//!
//! ### 何をテストしているか
//! - 受信フレームの振り分け（処理・無視・不正）
//! - close() と Drop によるグループ離脱
//!
//! ### どのような状況を想定しているか
//! - 正常系：alice の発言が bob に届く、いいね数の配信
//! - エッジケース：別コンシューマー向けのフレーム、close の二重呼び出し
//! - 異常系："not json" などの不正フレーム、close せずに破棄されたセッション

use std::sync::{
    Arc,
    atomic::{AtomicBool, Ordering},
};

use crate::{
    domain::{
        Connection, ConnectionId, ConnectionState, ConsumerKind, GroupName, MessageBody, PostId,
        UserId,
    },
    infrastructure::dto::{conversion::comment_payload, websocket::InboundFrame},
    usecase::DisconnectConsumerUseCase,
};

use super::state::AppState;

/// What happened to one inbound frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameOutcome {
    /// Dispatched to a use case.
    Handled,
    /// Well-formed but not meant for this consumer.
    Ignored,
    /// Dropped: not JSON, unknown type, missing field or invalid value.
    Malformed,
    /// Dispatched, but the use case failed.
    Failed,
}

/// Removes a connection from the registry exactly once.
///
/// `release` is the normal path. If the guard is dropped unreleased, the
/// cleanup is spawned on the current runtime instead.
struct MembershipGuard {
    disconnect: Arc<DisconnectConsumerUseCase>,
    connection_id: ConnectionId,
    released: AtomicBool,
}

impl MembershipGuard {
    fn new(disconnect: Arc<DisconnectConsumerUseCase>, connection_id: ConnectionId) -> Self {
        Self {
            disconnect,
            connection_id,
            released: AtomicBool::new(false),
        }
    }

    fn is_released(&self) -> bool {
        self.released.load(Ordering::Acquire)
    }

    async fn release(&self) -> Option<Vec<GroupName>> {
        if self.released.swap(true, Ordering::AcqRel) {
            return None;
        }
        Some(self.disconnect.execute(&self.connection_id).await)
    }
}

impl Drop for MembershipGuard {
    fn drop(&mut self) {
        if self.released.swap(true, Ordering::AcqRel) {
            return;
        }

        let disconnect = self.disconnect.clone();
        let connection_id = self.connection_id;
        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                handle.spawn(async move {
                    let left = disconnect.execute(&connection_id).await;
                    tracing::info!(
                        "Connection {} released on drop, left {} group(s)",
                        connection_id,
                        left.len()
                    );
                });
            }
            Err(_) => {
                tracing::warn!(
                    "No runtime to release connection {}; membership left in place",
                    connection_id
                );
            }
        }
    }
}

/// An Open consumer connection.
pub struct ConsumerSession {
    connection: Connection,
    state: Arc<AppState>,
    guard: MembershipGuard,
}

impl ConsumerSession {
    pub fn new(connection: Connection, state: Arc<AppState>) -> Self {
        let guard = MembershipGuard::new(
            state.disconnect_consumer_usecase.clone(),
            connection.id,
        );
        Self {
            connection,
            state,
            guard,
        }
    }

    pub fn connection(&self) -> &Connection {
        &self.connection
    }

    pub fn state(&self) -> ConnectionState {
        if self.guard.is_released() {
            ConnectionState::Closed
        } else {
            ConnectionState::Open
        }
    }

    /// Dispatch one text frame.
    pub async fn handle_text(&self, text: &str) -> FrameOutcome {
        if self.state() == ConnectionState::Closed {
            return FrameOutcome::Ignored;
        }

        let frame = match serde_json::from_str::<InboundFrame>(text) {
            Ok(frame) => frame,
            Err(e) => {
                tracing::warn!(
                    "Dropping malformed frame from {}: {}",
                    self.connection.id,
                    e
                );
                return FrameOutcome::Malformed;
            }
        };

        match (self.connection.kind, frame) {
            (ConsumerKind::ChatRoom, InboundFrame::Message { message }) => {
                let body = match MessageBody::new(message) {
                    Ok(body) => body,
                    Err(e) => {
                        tracing::warn!(
                            "Dropping chat message from {}: {}",
                            self.connection.id,
                            e
                        );
                        return FrameOutcome::Malformed;
                    }
                };

                match self
                    .state
                    .send_chat_message_usecase
                    .execute(&self.connection, body)
                    .await
                {
                    Ok(report) => {
                        tracing::debug!(
                            "Chat message from {} delivered to {} member(s)",
                            self.connection.principal.display_name(),
                            report.delivered
                        );
                        FrameOutcome::Handled
                    }
                    Err(e) => {
                        tracing::warn!("{}", e);
                        FrameOutcome::Failed
                    }
                }
            }
            (ConsumerKind::LiveFeed, InboundFrame::NewPost { post_id, author }) => {
                self.state
                    .announce_new_post_usecase
                    .execute(post_id.map(PostId::new), author)
                    .await;
                FrameOutcome::Handled
            }
            (ConsumerKind::PostUpdates(_), InboundFrame::LikeUpdate { post_id, user_id }) => {
                match self
                    .state
                    .post_updates_usecase
                    .update_like_count(
                        &self.connection.group,
                        post_id.map(PostId::new),
                        user_id.map(UserId::new),
                    )
                    .await
                {
                    Ok(_) => FrameOutcome::Handled,
                    Err(e) => {
                        tracing::warn!("{}", e);
                        FrameOutcome::Failed
                    }
                }
            }
            (
                ConsumerKind::PostUpdates(_),
                InboundFrame::NewComment {
                    post_id,
                    comment_id,
                    author,
                    content,
                    created_at,
                },
            ) => {
                let comment = comment_payload(post_id, comment_id, author, content, created_at);
                self.state
                    .post_updates_usecase
                    .relay_comment(&self.connection.group, comment)
                    .await;
                FrameOutcome::Handled
            }
            (kind, frame) => {
                tracing::debug!("{} consumer ignores {:?}", kind, frame);
                FrameOutcome::Ignored
            }
        }
    }

    /// Leave every group. Only the first call does anything.
    pub async fn close(&self) -> Vec<GroupName> {
        self.guard.release().await.unwrap_or_default()
    }
}
