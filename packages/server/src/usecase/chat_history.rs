//! UseCase: チャット履歴の取得と再送
//!
//! 新しくチャットに参加した接続にだけ、直近のメッセージを古い順に送ります。
//! 履歴の再送とグループ参加の間にブロードキャストが割り込まないよう、
//! [`ChatBroadcastGate`] で両者を順序付けます。

use std::sync::Arc;

use tokio::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::domain::{
    ChatMessage, ChatMessageRepository, ConnectionId, GroupError, GroupEvent, GroupName,
    GroupRegistry, RepositoryError,
};

use super::error::ChatHistoryError;

/// Orders chat broadcasts against history snapshots.
///
/// A broadcast holds the shared side from persist to publish. A joining
/// connection holds the exclusive side from snapshot to join. Each message
/// therefore reaches a new member once: in its history or live.
#[derive(Debug, Default)]
pub struct ChatBroadcastGate(RwLock<()>);

impl ChatBroadcastGate {
    pub async fn broadcasting(&self) -> RwLockReadGuard<'_, ()> {
        self.0.read().await
    }

    pub async fn joining(&self) -> RwLockWriteGuard<'_, ()> {
        self.0.write().await
    }
}

/// チャット履歴のユースケース
pub struct ChatHistoryUseCase {
    chat_repository: Arc<dyn ChatMessageRepository>,
    registry: Arc<dyn GroupRegistry>,
    limit: usize,
    gate: Arc<ChatBroadcastGate>,
}

impl ChatHistoryUseCase {
    pub fn new(
        chat_repository: Arc<dyn ChatMessageRepository>,
        registry: Arc<dyn GroupRegistry>,
        limit: usize,
    ) -> Self {
        Self {
            chat_repository,
            registry,
            limit,
            gate: Arc::default(),
        }
    }

    /// ブロードキャスト側と共有するゲート
    pub fn gate(&self) -> Arc<ChatBroadcastGate> {
        self.gate.clone()
    }

    /// 直近のメッセージ（古い順）
    pub async fn recent(&self) -> Result<Vec<ChatMessage>, RepositoryError> {
        self.chat_repository.recent_messages(self.limit).await
    }

    /// 直近のメッセージを一つの接続に再送する
    ///
    /// # Returns
    ///
    /// 送信したメッセージ数
    pub async fn replay_to(&self, connection_id: &ConnectionId) -> Result<usize, ChatHistoryError> {
        let messages = self.recent().await?;
        let count = messages.len();
        for message in messages {
            let event = GroupEvent::ChatMessage {
                message: message.body.into_string(),
                username: message.display_name,
            };
            self.registry.send_to(connection_id, &event).await?;
        }
        Ok(count)
    }

    /// 履歴を再送してから chat_chat に参加させる
    ///
    /// 再送の失敗は参加を妨げない。送信チャンネルは再送分を収められる容量が必要。
    ///
    /// # Returns
    ///
    /// 再送したメッセージ数
    pub async fn replay_and_join(
        &self,
        connection_id: &ConnectionId,
    ) -> Result<usize, GroupError> {
        let _joining = self.gate.joining().await;

        let replayed = match self.replay_to(connection_id).await {
            Ok(count) => count,
            Err(e) => {
                tracing::warn!("Failed to replay chat history to {}: {}", connection_id, e);
                0
            }
        };
        self.registry.join(&GroupName::chat(), connection_id).await?;

        Ok(replayed)
    }
}
