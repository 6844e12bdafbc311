//! UseCase: チャットメッセージ送信処理
//!
//! ## テスト実装の作業記録
//!
//! ### 何をテストしているか
//! - SendChatMessageUseCase::execute() メソッド
//! - メッセージの保存と chat_chat グループへのブロードキャスト
//!
//! ### なぜこのテストが必要か
//! - 保存されたレコードと配信内容が一致することを確認
//! - 保存失敗時の振る舞いが PersistencePolicy どおりであることを保証
//!
//! ### どのような状況を想定しているか
//! - 正常系：alice の発言が bob に届く
//! - 異常系：保存失敗（BestEffort なら配信、Required なら配信しない）

use std::sync::Arc;

use hiroba_shared::time::Clock;

use crate::domain::{
    ChatMessage, ChatMessageRepository, Connection, GroupEvent, GroupName, GroupRegistry,
    MessageBody, PublishReport, Timestamp,
};

use super::{chat_history::ChatBroadcastGate, error::SendChatMessageError};

/// What to do when a chat message cannot be persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum PersistencePolicy {
    /// Broadcast regardless of the persistence outcome.
    #[default]
    BestEffort,
    /// Only broadcast messages that were saved.
    Required,
}

/// チャットメッセージ送信のユースケース
pub struct SendChatMessageUseCase {
    chat_repository: Arc<dyn ChatMessageRepository>,
    registry: Arc<dyn GroupRegistry>,
    clock: Arc<dyn Clock>,
    policy: PersistencePolicy,
    gate: Arc<ChatBroadcastGate>,
}

impl SendChatMessageUseCase {
    pub fn new(
        chat_repository: Arc<dyn ChatMessageRepository>,
        registry: Arc<dyn GroupRegistry>,
        clock: Arc<dyn Clock>,
        policy: PersistencePolicy,
    ) -> Self {
        Self {
            chat_repository,
            registry,
            clock,
            policy,
            gate: Arc::default(),
        }
    }

    /// 履歴の再送と共有するゲートを使う
    pub fn with_gate(mut self, gate: Arc<ChatBroadcastGate>) -> Self {
        self.gate = gate;
        self
    }

    /// メッセージを保存し、チャットの全員に配信する
    ///
    /// # Arguments
    ///
    /// * `connection` - 送信者の接続
    /// * `body` - メッセージ本文
    ///
    /// # Returns
    ///
    /// * `Ok(PublishReport)` - 配信結果
    /// * `Err(SendChatMessageError)` - `Required` ポリシーで保存に失敗した
    pub async fn execute(
        &self,
        connection: &Connection,
        body: MessageBody,
    ) -> Result<PublishReport, SendChatMessageError> {
        // 保存から配信までの間は新しい参加者の履歴取得を待たせる
        let _broadcasting = self.gate.broadcasting().await;

        let created_at = Timestamp::new(self.clock.now_millis());
        let message = ChatMessage::new(&connection.principal, body, created_at);
        let event = GroupEvent::ChatMessage {
            message: message.body.as_str().to_string(),
            username: message.display_name.clone(),
        };

        // 1. 保存
        if let Err(e) = self.chat_repository.save_chat_message(message).await {
            match self.policy {
                PersistencePolicy::BestEffort => {
                    tracing::warn!(
                        "Chat message from '{}' not persisted, broadcasting anyway: {}",
                        connection.principal.display_name(),
                        e
                    );
                }
                PersistencePolicy::Required => {
                    tracing::error!(
                        "Chat message from '{}' not persisted, dropping it: {}",
                        connection.principal.display_name(),
                        e
                    );
                    return Err(SendChatMessageError::Persistence(e));
                }
            }
        }

        // 2. ブロードキャスト
        Ok(self.registry.publish(&GroupName::chat(), &event).await)
    }
}
