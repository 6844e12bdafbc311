//! UseCase: コンシューマー接続処理
//!
//! ## テスト実装の作業記録
//!
//! ### 何をテストしているか
//! - ConnectConsumerUseCase::execute() メソッド
//! - 認証チェック（Connecting → Open / Closed の遷移）とグループ参加
//!
//! ### なぜこのテストが必要か
//! - 認証が必要なコンシューマーに匿名ユーザーが参加できないことを保証
//! - 拒否された接続がレジストリに一切痕跡を残さないことを確認
//!
//! ### どのような状況を想定しているか
//! - 正常系：各コンシューマーへの接続
//! - 異常系：匿名ユーザーによるチャット・通知への接続

use std::sync::Arc;

use hiroba_shared::time::Clock;

use crate::domain::{
    Connection, ConnectionChannel, ConnectionId, ConsumerKind, GroupRegistry, Principal,
    Timestamp,
};

use super::{chat_history::ChatHistoryUseCase, error::ConnectError};

/// コンシューマー接続のユースケース
pub struct ConnectConsumerUseCase {
    registry: Arc<dyn GroupRegistry>,
    clock: Arc<dyn Clock>,
    chat_history: Option<Arc<ChatHistoryUseCase>>,
}

impl ConnectConsumerUseCase {
    pub fn new(registry: Arc<dyn GroupRegistry>, clock: Arc<dyn Clock>) -> Self {
        Self {
            registry,
            clock,
            chat_history: None,
        }
    }

    /// チャット接続の参加前に履歴を再送する
    pub fn with_chat_history(mut self, chat_history: Arc<ChatHistoryUseCase>) -> Self {
        self.chat_history = Some(chat_history);
        self
    }

    /// 接続を受け付け、コンシューマーのグループに参加させる
    ///
    /// # Arguments
    ///
    /// * `kind` - 接続先のコンシューマー
    /// * `principal` - 認証プロバイダが解決した接続元
    /// * `channel` - この接続への送信チャンネル
    ///
    /// # Returns
    ///
    /// * `Ok(Connection)` - Open 状態の接続
    /// * `Err(ConnectError::AuthRejected)` - 認証が必要なのに匿名だった（グループ参加なし）
    pub async fn execute(
        &self,
        kind: ConsumerKind,
        principal: Principal,
        channel: ConnectionChannel,
    ) -> Result<Connection, ConnectError> {
        // 1. 認証チェック
        let group = kind
            .admit(&principal)
            .map_err(|denied| ConnectError::AuthRejected(denied.kind))?;

        // 2. レジストリに登録
        let id = ConnectionId::generate();
        self.registry.register(id, channel).await?;

        // 3. グループに参加（チャットは履歴の再送が先、失敗したら登録を取り消す）
        let joined = match (&self.chat_history, kind) {
            (Some(history), ConsumerKind::ChatRoom) => {
                history.replay_and_join(&id).await.map(|_| ())
            }
            _ => self.registry.join(&group, &id).await,
        };
        if let Err(e) = joined {
            self.registry.unregister(&id).await;
            return Err(e.into());
        }

        Ok(Connection {
            id,
            principal,
            kind,
            group,
            connected_at: Timestamp::new(self.clock.now_millis()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        domain::{GroupName, PostId, UserId, Username},
        infrastructure::group_registry::InMemoryGroupRegistry,
    };
    use hiroba_shared::time::FixedClock;
    use std::time::Duration;
    use tokio::sync::mpsc;

    fn create_usecase() -> (ConnectConsumerUseCase, Arc<InMemoryGroupRegistry>) {
        let registry = Arc::new(InMemoryGroupRegistry::new(Duration::from_millis(50)));
        let usecase = ConnectConsumerUseCase::new(registry.clone(), Arc::new(FixedClock::new(1000)));
        (usecase, registry)
    }

    fn alice() -> Principal {
        Principal::Authenticated {
            user_id: UserId::new(1),
            username: Username::new("alice".to_string()).unwrap(),
        }
    }

    #[tokio::test]
    async fn test_authenticated_user_joins_chat() {
        // テスト項目: 認証済みユーザーがチャットに接続すると chat_chat に参加する
        // given (前提条件):
        let (usecase, registry) = create_usecase();
        let (tx, _rx) = mpsc::channel(8);

        // when (操作):
        let connection = usecase
            .execute(ConsumerKind::ChatRoom, alice(), tx)
            .await
            .unwrap();

        // then (期待する結果):
        assert_eq!(connection.group, GroupName::chat());
        assert_eq!(connection.connected_at, Timestamp::new(1000));
        assert_eq!(registry.members(&GroupName::chat()).await, vec![connection.id]);
    }

    #[tokio::test]
    async fn test_anonymous_user_is_rejected_from_notifications() {
        // テスト項目: 匿名ユーザーの通知コンシューマー接続は拒否され、グループ参加はゼロ
        // given (前提条件):
        let (usecase, registry) = create_usecase();
        let (tx, _rx) = mpsc::channel(8);

        // when (操作):
        let result = usecase
            .execute(ConsumerKind::UserNotifications, Principal::Anonymous, tx)
            .await;

        // then (期待する結果):
        assert_eq!(
            result.unwrap_err(),
            ConnectError::AuthRejected(ConsumerKind::UserNotifications)
        );
        assert!(registry.group_summaries().await.is_empty());
    }

    #[tokio::test]
    async fn test_anonymous_user_joins_post_updates() {
        // テスト項目: 匿名ユーザーでも投稿更新コンシューマーには接続できる
        // given (前提条件):
        let (usecase, registry) = create_usecase();
        let (tx, _rx) = mpsc::channel(8);

        // when (操作):
        let connection = usecase
            .execute(
                ConsumerKind::PostUpdates(PostId::new(42)),
                Principal::Anonymous,
                tx,
            )
            .await
            .unwrap();

        // then (期待する結果):
        assert_eq!(connection.group.as_str(), "post_42");
        assert_eq!(registry.groups_of(&connection.id).await, vec![connection.group]);
    }
}
