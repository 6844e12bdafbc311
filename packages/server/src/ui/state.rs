//! Shared application state.

use std::sync::Arc;

use hiroba_shared::time::Clock;

use crate::{
    domain::{Authenticator, ChatMessageRepository, GroupRegistry, PostRepository},
    usecase::{
        AnnounceNewPostUseCase, ChatHistoryUseCase, ConnectConsumerUseCase,
        DisconnectConsumerUseCase, GetGroupsUseCase, PersistencePolicy, PostUpdatesUseCase,
        PushNotificationUseCase, SendChatMessageUseCase,
    },
};

/// Tunables that shape how connections are served.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConsumerSettings {
    /// Outbound queue length of one connection.
    pub channel_capacity: usize,
    pub persistence_policy: PersistencePolicy,
    /// Chat messages replayed to a newly opened chat connection, capped at
    /// `channel_capacity`.
    pub history_limit: usize,
}

impl Default for ConsumerSettings {
    fn default() -> Self {
        Self {
            channel_capacity: 64,
            persistence_policy: PersistencePolicy::default(),
            history_limit: 50,
        }
    }
}

/// Shared application state
pub struct AppState {
    /// Authenticator（接続元の認証）
    pub authenticator: Arc<dyn Authenticator>,
    /// ConnectConsumerUseCase（コンシューマー接続のユースケース）
    pub connect_consumer_usecase: Arc<ConnectConsumerUseCase>,
    /// DisconnectConsumerUseCase（コンシューマー切断のユースケース）
    pub disconnect_consumer_usecase: Arc<DisconnectConsumerUseCase>,
    /// SendChatMessageUseCase（チャットメッセージ送信のユースケース）
    pub send_chat_message_usecase: Arc<SendChatMessageUseCase>,
    /// ChatHistoryUseCase（チャット履歴のユースケース）
    pub chat_history_usecase: Arc<ChatHistoryUseCase>,
    /// AnnounceNewPostUseCase（新規投稿通知のユースケース）
    pub announce_new_post_usecase: Arc<AnnounceNewPostUseCase>,
    /// PostUpdatesUseCase（投稿更新のユースケース）
    pub post_updates_usecase: Arc<PostUpdatesUseCase>,
    /// PushNotificationUseCase（ユーザー通知のユースケース）
    pub push_notification_usecase: Arc<PushNotificationUseCase>,
    /// GetGroupsUseCase（グループ状態取得のユースケース）
    pub get_groups_usecase: Arc<GetGroupsUseCase>,
    pub channel_capacity: usize,
}

impl AppState {
    /// Build every use case on top of the given infrastructure.
    pub fn new(
        registry: Arc<dyn GroupRegistry>,
        chat_repository: Arc<dyn ChatMessageRepository>,
        post_repository: Arc<dyn PostRepository>,
        authenticator: Arc<dyn Authenticator>,
        clock: Arc<dyn Clock>,
        settings: ConsumerSettings,
    ) -> Self {
        // 履歴は送信タスクの起動前に送信チャンネルへ積むため、容量を超えて再送しない
        let chat_history_usecase = Arc::new(ChatHistoryUseCase::new(
            chat_repository.clone(),
            registry.clone(),
            settings.history_limit.min(settings.channel_capacity),
        ));

        Self {
            authenticator,
            connect_consumer_usecase: Arc::new(
                ConnectConsumerUseCase::new(registry.clone(), clock.clone())
                    .with_chat_history(chat_history_usecase.clone()),
            ),
            disconnect_consumer_usecase: Arc::new(DisconnectConsumerUseCase::new(
                registry.clone(),
            )),
            send_chat_message_usecase: Arc::new(
                SendChatMessageUseCase::new(
                    chat_repository,
                    registry.clone(),
                    clock,
                    settings.persistence_policy,
                )
                .with_gate(chat_history_usecase.gate()),
            ),
            chat_history_usecase,
            announce_new_post_usecase: Arc::new(AnnounceNewPostUseCase::new(registry.clone())),
            post_updates_usecase: Arc::new(PostUpdatesUseCase::new(
                post_repository,
                registry.clone(),
            )),
            push_notification_usecase: Arc::new(PushNotificationUseCase::new(registry.clone())),
            get_groups_usecase: Arc::new(GetGroupsUseCase::new(registry)),
            channel_capacity: settings.channel_capacity,
        }
    }
}
