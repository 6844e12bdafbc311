//! UseCase layer: one use case per consumer operation.

pub mod announce_new_post;
pub mod chat_history;
pub mod connect_consumer;
pub mod disconnect_consumer;
pub mod error;
pub mod get_groups;
pub mod post_updates;
pub mod push_notification;
pub mod send_chat_message;

pub use announce_new_post::AnnounceNewPostUseCase;
pub use chat_history::{ChatBroadcastGate, ChatHistoryUseCase};
pub use connect_consumer::ConnectConsumerUseCase;
pub use disconnect_consumer::DisconnectConsumerUseCase;
pub use error::{ChatHistoryError, ConnectError, SendChatMessageError, UpdateLikeCountError};
pub use get_groups::GetGroupsUseCase;
pub use post_updates::PostUpdatesUseCase;
pub use push_notification::PushNotificationUseCase;
pub use send_chat_message::{PersistencePolicy, SendChatMessageUseCase};
