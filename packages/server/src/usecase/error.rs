//! UseCase 層のエラー型

use thiserror::Error;

use crate::domain::{ConsumerKind, GroupError, RepositoryError, TransportError};

/// 接続（Connecting → Open）の失敗
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConnectError {
    #[error("authentication required for the {0} consumer")]
    AuthRejected(ConsumerKind),

    #[error(transparent)]
    Registry(#[from] GroupError),
}

/// チャットメッセージ送信の失敗
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SendChatMessageError {
    #[error("chat message was not persisted: {0}")]
    Persistence(RepositoryError),
}

/// いいね数の取得・更新の失敗
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum UpdateLikeCountError {
    #[error("like count unavailable: {0}")]
    Persistence(RepositoryError),
}

/// 履歴再送の失敗
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ChatHistoryError {
    #[error(transparent)]
    Persistence(#[from] RepositoryError),

    #[error(transparent)]
    Transport(#[from] TransportError),
}
