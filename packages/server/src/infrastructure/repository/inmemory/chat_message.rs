//! InMemory ChatMessage Repository 実装
//!
//! ドメイン層が定義する `ChatMessageRepository` trait の具体的な実装。
//! 保持件数を超えると古いメッセージから破棄します。

use std::collections::VecDeque;

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::domain::{ChatMessage, ChatMessageRepository, RepositoryError};

/// インメモリのチャットメッセージ保存先
pub struct InMemoryChatMessageRepository {
    /// 作成順（古い順）
    messages: Mutex<VecDeque<ChatMessage>>,
    capacity: usize,
}

impl InMemoryChatMessageRepository {
    pub const DEFAULT_CAPACITY: usize = 1_000;

    pub fn new() -> Self {
        Self::with_capacity(Self::DEFAULT_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            messages: Mutex::new(VecDeque::new()),
            capacity: capacity.max(1),
        }
    }

    pub async fn len(&self) -> usize {
        self.messages.lock().await.len()
    }
}

impl Default for InMemoryChatMessageRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ChatMessageRepository for InMemoryChatMessageRepository {
    async fn save_chat_message(&self, message: ChatMessage) -> Result<(), RepositoryError> {
        let mut messages = self.messages.lock().await;
        if messages.len() == self.capacity {
            messages.pop_front();
        }
        messages.push_back(message);
        Ok(())
    }

    async fn recent_messages(&self, limit: usize) -> Result<Vec<ChatMessage>, RepositoryError> {
        let messages = self.messages.lock().await;
        let skip = messages.len().saturating_sub(limit);
        Ok(messages.iter().skip(skip).cloned().collect())
    }
}
