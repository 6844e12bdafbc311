//! InMemory Post Repository 実装
//!
//! 投稿ごとに「いいね」したユーザーの集合を保持します。
//! 一人のユーザーは一つの投稿に一度だけいいねできます。

use std::collections::{HashMap, HashSet};

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::domain::{LikeToggle, PostId, PostRepository, RepositoryError, UserId};

#[derive(Default)]
pub struct InMemoryPostRepository {
    likes: Mutex<HashMap<PostId, HashSet<UserId>>>,
}

impl InMemoryPostRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make a post known without any likes.
    pub async fn add_post(&self, post_id: PostId) {
        self.likes.lock().await.entry(post_id).or_default();
    }
}

#[async_trait]
impl PostRepository for InMemoryPostRepository {
    async fn get_like_count(&self, post_id: PostId) -> Result<u64, RepositoryError> {
        let likes = self.likes.lock().await;
        likes
            .get(&post_id)
            .map(|users| users.len() as u64)
            .ok_or_else(|| RepositoryError::NotFound(format!("post {post_id}")))
    }

    async fn toggle_like(
        &self,
        post_id: PostId,
        user_id: UserId,
    ) -> Result<LikeToggle, RepositoryError> {
        let mut likes = self.likes.lock().await;
        let users = likes.entry(post_id).or_default();
        let liked = if users.remove(&user_id) {
            false
        } else {
            users.insert(user_id);
            true
        };
        Ok(LikeToggle {
            liked,
            like_count: users.len() as u64,
        })
    }
}
