//! UseCase: 投稿ごとのいいね・コメント更新
//!
//! ## テスト実装の作業記録
//!
//! ### 何をテストしているか
//! - いいね数の再取得と post_<id> グループへの配信
//! - コメントのそのままの中継
//! - HTTP からのいいね切り替えと配信
//!
//! ### どのような状況を想定しているか
//! - 正常系：いいね数 5 の投稿 42
//! - エッジケース：存在しない投稿（いいね数 0 として扱う）、post_id なし
//! - 異常系：永続化層が利用できない（配信しない）

use std::sync::Arc;

use crate::domain::{
    CommentPayload, GroupEvent, GroupName, GroupRegistry, LikeToggle, PostId, PostRepository,
    PublishReport, RepositoryError, UserId,
};

use super::error::UpdateLikeCountError;

/// 投稿更新のユースケース
pub struct PostUpdatesUseCase {
    post_repository: Arc<dyn PostRepository>,
    registry: Arc<dyn GroupRegistry>,
}

impl PostUpdatesUseCase {
    pub fn new(post_repository: Arc<dyn PostRepository>, registry: Arc<dyn GroupRegistry>) -> Self {
        Self {
            post_repository,
            registry,
        }
    }

    /// 最新のいいね数を読み直して `group` に配信する
    ///
    /// 存在しない投稿・`post_id` なしはいいね数 0 として扱う。
    pub async fn update_like_count(
        &self,
        group: &GroupName,
        post_id: Option<PostId>,
        user_id: Option<UserId>,
    ) -> Result<PublishReport, UpdateLikeCountError> {
        let like_count = match post_id {
            Some(id) => match self.post_repository.get_like_count(id).await {
                Ok(count) => count,
                Err(RepositoryError::NotFound(what)) => {
                    tracing::debug!("{} not found, reporting zero likes", what);
                    0
                }
                Err(e) => return Err(UpdateLikeCountError::Persistence(e)),
            },
            None => 0,
        };

        let event = GroupEvent::LikeCountUpdate {
            post_id,
            like_count,
            user_id,
        };
        Ok(self.registry.publish(group, &event).await)
    }

    /// コメントを `group` にそのまま中継する
    pub async fn relay_comment(&self, group: &GroupName, comment: CommentPayload) -> PublishReport {
        self.registry
            .publish(group, &GroupEvent::CommentNotification(comment))
            .await
    }

    /// いいねを切り替え、投稿の購読者に新しいいいね数を配信する
    pub async fn toggle_like(
        &self,
        post_id: PostId,
        user_id: UserId,
    ) -> Result<LikeToggle, UpdateLikeCountError> {
        let toggle = self
            .post_repository
            .toggle_like(post_id, user_id)
            .await
            .map_err(UpdateLikeCountError::Persistence)?;

        let event = GroupEvent::LikeCountUpdate {
            post_id: Some(post_id),
            like_count: toggle.like_count,
            user_id: Some(user_id),
        };
        self.registry.publish(&GroupName::post(post_id), &event).await;

        Ok(toggle)
    }
}
