//! UseCase: 新規投稿のライブフィード配信

use std::sync::Arc;

use crate::domain::{GroupEvent, GroupName, GroupRegistry, PostId, PublishReport};

/// 新規投稿通知のユースケース
pub struct AnnounceNewPostUseCase {
    registry: Arc<dyn GroupRegistry>,
}

impl AnnounceNewPostUseCase {
    pub fn new(registry: Arc<dyn GroupRegistry>) -> Self {
        Self { registry }
    }

    /// ライブフィードの全購読者に新規投稿を知らせる
    pub async fn execute(&self, post_id: Option<PostId>, author: Option<String>) -> PublishReport {
        let event = GroupEvent::new_post(post_id, author);
        self.registry.publish(&GroupName::live_feed(), &event).await
    }
}
