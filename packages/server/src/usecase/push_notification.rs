//! UseCase: ユーザー通知の配信
//!
//! 通知コンシューマーは受信専用のため、通知は外部（HTTP API）から投入される。

use std::sync::Arc;

use crate::domain::{GroupEvent, GroupName, GroupRegistry, Notification, PublishReport, UserId};

/// ユーザー通知のユースケース
pub struct PushNotificationUseCase {
    registry: Arc<dyn GroupRegistry>,
}

impl PushNotificationUseCase {
    pub fn new(registry: Arc<dyn GroupRegistry>) -> Self {
        Self { registry }
    }

    /// `user_<id>_notifications` の全接続に通知を配信する
    pub async fn execute(&self, user_id: UserId, notification: Notification) -> PublishReport {
        self.registry
            .publish(
                &GroupName::user_notifications(user_id),
                &GroupEvent::NotificationMessage(notification),
            )
            .await
    }
}
