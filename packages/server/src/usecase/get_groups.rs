//! UseCase: グループ状態の取得（デバッグ用）

use std::sync::Arc;

use crate::domain::{ConnectionId, GroupName, GroupRegistry, GroupSummary};

/// グループ状態取得のユースケース
pub struct GetGroupsUseCase {
    registry: Arc<dyn GroupRegistry>,
}

impl GetGroupsUseCase {
    pub fn new(registry: Arc<dyn GroupRegistry>) -> Self {
        Self { registry }
    }

    /// 空でない全グループ
    pub async fn list(&self) -> Vec<GroupSummary> {
        self.registry.group_summaries().await
    }

    /// グループのメンバー（存在しないグループは空）
    pub async fn members(&self, group: &GroupName) -> Vec<ConnectionId> {
        self.registry.members(group).await
    }
}
