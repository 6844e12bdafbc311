//! UseCase: コンシューマー切断処理

use std::sync::Arc;

use crate::domain::{ConnectionId, GroupName, GroupRegistry};

/// コンシューマー切断のユースケース
pub struct DisconnectConsumerUseCase {
    registry: Arc<dyn GroupRegistry>,
}

impl DisconnectConsumerUseCase {
    pub fn new(registry: Arc<dyn GroupRegistry>) -> Self {
        Self { registry }
    }

    /// 接続を全グループから外す
    ///
    /// # Returns
    ///
    /// 離脱したグループ（二度目以降の呼び出しでは空）
    pub async fn execute(&self, connection_id: &ConnectionId) -> Vec<GroupName> {
        self.registry.unregister(connection_id).await
    }
}
