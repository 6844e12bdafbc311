//! In-process `GroupRegistry` implementation.
//!
//! ## Responsibilities
//!
//! - Own the group → members arena and, per connection, the set of groups it
//!   joined (so that `unregister` is exact and idempotent)
//! - Fan a published event out to every member's outbound channel
//!
//! ## Locking
//!
//! The state mutex is held only while the arena is read or mutated. Fan-out
//! works on a snapshot of `(member, channel)` pairs taken under the lock, so a
//! slow member never blocks joins, leaves or publishes elsewhere. Members whose
//! send fails are evicted from the group afterwards.

use std::{
    collections::{HashMap, HashSet},
    time::Duration,
};

use async_trait::async_trait;
use tokio::sync::{Mutex, mpsc::error::SendTimeoutError};

use crate::{
    domain::{
        ConnectionChannel, ConnectionId, GroupError, GroupEvent, GroupName, GroupRegistry,
        GroupSummary, PublishReport, TransportError,
    },
    infrastructure::dto::conversion::encode_event,
};

struct ConnectionSlot {
    channel: ConnectionChannel,
    groups: HashSet<GroupName>,
}

#[derive(Default)]
struct RegistryState {
    groups: HashMap<GroupName, HashSet<ConnectionId>>,
    connections: HashMap<ConnectionId, ConnectionSlot>,
}

impl RegistryState {
    /// Remove one membership; drops the group once it is empty.
    fn remove_member(&mut self, group: &GroupName, connection_id: &ConnectionId) -> bool {
        let removed = match self.groups.get_mut(group) {
            Some(members) => {
                let removed = members.remove(connection_id);
                if members.is_empty() {
                    self.groups.remove(group);
                }
                removed
            }
            None => false,
        };
        if let Some(slot) = self.connections.get_mut(connection_id) {
            slot.groups.remove(group);
        }
        removed
    }
}

/// Registry of connections and the groups they joined.
pub struct InMemoryGroupRegistry {
    state: Mutex<RegistryState>,
    /// Upper bound for handing one frame to one member
    send_timeout: Duration,
}

impl InMemoryGroupRegistry {
    pub fn new(send_timeout: Duration) -> Self {
        Self {
            state: Mutex::new(RegistryState::default()),
            send_timeout,
        }
    }

    async fn deliver(
        &self,
        connection_id: ConnectionId,
        channel: &ConnectionChannel,
        frame: String,
    ) -> Result<(), TransportError> {
        channel
            .send_timeout(frame, self.send_timeout)
            .await
            .map_err(|e| match e {
                SendTimeoutError::Closed(_) => TransportError::ChannelClosed(connection_id),
                SendTimeoutError::Timeout(_) => TransportError::SendTimedOut(connection_id),
            })
    }
}

#[async_trait]
impl GroupRegistry for InMemoryGroupRegistry {
    async fn register(
        &self,
        connection_id: ConnectionId,
        channel: ConnectionChannel,
    ) -> Result<(), GroupError> {
        let mut state = self.state.lock().await;
        if state.connections.contains_key(&connection_id) {
            return Err(GroupError::AlreadyRegistered(connection_id));
        }
        state.connections.insert(
            connection_id,
            ConnectionSlot {
                channel,
                groups: HashSet::new(),
            },
        );
        tracing::debug!("Connection '{}' registered", connection_id);
        Ok(())
    }

    async fn unregister(&self, connection_id: &ConnectionId) -> Vec<GroupName> {
        let mut state = self.state.lock().await;
        let Some(slot) = state.connections.remove(connection_id) else {
            return Vec::new();
        };

        let mut left: Vec<GroupName> = slot.groups.into_iter().collect();
        left.sort();
        for group in &left {
            state.remove_member(group, connection_id);
        }
        tracing::debug!(
            "Connection '{}' unregistered, left {} group(s)",
            connection_id,
            left.len()
        );
        left
    }

    async fn join(
        &self,
        group: &GroupName,
        connection_id: &ConnectionId,
    ) -> Result<(), GroupError> {
        let mut state = self.state.lock().await;
        let Some(slot) = state.connections.get_mut(connection_id) else {
            return Err(GroupError::ConnectionNotRegistered(*connection_id));
        };
        slot.groups.insert(group.clone());
        state
            .groups
            .entry(group.clone())
            .or_default()
            .insert(*connection_id);
        tracing::debug!("Connection '{}' joined '{}'", connection_id, group);
        Ok(())
    }

    async fn leave(&self, group: &GroupName, connection_id: &ConnectionId) {
        let mut state = self.state.lock().await;
        if state.remove_member(group, connection_id) {
            tracing::debug!("Connection '{}' left '{}'", connection_id, group);
        }
    }

    async fn publish(&self, group: &GroupName, event: &GroupEvent) -> PublishReport {
        let targets: Vec<(ConnectionId, ConnectionChannel)> = {
            let state = self.state.lock().await;
            match state.groups.get(group) {
                Some(members) => members
                    .iter()
                    .filter_map(|id| {
                        state
                            .connections
                            .get(id)
                            .map(|slot| (*id, slot.channel.clone()))
                    })
                    .collect(),
                None => return PublishReport::default(),
            }
        };

        let frame = match encode_event(event) {
            Ok(frame) => frame,
            Err(e) => {
                tracing::error!("Failed to encode '{}' for '{}': {}", event.kind(), group, e);
                return PublishReport::default();
            }
        };

        let mut report = PublishReport::default();
        for (connection_id, channel) in targets {
            // 一部のメンバーへの送信失敗は他のメンバーへの配信を妨げない
            match self.deliver(connection_id, &channel, frame.clone()).await {
                Ok(()) => report.delivered += 1,
                Err(e) => {
                    tracing::warn!("Evicting member from '{}': {}", group, e);
                    report.evicted.push(connection_id);
                }
            }
        }

        if !report.evicted.is_empty() {
            let mut state = self.state.lock().await;
            for connection_id in &report.evicted {
                state.remove_member(group, connection_id);
            }
        }

        tracing::debug!(
            "Published '{}' to '{}' ({} delivered, {} evicted)",
            event.kind(),
            group,
            report.delivered,
            report.evicted.len()
        );
        report
    }

    async fn send_to(
        &self,
        connection_id: &ConnectionId,
        event: &GroupEvent,
    ) -> Result<(), TransportError> {
        let channel = {
            let state = self.state.lock().await;
            state
                .connections
                .get(connection_id)
                .map(|slot| slot.channel.clone())
                .ok_or(TransportError::ConnectionNotFound(*connection_id))?
        };
        let frame = encode_event(event).map_err(|e| TransportError::Encode(e.to_string()))?;
        self.deliver(*connection_id, &channel, frame).await
    }

    async fn members(&self, group: &GroupName) -> Vec<ConnectionId> {
        let state = self.state.lock().await;
        let mut members: Vec<ConnectionId> = state
            .groups
            .get(group)
            .map(|members| members.iter().copied().collect())
            .unwrap_or_default();
        members.sort();
        members
    }

    async fn groups_of(&self, connection_id: &ConnectionId) -> Vec<GroupName> {
        let state = self.state.lock().await;
        let mut groups: Vec<GroupName> = state
            .connections
            .get(connection_id)
            .map(|slot| slot.groups.iter().cloned().collect())
            .unwrap_or_default();
        groups.sort();
        groups
    }

    async fn group_summaries(&self) -> Vec<GroupSummary> {
        let state = self.state.lock().await;
        let mut summaries: Vec<GroupSummary> = state
            .groups
            .iter()
            .map(|(name, members)| GroupSummary {
                name: name.clone(),
                member_count: members.len(),
            })
            .collect();
        summaries.sort_by(|a, b| a.name.cmp(&b.name));
        summaries
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{PostId, UserId};
    use tokio::sync::mpsc;

    // ========================================
    // テスト作業記録
    // ========================================
    // 【何をテストするか】
    // - join / leave の冪等性とグループの暗黙的な生成・削除
    // - publish がメンバー全員にちょうど一度だけ届くこと
    // - 送信失敗したメンバーがグループから外れること（自己修復）
    // - unregister が全グループから一度だけ外すこと
    //
    // 【なぜこのテストが必要か】
    // - レジストリは全コンシューマーが共有する唯一の可変状態
    // - メンバーシップの不整合は配信漏れ・誤配信に直結する
    // ========================================

    fn create_test_registry() -> InMemoryGroupRegistry {
        InMemoryGroupRegistry::new(Duration::from_millis(50))
    }

    async fn register(
        registry: &InMemoryGroupRegistry,
        capacity: usize,
    ) -> (ConnectionId, mpsc::Receiver<String>) {
        let id = ConnectionId::generate();
        let (tx, rx) = mpsc::channel(capacity);
        registry.register(id, tx).await.unwrap();
        (id, rx)
    }

    fn like_event(like_count: u64) -> GroupEvent {
        GroupEvent::LikeCountUpdate {
            post_id: Some(PostId::new(42)),
            like_count,
            user_id: Some(UserId::new(7)),
        }
    }

    #[tokio::test]
    async fn test_join_is_idempotent() {
        // テスト項目: 同じグループに複数回 join してもメンバーは一つ
        // given (前提条件):
        let registry = create_test_registry();
        let (alice, _rx) = register(&registry, 8).await;
        let group = GroupName::chat();

        // when (操作):
        registry.join(&group, &alice).await.unwrap();
        registry.join(&group, &alice).await.unwrap();

        // then (期待する結果):
        assert_eq!(registry.members(&group).await, vec![alice]);
        assert_eq!(registry.groups_of(&alice).await, vec![group]);
    }

    #[tokio::test]
    async fn test_join_unregistered_connection_fails() {
        // テスト項目: 未登録の接続は join できない
        // given (前提条件):
        let registry = create_test_registry();
        let stranger = ConnectionId::generate();

        // when (操作):
        let result = registry.join(&GroupName::chat(), &stranger).await;

        // then (期待する結果):
        assert_eq!(result, Err(GroupError::ConnectionNotRegistered(stranger)));
        assert!(registry.members(&GroupName::chat()).await.is_empty());
    }

    #[tokio::test]
    async fn test_register_twice_fails() {
        // テスト項目: 同じ接続 ID の二重登録はエラーになる
        // given (前提条件):
        let registry = create_test_registry();
        let (alice, _rx) = register(&registry, 8).await;
        let (tx, _rx2) = mpsc::channel(8);

        // when (操作):
        let result = registry.register(alice, tx).await;

        // then (期待する結果):
        assert_eq!(result, Err(GroupError::AlreadyRegistered(alice)));
    }

    #[tokio::test]
    async fn test_leave_is_idempotent_and_removes_empty_group() {
        // テスト項目: leave は何度呼んでもエラーにならず、空のグループは消える
        // given (前提条件):
        let registry = create_test_registry();
        let (alice, _rx) = register(&registry, 8).await;
        let group = GroupName::post(PostId::new(1));
        registry.join(&group, &alice).await.unwrap();

        // when (操作):
        registry.leave(&group, &alice).await;
        registry.leave(&group, &alice).await;
        registry.leave(&GroupName::live_feed(), &alice).await;

        // then (期待する結果):
        assert!(registry.members(&group).await.is_empty());
        assert!(registry.group_summaries().await.is_empty());
        assert!(registry.groups_of(&alice).await.is_empty());
    }

    #[tokio::test]
    async fn test_join_leave_sequence_matches_replay() {
        // テスト項目: join/leave の任意の列の結果は、順に適用した集合と一致する
        // given (前提条件):
        let registry = create_test_registry();
        let group = GroupName::live_feed();
        let mut ids = Vec::new();
        let mut receivers = Vec::new();
        for _ in 0..3 {
            let (id, rx) = register(&registry, 8).await;
            ids.push(id);
            receivers.push(rx);
        }
        let ops: [(usize, bool); 8] = [
            (0, true),
            (1, true),
            (0, true),
            (1, false),
            (2, true),
            (1, false),
            (0, false),
            (1, true),
        ];

        // when (操作):
        let mut expected = std::collections::BTreeSet::new();
        for (index, is_join) in ops {
            if is_join {
                registry.join(&group, &ids[index]).await.unwrap();
                expected.insert(ids[index]);
            } else {
                registry.leave(&group, &ids[index]).await;
                expected.remove(&ids[index]);
            }
        }

        // then (期待する結果):
        let expected: Vec<ConnectionId> = expected.into_iter().collect();
        assert_eq!(registry.members(&group).await, expected);
    }

    #[tokio::test]
    async fn test_publish_reaches_each_member_exactly_once() {
        // テスト項目: publish はメンバー全員にちょうど一度届き、非メンバーには届かない
        // given (前提条件):
        let registry = create_test_registry();
        let (alice, mut alice_rx) = register(&registry, 8).await;
        let (bob, mut bob_rx) = register(&registry, 8).await;
        let (_carol, mut carol_rx) = register(&registry, 8).await;
        let group = GroupName::post(PostId::new(42));
        registry.join(&group, &alice).await.unwrap();
        registry.join(&group, &bob).await.unwrap();

        // when (操作):
        let report = registry.publish(&group, &like_event(5)).await;

        // then (期待する結果):
        assert_eq!(report.delivered, 2);
        assert!(report.evicted.is_empty());
        let expected = r#"{"type":"like_update","post_id":42,"like_count":5,"user_id":7}"#;
        assert_eq!(alice_rx.recv().await.as_deref(), Some(expected));
        assert_eq!(bob_rx.recv().await.as_deref(), Some(expected));
        assert!(alice_rx.try_recv().is_err());
        assert!(bob_rx.try_recv().is_err());
        assert!(carol_rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_publish_to_empty_group_is_noop() {
        // テスト項目: メンバーのいないグループへの publish は何もしない
        // given (前提条件):
        let registry = create_test_registry();

        // when (操作):
        let report = registry.publish(&GroupName::chat(), &like_event(1)).await;

        // then (期待する結果):
        assert_eq!(report, PublishReport::default());
    }

    #[tokio::test]
    async fn test_publish_preserves_order() {
        // テスト項目: 同じ発行者からの E1, E2 は全メンバーに E1, E2 の順で届く
        // given (前提条件):
        let registry = create_test_registry();
        let (alice, mut alice_rx) = register(&registry, 8).await;
        let (bob, mut bob_rx) = register(&registry, 8).await;
        let group = GroupName::live_feed();
        registry.join(&group, &alice).await.unwrap();
        registry.join(&group, &bob).await.unwrap();

        // when (操作):
        registry.publish(&group, &like_event(1)).await;
        registry.publish(&group, &like_event(2)).await;

        // then (期待する結果):
        for rx in [&mut alice_rx, &mut bob_rx] {
            let first = rx.recv().await.unwrap();
            let second = rx.recv().await.unwrap();
            assert!(first.contains(r#""like_count":1"#));
            assert!(second.contains(r#""like_count":2"#));
        }
    }

    #[tokio::test]
    async fn test_publish_evicts_closed_member_and_delivers_to_others() {
        // テスト項目: 送信先が閉じているメンバーはグループから外され、他のメンバーには届く
        // given (前提条件):
        let registry = create_test_registry();
        let (alice, mut alice_rx) = register(&registry, 8).await;
        let (bob, bob_rx) = register(&registry, 8).await;
        let group = GroupName::chat();
        registry.join(&group, &alice).await.unwrap();
        registry.join(&group, &bob).await.unwrap();
        drop(bob_rx);

        // when (操作):
        let report = registry.publish(&group, &like_event(3)).await;

        // then (期待する結果):
        assert_eq!(report.delivered, 1);
        assert_eq!(report.evicted, vec![bob]);
        assert!(alice_rx.recv().await.is_some());
        assert_eq!(registry.members(&group).await, vec![alice]);
        assert!(registry.groups_of(&bob).await.is_empty());
    }

    #[tokio::test]
    async fn test_publish_evicts_member_whose_queue_stays_full() {
        // テスト項目: 送信キューが詰まったままのメンバーはタイムアウト後に外される
        // given (前提条件):
        let registry = create_test_registry();
        let (slow, _slow_rx) = register(&registry, 1).await;
        let group = GroupName::live_feed();
        registry.join(&group, &slow).await.unwrap();
        registry.publish(&group, &like_event(1)).await;

        // when (操作): キューが満杯のまま次を publish
        let report = registry.publish(&group, &like_event(2)).await;

        // then (期待する結果):
        assert_eq!(report.delivered, 0);
        assert_eq!(report.evicted, vec![slow]);
        assert!(registry.members(&group).await.is_empty());
    }

    #[tokio::test]
    async fn test_unregister_leaves_every_group_once() {
        // テスト項目: unregister は参加中の全グループから外し、二度目は何もしない
        // given (前提条件):
        let registry = create_test_registry();
        let (alice, mut alice_rx) = register(&registry, 8).await;
        let groups = [
            GroupName::chat(),
            GroupName::live_feed(),
            GroupName::post(PostId::new(9)),
        ];
        for group in &groups {
            registry.join(group, &alice).await.unwrap();
        }

        // when (操作):
        let first = registry.unregister(&alice).await;
        let second = registry.unregister(&alice).await;

        // then (期待する結果):
        assert_eq!(first.len(), 3);
        assert!(second.is_empty());
        for group in &groups {
            let report = registry.publish(group, &like_event(1)).await;
            assert_eq!(report.delivered, 0);
        }
        assert!(alice_rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_send_to_single_connection() {
        // テスト項目: send_to は指定した接続にのみ届き、未登録ならエラーになる
        // given (前提条件):
        let registry = create_test_registry();
        let (alice, mut alice_rx) = register(&registry, 8).await;
        let stranger = ConnectionId::generate();
        let event = GroupEvent::ChatMessage {
            message: "welcome".to_string(),
            username: "system".to_string(),
        };

        // when (操作):
        let delivered = registry.send_to(&alice, &event).await;
        let missing = registry.send_to(&stranger, &event).await;

        // then (期待する結果):
        assert!(delivered.is_ok());
        assert_eq!(
            alice_rx.recv().await.as_deref(),
            Some(r#"{"message":"welcome","username":"system"}"#)
        );
        assert_eq!(missing, Err(TransportError::ConnectionNotFound(stranger)));
    }

    #[tokio::test]
    async fn test_group_summaries_are_sorted() {
        // テスト項目: グループ一覧は名前順でメンバー数を持つ
        // given (前提条件):
        let registry = create_test_registry();
        let (alice, _a) = register(&registry, 8).await;
        let (bob, _b) = register(&registry, 8).await;
        registry.join(&GroupName::live_feed(), &alice).await.unwrap();
        registry.join(&GroupName::chat(), &alice).await.unwrap();
        registry.join(&GroupName::chat(), &bob).await.unwrap();

        // when (操作):
        let summaries = registry.group_summaries().await;

        // then (期待する結果):
        assert_eq!(
            summaries,
            vec![
                GroupSummary {
                    name: GroupName::chat(),
                    member_count: 2
                },
                GroupSummary {
                    name: GroupName::live_feed(),
                    member_count: 1
                },
            ]
        );
    }
}
