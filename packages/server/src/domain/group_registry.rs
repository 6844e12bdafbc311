//! Group registry trait definition.
//!
//! The registry owns the group → members mapping. Consumers only ever reach
//! other connections through it.

use async_trait::async_trait;
use tokio::sync::mpsc;

use super::{
    error::{GroupError, TransportError},
    event::GroupEvent,
    value_object::{ConnectionId, GroupName},
};

/// Outbound channel of one connection; carries encoded text frames.
pub type ConnectionChannel = mpsc::Sender<String>;

/// Outcome of one publish.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PublishReport {
    /// Members the event was handed to.
    pub delivered: usize,
    /// Members removed from the group because their send failed.
    pub evicted: Vec<ConnectionId>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupSummary {
    pub name: GroupName,
    pub member_count: usize,
}

#[async_trait]
pub trait GroupRegistry: Send + Sync {
    /// Make a connection known to the registry together with its channel.
    async fn register(
        &self,
        connection_id: ConnectionId,
        channel: ConnectionChannel,
    ) -> Result<(), GroupError>;

    /// Forget a connection and remove it from every group it joined.
    ///
    /// Returns the groups it left. A second call returns an empty list.
    async fn unregister(&self, connection_id: &ConnectionId) -> Vec<GroupName>;

    /// Add a registered connection to a group. Idempotent.
    async fn join(
        &self,
        group: &GroupName,
        connection_id: &ConnectionId,
    ) -> Result<(), GroupError>;

    /// Remove a connection from a group. Idempotent, never fails.
    async fn leave(&self, group: &GroupName, connection_id: &ConnectionId);

    /// Deliver an event to every current member of a group.
    async fn publish(&self, group: &GroupName, event: &GroupEvent) -> PublishReport;

    /// Deliver an event to one connection only.
    async fn send_to(
        &self,
        connection_id: &ConnectionId,
        event: &GroupEvent,
    ) -> Result<(), TransportError>;

    /// Current members; empty for a group that does not exist.
    async fn members(&self, group: &GroupName) -> Vec<ConnectionId>;

    async fn groups_of(&self, connection_id: &ConnectionId) -> Vec<GroupName>;

    /// Every non-empty group, sorted by name.
    async fn group_summaries(&self) -> Vec<GroupSummary>;
}
