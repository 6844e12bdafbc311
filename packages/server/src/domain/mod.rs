//! Domain layer: value objects, entities, events and the interfaces the
//! rest of the crate depends on.

pub mod auth;
pub mod consumer;
pub mod entity;
pub mod error;
pub mod event;
pub mod group_registry;
pub mod repository;
pub mod value_object;

pub use auth::Authenticator;
pub use consumer::{AdmissionDenied, ConnectionState, ConsumerKind};
pub use entity::{ANONYMOUS_DISPLAY_NAME, ChatMessage, Connection, LikeToggle, Principal};
pub use error::{GroupError, RepositoryError, TransportError, ValueObjectError};
pub use event::{CommentPayload, GroupEvent, NEW_POST_MESSAGE, Notification};
pub use group_registry::{ConnectionChannel, GroupRegistry, GroupSummary, PublishReport};
pub use repository::{ChatMessageRepository, PostRepository};
pub use value_object::{
    ConnectionId, GroupName, MessageBody, PostId, Timestamp, UserId, Username,
};
