//! Domain-level error types.

use thiserror::Error;

use super::value_object::ConnectionId;

/// Validation failures when constructing value objects.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ValueObjectError {
    #[error("username must not be empty")]
    EmptyUsername,

    #[error("username is too long ({actual} > {max} characters)")]
    UsernameTooLong { max: usize, actual: usize },

    #[error("message body is too long ({actual} > {max} characters)")]
    MessageBodyTooLong { max: usize, actual: usize },

    #[error("invalid group name '{0}'")]
    InvalidGroupName(String),
}

/// Failures reported by persistence collaborators.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RepositoryError {
    #[error("{0} not found")]
    NotFound(String),

    #[error("persistence unavailable: {0}")]
    Unavailable(String),
}

/// Membership operations on a connection the registry does not know.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum GroupError {
    #[error("connection '{0}' is not registered")]
    ConnectionNotRegistered(ConnectionId),

    #[error("connection '{0}' is already registered")]
    AlreadyRegistered(ConnectionId),
}

/// Failure to hand a frame to a connection's outbound channel.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TransportError {
    #[error("connection '{0}' is not registered")]
    ConnectionNotFound(ConnectionId),

    #[error("channel of connection '{0}' is closed")]
    ChannelClosed(ConnectionId),

    #[error("send to connection '{0}' timed out")]
    SendTimedOut(ConnectionId),

    #[error("failed to encode event: {0}")]
    Encode(String),
}
