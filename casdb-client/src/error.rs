//! Client error types.

use casdb_protocol::{ProtocolError, ServerError};
use thiserror::Error;

/// Errors surfaced by session operations.
#[derive(Debug, Error)]
pub enum ClientError {
    /// Socket connect/read/write failure. Terminal for the session.
    #[error("transport error: {0}")]
    Transport(#[from] std::io::Error),

    /// Malformed frame or response body inconsistent with its declaration.
    #[error("protocol error: {0}")]
    Protocol(#[from] ProtocolError),

    /// The broker answered with a negative response code. The session
    /// stays usable.
    #[error(transparent)]
    Server(#[from] ServerError),

    /// Operation rejected because of the session state.
    #[error(transparent)]
    State(#[from] StateError),

    /// Caller-supplied input rejected before touching the wire.
    #[error("validation error: {0}")]
    Validation(String),

    /// Operation deadline exceeded.
    #[error("operation timed out")]
    Timeout,

    /// Intentionally unimplemented surface.
    #[error("not implemented: {0}")]
    NotImplemented(&'static str),
}

impl ClientError {
    /// Whether this error leaves the connection unusable.
    ///
    /// Transport failures mean the socket is gone; a protocol error means
    /// the stream framing is no longer trustworthy.
    pub fn is_terminal(&self) -> bool {
        matches!(self, ClientError::Transport(_) | ClientError::Protocol(_))
    }
}

/// Session-state rejections.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum StateError {
    #[error("session is not connected")]
    NotConnected,

    #[error("session is already connected")]
    AlreadyConnected,

    #[error("a connect is already pending")]
    ConnectAlreadyPending,

    #[error("a query is already pending")]
    QueryAlreadyPending,

    #[error("no active query for handle {0}")]
    NoActiveQuery(i32),
}
