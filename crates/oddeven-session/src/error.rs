//! Error types for the session layer.
//!
//! The `Display` text of the rule violations is what the offending client
//! sees in its `ERROR` message.

use oddeven_transport::ConnectionId;

/// Errors that can occur while operating on the session.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SessionError {
    /// Both slots are taken.
    #[error("game is full")]
    Full,

    /// Fewer than two players are seated.
    #[error("waiting for opponent to join")]
    NotReady,

    /// The requesting connection holds no slot.
    #[error("you are not in this game")]
    NotAPlayer,

    /// A line has been completed; the board is frozen until a rematch.
    #[error("game is already over")]
    AlreadyOver,

    /// The square index is outside `0..25`.
    #[error("invalid square index: {0}")]
    OutOfRange(i64),

    /// A rematch vote arrived while a slot is empty.
    #[error("both players must be connected for rematch")]
    NotBothConnected,

    /// The connection is already known to the session.
    #[error("{0} is already connected")]
    AlreadyConnected(ConnectionId),

    /// The session actor has stopped or its queue is closed.
    #[error("session is unavailable")]
    Unavailable,
}
