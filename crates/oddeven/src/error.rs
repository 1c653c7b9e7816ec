//! Unified error type for the oddeven server.

use oddeven_protocol::ProtocolError;
use oddeven_session::SessionError;
use oddeven_transport::TransportError;

/// Top-level error that wraps every crate-specific error.
///
/// The `#[from]` attributes let `?` convert errors from any layer.
#[derive(Debug, thiserror::Error)]
pub enum OddEvenError {
    /// A transport-level error (bind, accept, send, recv).
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// A protocol-level error (encode, decode).
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// A session-level error (game rules, actor gone).
    #[error(transparent)]
    Session(#[from] SessionError),

    /// The configuration could not be read or parsed.
    #[error("failed to load configuration: {0}")]
    ConfigLoad(#[from] config::ConfigError),

    /// Invalid server configuration.
    #[error("invalid configuration: {0}")]
    Config(String),
}
