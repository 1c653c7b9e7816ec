//! Error types for the protocol layer.
//!
//! Everything here is recoverable: the dispatcher turns each variant into
//! an `ERROR` message for the sender and carries on.

/// Errors that can occur while encoding or decoding wire messages.
#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    /// Serializing an outbound message failed.
    #[cfg(feature = "json")]
    #[error("encode failed: {0}")]
    Encode(serde_json::Error),

    /// The inbound frame could not be decoded: not JSON, a missing or
    /// ill-typed field, or a truncated payload.
    #[cfg(feature = "json")]
    #[error("malformed message: {0}")]
    Decode(serde_json::Error),

    /// The frame decoded but carries no usable `type` discriminant.
    #[error("malformed message: {0}")]
    InvalidMessage(String),

    /// The frame names a message `type` the server does not understand.
    #[error("unknown message type: {0}")]
    UnknownMessageType(String),
}

impl ProtocolError {
    /// Returns `true` for decode failures, as opposed to well-formed
    /// messages of an unknown type.
    pub fn is_malformed(&self) -> bool {
        !matches!(self, Self::UnknownMessageType(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_type_is_not_malformed() {
        let err = ProtocolError::UnknownMessageType("CHAT".into());
        assert!(!err.is_malformed());
        assert_eq!(err.to_string(), "unknown message type: CHAT");
    }

    #[test]
    fn test_invalid_message_is_malformed() {
        let err = ProtocolError::InvalidMessage("missing `type`".into());
        assert!(err.is_malformed());
        assert!(err.to_string().starts_with("malformed message"));
    }
}
