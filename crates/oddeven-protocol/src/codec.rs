//! Codec trait and implementations for serializing/deserializing messages.
//!
//! The rest of the server only needs something that implements [`Codec`].
//! [`JsonCodec`] is the one the browser client speaks.

use serde::{de::DeserializeOwned, Deserialize, Serialize};

use crate::{ClientMessage, ProtocolError};

/// Converts messages to and from frame bytes.
///
/// `Send + Sync + 'static` because a codec lives inside the session actor
/// and is cloned into every connection's writer task.
pub trait Codec: Send + Sync + 'static {
    /// Serializes a value into bytes.
    ///
    /// # Errors
    /// Returns `ProtocolError::Encode` if serialization fails.
    fn encode<T: Serialize>(
        &self,
        value: &T,
    ) -> Result<Vec<u8>, ProtocolError>;

    /// Deserializes bytes back into a value.
    ///
    /// # Errors
    /// Returns `ProtocolError::Decode` if the bytes are malformed,
    /// incomplete, or don't match the expected type.
    fn decode<T: DeserializeOwned>(
        &self,
        data: &[u8],
    ) -> Result<T, ProtocolError>;
}

/// Just the discriminant of an inbound frame; all other fields are ignored.
#[derive(Deserialize)]
struct Discriminant {
    #[serde(rename = "type")]
    kind: Option<String>,
}

/// Decodes an inbound frame into a [`ClientMessage`].
///
/// The `type` field is inspected first so that a well-formed message of an
/// unsupported kind is reported as [`ProtocolError::UnknownMessageType`]
/// instead of as a generic decode failure.
///
/// # Errors
/// - [`ProtocolError::Decode`] / [`ProtocolError::InvalidMessage`] when the
///   frame is not a valid message
/// - [`ProtocolError::UnknownMessageType`] when `type` is not recognised
pub fn decode_client_message<C: Codec>(
    codec: &C,
    data: &[u8],
) -> Result<ClientMessage, ProtocolError> {
    let Discriminant { kind } = codec.decode(data)?;
    let kind = kind.ok_or_else(|| {
        ProtocolError::InvalidMessage("missing `type` field".into())
    })?;
    if !ClientMessage::KINDS.contains(&kind.as_str()) {
        return Err(ProtocolError::UnknownMessageType(kind));
    }
    codec.decode(data)
}

// ---------------------------------------------------------------------------
// JsonCodec
// ---------------------------------------------------------------------------

/// A [`Codec`] that uses JSON (via `serde_json`).
///
/// ## Example
///
/// ```rust
/// use oddeven_protocol::{Codec, JsonCodec, ServerMessage};
///
/// let codec = JsonCodec;
/// let msg = ServerMessage::Update { square: 3, value: 1 };
///
/// let bytes = codec.encode(&msg).unwrap();
/// assert_eq!(bytes, br#"{"type":"UPDATE","square":3,"value":1}"#);
/// ```
#[cfg(feature = "json")]
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonCodec;

#[cfg(feature = "json")]
impl Codec for JsonCodec {
    fn encode<T: Serialize>(
        &self,
        value: &T,
    ) -> Result<Vec<u8>, ProtocolError> {
        serde_json::to_vec(value).map_err(ProtocolError::Encode)
    }

    fn decode<T: DeserializeOwned>(
        &self,
        data: &[u8],
    ) -> Result<T, ProtocolError> {
        serde_json::from_slice(data).map_err(ProtocolError::Decode)
    }
}
