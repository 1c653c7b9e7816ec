//! Wire protocol for the oddeven game server.
//!
//! - **Types** ([`ClientMessage`], [`ServerMessage`], [`Role`],
//!   [`Recipient`]): what travels on the wire and who it is for.
//! - **Codec** ([`Codec`], [`JsonCodec`], [`decode_client_message`]): how
//!   those messages become bytes and back.
//! - **Errors** ([`ProtocolError`]): decode failures and unknown messages.
//!
//! ```text
//! Transport (bytes) → Protocol (messages) → Session (game state)
//! ```

mod codec;
mod error;
mod types;

pub use codec::{decode_client_message, Codec};
#[cfg(feature = "json")]
pub use codec::JsonCodec;
pub use error::ProtocolError;
pub use types::{
    ClientMessage, Recipient, Role, ServerMessage, BOARD_CELLS, BOARD_SIDE,
    LINE_LEN, TOTAL_PLAYERS,
};
