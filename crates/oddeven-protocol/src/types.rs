//! Message types exchanged between players' browsers and the server.
//!
//! Every frame is a JSON object carrying a `type` discriminant. Both
//! directions are modelled as internally tagged enums, so adding a message
//! means adding a variant and the compiler points at every `match` that
//! has to learn about it.

use std::fmt;

use oddeven_transport::ConnectionId;
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Board geometry
// ---------------------------------------------------------------------------

/// Width and height of the square board.
pub const BOARD_SIDE: usize = 5;

/// Number of cells on the board, serialized row-major (`r * 5 + c`).
pub const BOARD_CELLS: usize = BOARD_SIDE * BOARD_SIDE;

/// Number of cells in a winning line.
pub const LINE_LEN: usize = BOARD_SIDE;

/// Number of players a session seats.
pub const TOTAL_PLAYERS: usize = 2;

// ---------------------------------------------------------------------------
// Role
// ---------------------------------------------------------------------------

/// Which parity a player is playing for.
///
/// A cell belongs to `Odd` when its counter is odd and to `Even` when it is
/// even and non-zero. Serialized as `"ODD"` / `"EVEN"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Role {
    Odd,
    Even,
}

impl Role {
    /// Returns the other role.
    pub fn opposite(self) -> Self {
        match self {
            Self::Odd => Self::Even,
            Self::Even => Self::Odd,
        }
    }

    /// Returns the role that owns a cell holding `value`, or `None` for an
    /// untouched cell.
    pub fn owning(value: u64) -> Option<Self> {
        match value {
            0 => None,
            v if v % 2 == 1 => Some(Self::Odd),
            _ => Some(Self::Even),
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Odd => write!(f, "ODD"),
            Self::Even => write!(f, "EVEN"),
        }
    }
}

// ---------------------------------------------------------------------------
// Recipient
// ---------------------------------------------------------------------------

/// Who an outbound message is addressed to.
///
/// The session controller pairs every [`ServerMessage`] it produces with a
/// `Recipient`; the dispatcher resolves `All` against the connections that
/// are open at the time of delivery.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Recipient {
    /// Every open connection, seated or not.
    All,
    /// One specific connection.
    Connection(ConnectionId),
}

// ---------------------------------------------------------------------------
// Client → server
// ---------------------------------------------------------------------------

/// Messages a client may send.
///
/// `square` is kept signed so that a negative index decodes and is then
/// rejected as out of range rather than as a malformed frame.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ClientMessage {
    /// Add one to the counter in `square`.
    Increment { square: i64 },
    /// Vote to start a new game with roles swapped.
    RestartGame,
}

impl ClientMessage {
    /// Every `type` value the server understands.
    pub const KINDS: [&'static str; 2] = ["INCREMENT", "RESTART_GAME"];

    /// Returns this message's `type` discriminant.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Increment { .. } => "INCREMENT",
            Self::RestartGame => "RESTART_GAME",
        }
    }
}

// ---------------------------------------------------------------------------
// Server → client
// ---------------------------------------------------------------------------

/// Messages the server sends.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ServerMessage {
    /// Tells one connection its role and the authoritative board.
    PlayerAssigned {
        player: Role,
        board: [u64; BOARD_CELLS],
    },

    /// The only seated player is waiting for an opponent.
    Waiting { message: String },

    /// A cell changed. Broadcast so both views stay in step.
    Update { square: usize, value: u64 },

    /// A line was completed; the game is over until a rematch.
    GameOver {
        winner: Role,
        #[serde(rename = "winningLine")]
        winning_line: [usize; LINE_LEN],
    },

    /// A seated player left and the session was torn down.
    OpponentDisconnected { message: String },

    /// Rematch voting is in progress.
    WaitingForRematch {
        message: String,
        #[serde(rename = "votedPlayers")]
        voted_players: usize,
        #[serde(rename = "totalPlayers")]
        total_players: usize,
    },

    /// A request was rejected. Only ever sent to the requester.
    Error { message: String },
}

impl ServerMessage {
    /// Builds an `ERROR` message from anything printable.
    pub fn error(reason: impl fmt::Display) -> Self {
        Self::Error {
            message: reason.to_string(),
        }
    }

    /// Returns this message's `type` discriminant, for logging.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::PlayerAssigned { .. } => "PLAYER_ASSIGNED",
            Self::Waiting { .. } => "WAITING",
            Self::Update { .. } => "UPDATE",
            Self::GameOver { .. } => "GAME_OVER",
            Self::OpponentDisconnected { .. } => "OPPONENT_DISCONNECTED",
            Self::WaitingForRematch { .. } => "WAITING_FOR_REMATCH",
            Self::Error { .. } => "ERROR",
        }
    }
}

// =========================================================================
// Tests
// =========================================================================
