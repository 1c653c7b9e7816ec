//! Game session for oddeven.
//!
//! One [`Session`] holds the whole game: the 5×5 board, the two role
//! slots, rematch votes and the game-over latch. It runs inside a single
//! Tokio task (actor model) and is reached through a [`SessionHandle`].
//!
//! # Key types
//!
//! - [`Board`]: the counters, and [`win::evaluate`] for the win check
//! - [`PlayerRegistry`]: which connection holds `ODD` and `EVEN`
//! - [`RematchCoordinator`]: two-party rematch voting
//! - [`Session`]: the pure controller that applies one event at a time
//! - [`SessionHandle`]: send commands to the running session actor

mod actor;
mod board;
mod controller;
mod error;
mod phase;
mod registry;
mod rematch;
pub mod win;

pub use actor::{
    spawn_session, ConnectionSender, Outbound, SessionHandle, SessionInfo,
};
pub use board::{square_index, Board};
pub use controller::{Effects, Session};
pub use error::SessionError;
pub use phase::SessionPhase;
pub use registry::PlayerRegistry;
pub use rematch::{RematchCoordinator, RematchState, VoteOutcome};
pub use win::WinResult;
