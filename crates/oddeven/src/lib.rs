//! # oddeven
//!
//! Real-time two-player ODD/EVEN board game served over WebSocket.
//!
//! Two browser clients share a 5×5 board of counters. Either player may
//! bump any square at any time; whoever's parity first fills a row, column
//! or diagonal wins. The server is authoritative: one session actor owns
//! the board and broadcasts every change.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use oddeven::prelude::*;
//!
//! # async fn start() -> Result<(), OddEvenError> {
//! let config = ServerConfig::from_env()?;
//! let server = OddEvenServer::builder().config(config).build().await?;
//! server.run_until(tokio::signal::ctrl_c()).await
//! # }
//! ```

mod config;
mod error;
mod handler;
mod server;

pub use config::ServerConfig;
pub use error::OddEvenError;
pub use server::{OddEvenServer, OddEvenServerBuilder};

pub use oddeven_protocol as protocol;
pub use oddeven_session as session;
pub use oddeven_transport as transport;

/// The types most servers and tests need.
pub mod prelude {
    pub use crate::{OddEvenError, OddEvenServer, OddEvenServerBuilder, ServerConfig};
    pub use oddeven_protocol::{ClientMessage, JsonCodec, Role, ServerMessage};
    pub use oddeven_session::{SessionError, SessionHandle, SessionInfo, SessionPhase};
}
