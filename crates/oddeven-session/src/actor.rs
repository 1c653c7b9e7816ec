//! Session actor: a single Tokio task that owns the game.
//!
//! Connection handlers never touch the [`Session`] directly. They hold a
//! [`SessionHandle`] and push commands into a bounded mpsc queue; the actor
//! pops them one at a time, so every event is applied to completion before
//! the next one starts and all clients observe updates in the same order.

use std::collections::HashMap;

use oddeven_protocol::{
    decode_client_message, ClientMessage, Codec, Recipient, Role,
    ServerMessage,
};
use oddeven_transport::ConnectionId;
use tokio::sync::{mpsc, oneshot};

use crate::controller::Effects;
use crate::{RematchState, Session, SessionError, SessionPhase};

/// What the actor asks a connection's writer task to do.
#[derive(Debug, Clone, PartialEq)]
pub enum Outbound {
    /// Encode and send this message.
    Message(ServerMessage),
    /// Close the connection after everything queued before it is sent.
    Close,
}

/// Channel sender for delivering outbound messages to one connection.
pub type ConnectionSender = mpsc::UnboundedSender<Outbound>;

/// Commands sent to the session actor through its channel.
pub(crate) enum SessionCommand {
    /// A transport connection opened.
    Connect {
        conn: ConnectionId,
        sender: ConnectionSender,
        reply: oneshot::Sender<Result<Role, SessionError>>,
    },

    /// Raw frame received from a connection.
    Inbound { conn: ConnectionId, data: Vec<u8> },

    /// A transport connection closed.
    Disconnect { conn: ConnectionId },

    /// Request a snapshot of the session.
    GetInfo { reply: oneshot::Sender<SessionInfo> },

    /// Stop the actor.
    Shutdown,
}

/// A point-in-time snapshot of the session, for diagnostics and tests.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionInfo {
    pub phase: SessionPhase,
    pub board: [u64; oddeven_protocol::BOARD_CELLS],
    pub odd: Option<ConnectionId>,
    pub even: Option<ConnectionId>,
    pub game_over: bool,
    pub rematch: RematchState,
    pub rematch_votes: usize,
    /// Open connections, seated or not.
    pub connections: usize,
}

/// Handle to the running session actor.
///
/// Cheap to clone: it wraps an `mpsc::Sender`. Every connection handler
/// holds one.
#[derive(Debug, Clone)]
pub struct SessionHandle {
    sender: mpsc::Sender<SessionCommand>,
}

impl SessionHandle {
    /// Registers a connection and its outbound channel.
    ///
    /// On success the session has already queued the joiner's
    /// `PLAYER_ASSIGNED` on `sender`. On [`SessionError::Full`] it has
    /// queued an `ERROR` followed by [`Outbound::Close`].
    pub async fn connect(
        &self,
        conn: ConnectionId,
        sender: ConnectionSender,
    ) -> Result<Role, SessionError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.sender
            .send(SessionCommand::Connect {
                conn,
                sender,
                reply: reply_tx,
            })
            .await
            .map_err(|_| SessionError::Unavailable)?;
        reply_rx.await.map_err(|_| SessionError::Unavailable)?
    }

    /// Forwards a raw frame from `conn` (fire-and-forget).
    pub async fn inbound(
        &self,
        conn: ConnectionId,
        data: Vec<u8>,
    ) -> Result<(), SessionError> {
        self.sender
            .send(SessionCommand::Inbound { conn, data })
            .await
            .map_err(|_| SessionError::Unavailable)
    }

    /// Reports that `conn` has closed.
    pub async fn disconnect(
        &self,
        conn: ConnectionId,
    ) -> Result<(), SessionError> {
        self.sender
            .send(SessionCommand::Disconnect { conn })
            .await
            .map_err(|_| SessionError::Unavailable)
    }

    /// Requests a snapshot of the session.
    pub async fn info(&self) -> Result<SessionInfo, SessionError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.sender
            .send(SessionCommand::GetInfo { reply: reply_tx })
            .await
            .map_err(|_| SessionError::Unavailable)?;
        reply_rx.await.map_err(|_| SessionError::Unavailable)
    }

    /// Tells the actor to close every connection and stop.
    pub async fn shutdown(&self) -> Result<(), SessionError> {
        self.sender
            .send(SessionCommand::Shutdown)
            .await
            .map_err(|_| SessionError::Unavailable)
    }

    /// Returns `true` once the actor has stopped.
    pub fn is_closed(&self) -> bool {
        self.sender.is_closed()
    }
}

struct SessionActor<C: Codec> {
    session: Session,
    connections: HashMap<ConnectionId, ConnectionSender>,
    codec: C,
    receiver: mpsc::Receiver<SessionCommand>,
}

impl<C: Codec> SessionActor<C> {
    async fn run(mut self) {
        tracing::info!("session actor started");

        while let Some(cmd) = self.receiver.recv().await {
            match cmd {
                SessionCommand::Connect {
                    conn,
                    sender,
                    reply,
                } => {
                    let result = self.handle_connect(conn, sender);
                    let _ = reply.send(result);
                }
                SessionCommand::Inbound { conn, data } => {
                    self.handle_inbound(conn, &data);
                }
                SessionCommand::Disconnect { conn } => {
                    self.handle_disconnect(conn);
                }
                SessionCommand::GetInfo { reply } => {
                    let _ = reply.send(self.info());
                }
                SessionCommand::Shutdown => {
                    tracing::info!(
                        connections = self.connections.len(),
                        "session shutting down"
                    );
                    for sender in self.connections.values() {
                        let _ = sender.send(Outbound::Close);
                    }
                    break;
                }
            }
        }

        tracing::info!("session actor stopped");
    }

    fn handle_connect(
        &mut self,
        conn: ConnectionId,
        sender: ConnectionSender,
    ) -> Result<Role, SessionError> {
        if self.connections.contains_key(&conn) {
            return Err(SessionError::AlreadyConnected(conn));
        }

        match self.session.connect(conn) {
            Ok((role, msgs)) => {
                self.connections.insert(conn, sender);
                tracing::debug!(
                    %conn,
                    connections = self.connections.len(),
                    "connection registered"
                );
                self.dispatch(msgs);
                Ok(role)
            }
            Err(err) => {
                tracing::warn!(%conn, %err, "connection rejected");
                let _ = sender.send(Outbound::Message(ServerMessage::error(&err)));
                let _ = sender.send(Outbound::Close);
                Err(err)
            }
        }
    }

    fn handle_inbound(&mut self, conn: ConnectionId, data: &[u8]) {
        if !self.connections.contains_key(&conn) {
            tracing::warn!(%conn, "frame from unregistered connection, ignoring");
            return;
        }

        let msg = match decode_client_message(&self.codec, data) {
            Ok(msg) => msg,
            Err(err) => {
                tracing::debug!(
                    %conn,
                    %err,
                    malformed = err.is_malformed(),
                    "undecodable frame"
                );
                self.reply_error(conn, &err);
                return;
            }
        };

        tracing::trace!(%conn, kind = msg.kind(), "message received");
        let result = match msg {
            ClientMessage::Increment { square } => {
                self.session.increment(conn, square)
            }
            ClientMessage::RestartGame => self.session.vote_rematch(conn),
        };
        match result {
            Ok(msgs) => self.dispatch(msgs),
            Err(err) => {
                tracing::debug!(%conn, %err, "request rejected");
                self.reply_error(conn, &err);
            }
        }
    }

    fn handle_disconnect(&mut self, conn: ConnectionId) {
        if self.connections.remove(&conn).is_none() {
            return;
        }
        tracing::debug!(
            %conn,
            connections = self.connections.len(),
            "connection removed"
        );
        let msgs = self.session.disconnect(conn);
        self.dispatch(msgs);
    }

    fn reply_error(&self, conn: ConnectionId, err: &dyn std::fmt::Display) {
        self.send_to(conn, Outbound::Message(ServerMessage::error(err)));
    }

    /// Delivers messages in order. `All` means every open connection,
    /// seated or not.
    fn dispatch(&self, msgs: Effects) {
        for (recipient, msg) in msgs {
            match recipient {
                Recipient::All => {
                    for sender in self.connections.values() {
                        let _ = sender.send(Outbound::Message(msg.clone()));
                    }
                }
                Recipient::Connection(conn) => {
                    self.send_to(conn, Outbound::Message(msg));
                }
            }
        }
    }

    /// Sends to one connection. Drops silently if its writer is gone.
    fn send_to(&self, conn: ConnectionId, outbound: Outbound) {
        if let Some(sender) = self.connections.get(&conn) {
            let _ = sender.send(outbound);
        }
    }

    fn info(&self) -> SessionInfo {
        let players = self.session.players();
        let rematch = self.session.rematch();
        SessionInfo {
            phase: self.session.phase(),
            board: self.session.board().cells(),
            odd: players.holder(Role::Odd),
            even: players.holder(Role::Even),
            game_over: self.session.is_game_over(),
            rematch: rematch.state(),
            rematch_votes: rematch.votes(),
            connections: self.connections.len(),
        }
    }
}

/// Spawns the session actor and returns a handle to it.
///
/// `channel_size` bounds the command queue; when it is full, handlers
/// wait, which throttles the readers feeding it.
///
/// # Panics
/// Panics if `channel_size` is zero.
pub fn spawn_session<C: Codec>(codec: C, channel_size: usize) -> SessionHandle {
    let (tx, rx) = mpsc::channel(channel_size);

    let actor = SessionActor {
        session: Session::new(),
        connections: HashMap::new(),
        codec,
        receiver: rx,
    };

    tokio::spawn(actor.run());

    SessionHandle { sender: tx }
}
