//! The session controller: the only code that mutates session state.
//!
//! Every operation takes `&mut self`, applies one event to completion and
//! returns the messages it produced, each paired with a [`Recipient`].
//! Nothing here does I/O; the actor in `actor.rs` owns the `Session`,
//! serializes events into it and delivers what comes back.
//!
//! A rejected operation returns `Err` and leaves the state exactly as it
//! was. The caller reports the error to the requester only.

use oddeven_protocol::{Recipient, Role, ServerMessage, TOTAL_PLAYERS};
use oddeven_transport::ConnectionId;
use tracing::{debug, info};

use crate::board::square_index;
use crate::rematch::VoteOutcome;
use crate::{
    win, Board, PlayerRegistry, RematchCoordinator, SessionError,
    SessionPhase,
};

/// Messages produced by one session operation, in delivery order.
pub type Effects = Vec<(Recipient, ServerMessage)>;

const WAITING_FOR_OPPONENT: &str = "Waiting for opponent...";
const WAITING_FOR_REMATCH: &str = "Waiting for opponent to accept rematch...";
const REMATCH_REQUESTED: &str =
    "Opponent wants a rematch. Click Play Again to accept.";
const OPPONENT_LEFT: &str = "Opponent disconnected. Game over.";

/// One game room: the board, the two seats, rematch votes and the
/// game-over latch.
#[derive(Debug, Clone, Default)]
pub struct Session {
    board: Board,
    players: PlayerRegistry,
    rematch: RematchCoordinator,
    game_over: bool,
}

impl Session {
    /// Creates an empty session: zero board, no players, no votes.
    pub fn new() -> Self {
        Self::default()
    }

    /// Seats a newly opened connection.
    ///
    /// The joiner is told its role and the board. Once both seats are
    /// filled each player gets its own fresh `PLAYER_ASSIGNED`; otherwise
    /// the joiner is told to wait.
    ///
    /// # Errors
    /// [`SessionError::Full`] when both seats are taken.
    pub fn connect(
        &mut self,
        conn: ConnectionId,
    ) -> Result<(Role, Effects), SessionError> {
        let role = self.players.assign(conn)?;
        info!(%conn, %role, "player assigned");

        let mut out = vec![(Recipient::Connection(conn), self.assignment(role))];
        match self.players.pair() {
            Some((odd, even)) => {
                info!(%odd, %even, "both players connected, game can start");
                out.push((Recipient::Connection(odd), self.assignment(Role::Odd)));
                out.push((
                    Recipient::Connection(even),
                    self.assignment(Role::Even),
                ));
            }
            None => out.push((
                Recipient::Connection(conn),
                ServerMessage::Waiting {
                    message: WAITING_FOR_OPPONENT.into(),
                },
            )),
        }
        Ok((role, out))
    }

    /// Adds one to `square` on behalf of `conn`.
    ///
    /// Either player may increment any square at any time while the game is
    /// running; there is no turn order. The new value is broadcast, and if
    /// it completes a line the game-over latch is set and the result is
    /// broadcast too.
    ///
    /// # Errors
    /// Checked in this order:
    /// - [`SessionError::NotReady`] unless both seats are filled
    /// - [`SessionError::NotAPlayer`] if `conn` holds no seat
    /// - [`SessionError::AlreadyOver`] once a line has been completed
    /// - [`SessionError::OutOfRange`] for a square outside `0..25`
    pub fn increment(
        &mut self,
        conn: ConnectionId,
        square: i64,
    ) -> Result<Effects, SessionError> {
        if !self.players.both_present() {
            return Err(SessionError::NotReady);
        }
        let role = self
            .players
            .role_of(conn)
            .ok_or(SessionError::NotAPlayer)?;
        if !self.phase().is_active() {
            return Err(SessionError::AlreadyOver);
        }
        let index = square_index(square)?;
        let value = self.board.increment(index)?;
        debug!(%conn, %role, square = index, value, "square incremented");

        let mut out = vec![(
            Recipient::All,
            ServerMessage::Update {
                square: index,
                value,
            },
        )];
        if let Some(result) = win::evaluate(&self.board) {
            self.game_over = true;
            info!(winner = %result.winner, line = ?result.line, "game over");
            out.push((
                Recipient::All,
                ServerMessage::GameOver {
                    winner: result.winner,
                    winning_line: result.line,
                },
            ));
        }
        Ok(out)
    }

    /// Records a rematch vote from `conn`.
    ///
    /// With one vote in, the voter is told it is waiting and the opponent is
    /// told a rematch was requested. With both in, the board is cleared,
    /// the latch released and the two players swap roles; each is sent its
    /// new role, the previous `ODD` first.
    ///
    /// # Errors
    /// - [`SessionError::NotBothConnected`] if a seat is empty
    /// - [`SessionError::NotAPlayer`] if `conn` holds no seat
    pub fn vote_rematch(
        &mut self,
        conn: ConnectionId,
    ) -> Result<Effects, SessionError> {
        match self.rematch.vote(conn, &self.players)? {
            VoteOutcome::Pending {
                voted,
                voter,
                other,
            } => {
                info!(%voter, voted, "rematch requested");
                Ok(vec![
                    (
                        Recipient::Connection(voter),
                        rematch_notice(WAITING_FOR_REMATCH, voted),
                    ),
                    (
                        Recipient::Connection(other),
                        rematch_notice(REMATCH_REQUESTED, voted),
                    ),
                ])
            }
            VoteOutcome::Agreed { odd, even } => {
                self.restart_swapped(odd, even);
                Ok(vec![
                    (Recipient::Connection(odd), self.assignment(Role::Even)),
                    (Recipient::Connection(even), self.assignment(Role::Odd)),
                ])
            }
        }
    }

    /// Handles a closed connection.
    ///
    /// If `conn` held a seat, everyone still connected is told the game is
    /// over and the whole session is reset: both seats, the board, the
    /// latch and all votes. The remaining player has to join again. A
    /// connection without a seat changes nothing.
    pub fn disconnect(&mut self, conn: ConnectionId) -> Effects {
        self.rematch.withdraw(conn);
        let Some(role) = self.players.role_of(conn) else {
            debug!(%conn, "unseated connection left");
            return Vec::new();
        };

        info!(%conn, %role, "player disconnected, resetting session");
        self.reset();
        vec![(
            Recipient::All,
            ServerMessage::OpponentDisconnected {
                message: OPPONENT_LEFT.into(),
            },
        )]
    }

    /// Returns the session to its initial state.
    pub fn reset(&mut self) {
        self.board.reset();
        self.players.clear();
        self.rematch.clear();
        self.game_over = false;
        info!("session reset");
    }

    /// Returns the board.
    pub fn board(&self) -> &Board {
        &self.board
    }

    /// Returns the seat registry.
    pub fn players(&self) -> &PlayerRegistry {
        &self.players
    }

    /// Returns the rematch coordinator.
    pub fn rematch(&self) -> &RematchCoordinator {
        &self.rematch
    }

    /// Returns `true` once a line has been completed.
    pub fn is_game_over(&self) -> bool {
        self.game_over
    }

    /// Returns the current phase.
    pub fn phase(&self) -> SessionPhase {
        if !self.players.both_present() {
            SessionPhase::Waiting
        } else if self.game_over {
            SessionPhase::GameOver
        } else {
            SessionPhase::Playing
        }
    }

    fn restart_swapped(&mut self, odd: ConnectionId, even: ConnectionId) {
        self.board.reset();
        self.rematch.clear();
        self.game_over = false;
        self.players.assign_with_role(even, Role::Odd);
        self.players.assign_with_role(odd, Role::Even);
        info!(odd = %even, even = %odd, "rematch agreed, roles swapped");
    }

    fn assignment(&self, role: Role) -> ServerMessage {
        ServerMessage::PlayerAssigned {
            player: role,
            board: self.board.cells(),
        }
    }
}

fn rematch_notice(message: &str, voted: usize) -> ServerMessage {
    ServerMessage::WaitingForRematch {
        message: message.into(),
        voted_players: voted,
        total_players: TOTAL_PLAYERS,
    }
}
