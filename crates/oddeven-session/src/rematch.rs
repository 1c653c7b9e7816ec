//! Two-party rematch voting.

use std::collections::HashSet;
use std::fmt;

use oddeven_protocol::TOTAL_PLAYERS;
use oddeven_transport::ConnectionId;

use crate::{PlayerRegistry, SessionError};

/// Where a voting round stands.
///
/// ```text
/// Idle ──vote──→ OneVoted ──other votes──→ BothVoted ──reset──→ Idle
/// ```
///
/// `BothVoted` only exists for the instant between the second vote and
/// the reset; the coordinator clears itself as part of reporting it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RematchState {
    Idle,
    OneVoted,
    BothVoted,
}

impl fmt::Display for RematchState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Idle => write!(f, "Idle"),
            Self::OneVoted => write!(f, "OneVoted"),
            Self::BothVoted => write!(f, "BothVoted"),
        }
    }
}

/// What a successful vote led to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VoteOutcome {
    /// Still waiting on `other` to agree.
    Pending {
        voted: usize,
        voter: ConnectionId,
        other: ConnectionId,
    },
    /// Both seated players agreed. Carries the seating at the moment of
    /// agreement so the caller can swap it.
    Agreed {
        odd: ConnectionId,
        even: ConnectionId,
    },
}

/// Collects rematch votes from the two seated players.
///
/// Votes are only accepted from seated connections, so the vote set is
/// always a subset of the two slot holders.
#[derive(Debug, Clone, Default)]
pub struct RematchCoordinator {
    votes: HashSet<ConnectionId>,
}

impl RematchCoordinator {
    /// Creates a coordinator with no votes.
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a vote from `conn`. Voting twice counts once.
    ///
    /// # Errors
    /// - [`SessionError::NotBothConnected`] if either slot is empty
    /// - [`SessionError::NotAPlayer`] if `conn` holds no slot
    ///
    /// Neither error touches the vote set.
    pub fn vote(
        &mut self,
        conn: ConnectionId,
        players: &PlayerRegistry,
    ) -> Result<VoteOutcome, SessionError> {
        let (odd, even) =
            players.pair().ok_or(SessionError::NotBothConnected)?;
        let other = match players.role_of(conn) {
            Some(role) => players
                .holder(role.opposite())
                .ok_or(SessionError::NotBothConnected)?,
            None => return Err(SessionError::NotAPlayer),
        };

        self.votes.insert(conn);
        if self.votes.len() < TOTAL_PLAYERS {
            return Ok(VoteOutcome::Pending {
                voted: self.votes.len(),
                voter: conn,
                other,
            });
        }

        self.votes.clear();
        Ok(VoteOutcome::Agreed { odd, even })
    }

    /// Drops `conn`'s vote, if it had one.
    pub fn withdraw(&mut self, conn: ConnectionId) -> bool {
        self.votes.remove(&conn)
    }

    /// Forgets every vote.
    pub fn clear(&mut self) {
        self.votes.clear();
    }

    /// Returns the number of votes in the current round.
    pub fn votes(&self) -> usize {
        self.votes.len()
    }

    /// Returns the state of the current round.
    pub fn state(&self) -> RematchState {
        match self.votes.len() {
            0 => RematchState::Idle,
            1 => RematchState::OneVoted,
            _ => RematchState::BothVoted,
        }
    }
}
