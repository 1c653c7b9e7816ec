//! Session phase, derived from seating and the game-over latch.

use std::fmt;

/// Where the session is in its lifecycle.
///
/// ```text
/// Waiting ──second player──→ Playing ──line completed──→ GameOver
///    ↑                          │                           │
///    └──────── slot-holder disconnects (full reset) ────────┘
///                               ↑                           │
///                               └──── rematch agreed ───────┘
/// ```
///
/// The phase is never stored: it is computed from the registry and the
/// `game_over` flag, so it cannot drift out of sync with them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    /// Fewer than two players are seated.
    Waiting,
    /// Both seats are filled and the board accepts increments.
    Playing,
    /// A line was completed; only rematch votes are useful now.
    GameOver,
}

impl SessionPhase {
    /// Returns `true` if increments are accepted.
    pub fn is_active(self) -> bool {
        matches!(self, Self::Playing)
    }
}

impl fmt::Display for SessionPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Waiting => write!(f, "Waiting"),
            Self::Playing => write!(f, "Playing"),
            Self::GameOver => write!(f, "GameOver"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_playing_is_active() {
        assert!(!SessionPhase::Waiting.is_active());
        assert!(SessionPhase::Playing.is_active());
        assert!(!SessionPhase::GameOver.is_active());
    }

    #[test]
    fn test_display() {
        assert_eq!(SessionPhase::GameOver.to_string(), "GameOver");
    }
}
