use core::fmt;
use serde::{Deserialize, Serialize};

/// Where a game stands. Candidate payloads are roster indices.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "phase", content = "candidate", rename_all = "snake_case")]
pub enum GamePhase {
    Playing,
    Guessing(usize),
    Won(usize),
    Lost,
}

impl GamePhase {
    /// `Won` and `Lost` only leave through a restart.
    pub const fn is_terminal(self) -> bool {
        matches!(self, GamePhase::Won(_) | GamePhase::Lost)
    }

    pub const fn guess(self) -> Option<usize> {
        match self {
            GamePhase::Guessing(index) | GamePhase::Won(index) => Some(index),
            GamePhase::Playing | GamePhase::Lost => None,
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            GamePhase::Playing => "playing",
            GamePhase::Guessing(_) => "guessing",
            GamePhase::Won(_) => "won",
            GamePhase::Lost => "lost",
        }
    }
}

impl fmt::Display for GamePhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
