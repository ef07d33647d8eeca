use thiserror::Error;

use crate::game::Phase;

/// Typed errors raised by the pure engine (components 1-5 of the design).
///
/// None of these represent I/O failure — the engine performs none. The
/// persistence/concurrency harness (component 6) is responsible for
/// translating these into the wire error codes of the RPC surface.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum GameError {
    #[error("malformed card string: {0:?}")]
    MalformedCard(String),

    #[error("invalid bet amount: {amount}, minimum: {minimum}")]
    InvalidBetAmount { amount: u32, minimum: u32 },

    #[error("insufficient chips for action")]
    InsufficientChips,

    #[error("no hand in progress")]
    NoHandInProgress,

    #[error("hand already complete")]
    HandAlreadyComplete,

    #[error("player has already folded")]
    PlayerAlreadyFolded,

    #[error("it's not seat {actual}'s turn (expected seat {expected})")]
    NotPlayersTurn { expected: usize, actual: usize },

    #[error("action is not legal in phase {phase:?}")]
    IllegalPhase { phase: Phase },

    #[error("illegal action: {0}")]
    IllegalAction(String),

    #[error("not enough players to start a hand (have {have}, need at least {need})")]
    NotEnoughPlayers { have: usize, need: usize },

    #[error("seat index {0} is out of range")]
    InvalidSeat(usize),

    #[error("player {0} is not seated at this table")]
    UnknownPlayer(u64),

    #[error("deck is exhausted")]
    DeckExhausted,

    #[error("internal invariant violated: {0}")]
    Internal(String),
}

impl GameError {
    /// Maps a pure engine error onto the wire error-code family of the RPC
    /// surface (§6). The harness has a richer `IntoErrorResponse` for its
    /// own error types but delegates engine errors here.
    pub fn wire_code(&self) -> &'static str {
        match self {
            GameError::NotEnoughPlayers { .. } => "NotEnoughPlayers",
            GameError::NoHandInProgress => "InvalidRequest",
            GameError::Internal(_) => "Internal",
            _ => "IllegalAction",
        }
    }
}
