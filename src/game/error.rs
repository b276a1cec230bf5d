use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::game::vertex::Vertex;

/// The error kinds surfaced by the engine's public API.
///
/// Errors are returned, never panicked across API boundaries, and mutating operations fail
/// atomically: a failed operation leaves no partial partition change behind.
#[derive(Clone, Debug, Eq, PartialEq, Error)]
pub enum Error {
    /// A nil-like, out-of-range, or otherwise malformed argument.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// An index outside the valid range of a variation or node list.
    #[error("index {index} out of range 1..={len}")]
    OutOfRange {
        /// The offending index.
        index: usize,
        /// The length of the indexed collection.
        len: usize,
    },

    /// The engine detected a violation of one of its own invariants.
    #[error("internal inconsistency: {0}")]
    InternalInconsistency(String),

    /// The operation is not legal in the game's current lifecycle state.
    #[error("operation not allowed in the current game state: {0}")]
    StateInvalid(String),

    /// A move rejected by the legality engine.
    #[error("illegal move: {0}")]
    MoveIllegal(IllegalMoveReason),

    /// A board-setup change rejected by the legality engine.
    #[error("illegal board setup: {0}")]
    SetupIllegal(IllegalSetup),

    /// A Zobrist table was used with a board of a different size.
    #[error("zobrist table for size {table} used with board of size {board}")]
    SizeMismatch {
        /// The size the table was created for.
        table: usize,
        /// The size of the board it was asked about.
        board: usize,
    },
}

/// Why a play or pass was rejected.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub enum IllegalMoveReason {
    /// The target intersection already holds a stone.
    IntersectionOccupied,
    /// The stone's group would end with zero liberties without capturing.
    Suicide,
    /// The move would recreate the position before the opponent's last move.
    SimpleKo,
    /// The move would recreate an earlier position of the variation.
    Superko,
    /// The variation already holds the maximum number of moves.
    TooManyMoves,
}

impl fmt::Display for IllegalMoveReason {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let reason = match self {
            IllegalMoveReason::IntersectionOccupied => "intersection is occupied",
            IllegalMoveReason::Suicide => "suicide",
            IllegalMoveReason::SimpleKo => "simple ko",
            IllegalMoveReason::Superko => "superko",
            IllegalMoveReason::TooManyMoves => "too many moves",
        };
        write!(f, "{reason}")
    }
}

/// Why a board-setup change was rejected.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub enum IllegalSetupReason {
    /// The setup stone itself would have no liberties.
    SuicideSetupStone,
    /// A single opposing stone would be left without liberties.
    SuicideOpposingStone,
    /// An opposing stone group would be left without liberties.
    SuicideOpposingStoneGroup,
    /// Recoloring the stone would strand a sub-group of its former group.
    SuicideOpposingColorSubgroup,
    /// A friendly stone group would be left without liberties.
    SuicideFriendlyStoneGroup,
}

/// A rejected board-setup change: the reason plus the stone or group representative it strands.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct IllegalSetup {
    /// Why the change is illegal.
    pub reason: IllegalSetupReason,
    /// A point of the stone or group that would be left without liberties.
    pub point: Vertex,
}

impl fmt::Display for IllegalSetup {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let reason = match self.reason {
            IllegalSetupReason::SuicideSetupStone => "setup stone would be suicide",
            IllegalSetupReason::SuicideOpposingStone => "opposing stone would be captured",
            IllegalSetupReason::SuicideOpposingStoneGroup => "opposing group would be captured",
            IllegalSetupReason::SuicideOpposingColorSubgroup => {
                "sub-group of the recolored group would be captured"
            }
            IllegalSetupReason::SuicideFriendlyStoneGroup => "friendly group would be captured",
        };
        write!(f, "{reason} (at {})", self.point)
    }
}
