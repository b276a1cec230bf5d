use std::fmt;

use crate::game::board::Board;
use crate::game::error::Error;
use crate::game::player::Player;
use crate::game::state::State;
use crate::game::vertex::Vertex;

/// The largest move number a variation may reach; one more play or pass is `TooManyMoves`.
pub const MAX_MOVE_NUMBER: u32 = 9_999;

/// A play on an intersection or a pass.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum MoveKind {
    /// A stone placed on the named intersection.
    Play(Vertex),
    /// No stone placed.
    Pass,
}

/// A play or pass by one player, with the capture record needed to undo and redo it.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Move {
    /// What was played.
    pub kind: MoveKind,
    /// The player taking the move.
    pub player: Player,
    /// The stones the move removed from the board, in capture order.
    pub captured: Vec<Vertex>,
    /// The 1-based position of this move among the moves of its variation.
    pub number: u32,
    executed: bool,
}

impl Move {
    /// Returns a play at `vertex`.
    #[must_use]
    pub fn play(player: Player, vertex: Vertex, number: u32) -> Self {
        Move {
            kind: MoveKind::Play(vertex),
            player,
            captured: Vec::new(),
            number,
            executed: false,
        }
    }

    /// Returns a pass.
    #[must_use]
    pub fn pass(player: Player, number: u32) -> Self {
        Move {
            kind: MoveKind::Pass,
            player,
            captured: Vec::new(),
            number,
            executed: false,
        }
    }

    /// Rebuilds a move from archived fields, with its capture record already known.
    ///
    /// Re-executing the move verifies the record instead of overwriting it.
    #[must_use]
    pub fn restored(kind: MoveKind, player: Player, captured: Vec<Vertex>, number: u32) -> Self {
        Move { kind, player, captured, number, executed: true }
    }

    /// The intersection of a play, or `None` for a pass.
    #[must_use]
    pub fn vertex(&self) -> Option<Vertex> {
        match self.kind {
            MoveKind::Play(vertex) => Some(vertex),
            MoveKind::Pass => None,
        }
    }

    /// Executes the move on `board`, recording what it captured.
    ///
    /// A re-execution after an undo must capture exactly the stones it captured the first time;
    /// a differing capture set means the board no longer matches the variation and fails with
    /// `InternalInconsistency`.
    pub fn execute(&mut self, board: &mut Board) -> Result<(), Error> {
        let MoveKind::Play(vertex) = self.kind else {
            self.executed = true;
            return Ok(());
        };
        if board.state_at(vertex)? != State::Empty {
            return Err(Error::InternalInconsistency(format!(
                "move {} of {} executed on occupied {vertex}",
                self.number, self.player
            )));
        }
        let captured = board.place_stone(self.player, vertex)?;
        if self.executed {
            // The capture order may differ after an undo rebuilt the groups; the set may not.
            let mut replayed = captured;
            replayed.sort_unstable();
            let mut recorded = self.captured.clone();
            recorded.sort_unstable();
            if replayed != recorded {
                return Err(Error::InternalInconsistency(format!(
                    "re-executing move {} captured a different set of stones",
                    self.number
                )));
            }
        } else {
            self.captured = captured;
            self.executed = true;
        }
        Ok(())
    }

    /// Reverts an executed move on `board`. A pass reverts to a no-op.
    ///
    /// Captured stones come back first, so the surrounding regions merge the way they were
    /// before the move vacates its own intersection.
    pub fn revert(&self, board: &mut Board) -> Result<(), Error> {
        let MoveKind::Play(vertex) = self.kind else {
            return Ok(());
        };
        if board.state_at(vertex)? != State::from(self.player) {
            return Err(Error::InternalInconsistency(format!(
                "undoing move {} of {} but {vertex} does not hold that stone",
                self.number, self.player
            )));
        }
        for &captured in &self.captured {
            board.set_state(captured, State::from(self.player.opponent()))?;
        }
        board.set_state(vertex, State::Empty)?;
        Ok(())
    }
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self.kind {
            MoveKind::Play(vertex) => write!(f, "{}. {} {vertex}", self.number, self.player),
            MoveKind::Pass => write!(f, "{}. {} pass", self.number, self.player),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::board::Board;
    use crate::game::board_size::BoardSize;

    fn vertex(s: &str) -> Vertex {
        s.parse().unwrap()
    }

    #[test]
    fn a_pass_touches_nothing() {
        let mut board = Board::with_size(BoardSize::Nine);
        let before = board.clone();
        let mut pass = Move::pass(Player::Black, 1);
        pass.execute(&mut board).unwrap();
        pass.revert(&mut board).unwrap();
        assert!(board.positions_equal(&before));
    }

    #[test]
    fn execute_then_revert_restores_the_position() {
        let mut board = Board::with_size(BoardSize::Nine);
        board.set_state(vertex("E4"), State::White).unwrap();
        let before = board.clone();
        let mut mv = Move::play(Player::Black, vertex("E5"), 1);
        mv.execute(&mut board).unwrap();
        assert_eq!(board.state_at(vertex("E5")).unwrap(), State::Black);
        mv.revert(&mut board).unwrap();
        assert!(board.positions_equal(&before));
    }

    #[test]
    fn redo_verifies_the_capture_record() {
        let mut board = Board::with_size(BoardSize::Nine);
        for name in ["D4", "F4", "E3"] {
            board.set_state(vertex(name), State::Black).unwrap();
        }
        board.set_state(vertex("E4"), State::White).unwrap();
        let mut mv = Move::play(Player::Black, vertex("E5"), 1);
        mv.execute(&mut board).unwrap();
        assert_eq!(mv.captured, vec![vertex("E4")]);
        mv.revert(&mut board).unwrap();
        mv.execute(&mut board).unwrap();
        assert_eq!(mv.captured, vec![vertex("E4")]);
        assert_eq!(board.state_at(vertex("E4")).unwrap(), State::Empty);
    }

    #[test]
    fn executing_onto_a_stone_is_an_inconsistency() {
        let mut board = Board::with_size(BoardSize::Nine);
        board.set_state(vertex("E5"), State::White).unwrap();
        let mut mv = Move::play(Player::Black, vertex("E5"), 1);
        assert!(matches!(
            mv.execute(&mut board),
            Err(Error::InternalInconsistency(_))
        ));
    }
}
