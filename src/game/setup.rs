use std::collections::{BTreeMap, BTreeSet};

use crate::game::board::Board;
use crate::game::error::Error;
use crate::game::player::Player;
use crate::game::state::State;
use crate::game::vertex::Vertex;

/// The explicit stone placements and removals of a game-tree node.
///
/// The three vertex sets are disjoint. Every recorded change carries the occupation it replaced
/// so the setup can be reverted idempotently, and recording a change back to an intersection's
/// previous occupation erases that entry entirely.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Setup {
    black: BTreeSet<Vertex>,
    white: BTreeSet<Vertex>,
    clear: BTreeSet<Vertex>,
    first_move_color: Option<Player>,
    previous: BTreeMap<Vertex, State>,
}

impl Setup {
    /// Returns a setup with no changes.
    #[must_use]
    pub fn new() -> Self {
        Setup::default()
    }

    /// Returns true when the setup changes nothing and overrides nothing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.black.is_empty()
            && self.white.is_empty()
            && self.clear.is_empty()
            && self.first_move_color.is_none()
    }

    /// The intersections this setup turns black.
    #[must_use]
    pub fn black_setup_stones(&self) -> &BTreeSet<Vertex> {
        &self.black
    }

    /// The intersections this setup turns white.
    #[must_use]
    pub fn white_setup_stones(&self) -> &BTreeSet<Vertex> {
        &self.white
    }

    /// The intersections this setup clears.
    #[must_use]
    pub fn no_setup_stones(&self) -> &BTreeSet<Vertex> {
        &self.clear
    }

    /// The occupation `vertex` had before this setup, when the setup touches it.
    #[must_use]
    pub fn previous_occupation(&self, vertex: Vertex) -> Option<State> {
        self.previous.get(&vertex).copied()
    }

    /// The side-to-move override, if any.
    #[must_use]
    pub fn first_move_color(&self) -> Option<Player> {
        self.first_move_color
    }

    /// Overrides (or clears the override of) the color making the first move.
    pub fn set_first_move_color(&mut self, color: Option<Player>) {
        self.first_move_color = color;
    }

    /// Records that `vertex`, previously `previous`, is set to `target`.
    ///
    /// Recording a target equal to an intersection's original occupation removes the entry, so
    /// toggling a change back and forth leaves the setup untouched.
    pub fn set_point(&mut self, vertex: Vertex, target: State, previous: State) {
        let original = *self.previous.entry(vertex).or_insert(previous);
        self.black.remove(&vertex);
        self.white.remove(&vertex);
        self.clear.remove(&vertex);
        if target == original {
            self.previous.remove(&vertex);
            return;
        }
        match target {
            State::Black => self.black.insert(vertex),
            State::White => self.white.insert(vertex),
            State::Empty => self.clear.insert(vertex),
        };
    }

    /// Re-snapshots every touched intersection against the occupation `board` currently shows,
    /// dropping entries whose target no longer changes anything.
    ///
    /// A handicap change shifts the occupation beneath a setup; the snapshot must follow before
    /// the setup is re-applied, or reverting it would resurrect the old handicap.
    pub fn rebase(&mut self, board: &Board) -> Result<(), Error> {
        let touched: Vec<Vertex> = self.previous.keys().copied().collect();
        for vertex in touched {
            let beneath = board.state_at(vertex)?;
            let target = if self.black.contains(&vertex) {
                State::Black
            } else if self.white.contains(&vertex) {
                State::White
            } else {
                State::Empty
            };
            if target == beneath {
                self.black.remove(&vertex);
                self.white.remove(&vertex);
                self.clear.remove(&vertex);
                self.previous.remove(&vertex);
            } else {
                self.previous.insert(vertex, beneath);
            }
        }
        Ok(())
    }

    /// Rebuilds a setup from archived fields.
    #[must_use]
    pub fn restored(
        black: BTreeSet<Vertex>,
        white: BTreeSet<Vertex>,
        clear: BTreeSet<Vertex>,
        first_move_color: Option<Player>,
        previous: BTreeMap<Vertex, State>,
    ) -> Self {
        Setup { black, white, clear, first_move_color, previous }
    }

    /// Applies every recorded change to `board`.
    pub fn apply(&self, board: &mut Board) -> Result<(), Error> {
        for &vertex in &self.black {
            board.set_state(vertex, State::Black)?;
        }
        for &vertex in &self.white {
            board.set_state(vertex, State::White)?;
        }
        for &vertex in &self.clear {
            board.set_state(vertex, State::Empty)?;
        }
        Ok(())
    }

    /// Restores every touched intersection to the occupation it had before this setup.
    pub fn revert(&self, board: &mut Board) -> Result<(), Error> {
        for (&vertex, &state) in &self.previous {
            board.set_state(vertex, state)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::board_size::BoardSize;

    fn vertex(s: &str) -> Vertex {
        s.parse().unwrap()
    }

    #[test]
    fn toggling_a_point_back_empties_the_setup() {
        let mut setup = Setup::new();
        setup.set_point(vertex("A1"), State::White, State::Empty);
        assert!(!setup.is_empty());
        setup.set_point(vertex("A1"), State::Empty, State::White);
        assert!(setup.is_empty());
        assert_eq!(setup.previous_occupation(vertex("A1")), None);
    }

    #[test]
    fn recoloring_keeps_the_original_snapshot() {
        let mut setup = Setup::new();
        setup.set_point(vertex("C3"), State::Black, State::White);
        setup.set_point(vertex("C3"), State::Empty, State::Black);
        // The snapshot still names White, the occupation before the whole setup.
        assert_eq!(setup.previous_occupation(vertex("C3")), Some(State::White));
        assert!(setup.black_setup_stones().is_empty());
        assert!(setup.no_setup_stones().contains(&vertex("C3")));
        setup.set_point(vertex("C3"), State::White, State::Empty);
        assert!(setup.is_empty());
    }

    #[test]
    fn apply_and_revert_round_trip() {
        let mut board = Board::with_size(BoardSize::Nine);
        board.set_state(vertex("E5"), State::White).unwrap();
        let before = board.clone();

        let mut setup = Setup::new();
        setup.set_point(vertex("E5"), State::Black, State::White);
        setup.set_point(vertex("E6"), State::Black, State::Empty);
        setup.apply(&mut board).unwrap();
        assert_eq!(board.state_at(vertex("E5")).unwrap(), State::Black);
        assert_eq!(board.state_at(vertex("E6")).unwrap(), State::Black);

        setup.revert(&mut board).unwrap();
        assert!(board.positions_equal(&before));
    }
}
