use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::game::board_size::BoardSize;
use crate::game::error::Error;
use crate::game::moves::{Move, MoveKind};
use crate::game::player::Player;
use crate::game::setup::Setup;
use crate::game::state::State;
use crate::game::vertex::Vertex;

/// A per-board table of random values enabling incremental position hashes.
///
/// The table stores one 64-bit value per (intersection, color) pair, 2·N² in total. A position
/// hash is the XOR of the values of all occupied intersections, so each board transition is an
/// O(Δ) update. Tables are never persisted; an archive load creates a fresh table and recomputes
/// every node hash.
#[derive(Clone, Debug)]
pub struct ZobristTable {
    size: usize,
    table: Vec<u64>,
}

impl ZobristTable {
    /// Returns a table for `size` with values seeded from entropy.
    #[must_use]
    pub fn new(size: BoardSize) -> Self {
        Self::with_rng(size, StdRng::from_entropy())
    }

    /// Returns a table for `size` with values generated from a seeded rng, for reproducible
    /// tests.
    #[must_use]
    pub fn with_seed(size: BoardSize, seed: u64) -> Self {
        Self::with_rng(size, StdRng::seed_from_u64(seed))
    }

    fn with_rng(size: BoardSize, mut rng: StdRng) -> Self {
        let size = size.value();
        let table = (0..2 * size * size).map(|_| rng.gen()).collect();
        ZobristTable { size, table }
    }

    /// The board size this table was created for.
    #[must_use]
    pub fn size(&self) -> usize {
        self.size
    }

    /// Fails with `SizeMismatch` unless the table was created for a board of `size`.
    pub fn matches_board(&self, size: BoardSize) -> Result<(), Error> {
        if self.size == size.value() {
            Ok(())
        } else {
            Err(Error::SizeMismatch { table: self.size, board: size.value() })
        }
    }

    /// The random value for a stone of `player` at `vertex`.
    pub fn value(&self, vertex: Vertex, player: Player) -> Result<u64, Error> {
        if !vertex.is_valid(self.size) {
            return Err(Error::InvalidArgument(format!(
                "vertex {vertex} not on a board of size {}",
                self.size
            )));
        }
        let color = match player {
            Player::Black => 0,
            Player::White => 1,
        };
        let index = ((vertex.y - 1) * self.size + (vertex.x - 1)) * 2 + color;
        Ok(self.table[index])
    }

    /// The hash of the position holding exactly the handicap stones, starting from 0.
    pub fn hash_for_handicap(&self, points: &[Vertex]) -> Result<u64, Error> {
        let mut hash = 0;
        for &point in points {
            hash ^= self.value(point, Player::Black)?;
        }
        Ok(hash)
    }

    /// The hash of the position after `mv` was played on the position hashing to `parent`.
    ///
    /// A pass leaves the hash unchanged; a play removes every captured stone of the opposing
    /// color and adds the played stone.
    pub fn hash_for_move(&self, parent: u64, mv: &Move) -> Result<u64, Error> {
        match mv.kind {
            MoveKind::Pass => Ok(parent),
            MoveKind::Play(point) => {
                let mut hash = parent;
                for &captured in &mv.captured {
                    hash ^= self.value(captured, mv.player.opponent())?;
                }
                hash ^= self.value(point, mv.player)?;
                Ok(hash)
            }
        }
    }

    /// The hash of the position after `setup` was applied to the position hashing to `parent`.
    ///
    /// Uses the setup's previous-occupation snapshot to remove replaced stones. A no-setup entry
    /// for a point whose previous state is unrecorded or empty fails with
    /// `InternalInconsistency`.
    pub fn hash_for_setup(&self, parent: u64, setup: &Setup) -> Result<u64, Error> {
        let mut hash = parent;
        for (color, points) in [
            (Player::Black, setup.black_setup_stones()),
            (Player::White, setup.white_setup_stones()),
        ] {
            for &point in points {
                match setup.previous_occupation(point) {
                    Some(state) if state == State::from(color) => {}
                    Some(State::Empty) | None => hash ^= self.value(point, color)?,
                    Some(state) => {
                        let replaced = state.player().expect("state checked to be a stone");
                        hash ^= self.value(point, replaced)?;
                        hash ^= self.value(point, color)?;
                    }
                }
            }
        }
        for &point in setup.no_setup_stones() {
            let Some(player) = setup.previous_occupation(point).and_then(State::player) else {
                return Err(Error::InternalInconsistency(format!(
                    "setup removes stone of undetermined color at {point}"
                )));
            };
            hash ^= self.value(point, player)?;
        }
        Ok(hash)
    }
}
