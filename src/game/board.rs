use std::fmt;

use crate::game::board_size::BoardSize;
use crate::game::error::Error;
use crate::game::player::Player;
use crate::game::region::{Partition, Region, RegionId};
use crate::game::state::State;
use crate::game::vertex::{Direction, Vertex};
use crate::game::zobrist::ZobristTable;

const GOBAN_LETTERS: &str = "ABCDEFGHJKLMNOPQRST";

/// A representation of the board state.
///
/// The board eagerly owns one intersection per grid position, the partition of the
/// intersections into regions, the star-point list, and the Zobrist table sized for it.
#[derive(Clone, Debug)]
pub struct Board {
    size: BoardSize,
    partition: Partition,
    star_points: Vec<Vertex>,
    zobrist: ZobristTable,
}

impl Board {
    /// Returns a new empty board with the conventional star points.
    #[must_use]
    pub fn with_size(size: BoardSize) -> Self {
        Board {
            size,
            partition: Partition::with_size(size.value()),
            star_points: size.star_points(),
            zobrist: ZobristTable::new(size),
        }
    }

    /// Returns a new empty board whose Zobrist table is seeded, for reproducible tests.
    #[must_use]
    pub fn with_seed(size: BoardSize, seed: u64) -> Self {
        Board {
            size,
            partition: Partition::with_size(size.value()),
            star_points: size.star_points(),
            zobrist: ZobristTable::with_seed(size, seed),
        }
    }

    /// Returns a new empty board with a caller-supplied star-point table.
    ///
    /// Fails with `InvalidArgument` when a star point lies off the board.
    pub fn with_star_points(size: BoardSize, star_points: Vec<Vertex>) -> Result<Self, Error> {
        for &star in &star_points {
            if !star.is_valid(size.value()) {
                return Err(Error::InvalidArgument(format!(
                    "star point {star} not on a board of size {size}"
                )));
            }
        }
        let mut board = Board::with_size(size);
        board.star_points = star_points;
        Ok(board)
    }

    /// The size of the board.
    #[must_use]
    pub fn size(&self) -> BoardSize {
        self.size
    }

    /// Removes all of the stones from the board, resetting the partition to one empty region.
    pub fn clear(&mut self) {
        self.partition = Partition::with_size(self.size.value());
    }

    /// The star points (星 hoshi), read-only after construction.
    #[must_use]
    pub fn star_points(&self) -> &[Vertex] {
        &self.star_points
    }

    /// The board's Zobrist table.
    #[must_use]
    pub fn zobrist(&self) -> &ZobristTable {
        &self.zobrist
    }

    /// The partition of the board's intersections into regions.
    #[must_use]
    pub fn partition(&self) -> &Partition {
        &self.partition
    }

    /// The partition, for scoring-mode control and region annotation.
    pub fn partition_mut(&mut self) -> &mut Partition {
        &mut self.partition
    }

    /// Returns the intersection at `vertex`, or fails when the vertex is off the board.
    pub fn point(&self, vertex: Vertex) -> Result<Point<'_>, Error> {
        if vertex.is_valid(self.size.value()) {
            Ok(Point { board: self, vertex })
        } else {
            Err(Error::InvalidArgument(format!(
                "vertex {vertex} not on a board of size {}",
                self.size
            )))
        }
    }

    /// The stone state at `vertex`.
    pub fn state_at(&self, vertex: Vertex) -> Result<State, Error> {
        self.point(vertex)?;
        Ok(self.partition.state_at(vertex))
    }

    /// Returns true if the vertex is on the board and empty.
    #[must_use]
    pub fn is_vacant(&self, vertex: Vertex) -> bool {
        self.state_at(vertex) == Ok(State::Empty)
    }

    /// Sets the stone state at `vertex`, updating the region partition.
    pub fn set_state(&mut self, vertex: Vertex, state: State) -> Result<(), Error> {
        self.point(vertex)?;
        self.partition.set_state(vertex, state)
    }

    /// Places a stone for `player`, removing captured opposing groups.
    ///
    /// The move is assumed to be legal apart from the occupancy check. Returns the captured
    /// stones, ordered by the Left/Right/Up/Down neighbor scan and by each captured group's own
    /// point order.
    pub fn place_stone(&mut self, player: Player, vertex: Vertex) -> Result<Vec<Vertex>, Error> {
        if self.state_at(vertex)? != State::Empty {
            return Err(Error::InvalidArgument(format!("{vertex} is occupied")));
        }
        self.partition.set_state(vertex, State::from(player))?;

        let opposing = State::from(player.opponent());
        let mut seen: Vec<RegionId> = Vec::new();
        let mut captured: Vec<Vertex> = Vec::new();
        for neighbor in self.neighbors(vertex) {
            if self.partition.state_at(neighbor) != opposing {
                continue;
            }
            let id = self.partition.region_id_at(neighbor);
            if seen.contains(&id) {
                continue;
            }
            seen.push(id);
            if self.partition.liberties(id)? == 0 {
                captured.extend_from_slice(self.partition.region(id)?.points());
            }
        }
        for &prisoner in &captured {
            self.partition.set_state(prisoner, State::Empty)?;
        }
        debug_assert!(
            self.partition
                .liberties(self.partition.region_id_at(vertex))
                .map_or(false, |liberties| liberties > 0),
            "a legal stone placement must leave its own group a liberty"
        );
        Ok(captured)
    }

    /// The 4-adjacent vertices of `vertex` in Left, Right, Up, Down order.
    #[must_use]
    pub fn neighbors(&self, vertex: Vertex) -> Vec<Vertex> {
        const SIDES: [Direction; 4] =
            [Direction::Left, Direction::Right, Direction::Up, Direction::Down];
        SIDES
            .iter()
            .filter_map(|&direction| vertex.neighbor(direction, self.size.value()))
            .collect()
    }

    /// Iterates over all vertices in next/previous order.
    pub fn vertices(&self) -> impl Iterator<Item = Vertex> {
        let size = self.size.value();
        let first = Vertex { x: 1, y: 1 };
        std::iter::successors(Some(first), move |vertex| {
            vertex.neighbor(Direction::Next, size)
        })
    }

    /// Returns true if both boards hold the same stones on every intersection.
    #[must_use]
    pub fn positions_equal(&self, other: &Board) -> bool {
        self.size == other.size
            && self
                .vertices()
                .all(|vertex| self.partition.state_at(vertex) == other.partition.state_at(vertex))
    }

    fn push_letters(&self, board: &mut String) {
        board.push_str("  ");
        for letter in GOBAN_LETTERS.chars().take(self.size.value()) {
            board.push(' ');
            board.push(letter);
        }
        board.push_str("   ");
    }

    /// Returns a human readable ASCII representation of the board.
    #[must_use]
    pub fn to_ascii(&self) -> String {
        let size = self.size.value();
        let mut board = String::new();
        self.push_letters(&mut board);
        board.push_str("\r\n");
        for y in (1..=size).rev() {
            board.push_str(&format!("{y:02}"));
            for x in 1..=size {
                board.push(' ');
                let vertex = Vertex { x, y };
                let c = match self.partition.state_at(vertex) {
                    State::Empty => {
                        if self.star_points.contains(&vertex) {
                            '+'
                        } else {
                            '.'
                        }
                    }
                    State::Black => 'x',
                    State::White => 'o',
                };
                board.push(c);
            }
            board.push_str(&format!(" {y:02}\r\n"));
        }
        self.push_letters(&mut board);
        board
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.to_ascii())
    }
}

/// One intersection of a board: its coordinates, stone state, and owning region.
#[derive(Clone, Copy, Debug)]
pub struct Point<'a> {
    board: &'a Board,
    vertex: Vertex,
}

impl<'a> Point<'a> {
    /// The coordinates of the intersection.
    #[must_use]
    pub fn vertex(&self) -> Vertex {
        self.vertex
    }

    /// The stone state of the intersection.
    #[must_use]
    pub fn state(&self) -> State {
        self.board.partition.state_at(self.vertex)
    }

    /// The handle of the region owning this intersection.
    #[must_use]
    pub fn region_id(&self) -> RegionId {
        self.board.partition.region_id_at(self.vertex)
    }

    /// The region owning this intersection.
    #[must_use]
    pub fn region(&self) -> &'a Region {
        self.board
            .partition
            .region(self.region_id())
            .expect("every intersection belongs to a live region")
    }

    /// The neighbor one step away in `direction`, or `None` at an edge.
    #[must_use]
    pub fn neighbor(&self, direction: Direction) -> Option<Point<'a>> {
        self.vertex
            .neighbor(direction, self.board.size.value())
            .map(|vertex| Point { board: self.board, vertex })
    }

    /// The 4-adjacent intersections in Left, Right, Up, Down order.
    #[must_use]
    pub fn neighbors(&self) -> Vec<Point<'a>> {
        self.board
            .neighbors(self.vertex)
            .into_iter()
            .map(|vertex| Point { board: self.board, vertex })
            .collect()
    }

    /// Returns true if the intersection is marked with a star point.
    #[must_use]
    pub fn is_star_point(&self) -> bool {
        self.board.star_points.contains(&self.vertex)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vertex(s: &str) -> Vertex {
        s.parse().unwrap()
    }

    #[test]
    fn point_at_rejects_out_of_range() {
        let board = Board::with_size(BoardSize::Nine);
        assert!(board.point(vertex("J9")).is_ok());
        assert!(board.point(Vertex { x: 10, y: 1 }).is_err());
        assert!(board.point(Vertex { x: 0, y: 1 }).is_err());
    }

    #[test]
    fn ponnuki_captures_the_lone_stone() {
        let mut board = Board::with_size(BoardSize::Nine);
        for name in ["D4", "F4", "E3"] {
            board.set_state(vertex(name), State::Black).unwrap();
        }
        board.set_state(vertex("E4"), State::White).unwrap();
        let captured = board.place_stone(Player::Black, vertex("E5")).unwrap();
        assert_eq!(captured, vec![vertex("E4")]);
        assert_eq!(board.state_at(vertex("E4")).unwrap(), State::Empty);
        board.partition().validate().unwrap();
    }

    #[test]
    fn capturing_two_groups_collects_both() {
        // Two separate white stones in atari on the first line, both captured by one play.
        let mut board = Board::with_size(BoardSize::Nine);
        board.set_state(vertex("A1"), State::White).unwrap();
        board.set_state(vertex("C1"), State::White).unwrap();
        board.set_state(vertex("A2"), State::Black).unwrap();
        board.set_state(vertex("B2"), State::Black).unwrap();
        board.set_state(vertex("C2"), State::Black).unwrap();
        board.set_state(vertex("D1"), State::Black).unwrap();
        let captured = board.place_stone(Player::Black, vertex("B1")).unwrap();
        assert_eq!(captured, vec![vertex("A1"), vertex("C1")]);
        board.partition().validate().unwrap();
    }

    #[test]
    fn captured_group_becomes_one_empty_region() {
        // Black surrounds a two-stone white group; after the capture the two freed
        // intersections form a single connected empty region.
        let mut board = Board::with_size(BoardSize::Nine);
        for name in ["D4", "D5", "E6", "F6", "G5", "G4", "E3", "F3"] {
            board.set_state(vertex(name), State::Black).unwrap();
        }
        board.set_state(vertex("E4"), State::White).unwrap();
        board.set_state(vertex("F4"), State::White).unwrap();
        board.set_state(vertex("E5"), State::Black).unwrap();
        let captured = board.place_stone(Player::Black, vertex("F5")).unwrap();
        assert_eq!(captured.len(), 2);
        assert!(captured.contains(&vertex("E4")));
        assert!(captured.contains(&vertex("F4")));
        assert_eq!(
            board.point(vertex("E4")).unwrap().region_id(),
            board.point(vertex("F4")).unwrap().region_id()
        );
        assert_eq!(board.point(vertex("E4")).unwrap().region().size(), 2);
        board.partition().validate().unwrap();
    }

    #[test]
    fn ascii_marks_stones_and_stars() {
        let mut board = Board::with_size(BoardSize::Nine);
        board.set_state(vertex("E5"), State::Black).unwrap();
        board.set_state(vertex("C3"), State::White).unwrap();
        let ascii = board.to_ascii();
        assert!(ascii.contains('x'));
        assert!(ascii.contains('o'));
        assert!(ascii.contains('+'));
    }
}
