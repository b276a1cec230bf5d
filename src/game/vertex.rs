use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

const GOBAN_LETTERS: &str = "ABCDEFGHJKLMNOPQRST";

/// A structure for storing the x and y coordinates of a board intersection.
///
/// Coordinates are 1-based: (1, 1) is the bottom left corner of the board.
#[derive(Clone, Copy, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize, Deserialize)]
pub struct Vertex {
    /// The x coordinate (the column).
    pub x: usize,
    /// The y coordinate (the row).
    pub y: usize,
}

impl Vertex {
    /// Returns the vertex one step away in `direction` on a board of size `size`, or `None` when
    /// the step would leave the board.
    ///
    /// `Next` advances x by one, wrapping to `(1, y + 1)` past the last column, and ends at
    /// `(size, size)`. `Previous` is its exact inverse.
    #[must_use]
    pub fn neighbor(self, direction: Direction, size: usize) -> Option<Self> {
        match direction {
            Direction::Left => (self.x > 1).then(|| Vertex { x: self.x - 1, y: self.y }),
            Direction::Right => (self.x < size).then(|| Vertex { x: self.x + 1, y: self.y }),
            Direction::Up => (self.y < size).then(|| Vertex { x: self.x, y: self.y + 1 }),
            Direction::Down => (self.y > 1).then(|| Vertex { x: self.x, y: self.y - 1 }),
            Direction::Next => {
                if self.x < size {
                    Some(Vertex { x: self.x + 1, y: self.y })
                } else if self.y < size {
                    Some(Vertex { x: 1, y: self.y + 1 })
                } else {
                    None
                }
            }
            Direction::Previous => {
                if self.x > 1 {
                    Some(Vertex { x: self.x - 1, y: self.y })
                } else if self.y > 1 {
                    Some(Vertex { x: size, y: self.y - 1 })
                } else {
                    None
                }
            }
        }
    }

    /// Returns true if both coordinates lie in `1..=size`.
    #[must_use]
    pub fn is_valid(self, size: usize) -> bool {
        (1..=size).contains(&self.x) && (1..=size).contains(&self.y)
    }
}

impl fmt::Debug for Vertex {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{self}")
    }
}

impl fmt::Display for Vertex {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let letter = GOBAN_LETTERS
            .chars()
            .nth(self.x - 1)
            .expect("expected char to be in GOBAN_LETTERS");
        write!(f, "{letter}{}", self.y)
    }
}

impl FromStr for Vertex {
    type Err = String;

    fn from_str(vertex: &str) -> Result<Self, Self::Err> {
        if vertex.len() < 2 {
            return Err("string too short to be a vertex".to_owned());
        }

        let letter = vertex
            .chars()
            .next()
            .expect("expected vertex to contain a letter");

        let Some(x) = GOBAN_LETTERS.find(letter.to_ascii_uppercase()) else {
            return Err(format!("invalid coordinate letter {letter:?}"));
        };

        let number: String = vertex.chars().skip(1).collect();
        let y = match number.parse::<u32>() {
            Ok(y) => y as usize,
            Err(_) => return Err("number is not a u32".to_owned()),
        };

        if y == 0 {
            return Err("number must be greater than zero".to_owned());
        }
        Ok(Vertex { x: x + 1, y })
    }
}

/// One of the six ways to walk from an intersection.
///
/// `Left`, `Right`, `Up`, and `Down` are the 4-adjacency used by regions; `Next` and `Previous`
/// visit the rows left-to-right, bottom-to-top, and exist only for iteration.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Direction {
    /// Towards column A.
    Left,
    /// Towards the last column.
    Right,
    /// Towards the top row.
    Up,
    /// Towards row 1.
    Down,
    /// The successor in row-major iteration order.
    Next,
    /// The predecessor in row-major iteration order.
    Previous,
}

/// A collection of Vertices. This is a wrapper type for providing traits such as Display.
#[derive(Debug)]
pub struct Vertices(pub Vec<Vertex>);

impl fmt::Display for Vertices {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        for (index, vert) in self.0.iter().enumerate() {
            if index == 0 {
                write!(f, "{}", &vert)?;
            } else {
                write!(f, ", {vert}")?;
            }
        }
        Ok(())
    }
}
