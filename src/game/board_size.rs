use std::fmt;

use serde::{Deserialize, Serialize};

use crate::game::error::Error;
use crate::game::vertex::Vertex;

/// The valid Go board sizes.
///
/// Only the odd sizes from 7 to 19 are playable; everything else is rejected at construction.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub enum BoardSize {
    /// A 7x7 board.
    Seven,
    /// A 9x9 board, the common small size.
    Nine,
    /// An 11x11 board.
    Eleven,
    /// A 13x13 board, the common intermediate size.
    Thirteen,
    /// A 15x15 board.
    Fifteen,
    /// A 17x17 board.
    Seventeen,
    /// A 19x19 board, the full size.
    Nineteen,
}

impl BoardSize {
    /// The number of columns (and rows) of the board.
    #[must_use]
    pub fn value(self) -> usize {
        match self {
            BoardSize::Seven => 7,
            BoardSize::Nine => 9,
            BoardSize::Eleven => 11,
            BoardSize::Thirteen => 13,
            BoardSize::Fifteen => 15,
            BoardSize::Seventeen => 17,
            BoardSize::Nineteen => 19,
        }
    }

    /// Returns the center point (天元 tengen) of the board.
    #[must_use]
    pub fn center_point(self) -> Vertex {
        let center = (self.value() + 1) / 2;
        Vertex { x: center, y: center }
    }

    /// Returns the default star points (星 hoshi), which are traditionally marked with a small
    /// dot on the board.
    ///
    /// Corner stars sit on the third line up to size 11 and on the fourth line from size 13 up;
    /// the center point is always a star, and boards of size 15 and up also mark the edge
    /// midpoints. This matches the conventional layout used by the reference desktop
    /// application.
    #[must_use]
    pub fn star_points(self) -> Vec<Vertex> {
        let size = self.value();
        let min_line = if size > 11 { 4 } else { 3 };
        let max_line = size + 1 - min_line;
        let mut star_points = vec![
            Vertex { x: min_line, y: min_line },
            Vertex { x: max_line, y: min_line },
            Vertex { x: min_line, y: max_line },
            Vertex { x: max_line, y: max_line },
        ];
        star_points.push(self.center_point());

        if size >= 15 {
            let center_line = self.center_point().x;
            star_points.append(&mut vec![
                Vertex { x: min_line, y: center_line },
                Vertex { x: max_line, y: center_line },
                Vertex { x: center_line, y: min_line },
                Vertex { x: center_line, y: max_line },
            ]);
        }
        star_points
    }
}

impl TryFrom<usize> for BoardSize {
    type Error = Error;

    fn try_from(size: usize) -> Result<Self, Self::Error> {
        match size {
            7 => Ok(BoardSize::Seven),
            9 => Ok(BoardSize::Nine),
            11 => Ok(BoardSize::Eleven),
            13 => Ok(BoardSize::Thirteen),
            15 => Ok(BoardSize::Fifteen),
            17 => Ok(BoardSize::Seventeen),
            19 => Ok(BoardSize::Nineteen),
            _ => Err(Error::InvalidArgument(format!(
                "invalid board size: {size}"
            ))),
        }
    }
}

impl fmt::Display for BoardSize {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.value())
    }
}
