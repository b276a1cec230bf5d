//! A generic matrix module specialized for holding per-intersection board state.

use std::fmt::Debug;
use std::ops::{Index, IndexMut};

use crate::game::vertex::{Direction, Vertex};

/// A square matrix holding a value of type T for each vertex on the board.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Matrix<T: Clone + Debug + Default + PartialEq> {
    size: usize,
    vec: Vec<T>,
}

fn vertex_from_index(index: usize, board_size: usize) -> Vertex {
    let x = index % board_size + 1;
    let y = index / board_size + 1;
    Vertex { x, y }
}

fn index_from_vertex(vertex: Vertex, board_size: usize) -> usize {
    (vertex.y - 1) * board_size + (vertex.x - 1)
}

impl<T: Clone + Debug + Default + PartialEq> Matrix<T> {
    /// Returns a new matrix of all default values.
    #[must_use]
    pub fn with_size(size: usize) -> Self {
        Matrix {
            size,
            vec: vec![T::default(); size * size],
        }
    }

    /// Returns the matrix size.
    #[must_use]
    pub fn size(&self) -> usize {
        self.size
    }

    /// Returns the value at a given vertex or none if the vertex is not in the matrix.
    pub fn get(&self, vertex: Vertex) -> Option<&T> {
        if vertex.is_valid(self.size) {
            self.vec.get(index_from_vertex(vertex, self.size))
        } else {
            None
        }
    }

    /// Returns the 4-adjacent vertices of `vertex` in Left, Right, Up, Down order.
    ///
    /// The enumeration order is the tie-break order for region splits and joins.
    #[must_use]
    pub fn neighbors(&self, vertex: Vertex) -> Vec<Vertex> {
        const SIDES: [Direction; 4] =
            [Direction::Left, Direction::Right, Direction::Up, Direction::Down];
        SIDES
            .iter()
            .filter_map(|&direction| vertex.neighbor(direction, self.size))
            .collect()
    }

    /// Returns an iterator over all vertices in next/previous order: rows left-to-right,
    /// bottom-to-top.
    pub fn vertices(&self) -> impl Iterator<Item = Vertex> {
        let size = self.size;
        (0..size * size).map(move |index| vertex_from_index(index, size))
    }

    /// Returns all the vertices holding a value equal to `in_state`.
    pub fn vertices_in_state(&self, in_state: &T) -> Vec<Vertex> {
        self.vec
            .iter()
            .enumerate()
            .filter_map(|(index, state)| {
                (state == in_state).then(|| vertex_from_index(index, self.size))
            })
            .collect()
    }

    /// Returns true if the vertex is in the matrix and holds a value equal to `in_state`.
    pub fn is_in_state(&self, vertex: Vertex, in_state: &T) -> bool {
        self.get(vertex) == Some(in_state)
    }

    /// Returns the matrix to all default values.
    pub fn reset(&mut self) {
        for value in &mut self.vec {
            *value = T::default();
        }
    }
}

impl<T: Clone + Debug + Default + PartialEq> Index<Vertex> for Matrix<T> {
    type Output = T;
    fn index(&self, vertex: Vertex) -> &Self::Output {
        self.vec
            .get(index_from_vertex(vertex, self.size))
            .expect("vertex not in the matrix")
    }
}

impl<T: Clone + Debug + Default + PartialEq> IndexMut<Vertex> for Matrix<T> {
    fn index_mut(&mut self, vertex: Vertex) -> &mut T {
        self.vec
            .get_mut(index_from_vertex(vertex, self.size))
            .expect("vertex not in the matrix")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn neighbors_order_is_left_right_up_down() {
        let matrix: Matrix<u32> = Matrix::with_size(5);
        let neighbors = matrix.neighbors(Vertex { x: 3, y: 3 });
        assert_eq!(
            neighbors,
            vec![
                Vertex { x: 2, y: 3 },
                Vertex { x: 4, y: 3 },
                Vertex { x: 3, y: 4 },
                Vertex { x: 3, y: 2 },
            ]
        );
    }

    #[test]
    fn corner_has_two_neighbors() {
        let matrix: Matrix<u32> = Matrix::with_size(5);
        assert_eq!(matrix.neighbors(Vertex { x: 1, y: 1 }).len(), 2);
        assert_eq!(matrix.neighbors(Vertex { x: 5, y: 1 }).len(), 2);
        assert_eq!(matrix.neighbors(Vertex { x: 1, y: 2 }).len(), 3);
    }

    #[test]
    fn vertices_iterate_rows_bottom_to_top() {
        let matrix: Matrix<u32> = Matrix::with_size(3);
        let vertices: Vec<_> = matrix.vertices().collect();
        assert_eq!(vertices.len(), 9);
        assert_eq!(vertices[0], Vertex { x: 1, y: 1 });
        assert_eq!(vertices[2], Vertex { x: 3, y: 1 });
        assert_eq!(vertices[3], Vertex { x: 1, y: 2 });
        assert_eq!(vertices[8], Vertex { x: 3, y: 3 });
    }

    #[test]
    fn get_rejects_out_of_range() {
        let matrix: Matrix<u32> = Matrix::with_size(3);
        assert!(matrix.get(Vertex { x: 0, y: 1 }).is_none());
        assert!(matrix.get(Vertex { x: 4, y: 1 }).is_none());
        assert!(matrix.get(Vertex { x: 3, y: 3 }).is_some());
    }
}
