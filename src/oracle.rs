//! The interface to an external dead-stone estimator.
//!
//! The engine behind it (typically a Go program reached over the Go Text Protocol) is an opaque
//! collaborator: the core only ever asks it for an initial set of dead-stone coordinates when a
//! scoring pass begins, and a failure is never fatal.

use crate::game::board::Board;
use crate::game::vertex::Vertex;

/// An external estimator supplying the initial dead stones of a scoring pass.
pub trait DeadStoneOracle {
    /// Returns the coordinates the oracle believes hold dead stones.
    ///
    /// Failures are reported as a message and treated as "no opinion": scoring proceeds with an
    /// empty initial dead-stone set.
    fn dead_stones(&self, board: &Board) -> Result<Vec<Vertex>, String>;
}

/// An oracle with no opinion; every query answers with an empty set.
#[derive(Clone, Copy, Debug, Default)]
pub struct NullOracle;

impl DeadStoneOracle for NullOracle {
    fn dead_stones(&self, _board: &Board) -> Result<Vec<Vertex>, String> {
        Ok(Vec::new())
    }
}
