//! The game tree: nodes of moves, setup, and annotations, and the current variation through
//! them.

/// The model maintaining the tree and the current linear variation.
pub mod model;

/// A game-tree node owning an optional move and an optional setup.
pub mod node;
