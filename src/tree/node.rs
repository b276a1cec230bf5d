use std::fmt;

use crate::game::moves::Move;
use crate::game::setup::Setup;

/// A stable handle to a node in the game tree's arena.
///
/// Handles double as the keys of the persisted node table, which stays flat to avoid deep-tree
/// recursion during encoding.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct NodeId(pub(crate) u32);

impl NodeId {
    /// The raw archive key of this node.
    #[must_use]
    pub fn value(self) -> u32 {
        self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "node#{}", self.0)
    }
}

/// One element of the game tree.
///
/// A node holds at most one move and at most one setup; the root holds neither initially. Its
/// Zobrist hash stands for the board position reached by applying every ancestor's setup and
/// move from the root down.
#[derive(Clone, Debug, Default)]
pub struct Node {
    pub(crate) parent: Option<NodeId>,
    pub(crate) first_child: Option<NodeId>,
    pub(crate) next_sibling: Option<NodeId>,
    pub(crate) mov: Option<Move>,
    pub(crate) setup: Option<Setup>,
    pub(crate) comment: Option<String>,
    pub(crate) zobrist: u64,
}

impl Node {
    /// Returns an empty node.
    #[must_use]
    pub fn new() -> Self {
        Node::default()
    }

    /// Returns a node holding `mov`.
    #[must_use]
    pub fn with_move(mov: Move) -> Self {
        Node { mov: Some(mov), ..Node::default() }
    }

    /// Returns a node holding `setup`.
    #[must_use]
    pub fn with_setup(setup: Setup) -> Self {
        Node { setup: Some(setup), ..Node::default() }
    }

    /// The parent link, absent on the root.
    #[must_use]
    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    /// The first child link.
    #[must_use]
    pub fn first_child(&self) -> Option<NodeId> {
        self.first_child
    }

    /// The next sibling link.
    #[must_use]
    pub fn next_sibling(&self) -> Option<NodeId> {
        self.next_sibling
    }

    /// The node's move, if it holds one.
    #[must_use]
    pub fn mov(&self) -> Option<&Move> {
        self.mov.as_ref()
    }

    /// The node's setup, if it holds one.
    #[must_use]
    pub fn setup(&self) -> Option<&Setup> {
        self.setup.as_ref()
    }

    /// The node's setup, for editing in place.
    pub fn setup_mut(&mut self) -> Option<&mut Setup> {
        self.setup.as_mut()
    }

    /// The free-text annotation attached to the node.
    #[must_use]
    pub fn comment(&self) -> Option<&str> {
        self.comment.as_deref()
    }

    /// Attaches (or clears) the free-text annotation.
    pub fn set_comment(&mut self, comment: Option<String>) {
        self.comment = comment;
    }

    /// The hash of the board position this node produces.
    #[must_use]
    pub fn zobrist(&self) -> u64 {
        self.zobrist
    }
}
