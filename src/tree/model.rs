use crate::game::error::Error;
use crate::tree::node::{Node, NodeId};

/// The game tree and the current linear variation through it.
///
/// Nodes live in an arena addressed by [`NodeId`]; they are created only by appending or
/// inserting and destroyed only by discarding, and an ancestor is never destroyed while a
/// descendant lives. The current variation lists the nodes from the root down to the leaf of
/// the selected branch, each entry a child of the one before it.
#[derive(Clone, Debug)]
pub struct NodeModel {
    slab: Vec<Option<Node>>,
    free: Vec<u32>,
    root: NodeId,
    variation: Vec<NodeId>,
    number_of_nodes: usize,
    number_of_moves: usize,
    dirty: bool,
}

impl NodeModel {
    /// Returns a model holding only an empty root node.
    #[must_use]
    pub fn new() -> Self {
        let root = NodeId(0);
        NodeModel {
            slab: vec![Some(Node::new())],
            free: Vec::new(),
            root,
            variation: vec![root],
            number_of_nodes: 1,
            number_of_moves: 0,
            dirty: false,
        }
    }

    /// The root of the tree.
    #[must_use]
    pub fn root(&self) -> NodeId {
        self.root
    }

    /// The nodes of the current variation, root first.
    #[must_use]
    pub fn current_variation(&self) -> &[NodeId] {
        &self.variation
    }

    /// The last node of the current variation.
    #[must_use]
    pub fn leaf(&self) -> NodeId {
        *self.variation.last().expect("the variation always holds the root")
    }

    /// The total number of nodes in the tree.
    #[must_use]
    pub fn number_of_nodes(&self) -> usize {
        self.number_of_nodes
    }

    /// The total number of moves in the tree.
    #[must_use]
    pub fn number_of_moves(&self) -> usize {
        self.number_of_moves
    }

    /// Returns true when the tree changed since the flag was last cleared.
    #[must_use]
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Clears the dirty flag, typically after archiving.
    pub fn mark_clean(&mut self) {
        self.dirty = false;
    }

    /// Resolves a node handle, failing on a discarded one.
    pub fn node(&self, id: NodeId) -> Result<&Node, Error> {
        self.slab
            .get(id.0 as usize)
            .and_then(Option::as_ref)
            .ok_or_else(|| Error::InvalidArgument(format!("{id} is not in the tree")))
    }

    /// Resolves a node handle for mutation, failing on a discarded one.
    pub fn node_mut(&mut self, id: NodeId) -> Result<&mut Node, Error> {
        self.slab
            .get_mut(id.0 as usize)
            .and_then(Option::as_mut)
            .ok_or_else(|| Error::InvalidArgument(format!("{id} is not in the tree")))
    }

    /// Links `node` as a child of the current leaf and extends the variation to it.
    pub fn append_node(&mut self, mut node: Node) -> Result<NodeId, Error> {
        let leaf = self.leaf();
        node.parent = Some(leaf);
        node.next_sibling = self.node(leaf)?.first_child;
        node.first_child = None;
        let has_move = node.mov.is_some();

        let id = self.mint(node);
        self.node_mut(leaf)?.first_child = Some(id);
        self.variation.push(id);
        self.number_of_nodes += 1;
        if has_move {
            self.number_of_moves += 1;
        }
        self.dirty = true;
        Ok(id)
    }

    /// Links `node` as the first child of `parent`, displacing the previous first child to the
    /// next-sibling position. This is how a new variation branches off an inner node; the
    /// current variation is unchanged until a caller switches to the new branch.
    pub fn insert_child(&mut self, parent: NodeId, mut node: Node) -> Result<NodeId, Error> {
        node.parent = Some(parent);
        node.next_sibling = self.node(parent)?.first_child;
        node.first_child = None;
        let has_move = node.mov.is_some();

        let id = self.mint(node);
        self.node_mut(parent)?.first_child = Some(id);
        self.number_of_nodes += 1;
        if has_move {
            self.number_of_moves += 1;
        }
        self.dirty = true;
        Ok(id)
    }

    /// Discards the variation node at `index` together with its subtree.
    ///
    /// When the discarded node had a next sibling, that sibling and its first-child descendants
    /// become the continuation of the variation; otherwise the previous sibling does; otherwise
    /// the variation is truncated.
    pub fn discard_nodes_from_index(&mut self, index: usize) -> Result<(), Error> {
        if index < 1 || index >= self.variation.len() {
            return Err(Error::OutOfRange { index, len: self.variation.len() - 1 });
        }
        let discarded = self.variation[index];
        let parent = self.variation[index - 1];

        let next_sibling = self.node(discarded)?.next_sibling;
        let continuation = match next_sibling {
            Some(sibling) => Some(sibling),
            None => self.previous_sibling(parent, discarded)?,
        };

        // Unlink the subtree from its parent's child list.
        if self.node(parent)?.first_child == Some(discarded) {
            self.node_mut(parent)?.first_child = next_sibling;
        } else {
            let mut child = self.node(parent)?.first_child;
            while let Some(current) = child {
                if self.node(current)?.next_sibling == Some(discarded) {
                    self.node_mut(current)?.next_sibling = next_sibling;
                    break;
                }
                child = self.node(current)?.next_sibling;
            }
        }
        self.release_subtree(discarded)?;

        self.variation.truncate(index);
        if let Some(continuation) = continuation {
            self.extend_variation_from(continuation);
        }
        self.dirty = true;
        Ok(())
    }

    /// Discards the last node of the current variation.
    pub fn discard_leaf_node(&mut self) -> Result<(), Error> {
        self.discard_nodes_from_index(self.variation.len() - 1)
    }

    /// Discards every node but the root.
    pub fn discard_all_nodes(&mut self) -> Result<(), Error> {
        while let Some(child) = self.node(self.root)?.first_child {
            self.node_mut(self.root)?.first_child = self.node(child)?.next_sibling;
            self.release_subtree(child)?;
        }
        self.variation.truncate(1);
        self.dirty = true;
        Ok(())
    }

    /// Rebuilds the variation as root, …, `node`, then `node`'s first-child descendants.
    ///
    /// Fails when the root is not an ancestor of `node`.
    pub fn change_to_variation_containing(&mut self, id: NodeId) -> Result<(), Error> {
        let mut chain = vec![id];
        let mut current = id;
        while let Some(parent) = self.node(current)?.parent {
            chain.push(parent);
            current = parent;
        }
        if current != self.root {
            return Err(Error::InvalidArgument(format!(
                "{id} is not a descendant of the root"
            )));
        }
        chain.reverse();
        self.variation = chain;
        self.extend_variation_from_children_of(id);
        Ok(())
    }

    /// Walks parent links from `id` until a node of the current variation is found.
    pub fn ancestor_in_current_variation(&self, id: NodeId) -> Result<NodeId, Error> {
        let mut current = id;
        loop {
            if self.variation.contains(&current) {
                return Ok(current);
            }
            match self.node(current)?.parent {
                Some(parent) => current = parent,
                None => {
                    return Err(Error::InvalidArgument(format!(
                        "{id} belongs to a different game tree"
                    )));
                }
            }
        }
    }

    /// The position of `id` in the current variation, or `None` when it is not on it.
    #[must_use]
    pub fn index_of_node(&self, id: NodeId) -> Option<usize> {
        self.variation.iter().position(|&node| node == id)
    }

    /// The variation node at `index`.
    pub fn node_at_index(&self, index: usize) -> Result<NodeId, Error> {
        self.variation
            .get(index)
            .copied()
            .ok_or(Error::OutOfRange { index, len: self.variation.len() - 1 })
    }

    /// Starting at `id` and walking up, the nearest node holding a move.
    #[must_use]
    pub fn node_with_most_recent_move(&self, id: NodeId) -> Option<NodeId> {
        let mut current = Some(id);
        while let Some(node) = current {
            let Ok(node_ref) = self.node(node) else {
                return None;
            };
            if node_ref.mov.is_some() {
                return Some(node);
            }
            current = node_ref.parent;
        }
        None
    }

    /// Iterates over every live node of the tree.
    pub fn nodes(&self) -> impl Iterator<Item = (NodeId, &Node)> {
        self.slab.iter().enumerate().filter_map(|(index, slot)| {
            slot.as_ref()
                .map(|node| (NodeId(u32::try_from(index).expect("slab fits u32")), node))
        })
    }

    /// Rebuilds a model from archived parts. The variation is re-derived from `leaf`.
    pub(crate) fn restored(
        slab: Vec<Option<Node>>,
        root: NodeId,
        leaf: NodeId,
    ) -> Result<Self, Error> {
        let free = slab
            .iter()
            .enumerate()
            .filter_map(|(index, slot)| {
                slot.is_none()
                    .then(|| u32::try_from(index).expect("slab fits u32"))
            })
            .collect();
        let mut model = NodeModel {
            slab,
            free,
            root,
            variation: vec![root],
            number_of_nodes: 0,
            number_of_moves: 0,
            dirty: false,
        };
        model.number_of_nodes = model.nodes().count();
        model.number_of_moves = model.nodes().filter(|(_, node)| node.mov.is_some()).count();
        model.change_to_variation_containing(leaf)?;
        Ok(model)
    }

    fn extend_variation_from(&mut self, id: NodeId) {
        self.variation.push(id);
        self.extend_variation_from_children_of(id);
    }

    fn extend_variation_from_children_of(&mut self, id: NodeId) {
        let mut current = id;
        while let Some(child) = self.node(current).ok().and_then(|node| node.first_child) {
            self.variation.push(child);
            current = child;
        }
    }

    fn previous_sibling(&self, parent: NodeId, id: NodeId) -> Result<Option<NodeId>, Error> {
        let mut previous = None;
        let mut child = self.node(parent)?.first_child;
        while let Some(current) = child {
            if current == id {
                return Ok(previous);
            }
            previous = Some(current);
            child = self.node(current)?.next_sibling;
        }
        Ok(None)
    }

    fn release_subtree(&mut self, id: NodeId) -> Result<(), Error> {
        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            let mut child = self.node(current)?.first_child;
            while let Some(next) = child {
                stack.push(next);
                child = self.node(next)?.next_sibling;
            }
            let node = self.slab[current.0 as usize]
                .take()
                .expect("released node is live");
            self.free.push(current.0);
            self.number_of_nodes -= 1;
            if node.mov.is_some() {
                self.number_of_moves -= 1;
            }
        }
        Ok(())
    }

    fn mint(&mut self, node: Node) -> NodeId {
        if let Some(index) = self.free.pop() {
            self.slab[index as usize] = Some(node);
            NodeId(index)
        } else {
            self.slab.push(Some(node));
            NodeId(u32::try_from(self.slab.len() - 1).expect("slab fits u32"))
        }
    }
}

impl Default for NodeModel {
    fn default() -> Self {
        NodeModel::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::moves::Move;
    use crate::game::player::Player;
    use crate::game::vertex::Vertex;

    fn play(x: usize, y: usize, number: u32) -> Node {
        Node::with_move(Move::play(Player::Black, Vertex { x, y }, number))
    }

    #[test]
    fn append_extends_the_variation() {
        let mut model = NodeModel::new();
        let a = model.append_node(play(3, 3, 1)).unwrap();
        let b = model.append_node(play(4, 4, 2)).unwrap();
        assert_eq!(model.current_variation(), &[model.root(), a, b]);
        assert_eq!(model.number_of_nodes(), 3);
        assert_eq!(model.number_of_moves(), 2);
        assert!(model.is_dirty());
    }

    #[test]
    fn insert_child_branches_without_moving_the_variation() {
        let mut model = NodeModel::new();
        let a = model.append_node(play(3, 3, 1)).unwrap();
        let b = model.append_node(play(4, 4, 2)).unwrap();
        let d = model.insert_child(a, play(6, 6, 2)).unwrap();
        assert_eq!(model.node(a).unwrap().first_child(), Some(d));
        assert_eq!(model.node(d).unwrap().next_sibling(), Some(b));
        assert_eq!(model.current_variation(), &[model.root(), a, b]);

        model.change_to_variation_containing(d).unwrap();
        assert_eq!(model.current_variation(), &[model.root(), a, d]);
    }

    #[test]
    fn discard_switches_to_the_next_sibling() {
        let mut model = NodeModel::new();
        let a = model.append_node(play(3, 3, 1)).unwrap();
        let b = model.append_node(play(4, 4, 2)).unwrap();
        let d = model.insert_child(a, play(6, 6, 2)).unwrap();
        model.change_to_variation_containing(d).unwrap();

        // d's next sibling is b, so discarding d continues there.
        model.discard_nodes_from_index(2).unwrap();
        assert_eq!(model.current_variation(), &[model.root(), a, b]);
        assert_eq!(model.node(a).unwrap().first_child(), Some(b));
    }

    #[test]
    fn discard_falls_back_to_the_previous_sibling_then_truncates() {
        let mut model = NodeModel::new();
        let a = model.append_node(play(3, 3, 1)).unwrap();
        let b = model.append_node(play(4, 4, 2)).unwrap();
        let d = model.insert_child(a, play(6, 6, 2)).unwrap();

        // b has no next sibling; its previous sibling d continues the variation.
        model.discard_nodes_from_index(2).unwrap();
        assert_eq!(model.current_variation(), &[model.root(), a, d]);

        // d is now the only child; discarding it truncates the variation.
        model.discard_nodes_from_index(2).unwrap();
        assert_eq!(model.current_variation(), &[model.root(), a]);
        assert_eq!(model.number_of_nodes(), 2);
        assert_eq!(model.number_of_moves(), 1);
        let _ = b;
    }

    #[test]
    fn discard_rejects_bad_indices() {
        let mut model = NodeModel::new();
        model.append_node(play(3, 3, 1)).unwrap();
        assert!(matches!(
            model.discard_nodes_from_index(0),
            Err(Error::OutOfRange { .. })
        ));
        assert!(matches!(
            model.discard_nodes_from_index(2),
            Err(Error::OutOfRange { .. })
        ));
    }

    #[test]
    fn ancestor_in_current_variation_walks_up() {
        // root -> a -> b -> c plus the branch root -> a -> d.
        let mut model = NodeModel::new();
        let a = model.append_node(play(3, 3, 1)).unwrap();
        let b = model.append_node(play(4, 4, 2)).unwrap();
        let c = model.append_node(play(5, 5, 3)).unwrap();
        let d = model.insert_child(a, play(6, 6, 2)).unwrap();

        model.change_to_variation_containing(d).unwrap();
        assert_eq!(model.current_variation(), &[model.root(), a, d]);
        assert_eq!(model.index_of_node(c), None);
        assert_eq!(model.ancestor_in_current_variation(c).unwrap(), a);
        assert_eq!(model.ancestor_in_current_variation(b).unwrap(), a);
        assert_eq!(model.ancestor_in_current_variation(d).unwrap(), d);
    }

    #[test]
    fn node_with_most_recent_move_skips_non_move_nodes() {
        let mut model = NodeModel::new();
        let a = model.append_node(play(3, 3, 1)).unwrap();
        let annotation = model.append_node(Node::new()).unwrap();
        assert_eq!(model.node_with_most_recent_move(annotation), Some(a));
        assert_eq!(model.node_with_most_recent_move(model.root()), None);
    }

    #[test]
    fn discard_all_nodes_leaves_the_root() {
        let mut model = NodeModel::new();
        model.append_node(play(3, 3, 1)).unwrap();
        model.append_node(play(4, 4, 2)).unwrap();
        model.discard_all_nodes().unwrap();
        assert_eq!(model.current_variation(), &[model.root()]);
        assert_eq!(model.number_of_nodes(), 1);
        assert_eq!(model.number_of_moves(), 0);
    }
}
