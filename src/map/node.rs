use std::fmt;

use crate::slab::UnsafeSlab;

use super::InnerNode;

/// A read-only view of a single node of the binary search tree
pub struct Node<'a, K, V> {
    nodes: &'a UnsafeSlab<InnerNode<K, V>>,
    node: &'a InnerNode<K, V>,
}

impl<'a, K, V> fmt::Debug for Node<'a, K, V>
    where K: fmt::Debug,
          V: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Only the child keys, so formatting a node never walks a whole subtree
        f.debug_struct("Node")
            .field("key", self.key())
            .field("value", self.value())
            .field("left", &self.left().map(|node| node.key()))
            .field("right", &self.right().map(|node| node.key()))
            .finish()
    }
}

impl<'a, K, V> Clone for Node<'a, K, V> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<'a, K, V> Copy for Node<'a, K, V> {}

impl<'a, K, V> Node<'a, K, V> {
    /// Creates a new `Node`
    ///
    /// # Safety
    ///
    /// `index` must be a live index in `nodes`.
    pub(super) unsafe fn new(nodes: &'a UnsafeSlab<InnerNode<K, V>>, index: usize) -> Self {
        let node = nodes.get_unchecked(index);

        Self {nodes, node}
    }

    /// Returns the key of this node
    pub fn key(&self) -> &'a K {
        &self.node.key
    }

    /// Returns the value of this node
    pub fn value(&self) -> &'a V {
        &self.node.value
    }

    /// Returns true if this node has a left subtree
    pub fn has_left(&self) -> bool {
        !self.node.left.is_null()
    }

    /// Returns true if this node has a right subtree
    pub fn has_right(&self) -> bool {
        !self.node.right.is_null()
    }

    /// Returns the left child node (subtree) of this node, if any
    pub fn left(&self) -> Option<Self> {
        // Safety: Links stored in a live node always point at other live nodes
        self.node.left.into_index().map(|index| unsafe { Self::new(self.nodes, index) })
    }

    /// Returns the right child node (subtree) of this node, if any
    pub fn right(&self) -> Option<Self> {
        // Safety: Links stored in a live node always point at other live nodes
        self.node.right.into_index().map(|index| unsafe { Self::new(self.nodes, index) })
    }
}
