use std::mem;
use std::iter::FusedIterator;

use tracing::warn;

use crate::error::Error;
use crate::slab::{Ptr, UnsafeSlab};
use crate::stack::Stack;

use super::InnerNode;

/// In-order iterator (left subtree, then node, then right subtree), i.e. sorted by key
///
/// Yields an error and then stops if the scratch stack cannot grow.
pub struct IterInorder<'a, K, V> {
    nodes: &'a UnsafeSlab<InnerNode<K, V>>,
    /// Nodes whose left subtree is being explored, waiting to be visited
    to_visit: Stack<usize>,
    /// Subtree whose left spine has not been pushed yet
    spine: Ptr,
    failed: bool,
}

impl<'a, K, V> IterInorder<'a, K, V> {
    pub(super) fn new(nodes: &'a UnsafeSlab<InnerNode<K, V>>, root: Ptr, to_visit: Stack<usize>) -> Self {
        Self {
            nodes,
            to_visit,
            spine: root,
            failed: false,
        }
    }

    /// Pushes the pending subtree's root and every node down its leftward spine
    fn push_leftmost(&mut self) -> Result<(), Error> {
        let mut current = mem::take(&mut self.spine);
        while let Some(index) = current.into_index() {
            self.to_visit.push(index)?;
            // Safety: `current` is the root or a link read from a live node
            current = unsafe { self.nodes.get_unchecked(index) }.left;
        }

        Ok(())
    }
}

impl<'a, K, V> Iterator for IterInorder<'a, K, V> {
    type Item = Result<(&'a K, &'a V), Error>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }

        if let Err(err) = self.push_leftmost() {
            warn!(%err, "in-order traversal stopped");
            self.failed = true;
            return Some(Err(err));
        }

        let index = self.to_visit.pop()?;
        // Safety: any indexes added to the stack are live in `self.nodes`
        let node = unsafe { self.nodes.get_unchecked(index) };
        self.spine = node.right;

        Some(Ok((&node.key, &node.value)))
    }
}

impl<'a, K, V> FusedIterator for IterInorder<'a, K, V> {}
