use std::iter::FusedIterator;

use tracing::warn;

use crate::error::Error;
use crate::slab::{Ptr, UnsafeSlab};
use crate::stack::Stack;

use super::InnerNode;

/// Pre-order iterator (node, then left subtree, then right subtree)
///
/// Yields an error and then stops if the scratch stack cannot grow.
pub struct IterPreorder<'a, K, V> {
    nodes: &'a UnsafeSlab<InnerNode<K, V>>,
    /// Visited nodes whose right subtree is still unexplored
    to_visit: Stack<usize>,
    /// The next node on the left spine being walked down
    spine: Ptr,
    failed: bool,
}

impl<'a, K, V> IterPreorder<'a, K, V> {
    pub(super) fn new(nodes: &'a UnsafeSlab<InnerNode<K, V>>, root: Ptr, to_visit: Stack<usize>) -> Self {
        Self {
            nodes,
            to_visit,
            spine: root,
            failed: false,
        }
    }
}

impl<'a, K, V> Iterator for IterPreorder<'a, K, V> {
    type Item = Result<(&'a K, &'a V), Error>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }

        loop {
            // Nodes on the way down the left spine are pushed and visited immediately
            if let Some(index) = self.spine.into_index() {
                if let Err(err) = self.to_visit.push(index) {
                    warn!(%err, "pre-order traversal stopped");
                    self.failed = true;
                    return Some(Err(err));
                }

                // Safety: `spine` only ever holds the root or links read from live nodes
                let node = unsafe { self.nodes.get_unchecked(index) };
                self.spine = node.left;

                return Some(Ok((&node.key, &node.value)));
            }

            let index = self.to_visit.pop()?;
            // Safety: any indexes added to the stack are live in `self.nodes`
            self.spine = unsafe { self.nodes.get_unchecked(index) }.right;
        }
    }
}

impl<'a, K, V> FusedIterator for IterPreorder<'a, K, V> {}
