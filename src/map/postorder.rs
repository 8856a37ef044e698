use std::mem;
use std::iter::FusedIterator;

use tracing::warn;

use crate::error::Error;
use crate::slab::{Ptr, UnsafeSlab};
use crate::stack::Stack;

use super::InnerNode;

/// Post-order iterator (left subtree, then right subtree, then node)
///
/// Yields an error and then stops if either scratch stack cannot grow.
pub struct IterPostorder<'a, K, V> {
    nodes: &'a UnsafeSlab<InnerNode<K, V>>,
    /// Nodes that have not been visited yet
    to_visit: Stack<usize>,
    /// Parallel to `to_visit`: `true` while the node's right subtree has not been entered
    first_visit: Stack<bool>,
    /// Subtree whose left spine has not been pushed yet
    spine: Ptr,
    failed: bool,
}

impl<'a, K, V> IterPostorder<'a, K, V> {
    pub(super) fn new(
        nodes: &'a UnsafeSlab<InnerNode<K, V>>,
        root: Ptr,
        to_visit: Stack<usize>,
        first_visit: Stack<bool>,
    ) -> Self {
        Self {
            nodes,
            to_visit,
            first_visit,
            spine: root,
            failed: false,
        }
    }

    /// Pushes the pending subtree's leftward spine, flagging each node as seen for the first time
    fn push_leftmost(&mut self) -> Result<(), Error> {
        let mut current = mem::take(&mut self.spine);
        while let Some(index) = current.into_index() {
            self.to_visit.push(index)?;
            self.first_visit.push(true)?;
            // Safety: `current` is the root or a link read from a live node
            current = unsafe { self.nodes.get_unchecked(index) }.left;
        }

        Ok(())
    }
}

impl<'a, K, V> Iterator for IterPostorder<'a, K, V> {
    type Item = Result<(&'a K, &'a V), Error>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }

        loop {
            if let Err(err) = self.push_leftmost() {
                warn!(%err, "post-order traversal stopped");
                self.failed = true;
                return Some(Err(err));
            }

            let index = *self.to_visit.top()?;
            let first_visit = self.first_visit.top_mut()?;
            // Safety: any indexes added to the stack are live in `self.nodes`
            let node = unsafe { self.nodes.get_unchecked(index) };

            if *first_visit {
                // Left subtree is done. Leave the node in place and explore its right subtree.
                *first_visit = false;
                self.spine = node.right;
            } else {
                self.to_visit.pop();
                self.first_visit.pop();

                return Some(Ok((&node.key, &node.value)));
            }
        }
    }
}

impl<'a, K, V> FusedIterator for IterPostorder<'a, K, V> {}
