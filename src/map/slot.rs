use crate::slab::{Ptr, UnsafeSlab};

use super::InnerNode;

/// The place a link to a node is stored: the tree's root, or the left or right field of a parent
/// node (identified by its index)
///
/// Descending by slot rather than by node lets insertion and deletion rewrite whichever link
/// points at the current node without the nodes needing parent pointers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum Slot {
    Root,
    Left(usize),
    Right(usize),
}

impl Slot {
    /// Returns the link currently held by this slot
    ///
    /// # Safety
    ///
    /// For `Left` and `Right`, the parent index must be live in `nodes`.
    #[inline]
    pub(super) unsafe fn load<K, V>(self, root: Ptr, nodes: &UnsafeSlab<InnerNode<K, V>>) -> Ptr {
        match self {
            Slot::Root => root,
            Slot::Left(parent) => nodes.get_unchecked(parent).left,
            Slot::Right(parent) => nodes.get_unchecked(parent).right,
        }
    }

    /// Overwrites the link held by this slot
    ///
    /// # Safety
    ///
    /// For `Left` and `Right`, the parent index must be live in `nodes`. The new link must keep
    /// the BST property and must not leave any live node unreachable.
    #[inline]
    pub(super) unsafe fn store<K, V>(
        self,
        root: &mut Ptr,
        nodes: &mut UnsafeSlab<InnerNode<K, V>>,
        ptr: Ptr,
    ) {
        match self {
            Slot::Root => *root = ptr,
            Slot::Left(parent) => nodes.get_unchecked_mut(parent).left = ptr,
            Slot::Right(parent) => nodes.get_unchecked_mut(parent).right = ptr,
        }
    }
}
