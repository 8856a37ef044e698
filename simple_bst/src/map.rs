use std::fmt;
use std::mem;
use std::cmp::Ordering;
use std::borrow::Borrow;
use std::iter::FromIterator;

mod node;
mod preorder;
mod inorder;
mod postorder;

pub use node::*;
pub use preorder::*;
pub use inorder::*;
pub use postorder::*;

use node::Link;

/// A "simple" BST that uses `Box` for internal storage, rather than arena allocating the nodes
///
/// Follows the same insertion and deletion rules as `iterative_bst::BSTMap`, so the same sequence
/// of operations produces trees of the same shape. Used to test the `iterative_bst` crate.
pub struct SimpleBSTMap<K, V> {
    root: Link<K, V>,
    len: usize,
}

impl<K, V> Default for SimpleBSTMap<K, V> {
    fn default() -> Self {
        Self {
            root: None,
            len: 0,
        }
    }
}

impl<K, V> Drop for SimpleBSTMap<K, V> {
    fn drop(&mut self) {
        // The default drop glue for `Box` recurses once per level of the tree
        self.dispose();
    }
}

impl<K: fmt::Debug, V: fmt::Debug> fmt::Debug for SimpleBSTMap<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter_inorder()).finish()
    }
}

impl<K: PartialEq, V: PartialEq> PartialEq for SimpleBSTMap<K, V> {
    fn eq(&self, other: &Self) -> bool {
        // We can't just compare the binary trees structurally, since they may be structured
        // differently while still having all the same elements (e.g. if insertion order is
        // different). Instead, we use in-order traversal since we know that that is guaranteed to
        // produce the elements in sorted order. If their sorted orders are equal, the maps are
        // equal.

        if self.len() != other.len() {
            return false;
        }

        self.iter_inorder().zip(other.iter_inorder()).all(|((k1, v1), (k2, v2))| {
            k1.eq(k2) && v1.eq(v2)
        })
    }
}

impl<K: Eq, V: Eq> Eq for SimpleBSTMap<K, V> {}

impl<K, V> SimpleBSTMap<K, V> {
    /// Creates an empty `SimpleBSTMap`
    ///
    /// # Examples
    ///
    /// ```
    /// use simple_bst::SimpleBSTMap;
    /// let mut map: SimpleBSTMap<&str, i32> = SimpleBSTMap::new();
    /// ```
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of entries in the map (i.e. the number of nodes in the binary search
    /// tree)
    ///
    /// Time complexity: `O(1)`
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns true if the map is empty
    ///
    /// Time complexity: `O(1)`
    pub fn is_empty(&self) -> bool {
        debug_assert!(self.len != 0 || self.root.is_none());
        self.len == 0
    }

    /// Frees every node one at a time, leaving the map empty
    ///
    /// Detaches the right spine onto a stack, then frees the top node and continues from its left
    /// subtree. Every node is childless by the time it is dropped.
    ///
    /// # Examples
    ///
    /// ```
    /// use simple_bst::SimpleBSTMap;
    ///
    /// let mut map: SimpleBSTMap<_, _> = (0..10_000).map(|i| (i, ())).collect();
    /// map.dispose();
    /// assert!(map.is_empty());
    /// ```
    pub fn dispose(&mut self) {
        let mut pending = Vec::new();
        let mut current = self.root.take();

        loop {
            while let Some(mut node) = current {
                current = node.right.take();
                pending.push(node);
            }

            match pending.pop() {
                Some(mut node) => current = node.left.take(),
                None => break,
            }
        }

        self.len = 0;
    }

    /// Clears the map, removing all elements
    pub fn clear(&mut self) {
        self.dispose();
    }

    /// Performs a pre-order traversal of the tree
    pub fn iter_preorder(&self) -> IterPreorder<'_, K, V> {
        IterPreorder::new(self.root())
    }

    /// Performs an in-order traversal of the tree
    pub fn iter_inorder(&self) -> IterInorder<'_, K, V> {
        IterInorder::new(self.root())
    }

    /// Performs a post-order traversal of the tree
    pub fn iter_postorder(&self) -> IterPostorder<'_, K, V> {
        IterPostorder::new(self.root())
    }

    /// Returns the root node of the tree, or `None` if the tree is empty
    ///
    /// This is a low-level API meant to be used for implementing traversals.
    ///
    /// # Examples
    ///
    /// ```
    /// use simple_bst::{SimpleBSTMap, map::Node};
    ///
    /// // Custom traversal through the values in the map
    /// fn find_value(node: Option<&Node<i32, u32>>, target: u32) -> Option<&Node<i32, u32>> {
    ///     let node = node?;
    ///     if *node.value() == target {
    ///         Some(node)
    ///     } else {
    ///         find_value(node.left(), target).or_else(|| find_value(node.right(), target))
    ///     }
    /// }
    ///
    /// let mut map = SimpleBSTMap::new();
    /// map.insert(2, 39382);
    /// map.insert(1, 500);
    ///
    /// assert_eq!(find_value(map.root(), 500).map(|node| *node.key()), Some(1));
    /// ```
    pub fn root(&self) -> Option<&Node<K, V>> {
        self.root.as_deref()
    }
}

impl<K: Ord, V> SimpleBSTMap<K, V> {
    /// Returns `true` if the map contains a value for the specified key.
    ///
    /// Time complexity: `O(height)`
    pub fn contains_key<Q>(&self, key: &Q) -> bool
        where K: Borrow<Q>,
              Q: Ord + ?Sized,
    {
        self.get_entry(key).is_some()
    }

    /// Returns a reference to the value corresponding to the given key, or `None` if no such key
    /// exists in the binary search tree
    ///
    /// Time complexity: `O(height)`
    ///
    /// # Examples
    ///
    /// ```
    /// use simple_bst::SimpleBSTMap;
    ///
    /// let mut map = SimpleBSTMap::new();
    /// map.insert(1, "a");
    /// assert_eq!(map.get(&1), Some(&"a"));
    /// assert_eq!(map.get(&2), None);
    /// ```
    pub fn get<Q>(&self, key: &Q) -> Option<&V>
        where K: Borrow<Q>,
              Q: Ord + ?Sized,
    {
        self.get_entry(key).map(|(_, value)| value)
    }

    /// Returns a mutable reference to the value corresponding to the given key, or `None` if no
    /// such key exists in the binary search tree
    pub fn get_mut<Q>(&mut self, key: &Q) -> Option<&mut V>
        where K: Borrow<Q>,
              Q: Ord + ?Sized,
    {
        let mut current = self.root.as_deref_mut();
        while let Some(node) = current {
            match key.cmp(node.key.borrow()) {
                Ordering::Less => current = node.left.as_deref_mut(),
                Ordering::Greater => current = node.right.as_deref_mut(),
                Ordering::Equal => return Some(&mut node.value),
            }
        }

        None
    }

    /// Returns a key-value pair corresponding to the given key, or `None` if no such key exists in
    /// the binary search tree
    pub fn get_entry<Q>(&self, key: &Q) -> Option<(&K, &V)>
        where K: Borrow<Q>,
              Q: Ord + ?Sized,
    {
        let mut current = self.root();
        while let Some(node) = current {
            match key.cmp(node.key().borrow()) {
                Ordering::Less => current = node.left(),
                Ordering::Greater => current = node.right(),
                Ordering::Equal => return Some((node.key(), node.value())),
            }
        }

        None
    }

    /// Inserts a new value into the binary search tree
    ///
    /// Returns the previous value if the key was already present in an
    /// existing node or `None` if a new node was inserted.
    ///
    /// # Examples
    ///
    /// ```
    /// use simple_bst::SimpleBSTMap;
    ///
    /// let mut map = SimpleBSTMap::new();
    /// assert_eq!(map.insert(37, "a"), None);
    /// assert_eq!(map.insert(37, "c"), Some("a"));
    /// assert_eq!(map.get(&37), Some(&"c"));
    /// ```
    pub fn insert(&mut self, key: K, value: V) -> Option<V> {
        let slot = locate(&mut self.root, &key);
        match slot {
            Some(node) => Some(mem::replace(&mut node.value, value)),

            None => {
                *slot = Some(Box::new(Node::new(key, value)));
                self.len += 1;
                None
            },
        }
    }

    /// Removes a key from the map, returning the value at the key if the key was previously in the
    /// map.
    ///
    /// # Examples
    ///
    /// ```
    /// use simple_bst::SimpleBSTMap;
    ///
    /// let mut map = SimpleBSTMap::new();
    /// map.insert(1, "a");
    /// assert_eq!(map.remove(&1), Some("a"));
    /// assert_eq!(map.remove(&1), None);
    /// ```
    pub fn remove<Q>(&mut self, key: &Q) -> Option<V>
        where K: Borrow<Q>,
              Q: Ord + ?Sized,
    {
        self.remove_entry(key).map(|(_, value)| value)
    }

    /// Removes a key from the map, returning the stored key and value if the key was previously in
    /// the map.
    ///
    /// A node with two subtrees is replaced by the rightmost node of its left subtree.
    pub fn remove_entry<Q>(&mut self, key: &Q) -> Option<(K, V)>
        where K: Borrow<Q>,
              Q: Ord + ?Sized,
    {
        let slot = locate(&mut self.root, key);
        let node = *slot.take()?;
        let Node {key, value, left, right} = node;

        *slot = match (left, right) {
            (None, None) => None,
            (None, Some(child)) | (Some(child), None) => Some(child),

            (Some(left), Some(right)) => {
                let mut left = Some(left);
                let mut rightmost = match take_rightmost(&mut left) {
                    Some(rightmost) => rightmost,
                    None => unreachable!("left subtree cannot be empty"),
                };

                rightmost.left = left;
                rightmost.right = Some(right);
                Some(rightmost)
            },
        };

        self.len -= 1;
        Some((key, value))
    }
}

/// Returns the link that holds `key`, or the empty link where `key` would be inserted
fn locate<'a, K, V, Q>(mut slot: &'a mut Link<K, V>, key: &Q) -> &'a mut Link<K, V>
    where K: Borrow<Q>,
          Q: Ord + ?Sized,
{
    loop {
        let ordering = match slot.as_deref() {
            Some(node) => key.cmp(node.key.borrow()),
            None => return slot,
        };

        slot = match (ordering, slot) {
            (Ordering::Less, Some(node)) => &mut node.left,
            (Ordering::Greater, Some(node)) => &mut node.right,
            (_, slot) => return slot,
        };
    }
}

/// Detaches the rightmost node of the subtree in `slot`, moving its left subtree up into its place
fn take_rightmost<K, V>(mut slot: &mut Link<K, V>) -> Option<Box<Node<K, V>>> {
    while slot.as_ref().map_or(false, |node| node.right.is_some()) {
        slot = &mut slot.as_mut()?.right;
    }

    let mut rightmost = slot.take()?;
    *slot = rightmost.left.take();
    Some(rightmost)
}

impl<K: Ord, V> Extend<(K, V)> for SimpleBSTMap<K, V> {
    fn extend<T: IntoIterator<Item = (K, V)>>(&mut self, iter: T) {
        for (key, value) in iter {
            self.insert(key, value);
        }
    }
}

impl<K: Ord, V> FromIterator<(K, V)> for SimpleBSTMap<K, V> {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        let mut map = Self::new();
        map.extend(iter);
        map
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::collections::HashMap;

    use rand::prelude::*;

    fn preorder_keys(map: &SimpleBSTMap<i32, i32>) -> Vec<i32> {
        map.iter_preorder().map(|(&k, _)| k).collect()
    }

    #[test]
    fn test_map_insert_get() {
        let mut map = SimpleBSTMap::new();

        assert_eq!(map.get(&3), None);
        assert_eq!(map.insert(3, 1), None);
        assert_eq!(map.get(&3), Some(&1));

        assert_eq!(map.get(&4), None);
        assert_eq!(map.insert(4, -2), None);
        assert_eq!(map.get(&3), Some(&1));
        assert_eq!(map.get(&4), Some(&-2));

        assert_eq!(map.get(&0), None);
        assert_eq!(map.insert(0, 44), None);
        assert_eq!(map.get(&3), Some(&1));
        assert_eq!(map.get(&4), Some(&-2));
        assert_eq!(map.get(&0), Some(&44));

        assert_eq!(map.insert(3, 933), Some(1));
        assert_eq!(map.get(&3), Some(&933));
        assert_eq!(map.len(), 3);
    }

    #[test]
    fn test_map_insert_get_borrow() {
        let mut map: SimpleBSTMap<String, _> = SimpleBSTMap::new();

        assert_eq!(map.insert("abc".to_string(), 1), None);
        assert_eq!(map.insert("COOL".to_string(), 3), None);
        assert_eq!(map.insert("".to_string(), 898989), None);
        assert_eq!(map.get("abc"), Some(&1));
        assert_eq!(map.get("COOL"), Some(&3));
        assert_eq!(map.get(""), Some(&898989));
        assert_eq!(map.remove(""), Some(898989));
        assert!(!map.contains_key(""));
    }

    #[test]
    fn traversals() {
        let mut map = SimpleBSTMap::new();
        // Create the following tree:
        //      4
        //   2     5
        // 1   3
        //
        // Inserting the tree one level at a time so it makes this shape:
        map.insert(4, 4);
        map.insert(5, 5);
        map.insert(2, 2);
        map.insert(3, 3);
        map.insert(1, 1);

        let values: Vec<_> = map.iter_preorder().map(|(k, _)| *k).collect();
        assert_eq!(&values, &[4, 2, 1, 3, 5]);

        let values: Vec<_> = map.iter_inorder().map(|(k, _)| *k).collect();
        assert_eq!(&values, &[1, 2, 3, 4, 5]);

        let values: Vec<_> = map.iter_postorder().map(|(k, _)| *k).collect();
        assert_eq!(&values, &[1, 3, 2, 5, 4]);
    }

    #[test]
    fn remove_cases() {
        let mut map: SimpleBSTMap<_, _> = [10, 5, 15, 2, 8, 7].iter().map(|&k| (k, k)).collect();

        // Two subtrees: 8 is the rightmost node on the left, and its child 7 takes its place
        assert_eq!(map.remove_entry(&10), Some((10, 10)));
        assert_eq!(preorder_keys(&map), [8, 5, 2, 7, 15]);

        // Leaf
        assert_eq!(map.remove(&2), Some(2));
        assert_eq!(preorder_keys(&map), [8, 5, 7, 15]);

        // Only a right subtree
        assert_eq!(map.remove(&5), Some(5));
        assert_eq!(preorder_keys(&map), [8, 7, 15]);

        // Missing
        assert_eq!(map.remove(&100), None);
        assert_eq!(map.len(), 3);

        assert_eq!(map.remove(&8), Some(8));
        assert_eq!(preorder_keys(&map), [7, 15]);
    }

    #[test]
    fn deep_tree_drop() {
        // Would overflow the call stack with recursive drop glue
        let mut map: SimpleBSTMap<_, _> = (0..10_000).map(|i| (i, i)).collect();
        assert_eq!(map.len(), 10_000);
        assert_eq!(map.iter_postorder().next(), Some((&9_999, &9_999)));

        map.clear();
        assert!(map.is_empty());
        assert_eq!(map.get(&7), None);

        let map: SimpleBSTMap<_, _> = (0..10_000).rev().map(|i| (i, i)).collect();
        drop(map);
    }

    #[test]
    fn debug_and_eq() {
        let first: SimpleBSTMap<_, _> = vec![(2, 'b'), (1, 'a')].into_iter().collect();
        let second: SimpleBSTMap<_, _> = vec![(1, 'a'), (2, 'b')].into_iter().collect();

        assert_eq!(format!("{:?}", first), "{1: 'a', 2: 'b'}");
        // Different shapes, same entries
        assert_eq!(first, second);
    }

    #[test]
    fn test_random_operations() {
        cfg_if::cfg_if! {
            if #[cfg(miri)] {
                const TEST_CASES: usize = 16;
                const OPERATIONS: usize = 24;

                (0..TEST_CASES).into_iter().for_each(|_| test_case());

            } else {
                use rayon::prelude::*;

                const TEST_CASES: usize = 1024;
                const OPERATIONS: usize = 128;

                (0..TEST_CASES).into_par_iter().for_each(|_| test_case());
            }
        }

        fn test_case() {
            let mut map = SimpleBSTMap::new();
            // Compare against a HashMap
            let mut expected = HashMap::new();
            // The list of keys that have been inserted
            let mut keys = Vec::new();

            let mut rng = rand::thread_rng();
            for _ in 0..rng.gen_range(OPERATIONS..=OPERATIONS*2) {
                assert_eq!(map.is_empty(), expected.is_empty());
                assert_eq!(map.len(), expected.len());

                match rng.gen_range(1..=100) {
                    // Check for a key that hasn't been inserted
                    1..=10 => {
                        // Not inserting any negative numbers
                        let key = -rng.gen_range(1..=64);
                        assert_eq!(map.get(&key), expected.get(&key));
                        assert_eq!(map.get_mut(&key), expected.get_mut(&key));
                    },

                    // Check for a key that has been inserted
                    11..=30 => {
                        let key = match keys.choose(&mut rng).copied() {
                            Some(key) => key,
                            None => continue,
                        };
                        assert_eq!(map.get(&key), expected.get(&key));
                        assert_eq!(map.get_mut(&key), expected.get_mut(&key));
                    },

                    // Remove a key
                    31..=50 => {
                        let key = match keys.choose(&mut rng).copied() {
                            Some(key) => key,
                            None => continue,
                        };

                        assert_eq!(map.remove(&key), expected.remove(&key));
                        assert_eq!(map.get(&key), None);
                    },

                    // Insert a key
                    51..=100 => {
                        // Only inserting positive values
                        let key = rng.gen_range(0..=64);
                        let value = rng.gen_range(100..=200);
                        keys.push(key);

                        assert_eq!(map.insert(key, value), expected.insert(key, value));
                        assert_eq!(map.get(&key), expected.get(&key));
                    },

                    _ => unreachable!(),
                }
            }

            let mut sorted: Vec<_> = expected.iter().map(|(&k, &v)| (k, v)).collect();
            sorted.sort_unstable();
            let inorder: Vec<_> = map.iter_inorder().map(|(&k, &v)| (k, v)).collect();
            assert_eq!(inorder, sorted);

            map.clear();
            expected.clear();

            assert_eq!(map.is_empty(), expected.is_empty());
            assert_eq!(map.len(), expected.len());

            for &key in &keys {
                assert_eq!(map.get(&key), expected.get(&key));
            }
        }
    }
}
