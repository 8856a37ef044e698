mod node;
mod slot;
mod preorder;
mod inorder;
mod postorder;

pub use node::*;
pub use preorder::*;
pub use inorder::*;
pub use postorder::*;

use std::fmt;
use std::mem;
use std::cmp::Ordering;
use std::borrow::Borrow;
use std::iter::FromIterator;

use tracing::{debug, trace, warn};

use crate::config::Config;
use crate::error::Error;
use crate::slab::{Ptr, UnsafeSlab};
use crate::stack::Stack;

use slot::Slot;

#[derive(Debug)]
struct InnerNode<K, V> {
    key: K,
    value: V,
    left: Ptr,
    right: Ptr,
}

impl<K, V> InnerNode<K, V> {
    fn new(key: K, value: V) -> Self {
        Self {
            key,
            value,
            left: Ptr::null(),
            right: Ptr::null(),
        }
    }
}

/// An unbalanced binary search tree (BST) whose algorithms never recurse
///
/// BST properties: For each node with key `k`:
/// - The key of each node in the left subtree is less than `k`
/// - The key of each node in the right subtree is greater than `k`
///
/// Keys are unique. No rebalancing is ever done, so the shape of the tree depends only on the
/// order of insertions and removals. Operations take `O(height)` time, which is `O(n)` in the
/// worst case (e.g. keys inserted in sorted order).
///
/// Nodes live in an arena and refer to their children by index. Searching, inserting and removing
/// walk the tree in a loop. Traversals and `dispose` keep their pending nodes on an explicit
/// [`Stack`] instead of the call stack, so arbitrarily deep trees never overflow it.
pub struct BSTMap<K, V> {
    nodes: UnsafeSlab<InnerNode<K, V>>,
    root: Ptr,
    config: Config,
}

impl<K, V> Default for BSTMap<K, V> {
    fn default() -> Self {
        Self {
            nodes: UnsafeSlab::new(),
            root: Ptr::null(),
            config: Default::default(),
        }
    }
}

impl<K, V> fmt::Debug for BSTMap<K, V>
    where K: fmt::Debug,
          V: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Ignores the configured stack limit so that deep trees can still be printed
        let entries = IterInorder::new(&self.nodes, self.root, Stack::new())
            .map_while(Result::ok);

        f.debug_map().entries(entries).finish()
    }
}

impl<K: Ord, V> BSTMap<K, V> {
    /// Creates an empty `BSTMap`
    ///
    /// The map is initially created with a capacity of 0, so it will not allocate until it is
    /// first inserted into.
    ///
    /// # Examples
    ///
    /// ```
    /// use iterative_bst::BSTMap;
    /// let mut map: BSTMap<char, i32> = BSTMap::new();
    /// ```
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty map with room for at least `capacity` nodes
    ///
    /// # Examples
    ///
    /// ```
    /// use iterative_bst::BSTMap;
    /// let map: BSTMap<char, i32> = BSTMap::with_capacity(10);
    /// assert!(map.capacity() >= 10);
    /// ```
    pub fn with_capacity(capacity: usize) -> Self {
        Self::with_config(Config::new().with_capacity(capacity))
    }

    /// Creates an empty map using the given configuration
    pub fn with_config(config: Config) -> Self {
        Self {
            nodes: UnsafeSlab::with_capacity(config.capacity),
            root: Ptr::null(),
            config,
        }
    }

    /// Returns the configuration this map was created with
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Returns the number of entries in the map (i.e. the number of nodes in the tree)
    ///
    /// Time complexity: `O(1)`
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Returns true if the map contains no entries
    ///
    /// Time complexity: `O(1)`
    pub fn is_empty(&self) -> bool {
        debug_assert_eq!(self.nodes.is_empty(), self.root.is_null());
        self.nodes.is_empty()
    }

    /// Returns the number of nodes the map can hold without reallocating
    pub fn capacity(&self) -> usize {
        self.nodes.capacity()
    }

    /// Returns `true` if the map contains a value for the specified key
    ///
    /// The key may be any borrowed form of the map's key type, but the ordering on the borrowed
    /// form must match the ordering on the key type.
    ///
    /// Time complexity: `O(height)`
    pub fn contains_key<Q>(&self, key: &Q) -> bool
        where K: Borrow<Q>,
              Q: Ord + ?Sized,
    {
        self.get_entry(key).is_some()
    }

    /// Searches the tree for `key`, returning a reference to its value or `None` if the key is
    /// not present
    ///
    /// Never allocates or modifies the tree.
    ///
    /// Time complexity: `O(height)`
    ///
    /// # Examples
    ///
    /// ```
    /// use iterative_bst::BSTMap;
    ///
    /// let mut map = BSTMap::new();
    /// map.insert('k', 7);
    /// assert_eq!(map.get(&'k'), Some(&7));
    /// assert_eq!(map.get(&'z'), None);
    /// ```
    pub fn get<Q>(&self, key: &Q) -> Option<&V>
        where K: Borrow<Q>,
              Q: Ord + ?Sized,
    {
        self.get_entry(key).map(|(_, value)| value)
    }

    /// Returns a mutable reference to the value corresponding to the given key, or `None` if no
    /// such key exists in the tree
    ///
    /// Time complexity: `O(height)`
    pub fn get_mut<Q>(&mut self, key: &Q) -> Option<&mut V>
        where K: Borrow<Q>,
              Q: Ord + ?Sized,
    {
        let index = self.load(self.locate(key)).into_index()?;
        // Safety: `load` only returns links to live nodes
        let node = unsafe { self.nodes.get_unchecked_mut(index) };

        Some(&mut node.value)
    }

    /// Returns the key-value pair corresponding to the given key, or `None` if no such key exists
    /// in the tree
    ///
    /// Time complexity: `O(height)`
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

    /// Inserts a key-value pair into the tree
    ///
    /// If the key is already present, its value is overwritten in place and the previous value is
    /// returned. Otherwise a new leaf node is attached where the search for the key ended and
    /// `None` is returned.
    ///
    /// Aborts if the node cannot be allocated, like the std collections. See `try_insert`.
    ///
    /// Time complexity: `O(height)`
    ///
    /// # Examples
    ///
    /// ```
    /// use iterative_bst::BSTMap;
    ///
    /// let mut map = BSTMap::new();
    /// assert_eq!(map.insert(37, "a"), None);
    /// assert_eq!(map.insert(37, "b"), Some("a"));
    /// assert_eq!(map.get(&37), Some(&"b"));
    /// assert_eq!(map.len(), 1);
    /// ```
    pub fn insert(&mut self, key: K, value: V) -> Option<V> {
        let slot = self.locate(&key);
        if let Some(index) = self.load(slot).into_index() {
            return Some(self.replace_value(index, value));
        }

        let ptr = self.nodes.push(InnerNode::new(key, value));
        self.link(slot, ptr);
        None
    }

    /// Like `insert`, but reports allocation failure instead of aborting
    ///
    /// The node is allocated before any link is rewritten, so on error the tree is left exactly as
    /// it was and the key and value are dropped.
    ///
    /// # Examples
    ///
    /// ```
    /// use iterative_bst::BSTMap;
    ///
    /// let mut map = BSTMap::new();
    /// assert_eq!(map.try_insert(1, 'a')?, None);
    /// assert_eq!(map.try_insert(1, 'b')?, Some('a'));
    /// # Ok::<(), iterative_bst::Error>(())
    /// ```
    pub fn try_insert(&mut self, key: K, value: V) -> Result<Option<V>, Error> {
        let slot = self.locate(&key);
        if let Some(index) = self.load(slot).into_index() {
            return Ok(Some(self.replace_value(index, value)));
        }

        let ptr = self.nodes.try_push(InnerNode::new(key, value))?;
        self.link(slot, ptr);
        Ok(None)
    }

    /// Removes a key from the map, returning its value if the key was present
    ///
    /// Removing a key that is not present does nothing.
    ///
    /// Time complexity: `O(height)`
    ///
    /// # Examples
    ///
    /// ```
    /// use iterative_bst::BSTMap;
    ///
    /// let mut map = BSTMap::new();
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

    /// Removes a key from the map, returning the stored key and value if the key was present
    ///
    /// A node with two children is not unlinked. It takes over the entry of the rightmost
    /// (largest) node of its left subtree, and that node is removed instead.
    pub fn remove_entry<Q>(&mut self, key: &Q) -> Option<(K, V)>
        where K: Borrow<Q>,
              Q: Ord + ?Sized,
    {
        let slot = self.locate(key);
        let index = self.load(slot).into_index()?;

        // Safety: `load` only returns links to live nodes
        let node = unsafe { self.nodes.get_unchecked(index) };
        let (left, right) = (node.left, node.right);

        let entry = match (left.is_null(), right.is_null()) {
            (true, true) => {
                trace!(index, "removing leaf");
                self.store(slot, Ptr::null());
                self.release(index)
            },

            (true, false) => {
                trace!(index, "removing node with only a right subtree");
                self.store(slot, right);
                self.release(index)
            },

            (false, true) => {
                trace!(index, "removing node with only a left subtree");
                self.store(slot, left);
                self.release(index)
            },

            (false, false) => {
                trace!(index, "removing node with two subtrees");
                self.replace_by_rightmost(index, Slot::Left(index))
            },
        };

        Some(entry)
    }

    /// Releases every node, one at a time, leaving the map empty
    ///
    /// The walk keeps pending nodes on a stack: it pushes nodes while descending right, then pops
    /// and releases the top node and continues from that node's left child. Each node is released
    /// exactly once.
    ///
    /// An error means the stack could not grow (or hit the configured `stack_limit`). The map is
    /// still left empty in that case, with the nodes the walk did not reach released in bulk.
    ///
    /// # Examples
    ///
    /// ```
    /// use iterative_bst::BSTMap;
    ///
    /// let mut map: BSTMap<_, _> = (0..100).map(|i| (i, i * 2)).collect();
    /// map.dispose()?;
    /// assert!(map.is_empty());
    /// assert_eq!(map.get(&42), None);
    /// # Ok::<(), iterative_bst::Error>(())
    /// ```
    pub fn dispose(&mut self) -> Result<(), Error> {
        let root = mem::take(&mut self.root);
        let mut pending = self.stack();

        let result = self.release_subtree(root, &mut pending);
        match &result {
            Ok(released) => debug!(released, "disposed tree"),
            Err(err) => warn!(%err, remaining = self.nodes.len(), "dispose stack failed, releasing the rest in bulk"),
        }

        // Drops anything the walk did not reach (nothing, unless it failed) and resets the
        // free list
        self.nodes.clear();

        result.map(|_| ())
    }

    /// Clears the map, dropping every entry without walking the tree
    ///
    /// Note that this method has no effect on the allocated capacity of the map.
    pub fn clear(&mut self) {
        self.nodes.clear();
        self.root = Ptr::null();
    }

    /// Calls `visit` on every entry in pre-order: each node before the nodes in its subtrees
    ///
    /// # Examples
    ///
    /// ```
    /// use iterative_bst::bstmap;
    ///
    /// let map = bstmap! {2 => 'b', 1 => 'a', 3 => 'c'};
    ///
    /// let mut keys = Vec::new();
    /// map.preorder(|&key, _| keys.push(key))?;
    /// assert_eq!(keys, [2, 1, 3]);
    /// # Ok::<(), iterative_bst::Error>(())
    /// ```
    pub fn preorder<F>(&self, visit: F) -> Result<(), Error>
        where F: FnMut(&K, &V),
    {
        visit_all(self.iter_preorder(), visit)
    }

    /// Calls `visit` on every entry in in-order: in ascending order of keys
    pub fn inorder<F>(&self, visit: F) -> Result<(), Error>
        where F: FnMut(&K, &V),
    {
        visit_all(self.iter_inorder(), visit)
    }

    /// Calls `visit` on every entry in post-order: each node after the nodes in its subtrees
    pub fn postorder<F>(&self, visit: F) -> Result<(), Error>
        where F: FnMut(&K, &V),
    {
        visit_all(self.iter_postorder(), visit)
    }

    /// Performs a pre-order traversal of the tree
    pub fn iter_preorder(&self) -> IterPreorder<'_, K, V> {
        IterPreorder::new(&self.nodes, self.root, self.stack())
    }

    /// Performs an in-order traversal of the tree
    pub fn iter_inorder(&self) -> IterInorder<'_, K, V> {
        IterInorder::new(&self.nodes, self.root, self.stack())
    }

    /// Performs a post-order traversal of the tree
    pub fn iter_postorder(&self) -> IterPostorder<'_, K, V> {
        IterPostorder::new(&self.nodes, self.root, self.stack(), self.stack())
    }

    /// Returns the root node of the tree, or `None` if the tree is empty
    ///
    /// This is a low-level API for inspecting the shape of the tree. The root is whichever node
    /// the sequence of insertions and removals left there. For a guaranteed ordering, use the
    /// traversal methods.
    pub fn root(&self) -> Option<Node<'_, K, V>> {
        // Safety: `self.root` is either null or a live index into `self.nodes`
        self.root.into_index().map(|index| unsafe { Node::new(&self.nodes, index) })
    }

    /// Reserves capacity for at least `additional` more nodes
    ///
    /// # Panics
    ///
    /// Panics if the new allocation size overflows `usize`.
    pub fn reserve(&mut self, additional: usize) {
        self.nodes.reserve(additional)
    }

    /// Shrinks the capacity of the map as much as possible
    pub fn shrink_to_fit(&mut self) {
        self.nodes.shrink_to_fit()
    }

    /// Returns the slot that holds `key`, or the empty slot where `key` would be attached
    fn locate<Q>(&self, key: &Q) -> Slot
        where K: Borrow<Q>,
              Q: Ord + ?Sized,
    {
        let mut slot = Slot::Root;
        while let Some(index) = self.load(slot).into_index() {
            // Safety: `load` only returns links to live nodes
            let node = unsafe { self.nodes.get_unchecked(index) };
            slot = match key.cmp(node.key.borrow()) {
                Ordering::Less => Slot::Left(index),
                Ordering::Greater => Slot::Right(index),
                Ordering::Equal => break,
            };
        }

        slot
    }

    fn load(&self, slot: Slot) -> Ptr {
        // Safety: slots are only built from live parent indexes and are not kept across removals
        unsafe { slot.load(self.root, &self.nodes) }
    }

    fn store(&mut self, slot: Slot, ptr: Ptr) {
        // Safety: slots are only built from live parent indexes and are not kept across removals
        unsafe { slot.store(&mut self.root, &mut self.nodes, ptr) }
    }

    fn replace_value(&mut self, index: usize, value: V) -> V {
        trace!(index, "overwriting value");
        // Safety: `index` was just loaded from a slot, so it is live
        let node = unsafe { self.nodes.get_unchecked_mut(index) };
        mem::replace(&mut node.value, value)
    }

    /// Links a freshly allocated leaf into the empty `slot`
    fn link(&mut self, slot: Slot, leaf: Ptr) {
        debug_assert!(self.load(slot).is_null());
        trace!(?leaf, ?slot, "attaching leaf");
        self.store(slot, leaf);
    }

    /// Frees the storage of a node that has already been unlinked from the tree
    fn release(&mut self, index: usize) -> (K, V) {
        // Safety: `index` was live and its only link has just been overwritten, so it cannot be
        // reached or released again
        let node = unsafe { self.nodes.remove(index) };
        (node.key, node.value)
    }

    /// Moves the entry of the rightmost node of `subtree` into `target` and removes that node
    /// from the tree, returning the entry `target` held before
    ///
    /// The rightmost node has no right child, so its slot is handed its left subtree (which may be
    /// empty).
    ///
    /// # Panics
    ///
    /// Panics if `subtree` is empty.
    fn replace_by_rightmost(&mut self, target: usize, subtree: Slot) -> (K, V) {
        let mut slot = subtree;
        let mut index = match self.load(slot).into_index() {
            Some(index) => index,
            None => unreachable!("replace_by_rightmost called on an empty subtree"),
        };

        loop {
            // Safety: `index` was loaded from a slot, so it is live
            let right = unsafe { self.nodes.get_unchecked(index) }.right;
            match right.into_index() {
                Some(next) => {
                    slot = Slot::Right(index);
                    index = next;
                },
                None => break,
            }
        }

        // Safety: `index` is live and its only slot is overwritten right after
        let rightmost = unsafe { self.nodes.remove(index) };
        self.store(slot, rightmost.left);

        // Safety: the caller passes a live node that is not inside `subtree`
        let target = unsafe { self.nodes.get_unchecked_mut(target) };
        let key = mem::replace(&mut target.key, rightmost.key);
        let value = mem::replace(&mut target.value, rightmost.value);

        (key, value)
    }

    /// Releases `root` and every node below it, returning how many nodes were released
    fn release_subtree(&mut self, root: Ptr, pending: &mut Stack<usize>) -> Result<usize, Error> {
        let mut current = root;
        let mut released = 0;

        loop {
            while let Some(index) = current.into_index() {
                pending.push(index)?;
                // Safety: `current` is `root` or a link read from a node that has not been
                // released yet
                current = unsafe { self.nodes.get_unchecked(index) }.right;
            }

            let index = match pending.pop() {
                Some(index) => index,
                None => return Ok(released),
            };

            // Safety: each node is pushed exactly once and released right after it is popped.
            // Its right subtree has already been pushed; its left link is read from the removed
            // value below.
            let node = unsafe { self.nodes.remove(index) };
            current = node.left;
            released += 1;
        }
    }

    /// Returns a fresh scratch stack honouring the configured limit
    fn stack<T>(&self) -> Stack<T> {
        match self.config.stack_limit {
            Some(limit) => Stack::with_limit(limit),
            None => Stack::new(),
        }
    }
}

fn visit_all<'a, K: 'a, V: 'a, I, F>(entries: I, mut visit: F) -> Result<(), Error>
    where I: Iterator<Item = Result<(&'a K, &'a V), Error>>,
          F: FnMut(&K, &V),
{
    for entry in entries {
        let (key, value) = entry?;
        visit(key, value);
    }

    Ok(())
}

impl<K: Ord, V> Extend<(K, V)> for BSTMap<K, V> {
    fn extend<T: IntoIterator<Item = (K, V)>>(&mut self, iter: T) {
        for (key, value) in iter {
            self.insert(key, value);
        }
    }
}

impl<K: Ord, V> FromIterator<(K, V)> for BSTMap<K, V> {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        let mut map = Self::new();
        map.extend(iter);
        map
    }
}
