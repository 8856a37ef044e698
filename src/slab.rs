use std::mem::{self, ManuallyDrop};
use std::marker::PhantomData;
use std::collections::TryReserveError;

#[cfg(test)]
use static_assertions::{const_assert, const_assert_eq};

/// A link to a node in the slab, or "null" for an absent child
///
/// This type is essentially `Option<usize>`. The value usize::MAX is reserved to represent the
/// absent link.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(transparent)]
pub struct Ptr(usize);

// Every node stores two links, so keep them the size of a bare index
#[cfg(test)]
const_assert_eq!(mem::size_of::<Ptr>(), mem::size_of::<usize>());
#[cfg(test)]
const_assert!(mem::size_of::<Option<usize>>() > mem::size_of::<Ptr>());

impl Default for Ptr {
    #[inline(always)]
    fn default() -> Self {
        Self::null()
    }
}

impl Ptr {
    /// Creates a link to the entry at `index`
    ///
    /// # Safety
    ///
    /// `index` must not be `usize::MAX`. Indexes of slab entries never are.
    #[inline(always)]
    pub unsafe fn new_unchecked(index: usize) -> Self {
        debug_assert_ne!(index, usize::MAX);
        Ptr(index)
    }

    #[inline(always)]
    pub fn null() -> Self {
        Ptr(usize::MAX)
    }

    // Kept `#[inline]` so the intermediate `Option` folds away into a single comparison against
    // usize::MAX
    #[inline(always)]
    pub fn into_index(self) -> Option<usize> {
        let Ptr(index) = self;
        if index == usize::MAX {
            None
        } else {
            Some(index)
        }
    }

    #[inline(always)]
    pub fn is_null(self) -> bool {
        self.0 == usize::MAX
    }
}

#[repr(C)]
union Entry<T> {
    value: ManuallyDrop<T>,
    free: FreeEntry,
}

// Entries are dropped by hand in `remove` and `clear`, never by `Vec`
#[cfg(test)]
const_assert!(!mem::needs_drop::<Entry<String>>());
#[cfg(test)]
const_assert_eq!(mem::size_of::<Entry<()>>(), 8);

/// An item in the free list
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct FreeEntry {
    /// The next released entry, or `Ptr::null()` at the end of the list
    next: Ptr,
}

/// Node storage for the tree
///
/// Pushing a value allocates a node and returns a link to it; removing the link's index releases
/// the node and hands its value back. Indexes of other entries never move, so they can be stored as links
/// inside other nodes. Released entries are threaded onto a free list and reused by later pushes.
///
/// The slab is unsafe because entries carry no tag saying whether they are occupied. Reading or
/// removing an index that was already removed is undefined behaviour, so callers must only use
/// indexes they know to be live (in the tree, the ones reachable from the root).
pub struct UnsafeSlab<T> {
    items: Vec<Entry<T>>,
    /// Head of the free list, a stack of released entries stored inside `items`
    free_list_head: Ptr,
    /// The length of the free list
    free_len: usize,
    // Tells the drop checker that we logically own `T` values despite storing `ManuallyDrop<T>`
    _marker: PhantomData<T>,
}

impl<T> Default for UnsafeSlab<T> {
    fn default() -> Self {
        Self {
            items: Vec::default(),
            free_list_head: Ptr::null(),
            free_len: 0,
            _marker: PhantomData,
        }
    }
}

impl<T> UnsafeSlab<T> {
    /// Creates an empty slab that will not allocate until it is first pushed onto
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty slab with room for at least `capacity` values
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            items: Vec::with_capacity(capacity),
            free_list_head: Ptr::null(),
            free_len: 0,
            _marker: PhantomData,
        }
    }

    /// Returns the number of live values (pushes minus removes since the last `clear`)
    pub fn len(&self) -> usize {
        self.items.len() - self.free_len
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn capacity(&self) -> usize {
        self.items.capacity()
    }

    /// Returns a reference to a live value
    ///
    /// # Safety
    ///
    /// `index` must come from a `Ptr` returned by `push` or `try_push`, and not be removed since.
    pub unsafe fn get_unchecked(&self, index: usize) -> &T {
        &self.items.get_unchecked(index).value
    }

    /// Returns a mutable reference to a live value
    ///
    /// # Safety
    ///
    /// `index` must come from a `Ptr` returned by `push` or `try_push`, and not be removed since.
    pub unsafe fn get_unchecked_mut(&mut self, index: usize) -> &mut T {
        &mut self.items.get_unchecked_mut(index).value
    }

    /// Stores `value` and returns a link to it
    ///
    /// Released entries are reused before the slab grows. Growing aborts on allocation failure
    /// like `Vec::push`.
    pub fn push(&mut self, value: T) -> Ptr {
        match self.reuse_released(value) {
            Ok(ptr) => ptr,
            Err(value) => {
                self.items.push(Entry {value: ManuallyDrop::new(value)});
                self.last_ptr()
            },
        }
    }

    /// Like `push`, but reports allocation failure instead of aborting
    ///
    /// On error nothing is stored and `value` is dropped.
    pub fn try_push(&mut self, value: T) -> Result<Ptr, TryReserveError> {
        match self.reuse_released(value) {
            Ok(ptr) => Ok(ptr),
            Err(value) => {
                self.items.try_reserve(1)?;
                self.items.push(Entry {value: ManuallyDrop::new(value)});
                Ok(self.last_ptr())
            },
        }
    }

    /// Moves `value` into the most recently released entry, or hands it back if there is none
    fn reuse_released(&mut self, value: T) -> Result<Ptr, T> {
        let head = self.free_list_head;
        let index = match head.into_index() {
            Some(index) => index,
            None => return Err(value),
        };

        // Safety: the free list only holds indexes below `items.len()`
        let entry = unsafe { self.items.get_unchecked_mut(index) };
        // Safety: entries on the free list hold a `FreeEntry`
        self.free_list_head = unsafe { entry.free }.next;
        self.free_len -= 1;
        *entry = Entry {value: ManuallyDrop::new(value)};

        Ok(head)
    }

    #[inline(always)]
    fn last_ptr(&self) -> Ptr {
        // Safety: a `Vec` of non-zero-sized entries never reaches usize::MAX elements, so the last
        // index is never the null value
        unsafe { Ptr::new_unchecked(self.items.len() - 1) }
    }

    /// Releases the entry at `index` and returns its value
    ///
    /// Releasing the last live entry empties the slab outright, so a tree that is emptied one
    /// removal at a time starts over from index 0 with an empty free list. Capacity is unchanged.
    ///
    /// # Safety
    ///
    /// `index` must come from a `Ptr` returned by `push` or `try_push`, and not be removed since.
    pub unsafe fn remove(&mut self, index: usize) -> T {
        let released = Entry {free: FreeEntry {next: self.free_list_head}};
        let entry = mem::replace(self.items.get_unchecked_mut(index), released);
        let value = ManuallyDrop::into_inner(entry.value);

        if self.len() == 1 {
            self.forget_all();
        } else {
            self.free_list_head = Ptr::new_unchecked(index);
            self.free_len += 1;
        }

        value
    }

    /// Drops every live value and forgets all indexes. Capacity is unchanged.
    pub fn clear(&mut self) {
        if mem::needs_drop::<T>() && !self.is_empty() {
            // Mark the released entries first, since their contents are not values
            let mut live = vec![true; self.items.len()];
            let mut current = self.free_list_head;
            while let Some(index) = current.into_index() {
                live[index] = false;
                // Safety: entries on the free list hold a `FreeEntry`
                current = unsafe { self.items[index].free }.next;
            }

            for (entry, live) in self.items.iter_mut().zip(live) {
                if live {
                    // Safety: the entry holds a value, and `forget_all` below makes sure it is
                    // never read or dropped again
                    unsafe { ManuallyDrop::drop(&mut entry.value); }
                }
            }
        }

        self.forget_all();
    }

    /// Marks every entry as unused without dropping anything
    fn forget_all(&mut self) {
        // `Entry` has no drop glue, so this only resets the length
        self.items.clear();
        self.free_list_head = Ptr::null();
        self.free_len = 0;
    }

    pub fn reserve(&mut self, additional: usize) {
        self.items.reserve(additional)
    }

    pub fn shrink_to_fit(&mut self) {
        self.items.shrink_to_fit()
    }
}

impl<T> Drop for UnsafeSlab<T> {
    fn drop(&mut self) {
        if mem::needs_drop::<T>() {
            self.clear();
        }
    }
}
