//! An unbalanced binary search tree whose every algorithm runs without recursion
//!
//! [`BSTMap`] stores unique keys with associated values. Search, insertion and removal walk the
//! tree in a loop, while the pre-order, in-order and post-order traversals and [`BSTMap::dispose`]
//! keep their pending nodes on an explicit [`Stack`]. The depth of the tree is therefore never
//! limited by the size of the call stack, only by the memory available to the scratch stack (or a
//! [`Config::stack_limit`] if one is set).
//!
//! ```
//! use iterative_bst::bstmap;
//!
//! let mut map = bstmap! {4 => 'd', 2 => 'b', 5 => 'e', 1 => 'a', 3 => 'c'};
//!
//! let mut keys = Vec::new();
//! map.postorder(|&key, _| keys.push(key))?;
//! assert_eq!(keys, [1, 3, 2, 5, 4]);
//!
//! map.remove(&2);
//! map.dispose()?;
//! assert!(map.is_empty());
//! # Ok::<(), iterative_bst::Error>(())
//! ```

#![allow(clippy::upper_case_acronyms)]

/// Creates a [`BSTMap`] containing the given entries, inserted in the order written
///
/// The order of insertion decides the shape of the tree.
#[macro_export(local_inner_macros)]
macro_rules! bstmap {
    // trailing comma case
    ($($key:expr => $value:expr,)+) => (bstmap!($($key => $value),+));

    ( $($key:expr => $value:expr),* ) => {
        {
            let mut _map = $crate::BSTMap::new();
            $(
                let _ = _map.insert($key, $value);
            )*
            _map
        }
    };
}

pub mod config;
pub mod error;
pub mod map;
pub mod stack;

mod slab;

pub use config::Config;
pub use error::Error;
pub use map::BSTMap;
pub use stack::Stack;
