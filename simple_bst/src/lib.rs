//! A reference binary search tree built from `Box`ed nodes
//!
//! Uses the same insertion and deletion rules as `iterative_bst`, but with the most direct
//! ownership-based representation. Serves as the baseline in tests and benchmarks.

#![allow(clippy::upper_case_acronyms)]

pub mod map;

pub use map::SimpleBSTMap;
