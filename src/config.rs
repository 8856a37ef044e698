/// Construction-time settings for a [`BSTMap`](crate::BSTMap)
///
/// # Examples
///
/// ```
/// use iterative_bst::{BSTMap, Config};
///
/// let config = Config::new()
///     .with_capacity(64)
///     .with_stack_limit(32);
///
/// let map: BSTMap<i32, i32> = BSTMap::with_config(config);
/// assert!(map.capacity() >= 64);
/// assert_eq!(map.config().stack_limit, Some(32));
/// ```
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Config {
    /// The number of nodes to reserve space for up front
    pub capacity: usize,
    /// The maximum number of entries any scratch stack may hold during a traversal or a call to
    /// `dispose`, or `None` for no limit
    ///
    /// A traversal needs at most one entry per level of the tree, so this also bounds the height
    /// of the trees that can be walked.
    pub stack_limit: Option<usize>,
}

impl Config {
    /// Returns the default configuration: no reserved capacity and unbounded stacks
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(self, capacity: usize) -> Self {
        Self {capacity, ..self}
    }

    pub fn with_stack_limit(self, limit: usize) -> Self {
        Self {stack_limit: Some(limit), ..self}
    }
}
