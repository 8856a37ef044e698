use crate::error::Error;

/// A LIFO stack used as scratch space by the iterative tree algorithms
///
/// The stack stands in for the call frames a recursive algorithm would use. It grows as needed
/// unless it was created with a limit. Growth never aborts the process: allocation failure and
/// exceeding the limit are both reported from `push`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Stack<T> {
    items: Vec<T>,
    limit: Option<usize>,
}

impl<T> Default for Stack<T> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            limit: None,
        }
    }
}

impl<T> Stack<T> {
    /// Creates an empty, unbounded stack
    ///
    /// The stack will not allocate until it is first pushed onto.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty stack that holds at most `limit` items
    ///
    /// # Examples
    ///
    /// ```
    /// use iterative_bst::{Error, Stack};
    ///
    /// let mut stack = Stack::with_limit(1);
    /// stack.push('a')?;
    /// assert!(matches!(stack.push('b'), Err(Error::StackOverflow {limit: 1})));
    /// assert_eq!(stack.pop(), Some('a'));
    /// # Ok::<(), Error>(())
    /// ```
    pub fn with_limit(limit: usize) -> Self {
        Self {
            items: Vec::new(),
            limit: Some(limit),
        }
    }

    /// Returns the maximum number of items this stack can hold, if it is bounded
    pub fn limit(&self) -> Option<usize> {
        self.limit
    }

    /// Returns the number of items on the stack
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Returns true if there are no items on the stack
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Pushes `item` onto the top of the stack
    ///
    /// On error the stack is left unchanged and `item` is dropped.
    pub fn push(&mut self, item: T) -> Result<(), Error> {
        if let Some(limit) = self.limit {
            if self.items.len() >= limit {
                return Err(Error::StackOverflow {limit});
            }
        }

        self.items.try_reserve(1)?;
        self.items.push(item);

        Ok(())
    }

    /// Removes the top item from the stack and returns it, or `None` if the stack is empty
    pub fn pop(&mut self) -> Option<T> {
        self.items.pop()
    }

    /// Returns the top item without removing it
    pub fn top(&self) -> Option<&T> {
        self.items.last()
    }

    /// Returns the top item mutably without removing it
    pub fn top_mut(&mut self) -> Option<&mut T> {
        self.items.last_mut()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn push_pop_lifo() {
        let mut stack = Stack::new();
        assert!(stack.is_empty());
        assert_eq!(stack.top(), None);
        assert_eq!(stack.pop(), None);

        stack.push(1).unwrap();
        stack.push(2).unwrap();
        stack.push(3).unwrap();

        assert_eq!(stack.len(), 3);
        assert_eq!(stack.top(), Some(&3));
        // Peeking does not remove
        assert_eq!(stack.len(), 3);

        assert_eq!(stack.pop(), Some(3));
        assert_eq!(stack.pop(), Some(2));

        stack.push(4).unwrap();
        assert_eq!(stack.pop(), Some(4));
        assert_eq!(stack.pop(), Some(1));
        assert_eq!(stack.pop(), None);
        assert!(stack.is_empty());
    }

    #[test]
    fn top_mut_flips_flag() {
        let mut flags = Stack::new();
        flags.push(true).unwrap();
        flags.push(true).unwrap();

        if let Some(flag) = flags.top_mut() {
            *flag = false;
        }

        assert_eq!(flags.pop(), Some(false));
        assert_eq!(flags.pop(), Some(true));
    }

    #[test]
    fn grows_without_limit() {
        let mut stack = Stack::new();
        assert_eq!(stack.limit(), None);

        for i in 0..10_000 {
            stack.push(i).unwrap();
        }
        assert_eq!(stack.len(), 10_000);
        assert_eq!(stack.top(), Some(&9_999));
    }

    #[test]
    fn overflow_is_reported() {
        let mut stack = Stack::with_limit(2);
        assert_eq!(stack.limit(), Some(2));

        stack.push("a").unwrap();
        stack.push("b").unwrap();
        match stack.push("c") {
            Err(Error::StackOverflow {limit}) => assert_eq!(limit, 2),
            other => panic!("expected overflow, got {:?}", other),
        }

        // The failed push did not disturb the contents
        assert_eq!(stack.len(), 2);
        assert_eq!(stack.top(), Some(&"b"));

        // Space frees up again after a pop
        assert_eq!(stack.pop(), Some("b"));
        stack.push("d").unwrap();
        assert_eq!(stack.top(), Some(&"d"));
    }

    #[test]
    fn zero_limit_rejects_everything() {
        let mut stack = Stack::with_limit(0);
        assert!(stack.push(()).is_err());
        assert!(stack.is_empty());
    }
}
