use std::collections::TryReserveError;

/// Errors surfaced by tree operations that need to allocate scratch or node storage
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// A bounded stack was already holding `limit` entries when another push was attempted
    #[error("stack limit of {limit} entries exceeded")]
    StackOverflow {
        limit: usize,
    },

    /// The allocator could not provide the requested memory
    #[error("failed to allocate storage")]
    Alloc(#[from] TryReserveError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_messages() {
        let err = Error::StackOverflow {limit: 3};
        assert_eq!(err.to_string(), "stack limit of 3 entries exceeded");

        // Requesting more than isize::MAX bytes always fails without touching the allocator
        let reserve_err = Vec::<u64>::new().try_reserve(usize::MAX).unwrap_err();
        let err = Error::from(reserve_err);
        assert!(matches!(err, Error::Alloc(_)));
        assert_eq!(err.to_string(), "failed to allocate storage");
    }
}
