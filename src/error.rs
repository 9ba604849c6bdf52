//! Typed error surface for the allocator core.
//!
//! The public `alloc`/`free`/`realloc` entry points keep the source's
//! sentinel-returning shape (null on failure) for call-site parity, but
//! internally every failure is one of these variants, and the `try_*`
//! counterparts expose them directly.

/// Failure modes reachable from the allocator's fast path.
#[derive(Debug, thiserror::Error, PartialEq, Eq, Clone, Copy)]
pub enum AllocError {
    /// The arena could not be extended to satisfy a request.
    #[error("arena exhausted: could not extend by {requested} bytes")]
    ArenaExhausted {
        /// Number of bytes the failed extension attempted to add.
        requested: usize,
    },
    /// `alloc`/`realloc` was called with a size of zero (or, for `realloc`,
    /// with an otherwise-invalid combination of inputs).
    #[error("invalid size: {size}")]
    InvalidSize {
        /// The rejected size argument.
        size: usize,
    },
    /// `init` was called more than once on the same [`crate::Allocator`].
    #[error("allocator already initialized")]
    AlreadyInitialized,
}
