//! The arena host contract.
//!
//! The allocator core never touches a concrete memory source directly; it is
//! generic over this trait, the same way this codebase's frame and
//! page-table abstractions (`FrameAlloc`, `PhysMapper`) decouple policy from
//! the concrete hardware or test double underneath. An arena is a single,
//! contiguous, grow-only byte region: it never shrinks, and address validity
//! is monotonic — once a byte is mapped in `[bottom, top)`, it stays mapped.

/// Sentinel returned by [`Arena::extend`] on exhaustion.
pub const ARENA_FAIL: usize = usize::MAX;

/// A grow-only byte region the allocator core manages metadata inside of.
///
/// # Safety
///
/// Implementors must guarantee that every byte in `[bottom(), top())` is
/// valid to read and write for the lifetime of the arena, and that an
/// address returned by `extend` remains valid (i.e. the region is never
/// unmapped, moved, or reused) until the arena itself is dropped. The
/// allocator relies on this to cast addresses to raw pointers and
/// dereference them directly.
///
/// `bottom()` must be 8-byte aligned; the placement engine derives every
/// payload address from it by offsets that are themselves multiples of 8,
/// so an unaligned bottom would misalign every block in the arena.
///
/// The placement engine's epilogue-absorb technique (see
/// `placement::extend_and_place`) writes one word at exactly the address
/// `extend` most recently reported as the new top — one word past the
/// region that call formally reserved. Implementors must therefore back the
/// arena with at least one extra word of physical storage beyond the
/// largest value `top()` will ever report, or that write goes out of
/// bounds. Both arenas in this crate (`global::StaticArena` and the test
/// mock arena) allocate `capacity + word` physical bytes up front for
/// exactly this reason, even though `top()` never itself exceeds
/// `capacity`.
pub unsafe trait Arena {
    /// The lowest valid byte address in the arena.
    fn bottom(&self) -> usize;

    /// One past the highest valid byte address in the arena.
    fn top(&self) -> usize;

    /// Grow the arena by `n` bytes, returning the address of the start of
    /// the newly added region (the old [`Arena::top`]), or [`ARENA_FAIL`] if
    /// the arena cannot grow by that amount.
    fn extend(&mut self, n: usize) -> usize;
}
