//! The public allocator type, tying together the free list, placement
//! engine, coalescer, realloc engine, and checker over a host-supplied
//! [`Arena`].

use crate::arena::{ARENA_FAIL, Arena};
use crate::block;
use crate::checker::{self, CheckReport};
use crate::coalesce;
use crate::error::AllocError;
use crate::free_list::FreeList;
use crate::placement;
use crate::realloc;
use crate::tag::{self, DWORD, WORD};

/// Tunable parameters for the placement and realloc engines
/// (`SPEC_FULL.md` §9's "ambient configuration").
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Config {
    /// Extra bytes added to every non-small request, to absorb future
    /// in-place `realloc` growth (§4.4). Defaults to 128 for parity with
    /// the source.
    pub realloc_slack: usize,
    /// Maximum number of free-list candidates probed by a single `alloc`
    /// before falling back to extending the arena (§4.4, §9). Defaults to
    /// 300 for parity with the source.
    pub probe_cap: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            realloc_slack: placement::DEFAULT_SLACK,
            probe_cap: placement::PROBE_CAP,
        }
    }
}

/// The explicit free-list allocator, generic over a host-supplied
/// [`Arena`].
///
/// Not [`Sync`] and not thread-safe by design (`SPEC_FULL.md` §5): a host
/// that needs concurrent access serializes calls externally, e.g. behind
/// its own lock (see the `global-allocator` feature for one such wrapper).
pub struct Allocator<A: Arena> {
    arena: A,
    free_list: FreeList,
    heap_bottom: usize,
    first_block: usize,
    config: Config,
    initialized: bool,
}

impl<A: Arena> Allocator<A> {
    /// Construct an allocator over `arena` with the default [`Config`].
    /// [`Allocator::init`] must be called once before any other operation.
    #[must_use]
    pub fn new(arena: A) -> Self {
        Self::with_config(arena, Config::default())
    }

    /// Construct an allocator over `arena` with an explicit [`Config`].
    #[must_use]
    pub fn with_config(arena: A, config: Config) -> Self {
        Self {
            arena,
            free_list: FreeList::new(0),
            heap_bottom: 0,
            first_block: 0,
            config,
            initialized: false,
        }
    }

    /// Initialize the arena: record the bottom, reserve the prologue and
    /// (initially coincident) epilogue sentinels, and set the first-block
    /// cursor (`SPEC_FULL.md` §4.7, §9).
    ///
    /// # Errors
    ///
    /// Returns [`AllocError::AlreadyInitialized`] if called more than once,
    /// or [`AllocError::ArenaExhausted`] if the arena cannot be extended by
    /// the three sentinel words.
    pub fn init(&mut self) -> Result<(), AllocError> {
        if self.initialized {
            return Err(AllocError::AlreadyInitialized);
        }
        let bottom = self.arena.bottom();
        let sentinel_bytes = 3 * WORD;
        let reserved = self.arena.extend(sentinel_bytes);
        if reserved == ARENA_FAIL {
            return Err(AllocError::ArenaExhausted {
                requested: sentinel_bytes,
            });
        }
        debug_assert_eq!(reserved, bottom, "arena bottom must not move under extend");

        unsafe {
            block::write_tag(bottom, tag::pack(0, true));
            block::write_tag(bottom + WORD, tag::pack(DWORD, true));
            block::write_tag(bottom + 2 * WORD, tag::pack(0, true));
        }

        self.heap_bottom = bottom;
        // Not `bottom + 2*WORD`: the word placed there at init is a
        // coalescing barrier for the first real block (permanently reads
        // as allocated), never a header itself. The first real block's
        // header lands one word further out, at `bottom + 3*WORD`, which
        // is exactly where `arena.top()` sits right now — keeping payload
        // addresses 8-aligned for an 8-aligned arena bottom (see
        // SPEC_FULL.md's padding/prologue resolution).
        self.first_block = bottom + 3 * WORD;
        self.free_list = FreeList::new(bottom);
        self.initialized = true;
        log::debug!("allocator: initialized, first_block={:#x}", self.first_block);
        Ok(())
    }

    /// Allocate `size` bytes, or `None` on invalid input or arena
    /// exhaustion.
    #[must_use]
    pub fn alloc(&mut self, size: usize) -> Option<usize> {
        self.try_alloc(size).ok()
    }

    /// Allocate `size` bytes, surfacing the typed failure reason.
    ///
    /// # Errors
    ///
    /// See [`AllocError`].
    pub fn try_alloc(&mut self, size: usize) -> Result<usize, AllocError> {
        debug_assert!(self.initialized, "alloc called before init");
        unsafe {
            placement::alloc(
                &mut self.free_list,
                &mut self.arena,
                size,
                self.config.realloc_slack,
                self.config.probe_cap,
            )
        }
    }

    /// Free a previously-allocated block. `None` is a no-op.
    ///
    /// # Safety
    ///
    /// `bp`, if present, must be a block pointer previously returned by
    /// this allocator's `alloc`/`realloc` and not already freed.
    pub unsafe fn free(&mut self, bp: Option<usize>) {
        debug_assert!(self.initialized, "free called before init");
        if let Some(bp) = bp {
            unsafe { coalesce::free(&mut self.free_list, bp) };
        }
    }

    /// Resize the allocation at `bp` to `size` bytes. See
    /// `SPEC_FULL.md` §4.6 for the full semantics.
    ///
    /// # Safety
    ///
    /// `bp`, if present, must be a block pointer previously returned by
    /// this allocator's `alloc`/`realloc` and not already freed.
    pub unsafe fn realloc(&mut self, bp: Option<usize>, size: usize) -> Option<usize> {
        debug_assert!(self.initialized, "realloc called before init");
        unsafe {
            realloc::realloc(
                &mut self.free_list,
                &mut self.arena,
                bp,
                size,
                self.config.realloc_slack,
                self.config.probe_cap,
            )
        }
        .unwrap_or(None)
    }

    /// Run the whole-arena consistency check (`SPEC_FULL.md` §4.8).
    ///
    /// # Safety
    ///
    /// Must only be called when no other operation is in progress (the
    /// allocator is not reentrant); safe to call between any two public
    /// calls.
    #[must_use]
    pub unsafe fn check(&self, verbose: bool) -> CheckReport {
        unsafe {
            checker::check(
                &self.free_list,
                self.heap_bottom,
                self.first_block,
                self.arena.top(),
                verbose,
            )
        }
    }

    /// The arena's current bottom address, or 0 before [`Allocator::init`].
    #[must_use]
    pub const fn heap_bottom(&self) -> usize {
        self.heap_bottom
    }

    /// The arena's current top address.
    #[must_use]
    pub fn heap_top(&self) -> usize {
        self.arena.top()
    }

    /// Number of blocks currently on the free list.
    #[must_use]
    pub fn free_list_len(&self) -> usize {
        unsafe { self.free_list.iter() }.count()
    }

    /// The current free-list head, if any.
    #[must_use]
    pub const fn free_list_head(&self) -> Option<usize> {
        self.free_list.head()
    }

    /// Whether `bp` currently appears on the free list.
    #[must_use]
    pub fn free_list_contains(&self, bp: usize) -> bool {
        unsafe { self.free_list.iter() }.any(|b| b == bp)
    }
}
