//! The placement engine: adjusted-size computation, bounded first-fit
//! search, split-and-place, and heap extension on a scan miss.

use crate::arena::{ARENA_FAIL, Arena};
use crate::block;
use crate::error::AllocError;
use crate::free_list::FreeList;
use crate::tag::{self, WORD};

/// Search depth cap for the first-fit scan (§9 of `SPEC_FULL.md`): a
/// deliberate bound on worst-case search time, not an unbounded scan.
pub const PROBE_CAP: usize = 300;

/// Default realloc-growth slack added to every non-small request.
pub const DEFAULT_SLACK: usize = 128;

/// Smallest request that is *not* rounded up to the 32-byte minimum.
const SMALL_REQUEST_CEILING: usize = 4 * tag::DWORD;

/// Compute the adjusted block size for a `size`-byte request.
///
/// `size == 0` is rejected by the caller before this is reached ([`alloc`]
/// handles it); this function assumes `size > 0`.
#[must_use]
pub fn adjusted_size(size: usize, slack: usize) -> usize {
    if size <= SMALL_REQUEST_CEILING {
        32
    } else {
        tag::align_up_8(size) + slack
    }
}

/// Allocate `size` bytes, consulting the free list first and extending the
/// arena on a miss.
///
/// # Safety
///
/// `free_list` must describe blocks that are genuinely free and inside
/// `arena`'s currently-valid range.
pub unsafe fn alloc(
    free_list: &mut FreeList,
    arena: &mut impl Arena,
    size: usize,
    slack: usize,
    probe_cap: usize,
) -> Result<usize, AllocError> {
    if size == 0 {
        return Err(AllocError::InvalidSize { size });
    }
    let asize = adjusted_size(size, slack);

    let mut candidate = free_list.head();
    let mut probes = 0usize;
    while let Some(bp) = candidate {
        if probes >= probe_cap {
            break;
        }
        probes += 1;
        let (s, _alloc) = unsafe { block::read_header(bp) };
        if s >= asize + SMALL_REQUEST_CEILING {
            log::trace!(
                "placement: split candidate bp={bp:#x} size={s} asize={asize} probes={probes}"
            );
            return Ok(unsafe { split_and_place(bp, s, asize) });
        } else if s >= asize {
            log::trace!(
                "placement: whole-consume bp={bp:#x} size={s} asize={asize} probes={probes}"
            );
            unsafe {
                free_list.remove(bp);
                block::write_block(bp, s, true);
            }
            return Ok(bp);
        }
        candidate = unsafe { free_list.next(bp) };
    }

    log::trace!("placement: scan miss after {probes} probes, extending by {asize} bytes");
    unsafe { extend_and_place(arena, asize) }
}

/// Carve `asize` bytes from the high end of a free candidate of size `s`,
/// leaving the low remnant in place (still free, same address).
///
/// # Safety
///
/// `bp` must be a free block of payload size `s`, with `s >= asize + 32`.
unsafe fn split_and_place(bp: usize, s: usize, asize: usize) -> usize {
    let remnant_size = s - asize - 2 * WORD;
    unsafe {
        block::write_block(bp, remnant_size, false);
        let tail_bp = block::next_bp(bp, remnant_size);
        block::write_block(tail_bp, asize, true);
        tail_bp
    }
}

/// Grow the arena by `asize + 2*word`, place a new allocated block of
/// `asize` payload bytes one word into the new region, and write a fresh
/// epilogue at the new top — absorbing the word that held the previous
/// epilogue as this block's header (see the safety note on [`Arena`] about
/// this write landing one word ahead of the just-reported top).
///
/// # Safety
///
/// The arena's current top must be exactly one word past the currently
/// live epilogue sentinel (the invariant [`crate::allocator::Allocator`]
/// maintains between calls).
unsafe fn extend_and_place(arena: &mut impl Arena, asize: usize) -> Result<usize, AllocError> {
    let requested = asize + 2 * WORD;
    let old_top = arena.extend(requested);
    if old_top == ARENA_FAIL {
        log::debug!("placement: arena extension by {requested} bytes failed");
        return Err(AllocError::ArenaExhausted { requested });
    }
    let bp = old_top + WORD;
    unsafe {
        block::write_block(bp, asize, true);
        let epilogue_addr = block::next_header_addr(bp, asize);
        block::write_tag(epilogue_addr, tag::pack(0, true));
    }
    log::debug!("placement: extended arena by {requested} bytes, new block bp={bp:#x}");
    Ok(bp)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn small_requests_round_up_to_minimum() {
        assert_eq!(adjusted_size(1, DEFAULT_SLACK), 32);
        assert_eq!(adjusted_size(24, DEFAULT_SLACK), 32);
        assert_eq!(adjusted_size(32, DEFAULT_SLACK), 32);
    }

    #[test]
    fn large_requests_align_and_add_slack() {
        assert_eq!(adjusted_size(33, DEFAULT_SLACK), 40 + DEFAULT_SLACK);
        assert_eq!(adjusted_size(200, DEFAULT_SLACK), 200 + DEFAULT_SLACK);
        assert_eq!(adjusted_size(201, DEFAULT_SLACK), 208 + DEFAULT_SLACK);
    }
}
