//! The four-case boundary-tag coalescer.
//!
//! Called unconditionally from [`free`] (see `SPEC_FULL.md` §9's resolution
//! of the source's cold-free-list footgun): case 1 below is simply an
//! insert, so there is no special-casing of an empty free list.

use crate::block;
use crate::free_list::FreeList;
use crate::tag::WORD;

/// Mark the block at `bp` free and coalesce it with its neighbors.
///
/// `bp == 0` is treated by the caller as "no-op" before this is reached;
/// this function assumes a genuine, currently-allocated block pointer.
///
/// # Safety
///
/// `bp` must be a currently-allocated block pointer previously returned by
/// the placement engine, and not already freed.
pub unsafe fn free(free_list: &mut FreeList, bp: usize) {
    let (size, _alloc) = unsafe { block::read_header(bp) };
    unsafe {
        block::write_block(bp, size, false);
    }
    unsafe { coalesce(free_list, bp, size) };
}

/// Merge the newly-freed block `bp` (payload `size`) with whichever of its
/// immediate neighbors are also free.
///
/// # Safety
///
/// `bp` must currently hold a free block's header/footer of `size`, not yet
/// inserted into `free_list`. Its neighbors (including the prologue and
/// epilogue sentinels at the arena's ends) must carry valid tags.
unsafe fn coalesce(free_list: &mut FreeList, bp: usize, size: usize) {
    let prev_tag = unsafe { block::read_tag(block::prev_footer_addr(bp)) };
    let (prev_size, prev_alloc) = (
        crate::tag::size_of_tag(prev_tag),
        crate::tag::is_alloc(prev_tag),
    );
    let next_tag = unsafe { block::read_tag(block::next_header_addr(bp, size)) };
    let (next_size, next_alloc) = (
        crate::tag::size_of_tag(next_tag),
        crate::tag::is_alloc(next_tag),
    );

    match (prev_alloc, next_alloc) {
        (true, true) => {
            log::trace!("coalesce: case 1 (both allocated) bp={bp:#x}");
            unsafe { free_list.insert(bp) };
        }
        (false, true) => {
            log::trace!("coalesce: case 2 (prev free) bp={bp:#x}");
            let prev_bp = block::prev_bp(bp, prev_size);
            let new_size = prev_size + size + 2 * WORD;
            unsafe {
                block::write_block(prev_bp, new_size, false);
            }
        }
        (true, false) => {
            log::trace!("coalesce: case 3 (next free) bp={bp:#x}");
            let next_bp = block::next_bp(bp, size);
            let new_size = size + next_size + 2 * WORD;
            unsafe {
                free_list.remove(next_bp);
                block::write_block(bp, new_size, false);
                free_list.insert(bp);
            }
        }
        (false, false) => {
            log::trace!("coalesce: case 4 (both free) bp={bp:#x}");
            let prev_bp = block::prev_bp(bp, prev_size);
            let next_bp = block::next_bp(bp, size);
            let new_size = prev_size + size + next_size + 4 * WORD;
            unsafe {
                free_list.remove(next_bp);
                block::write_block(prev_bp, new_size, false);
            }
        }
    }
}
