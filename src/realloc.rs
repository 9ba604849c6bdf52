//! The realloc engine: in-place forward-absorb growth, a shrink no-op, and
//! fallback alloc-copy-free.

use core::ptr;

use crate::arena::Arena;
use crate::block;
use crate::coalesce;
use crate::error::AllocError;
use crate::free_list::FreeList;
use crate::placement;
use crate::tag::WORD;

/// Resize the allocation at `bp` to `size` bytes, per the source's realloc
/// semantics (`SPEC_FULL.md` §4.6).
///
/// `bp == None` behaves as [`placement::alloc`]; `size == 0` frees `bp` and
/// returns `None`.
///
/// # Safety
///
/// `bp`, if present, must be a currently-allocated block pointer previously
/// returned by this allocator and not yet freed.
pub unsafe fn realloc(
    free_list: &mut FreeList,
    arena: &mut impl Arena,
    bp: Option<usize>,
    size: usize,
    slack: usize,
    probe_cap: usize,
) -> Result<Option<usize>, AllocError> {
    if size == 0 {
        if let Some(bp) = bp {
            unsafe { coalesce::free(free_list, bp) };
        }
        return Ok(None);
    }
    let Some(bp) = bp else {
        return unsafe { placement::alloc(free_list, arena, size, slack, probe_cap) }.map(Some);
    };

    let (current_size, _alloc) = unsafe { block::read_header(bp) };
    if size <= current_size {
        return Ok(Some(bp));
    }

    let need = crate::tag::align_up_8(size);
    let next_header = block::next_header_addr(bp, current_size);
    let next_tag = unsafe { block::read_tag(next_header) };
    let next_size = crate::tag::size_of_tag(next_tag);
    let next_alloc = crate::tag::is_alloc(next_tag);

    if !next_alloc && current_size + next_size + 2 * WORD >= need {
        let next_bp = block::next_bp(bp, current_size);
        let new_size = current_size + next_size + 2 * WORD;
        log::trace!("realloc: in-place absorb bp={bp:#x} new_size={new_size}");
        unsafe {
            free_list.remove(next_bp);
            block::write_block(bp, new_size, true);
        }
        return Ok(Some(bp));
    }

    log::trace!("realloc: fallback copy bp={bp:#x} size={size}");
    let new_bp = unsafe { placement::alloc(free_list, arena, size, slack, probe_cap)? };
    let copy_len = current_size.min(size);
    unsafe {
        ptr::copy_nonoverlapping(bp as *const u8, new_bp as *mut u8, copy_len);
        coalesce::free(free_list, bp);
    }
    Ok(Some(new_bp))
}
