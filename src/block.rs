//! Boundary-tag address arithmetic.
//!
//! Every function here takes or produces a raw address (a `usize`, not a
//! pointer with a type the compiler can use to navigate fields) — neighbors
//! are located by arithmetic, not by following typed struct pointers, per
//! the source's own boundary-tag convention. Callers are responsible for the
//! addresses being valid within the arena; this module performs no bounds
//! checking of its own.

use crate::tag::{self, DWORD, WORD};

/// Read the tag word at `addr`.
///
/// # Safety
///
/// `addr` must be a valid, word-aligned address for a 4-byte read within the
/// arena.
#[inline]
#[must_use]
pub unsafe fn read_tag(addr: usize) -> usize {
    unsafe { (addr as *const u32).read_unaligned() as usize }
}

/// Write the tag word `value` at `addr`.
///
/// # Safety
///
/// `addr` must be a valid, word-aligned address for a 4-byte write within
/// the arena.
#[inline]
pub unsafe fn write_tag(addr: usize, value: usize) {
    unsafe {
        (addr as *mut u32).write_unaligned(value as u32);
    }
}

/// Address of the header word for the block with payload pointer `bp`.
#[inline]
#[must_use]
pub const fn header_addr(bp: usize) -> usize {
    bp - WORD
}

/// Address of the footer word for the block with payload pointer `bp` and
/// payload `size`.
#[inline]
#[must_use]
pub const fn footer_addr(bp: usize, size: usize) -> usize {
    bp + size
}

/// Payload pointer of the block immediately following the block at `bp` with
/// payload `size`.
#[inline]
#[must_use]
pub const fn next_bp(bp: usize, size: usize) -> usize {
    bp + size + 2 * WORD
}

/// Address of the header word of the block immediately following the block
/// at `bp` with payload `size` (one word past the footer).
#[inline]
#[must_use]
pub const fn next_header_addr(bp: usize, size: usize) -> usize {
    bp + size + WORD
}

/// Address of the footer word of the block immediately preceding `bp`.
#[inline]
#[must_use]
pub const fn prev_footer_addr(bp: usize) -> usize {
    bp - DWORD
}

/// Payload pointer of the block immediately preceding `bp`, given the
/// preceding block's payload `prev_size` (read from its footer).
#[inline]
#[must_use]
pub const fn prev_bp(bp: usize, prev_size: usize) -> usize {
    bp - prev_size - 2 * WORD
}

/// Write matching header and footer tags for the block at `bp`.
///
/// # Safety
///
/// `header_addr(bp)` and `footer_addr(bp, size)` must both be valid,
/// word-aligned addresses within the arena.
pub unsafe fn write_block(bp: usize, size: usize, alloc: bool) {
    let t = tag::pack(size, alloc);
    unsafe {
        write_tag(header_addr(bp), t);
        write_tag(footer_addr(bp, size), t);
    }
}

/// Read the `(size, alloc)` pair encoded in the header of the block at `bp`.
///
/// # Safety
///
/// `header_addr(bp)` must be a valid, word-aligned address within the arena.
#[must_use]
pub unsafe fn read_header(bp: usize) -> (usize, bool) {
    let t = unsafe { read_tag(header_addr(bp)) };
    (tag::size_of_tag(t), tag::is_alloc(t))
}
