//! The whole-arena consistency self-check (`SPEC_FULL.md` §4.8).
//!
//! Read-only: walks every block from the first real block to the epilogue,
//! checking the per-block and global invariants of §3/§8, plus free-list
//! membership. Mirrors the source's `checkheap`/`checkblock`/`printblock`
//! trio (`is_free`, `not_coalesced`, `in_free_list`, `overlap`, `valid`) —
//! a violation is recorded and the walk continues; nothing here panics or
//! aborts.

use crate::block;
use crate::free_list::FreeList;
use crate::tag::{self, DWORD, WORD};

/// Maximum number of violations a single [`check`] call records. Diagnostic
/// tooling, not a correctness boundary: the walk itself always completes,
/// this only caps how many findings are retained.
pub const MAX_VIOLATIONS: usize = 32;

/// A single violated invariant, naming the block (by its payload address)
/// where it was observed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Violation {
    /// Header and footer tags disagree.
    HeaderFooterMismatch { bp: usize },
    /// Payload size is not a multiple of 8, or is below the 4-word floor.
    BadSize { bp: usize, size: usize },
    /// Payload address is not 8-byte aligned.
    Misaligned { bp: usize },
    /// A free block does not appear in the free list (or appears more than once).
    FreeListMembership { bp: usize, occurrences: usize },
    /// An allocated block appears in the free list.
    AllocatedInFreeList { bp: usize },
    /// Two adjacent blocks are both free (should have been coalesced).
    UncoalescedNeighbors { bp: usize, next_bp: usize },
    /// The prologue header does not encode `(DOUBLEWORD, allocated)`.
    BadPrologue,
    /// The epilogue header does not encode `(0, allocated)`.
    BadEpilogue,
}

/// Result of a [`check`] call: a bounded list of violations found during the
/// walk (empty when the arena is fully consistent).
#[derive(Debug, Clone, Copy)]
pub struct CheckReport {
    violations: [Option<Violation>; MAX_VIOLATIONS],
    count: usize,
    truncated: bool,
}

impl CheckReport {
    const fn empty() -> Self {
        Self {
            violations: [None; MAX_VIOLATIONS],
            count: 0,
            truncated: false,
        }
    }

    fn push(&mut self, v: Violation) {
        log::warn!("checker: {v:?}");
        if self.count < MAX_VIOLATIONS {
            self.violations[self.count] = Some(v);
            self.count += 1;
        } else {
            self.truncated = true;
        }
    }

    /// Whether the arena was found fully consistent.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Number of violations recorded (capped at [`MAX_VIOLATIONS`]).
    #[must_use]
    pub const fn len(&self) -> usize {
        self.count
    }

    /// Whether more violations existed than [`MAX_VIOLATIONS`] could record.
    #[must_use]
    pub const fn truncated(&self) -> bool {
        self.truncated
    }

    /// Iterate the recorded violations.
    pub fn iter(&self) -> impl Iterator<Item = Violation> + '_ {
        self.violations.iter().take(self.count).map(|v| v.unwrap())
    }
}

/// Walk the arena from `first_block` to the epilogue, checking every
/// per-block and global invariant, and cross-checking free-list membership.
///
/// `verbose` additionally logs a `trace`-level dump of every visited block,
/// in the style of the source's `printblock`.
///
/// # Safety
///
/// `first_block` must be the address recorded by `init`, `heap_top` the
/// arena's current top, and the arena's tags between `first_block` and the
/// current epilogue must be well-formed enough to read (even if semantically
/// violated — reads must not be out of bounds). The live epilogue tag sits
/// exactly at `heap_top` and is read by this walk, so the arena backing it
/// must keep one extra word of physical storage past its reported top (see
/// the safety note on [`crate::arena::Arena`]).
#[must_use]
pub unsafe fn check(
    free_list: &FreeList,
    heap_bottom: usize,
    first_block: usize,
    heap_top: usize,
    verbose: bool,
) -> CheckReport {
    let mut report = CheckReport::empty();

    let prologue_tag = unsafe { block::read_tag(heap_bottom + WORD) };
    if tag::size_of_tag(prologue_tag) != DWORD || !tag::is_alloc(prologue_tag) {
        report.push(Violation::BadPrologue);
    }

    if heap_top == first_block {
        // The arena has never been extended: `first_block` is the address
        // reserved for the first real header, not a written sentinel, so
        // there is nothing to walk or validate yet.
        return report;
    }

    let mut cursor = first_block;
    let mut prev_was_free = false;
    loop {
        if cursor > heap_top {
            // Defensive bound only; a well-formed arena always hits the
            // epilogue at exactly `heap_top` before this could trigger.
            break;
        }
        let header_tag = unsafe { block::read_tag(cursor) };
        let size = tag::size_of_tag(header_tag);
        if size == 0 {
            if !tag::is_alloc(header_tag) {
                report.push(Violation::BadEpilogue);
            }
            break;
        }
        let alloc = tag::is_alloc(header_tag);
        let bp = cursor + WORD;

        if verbose {
            log::trace!("checker: bp={bp:#x} size={size} alloc={alloc}");
        }

        let footer_tag = unsafe { block::read_tag(block::footer_addr(bp, size)) };
        if footer_tag != header_tag {
            report.push(Violation::HeaderFooterMismatch { bp });
        }
        if size % DWORD != 0 || size < tag::MIN_BLOCK {
            report.push(Violation::BadSize { bp, size });
        }
        if bp % DWORD != 0 {
            report.push(Violation::Misaligned { bp });
        }

        if alloc {
            if free_list_contains(free_list, bp) {
                report.push(Violation::AllocatedInFreeList { bp });
            }
        } else {
            let occurrences = count_free_list_occurrences(free_list, bp);
            if occurrences != 1 {
                report.push(Violation::FreeListMembership { bp, occurrences });
            }
            if prev_was_free {
                report.push(Violation::UncoalescedNeighbors {
                    bp: previous_bp(bp),
                    next_bp: bp,
                });
            }
        }
        prev_was_free = !alloc;
        cursor = block::next_header_addr(bp, size);
    }

    report
}

fn free_list_contains(free_list: &FreeList, bp: usize) -> bool {
    unsafe { free_list.iter() }.any(|b| b == bp)
}

fn count_free_list_occurrences(free_list: &FreeList, bp: usize) -> usize {
    unsafe { free_list.iter() }.filter(|&b| b == bp).count()
}

/// Best-effort reconstruction of the previous block's `bp`, used only to
/// label an [`Violation::UncoalescedNeighbors`] finding; never used for
/// navigation.
fn previous_bp(bp: usize) -> usize {
    let prev_tag = unsafe { block::read_tag(block::prev_footer_addr(bp)) };
    let prev_size = tag::size_of_tag(prev_tag);
    block::prev_bp(bp, prev_size)
}
