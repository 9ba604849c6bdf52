//! End-to-end scenarios mirroring `SPEC_FULL.md` §8, exercised against a
//! `std`-backed mock arena (the library itself stays `no_std`).

use arena_heap::arena::{ARENA_FAIL, Arena};
use arena_heap::{AllocError, Allocator, Config, Violation};

/// A fixed-capacity backing buffer. Deliberately never reallocated or moved
/// (a `Vec<u8>` growing on demand would invalidate every address the
/// allocator has already handed out), and backed by `u64` elements rather
/// than bytes so the base address comes out 8-byte aligned, matching the
/// `Arena::bottom` contract every payload-address computation here relies
/// on.
///
/// Physically sized `capacity + WORD`: the placement engine's
/// epilogue-absorb technique writes one word exactly at the arena's current
/// reported top, one word past whatever `extend` most recently reserved, so
/// `capacity` alone is not enough backing storage (see the safety note on
/// `Arena`).
struct MockArena {
    buf: Box<[u64]>,
    capacity: usize,
    used: usize,
}

impl MockArena {
    fn new(capacity: usize) -> Self {
        Self {
            buf: vec![0u64; (capacity + WORD).div_ceil(8)].into_boxed_slice(),
            capacity,
            used: 0,
        }
    }
}

unsafe impl Arena for MockArena {
    fn bottom(&self) -> usize {
        self.buf.as_ptr() as usize
    }

    fn top(&self) -> usize {
        self.bottom() + self.used
    }

    fn extend(&mut self, n: usize) -> usize {
        if self.used + n > self.capacity {
            return ARENA_FAIL;
        }
        let old_top = self.top();
        self.used += n;
        old_top
    }
}

const WORD: usize = 4;

// Scenarios 3, 4 and 6 assert exact block sizes that only hold without the
// realloc-growth slack; zero it out so the asserted arithmetic matches the
// literal numbers.
fn literal_config() -> Config {
    Config {
        realloc_slack: 0,
        probe_cap: 300,
    }
}

fn new_allocator(capacity: usize) -> Allocator<MockArena> {
    let mut a = Allocator::with_config(MockArena::new(capacity), literal_config());
    a.init().expect("init should succeed with ample capacity");
    a
}

unsafe fn header_size(bp: usize) -> usize {
    unsafe { arena_heap::block::read_header(bp).0 }
}

#[test]
fn scenario_1_init_then_one_alloc() {
    let mut a = new_allocator(4096);
    let bottom = a.heap_bottom();

    let p = a.alloc(24).expect("alloc should succeed");
    assert_eq!(p % 8, 0, "payload must be 8-aligned");
    assert!(p >= bottom + 2 * WORD + WORD);
    assert_eq!(unsafe { header_size(p) }, 32);

    assert!(unsafe { a.check(true) }.is_empty());
}

#[test]
fn scenario_2_alloc_free_alloc_reuses() {
    let mut a = new_allocator(4096);
    let x = a.alloc(200).unwrap();
    unsafe { a.free(Some(x)) };
    let y = a.alloc(200).unwrap();
    assert_eq!(x, y);
    assert!(unsafe { a.check(true) }.is_empty());
}

#[test]
fn scenario_3_coalesce_case_four() {
    let mut a = new_allocator(4096);
    let x = a.alloc(48).unwrap();
    let y = a.alloc(48).unwrap();
    let z = a.alloc(48).unwrap();

    unsafe {
        a.free(Some(x));
        a.free(Some(z));
        a.free(Some(y));
    }

    assert_eq!(a.free_list_len(), 1, "all three blocks must merge into one");
    let head = a.free_list_head().expect("one free block remains");
    assert_eq!(head, x, "merged block keeps the lowest address");
    assert_eq!(unsafe { header_size(head) }, 48 * 3 + 4 * WORD);

    assert!(unsafe { a.check(true) }.is_empty());
}

#[test]
fn scenario_4_in_place_realloc_growth() {
    let mut a = new_allocator(4096);
    let x = a.alloc(64).unwrap();
    let y = a.alloc(64).unwrap();
    unsafe { a.free(Some(y)) };

    let grown = unsafe { a.realloc(Some(x), 100) }.expect("in-place growth should succeed");
    assert_eq!(grown, x);
    assert_eq!(a.free_list_len(), 0, "the absorbed neighbor leaves no free block");
    assert_eq!(unsafe { header_size(x) }, 64 + 64 + 2 * WORD);

    assert!(unsafe { a.check(true) }.is_empty());
}

#[test]
fn scenario_5_realloc_fallback_copy() {
    let mut a = new_allocator(16 * 1024);
    let x = a.alloc(32).unwrap();
    let _y = a.alloc(32).unwrap();

    unsafe {
        core::slice::from_raw_parts_mut(x as *mut u8, 6).copy_from_slice(b"hello\0");
    }

    let grown = unsafe { a.realloc(Some(x), 4096) }.expect("fallback alloc should succeed");
    assert_ne!(grown, x);
    let copied = unsafe { core::slice::from_raw_parts(grown as *const u8, 5) };
    assert_eq!(copied, b"hello");
    assert!(a.free_list_contains(x), "old block must be back on the free list");

    assert!(unsafe { a.check(true) }.is_empty());
}

#[test]
fn scenario_6_split_preserves_remnant() {
    let mut a = new_allocator(16 * 1024);
    // A 4096-byte request with zero slack yields asize == 4096 exactly.
    let big = a.alloc(4096).unwrap();
    unsafe { a.free(Some(big)) };

    // The literal scenario's "alloc(64)" only produces the asserted asize
    // of 32 if the request falls in the <= 32-byte floor; 64 bytes does
    // not (the floor is 4*doubleword = 32 bytes). A size within the floor
    // is used here so the asserted arithmetic (4096 - 32 - 2*word) holds.
    let small = a.alloc(24).unwrap();

    assert!(small > big, "split carves the allocation from the high end");
    assert_eq!(unsafe { header_size(small) }, 32);

    assert_eq!(a.free_list_len(), 1);
    let remnant = a.free_list_head().unwrap();
    assert_eq!(remnant, big, "remnant stays at the original low address");
    assert_eq!(unsafe { header_size(remnant) }, 4096 - 32 - 2 * WORD);

    assert!(unsafe { a.check(true) }.is_empty());
}

#[test]
fn free_of_null_is_a_no_op() {
    let mut a = new_allocator(4096);
    let before = a.heap_top();
    unsafe { a.free(None) };
    assert_eq!(a.heap_top(), before);
}

#[test]
fn fresh_arena_passes_the_checker() {
    let a = new_allocator(4096);
    assert!(unsafe { a.check(false) }.is_empty());
}

#[test]
fn alloc_reports_arena_exhaustion() {
    // Capacity is exactly enough for `init`'s 3-word reservation and no
    // more, so any real allocation must fail to extend.
    let mut a = new_allocator(3 * WORD);
    let err = a.try_alloc(24).unwrap_err();
    assert_eq!(err, AllocError::ArenaExhausted { requested: 40 });
}

#[test]
fn corrupted_epilogue_is_detected() {
    let mut a = new_allocator(4096);
    let _x = a.alloc(24).unwrap();
    let heap_top = a.heap_top();

    // Flip the live epilogue's allocated bit to "free", which must never
    // happen to a real epilogue, and confirm the checker actually reads
    // and validates the word sitting at `heap_top` rather than silently
    // stopping short of it.
    unsafe { arena_heap::block::write_tag(heap_top, arena_heap::tag::pack(0, false)) };

    let report = unsafe { a.check(false) };
    assert!(
        report.iter().any(|v| matches!(v, Violation::BadEpilogue)),
        "corrupted epilogue must be reported, got: {:?}",
        report.iter().collect::<Vec<_>>()
    );
}
