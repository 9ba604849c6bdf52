//! Optional `#[global_allocator]` glue over a statically-sized backing
//! arena, in the style of this codebase's `kernel_allocator.rs` /
//! `static_heap.rs` pair. Feature-gated behind `global-allocator`, since
//! most hosts embedding this crate bring their own arena and call
//! [`crate::Allocator`] directly.
//!
//! This module does not add locking: `SPEC_FULL.md` §5 makes thread safety
//! an explicit non-goal of the allocator core, so a caller reaching for this
//! feature is asserting single-threaded use (or has already serialized
//! access at a higher layer). `GLOBAL` is marked `Sync` on that assumption
//! alone — see the safety comment on [`GlobalArenaAllocator`].

use core::alloc::{GlobalAlloc, Layout};
use core::cell::UnsafeCell;
use core::sync::atomic::{AtomicBool, Ordering};

use crate::allocator::Allocator;
use crate::arena::Arena;
use crate::tag::WORD;

/// Total size of the static backing arena, as reported by `top()`.
pub const HEAP_SIZE: usize = 16 * 1024 * 1024;

/// Physical backing storage is `HEAP_SIZE + WORD`: the placement engine's
/// epilogue-absorb technique writes one word exactly at the arena's current
/// reported top (see the safety note on [`Arena`]), one word past whatever
/// `extend` most recently reserved, so the backing store needs that much
/// slack beyond the largest top it will ever report.
#[repr(align(16))]
struct HeapMem([u8; HEAP_SIZE + WORD]);

static mut HEAP: HeapMem = HeapMem([0; HEAP_SIZE + WORD]);

/// An [`Arena`] over a fixed-size static byte array. Never actually grows
/// past `HEAP_SIZE`; `extend` past that returns [`crate::arena::ARENA_FAIL`].
struct StaticArena {
    used: usize,
}

unsafe impl Arena for StaticArena {
    fn bottom(&self) -> usize {
        (&raw const HEAP) as usize
    }

    fn top(&self) -> usize {
        self.bottom() + self.used
    }

    fn extend(&mut self, n: usize) -> usize {
        if self.used + n > HEAP_SIZE {
            return crate::arena::ARENA_FAIL;
        }
        let old_top = self.top();
        self.used += n;
        old_top
    }
}

/// Wraps [`Allocator`] for use as a `#[global_allocator]`.
///
/// # Safety (single-threaded assumption)
///
/// `unsafe impl Sync` below is sound only if every call into this type is
/// externally serialized (the same requirement `SPEC_FULL.md` §5 places on
/// the allocator core). It is not sound to register this as the global
/// allocator in a multi-threaded binary without an external lock around
/// every allocation/deallocation.
pub struct GlobalArenaAllocator {
    inner: UnsafeCell<Option<Allocator<StaticArena>>>,
    did_init: AtomicBool,
}

unsafe impl Sync for GlobalArenaAllocator {}

impl GlobalArenaAllocator {
    const fn new() -> Self {
        Self {
            inner: UnsafeCell::new(None),
            did_init: AtomicBool::new(false),
        }
    }

    fn ensure_init(&self) {
        if self.did_init.load(Ordering::Acquire) {
            return;
        }
        let mut allocator = Allocator::new(StaticArena { used: 0 });
        allocator
            .init()
            .expect("static arena too small for sentinel words");
        unsafe {
            *self.inner.get() = Some(allocator);
        }
        self.did_init.store(true, Ordering::Release);
    }

    fn with_allocator<R>(&self, f: impl FnOnce(&mut Allocator<StaticArena>) -> R) -> R {
        self.ensure_init();
        let allocator = unsafe { (*self.inner.get()).as_mut() }
            .expect("allocator initialized by ensure_init");
        f(allocator)
    }
}

/// The process-wide global allocator instance.
#[global_allocator]
pub static GLOBAL: GlobalArenaAllocator = GlobalArenaAllocator::new();

unsafe impl GlobalAlloc for GlobalArenaAllocator {
    unsafe fn alloc(&self, layout: Layout) -> *mut u8 {
        self.with_allocator(|a| a.alloc(layout.size()))
            .map_or(core::ptr::null_mut(), |bp| bp as *mut u8)
    }

    unsafe fn dealloc(&self, ptr: *mut u8, _layout: Layout) {
        self.with_allocator(|a| unsafe { a.free(Some(ptr as usize)) });
    }

    unsafe fn realloc(&self, ptr: *mut u8, _layout: Layout, new_size: usize) -> *mut u8 {
        self.with_allocator(|a| unsafe { a.realloc(Some(ptr as usize), new_size) })
            .map_or(core::ptr::null_mut(), |bp| bp as *mut u8)
    }
}
