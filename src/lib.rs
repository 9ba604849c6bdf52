//! # Explicit Free-List Heap Allocator
//!
//! This crate implements a single-threaded dynamic memory allocator over a
//! host-supplied, grow-only byte arena. Metadata lives entirely in-band: every
//! block carries a boundary-tag header and footer, and free blocks are linked
//! into an explicit doubly-linked free list threaded through their own
//! payload. There is no segregated size-class structure and no locking — a
//! host that needs either wraps an [`Allocator`] itself (see the
//! `global-allocator` feature for one such wrapper).
//!
//! ```text
//! +--------+-------------------------------+--------+
//! | header |   payload (8-byte aligned)    | footer |
//! +--------+-------------------------------+--------+
//! ^ HDRP(bp) = bp - WORD                    ^ FTRP(bp) = bp + size
//! ```
//!
//! The allocator is generic over an [`arena::Arena`] implementation; the host
//! supplies the backing bytes and three primitives (bottom, top, extend). No
//! other primitive is used — the allocator never shrinks the arena and never
//! returns memory to the host.
//!
//! Module map:
//! - [`arena`] — the host contract the allocator core consumes.
//! - [`tag`] — boundary-tag bit packing and alignment helpers.
//! - [`block`] — header/footer/neighbor address arithmetic.
//! - [`free_list`] — the explicit doubly-linked free list.
//! - [`placement`] — first-fit search, split, and heap extension.
//! - [`coalesce`] — the four-case neighbor-merge state machine.
//! - [`realloc`] — in-place growth and fallback-copy realloc.
//! - [`checker`] — the whole-arena consistency self-check.
//! - [`error`] — the typed error surface.
//! - [`allocator`] — the public [`Allocator`] type tying the above together.
#![cfg_attr(not(any(test, doctest)), no_std)]
#![allow(clippy::missing_errors_doc)]

pub mod allocator;
pub mod arena;
pub mod block;
pub mod checker;
pub mod coalesce;
pub mod error;
pub mod free_list;
pub mod placement;
pub mod realloc;
pub mod tag;

#[cfg(feature = "global-allocator")]
pub mod global;

pub use allocator::{Allocator, Config};
pub use arena::Arena;
pub use checker::{CheckReport, Violation};
pub use error::AllocError;
