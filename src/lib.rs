//! Indexable doubly-linked list with slice semantics.
//!
//! [`Links`] is a sequence container that supports both random indexing
//! (like a vector) and O(1) insertion, removal, and splicing once a
//! position is known. The key insight: nodes live in a slab arena and
//! positions are stable integer handles, not pointers.
//!
//! # Design Philosophy
//!
//! A classic pointer-based linked list trades random access for cheap
//! splicing, and in a garbage-collected setting it also leaves prev/next
//! reference cycles to break by hand. This crate keeps the chain in
//! external-storage form instead:
//!
//! ```text
//! Slab<Node<T>>   - owns the payloads, hands out stable slot indices
//! Links<T>        - coordinates head/tail/len and the prev/next indices
//! ```
//!
//! Benefits:
//! - **Stable handles**: a [`Link`] stays valid until its node is popped,
//!   regardless of what happens elsewhere in the chain
//! - **Checkable staleness**: payload access through a popped handle
//!   returns `None` instead of dangling
//! - **No cycle breaking**: clearing the list is freeing arena slots;
//!   there is no prev/next ownership cycle to dismantle
//! - **Cache-friendlier**: nodes are packed in one allocation
//!
//! # Quick Start
//!
//! ```
//! use linkslice::Links;
//!
//! let mut list: Links<u64> = Links::new();
//!
//! // Insert returns a stable handle for O(1) access later
//! let a = list.push_back(1);
//! let b = list.push_back(2);
//! list.push_back(3);
//!
//! assert_eq!(list.get(b), Some(&2));
//!
//! // O(1) removal from the middle
//! assert_eq!(list.remove(b), Some(2));
//! assert_eq!(list.remove(b), None); // stale handle is checkable
//!
//! // O(1) insertion relative to a known handle
//! list.insert_after(a, 99);
//! assert_eq!(list.iter().copied().collect::<Vec<_>>(), vec![1, 99, 3]);
//! ```
//!
//! # Indexing and Slices
//!
//! Index-addressed operations accept negative indices (counted from the
//! back) and resolve by walking from the nearer end, so a lookup costs at
//! most `len / 2` steps. Slices carry full ordered-sequence semantics:
//! clamped out-of-range bounds, negative steps, unequal-length
//! replacement for unit steps, equal-length-required replacement for
//! extended steps.
//!
//! ```
//! use linkslice::{Links, Slice};
//!
//! let list: Links<i32> = (0..10).collect();
//!
//! assert_eq!(list.get_at(-1), Ok(&9));
//!
//! // list[7:2:-2] in ordered-sequence notation
//! let s = list.slice(Slice::index(7, 2, -2)).unwrap();
//! assert_eq!(s.iter().copied().collect::<Vec<_>>(), vec![7, 5, 3]);
//! ```
//!
//! Slices can also be anchored at a link, in which case the stop bound is
//! a *relative* travel distance from that link. Handles do not know their
//! own index, so this avoids a redundant O(n) lookup for callers already
//! holding a position.
//!
//! # Time Complexity
//!
//! | Operation | Complexity |
//! |-----------|------------|
//! | `len`, `push_back`, `push_front`, `pop_back`, `pop_front` | O(1) |
//! | `insert_after`, `insert_before`, `remove`, `unlink` | O(1) |
//! | splicing a built chain of k items | O(k) build + O(1) splice |
//! | `resolve`, `get_at`, `pop_at` | O(min(i, len - i)) |
//! | `slice`, `set_slice` | O(span) after anchor resolution |
//!
//! # Not Provided
//!
//! No internal synchronization: the container is single-owner, and Rust's
//! borrow rules already prevent mutating the chain while a traversal over
//! it is live. No ordering beyond strict insertion order.

#![warn(missing_docs)]

pub mod links;
pub mod slice;

pub use links::{IntoIter, Iter, IterMut, Link, LinkIter, Links};
pub use slice::Slice;

use std::error::Error;
use std::fmt;

/// Error returned when an integer index falls outside `[-len, len)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IndexOutOfBounds {
    /// The index as supplied by the caller (before negative adjustment).
    pub index: isize,
    /// The length of the list at the time of the call.
    pub len: usize,
}

impl fmt::Display for IndexOutOfBounds {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "index {} out of bounds for list of length {}",
            self.index, self.len
        )
    }
}

impl Error for IndexOutOfBounds {}

/// Error returned by slice operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SliceError {
    /// A step of zero has no direction. Never silently coerced.
    ZeroStep,
    /// Extended-step (|step| >= 2) assignment requires the replacement to
    /// match the targeted span exactly.
    LengthMismatch {
        /// Number of links in the targeted span.
        span: usize,
        /// Number of replacement items supplied.
        items: usize,
    },
}

impl fmt::Display for SliceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SliceError::ZeroStep => write!(f, "slice step cannot be zero"),
            SliceError::LengthMismatch { span, items } => {
                write!(
                    f,
                    "extended slice assignment requires equal lengths (span {span}, items {items})"
                )
            }
        }
    }
}

impl Error for SliceError {}
