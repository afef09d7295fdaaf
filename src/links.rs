//! The chain container and its stable link handles.
//!
//! Nodes are stored in a [`slab::Slab`] owned by the container; the chain
//! is woven through them with slot indices rather than pointers. A
//! [`Link`] is an opaque copy of one slot index: cheap to keep, cheap to
//! compare, and checkable after the node it names has been popped.
//!
//! # Chain Invariant
//!
//! Between public calls the chain is always whole: following `next` from
//! the head visits exactly `len` nodes and ends at the sentinel, every
//! adjacent pair agrees on `prev`/`next`, and a detached node holds the
//! sentinel in both directions. No operation leaves a node half-linked.
//!
//! # Example
//!
//! ```
//! use linkslice::Links;
//!
//! let mut list: Links<&str> = Links::new();
//! let b = list.push_back("b");
//! list.push_back("c");
//! list.insert_before(b, "a");
//!
//! assert_eq!(list.iter().copied().collect::<Vec<_>>(), vec!["a", "b", "c"]);
//!
//! // Handles step in either direction; overrun is None, not a panic.
//! assert_eq!(list.step(b, 1).and_then(|l| list.get(l)), Some(&"c"));
//! assert_eq!(list.step(b, -1).and_then(|l| list.get(l)), Some(&"a"));
//! assert_eq!(list.step(b, 5), None);
//! ```

use std::fmt;
use std::mem;

use slab::Slab;

use crate::IndexOutOfBounds;

/// Sentinel slot index meaning "no link".
pub(crate) const NONE: usize = usize::MAX;

/// Stable handle to one node of a [`Links`] chain.
///
/// A handle stays valid until its node is popped or the list is cleared.
/// After that, checked accessors (`get`, `remove`, `step`, ...) return
/// `None` for it. A handle obtained from a *different* `Links` instance
/// is a precondition violation: operations will observe whatever node
/// happens to occupy that slot here, never undefined behavior.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Link(pub(crate) usize);

#[derive(Debug)]
pub(crate) struct Node<T> {
    pub(crate) item: T,
    pub(crate) prev: usize,
    pub(crate) next: usize,
}

impl<T> Node<T> {
    #[inline]
    fn detached(item: T) -> Self {
        Self {
            item,
            prev: NONE,
            next: NONE,
        }
    }
}

/// An indexable doubly-linked list over slab storage.
///
/// Supports O(1) endpoint and link-relative mutation, nearest-end index
/// resolution, and ordered-sequence slicing (see [`Slice`](crate::Slice)).
///
/// # Example
///
/// ```
/// use linkslice::Links;
///
/// let mut list: Links<i32> = (0..5).collect();
/// assert_eq!(list.len(), 5);
///
/// let mid = list.resolve(2).unwrap();
/// list.insert_after(mid, 99);
/// assert_eq!(list.iter().copied().collect::<Vec<_>>(), vec![0, 1, 2, 99, 3, 4]);
/// ```
pub struct Links<T> {
    pub(crate) arena: Slab<Node<T>>,
    pub(crate) head: usize,
    pub(crate) tail: usize,
    pub(crate) len: usize,
}

impl<T> Links<T> {
    /// Creates an empty list.
    #[inline]
    pub fn new() -> Self {
        Self {
            arena: Slab::new(),
            head: NONE,
            tail: NONE,
            len: 0,
        }
    }

    /// Creates an empty list with room for `capacity` nodes before the
    /// arena reallocates.
    #[inline]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            arena: Slab::with_capacity(capacity),
            head: NONE,
            tail: NONE,
            len: 0,
        }
    }

    /// Returns the number of elements in the list.
    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns `true` if the list is empty.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Returns the arena capacity.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.arena.capacity()
    }

    /// Returns the handle of the first node, or `None` if empty.
    #[inline]
    pub fn head(&self) -> Option<Link> {
        wrap(self.head)
    }

    /// Returns the handle of the last node, or `None` if empty.
    #[inline]
    pub fn tail(&self) -> Option<Link> {
        wrap(self.tail)
    }

    /// Returns `true` if `link` names a live node of this list.
    #[inline]
    pub fn contains(&self, link: Link) -> bool {
        self.arena.contains(link.0)
    }

    // ========================================================================
    // Payload access
    // ========================================================================

    /// Returns a reference to the payload behind `link`.
    ///
    /// Returns `None` if the handle is stale.
    #[inline]
    pub fn get(&self, link: Link) -> Option<&T> {
        self.arena.get(link.0).map(|node| &node.item)
    }

    /// Returns a mutable reference to the payload behind `link`.
    ///
    /// Returns `None` if the handle is stale.
    #[inline]
    pub fn get_mut(&mut self, link: Link) -> Option<&mut T> {
        self.arena.get_mut(link.0).map(|node| &mut node.item)
    }

    /// Replaces the payload behind `link`, returning the previous value.
    ///
    /// Chain structure is untouched. Returns `None` if the handle is
    /// stale (the new value is dropped).
    #[inline]
    pub fn set(&mut self, link: Link, item: T) -> Option<T> {
        self.arena
            .get_mut(link.0)
            .map(|node| mem::replace(&mut node.item, item))
    }

    /// Returns a reference to the first payload.
    #[inline]
    pub fn front(&self) -> Option<&T> {
        self.arena.get(self.head).map(|node| &node.item)
    }

    /// Returns a mutable reference to the first payload.
    #[inline]
    pub fn front_mut(&mut self) -> Option<&mut T> {
        self.arena.get_mut(self.head).map(|node| &mut node.item)
    }

    /// Returns a reference to the last payload.
    #[inline]
    pub fn back(&self) -> Option<&T> {
        self.arena.get(self.tail).map(|node| &node.item)
    }

    /// Returns a mutable reference to the last payload.
    #[inline]
    pub fn back_mut(&mut self) -> Option<&mut T> {
        self.arena.get_mut(self.tail).map(|node| &mut node.item)
    }

    // ========================================================================
    // Stepping
    // ========================================================================

    /// Steps `amount` links forward (positive) or backward (negative).
    ///
    /// `0` returns `link` itself. Returns `None` as soon as any
    /// intermediate step overruns an end of the chain, or if the handle
    /// is stale; a step never partially succeeds.
    #[inline]
    pub fn step(&self, link: Link, amount: isize) -> Option<Link> {
        if !self.arena.contains(link.0) {
            return None;
        }
        wrap(self.advance(link.0, amount.unsigned_abs(), amount >= 0))
    }

    /// Returns the handle after `link`, or `None` at the tail or for a
    /// stale handle.
    #[inline]
    pub fn next(&self, link: Link) -> Option<Link> {
        wrap(self.arena.get(link.0)?.next)
    }

    /// Returns the handle before `link`, or `None` at the head or for a
    /// stale handle.
    #[inline]
    pub fn prev(&self, link: Link) -> Option<Link> {
        wrap(self.arena.get(link.0)?.prev)
    }

    /// Walks `by` raw steps from `raw` in one direction. Returns the
    /// sentinel on overrun.
    #[inline]
    pub(crate) fn advance(&self, mut raw: usize, by: usize, forward: bool) -> usize {
        for _ in 0..by {
            if raw == NONE {
                return NONE;
            }
            let node = &self.arena[raw];
            raw = if forward { node.next } else { node.prev };
        }
        raw
    }

    // ========================================================================
    // Index resolution
    // ========================================================================

    /// Resolves an integer index to a link handle.
    ///
    /// Negative indices count from the back. Traversal starts from the
    /// nearer end, bounding the walk to `len / 2` steps.
    ///
    /// # Errors
    ///
    /// Returns [`IndexOutOfBounds`] if the index falls outside
    /// `[-len, len)`.
    pub fn resolve(&self, index: isize) -> Result<Link, IndexOutOfBounds> {
        let len = self.len as isize;
        let norm = if index < 0 { index + len } else { index };
        if norm < 0 || norm >= len {
            return Err(IndexOutOfBounds {
                index,
                len: self.len,
            });
        }
        Ok(Link(self.seek(norm as usize)))
    }

    /// Seeks the raw slot at a known-in-range position.
    pub(crate) fn seek(&self, index: usize) -> usize {
        debug_assert!(index < self.len);
        let from_back = self.len - 1 - index;
        if index <= from_back {
            self.advance(self.head, index, true)
        } else {
            self.advance(self.tail, from_back, false)
        }
    }

    /// Returns a reference to the payload at an integer index.
    ///
    /// # Errors
    ///
    /// Returns [`IndexOutOfBounds`] if the index falls outside
    /// `[-len, len)`.
    #[inline]
    pub fn get_at(&self, index: isize) -> Result<&T, IndexOutOfBounds> {
        let link = self.resolve(index)?;
        Ok(&self.arena[link.0].item)
    }

    /// Returns a mutable reference to the payload at an integer index.
    ///
    /// # Errors
    ///
    /// Returns [`IndexOutOfBounds`] if the index falls outside
    /// `[-len, len)`.
    #[inline]
    pub fn get_at_mut(&mut self, index: isize) -> Result<&mut T, IndexOutOfBounds> {
        let link = self.resolve(index)?;
        Ok(&mut self.arena[link.0].item)
    }

    /// Replaces the payload at an integer index, returning the previous
    /// value.
    ///
    /// # Errors
    ///
    /// Returns [`IndexOutOfBounds`] if the index falls outside
    /// `[-len, len)`.
    #[inline]
    pub fn set_at(&mut self, index: isize, item: T) -> Result<T, IndexOutOfBounds> {
        let link = self.resolve(index)?;
        Ok(mem::replace(&mut self.arena[link.0].item, item))
    }

    // ========================================================================
    // Insertion
    // ========================================================================

    /// Appends an item, returning its handle. O(1).
    #[inline]
    pub fn push_back(&mut self, item: T) -> Link {
        let raw = self.arena.insert(Node::detached(item));
        self.splice(self.tail, NONE, raw, raw, 1);
        Link(raw)
    }

    /// Prepends an item, returning its handle. O(1).
    #[inline]
    pub fn push_front(&mut self, item: T) -> Link {
        let raw = self.arena.insert(Node::detached(item));
        self.splice(NONE, self.head, raw, raw, 1);
        Link(raw)
    }

    /// Inserts an item immediately after `link`, returning its handle.
    /// O(1); updates the tail if `link` was the tail.
    ///
    /// # Panics
    ///
    /// Panics if `link` is stale.
    #[inline]
    pub fn insert_after(&mut self, link: Link, item: T) -> Link {
        let next = self.arena.get(link.0).expect("stale link").next;
        let raw = self.arena.insert(Node::detached(item));
        self.splice(link.0, next, raw, raw, 1);
        Link(raw)
    }

    /// Inserts an item immediately before `link`, returning its handle.
    /// O(1); updates the head if `link` was the head.
    ///
    /// # Panics
    ///
    /// Panics if `link` is stale.
    #[inline]
    pub fn insert_before(&mut self, link: Link, item: T) -> Link {
        let prev = self.arena.get(link.0).expect("stale link").prev;
        let raw = self.arena.insert(Node::detached(item));
        self.splice(prev, link.0, raw, raw, 1);
        Link(raw)
    }

    /// Splices the internally-connected chain `first ..= last` of `count`
    /// nodes between `prev` and `next`. Endpoint bookkeeping included.
    pub(crate) fn splice(
        &mut self,
        prev: usize,
        next: usize,
        first: usize,
        last: usize,
        count: usize,
    ) {
        self.arena[first].prev = prev;
        self.arena[last].next = next;
        if prev != NONE {
            self.arena[prev].next = first;
        } else {
            self.head = first;
        }
        if next != NONE {
            self.arena[next].prev = last;
        } else {
            self.tail = last;
        }
        self.len += count;
    }

    /// Builds a disconnected chain in the arena without touching the
    /// existing list. Returns `(first, last, count)`, or `None` for an
    /// empty iterator.
    ///
    /// With `reverse`, each produced item is linked in front of the one
    /// before it, so the chain holds the items back to front.
    pub(crate) fn build_chain<I>(&mut self, items: I, reverse: bool) -> Option<(usize, usize, usize)>
    where
        I: IntoIterator<Item = T>,
    {
        let mut items = items.into_iter();
        let seed = self.arena.insert(Node::detached(items.next()?));
        let mut count = 1;
        if reverse {
            let mut first = seed;
            for item in items {
                let raw = self.arena.insert(Node {
                    item,
                    prev: NONE,
                    next: first,
                });
                self.arena[first].prev = raw;
                first = raw;
                count += 1;
            }
            Some((first, seed, count))
        } else {
            let mut last = seed;
            for item in items {
                let raw = self.arena.insert(Node {
                    item,
                    prev: last,
                    next: NONE,
                });
                self.arena[last].next = raw;
                last = raw;
                count += 1;
            }
            Some((seed, last, count))
        }
    }

    /// Appends all items in order. The chain is built first, then
    /// spliced in with one O(1) link-up.
    pub fn extend_back<I>(&mut self, items: I)
    where
        I: IntoIterator<Item = T>,
    {
        if let Some((first, last, count)) = self.build_chain(items, false) {
            self.splice(self.tail, NONE, first, last, count);
        }
    }

    /// Prepends all items in **reverse order**: the first produced item
    /// ends up closest to the old head, deque-`extendleft` style.
    ///
    /// ```
    /// use linkslice::Links;
    ///
    /// let mut list: Links<char> = ['a', 'b'].into_iter().collect();
    /// list.extend_front(['1', '2', '3']);
    /// assert_eq!(list.iter().collect::<String>(), "321ab");
    /// ```
    pub fn extend_front<I>(&mut self, items: I)
    where
        I: IntoIterator<Item = T>,
    {
        if let Some((first, last, count)) = self.build_chain(items, true) {
            self.splice(NONE, self.head, first, last, count);
        }
    }

    /// Splices all items, in order, immediately after `link`.
    ///
    /// # Panics
    ///
    /// Panics if `link` is stale.
    pub fn extend_after<I>(&mut self, link: Link, items: I)
    where
        I: IntoIterator<Item = T>,
    {
        let next = self.arena.get(link.0).expect("stale link").next;
        if let Some((first, last, count)) = self.build_chain(items, false) {
            self.splice(link.0, next, first, last, count);
        }
    }

    /// Splices all items immediately before `link`, in **reverse
    /// order**: the first produced item ends up adjacent to `link`.
    /// This mirrors [`extend_front`](Links::extend_front) and is
    /// deliberate; a backward traversal from `link` reads the items in
    /// production order.
    ///
    /// # Panics
    ///
    /// Panics if `link` is stale.
    pub fn extend_before<I>(&mut self, link: Link, items: I)
    where
        I: IntoIterator<Item = T>,
    {
        let prev = self.arena.get(link.0).expect("stale link").prev;
        if let Some((first, last, count)) = self.build_chain(items, true) {
            self.splice(prev, link.0, first, last, count);
        }
    }

    /// Splices all items, in order, at an integer position.
    ///
    /// The position clamps like ordered-sequence `insert`: past the end
    /// appends, at or below zero prepends, negative positions count from
    /// the back first.
    pub fn insert_at<I>(&mut self, index: isize, items: I)
    where
        I: IntoIterator<Item = T>,
    {
        let len = self.len as isize;
        let norm = if index < 0 { index + len } else { index };
        let next = if norm >= len {
            NONE
        } else if norm <= 0 {
            self.head
        } else {
            self.seek(norm as usize)
        };
        let prev = if next == NONE {
            self.tail
        } else {
            self.arena[next].prev
        };
        if let Some((first, last, count)) = self.build_chain(items, false) {
            self.splice(prev, next, first, last, count);
        }
    }

    // ========================================================================
    // Removal
    // ========================================================================

    /// Removes and returns the last item. O(1).
    #[inline]
    pub fn pop_back(&mut self) -> Option<T> {
        let raw = self.tail;
        if raw == NONE {
            return None;
        }
        let prev = self.arena[raw].prev;
        self.unlink_raw(raw, prev, NONE);
        Some(self.arena.remove(raw).item)
    }

    /// Removes and returns the first item. O(1).
    #[inline]
    pub fn pop_front(&mut self) -> Option<T> {
        let raw = self.head;
        if raw == NONE {
            return None;
        }
        let next = self.arena[raw].next;
        self.unlink_raw(raw, NONE, next);
        Some(self.arena.remove(raw).item)
    }

    /// Removes and returns the item at an integer index.
    ///
    /// # Errors
    ///
    /// Returns [`IndexOutOfBounds`] if the index falls outside
    /// `[-len, len)`; popping from an empty list is always out of
    /// bounds.
    pub fn pop_at(&mut self, index: isize) -> Result<T, IndexOutOfBounds> {
        let link = self.resolve(index)?;
        let node = &self.arena[link.0];
        let (prev, next) = (node.prev, node.next);
        self.unlink_raw(link.0, prev, next);
        Ok(self.arena.remove(link.0).item)
    }

    /// Removes the node behind `link` and returns its payload, freeing
    /// the arena slot. O(1). Works on detached nodes too.
    ///
    /// Returns `None` if the handle is stale.
    pub fn remove(&mut self, link: Link) -> Option<T> {
        let node = self.arena.get(link.0)?;
        let (prev, next) = (node.prev, node.next);
        if prev != NONE || next != NONE || self.head == link.0 {
            self.unlink_raw(link.0, prev, next);
        }
        Some(self.arena.remove(link.0).item)
    }

    /// Unhooks `raw` from between its neighbors, clears both of its own
    /// directions, fixes endpoints, and decrements the length.
    pub(crate) fn unlink_raw(&mut self, raw: usize, prev: usize, next: usize) {
        if prev != NONE {
            self.arena[prev].next = next;
        } else {
            self.head = next;
        }
        if next != NONE {
            self.arena[next].prev = prev;
        } else {
            self.tail = prev;
        }
        let node = &mut self.arena[raw];
        node.prev = NONE;
        node.next = NONE;
        self.len -= 1;
    }

    /// Removes every element and frees every arena slot.
    ///
    /// All outstanding handles become stale. Idempotent.
    pub fn clear(&mut self) {
        self.arena.clear();
        self.head = NONE;
        self.tail = NONE;
        self.len = 0;
    }

    // ========================================================================
    // Detach / relink (node recycling)
    // ========================================================================

    /// Detaches the node behind `link` from the chain without freeing
    /// its arena slot. The payload stays readable through the handle,
    /// and the node can be relinked later — insertion without a fresh
    /// allocation.
    ///
    /// Returns `true` if the node was linked.
    ///
    /// # Panics
    ///
    /// Panics if `link` is stale.
    ///
    /// ```
    /// use linkslice::Links;
    ///
    /// let mut list: Links<i32> = (0..4).collect();
    /// let l = list.resolve(1).unwrap();
    ///
    /// assert!(list.unlink(l));
    /// assert_eq!(list.len(), 3);
    /// assert_eq!(list.get(l), Some(&1)); // still allocated
    ///
    /// list.link_back(l);
    /// assert_eq!(list.iter().copied().collect::<Vec<_>>(), vec![0, 2, 3, 1]);
    /// ```
    pub fn unlink(&mut self, link: Link) -> bool {
        let node = self.arena.get(link.0).expect("stale link");
        let (prev, next) = (node.prev, node.next);
        if prev == NONE && next == NONE && self.head != link.0 {
            return false;
        }
        self.unlink_raw(link.0, prev, next);
        true
    }

    /// Relinks a detached node at the back of the chain. O(1).
    ///
    /// The node must be detached (see [`unlink`](Links::unlink)).
    ///
    /// # Panics
    ///
    /// Panics if `link` is stale.
    #[inline]
    pub fn link_back(&mut self, link: Link) {
        let node = self.arena.get(link.0).expect("stale link");
        debug_assert!(node.prev == NONE && node.next == NONE);
        self.splice(self.tail, NONE, link.0, link.0, 1);
    }

    /// Relinks a detached node at the front of the chain. O(1).
    ///
    /// The node must be detached (see [`unlink`](Links::unlink)).
    ///
    /// # Panics
    ///
    /// Panics if `link` is stale.
    #[inline]
    pub fn link_front(&mut self, link: Link) {
        let node = self.arena.get(link.0).expect("stale link");
        debug_assert!(node.prev == NONE && node.next == NONE);
        self.splice(NONE, self.head, link.0, link.0, 1);
    }

    /// Relinks a detached node immediately after `anchor`. O(1).
    ///
    /// # Panics
    ///
    /// Panics if either handle is stale.
    #[inline]
    pub fn link_after(&mut self, anchor: Link, link: Link) {
        let next = self.arena.get(anchor.0).expect("stale anchor").next;
        let node = self.arena.get(link.0).expect("stale link");
        debug_assert!(node.prev == NONE && node.next == NONE);
        self.splice(anchor.0, next, link.0, link.0, 1);
    }

    /// Relinks a detached node immediately before `anchor`. O(1).
    ///
    /// # Panics
    ///
    /// Panics if either handle is stale.
    #[inline]
    pub fn link_before(&mut self, anchor: Link, link: Link) {
        let prev = self.arena.get(anchor.0).expect("stale anchor").prev;
        let node = self.arena.get(link.0).expect("stale link");
        debug_assert!(node.prev == NONE && node.next == NONE);
        self.splice(prev, anchor.0, link.0, link.0, 1);
    }

    // ========================================================================
    // Iteration
    // ========================================================================

    /// Returns a double-ended iterator over payload references.
    #[inline]
    pub fn iter(&self) -> Iter<'_, T> {
        Iter {
            arena: &self.arena,
            front: self.head,
            back: self.tail,
        }
    }

    /// Returns a double-ended iterator over mutable payload references.
    #[inline]
    pub fn iter_mut(&mut self) -> IterMut<'_, T> {
        IterMut {
            front: self.head,
            back: self.tail,
            arena: &mut self.arena,
        }
    }

    /// Returns a double-ended iterator over link handles, front to back.
    ///
    /// Useful when positions matter: collect handles first if you plan
    /// to mutate the chain while walking it.
    #[inline]
    pub fn links(&self) -> LinkIter<'_, T> {
        LinkIter {
            arena: &self.arena,
            front: self.head,
            back: self.tail,
        }
    }

    #[cfg(test)]
    pub(crate) fn check_invariants(&self) {
        assert_eq!(self.len == 0, self.head == NONE);
        assert_eq!(self.len == 0, self.tail == NONE);
        let mut count = 0;
        let mut prev = NONE;
        let mut raw = self.head;
        while raw != NONE {
            assert_eq!(self.arena[raw].prev, prev);
            prev = raw;
            raw = self.arena[raw].next;
            count += 1;
        }
        if self.len > 0 {
            assert_eq!(prev, self.tail);
        }
        assert_eq!(count, self.len);
    }
}

#[inline]
pub(crate) fn wrap(raw: usize) -> Option<Link> {
    if raw == NONE { None } else { Some(Link(raw)) }
}

// =============================================================================
// Std trait impls
// =============================================================================

impl<T> Default for Links<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: fmt::Debug> fmt::Debug for Links<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}

impl<T: Clone> Clone for Links<T> {
    /// Clones into a fresh arena: the copy shares no slots with the
    /// source, and handles are not portable between the two.
    fn clone(&self) -> Self {
        self.iter().cloned().collect()
    }
}

impl<T: PartialEq> PartialEq for Links<T> {
    fn eq(&self, other: &Self) -> bool {
        self.len == other.len && self.iter().zip(other.iter()).all(|(a, b)| a == b)
    }
}

impl<T: Eq> Eq for Links<T> {}

impl<T> FromIterator<T> for Links<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut list = Links::new();
        list.extend_back(iter);
        list
    }
}

impl<T> Extend<T> for Links<T> {
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        self.extend_back(iter);
    }
}

impl<T> IntoIterator for Links<T> {
    type Item = T;
    type IntoIter = IntoIter<T>;

    fn into_iter(self) -> IntoIter<T> {
        IntoIter(self)
    }
}

impl<'a, T> IntoIterator for &'a Links<T> {
    type Item = &'a T;
    type IntoIter = Iter<'a, T>;

    fn into_iter(self) -> Iter<'a, T> {
        self.iter()
    }
}

impl<'a, T> IntoIterator for &'a mut Links<T> {
    type Item = &'a mut T;
    type IntoIter = IterMut<'a, T>;

    fn into_iter(self) -> IterMut<'a, T> {
        self.iter_mut()
    }
}

// =============================================================================
// Iterators
// =============================================================================

/// Double-ended iterator over payload references.
pub struct Iter<'a, T> {
    arena: &'a Slab<Node<T>>,
    front: usize,
    back: usize,
}

impl<'a, T> Iterator for Iter<'a, T> {
    type Item = &'a T;

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        if self.front == NONE {
            return None;
        }
        let node = &self.arena[self.front];
        // Check if we've met in the middle
        if self.front == self.back {
            self.front = NONE;
            self.back = NONE;
        } else {
            self.front = node.next;
        }
        Some(&node.item)
    }
}

impl<'a, T> DoubleEndedIterator for Iter<'a, T> {
    #[inline]
    fn next_back(&mut self) -> Option<Self::Item> {
        if self.back == NONE {
            return None;
        }
        let node = &self.arena[self.back];
        if self.front == self.back {
            self.front = NONE;
            self.back = NONE;
        } else {
            self.back = node.prev;
        }
        Some(&node.item)
    }
}

/// Double-ended iterator over mutable payload references.
pub struct IterMut<'a, T> {
    arena: &'a mut Slab<Node<T>>,
    front: usize,
    back: usize,
}

impl<'a, T> Iterator for IterMut<'a, T> {
    type Item = &'a mut T;

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        if self.front == NONE {
            return None;
        }
        let node = &mut self.arena[self.front];
        if self.front == self.back {
            self.front = NONE;
            self.back = NONE;
        } else {
            self.front = node.next;
        }
        // Extend lifetime - safe because we visit each node exactly once
        Some(unsafe { &mut *((&mut node.item) as *mut T) })
    }
}

impl<'a, T> DoubleEndedIterator for IterMut<'a, T> {
    #[inline]
    fn next_back(&mut self) -> Option<Self::Item> {
        if self.back == NONE {
            return None;
        }
        let node = &mut self.arena[self.back];
        if self.front == self.back {
            self.front = NONE;
            self.back = NONE;
        } else {
            self.back = node.prev;
        }
        // Extend lifetime - safe because we visit each node exactly once
        Some(unsafe { &mut *((&mut node.item) as *mut T) })
    }
}

/// Double-ended iterator over link handles.
pub struct LinkIter<'a, T> {
    arena: &'a Slab<Node<T>>,
    front: usize,
    back: usize,
}

impl<'a, T> Iterator for LinkIter<'a, T> {
    type Item = Link;

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        if self.front == NONE {
            return None;
        }
        let link = Link(self.front);
        let node = &self.arena[self.front];
        if self.front == self.back {
            self.front = NONE;
            self.back = NONE;
        } else {
            self.front = node.next;
        }
        Some(link)
    }
}

impl<'a, T> DoubleEndedIterator for LinkIter<'a, T> {
    #[inline]
    fn next_back(&mut self) -> Option<Self::Item> {
        if self.back == NONE {
            return None;
        }
        let link = Link(self.back);
        let node = &self.arena[self.back];
        if self.front == self.back {
            self.front = NONE;
            self.back = NONE;
        } else {
            self.back = node.prev;
        }
        Some(link)
    }
}

/// Owning iterator; pops from the front (or the back, reversed).
pub struct IntoIter<T>(Links<T>);

impl<T> Iterator for IntoIter<T> {
    type Item = T;

    #[inline]
    fn next(&mut self) -> Option<T> {
        self.0.pop_front()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.0.len, Some(self.0.len))
    }
}

impl<T> DoubleEndedIterator for IntoIter<T> {
    #[inline]
    fn next_back(&mut self) -> Option<T> {
        self.0.pop_back()
    }
}

impl<T> ExactSizeIterator for IntoIter<T> {}

#[cfg(test)]
mod tests {
    use super::*;

    fn items(list: &Links<i32>) -> Vec<i32> {
        list.iter().copied().collect()
    }

    #[test]
    fn new_list_is_empty() {
        let list: Links<i32> = Links::new();
        assert!(list.is_empty());
        assert_eq!(list.len(), 0);
        assert!(list.head().is_none());
        assert!(list.tail().is_none());
        list.check_invariants();
    }

    #[test]
    fn push_back_and_front() {
        let mut list = Links::new();
        let a = list.push_back(1);
        list.push_back(2);
        list.push_front(0);

        assert_eq!(items(&list), vec![0, 1, 2]);
        assert_eq!(list.len(), 3);
        assert_eq!(list.front(), Some(&0));
        assert_eq!(list.back(), Some(&2));
        assert_eq!(list.get(a), Some(&1));
        list.check_invariants();
    }

    #[test]
    fn relative_insertion() {
        // The original acceptance scenario: append/appendleft around a
        // held mid-list handle.
        let mut list = Links::new();
        list.push_back(1);
        let mid = list.push_back(2);
        list.push_back(3);
        list.push_front(4);
        list.insert_after(mid, 5);
        list.insert_before(mid, 6);

        assert_eq!(items(&list), vec![4, 1, 6, 2, 5, 3]);
        list.check_invariants();
    }

    #[test]
    fn stepping() {
        let mut list = Links::new();
        list.push_back(1);
        let mid = list.push_back(2);
        list.push_back(3);
        list.push_front(4);
        list.insert_after(mid, 5);
        list.insert_before(mid, 6);
        // list: [4, 1, 6, 2, 5, 3], mid at index 3

        assert_eq!(list.step(mid, -4), None);
        assert_eq!(list.step(mid, -3).and_then(|l| list.get(l)), Some(&4));
        assert_eq!(list.step(mid, -2).and_then(|l| list.get(l)), Some(&1));
        assert_eq!(list.step(mid, -1).and_then(|l| list.get(l)), Some(&6));
        assert_eq!(list.step(mid, 0), Some(mid));
        assert_eq!(list.step(mid, 1).and_then(|l| list.get(l)), Some(&5));
        assert_eq!(list.step(mid, 2).and_then(|l| list.get(l)), Some(&3));
        assert_eq!(list.step(mid, 3), None);

        assert_eq!(list.next(mid), list.step(mid, 1));
        assert_eq!(list.prev(mid), list.step(mid, -1));
    }

    #[test]
    fn step_on_stale_handle() {
        let mut list: Links<i32> = (0..3).collect();
        let l = list.resolve(1).unwrap();
        list.remove(l);
        assert_eq!(list.step(l, 0), None);
        assert_eq!(list.step(l, 1), None);
    }

    #[test]
    fn resolve_negative_and_oob() {
        let list: Links<i32> = (0..10).collect();

        for i in -10isize..10 {
            let expect = if i < 0 { i + 10 } else { i } as i32;
            assert_eq!(list.get_at(i), Ok(&expect), "index {i}");
        }
        assert_eq!(
            list.get_at(10),
            Err(crate::IndexOutOfBounds { index: 10, len: 10 })
        );
        assert_eq!(
            list.get_at(-11),
            Err(crate::IndexOutOfBounds {
                index: -11,
                len: 10
            })
        );
    }

    #[test]
    fn set_and_set_at() {
        let mut list: Links<i32> = (0..4).collect();
        let l = list.resolve(2).unwrap();

        assert_eq!(list.set(l, 20), Some(2));
        assert_eq!(list.set_at(-1, 30), Ok(3));
        assert_eq!(items(&list), vec![0, 1, 20, 30]);

        list.remove(l);
        assert_eq!(list.set(l, 99), None);
    }

    #[test]
    fn pop_back_and_front() {
        let mut list: Links<i32> = (0..3).collect();

        assert_eq!(list.pop_back(), Some(2));
        assert_eq!(list.pop_front(), Some(0));
        assert_eq!(list.pop_back(), Some(1));
        assert_eq!(list.pop_back(), None);
        assert_eq!(list.pop_front(), None);
        assert!(list.is_empty());
        assert!(list.head().is_none());
        assert!(list.tail().is_none());
        list.check_invariants();
    }

    #[test]
    fn pop_at() {
        let mut list: Links<i32> = (0..5).collect();

        assert_eq!(list.pop_at(0), Ok(0));
        assert_eq!(list.pop_at(-1), Ok(4));
        assert_eq!(list.pop_at(1), Ok(2));
        assert_eq!(items(&list), vec![1, 3]);
        assert_eq!(
            list.pop_at(2),
            Err(crate::IndexOutOfBounds { index: 2, len: 2 })
        );
        list.check_invariants();

        let mut empty: Links<i32> = Links::new();
        assert!(empty.pop_at(-1).is_err());
    }

    #[test]
    fn pop_head_then_push_front_scenario() {
        let mut list: Links<i32> = (0..10).collect();

        let head = list.head().unwrap();
        assert_eq!(list.remove(head), Some(0));
        assert_eq!(list.len(), 9);
        assert_eq!(list.front(), Some(&1));

        let head = list.head().unwrap();
        list.insert_before(head, 99);
        assert_eq!(list.get_at(0), Ok(&99));
        assert_eq!(list.get_at(1), Ok(&1));
        assert_eq!(list.len(), 10);
        list.check_invariants();
    }

    #[test]
    fn remove_middle_by_handle() {
        let mut list = Links::new();
        list.push_back(1);
        let b = list.push_back(2);
        list.push_back(3);

        assert_eq!(list.remove(b), Some(2));
        assert_eq!(items(&list), vec![1, 3]);
        // stale handle is checkable, not dangling
        assert_eq!(list.get(b), None);
        assert_eq!(list.remove(b), None);
        list.check_invariants();
    }

    #[test]
    fn unlink_then_relink() {
        let mut list: Links<i32> = (0..4).collect();
        let l = list.resolve(1).unwrap();

        assert!(list.unlink(l));
        assert_eq!(items(&list), vec![0, 2, 3]);
        assert_eq!(list.len(), 3);
        // detached node keeps its payload and slot
        assert_eq!(list.get(l), Some(&1));
        assert!(!list.unlink(l));
        list.check_invariants();

        list.link_front(l);
        assert_eq!(items(&list), vec![1, 0, 2, 3]);
        list.check_invariants();

        list.unlink(l);
        list.link_back(l);
        assert_eq!(items(&list), vec![0, 2, 3, 1]);

        list.unlink(l);
        let anchor = list.resolve(1).unwrap();
        list.link_after(anchor, l);
        assert_eq!(items(&list), vec![0, 2, 1, 3]);

        list.unlink(l);
        let anchor = list.head().unwrap();
        list.link_before(anchor, l);
        assert_eq!(items(&list), vec![1, 0, 2, 3]);
        list.check_invariants();
    }

    #[test]
    fn unlink_sole_element() {
        let mut list = Links::new();
        let l = list.push_back(7);
        assert!(list.unlink(l));
        assert!(list.is_empty());
        assert_eq!(list.get(l), Some(&7));
        list.link_back(l);
        assert_eq!(items(&list), vec![7]);
        list.check_invariants();
    }

    #[test]
    fn clear_is_idempotent_and_invalidates() {
        let mut list: Links<i32> = (0..3).collect();
        let l = list.head().unwrap();

        list.clear();
        assert!(list.is_empty());
        assert_eq!(list.get(l), None);
        list.check_invariants();

        list.clear();
        assert!(list.is_empty());
        list.check_invariants();

        list.push_back(1);
        assert_eq!(items(&list), vec![1]);
    }

    #[test]
    fn extend_back_orders() {
        let mut list = Links::new();
        list.extend_back([1, 2, 3]);
        list.extend_back(Vec::<i32>::new());
        assert_eq!(items(&list), vec![1, 2, 3]);
        assert_eq!(list.len(), 3);
        list.check_invariants();
    }

    #[test]
    fn extend_front_reverses() {
        let mut list: Links<char> = ['a', 'b'].into_iter().collect();
        list.extend_front(['1', '2', '3']);
        assert_eq!(list.iter().collect::<String>(), "321ab");
        list.check_invariants();
    }

    #[test]
    fn extend_around_anchor() {
        let mut list: Links<i32> = (0..2).collect();
        let anchor = list.resolve(1).unwrap();

        list.extend_after(anchor, [10, 11]);
        assert_eq!(items(&list), vec![0, 1, 10, 11]);

        list.extend_before(anchor, [20, 21]);
        // reverse order: first item closest to the anchor
        assert_eq!(items(&list), vec![0, 21, 20, 1, 10, 11]);
        list.check_invariants();
    }

    #[test]
    fn insert_at_clamps() {
        let mut list: Links<i32> = (0..3).collect();

        list.insert_at(1, [10]);
        assert_eq!(items(&list), vec![0, 10, 1, 2]);

        list.insert_at(100, [11]);
        assert_eq!(items(&list), vec![0, 10, 1, 2, 11]);

        list.insert_at(-100, [12]);
        assert_eq!(items(&list), vec![12, 0, 10, 1, 2, 11]);

        list.insert_at(-1, [13]);
        assert_eq!(items(&list), vec![12, 0, 10, 1, 2, 13, 11]);
        list.check_invariants();

        let mut empty: Links<i32> = Links::new();
        empty.insert_at(0, [1, 2]);
        assert_eq!(items(&empty), vec![1, 2]);
    }

    #[test]
    fn iter_both_directions() {
        let list: Links<i32> = (0..5).collect();

        assert_eq!(items(&list), vec![0, 1, 2, 3, 4]);
        assert_eq!(list.iter().rev().copied().collect::<Vec<_>>(), vec![
            4, 3, 2, 1, 0
        ]);

        // meet in the middle
        let mut it = list.iter();
        assert_eq!(it.next(), Some(&0));
        assert_eq!(it.next_back(), Some(&4));
        assert_eq!(it.next(), Some(&1));
        assert_eq!(it.next_back(), Some(&3));
        assert_eq!(it.next(), Some(&2));
        assert_eq!(it.next(), None);
        assert_eq!(it.next_back(), None);
    }

    #[test]
    fn iter_mut_writes_through() {
        let mut list: Links<i32> = (0..4).collect();
        for item in list.iter_mut() {
            *item *= 10;
        }
        assert_eq!(items(&list), vec![0, 10, 20, 30]);
    }

    #[test]
    fn links_iterator_yields_positions() {
        let list: Links<i32> = (0..4).collect();
        let handles: Vec<_> = list.links().collect();
        assert_eq!(handles.len(), 4);
        for (i, link) in handles.iter().enumerate() {
            assert_eq!(list.get(*link), Some(&(i as i32)));
        }
        let back: Vec<_> = list.links().rev().collect();
        assert_eq!(back.first(), Some(&list.tail().unwrap()));
    }

    #[test]
    fn into_iter_both_ends() {
        let list: Links<i32> = (0..4).collect();
        let mut it = list.into_iter();
        assert_eq!(it.len(), 4);
        assert_eq!(it.next(), Some(0));
        assert_eq!(it.next_back(), Some(3));
        assert_eq!(it.collect::<Vec<_>>(), vec![1, 2]);
    }

    #[test]
    fn equality_is_elementwise() {
        let a: Links<i32> = (0..4).collect();
        let mut b: Links<i32> = (0..4).collect();
        assert_eq!(a, b);

        b.set_at(2, 99).unwrap();
        assert_ne!(a, b);

        let shorter: Links<i32> = (0..3).collect();
        assert_ne!(a, shorter);

        let empty_a: Links<i32> = Links::new();
        let empty_b: Links<i32> = Links::new();
        assert_eq!(empty_a, empty_b);
    }

    #[test]
    fn clone_shares_nothing() {
        let mut a: Links<i32> = (0..4).collect();
        let mut b = a.clone();
        assert_eq!(a, b);

        b.set_at(0, 99).unwrap();
        a.pop_back();
        assert_eq!(items(&a), vec![0, 1, 2]);
        assert_eq!(items(&b), vec![99, 1, 2, 3]);
    }

    #[test]
    fn len_tracks_every_mutation() {
        let mut list: Links<i32> = Links::new();
        assert_eq!(list.len(), 0);
        list.extend_back([1, 2, 3]);
        assert_eq!(list.len(), 3);
        list.push_front(0);
        assert_eq!(list.len(), 4);
        list.pop_at(1).unwrap();
        assert_eq!(list.len(), 3);
        list.insert_at(1, [7, 8]);
        assert_eq!(list.len(), 5);
        let l = list.head().unwrap();
        list.unlink(l);
        assert_eq!(list.len(), 4);
        list.link_back(l);
        assert_eq!(list.len(), 5);
        list.clear();
        assert_eq!(list.len(), 0);
    }

    #[test]
    fn debug_formats_as_list() {
        let list: Links<i32> = (0..3).collect();
        assert_eq!(format!("{list:?}"), "[0, 1, 2]");
    }

    #[test]
    #[should_panic(expected = "stale link")]
    fn insert_after_stale_panics() {
        let mut list: Links<i32> = (0..2).collect();
        let l = list.tail().unwrap();
        list.remove(l);
        list.insert_after(l, 9);
    }
}
