//! Slice addressing and the slice read/write operations.
//!
//! A [`Slice`] names a span of the chain either by integer bounds (with
//! ordered-sequence clamping, negative indices, and negative steps) or
//! relative to a held [`Link`] (stop expressed as travel distance).
//! Both forms normalize to the same `(anchor, travel, step)` triple and
//! share one traversal core, so reads and writes agree on exactly which
//! links a slice covers.
//!
//! # Example
//!
//! ```
//! use linkslice::{Links, Slice};
//!
//! let mut list: Links<i32> = (0..6).collect();
//!
//! let evens = list.slice(Slice::index(None, None, 2)).unwrap();
//! assert_eq!(evens.iter().copied().collect::<Vec<_>>(), vec![0, 2, 4]);
//!
//! // unequal-length replacement for unit steps, like l[1:3] = [9, 8, 7]
//! list.set_slice(Slice::index(1, 3, None), [9, 8, 7]).unwrap();
//! assert_eq!(list.iter().copied().collect::<Vec<_>>(), vec![0, 9, 8, 7, 3, 4, 5]);
//! ```

use crate::links::{Link, Links, NONE};
use crate::SliceError;

/// A span of the chain, addressed by index bounds or relative to a link.
///
/// Build with [`Slice::index`], [`Slice::link`], or [`Slice::full`].
/// `None` bounds mean "from the relevant end", exactly as in
/// ordered-sequence slicing.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Slice {
    /// Integer bounds with clamping: out-of-range bounds saturate, they
    /// never error. `step` defaults to `1`.
    Index {
        /// First index of the span; negative counts from the back.
        start: Option<isize>,
        /// Exclusive stop index; negative counts from the back.
        stop: Option<isize>,
        /// Stride between taken links; negative walks backward.
        step: Option<isize>,
    },
    /// Bounds relative to a held link. The link does not know its own
    /// integer index, so no O(n) position lookup happens: the span
    /// starts *at* the link and covers `travel` chain steps from it.
    Link {
        /// The link the span starts at.
        start: Link,
        /// Signed chain distance covered; `None` means the rest of the
        /// chain, forward.
        travel: Option<isize>,
        /// Stride; `None` means `1` in the direction of `travel`.
        step: Option<isize>,
    },
}

impl Slice {
    /// Index-addressed slice, `list[start:stop:step]` in ordered-sequence
    /// notation. Pass `None` for an open bound.
    pub fn index(
        start: impl Into<Option<isize>>,
        stop: impl Into<Option<isize>>,
        step: impl Into<Option<isize>>,
    ) -> Self {
        Slice::Index {
            start: start.into(),
            stop: stop.into(),
            step: step.into(),
        }
    }

    /// Link-anchored slice: `travel` chain steps starting at `start`,
    /// taking every `step`-th link.
    pub fn link(
        start: Link,
        travel: impl Into<Option<isize>>,
        step: impl Into<Option<isize>>,
    ) -> Self {
        Slice::Link {
            start,
            travel: travel.into(),
            step: step.into(),
        }
    }

    /// The whole chain, front to back. `list[:]`.
    pub fn full() -> Self {
        Slice::Index {
            start: None,
            stop: None,
            step: None,
        }
    }
}

/// Resolves index bounds against `len` with ordered-sequence clamping.
///
/// For a positive step the effective range is `[0, len]`; for a negative
/// step it is `[-1, len - 1]`, where `-1` (one before the head) and
/// `len` (one past the tail) are the exclusive stop positions. Negative
/// bounds have `len` added before clamping. Never fails.
pub(crate) fn indices(
    start: Option<isize>,
    stop: Option<isize>,
    step: isize,
    len: usize,
) -> (isize, isize) {
    debug_assert!(step != 0);
    let len = len as isize;
    let (lower, upper) = if step > 0 { (0, len) } else { (-1, len - 1) };
    let resolve = |bound: Option<isize>, default: isize| match bound {
        None => default,
        Some(mut b) => {
            if b < 0 {
                b += len;
            }
            b.clamp(lower, upper)
        }
    };
    if step > 0 {
        (resolve(start, lower), resolve(stop, upper))
    } else {
        (resolve(start, upper), resolve(stop, lower))
    }
}

/// Normalized slice traversal: yields the anchor, then every `step`-th
/// link until the travel budget or the chain runs out.
pub(crate) struct Walk {
    cur: usize,
    /// The anchor slot as normalized, kept even after the walk moves on;
    /// empty-span assignment splices relative to it.
    anchor: usize,
    travelled: isize,
    travel: isize,
    step: isize,
}

impl Walk {
    fn new(anchor: usize, travel: isize, step: isize) -> Self {
        debug_assert!(step != 0);
        let empty = anchor == NONE || travel == 0 || (travel > 0) != (step > 0);
        Walk {
            cur: if empty { NONE } else { anchor },
            anchor,
            travelled: 0,
            travel,
            step,
        }
    }

    /// Yields the next covered link. Chain overrun ends the walk
    /// silently; it is not an error.
    fn next<T>(&mut self, links: &Links<T>) -> Option<Link> {
        if self.cur == NONE {
            return None;
        }
        let out = self.cur;
        self.travelled += self.step;
        if self.travelled.abs() >= self.travel.abs() {
            self.cur = NONE;
        } else {
            self.cur = links.advance(self.cur, self.step.unsigned_abs(), self.step > 0);
        }
        Some(Link(out))
    }
}

impl<T> Links<T> {
    /// Normalizes a slice to a traversal over this chain.
    ///
    /// A start that clamps past an end, a stale anchor handle, a zero
    /// travel, or a step opposing the travel direction all normalize to
    /// an empty walk. Only a zero step is an error.
    pub(crate) fn normalize(&self, s: Slice) -> Result<Walk, SliceError> {
        match s {
            Slice::Index { start, stop, step } => {
                let step = step.unwrap_or(1);
                if step == 0 {
                    return Err(SliceError::ZeroStep);
                }
                let (start, stop) = indices(start, stop, step, self.len);
                let anchor = if start >= 0 && (start as usize) < self.len {
                    self.seek(start as usize)
                } else {
                    NONE
                };
                Ok(Walk::new(anchor, stop - start, step))
            }
            Slice::Link { start, travel, step } => {
                let travel = travel.unwrap_or(self.len as isize);
                let step = match step {
                    Some(0) => return Err(SliceError::ZeroStep),
                    Some(s) => s,
                    None => {
                        if travel < 0 {
                            -1
                        } else {
                            1
                        }
                    }
                };
                let anchor = if self.contains(start) { start.0 } else { NONE };
                Ok(Walk::new(anchor, travel, step))
            }
        }
    }

    /// Copies the covered span into a fresh list.
    ///
    /// The result owns its own arena; it shares no slots with `self`,
    /// and handles are not portable between the two.
    ///
    /// # Errors
    ///
    /// Returns [`SliceError::ZeroStep`] for a zero step. An empty span
    /// is an empty result, not an error.
    pub fn slice(&self, s: Slice) -> Result<Links<T>, SliceError>
    where
        T: Clone,
    {
        let mut walk = self.normalize(s)?;
        let mut out = Links::new();
        while let Some(link) = walk.next(self) {
            out.push_back(self.arena[link.0].item.clone());
        }
        Ok(out)
    }

    /// Replaces the covered span with `items`.
    ///
    /// For a unit step (`1` or `-1`) the lengths may differ, exactly as
    /// in ordered-sequence slice assignment: covered links are
    /// overwritten in lock step, leftover items are spliced in at the
    /// position the walk reached, leftover links are removed. A backward
    /// unit step mirrors the forward case; a backward traversal of the
    /// result reads the replacement in production order.
    ///
    /// For an extended step (`|step| >= 2`) the replacement must match
    /// the span exactly; on mismatch nothing is modified.
    ///
    /// # Errors
    ///
    /// Returns [`SliceError::ZeroStep`] for a zero step, or
    /// [`SliceError::LengthMismatch`] for an unequal extended-step
    /// replacement.
    pub fn set_slice<I>(&mut self, s: Slice, items: I) -> Result<(), SliceError>
    where
        I: IntoIterator<Item = T>,
    {
        let mut walk = self.normalize(s)?;
        let mut items = items.into_iter();

        if walk.step.abs() != 1 {
            // Extended stride: validate fully before the first write.
            let mut span = Vec::new();
            while let Some(link) = walk.next(self) {
                span.push(link);
            }
            let items: Vec<T> = items.collect();
            if span.len() != items.len() {
                return Err(SliceError::LengthMismatch {
                    span: span.len(),
                    items: items.len(),
                });
            }
            for (link, item) in span.into_iter().zip(items) {
                self.arena[link.0].item = item;
            }
            return Ok(());
        }

        // Unit stride: lock-step overwrite. Pull the item first so a
        // shorter replacement never consumes a span link it won't fill.
        let mut last_written = NONE;
        loop {
            let Some(item) = items.next() else {
                // Replacement exhausted: drop the rest of the span.
                let mut leftover = Vec::new();
                while let Some(link) = walk.next(self) {
                    leftover.push(link);
                }
                for link in leftover {
                    self.remove(link);
                }
                return Ok(());
            };
            match walk.next(self) {
                Some(link) => {
                    self.arena[link.0].item = item;
                    last_written = link.0;
                }
                None => {
                    // Span exhausted: splice the rest at the position
                    // the walk reached.
                    let rest = std::iter::once(item).chain(items);
                    self.splice_leftover(rest, walk.step, last_written, walk.anchor);
                    return Ok(());
                }
            }
        }
    }

    /// Splices leftover replacement items once the span has run out.
    ///
    /// Forward: in order after the last written link, or before the
    /// anchor for an empty span, or at the back with no anchor.
    /// Backward: the mirror image, reversed so that a backward read
    /// from the span start sees production order.
    fn splice_leftover<I>(&mut self, rest: I, step: isize, last_written: usize, anchor: usize)
    where
        I: IntoIterator<Item = T>,
    {
        let forward = step > 0;
        let (prev, next) = if last_written != NONE {
            let node = &self.arena[last_written];
            if forward {
                (last_written, node.next)
            } else {
                (node.prev, last_written)
            }
        } else if anchor != NONE {
            let node = &self.arena[anchor];
            if forward {
                (node.prev, anchor)
            } else {
                (anchor, node.next)
            }
        } else if forward {
            (self.tail, NONE)
        } else {
            (NONE, self.head)
        };
        if let Some((first, last, count)) = self.build_chain(rest, !forward) {
            self.splice(prev, next, first, last, count);
        }
    }
}
