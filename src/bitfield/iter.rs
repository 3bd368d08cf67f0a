// Copyright 2019-2025 ChainSafe Systems
// SPDX-License-Identifier: Apache-2.0, MIT

use std::{
    iter::{self, FusedIterator},
    ops::Range,
};

/// A trait for iterators over `Range<u64>`.
///
/// Requirements:
/// - all ranges are non-empty
/// - the ranges are in ascending order
/// - no two ranges overlap or touch
/// - the iterator must be fused, i.e. once it has returned `None`, it must keep returning `None`
pub trait RangeIterator: FusedIterator<Item = Range<u64>> + Sized {
    /// Returns a new `RangeIterator` over the bits that are in `self`, in `other`, or in both.
    fn union<R: RangeIterator>(self, other: R) -> Union<Self, R> {
        Union {
            a_iter: self,
            b_iter: other,
            a_range: None,
            b_range: None,
        }
    }

    /// Returns a new `RangeIterator` over the bits that are in both `self` and `other`.
    fn intersection<R: RangeIterator>(self, other: R) -> Intersection<Self, R> {
        Intersection {
            a_iter: self,
            b_iter: other,
            a_range: None,
            b_range: None,
        }
    }

    /// Returns a new `RangeIterator` over the bits that are in `self` but not in `other`.
    fn difference<R: RangeIterator>(self, other: R) -> Difference<Self, R> {
        Difference {
            a_iter: self,
            b_iter: other,
            a_range: None,
            b_range: None,
        }
    }
}

/// A `RangeIterator` over the bits that represent the union of two other `RangeIterator`s.
pub struct Union<A, B> {
    a_iter: A,
    b_iter: B,
    a_range: Option<Range<u64>>,
    b_range: Option<Range<u64>>,
}

impl<A: RangeIterator, B: RangeIterator> Iterator for Union<A, B> {
    type Item = Range<u64>;

    fn next(&mut self) -> Option<Self::Item> {
        let (mut a, mut b) = match (
            self.a_range.take().or_else(|| self.a_iter.next()),
            self.b_range.take().or_else(|| self.b_iter.next()),
        ) {
            (Some(a), Some(b)) => (a, b),
            (a, b) => return a.or(b),
        };

        loop {
            if a.start <= b.start {
                if a.end < b.start {
                    // a: -xxx-----
                    // b: -----xxx-

                    self.b_range = Some(b);
                    return Some(a);
                } else if a.end < b.end {
                    // a: -?xxx---
                    // b: --xxxxx-

                    // resize `b` to the union of `a` and `b`, but don't return it
                    // yet because it might overlap with another range in `a_iter`
                    b.start = a.start;
                    match self.a_iter.next() {
                        Some(range) => a = range,
                        None => return Some(b),
                    }
                } else {
                    // a: -?xxx?-
                    // b: --xxx--

                    match self.b_iter.next() {
                        Some(range) => b = range,
                        None => return Some(a),
                    }
                }
            } else {
                // the union operator is symmetric, so this is exactly
                // the same as above but with `a` and `b` swapped

                if b.end < a.start {
                    self.a_range = Some(a);
                    return Some(b);
                } else if b.end < a.end {
                    a.start = b.start;
                    match self.b_iter.next() {
                        Some(range) => b = range,
                        None => return Some(a),
                    }
                } else {
                    match self.a_iter.next() {
                        Some(range) => a = range,
                        None => return Some(b),
                    }
                }
            }
        }
    }
}

impl<A: RangeIterator, B: RangeIterator> FusedIterator for Union<A, B> {}
impl<A: RangeIterator, B: RangeIterator> RangeIterator for Union<A, B> {}

/// A `RangeIterator` over the bits that represent the intersection of two other `RangeIterator`s.
pub struct Intersection<A, B> {
    a_iter: A,
    b_iter: B,
    a_range: Option<Range<u64>>,
    b_range: Option<Range<u64>>,
}

impl<A: RangeIterator, B: RangeIterator> Iterator for Intersection<A, B> {
    type Item = Range<u64>;

    fn next(&mut self) -> Option<Self::Item> {
        let (mut a, mut b) = match (
            self.a_range.take().or_else(|| self.a_iter.next()),
            self.b_range.take().or_else(|| self.b_iter.next()),
        ) {
            (Some(a), Some(b)) => (a, b),
            _ => return None,
        };

        loop {
            if a.start <= b.start {
                if a.end <= b.start {
                    // a: -xxx-----
                    // b: -----xxx-

                    a = self.a_iter.next()?;
                } else if a.end < b.end {
                    // a: -?xxx---
                    // b: --xxxxx-

                    let intersection = b.start..a.end;
                    self.b_range = Some(b);
                    return Some(intersection);
                } else {
                    // a: -?xxx?-
                    // b: --xxx--

                    self.a_range = Some(a);
                    return Some(b);
                }
            } else {
                // the intersection operator is symmetric, so this is exactly
                // the same as above but with `a` and `b` swapped

                if b.end <= a.start {
                    b = self.b_iter.next()?;
                } else if b.end < a.end {
                    let intersection = a.start..b.end;
                    self.a_range = Some(a);
                    return Some(intersection);
                } else {
                    self.b_range = Some(b);
                    return Some(a);
                }
            }
        }
    }
}

impl<A: RangeIterator, B: RangeIterator> FusedIterator for Intersection<A, B> {}
impl<A: RangeIterator, B: RangeIterator> RangeIterator for Intersection<A, B> {}

/// A `RangeIterator` over the bits that represent the difference between two other `RangeIterator`s.
pub struct Difference<A, B> {
    a_iter: A,
    b_iter: B,
    a_range: Option<Range<u64>>,
    b_range: Option<Range<u64>>,
}

impl<A: RangeIterator, B: RangeIterator> Iterator for Difference<A, B> {
    type Item = Range<u64>;

    fn next(&mut self) -> Option<Self::Item> {
        let (mut a, mut b) = match (
            self.a_range.take().or_else(|| self.a_iter.next()),
            self.b_range.take().or_else(|| self.b_iter.next()),
        ) {
            (Some(a), Some(b)) => (a, b),
            (a, _) => return a,
        };

        loop {
            if a.start < b.start {
                if a.end <= b.start {
                    // a: -xxx----
                    // b: ----xxx-

                    self.b_range = Some(b);
                    return Some(a);
                } else if b.end < a.end {
                    // a: -xxxxxxx-
                    // b: ---xxx---

                    self.a_range = Some(b.end..a.end);
                    return Some(a.start..b.start);
                } else {
                    // a: -xxxx---
                    // b: ---xx?--

                    let difference = a.start..b.start;
                    self.b_range = Some(b);
                    return Some(difference);
                }
            } else {
                // b.start <= a.start

                if b.end <= a.start {
                    // a: ----xxx-
                    // b: -xxx----

                    match self.b_iter.next() {
                        Some(range) => b = range,
                        None => return Some(a),
                    }
                } else if a.end <= b.end {
                    // a: --xxx--
                    // b: -?xxx?-

                    a = self.a_iter.next()?;
                } else {
                    // a: --xxxxx-
                    // b: -?xxx---

                    a.start = b.end;
                    match self.b_iter.next() {
                        Some(range) => b = range,
                        None => return Some(a),
                    }
                }
            }
        }
    }
}

impl<A: RangeIterator, B: RangeIterator> FusedIterator for Difference<A, B> {}
impl<A: RangeIterator, B: RangeIterator> RangeIterator for Difference<A, B> {}

/// A `RangeIterator` that wraps a regular iterator over `Range<u64>` as a way to explicitly
/// indicate that this iterator satisfies the requirements of the `RangeIterator` trait.
pub struct Ranges<I>(I);

impl<I> Ranges<I>
where
    I: Iterator<Item = Range<u64>>,
{
    /// Creates a new `Ranges` instance.
    pub fn new<II>(iter: II) -> Self
    where
        II: IntoIterator<IntoIter = I, Item = Range<u64>>,
    {
        Self(iter.into_iter())
    }
}

impl<I> Iterator for Ranges<I>
where
    I: Iterator<Item = Range<u64>>,
{
    type Item = Range<u64>;

    fn next(&mut self) -> Option<Self::Item> {
        self.0.next()
    }
}

impl<I> FusedIterator for Ranges<I> where I: Iterator<Item = Range<u64>> {}
impl<I> RangeIterator for Ranges<I> where I: Iterator<Item = Range<u64>> {}

/// Returns a `RangeIterator` which ranges contain the values from the provided iterator.
/// The values need to be in ascending order.
pub fn ranges_from_bits(bits: impl IntoIterator<Item = u64>) -> impl RangeIterator {
    let mut iter = bits.into_iter().peekable();

    Ranges::new(iter::from_fn(move || {
        let start = iter.next()?;
        let mut end = start + 1;
        while iter.peek() == Some(&end) {
            end += 1;
            iter.next();
        }
        Some(start..end)
    }))
}
