// Copyright 2019-2025 ChainSafe Systems
// SPDX-License-Identifier: Apache-2.0, MIT

//! Compact sets of non-negative integers, represented as sorted runs of set
//! bits and serialized as RLE+. This is the representation used for sector
//! number sets both inside actor state and inside decoded message parameters,
//! so values from either source interoperate directly.

mod iter;
pub mod rleplus;

pub use iter::{RangeIterator, Ranges, ranges_from_bits};

use std::ops::{BitAnd, BitOr, Range, Sub};

/// A sparse set of `u64` values, held as disjoint, ascending, non-touching
/// ranges. Set operations run in time proportional to the number of runs, not
/// to the largest element.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct BitField {
    ranges: Vec<Range<u64>>,
}

/// Creates a [`BitField`] from a sequence of 0/1 literals, e.g.
/// `bitfield![1, 0, 1, 1]` is the set `{0, 2, 3}`.
#[macro_export]
macro_rules! bitfield {
    ($($val:literal),* $(,)?) => {
        $crate::bitfield::BitField::from_bits(
            [$($val != 0),*]
                .into_iter()
                .enumerate()
                .filter(|&(_, b): &(usize, bool)| b)
                .map(|(i, _)| i as u64),
        )
    };
}

impl BitField {
    /// Creates an empty bitfield.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a bitfield from an ascending sequence of distinct bits.
    pub fn from_bits(bits: impl IntoIterator<Item = u64>) -> Self {
        Self::from_ranges(ranges_from_bits(bits))
    }

    /// Creates a bitfield from a `RangeIterator`.
    pub fn from_ranges(iter: impl RangeIterator) -> Self {
        Self {
            ranges: iter.collect(),
        }
    }

    /// Returns a `RangeIterator` over the ranges of set bits.
    pub fn ranges(&self) -> Ranges<impl Iterator<Item = Range<u64>> + '_> {
        Ranges::new(self.ranges.iter().cloned())
    }

    /// Returns an ascending iterator over the set bits. The iterator is lazy
    /// and can be restarted by calling `iter` again.
    pub fn iter(&self) -> impl Iterator<Item = u64> + '_ {
        self.ranges.iter().flat_map(Clone::clone)
    }

    /// Returns `true` if the given bit is set.
    pub fn get(&self, bit: u64) -> bool {
        let i = self.ranges.partition_point(|range| range.end <= bit);
        self.ranges.get(i).is_some_and(|range| range.start <= bit)
    }

    /// Sets the given bit.
    pub fn set(&mut self, bit: u64) {
        let single = Self {
            ranges: vec![bit..bit + 1],
        };
        *self = &*self | &single;
    }

    /// Returns the number of set bits.
    pub fn len(&self) -> u64 {
        self.ranges.iter().map(|range| range.end - range.start).sum()
    }

    /// Returns `true` if no bits are set.
    pub fn is_empty(&self) -> bool {
        self.ranges.is_empty()
    }

    /// Creates a bitfield that is the union of the given bitfields.
    pub fn union<'a>(bitfields: impl IntoIterator<Item = &'a Self>) -> Self {
        bitfields.into_iter().fold(Self::new(), |acc, bf| &acc | bf)
    }
}

impl FromIterator<u64> for BitField {
    fn from_iter<I: IntoIterator<Item = u64>>(iter: I) -> Self {
        let mut bits: Vec<_> = iter.into_iter().collect();
        bits.sort_unstable();
        bits.dedup();
        Self::from_bits(bits)
    }
}

impl Sub for &BitField {
    type Output = BitField;

    fn sub(self, rhs: Self) -> Self::Output {
        BitField::from_ranges(self.ranges().difference(rhs.ranges()))
    }
}

impl BitOr for &BitField {
    type Output = BitField;

    fn bitor(self, rhs: Self) -> Self::Output {
        BitField::from_ranges(self.ranges().union(rhs.ranges()))
    }
}

impl BitAnd for &BitField {
    type Output = BitField;

    fn bitand(self, rhs: Self) -> Self::Output {
        BitField::from_ranges(self.ranges().intersection(rhs.ranges()))
    }
}

#[cfg(test)]
mod tests {
    use super::BitField;
    use quickcheck_macros::quickcheck;

    fn bf(bits: &[u64]) -> BitField {
        bits.iter().copied().collect()
    }

    #[test]
    fn difference() {
        assert_eq!(&bf(&[1, 2, 3]) - &bf(&[2]), bf(&[1, 3]));
        assert_eq!(&bf(&[1, 2, 3]) - &bf(&[1, 2, 3]), bf(&[]));
        assert_eq!(&bf(&[]) - &bf(&[1]), bf(&[]));
        assert_eq!(&bf(&[0, 4, 7]) - &bf(&[1, 3, 9]), bf(&[0, 4, 7]));
    }

    #[test]
    fn difference_does_not_mutate_operands() {
        let a = bf(&[1, 2, 3]);
        let b = bf(&[2]);
        let _ = &a - &b;
        assert_eq!(a, bf(&[1, 2, 3]));
        assert_eq!(b, bf(&[2]));
    }

    #[test]
    fn iteration_is_ascending_and_restartable() {
        let a = bf(&[5, 1, 9, 3]);
        assert_eq!(a.iter().collect::<Vec<_>>(), vec![1, 3, 5, 9]);
        // a second pass yields the same sequence
        assert_eq!(a.iter().collect::<Vec<_>>(), vec![1, 3, 5, 9]);
    }

    #[test]
    fn callback_errors_abort_iteration() {
        let a = bf(&[1, 2, 3, 4]);
        let mut seen = Vec::new();
        let res: Result<(), &str> = a.iter().try_for_each(|bit| {
            if bit > 2 {
                return Err("too big");
            }
            seen.push(bit);
            Ok(())
        });
        assert_eq!(res, Err("too big"));
        assert_eq!(seen, vec![1, 2]);
    }

    #[test]
    fn get_and_set() {
        let mut a = bf(&[2, 3]);
        assert!(!a.get(1));
        assert!(a.get(2));
        a.set(1);
        assert!(a.get(1));
        assert_eq!(a, bf(&[1, 2, 3]));
        assert_eq!(a.len(), 3);
    }

    #[test]
    fn union_of_many() {
        let parts = [bf(&[1]), bf(&[2, 10]), bf(&[])];
        assert_eq!(BitField::union(&parts), bf(&[1, 2, 10]));
    }

    #[quickcheck]
    fn difference_identities(a: Vec<u32>, b: Vec<u32>) {
        let a: BitField = a.into_iter().map(u64::from).collect();
        let b: BitField = b.into_iter().map(u64::from).collect();
        let diff = &a - &b;
        assert!((&diff & &b).is_empty());
        assert_eq!(&diff | &(&a & &b), a);
    }

    #[test]
    fn bitfield_macro() {
        assert_eq!(bitfield![1, 0, 1, 1], bf(&[0, 2, 3]));
        assert_eq!(bitfield![], bf(&[]));
    }
}
