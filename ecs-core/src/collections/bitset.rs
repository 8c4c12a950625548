// Copyright 2025 John Brosnihan
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.
//! Growable bit vector with word-level operations
//!
//! `DynamicBitset` stores bits in 64-bit words and tracks a logical length
//! separately from the word count. Every bit at or beyond `len()` is kept
//! physically clear, which lets `any`/`none`/`count_ones` and the set-bit
//! iterator work a whole word at a time.

use crate::error::{EcsError, Result};
use std::ops::{BitAnd, BitAndAssign};

const WORD_BITS: usize = u64::BITS as usize;

#[inline]
fn words_for(nbits: usize) -> usize {
    (nbits + WORD_BITS - 1) / WORD_BITS
}

/// Growable bit vector
///
/// Probing out of range with [`test`](Self::test) answers `false`, while
/// mutating out of range with [`set`](Self::set) or [`reset`](Self::reset)
/// is an error.
///
/// # Examples
///
/// ```
/// use ecs_core::collections::DynamicBitset;
///
/// let mut bits = DynamicBitset::new(10);
/// bits.set(3).unwrap();
/// assert!(bits.test(3));
/// assert!(!bits.test(100));
/// assert!(bits.set(10).is_err());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DynamicBitset {
    words: Vec<u64>,
    nbits: usize,
}

impl DynamicBitset {
    /// Create a zeroed bitset holding `nbits` bits
    pub fn new(nbits: usize) -> Self {
        DynamicBitset {
            words: vec![0; words_for(nbits)],
            nbits,
        }
    }

    /// Logical number of bits
    pub fn len(&self) -> usize {
        self.nbits
    }

    /// True if the bitset holds zero bits
    pub fn is_empty(&self) -> bool {
        self.nbits == 0
    }

    /// Set bit `index` to 1
    pub fn set(&mut self, index: usize) -> Result<()> {
        self.check(index)?;
        self.words[index / WORD_BITS] |= 1 << (index % WORD_BITS);
        Ok(())
    }

    /// Clear bit `index` to 0
    pub fn reset(&mut self, index: usize) -> Result<()> {
        self.check(index)?;
        self.words[index / WORD_BITS] &= !(1 << (index % WORD_BITS));
        Ok(())
    }

    /// Read bit `index`; anything out of range reads as 0
    #[inline]
    pub fn test(&self, index: usize) -> bool {
        index < self.nbits && self.words[index / WORD_BITS] & (1 << (index % WORD_BITS)) != 0
    }

    /// Grow or shrink to `nbits` bits
    ///
    /// Existing bits below `nbits` are preserved and new bits read as 0.
    pub fn resize(&mut self, nbits: usize) {
        self.words.resize(words_for(nbits), 0);
        self.nbits = nbits;
        self.clear_tail();
    }

    /// Clear every bit without changing the length
    pub fn clear(&mut self) {
        self.words.iter_mut().for_each(|w| *w = 0);
    }

    /// Index of the first set bit
    pub fn ffs(&self) -> Option<usize> {
        self.words
            .iter()
            .enumerate()
            .find(|(_, w)| **w != 0)
            .map(|(i, w)| i * WORD_BITS + w.trailing_zeros() as usize)
    }

    /// True if every bit is set (vacuously true when empty)
    pub fn all(&self) -> bool {
        let full_words = self.nbits / WORD_BITS;
        if self.words[..full_words].iter().any(|w| *w != u64::MAX) {
            return false;
        }
        let tail = self.nbits % WORD_BITS;
        tail == 0 || self.words[full_words] == (1u64 << tail) - 1
    }

    /// True if at least one bit is set
    pub fn any(&self) -> bool {
        self.words.iter().any(|w| *w != 0)
    }

    /// True if no bit is set
    pub fn none(&self) -> bool {
        !self.any()
    }

    /// Number of set bits
    pub fn count_ones(&self) -> usize {
        self.words.iter().map(|w| w.count_ones() as usize).sum()
    }

    /// Iterate the indices of set bits in ascending order
    pub fn iter_ones(&self) -> Ones<'_> {
        Ones {
            words: &self.words,
            word_index: 0,
            current: self.words.first().copied().unwrap_or(0),
        }
    }

    fn check(&self, index: usize) -> Result<()> {
        if index < self.nbits {
            Ok(())
        } else {
            Err(EcsError::IndexOutOfBounds {
                index,
                len: self.nbits,
            })
        }
    }

    // Bits past `nbits` in the last word must stay clear or `all` and the
    // word-level scans would see stale bits after shrink-then-grow.
    fn clear_tail(&mut self) {
        let tail = self.nbits % WORD_BITS;
        if tail != 0 {
            if let Some(last) = self.words.last_mut() {
                *last &= (1u64 << tail) - 1;
            }
        }
    }
}

/// Iterator over set-bit indices, one word at a time
pub struct Ones<'a> {
    words: &'a [u64],
    word_index: usize,
    current: u64,
}

impl<'a> Iterator for Ones<'a> {
    type Item = usize;

    #[inline]
    fn next(&mut self) -> Option<usize> {
        while self.current == 0 {
            self.word_index += 1;
            self.current = *self.words.get(self.word_index)?;
        }
        let bit = self.current.trailing_zeros() as usize;
        // clear lowest set bit
        self.current &= self.current - 1;
        Some(self.word_index * WORD_BITS + bit)
    }
}

impl BitAndAssign<&DynamicBitset> for DynamicBitset {
    /// Intersect in place; the result takes the shorter operand's length
    fn bitand_assign(&mut self, rhs: &DynamicBitset) {
        let nbits = self.nbits.min(rhs.nbits);
        self.resize(nbits);
        for (lhs, rhs) in self.words.iter_mut().zip(&rhs.words) {
            *lhs &= *rhs;
        }
    }
}

impl BitAnd for &DynamicBitset {
    type Output = DynamicBitset;

    fn bitand(self, rhs: &DynamicBitset) -> DynamicBitset {
        let mut out = self.clone();
        out &= rhs;
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fresh_bitset_is_clear() {
        for n in [1, 5, 63, 64, 65, 200] {
            let bits = DynamicBitset::new(n);
            assert!(bits.none());
            assert!(!bits.any());
            assert!(!bits.all(), "size {} should not be all-set", n);
        }
    }

    #[test]
    fn test_empty_bitset_all_is_vacuous() {
        let bits = DynamicBitset::new(0);
        assert!(bits.all());
        assert!(bits.none());
        assert!(bits.is_empty());
    }

    #[test]
    fn test_set_reset_test() {
        let mut bits = DynamicBitset::new(130);
        for i in [0, 1, 63, 64, 127, 129] {
            bits.set(i).unwrap();
            assert!(bits.test(i));
            bits.reset(i).unwrap();
            assert!(!bits.test(i));
        }
    }

    #[test]
    fn test_out_of_range_probe_vs_mutation() {
        let mut bits = DynamicBitset::new(10);
        assert!(!bits.test(10));
        assert!(!bits.test(1_000_000));
        assert!(matches!(
            bits.set(10),
            Err(EcsError::IndexOutOfBounds { index: 10, len: 10 })
        ));
        assert!(bits.reset(64).is_err());
    }

    #[test]
    fn test_shrink_then_grow_inside_word_clears_stale_bits() {
        let mut bits = DynamicBitset::new(40);
        for i in 0..40 {
            bits.set(i).unwrap();
        }
        bits.resize(10);
        bits.resize(40);
        for i in 0..10 {
            assert!(bits.test(i));
        }
        for i in 10..40 {
            assert!(!bits.test(i), "bit {} resurrected", i);
        }
        assert_eq!(bits.count_ones(), 10);
    }

    #[test]
    fn test_all_ignores_unused_high_bits() {
        let mut bits = DynamicBitset::new(3);
        for i in 0..3 {
            bits.set(i).unwrap();
        }
        assert!(bits.all());

        bits.resize(70);
        assert!(!bits.all());
        for i in 3..70 {
            bits.set(i).unwrap();
        }
        assert!(bits.all());
    }

    #[test]
    fn test_ffs() {
        let mut bits = DynamicBitset::new(200);
        assert_eq!(bits.ffs(), None);
        bits.set(150).unwrap();
        assert_eq!(bits.ffs(), Some(150));
        bits.set(64).unwrap();
        assert_eq!(bits.ffs(), Some(64));
        bits.set(0).unwrap();
        assert_eq!(bits.ffs(), Some(0));
    }

    #[test]
    fn test_intersection_truncates_to_shorter() {
        let mut a = DynamicBitset::new(100);
        let mut b = DynamicBitset::new(20);
        for i in [1, 5, 19, 80] {
            a.set(i).unwrap();
        }
        for i in [5, 19] {
            b.set(i).unwrap();
        }
        let c = &a & &b;
        assert_eq!(c.len(), 20);
        assert_eq!(c.iter_ones().collect::<Vec<_>>(), vec![5, 19]);

        a &= &b;
        assert_eq!(a, c);
    }

    #[test]
    fn test_iter_ones_crosses_words() {
        let mut bits = DynamicBitset::new(300);
        let expected = vec![0, 63, 64, 65, 128, 299];
        for &i in &expected {
            bits.set(i).unwrap();
        }
        assert_eq!(bits.iter_ones().collect::<Vec<_>>(), expected);
        assert_eq!(DynamicBitset::new(0).iter_ones().count(), 0);
    }
}
