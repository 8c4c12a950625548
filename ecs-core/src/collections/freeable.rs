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
//! Vector with a bitset-backed freelist
//!
//! Erasing leaves a hole whose index is recorded in an inverted bitset
//! (1 = free). The next insert fills the lowest hole before appending, so
//! indices handed out stay valid in type until erased and storage is
//! recycled instead of reallocated.

use crate::collections::DynamicBitset;
use crate::error::{EcsError, Result};

/// Dense vector with O(1) erase-by-index and hole reuse on insert
///
/// # Examples
///
/// ```
/// use ecs_core::collections::FreeableVector;
///
/// let mut v = FreeableVector::new();
/// let a = v.insert("a");
/// let b = v.insert("b");
/// v.erase(a).unwrap();
/// assert_eq!(v.insert("c"), a);
/// assert_eq!(*v.at(b).unwrap(), "b");
/// ```
#[derive(Debug, Clone)]
pub struct FreeableVector<T> {
    values: Vec<Option<T>>,
    free: DynamicBitset,
}

impl<T> FreeableVector<T> {
    /// Create an empty vector
    pub fn new() -> Self {
        Self::with_capacity(0)
    }

    /// Create an empty vector with room for `capacity` values
    pub fn with_capacity(capacity: usize) -> Self {
        FreeableVector {
            values: Vec::with_capacity(capacity),
            free: DynamicBitset::new(0),
        }
    }

    /// Store `value`, reusing the lowest free index if there is one
    pub fn insert(&mut self, value: T) -> usize {
        match self.free.ffs() {
            Some(index) => {
                debug_assert!(self.values[index].is_none());
                self.values[index] = Some(value);
                // ffs only returns in-range indices
                let _ = self.free.reset(index);
                index
            }
            None => {
                self.values.push(Some(value));
                self.free.resize(self.values.len());
                self.values.len() - 1
            }
        }
    }

    /// Free `index`, returning the value it held
    ///
    /// Erasing an index that is already free, or was never handed out, is
    /// an error.
    pub fn erase(&mut self, index: usize) -> Result<T> {
        let value = self
            .values
            .get_mut(index)
            .ok_or(EcsError::IndexOutOfBounds {
                index,
                len: self.free.len(),
            })?
            .take()
            .ok_or(EcsError::SlotFree { index })?;
        self.free.set(index)?;
        Ok(value)
    }

    /// Borrow the value at `index`
    pub fn at(&self, index: usize) -> Result<&T> {
        match self.values.get(index) {
            Some(Some(value)) => Ok(value),
            Some(None) => Err(EcsError::SlotFree { index }),
            None => Err(EcsError::IndexOutOfBounds {
                index,
                len: self.values.len(),
            }),
        }
    }

    /// Mutably borrow the value at `index`
    pub fn at_mut(&mut self, index: usize) -> Result<&mut T> {
        let len = self.values.len();
        match self.values.get_mut(index) {
            Some(Some(value)) => Ok(value),
            Some(None) => Err(EcsError::SlotFree { index }),
            None => Err(EcsError::IndexOutOfBounds { index, len }),
        }
    }

    /// True if `index` is a hole waiting for reuse
    pub fn is_free(&self, index: usize) -> bool {
        self.free.test(index)
    }

    /// Number of live values
    pub fn len(&self) -> usize {
        self.values.len() - self.free.count_ones()
    }

    /// True if no value is live
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of indices handed out so far, live or free
    pub fn slots(&self) -> usize {
        self.values.len()
    }

    /// Drop every value and forget all indices
    pub fn clear(&mut self) {
        self.values.clear();
        self.free.resize(0);
    }

    /// Iterate live `(index, value)` pairs in index order
    pub fn iter(&self) -> impl Iterator<Item = (usize, &T)> + '_ {
        self.values
            .iter()
            .enumerate()
            .filter_map(|(i, v)| v.as_ref().map(|v| (i, v)))
    }

    /// Iterate live `(index, value)` pairs mutably
    pub fn iter_mut(&mut self) -> impl Iterator<Item = (usize, &mut T)> + '_ {
        self.values
            .iter_mut()
            .enumerate()
            .filter_map(|(i, v)| v.as_mut().map(|v| (i, v)))
    }

    pub(crate) fn raw(&self) -> &[Option<T>] {
        &self.values
    }

    pub(crate) fn raw_mut(&mut self) -> &mut [Option<T>] {
        &mut self.values
    }
}

impl<T> Default for FreeableVector<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> std::ops::Index<usize> for FreeableVector<T> {
    type Output = T;

    /// Panics if `index` is free or was never handed out
    fn index(&self, index: usize) -> &T {
        match self.values[index] {
            Some(ref value) => value,
            None => panic!("freeable vector slot {} is free", index),
        }
    }
}

impl<T> std::ops::IndexMut<usize> for FreeableVector<T> {
    fn index_mut(&mut self, index: usize) -> &mut T {
        match self.values[index] {
            Some(ref mut value) => value,
            None => panic!("freeable vector slot {} is free", index),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_appends_when_no_holes() {
        let mut v = FreeableVector::new();
        assert_eq!(v.insert(10), 0);
        assert_eq!(v.insert(20), 1);
        assert_eq!(v.insert(30), 2);
        assert_eq!(v.len(), 3);
        assert_eq!(v.slots(), 3);
    }

    #[test]
    fn test_insert_reuses_lowest_hole() {
        let mut v = FreeableVector::new();
        for i in 0..5 {
            v.insert(i);
        }
        assert_eq!(v.erase(3).unwrap(), 3);
        assert_eq!(v.erase(1).unwrap(), 1);
        assert_eq!(v.len(), 3);

        assert_eq!(v.insert(100), 1);
        assert_eq!(v.insert(200), 3);
        assert_eq!(v.insert(300), 5);
        assert_eq!(v.slots(), 6);
    }

    #[test]
    fn test_at_on_free_slot_fails() {
        let mut v = FreeableVector::new();
        let i = v.insert('x');
        v.erase(i).unwrap();
        assert!(matches!(v.at(i), Err(EcsError::SlotFree { index: 0 })));
        assert!(matches!(
            v.at(7),
            Err(EcsError::IndexOutOfBounds { index: 7, .. })
        ));
        assert!(v.is_free(i));
    }

    #[test]
    fn test_double_erase_is_an_error() {
        let mut v = FreeableVector::new();
        let i = v.insert(1u8);
        v.erase(i).unwrap();
        assert!(matches!(v.erase(i), Err(EcsError::SlotFree { .. })));
        assert!(v.erase(42).is_err());
    }

    #[test]
    fn test_iter_skips_holes() {
        let mut v = FreeableVector::new();
        for i in 0..6 {
            v.insert(i * 10);
        }
        v.erase(0).unwrap();
        v.erase(4).unwrap();
        let live: Vec<_> = v.iter().map(|(i, x)| (i, *x)).collect();
        assert_eq!(live, vec![(1, 10), (2, 20), (3, 30), (5, 50)]);

        for (_, x) in v.iter_mut() {
            *x += 1;
        }
        assert_eq!(v[5], 51);
        assert_eq!(*v.at_mut(2).unwrap(), 21);
    }

    #[test]
    fn test_clear() {
        let mut v = FreeableVector::new();
        v.insert(1);
        v.insert(2);
        v.erase(0).unwrap();
        v.clear();
        assert!(v.is_empty());
        assert_eq!(v.insert(9), 0);
    }
}
