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
//! Sparse set of entities
//!
//! An [`EntitySet`] is a presence bitset over slots plus the generation
//! recorded for each present slot. Membership needs both the presence bit
//! and a matching generation, so a stale handle for a recycled slot is
//! never reported as a member.
//!
//! # Intersection
//!
//! `a & b` runs in two passes: the presence bitsets are ANDed word by
//! word, then every surviving slot whose recorded generations differ
//! between `a` and `b` is cleared. Two sets can both hold slot K for
//! different incarnations of the entity; such a pair is not a match.

use crate::collections::{DynamicBitset, Ones};
use crate::ecs::Entity;
use crate::error::Result;
use std::ops::{BitAnd, BitAndAssign};

/// Set of entities keyed by slot and validated by generation
///
/// # Examples
///
/// ```
/// use ecs_core::{Entity, EntitySet};
///
/// let mut a = EntitySet::new();
/// a.insert(Entity::new(0, 0));
/// a.insert(Entity::new(1, 0));
///
/// let mut b = EntitySet::new();
/// b.insert(Entity::new(1, 0));
///
/// let both: Vec<Entity> = (&a & &b).iter().collect();
/// assert_eq!(both, vec![Entity::new(1, 0)]);
/// ```
#[derive(Debug, Clone, Default)]
pub struct EntitySet {
    presence: DynamicBitset,
    generations: Vec<u32>,
}

impl EntitySet {
    /// Create an empty set
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty set with room for slots `0..slots`
    pub fn with_capacity(slots: usize) -> Self {
        EntitySet {
            presence: DynamicBitset::new(slots),
            generations: vec![0; slots],
        }
    }

    /// Add `entity`, overwriting whatever generation its slot recorded
    pub fn insert(&mut self, entity: Entity) {
        let slot = entity.slot() as usize;
        if slot >= self.presence.len() {
            self.grow(slot + 1);
        }
        self.generations[slot] = entity.generation();
        // grown above, cannot be out of range
        let _ = self.presence.set(slot);
    }

    /// Clear the presence of `entity`'s slot regardless of generation
    ///
    /// Fails only if the slot lies beyond the tracked size.
    pub fn remove(&mut self, entity: Entity) -> Result<()> {
        self.presence.reset(entity.slot() as usize)
    }

    /// True if the slot is present and its generation matches
    #[inline]
    pub fn contains(&self, entity: Entity) -> bool {
        let slot = entity.slot() as usize;
        self.presence.test(slot) && self.generations[slot] == entity.generation()
    }

    /// The entity currently recorded at `slot`, if present
    pub fn get(&self, slot: u32) -> Option<Entity> {
        let index = slot as usize;
        self.presence
            .test(index)
            .then(|| Entity::new(slot, self.generations[index]))
    }

    /// Number of members
    pub fn len(&self) -> usize {
        self.presence.count_ones()
    }

    /// True if there are no members
    pub fn is_empty(&self) -> bool {
        self.presence.none()
    }

    /// Number of slots tracked, present or not
    pub fn slots(&self) -> usize {
        self.presence.len()
    }

    /// Remove every member, keeping the allocation
    pub fn clear(&mut self) {
        self.presence.clear();
    }

    /// Iterate members in slot order
    pub fn iter(&self) -> Iter<'_> {
        Iter {
            ones: self.presence.iter_ones(),
            generations: &self.generations,
        }
    }

    fn grow(&mut self, slots: usize) {
        // amortize repeated single-slot growth
        let slots = slots.max(self.presence.len() * 2);
        self.presence.resize(slots);
        self.generations.resize(slots, 0);
    }
}

/// Iterator over the members of an [`EntitySet`]
///
/// Absent slots are skipped a word at a time.
pub struct Iter<'a> {
    ones: Ones<'a>,
    generations: &'a [u32],
}

impl<'a> Iterator for Iter<'a> {
    type Item = Entity;

    #[inline]
    fn next(&mut self) -> Option<Entity> {
        let slot = self.ones.next()?;
        Some(Entity::new(slot as u32, self.generations[slot]))
    }
}

impl<'a> IntoIterator for &'a EntitySet {
    type Item = Entity;
    type IntoIter = Iter<'a>;

    fn into_iter(self) -> Iter<'a> {
        self.iter()
    }
}

impl FromIterator<Entity> for EntitySet {
    fn from_iter<I: IntoIterator<Item = Entity>>(iter: I) -> Self {
        let mut set = EntitySet::new();
        set.extend(iter);
        set
    }
}

impl Extend<Entity> for EntitySet {
    fn extend<I: IntoIterator<Item = Entity>>(&mut self, iter: I) {
        for entity in iter {
            self.insert(entity);
        }
    }
}

impl BitAndAssign<&EntitySet> for EntitySet {
    fn bitand_assign(&mut self, rhs: &EntitySet) {
        self.presence &= &rhs.presence;
        self.generations.truncate(self.presence.len());

        let mismatched: Vec<usize> = self
            .presence
            .iter_ones()
            .filter(|&slot| self.generations[slot] != rhs.generations[slot])
            .collect();
        for slot in mismatched {
            // slot came from iter_ones, always in range
            let _ = self.presence.reset(slot);
        }
    }
}

impl BitAnd for &EntitySet {
    type Output = EntitySet;

    fn bitand(self, rhs: &EntitySet) -> EntitySet {
        let mut out = self.clone();
        out &= rhs;
        out
    }
}

impl PartialEq for EntitySet {
    /// Same members with the same generations
    fn eq(&self, other: &Self) -> bool {
        self.iter()
            .map(|e| e.to_bits())
            .eq(other.iter().map(|e| e.to_bits()))
    }
}

impl Eq for EntitySet {}
