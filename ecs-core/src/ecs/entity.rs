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
//! Entity handles
//!
//! Entities are lightweight copyable handles made of a reusable slot index
//! and a generation counter. The owner of a slot (world, entity set,
//! storage) compares generations to tell the current occupant of a slot
//! from earlier ones.

use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};

/// Slot-plus-generation entity handle
///
/// Equality, ordering and hashing look at the slot only. Two handles for
/// different incarnations of the same slot compare equal; validity is the
/// owner's concern and is checked with [`generation`](Self::generation).
///
/// # Examples
///
/// ```
/// use ecs_core::Entity;
///
/// let e = Entity::new(7, 2);
/// assert_eq!(Entity::from_bits(e.to_bits()).generation(), 2);
/// assert_eq!(e, Entity::new(7, 3));
/// ```
#[derive(Debug, Clone, Copy)]
pub struct Entity {
    slot: u32,
    generation: u32,
}

impl Entity {
    /// Create an entity handle from its parts
    pub const fn new(slot: u32, generation: u32) -> Self {
        Entity { slot, generation }
    }

    /// Slot index
    #[inline]
    pub const fn slot(&self) -> u32 {
        self.slot
    }

    /// Generation counter
    #[inline]
    pub const fn generation(&self) -> u32 {
        self.generation
    }

    /// The same slot one generation later
    pub const fn next_generation(&self) -> Self {
        Entity::new(self.slot, self.generation.wrapping_add(1))
    }

    /// Pack into 64 bits: generation in the high half, slot in the low half
    pub const fn to_bits(&self) -> u64 {
        (self.generation as u64) << 32 | self.slot as u64
    }

    /// Inverse of [`to_bits`](Self::to_bits)
    pub const fn from_bits(bits: u64) -> Self {
        Entity::new(bits as u32, (bits >> 32) as u32)
    }
}

impl PartialEq for Entity {
    fn eq(&self, other: &Self) -> bool {
        self.slot == other.slot
    }
}

impl Eq for Entity {}

impl PartialOrd for Entity {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Entity {
    fn cmp(&self, other: &Self) -> Ordering {
        self.slot.cmp(&other.slot)
    }
}

impl Hash for Entity {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.slot.hash(state);
    }
}

impl fmt::Display for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Entity({}, gen: {})", self.slot, self.generation)
    }
}
