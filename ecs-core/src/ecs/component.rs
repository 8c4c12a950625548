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
//! Component storage and management
//!
//! Components are data containers that can be attached to entities. Every
//! component type names the storage that backs it, and every storage
//! satisfies the same [`ComponentStorage`] contract so systems can be
//! written against "a storage of `T`" without caring about layout.
//!
//! Three layouts are provided:
//!
//! - [`VecStorage`]: payload indexed directly by slot. O(1) access, memory
//!   proportional to the highest slot ever stored. Suited to components
//!   nearly every entity has (transforms, positions).
//! - [`DenseStorage`]: payload packed in a [`FreeableVector`] with a
//!   slot-to-dense-index indirection. Holes left by removal are refilled
//!   by the next insert. Suited to large but sparse component types.
//! - [`HashMapStorage`]: payload in a hash map keyed by entity. Suited to
//!   rare components most entities never carry.
//!
//! # Unchecked access
//!
//! `storage[entity]` (and [`ComponentStorage::get_unchecked`]) skips the
//! membership and generation checks that [`ComponentStorage::get`]
//! performs. A stale handle whose slot was reused yields the current
//! occupant's payload; a slot that holds no payload panics. Use it only
//! with entities taken from the storage's own [`EntitySet`] or from a
//! query over it.

use crate::collections::FreeableVector;
use crate::ecs::{Entity, EntitySet};
use crate::error::{EcsError, Result};
use std::any::type_name;
use std::collections::HashMap;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Trait that all components must implement
///
/// Components should be plain data. The associated `Storage` picks the
/// layout the world creates when the component is registered.
///
/// ```
/// use ecs_core::ecs::{Component, VecStorage};
///
/// struct Health(u32);
///
/// impl Component for Health {
///     type Storage = VecStorage<Self>;
/// }
/// ```
pub trait Component: Sized + Send + Sync + 'static {
    /// Storage layout backing this component type
    type Storage: ComponentStorage<Component = Self> + Default;
}

/// Storage interface for components
///
/// Every implementation keeps an [`EntitySet`] of the entities it holds a
/// payload for; for each member the payload is always initialized.
pub trait ComponentStorage: Send + Sync + 'static {
    /// The component type this storage manages
    type Component: Component;

    /// Iterator over live payloads
    type Values<'a>: Iterator<Item = &'a Self::Component>
    where
        Self: 'a;

    /// Iterator over live payloads, mutably
    type ValuesMut<'a>: Iterator<Item = &'a mut Self::Component>
    where
        Self: 'a;

    /// Entities that currently have a payload
    fn entities(&self) -> &EntitySet;

    /// Insert a component for the given entity, overwriting any existing one
    fn insert(&mut self, entity: Entity, component: Self::Component);

    /// Remove and return the component for the given entity
    ///
    /// Fails with [`EcsError::MissingEntity`] if the entity is not held.
    fn remove(&mut self, entity: Entity) -> Result<Self::Component>;

    /// Get a reference to a component for the given entity
    fn get(&self, entity: Entity) -> Result<&Self::Component>;

    /// Get a mutable reference to a component for the given entity
    fn get_mut(&mut self, entity: Entity) -> Result<&mut Self::Component>;

    /// Fast path without membership or generation checks
    ///
    /// See the module docs: panics if the slot holds no payload and returns
    /// the current occupant for a stale handle.
    fn get_unchecked(&self, entity: Entity) -> &Self::Component;

    /// Mutable fast path without membership or generation checks
    fn get_unchecked_mut(&mut self, entity: Entity) -> &mut Self::Component;

    /// Iterate live payloads
    fn values(&self) -> Self::Values<'_>;

    /// Iterate live payloads mutably
    fn values_mut(&mut self) -> Self::ValuesMut<'_>;

    /// Clear all components
    fn clear(&mut self);

    /// Check if an entity has this component
    #[inline]
    fn contains(&self, entity: Entity) -> bool {
        self.entities().contains(entity)
    }

    /// Number of stored components
    fn len(&self) -> usize {
        self.entities().len()
    }

    /// True if nothing is stored
    fn is_empty(&self) -> bool {
        self.entities().is_empty()
    }

    /// Iterate `(entity, component)` pairs in slot order
    fn iter(&self) -> Iter<'_, Self>
    where
        Self: Sized,
    {
        Iter {
            entities: self.entities().iter(),
            storage: self,
        }
    }
}

/// Iterator over `(entity, component)` pairs of any storage
pub struct Iter<'a, S: ComponentStorage> {
    entities: crate::ecs::entity_set::Iter<'a>,
    storage: &'a S,
}

impl<'a, S: ComponentStorage> Iterator for Iter<'a, S> {
    type Item = (Entity, &'a S::Component);

    fn next(&mut self) -> Option<Self::Item> {
        let entity = self.entities.next()?;
        Some((entity, self.storage.get_unchecked(entity)))
    }
}

/// Payload iterator over an `Option` slab
pub struct Values<'a, T> {
    inner: std::slice::Iter<'a, Option<T>>,
}

impl<'a, T> Iterator for Values<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<&'a T> {
        self.inner.by_ref().find_map(Option::as_ref)
    }
}

/// Mutable payload iterator over an `Option` slab
pub struct ValuesMut<'a, T> {
    inner: std::slice::IterMut<'a, Option<T>>,
}

impl<'a, T> Iterator for ValuesMut<'a, T> {
    type Item = &'a mut T;

    fn next(&mut self) -> Option<&'a mut T> {
        self.inner.by_ref().find_map(Option::as_mut)
    }
}

fn missing<T>(entity: Entity) -> EcsError {
    EcsError::MissingEntity {
        entity,
        component: type_name::<T>(),
    }
}

/// Storage indexed directly by entity slot
///
/// # Example
///
/// ```
/// use ecs_core::{Entity, ecs::{Component, ComponentStorage, VecStorage}};
///
/// struct Tag(u8);
/// impl Component for Tag {
///     type Storage = VecStorage<Self>;
/// }
///
/// let mut storage = VecStorage::<Tag>::new();
/// let entity = Entity::new(3, 0);
/// storage.insert(entity, Tag(1));
/// assert!(storage.contains(entity));
/// assert_eq!(storage[entity].0, 1);
/// ```
pub struct VecStorage<T> {
    entities: EntitySet,
    values: Vec<Option<T>>,
}

impl<T: Component> VecStorage<T> {
    /// Create a new empty storage
    pub fn new() -> Self {
        Self::with_capacity(0)
    }

    /// Create a storage with room for slots `0..capacity`
    pub fn with_capacity(capacity: usize) -> Self {
        VecStorage {
            entities: EntitySet::with_capacity(capacity),
            values: Vec::with_capacity(capacity),
        }
    }

    /// Apply `f` to every stored component on the rayon thread pool
    #[cfg(feature = "parallel")]
    pub fn par_for_each_mut<F>(&mut self, f: F)
    where
        F: Fn(Entity, &mut T) + Send + Sync,
    {
        let entities = &self.entities;
        self.values
            .par_iter_mut()
            .enumerate()
            .for_each(|(slot, value)| {
                if let (Some(value), Some(entity)) = (value.as_mut(), entities.get(slot as u32)) {
                    f(entity, value);
                }
            });
    }
}

impl<T: Component> Default for VecStorage<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Component> ComponentStorage for VecStorage<T> {
    type Component = T;
    type Values<'a> = Values<'a, T>;
    type ValuesMut<'a> = ValuesMut<'a, T>;

    fn entities(&self) -> &EntitySet {
        &self.entities
    }

    fn insert(&mut self, entity: Entity, component: T) {
        let slot = entity.slot() as usize;
        if slot >= self.values.len() {
            self.values.resize_with(slot + 1, || None);
        }
        self.values[slot] = Some(component);
        self.entities.insert(entity);
    }

    fn remove(&mut self, entity: Entity) -> Result<T> {
        if !self.entities.contains(entity) {
            return Err(missing::<T>(entity));
        }
        self.entities.remove(entity)?;
        self.values[entity.slot() as usize]
            .take()
            .ok_or_else(|| missing::<T>(entity))
    }

    fn get(&self, entity: Entity) -> Result<&T> {
        if !self.entities.contains(entity) {
            return Err(missing::<T>(entity));
        }
        self.values[entity.slot() as usize]
            .as_ref()
            .ok_or_else(|| missing::<T>(entity))
    }

    fn get_mut(&mut self, entity: Entity) -> Result<&mut T> {
        if !self.entities.contains(entity) {
            return Err(missing::<T>(entity));
        }
        self.values[entity.slot() as usize]
            .as_mut()
            .ok_or_else(|| missing::<T>(entity))
    }

    #[inline]
    fn get_unchecked(&self, entity: Entity) -> &T {
        match self.values[entity.slot() as usize] {
            Some(ref value) => value,
            None => panic!("slot {} holds no {}", entity.slot(), type_name::<T>()),
        }
    }

    #[inline]
    fn get_unchecked_mut(&mut self, entity: Entity) -> &mut T {
        match self.values[entity.slot() as usize] {
            Some(ref mut value) => value,
            None => panic!("slot {} holds no {}", entity.slot(), type_name::<T>()),
        }
    }

    fn values(&self) -> Values<'_, T> {
        Values {
            inner: self.values.iter(),
        }
    }

    fn values_mut(&mut self) -> ValuesMut<'_, T> {
        ValuesMut {
            inner: self.values.iter_mut(),
        }
    }

    fn clear(&mut self) {
        self.entities.clear();
        self.values.clear();
    }
}

/// Packed storage with slot indirection and hole reuse
///
/// Payloads live in a [`FreeableVector`]; `index[slot]` gives the dense
/// position of a slot's payload and `owners[dense]` the slot back.
pub struct DenseStorage<T> {
    entities: EntitySet,
    dense: FreeableVector<T>,
    index: Vec<usize>,
    owners: Vec<u32>,
}

impl<T: Component> DenseStorage<T> {
    /// Create a new empty storage
    pub fn new() -> Self {
        DenseStorage {
            entities: EntitySet::new(),
            dense: FreeableVector::new(),
            index: Vec::new(),
            owners: Vec::new(),
        }
    }

    /// Dense position of the entity's payload, if held
    pub fn dense_index(&self, entity: Entity) -> Option<usize> {
        self.entities
            .contains(entity)
            .then(|| self.index[entity.slot() as usize])
    }

    /// Apply `f` to every stored component on the rayon thread pool
    #[cfg(feature = "parallel")]
    pub fn par_for_each_mut<F>(&mut self, f: F)
    where
        F: Fn(Entity, &mut T) + Send + Sync,
    {
        let entities = &self.entities;
        let owners = &self.owners;
        self.dense
            .raw_mut()
            .par_iter_mut()
            .enumerate()
            .for_each(|(dense, value)| {
                if let (Some(value), Some(entity)) = (value.as_mut(), entities.get(owners[dense])) {
                    f(entity, value);
                }
            });
    }
}

impl<T: Component> Default for DenseStorage<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Component> ComponentStorage for DenseStorage<T> {
    type Component = T;
    type Values<'a> = Values<'a, T>;
    type ValuesMut<'a> = ValuesMut<'a, T>;

    fn entities(&self) -> &EntitySet {
        &self.entities
    }

    fn insert(&mut self, entity: Entity, component: T) {
        let slot = entity.slot() as usize;
        if self.entities.get(entity.slot()).is_some() {
            // occupied by this or an older incarnation: overwrite in place
            self.dense[self.index[slot]] = component;
        } else {
            let dense = self.dense.insert(component);
            if slot >= self.index.len() {
                self.index.resize(slot + 1, 0);
            }
            self.index[slot] = dense;
            if dense >= self.owners.len() {
                self.owners.resize(dense + 1, 0);
            }
            self.owners[dense] = entity.slot();
        }
        self.entities.insert(entity);

        debug_assert_eq!(self.entities.len(), self.dense.len());
    }

    fn remove(&mut self, entity: Entity) -> Result<T> {
        if !self.entities.contains(entity) {
            return Err(missing::<T>(entity));
        }
        let value = self.dense.erase(self.index[entity.slot() as usize])?;
        self.entities.remove(entity)?;

        debug_assert_eq!(self.entities.len(), self.dense.len());
        Ok(value)
    }

    fn get(&self, entity: Entity) -> Result<&T> {
        if !self.entities.contains(entity) {
            return Err(missing::<T>(entity));
        }
        self.dense.at(self.index[entity.slot() as usize])
    }

    fn get_mut(&mut self, entity: Entity) -> Result<&mut T> {
        if !self.entities.contains(entity) {
            return Err(missing::<T>(entity));
        }
        self.dense.at_mut(self.index[entity.slot() as usize])
    }

    #[inline]
    fn get_unchecked(&self, entity: Entity) -> &T {
        &self.dense[self.index[entity.slot() as usize]]
    }

    #[inline]
    fn get_unchecked_mut(&mut self, entity: Entity) -> &mut T {
        let dense = self.index[entity.slot() as usize];
        &mut self.dense[dense]
    }

    fn values(&self) -> Values<'_, T> {
        Values {
            inner: self.dense.raw().iter(),
        }
    }

    fn values_mut(&mut self) -> ValuesMut<'_, T> {
        ValuesMut {
            inner: self.dense.raw_mut().iter_mut(),
        }
    }

    fn clear(&mut self) {
        self.entities.clear();
        self.dense.clear();
        self.index.clear();
        self.owners.clear();
    }
}

/// HashMap-based component storage
///
/// Keys compare by slot, so a newer incarnation overwrites the payload of
/// an older one at the same slot.
pub struct HashMapStorage<T> {
    entities: EntitySet,
    components: HashMap<Entity, T>,
}

impl<T: Component> HashMapStorage<T> {
    /// Create a new empty storage
    pub fn new() -> Self {
        HashMapStorage {
            entities: EntitySet::new(),
            components: HashMap::new(),
        }
    }
}

impl<T: Component> Default for HashMapStorage<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Component> ComponentStorage for HashMapStorage<T> {
    type Component = T;
    type Values<'a> = std::collections::hash_map::Values<'a, Entity, T>;
    type ValuesMut<'a> = std::collections::hash_map::ValuesMut<'a, Entity, T>;

    fn entities(&self) -> &EntitySet {
        &self.entities
    }

    fn insert(&mut self, entity: Entity, component: T) {
        self.components.insert(entity, component);
        self.entities.insert(entity);
    }

    fn remove(&mut self, entity: Entity) -> Result<T> {
        if !self.entities.contains(entity) {
            return Err(missing::<T>(entity));
        }
        self.entities.remove(entity)?;
        self.components
            .remove(&entity)
            .ok_or_else(|| missing::<T>(entity))
    }

    fn get(&self, entity: Entity) -> Result<&T> {
        if !self.entities.contains(entity) {
            return Err(missing::<T>(entity));
        }
        self.components
            .get(&entity)
            .ok_or_else(|| missing::<T>(entity))
    }

    fn get_mut(&mut self, entity: Entity) -> Result<&mut T> {
        if !self.entities.contains(entity) {
            return Err(missing::<T>(entity));
        }
        self.components
            .get_mut(&entity)
            .ok_or_else(|| missing::<T>(entity))
    }

    fn get_unchecked(&self, entity: Entity) -> &T {
        match self.components.get(&entity) {
            Some(value) => value,
            None => panic!("slot {} holds no {}", entity.slot(), type_name::<T>()),
        }
    }

    fn get_unchecked_mut(&mut self, entity: Entity) -> &mut T {
        match self.components.get_mut(&entity) {
            Some(value) => value,
            None => panic!("slot {} holds no {}", entity.slot(), type_name::<T>()),
        }
    }

    fn values(&self) -> Self::Values<'_> {
        self.components.values()
    }

    fn values_mut(&mut self) -> Self::ValuesMut<'_> {
        self.components.values_mut()
    }

    fn clear(&mut self) {
        self.entities.clear();
        self.components.clear();
    }
}

macro_rules! impl_storage_index {
    ($($storage:ident),+) => {
        $(
            impl<T: Component> std::ops::Index<Entity> for $storage<T> {
                type Output = T;

                fn index(&self, entity: Entity) -> &T {
                    self.get_unchecked(entity)
                }
            }

            impl<T: Component> std::ops::IndexMut<Entity> for $storage<T> {
                fn index_mut(&mut self, entity: Entity) -> &mut T {
                    self.get_unchecked_mut(entity)
                }
            }
        )+
    };
}

impl_storage_index!(VecStorage, DenseStorage, HashMapStorage);
