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
//! World management
//!
//! The World is the central container for all ECS data, managing entity
//! lifecycles, one storage per registered component type, and multi-
//! component queries.
//!
//! # Destruction is lazy
//!
//! [`World::destroy_entity`] only retires the handle: the slot is queued
//! for reuse with its generation bumped. Component storages are not
//! scrubbed, so they keep reporting the old incarnation (and keep its
//! payload) until the slot is overwritten. Because every membership test
//! and every intersection compares generations, the stale entries never
//! pair with the slot's next occupant. Call [`World::purge_entity`] before
//! destroying to release payloads eagerly instead.
//!
//! # Environment Configuration
//!
//! [`WorldConfig::from_env`] reads `ECS_CORE_ENTITY_CAPACITY` to pre-size
//! the live entity set:
//! ```bash
//! export ECS_CORE_ENTITY_CAPACITY=65536
//! ```

use crate::ecs::{Component, ComponentStorage, Entity, EntitySet};
use crate::error::{EcsError, Result};
use std::any::{type_name, Any, TypeId};
use std::collections::{HashMap, VecDeque};
use tracing::{debug, trace, warn};

/// Environment variable read by [`WorldConfig::from_env`]
pub const ENTITY_CAPACITY_ENV: &str = "ECS_CORE_ENTITY_CAPACITY";

/// Configuration for world allocation behavior
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorldConfig {
    /// Slots pre-reserved in the live entity set
    pub entity_capacity: usize,
    /// Entries pre-reserved in the recycle queue
    pub recycle_capacity: usize,
}

impl Default for WorldConfig {
    fn default() -> Self {
        WorldConfig {
            entity_capacity: 1024,
            recycle_capacity: 64,
        }
    }
}

impl WorldConfig {
    /// Create a configuration with custom capacities
    pub fn new(entity_capacity: usize, recycle_capacity: usize) -> Self {
        WorldConfig {
            entity_capacity,
            recycle_capacity,
        }
    }

    /// Set the live entity capacity
    pub fn with_entity_capacity(mut self, capacity: usize) -> Self {
        self.entity_capacity = capacity;
        self
    }

    /// Set the recycle queue capacity
    pub fn with_recycle_capacity(mut self, capacity: usize) -> Self {
        self.recycle_capacity = capacity;
        self
    }

    /// Defaults, with the entity capacity taken from `ECS_CORE_ENTITY_CAPACITY`
    /// when set to a valid number
    pub fn from_env() -> Self {
        let config = WorldConfig::default();
        match std::env::var(ENTITY_CAPACITY_ENV) {
            Ok(raw) => match raw.trim().parse::<usize>() {
                Ok(capacity) => config.with_entity_capacity(capacity),
                Err(err) => {
                    warn!(value = %raw, error = %err, "ignoring invalid {}", ENTITY_CAPACITY_ENV);
                    config
                }
            },
            Err(_) => config,
        }
    }
}

/// Type-erased view of a component storage held by the world
pub(crate) trait ErasedStorage: Send + Sync {
    fn as_any(&self) -> &dyn Any;
    fn as_any_mut(&mut self) -> &mut dyn Any;
    fn component_name(&self) -> &'static str;
    fn erased_entities(&self) -> &EntitySet;
    fn evict(&mut self, entity: Entity) -> bool;
    fn clear_all(&mut self);
}

impl<S: ComponentStorage> ErasedStorage for S {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }

    fn component_name(&self) -> &'static str {
        type_name::<S::Component>()
    }

    fn erased_entities(&self) -> &EntitySet {
        ComponentStorage::entities(self)
    }

    fn evict(&mut self, entity: Entity) -> bool {
        ComponentStorage::remove(self, entity).is_ok()
    }

    fn clear_all(&mut self) {
        ComponentStorage::clear(self)
    }
}

/// A set of component types that can be intersected by [`World::query`]
///
/// Implemented for tuples of up to eight [`Component`] types.
pub trait Query {
    /// Entities holding every component in the set, generations matching
    fn entities(world: &World) -> Result<EntitySet>;
}

macro_rules! impl_query_tuple {
    ($first:ident $(, $rest:ident)*) => {
        impl<$first: Component $(, $rest: Component)*> Query for ($first, $($rest,)*) {
            fn entities(world: &World) -> Result<EntitySet> {
                #[allow(unused_mut)]
                let mut set = world.read_component::<$first>()?.entities().clone();
                $(set &= world.read_component::<$rest>()?.entities();)*
                Ok(set)
            }
        }
    };
}

impl_query_tuple!(A);
impl_query_tuple!(A, B);
impl_query_tuple!(A, B, C);
impl_query_tuple!(A, B, C, D);
impl_query_tuple!(A, B, C, D, E);
impl_query_tuple!(A, B, C, D, E, F);
impl_query_tuple!(A, B, C, D, E, F, G);
impl_query_tuple!(A, B, C, D, E, F, G, H);

/// The main ECS world container
///
/// World manages entity lifecycles and owns one storage per registered
/// component type. It performs no internal locking; mutation is expected
/// from one thread at a time.
///
/// # Examples
///
/// ```
/// use ecs_core::World;
/// use ecs_core::ecs::components::{Position, Velocity, Vector3};
///
/// let mut world = World::new();
/// world.add_component::<Position>().unwrap();
/// world.add_component::<Velocity>().unwrap();
///
/// let moving = world.create_entity();
/// let still = world.create_entity();
/// world.insert_component(moving, Position(Vector3::ZERO)).unwrap();
/// world.insert_component(moving, Velocity(Vector3::new(1.0, 0.0, 0.0))).unwrap();
/// world.insert_component(still, Position(Vector3::ZERO)).unwrap();
///
/// let hits: Vec<_> = world.query::<(Position, Velocity)>().unwrap().iter().collect();
/// assert_eq!(hits, vec![moving]);
/// ```
pub struct World {
    next_entity: Entity,
    recycled: VecDeque<Entity>,
    alive: EntitySet,
    storages: HashMap<TypeId, Box<dyn ErasedStorage>>,
}

impl World {
    /// Create a new empty world
    pub fn new() -> Self {
        Self::with_config(WorldConfig::default())
    }

    /// Create a world with custom pre-allocation
    pub fn with_config(config: WorldConfig) -> Self {
        World {
            next_entity: Entity::new(0, 0),
            recycled: VecDeque::with_capacity(config.recycle_capacity),
            alive: EntitySet::with_capacity(config.entity_capacity),
            storages: HashMap::new(),
        }
    }

    /// Create a new entity
    ///
    /// Reuses the oldest recycled slot (already carrying its bumped
    /// generation) before allocating a fresh slot at generation 0.
    ///
    /// # Panics
    ///
    /// Panics if all `u32::MAX` slots are live; see
    /// [`World::try_create_entity`] for the fallible form.
    pub fn create_entity(&mut self) -> Entity {
        match self.try_create_entity() {
            Ok(entity) => entity,
            Err(err) => panic!("{}", err),
        }
    }

    /// Create a new entity, failing with [`EcsError::EntitiesExhausted`]
    /// once no fresh slot is left and nothing is queued for reuse
    pub fn try_create_entity(&mut self) -> Result<Entity> {
        let entity = match self.recycled.pop_front() {
            Some(entity) => {
                trace!(%entity, "recycled entity");
                entity
            }
            None => {
                let entity = self.next_entity;
                let next = entity
                    .slot()
                    .checked_add(1)
                    .ok_or(EcsError::EntitiesExhausted)?;
                self.next_entity = Entity::new(next, 0);
                trace!(%entity, "allocated entity");
                entity
            }
        };
        self.alive.insert(entity);
        Ok(entity)
    }

    /// Destroy an entity
    ///
    /// Queues the slot for reuse with the next generation. Returns `false`
    /// and does nothing if the handle is not alive (stale or already
    /// destroyed), so a slot is never queued twice. Storages are left as
    /// they are; see the module docs.
    pub fn destroy_entity(&mut self, entity: Entity) -> bool {
        if !self.alive.contains(entity) {
            warn!(%entity, "destroy of an entity that is not alive");
            return false;
        }
        // contains() above proves the slot is in range
        let _ = self.alive.remove(entity);
        self.recycled.push_back(entity.next_generation());
        trace!(%entity, "destroyed entity");
        true
    }

    /// Remove `entity` from every storage that holds this exact incarnation
    ///
    /// Returns the number of components dropped.
    pub fn purge_entity(&mut self, entity: Entity) -> usize {
        let purged = self
            .storages
            .values_mut()
            .filter(|storage| storage.erased_entities().contains(entity))
            .map(|storage| storage.evict(entity))
            .filter(|&evicted| evicted)
            .count();
        trace!(%entity, purged, "purged entity components");
        purged
    }

    /// Check if an entity is alive
    pub fn is_alive(&self, entity: Entity) -> bool {
        self.alive.contains(entity)
    }

    /// Get the number of alive entities
    pub fn entity_count(&self) -> usize {
        self.alive.len()
    }

    /// Set of alive entities
    pub fn entities(&self) -> &EntitySet {
        &self.alive
    }

    /// Register a fresh storage for component type `T`
    pub fn add_component<T: Component>(&mut self) -> Result<()> {
        let key = TypeId::of::<T>();
        if self.storages.contains_key(&key) {
            return Err(EcsError::ComponentAlreadyRegistered(type_name::<T>()));
        }
        self.storages.insert(key, Box::new(T::Storage::default()));
        debug!(component = type_name::<T>(), "registered component storage");
        Ok(())
    }

    /// True if `T` has a registered storage
    pub fn has_component<T: Component>(&self) -> bool {
        self.storages.contains_key(&TypeId::of::<T>())
    }

    /// Number of registered component storages
    pub fn component_count(&self) -> usize {
        self.storages.len()
    }

    /// Immutable access to the storage for `T`
    pub fn read_component<T: Component>(&self) -> Result<&T::Storage> {
        self.storages
            .get(&TypeId::of::<T>())
            .and_then(|storage| storage.as_any().downcast_ref::<T::Storage>())
            .ok_or(EcsError::ComponentNotRegistered(type_name::<T>()))
    }

    /// Mutable access to the storage for `T`
    pub fn write_component<T: Component>(&mut self) -> Result<&mut T::Storage> {
        self.storages
            .get_mut(&TypeId::of::<T>())
            .and_then(|storage| storage.as_any_mut().downcast_mut::<T::Storage>())
            .ok_or(EcsError::ComponentNotRegistered(type_name::<T>()))
    }

    /// Attach `component` to `entity`, overwriting any existing value
    pub fn insert_component<T: Component>(&mut self, entity: Entity, component: T) -> Result<()> {
        self.write_component::<T>()?.insert(entity, component);
        Ok(())
    }

    /// Write storage `W` while reading storage `R`
    ///
    /// `W` is lifted out of the world while `f` runs and put back
    /// afterwards, also when `f` panics.
    ///
    /// ```
    /// use ecs_core::World;
    /// use ecs_core::ecs::components::{Position, Velocity, Vector3};
    ///
    /// let mut world = World::new();
    /// world.add_component::<Position>().unwrap();
    /// world.add_component::<Velocity>().unwrap();
    /// let e = world.create_entity();
    /// world.insert_component(e, Position(Vector3::ZERO)).unwrap();
    /// world.insert_component(e, Velocity(Vector3::new(0.0, 1.0, 0.0))).unwrap();
    ///
    /// world
    ///     .split_components::<Position, Velocity, _, _>(|positions, velocities| {
    ///         positions[e].0 += velocities[e].0;
    ///     })
    ///     .unwrap();
    /// assert_eq!(world.read_component::<Position>().unwrap()[e].0.y, 1.0);
    /// ```
    pub fn split_components<W, R, F, Out>(&mut self, f: F) -> Result<Out>
    where
        W: Component,
        R: Component,
        F: FnOnce(&mut W::Storage, &R::Storage) -> Out,
    {
        let key = TypeId::of::<W>();
        if key == TypeId::of::<R>() {
            return Err(EcsError::StorageAliased(type_name::<W>()));
        }
        let writer = self
            .storages
            .remove(&key)
            .ok_or(EcsError::ComponentNotRegistered(type_name::<W>()))?;
        let mut guard = Reinsert {
            storages: &mut self.storages,
            key,
            writer: Some(writer),
        };
        let Reinsert {
            storages, writer, ..
        } = &mut guard;

        let written = writer
            .as_mut()
            .and_then(|storage| storage.as_any_mut().downcast_mut::<W::Storage>())
            .ok_or(EcsError::ComponentNotRegistered(type_name::<W>()))?;
        let read = storages
            .get(&TypeId::of::<R>())
            .and_then(|storage| storage.as_any().downcast_ref::<R::Storage>())
            .ok_or(EcsError::ComponentNotRegistered(type_name::<R>()))?;
        Ok(f(written, read))
    }

    /// Entities that hold every component in `Q`
    ///
    /// Storages are intersected left to right; an entity only matches if
    /// every storage records the same generation for its slot.
    pub fn query<Q: Query>(&self) -> Result<EntitySet> {
        Q::entities(self)
    }

    /// Destroy every entity and empty every storage
    ///
    /// Registrations are kept. Every live slot is queued for reuse with its
    /// generation bumped, so handles taken before the clear stay dead.
    pub fn clear(&mut self) {
        let retired: Vec<Entity> = self
            .alive
            .iter()
            .map(|entity| entity.next_generation())
            .collect();
        self.recycled.extend(retired);
        self.alive.clear();
        for storage in self.storages.values_mut() {
            debug!(component = storage.component_name(), "clearing storage");
            storage.clear_all();
        }
    }

    /// Type names of every registered component
    pub fn component_names(&self) -> Vec<&'static str> {
        let mut names: Vec<_> = self.storages.values().map(|s| s.component_name()).collect();
        names.sort_unstable();
        names
    }
}

/// Puts a storage taken out by [`World::split_components`] back on drop,
/// including when the closure unwinds
struct Reinsert<'a> {
    storages: &'a mut HashMap<TypeId, Box<dyn ErasedStorage>>,
    key: TypeId,
    writer: Option<Box<dyn ErasedStorage>>,
}

impl Drop for Reinsert<'_> {
    fn drop(&mut self) {
        if let Some(writer) = self.writer.take() {
            self.storages.insert(self.key, writer);
        }
    }
}

impl Default for World {
    fn default() -> Self {
        Self::new()
    }
}
