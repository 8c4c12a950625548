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
//! Entity Component System (ECS) core implementation
//!
//! This module provides the foundational ECS architecture including:
//! - Generational entity handles and bitset-backed entity sets
//! - Component storage in three layouts (slot-indexed, dense, hashed)
//! - The world container with multi-component queries
//! - System dependency graphs layered into phases

mod component;
mod entity;
mod entity_set;
mod scheduler;
mod system;
mod world;

/// Built-in kinematic components
pub mod components;

/// Built-in systems
pub mod systems;

pub use component::{
    Component, ComponentStorage, DenseStorage, HashMapStorage, Iter, Values, ValuesMut, VecStorage,
};
pub use entity::Entity;
pub use entity_set::{EntitySet, Iter as EntityIter};
pub use scheduler::{Phase, Schedule, SystemGraphBuilder};
pub use system::{System, SystemId};
pub use world::{Query, World, WorldConfig, ENTITY_CAPACITY_ENV};
