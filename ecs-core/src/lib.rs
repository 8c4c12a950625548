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
//! # ECS Core
//!
//! A small Entity Component System: generational entity handles, sparse
//! component storages indexed by entity slot, and a scheduler that layers
//! systems into phases from explicit "runs after" constraints.
//!
//! ## Features
//!
//! - **Generational entities**: recycled slots never alias stale handles
//! - **Three storage layouts**: slot-indexed, dense with hole reuse, hashed
//! - **Queries**: bitset intersection across any tuple of component types
//! - **Phased scheduling**: dependency graph layered with Kahn's algorithm
//! - **Parallelization**: Optional Rayon integration for per-storage updates
//!
//! ## Example
//!
//! ```rust
//! use ecs_core::ecs::components::{Position, Velocity};
//! use ecs_core::ecs::systems::Integrate;
//! use ecs_core::ecs::SystemGraphBuilder;
//! use ecs_core::World;
//!
//! let mut world = World::new();
//! let schedule = SystemGraphBuilder::new()
//!     .add_system::<Integrate>()
//!     .build()
//!     .unwrap();
//! schedule.init(&mut world).unwrap();
//!
//! let entity = world.create_entity();
//! world.insert_component(entity, Position::new(0.0, 0.0, 0.0)).unwrap();
//! world.insert_component(entity, Velocity::new(1.0, 0.0, 0.0)).unwrap();
//!
//! schedule.run(&mut world, 0.5);
//! assert_eq!(world.read_component::<Position>().unwrap()[entity], Position::new(0.5, 0.0, 0.0));
//! ```

#![warn(missing_docs)]

/// Bitset and freelist containers the storages are built on
pub mod collections;

/// Entity Component System implementation
pub mod ecs;

/// Error type shared by every fallible operation
pub mod error;

pub use ecs::{Entity, EntitySet, World};
pub use error::{EcsError, Result};
