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
//! System execution framework
//!
//! Systems contain the logic that operates on entities and components.
//! A system is a type with two static entry points: a one-time `init` and
//! a per-phase `run`. Systems keep no state of their own; anything they
//! need lives in the [`World`].

use crate::ecs::World;
use crate::error::Result;
use std::any::{type_name, TypeId};
use std::fmt;
use std::hash::{Hash, Hasher};

/// Trait for systems that operate on the ECS world
///
/// # Examples
///
/// ```
/// use ecs_core::ecs::System;
/// use ecs_core::World;
///
/// struct Noop;
///
/// impl System for Noop {
///     fn run(_world: &mut World, _dt: f64) {}
/// }
///
/// assert!(Noop::name().ends_with("Noop"));
/// ```
pub trait System: 'static {
    /// One-time setup, called before the first phase runs
    ///
    /// Typically registers the component storages the system touches.
    fn init(_world: &mut World) -> Result<()> {
        Ok(())
    }

    /// Execute the system on the world
    fn run(world: &mut World, dt: f64);

    /// Get the name of this system for debugging
    fn name() -> &'static str {
        type_name::<Self>()
    }
}

/// Run identifier for a registered system
///
/// Carries the system's type identity and its two entry points. Two ids
/// are equal when they name the same system type.
#[derive(Clone, Copy)]
pub struct SystemId {
    type_id: TypeId,
    name: &'static str,
    init: fn(&mut World) -> Result<()>,
    run: fn(&mut World, f64),
}

impl SystemId {
    /// Identifier for system type `S`
    pub fn of<S: System>() -> Self {
        SystemId {
            type_id: TypeId::of::<S>(),
            name: S::name(),
            init: S::init,
            run: S::run,
        }
    }

    /// Type identity of the system
    pub fn type_id(&self) -> TypeId {
        self.type_id
    }

    /// Name of the system
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Invoke the system's `init` hook
    pub fn init(&self, world: &mut World) -> Result<()> {
        (self.init)(world)
    }

    /// Invoke the system's `run` hook
    pub fn run(&self, world: &mut World, dt: f64) {
        (self.run)(world, dt)
    }
}

impl PartialEq for SystemId {
    fn eq(&self, other: &Self) -> bool {
        self.type_id == other.type_id
    }
}

impl Eq for SystemId {}

impl Hash for SystemId {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.type_id.hash(state);
    }
}

impl fmt::Debug for SystemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("SystemId").field(&self.name).finish()
    }
}

impl fmt::Display for SystemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::EcsError;

    struct Counter;

    impl System for Counter {
        fn init(world: &mut World) -> Result<()> {
            world.create_entity();
            Ok(())
        }

        fn run(world: &mut World, _dt: f64) {
            world.create_entity();
        }

        fn name() -> &'static str {
            "Counter"
        }
    }

    struct Failing;

    impl System for Failing {
        fn init(_world: &mut World) -> Result<()> {
            Err(EcsError::ComponentNotRegistered("Missing"))
        }

        fn run(_world: &mut World, _dt: f64) {}
    }

    #[test]
    fn test_system_id_dispatch() {
        let id = SystemId::of::<Counter>();
        let mut world = World::new();
        id.init(&mut world).unwrap();
        id.run(&mut world, 0.016);
        id.run(&mut world, 0.016);
        assert_eq!(world.entity_count(), 3);
        assert_eq!(id.name(), "Counter");
        assert_eq!(id.to_string(), "Counter");
    }

    #[test]
    fn test_system_id_identity() {
        assert_eq!(SystemId::of::<Counter>(), SystemId::of::<Counter>());
        assert_ne!(SystemId::of::<Counter>(), SystemId::of::<Failing>());
        assert_eq!(SystemId::of::<Failing>().type_id(), TypeId::of::<Failing>());
    }

    #[test]
    fn test_default_name_and_failing_init() {
        assert!(Failing::name().ends_with("Failing"));
        let mut world = World::new();
        assert!(SystemId::of::<Failing>().init(&mut world).is_err());
    }
}
