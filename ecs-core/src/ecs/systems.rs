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
//! Built-in systems

use crate::ecs::components::{Position, Velocity};
use crate::ecs::{Component, ComponentStorage, System, World};
use crate::error::Result;
use tracing::{trace, warn};

/// Explicit Euler step: `position += velocity * dt`
///
/// Touches every entity that holds both a [`Position`] and a [`Velocity`].
/// With the `parallel` feature the update runs on the rayon pool.
///
/// # Examples
///
/// ```
/// use ecs_core::ecs::components::{Position, Velocity};
/// use ecs_core::ecs::systems::Integrate;
/// use ecs_core::ecs::System;
/// use ecs_core::World;
///
/// let mut world = World::new();
/// Integrate::init(&mut world).unwrap();
/// let e = world.create_entity();
/// world.insert_component(e, Position::new(1.0, 2.0, 3.0)).unwrap();
/// world.insert_component(e, Velocity::new(1.0, 2.0, 3.0)).unwrap();
///
/// Integrate::run(&mut world, 2.0);
/// assert_eq!(world.read_component::<Position>().unwrap()[e], Position::new(3.0, 6.0, 9.0));
/// ```
pub struct Integrate;

impl System for Integrate {
    fn init(world: &mut World) -> Result<()> {
        register::<Position>(world)?;
        register::<Velocity>(world)
    }

    fn run(world: &mut World, dt: f64) {
        if let Err(err) = world.split_components::<Position, Velocity, _, _>(|positions, velocities| {
            integrate(positions, velocities, dt)
        }) {
            warn!(error = %err, "integration skipped");
        }
    }

    fn name() -> &'static str {
        "Integrate"
    }
}

fn register<T: Component>(world: &mut World) -> Result<()> {
    if world.has_component::<T>() {
        return Ok(());
    }
    world.add_component::<T>()
}

/// Advance every position that has a matching velocity by `dt`
#[cfg(not(feature = "parallel"))]
pub fn integrate(
    positions: &mut <Position as Component>::Storage,
    velocities: &<Velocity as Component>::Storage,
    dt: f64,
) {
    let moving = positions.entities() & velocities.entities();
    trace!(entities = moving.len(), dt, "integrating");
    for entity in &moving {
        positions[entity].0 += velocities[entity].0 * dt;
    }
}

/// Advance every position that has a matching velocity by `dt`
#[cfg(feature = "parallel")]
pub fn integrate(
    positions: &mut <Position as Component>::Storage,
    velocities: &<Velocity as Component>::Storage,
    dt: f64,
) {
    trace!(entities = positions.len(), dt, "integrating in parallel");
    positions.par_for_each_mut(|entity, position| {
        if let Ok(velocity) = velocities.get(entity) {
            position.0 += velocity.0 * dt;
        }
    });
}
