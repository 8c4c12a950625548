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
//! Particle fountain demo
//!
//! Spawns particles with random-ish upward velocities, lets gravity pull
//! them down and despawns the ones that fall through the floor. Shows a
//! three-phase schedule, queries, eager purging and slot recycling.
//!
//! Run with `RUST_LOG=ecs_core=trace` to watch entity traffic.

use ecs_core::ecs::components::{Position, Vector3, Velocity};
use ecs_core::ecs::systems::Integrate;
use ecs_core::ecs::{ComponentStorage, System, SystemGraphBuilder, WorldConfig};
use ecs_core::{Result, World};
use tracing_subscriber::EnvFilter;

const GRAVITY: Vector3 = Vector3::new(0.0, -9.81, 0.0);

/// Pulls every velocity down
struct Gravity;

impl System for Gravity {
    fn run(world: &mut World, dt: f64) {
        if let Ok(velocities) = world.write_component::<Velocity>() {
            for velocity in velocities.values_mut() {
                velocity.0 += GRAVITY * dt;
            }
        }
    }

    fn name() -> &'static str {
        "Gravity"
    }
}

/// Despawns particles below the floor
struct Floor;

impl System for Floor {
    fn run(world: &mut World, _dt: f64) {
        let fallen: Vec<_> = match world.read_component::<Position>() {
            Ok(positions) => positions
                .iter()
                .filter(|(entity, position)| world.is_alive(*entity) && position.0.y < 0.0)
                .map(|(entity, _)| entity)
                .collect(),
            Err(_) => return,
        };
        for entity in fallen {
            world.purge_entity(entity);
            world.destroy_entity(entity);
        }
    }

    fn name() -> &'static str {
        "Floor"
    }
}

/// Tops the fountain back up to a fixed particle count
struct Emitter;

impl Emitter {
    const PARTICLES: usize = 64;
}

impl System for Emitter {
    fn init(world: &mut World) -> Result<()> {
        Integrate::init(world)
    }

    fn run(world: &mut World, _dt: f64) {
        while world.entity_count() < Self::PARTICLES {
            let particle = world.create_entity();
            // Cheap deterministic spread keyed on the slot
            let k = particle.slot() as f64;
            let spray = Vector3::new((k * 0.37).sin() * 2.0, 8.0 + (k * 0.11).cos() * 3.0, 0.0);
            let spawned = world
                .insert_component(particle, Position(Vector3::ZERO))
                .and_then(|_| world.insert_component(particle, Velocity(spray)));
            if spawned.is_err() {
                return;
            }
        }
    }

    fn name() -> &'static str {
        "Emitter"
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    println!("ECS Core - Particle Fountain");
    println!("============================\n");

    let mut world = World::with_config(WorldConfig::from_env());
    let schedule = SystemGraphBuilder::new()
        .add_system::<Floor>()
        .add_system::<Integrate>()
        .add_system::<Gravity>()
        .add_system::<Emitter>()
        .order_systems::<Emitter, Gravity>()
        .order_systems::<Gravity, Integrate>()
        .order_systems::<Integrate, Floor>()
        .build()?;

    for (index, phase) in schedule.phases().iter().enumerate() {
        let names: Vec<_> = phase.systems().iter().map(|s| s.name()).collect();
        println!("Phase {}: {}", index, names.join(", "));
    }
    println!();

    schedule.init(&mut world)?;

    let dt = 1.0 / 60.0;
    for frame in 0..240 {
        schedule.run(&mut world, dt);
        if frame % 60 == 0 {
            let moving = world.query::<(Position, Velocity)>()?;
            let highest = world
                .read_component::<Position>()?
                .iter()
                .filter(|(entity, _)| moving.contains(*entity))
                .map(|(_, position)| position.0.y)
                .fold(f64::MIN, f64::max);
            println!(
                "frame {:>3}: {} particles, highest at y = {:.2}",
                frame,
                moving.len(),
                highest
            );
        }
    }

    println!("\nRegistered components: {:?}", world.component_names());
    Ok(())
}
