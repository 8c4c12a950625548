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
//! System dependency graph and phased scheduling
//!
//! Systems are registered with a [`SystemGraphBuilder`] together with
//! "runs after" constraints. [`SystemGraphBuilder::build`] peels the graph
//! layer by layer (Kahn's algorithm): every system whose prerequisites have
//! all been scheduled forms the next [`Phase`]. Phases execute in order;
//! systems inside a phase have no ordering constraint between them.
//!
//! Constraints are supplied by the caller, not inferred from component
//! access. Two systems in the same phase may touch the same storage, so
//! phases are run sequentially here.
//!
//! # Determinism
//!
//! Within a phase, systems keep their registration order, so the same
//! registrations always produce the same schedule.

use crate::ecs::{System, SystemId, World};
use crate::error::{EcsError, Result};
use std::any::TypeId;
use std::collections::{HashMap, HashSet};
use tracing::{debug, warn};

/// A set of systems with no unresolved dependency on each other
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Phase {
    systems: Vec<SystemId>,
}

impl Phase {
    /// Systems in this phase, in registration order
    pub fn systems(&self) -> &[SystemId] {
        &self.systems
    }

    /// Number of systems in this phase
    pub fn len(&self) -> usize {
        self.systems.len()
    }

    /// True if the phase holds no systems
    pub fn is_empty(&self) -> bool {
        self.systems.is_empty()
    }

    /// True if system `S` runs in this phase
    pub fn contains<S: System>(&self) -> bool {
        self.systems.contains(&SystemId::of::<S>())
    }

    /// Run every system in this phase, in order
    pub fn run(&self, world: &mut World, dt: f64) {
        for system in &self.systems {
            system.run(world, dt);
        }
    }
}

/// Ordered phases produced by [`SystemGraphBuilder::build`]
///
/// # Examples
///
/// ```
/// use ecs_core::ecs::{System, SystemGraphBuilder};
/// use ecs_core::World;
///
/// struct Input;
/// impl System for Input {
///     fn run(_world: &mut World, _dt: f64) {}
/// }
///
/// struct Physics;
/// impl System for Physics {
///     fn run(_world: &mut World, _dt: f64) {}
/// }
///
/// let schedule = SystemGraphBuilder::new()
///     .add_system::<Physics>()
///     .add_system::<Input>()
///     .order_systems::<Input, Physics>()
///     .build()
///     .unwrap();
///
/// assert_eq!(schedule.phase_count(), 2);
/// assert!(schedule.phases()[0].contains::<Input>());
///
/// let mut world = World::new();
/// schedule.init(&mut world).unwrap();
/// schedule.run(&mut world, 1.0 / 60.0);
/// ```
#[derive(Debug, Clone, Default)]
pub struct Schedule {
    phases: Vec<Phase>,
}

impl Schedule {
    /// Phases in execution order
    pub fn phases(&self) -> &[Phase] {
        &self.phases
    }

    /// Number of phases
    pub fn phase_count(&self) -> usize {
        self.phases.len()
    }

    /// Total number of scheduled systems
    pub fn system_count(&self) -> usize {
        self.phases.iter().map(Phase::len).sum()
    }

    /// Index of the phase system `S` runs in
    pub fn phase_of<S: System>(&self) -> Option<usize> {
        self.phases.iter().position(|phase| phase.contains::<S>())
    }

    /// Call every system's `init` hook once, in phase order
    pub fn init(&self, world: &mut World) -> Result<()> {
        for system in self.phases.iter().flat_map(|phase| phase.systems()) {
            system.init(world).map_err(|err| EcsError::SystemInit {
                system: system.name(),
                source: Box::new(err),
            })?;
        }
        Ok(())
    }

    /// Run a single phase
    pub fn run_phase(&self, index: usize, world: &mut World, dt: f64) -> Result<()> {
        let phase = self.phases.get(index).ok_or(EcsError::PhaseOutOfRange {
            index,
            count: self.phases.len(),
        })?;
        phase.run(world, dt);
        Ok(())
    }

    /// Run every phase in order
    pub fn run(&self, world: &mut World, dt: f64) {
        for phase in &self.phases {
            phase.run(world, dt);
        }
    }
}

/// Accumulates systems and ordering constraints, then builds a [`Schedule`]
///
/// Registration is idempotent: adding a system or an edge twice has no
/// further effect. Edges may be declared before or after the systems they
/// name; an edge naming a system that is never added is dropped at build
/// time.
#[derive(Debug, Clone, Default)]
pub struct SystemGraphBuilder {
    systems: Vec<SystemId>,
    /// dependent -> prerequisites
    edges: HashMap<TypeId, Vec<SystemId>>,
}

impl SystemGraphBuilder {
    /// Create an empty builder
    pub fn new() -> Self {
        Self::default()
    }

    /// Register system `S`
    pub fn add_system<S: System>(&mut self) -> &mut Self {
        let id = SystemId::of::<S>();
        if !self.systems.contains(&id) {
            debug!(system = id.name(), "registered system");
            self.systems.push(id);
        }
        self
    }

    /// Require `Src` to run in an earlier phase than `Dst`
    ///
    /// A self-edge (`Src == Dst`) is trivially satisfied and ignored.
    pub fn order_systems<Src: System, Dst: System>(&mut self) -> &mut Self {
        let src = SystemId::of::<Src>();
        let dst = SystemId::of::<Dst>();
        if src == dst {
            warn!(system = src.name(), "ignoring self-dependency");
            return self;
        }
        let prerequisites = self.edges.entry(dst.type_id()).or_default();
        if !prerequisites.contains(&src) {
            prerequisites.push(src);
        }
        self
    }

    /// Number of registered systems
    pub fn system_count(&self) -> usize {
        self.systems.len()
    }

    /// Layer the graph into phases
    ///
    /// Fails with [`EcsError::CyclicDependency`] naming the systems that
    /// could never be scheduled if the constraints contain a cycle.
    pub fn build(&self) -> Result<Schedule> {
        let registered: HashSet<TypeId> = self.systems.iter().map(SystemId::type_id).collect();

        let mut waiting_on: HashMap<TypeId, HashSet<TypeId>> = HashMap::new();
        for system in &self.systems {
            let prerequisites = self
                .edges
                .get(&system.type_id())
                .map(Vec::as_slice)
                .unwrap_or_default();
            let mut kept = HashSet::new();
            for prerequisite in prerequisites {
                if registered.contains(&prerequisite.type_id()) {
                    kept.insert(prerequisite.type_id());
                } else {
                    warn!(
                        system = system.name(),
                        prerequisite = prerequisite.name(),
                        "dropping edge to unregistered system"
                    );
                }
            }
            waiting_on.insert(system.type_id(), kept);
        }
        for (dependent, prerequisites) in &self.edges {
            if !registered.contains(dependent) {
                for prerequisite in prerequisites {
                    warn!(
                        prerequisite = prerequisite.name(),
                        "dropping edge from unregistered system"
                    );
                }
            }
        }

        let mut pending = self.systems.clone();
        let mut phases = Vec::new();
        while !pending.is_empty() {
            let (ready, blocked): (Vec<SystemId>, Vec<SystemId>) = pending
                .into_iter()
                .partition(|system| waiting_on[&system.type_id()].is_empty());
            if ready.is_empty() {
                pending = blocked;
                break;
            }
            for system in &blocked {
                if let Some(prerequisites) = waiting_on.get_mut(&system.type_id()) {
                    for done in &ready {
                        prerequisites.remove(&done.type_id());
                    }
                }
            }
            phases.push(Phase { systems: ready });
            pending = blocked;
        }

        let schedule = Schedule { phases };
        if schedule.system_count() != self.systems.len() {
            return Err(EcsError::CyclicDependency {
                systems: pending.iter().map(SystemId::name).collect(),
            });
        }
        debug!(
            phases = schedule.phase_count(),
            systems = schedule.system_count(),
            "built system schedule"
        );
        Ok(schedule)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    macro_rules! test_systems {
        ($($name:ident),+) => {
            $(
                struct $name;
                impl System for $name {
                    fn run(world: &mut World, _dt: f64) {
                        world.create_entity();
                    }
                    fn name() -> &'static str {
                        stringify!($name)
                    }
                }
            )+
        };
    }

    test_systems!(A, B, C, D, E);

    fn names(phase: &Phase) -> Vec<&'static str> {
        phase.systems().iter().map(|s| s.name()).collect()
    }

    #[test]
    fn test_single_system_single_phase() {
        let schedule = SystemGraphBuilder::new().add_system::<A>().build().unwrap();
        assert_eq!(schedule.phase_count(), 1);
        assert_eq!(names(&schedule.phases()[0]), vec!["A"]);
    }

    #[test]
    fn test_empty_builder() {
        let schedule = SystemGraphBuilder::new().build().unwrap();
        assert_eq!(schedule.phase_count(), 0);
        let mut world = World::new();
        schedule.run(&mut world, 1.0);
    }

    #[test]
    fn test_ordered_pair_gives_two_phases() {
        let schedule = SystemGraphBuilder::new()
            .add_system::<B>()
            .add_system::<A>()
            .order_systems::<A, B>()
            .build()
            .unwrap();
        assert_eq!(schedule.phase_count(), 2);
        assert_eq!(names(&schedule.phases()[0]), vec!["A"]);
        assert_eq!(names(&schedule.phases()[1]), vec!["B"]);
    }

    #[test]
    fn test_independent_systems_share_a_phase() {
        let schedule = SystemGraphBuilder::new()
            .add_system::<A>()
            .add_system::<B>()
            .add_system::<C>()
            .build()
            .unwrap();
        assert_eq!(schedule.phase_count(), 1);
        assert_eq!(names(&schedule.phases()[0]), vec!["A", "B", "C"]);
    }

    #[test]
    fn test_diamond() {
        // A -> {B, C} -> D, E unconstrained
        let schedule = SystemGraphBuilder::new()
            .add_system::<D>()
            .add_system::<C>()
            .add_system::<B>()
            .add_system::<A>()
            .add_system::<E>()
            .order_systems::<A, B>()
            .order_systems::<A, C>()
            .order_systems::<B, D>()
            .order_systems::<C, D>()
            .build()
            .unwrap();
        assert_eq!(schedule.phase_count(), 3);
        assert_eq!(names(&schedule.phases()[0]), vec!["A", "E"]);
        assert_eq!(names(&schedule.phases()[1]), vec!["C", "B"]);
        assert_eq!(names(&schedule.phases()[2]), vec!["D"]);
        assert_eq!(schedule.phase_of::<D>(), Some(2));
        assert_eq!(schedule.system_count(), 5);
    }

    #[test]
    fn test_self_edge_is_trivially_satisfied() {
        let schedule = SystemGraphBuilder::new()
            .add_system::<A>()
            .order_systems::<A, A>()
            .build()
            .unwrap();
        assert_eq!(schedule.phase_count(), 1);
        assert!(schedule.phases()[0].contains::<A>());
    }

    #[test]
    fn test_edges_to_unregistered_systems_are_pruned() {
        let schedule = SystemGraphBuilder::new()
            .add_system::<B>()
            .order_systems::<A, B>()
            .order_systems::<B, C>()
            .build()
            .unwrap();
        assert_eq!(schedule.phase_count(), 1);
        assert_eq!(names(&schedule.phases()[0]), vec!["B"]);
        assert_eq!(schedule.phase_of::<A>(), None);
    }

    #[test]
    fn test_duplicate_registration_is_idempotent() {
        let mut builder = SystemGraphBuilder::new();
        builder
            .add_system::<A>()
            .add_system::<A>()
            .add_system::<B>()
            .order_systems::<A, B>()
            .order_systems::<A, B>();
        assert_eq!(builder.system_count(), 2);
        let schedule = builder.build().unwrap();
        assert_eq!(schedule.system_count(), 2);
        assert_eq!(schedule.phase_count(), 2);
    }

    #[test]
    fn test_cycle_is_reported() {
        let result = SystemGraphBuilder::new()
            .add_system::<A>()
            .add_system::<B>()
            .add_system::<C>()
            .add_system::<D>()
            .order_systems::<A, B>()
            .order_systems::<B, C>()
            .order_systems::<C, B>()
            .order_systems::<C, D>()
            .build();
        match result {
            Err(EcsError::CyclicDependency { systems }) => {
                assert_eq!(systems, vec!["B", "C", "D"]);
            }
            other => panic!("expected cycle error, got {:?}", other.map(|s| s.phase_count())),
        }
    }

    #[test]
    fn test_run_phase_bounds() {
        let schedule = SystemGraphBuilder::new()
            .add_system::<A>()
            .add_system::<B>()
            .order_systems::<A, B>()
            .build()
            .unwrap();
        let mut world = World::new();
        schedule.run_phase(1, &mut world, 0.5).unwrap();
        assert_eq!(world.entity_count(), 1);
        assert!(matches!(
            schedule.run_phase(2, &mut world, 0.5),
            Err(EcsError::PhaseOutOfRange { index: 2, count: 2 })
        ));
        schedule.run(&mut world, 0.5);
        assert_eq!(world.entity_count(), 3);
    }
}
