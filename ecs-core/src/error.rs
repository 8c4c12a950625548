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
//! Error types shared by every layer of the core
//!
//! All failures here are logic errors surfaced synchronously at the call
//! site. Nothing is retried and nothing performs I/O.

use crate::ecs::Entity;

/// Result alias used throughout the crate
pub type Result<T> = std::result::Result<T, EcsError>;

/// Errors raised by the bitset, entity set, storages, world and scheduler
#[derive(Debug, thiserror::Error)]
pub enum EcsError {
    /// A mutation addressed an index at or beyond the tracked size
    #[error("index {index} out of bounds for length {len}")]
    IndexOutOfBounds {
        /// Offending index
        index: usize,
        /// Tracked size at the time of the call
        len: usize,
    },

    /// A freeable vector index was accessed or erased while marked free
    #[error("slot {index} is free")]
    SlotFree {
        /// Offending index
        index: usize,
    },

    /// Checked storage access on an entity the storage does not hold
    #[error("{entity} has no {component} component")]
    MissingEntity {
        /// Entity that was looked up
        entity: Entity,
        /// Component type name
        component: &'static str,
    },

    /// `add_component` was called twice for the same type
    #[error("component {0} is already registered")]
    ComponentAlreadyRegistered(&'static str),

    /// A storage was requested for a type that was never registered
    #[error("component {0} is not registered")]
    ComponentNotRegistered(&'static str),

    /// A split borrow named the same component type for both sides
    #[error("component {0} cannot be borrowed mutably and immutably at once")]
    StorageAliased(&'static str),

    /// The system graph contains a cycle; these systems never became ready
    #[error("circular dependency between systems: {}", .systems.join(", "))]
    CyclicDependency {
        /// Names of the systems left unscheduled
        systems: Vec<&'static str>,
    },

    /// A phase index beyond the built schedule
    #[error("phase {index} out of range for schedule with {count} phases")]
    PhaseOutOfRange {
        /// Requested phase
        index: usize,
        /// Number of phases in the schedule
        count: usize,
    },

    /// Every entity slot has been handed out and none is queued for reuse
    #[error("entity slots exhausted")]
    EntitiesExhausted,

    /// A system's one-time setup hook failed
    #[error("failed to initialize system {system}: {source}")]
    SystemInit {
        /// Name of the failing system
        system: &'static str,
        /// Underlying failure
        #[source]
        source: Box<EcsError>,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cycle_message_lists_systems() {
        let err = EcsError::CyclicDependency {
            systems: vec!["a", "b"],
        };
        assert_eq!(err.to_string(), "circular dependency between systems: a, b");
    }

    #[test]
    fn test_missing_entity_message() {
        let err = EcsError::MissingEntity {
            entity: Entity::new(3, 1),
            component: "Position",
        };
        assert!(err.to_string().contains("Position"));
        assert!(err.to_string().contains("gen: 1"));
    }
}
