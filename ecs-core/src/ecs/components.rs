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
//! Kinematic components
//!
//! A small built-in vocabulary for moving things around: [`Position`] and
//! [`Velocity`], both wrapping a double-precision [`Vector3`]. Positions
//! are held by nearly every entity and use the slot-indexed
//! [`VecStorage`]; velocities are sparser and use [`DenseStorage`].

use crate::ecs::{Component, DenseStorage, VecStorage};
use std::ops::{Add, AddAssign, Mul, Neg, Sub, SubAssign};

/// 3D vector with double-precision coordinates
///
/// # Examples
///
/// ```
/// use ecs_core::ecs::components::Vector3;
///
/// let v = Vector3::new(1.0, 2.0, 3.0) * 2.0;
/// assert_eq!(v, Vector3::new(2.0, 4.0, 6.0));
/// assert!(v.is_valid());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Vector3 {
    /// X coordinate
    pub x: f64,
    /// Y coordinate
    pub y: f64,
    /// Z coordinate
    pub z: f64,
}

impl Vector3 {
    /// The origin
    pub const ZERO: Vector3 = Vector3::new(0.0, 0.0, 0.0);

    /// Create a vector from its coordinates
    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Vector3 { x, y, z }
    }

    /// Check if all coordinates are finite (not NaN or infinite)
    pub fn is_valid(&self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.z.is_finite()
    }

    /// Dot product
    pub fn dot(&self, other: Vector3) -> f64 {
        self.x * other.x + self.y * other.y + self.z * other.z
    }

    /// Euclidean length
    pub fn length(&self) -> f64 {
        self.dot(*self).sqrt()
    }

    /// Coordinates as an array
    pub fn as_array(&self) -> [f64; 3] {
        [self.x, self.y, self.z]
    }
}

impl From<[f64; 3]> for Vector3 {
    fn from(arr: [f64; 3]) -> Self {
        Vector3::new(arr[0], arr[1], arr[2])
    }
}

impl Add for Vector3 {
    type Output = Vector3;

    fn add(self, rhs: Vector3) -> Vector3 {
        Vector3::new(self.x + rhs.x, self.y + rhs.y, self.z + rhs.z)
    }
}

impl AddAssign for Vector3 {
    fn add_assign(&mut self, rhs: Vector3) {
        *self = *self + rhs;
    }
}

impl Sub for Vector3 {
    type Output = Vector3;

    fn sub(self, rhs: Vector3) -> Vector3 {
        Vector3::new(self.x - rhs.x, self.y - rhs.y, self.z - rhs.z)
    }
}

impl SubAssign for Vector3 {
    fn sub_assign(&mut self, rhs: Vector3) {
        *self = *self - rhs;
    }
}

impl Mul<f64> for Vector3 {
    type Output = Vector3;

    fn mul(self, scalar: f64) -> Vector3 {
        Vector3::new(self.x * scalar, self.y * scalar, self.z * scalar)
    }
}

impl Neg for Vector3 {
    type Output = Vector3;

    fn neg(self) -> Vector3 {
        Vector3::new(-self.x, -self.y, -self.z)
    }
}

/// World-space position
///
/// # Examples
///
/// ```
/// use ecs_core::ecs::components::{Position, Vector3};
///
/// let pos = Position::new(1.0, 2.0, 3.0);
/// assert_eq!(pos.0, Vector3::new(1.0, 2.0, 3.0));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Position(pub Vector3);

impl Position {
    /// Create a position from its coordinates
    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Position(Vector3::new(x, y, z))
    }
}

impl Component for Position {
    type Storage = VecStorage<Self>;
}

/// Rate of change of position, in units per second
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Velocity(pub Vector3);

impl Velocity {
    /// Create a velocity from its components
    pub const fn new(dx: f64, dy: f64, dz: f64) -> Self {
        Velocity(Vector3::new(dx, dy, dz))
    }
}

impl Component for Velocity {
    type Storage = DenseStorage<Self>;
}
