//! Three-component vector with in-place arithmetic.
//!
//! [`Vector`] is the leaf type of the engine. The mutating methods
//! ([`add`](Vector::add), [`subtract`](Vector::subtract),
//! [`scale`](Vector::scale)) modify the receiver and hand it back so calls
//! can be chained without allocating a new value every frame:
//!
//! ```ignore
//! let mut offset = particle.position;
//! offset.subtract(target).scale(delta * strength);
//! particle.velocity.subtract(offset);
//! ```
//!
//! Operator impls are provided as well for code that prefers value
//! semantics, and the type converts losslessly to and from [`glam::Vec3`].

use bytemuck::{Pod, Zeroable};
use glam::Vec3;
use std::ops::{AddAssign, Index, IndexMut, Mul, MulAssign, Neg, Sub, SubAssign};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// One of the three coordinate axes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Axis {
    X,
    Y,
    Z,
}

/// A point or direction in 3D space.
///
/// Laid out as three consecutive `f32`s so trail histories can be cast
/// straight into vertex buffers with [`bytemuck::cast_slice`].
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Pod, Zeroable)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Vector {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Vector {
    /// The zero vector.
    pub const ZERO: Self = Self::new(0.0, 0.0, 0.0);

    /// Create a vector from its components.
    #[inline]
    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    /// Create a vector on the XY plane.
    #[inline]
    pub const fn xy(x: f32, y: f32) -> Self {
        Self { x, y, z: 0.0 }
    }

    /// Add `other` to this vector in place.
    #[inline]
    pub fn add(&mut self, other: Vector) -> &mut Self {
        self.x += other.x;
        self.y += other.y;
        self.z += other.z;
        self
    }

    /// Subtract `other` from this vector in place.
    #[inline]
    pub fn subtract(&mut self, other: Vector) -> &mut Self {
        self.x -= other.x;
        self.y -= other.y;
        self.z -= other.z;
        self
    }

    /// Multiply every component by `scalar` in place.
    #[inline]
    pub fn scale(&mut self, scalar: f32) -> &mut Self {
        self.x *= scalar;
        self.y *= scalar;
        self.z *= scalar;
        self
    }

    #[inline]
    pub fn length_squared(&self) -> f32 {
        self.x * self.x + self.y * self.y + self.z * self.z
    }

    #[inline]
    pub fn length(&self) -> f32 {
        self.length_squared().sqrt()
    }

    /// Read a single component.
    #[inline]
    pub fn get(&self, axis: Axis) -> f32 {
        self[axis]
    }

    /// Overwrite a single component.
    #[inline]
    pub fn set(&mut self, axis: Axis, value: f32) -> &mut Self {
        self[axis] = value;
        self
    }
}

impl Index<Axis> for Vector {
    type Output = f32;

    fn index(&self, axis: Axis) -> &f32 {
        match axis {
            Axis::X => &self.x,
            Axis::Y => &self.y,
            Axis::Z => &self.z,
        }
    }
}

impl IndexMut<Axis> for Vector {
    fn index_mut(&mut self, axis: Axis) -> &mut f32 {
        match axis {
            Axis::X => &mut self.x,
            Axis::Y => &mut self.y,
            Axis::Z => &mut self.z,
        }
    }
}

// `Add` stays path-qualified so it never shadows the inherent `add`.
impl std::ops::Add for Vector {
    type Output = Vector;

    fn add(mut self, rhs: Vector) -> Vector {
        Vector::add(&mut self, rhs);
        self
    }
}

impl Sub for Vector {
    type Output = Vector;

    fn sub(mut self, rhs: Vector) -> Vector {
        self.subtract(rhs);
        self
    }
}

impl Mul<f32> for Vector {
    type Output = Vector;

    fn mul(mut self, rhs: f32) -> Vector {
        self.scale(rhs);
        self
    }
}

impl Neg for Vector {
    type Output = Vector;

    fn neg(self) -> Vector {
        Vector::new(-self.x, -self.y, -self.z)
    }
}

impl AddAssign for Vector {
    fn add_assign(&mut self, rhs: Vector) {
        Vector::add(self, rhs);
    }
}

impl SubAssign for Vector {
    fn sub_assign(&mut self, rhs: Vector) {
        self.subtract(rhs);
    }
}

impl MulAssign<f32> for Vector {
    fn mul_assign(&mut self, rhs: f32) {
        self.scale(rhs);
    }
}

impl From<Vec3> for Vector {
    fn from(v: Vec3) -> Self {
        Self::new(v.x, v.y, v.z)
    }
}

impl From<Vector> for Vec3 {
    fn from(v: Vector) -> Self {
        Vec3::new(v.x, v.y, v.z)
    }
}

impl From<[f32; 3]> for Vector {
    fn from([x, y, z]: [f32; 3]) -> Self {
        Self::new(x, y, z)
    }
}
