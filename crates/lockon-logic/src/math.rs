//! Vector and rotator math shared by every lock-on system.
//!
//! World space is Z-up. Angles on [`Rotator`] are degrees; yaw is measured
//! counter-clockwise from +X around +Z, pitch is elevation above the XY plane.

use serde::{Deserialize, Serialize};

/// 3D vector / position
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq)]
pub struct Vec3 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Vec3 {
    pub const ZERO: Self = Self { x: 0.0, y: 0.0, z: 0.0 };
    pub const X: Self = Self { x: 1.0, y: 0.0, z: 0.0 };
    pub const Y: Self = Self { x: 0.0, y: 1.0, z: 0.0 };
    pub const Z: Self = Self { x: 0.0, y: 0.0, z: 1.0 };

    pub fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    pub fn dot(&self, other: &Self) -> f32 {
        self.x * other.x + self.y * other.y + self.z * other.z
    }

    pub fn length_squared(&self) -> f32 {
        self.dot(self)
    }

    pub fn length(&self) -> f32 {
        self.length_squared().sqrt()
    }

    pub fn distance_squared(&self, other: &Self) -> f32 {
        (*self - *other).length_squared()
    }

    pub fn distance(&self, other: &Self) -> f32 {
        self.distance_squared(other).sqrt()
    }

    /// Unit vector in the same direction, or `ZERO` for a degenerate input.
    pub fn normalize(&self) -> Self {
        let len = self.length();
        if len > f32::EPSILON && len.is_finite() {
            *self * (1.0 / len)
        } else {
            Self::ZERO
        }
    }

    pub fn is_nearly_zero(&self) -> bool {
        self.length_squared() <= 1.0e-8
    }

    /// Rotate around the +Z axis by `degrees` (counter-clockwise seen from above).
    pub fn rotate_about_z(&self, degrees: f32) -> Self {
        let (sin, cos) = degrees.to_radians().sin_cos();
        Self {
            x: self.x * cos - self.y * sin,
            y: self.x * sin + self.y * cos,
            z: self.z,
        }
    }

    /// Orientation that points along this vector (roll is always zero).
    pub fn rotation(&self) -> Rotator {
        let horizontal = (self.x * self.x + self.y * self.y).sqrt();
        Rotator {
            pitch: self.z.atan2(horizontal).to_degrees(),
            yaw: self.y.atan2(self.x).to_degrees(),
            roll: 0.0,
        }
    }
}

impl std::ops::Add for Vec3 {
    type Output = Self;
    fn add(self, other: Self) -> Self {
        Self {
            x: self.x + other.x,
            y: self.y + other.y,
            z: self.z + other.z,
        }
    }
}

impl std::ops::Sub for Vec3 {
    type Output = Self;
    fn sub(self, other: Self) -> Self {
        Self {
            x: self.x - other.x,
            y: self.y - other.y,
            z: self.z - other.z,
        }
    }
}

impl std::ops::Mul<f32> for Vec3 {
    type Output = Self;
    fn mul(self, scalar: f32) -> Self {
        Self {
            x: self.x * scalar,
            y: self.y * scalar,
            z: self.z * scalar,
        }
    }
}

impl std::ops::Neg for Vec3 {
    type Output = Self;
    fn neg(self) -> Self {
        self * -1.0
    }
}

/// Pitch / yaw / roll orientation in degrees.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq)]
pub struct Rotator {
    pub pitch: f32,
    pub yaw: f32,
    pub roll: f32,
}

impl Rotator {
    pub const ZERO: Self = Self { pitch: 0.0, yaw: 0.0, roll: 0.0 };

    pub fn new(pitch: f32, yaw: f32, roll: f32) -> Self {
        Self { pitch, yaw, roll }
    }

    /// Unit vector this rotation faces.
    pub fn forward(&self) -> Vec3 {
        let (sp, cp) = self.pitch.to_radians().sin_cos();
        let (sy, cy) = self.yaw.to_radians().sin_cos();
        Vec3::new(cp * cy, cp * sy, sp)
    }

    /// Every axis wrapped into `(-180, 180]`.
    pub fn normalized(&self) -> Self {
        Self {
            pitch: normalize_axis(self.pitch),
            yaw: normalize_axis(self.yaw),
            roll: normalize_axis(self.roll),
        }
    }

    /// Shortest signed rotation taking `other` onto `self`, per axis.
    pub fn delta(&self, other: &Self) -> Self {
        (*self - *other).normalized()
    }

    pub fn is_nearly_zero(&self, tolerance: f32) -> bool {
        self.pitch.abs() <= tolerance && self.yaw.abs() <= tolerance && self.roll.abs() <= tolerance
    }
}

impl std::ops::Add for Rotator {
    type Output = Self;
    fn add(self, other: Self) -> Self {
        Self {
            pitch: self.pitch + other.pitch,
            yaw: self.yaw + other.yaw,
            roll: self.roll + other.roll,
        }
    }
}

impl std::ops::Sub for Rotator {
    type Output = Self;
    fn sub(self, other: Self) -> Self {
        Self {
            pitch: self.pitch - other.pitch,
            yaw: self.yaw - other.yaw,
            roll: self.roll - other.roll,
        }
    }
}

impl std::ops::Mul<f32> for Rotator {
    type Output = Self;
    fn mul(self, scalar: f32) -> Self {
        Self {
            pitch: self.pitch * scalar,
            yaw: self.yaw * scalar,
            roll: self.roll * scalar,
        }
    }
}

/// Wrap an angle in degrees into `(-180, 180]`.
pub fn normalize_axis(degrees: f32) -> f32 {
    let wrapped = degrees.rem_euclid(360.0);
    if wrapped > 180.0 {
        wrapped - 360.0
    } else {
        wrapped
    }
}
