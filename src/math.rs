//! 2D math for the transform hierarchy
//!
//! All rotations in the public API are in degrees. Conversion to radians
//! happens exactly once, at the point where sin/cos are evaluated.

use std::ops::{Add, AddAssign, Mul, Sub};
use serde::{Serialize, Deserialize};

/// Tolerance used when comparing computed world-space values.
pub const EPSILON: f32 = 1e-4;

/// 2D Vector
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Vec2 {
    pub x: f32,
    pub y: f32,
}

impl Vec2 {
    pub const ZERO: Vec2 = Vec2 { x: 0.0, y: 0.0 };
    pub const ONE: Vec2 = Vec2 { x: 1.0, y: 1.0 };

    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Same value on both axes.
    pub fn splat(v: f32) -> Self {
        Self { x: v, y: v }
    }

    pub fn scale(self, s: f32) -> Vec2 {
        Vec2 {
            x: self.x * s,
            y: self.y * s,
        }
    }

    /// Componentwise product (non-uniform scale).
    pub fn mul_elements(self, other: Vec2) -> Vec2 {
        Vec2 {
            x: self.x * other.x,
            y: self.y * other.y,
        }
    }

    /// Rotate counter-clockwise around the origin by `degrees`.
    pub fn rotate_deg(self, degrees: f32) -> Vec2 {
        let (sin, cos) = degrees.to_radians().sin_cos();
        Vec2 {
            x: self.x * cos - self.y * sin,
            y: self.x * sin + self.y * cos,
        }
    }

    /// Angle of this vector in degrees, measured from +X towards +Y.
    pub fn angle_deg(self) -> f32 {
        self.y.atan2(self.x).to_degrees()
    }

    /// Mean of both components. Used when projecting onto a uniform scale.
    pub fn average(self) -> f32 {
        (self.x + self.y) * 0.5
    }

    pub fn approx_eq(self, other: Vec2, epsilon: f32) -> bool {
        (self.x - other.x).abs() <= epsilon && (self.y - other.y).abs() <= epsilon
    }
}

impl Add for Vec2 {
    type Output = Vec2;
    fn add(self, other: Vec2) -> Vec2 {
        Vec2 {
            x: self.x + other.x,
            y: self.y + other.y,
        }
    }
}

impl AddAssign for Vec2 {
    fn add_assign(&mut self, other: Vec2) {
        self.x += other.x;
        self.y += other.y;
    }
}

impl Sub for Vec2 {
    type Output = Vec2;
    fn sub(self, other: Vec2) -> Vec2 {
        Vec2 {
            x: self.x - other.x,
            y: self.y - other.y,
        }
    }
}

impl Mul<f32> for Vec2 {
    type Output = Vec2;
    fn mul(self, s: f32) -> Vec2 {
        self.scale(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rotate_quarter_turn() {
        let v = Vec2::new(1.0, 0.0).rotate_deg(90.0);
        assert!(v.approx_eq(Vec2::new(0.0, 1.0), EPSILON));
    }

    #[test]
    fn test_rotate_negative() {
        let v = Vec2::new(0.0, 2.0).rotate_deg(-90.0);
        assert!(v.approx_eq(Vec2::new(2.0, 0.0), EPSILON));
    }

    #[test]
    fn test_angle_deg() {
        assert!((Vec2::new(0.0, 5.0).angle_deg() - 90.0).abs() < EPSILON);
        assert!((Vec2::new(-1.0, 0.0).angle_deg() - 180.0).abs() < EPSILON);
    }

    #[test]
    fn test_mul_elements_and_average() {
        let v = Vec2::new(2.0, 3.0).mul_elements(Vec2::new(3.0, 1.0));
        assert_eq!(v, Vec2::new(6.0, 3.0));
        assert_eq!(v.average(), 4.5);
    }
}
