//! Math utilities and types
//!
//! Provides the fundamental math types used by the geometry and partition
//! layers. The world is Z-up: gameplay movement happens on the XY plane and
//! Z is height.

pub use nalgebra::{Matrix3, Rotation3, Vector2, Vector3};

/// 2D vector type
pub type Vec2 = Vector2<f32>;

/// 3D vector type
pub type Vec3 = Vector3<f32>;

/// 3x3 matrix type
pub type Mat3 = Matrix3<f32>;

/// Rotation type used by oriented shapes
pub type Rotation = Rotation3<f32>;

/// Squared-length threshold below which a vector counts as zero
pub const NEAR_ZERO_EPSILON: f32 = 1e-6;

/// Yaw / pitch / roll orientation in radians.
///
/// Yaw rotates about +Z, pitch about +Y and roll about +X, applied in the
/// order roll, pitch, yaw.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Orientation {
    /// Rotation about the Z axis
    pub yaw: f32,
    /// Rotation about the Y axis
    pub pitch: f32,
    /// Rotation about the X axis
    pub roll: f32,
}

impl Orientation {
    /// The identity orientation
    pub const ZERO: Self = Self { yaw: 0.0, pitch: 0.0, roll: 0.0 };

    /// Create an orientation from yaw, pitch and roll
    pub const fn new(yaw: f32, pitch: f32, roll: f32) -> Self {
        Self { yaw, pitch, roll }
    }

    /// Create a yaw-only orientation
    pub const fn from_yaw(yaw: f32) -> Self {
        Self { yaw, pitch: 0.0, roll: 0.0 }
    }

    /// Rotation that maps local shape space into world space
    pub fn rotation(&self) -> Rotation {
        Rotation::from_euler_angles(self.roll, self.pitch, self.yaw)
    }

    /// Rotation matrix with every element replaced by its absolute value.
    ///
    /// Multiplying local half-extents by this gives the world-space half
    /// extents of the rotated box.
    pub fn abs_matrix(&self) -> Mat3 {
        self.rotation().into_inner().abs()
    }
}

/// Math utility functions
pub mod utils {
    use super::{Vec2, Vec3, NEAR_ZERO_EPSILON};

    /// Convert degrees to radians
    pub fn deg_to_rad(degrees: f32) -> f32 {
        degrees.to_radians()
    }

    /// True if the vector's squared length is below [`NEAR_ZERO_EPSILON`]
    pub fn is_near_zero(v: &Vec3) -> bool {
        v.norm_squared() < NEAR_ZERO_EPSILON
    }

    /// Drop the Z component
    pub fn to_2d(v: &Vec3) -> Vec2 {
        Vec2::new(v.x, v.y)
    }

    /// 2D cross product (Z of the 3D cross product)
    pub fn cross_2d(a: &Vec2, b: &Vec2) -> f32 {
        a.x * b.y - a.y * b.x
    }

    /// Normalize in the XY plane, returning `fallback` for near-zero input
    pub fn safe_normalize_2d(v: &Vec3, fallback: Vec3) -> Vec3 {
        let flat = Vec3::new(v.x, v.y, 0.0);
        let len_sq = flat.norm_squared();
        if len_sq < NEAR_ZERO_EPSILON {
            fallback
        } else {
            flat / len_sq.sqrt()
        }
    }

    /// Squared distance from `p` to the segment `a`-`b` in 2D
    pub fn segment_point_distance_sq_2d(a: &Vec2, b: &Vec2, p: &Vec2) -> f32 {
        let ab = b - a;
        let len_sq = ab.norm_squared();
        if len_sq < NEAR_ZERO_EPSILON {
            return (p - a).norm_squared();
        }
        let t = ((p - a).dot(&ab) / len_sq).clamp(0.0, 1.0);
        (p - (a + ab * t)).norm_squared()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::f32::consts::FRAC_PI_2;

    const EPSILON: f32 = 1e-6;

    #[test]
    fn test_yaw_rotates_x_onto_y() {
        let rotated = Orientation::from_yaw(FRAC_PI_2).rotation() * Vec3::x();
        assert_relative_eq!(rotated, Vec3::y(), epsilon = EPSILON);
    }

    #[test]
    fn test_abs_matrix_of_quarter_turn() {
        let m = Orientation::from_yaw(FRAC_PI_2).abs_matrix();
        let extents = m * Vec3::new(1.0, 2.0, 3.0);
        assert_relative_eq!(extents, Vec3::new(2.0, 1.0, 3.0), epsilon = EPSILON);
    }

    #[test]
    fn test_safe_normalize_2d_fallback() {
        let n = utils::safe_normalize_2d(&Vec3::new(0.0, 0.0, 5.0), Vec3::z());
        assert_eq!(n, Vec3::z());
        let n = utils::safe_normalize_2d(&Vec3::new(3.0, 4.0, 9.0), Vec3::z());
        assert_relative_eq!(n, Vec3::new(0.6, 0.8, 0.0), epsilon = EPSILON);
    }
}
