//! Shape parameters of a bounds
//!
//! [`Geometry`] holds only the dimensions of a shape. Placement (center and
//! orientation) belongs to [`Bounds`](super::Bounds), which passes it in
//! whenever a formula depends on it.
//!
//! Triangles and wedges are placed so that their apex sits two thirds of the
//! length behind the bounds center and their base one third in front of it.

use crate::foundation::math::{utils, Orientation, Rotation, Vec3};

/// Fraction of the length between a triangle's apex and the bounds center
pub const APEX_FRACTION: f32 = 0.666_666_7;

/// Fraction of the length between the bounds center and a triangle's base
pub const BASE_FRACTION: f32 = 0.333_333_34;

/// Ratio of eye height to half height
pub const EYE_HEIGHT_FRACTION: f32 = 0.8333;

/// Shape dimensions, tagged by shape kind
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum Geometry {
    /// No shape; every test against it fails
    #[default]
    None,
    /// Box that rotates with the bounds
    Obb {
        /// Half width (X), half length (Y), half height (Z)
        half_extents: Vec3,
    },
    /// Box that stays axis aligned, grown to enclose its rotated footprint
    Aabb {
        /// Half width (X), half length (Y), half height (Z) before rotation
        half_extents: Vec3,
        /// World-axis half extents after rotation; refreshed on orientation
        /// or scale changes
        oriented: Vec3,
    },
    /// Upright capsule
    Capsule {
        /// Radius of the capsule
        radius: f32,
        /// Half length of the core segment
        half_height: f32,
    },
    /// Sphere
    Sphere {
        /// Radius of the sphere
        radius: f32,
    },
    /// Flat isosceles triangle pointing along -X
    Triangle {
        /// Length of the base edge
        base: f32,
        /// Half height used for vertical extents
        half_height: f32,
        /// Distance from apex to base
        length: f32,
    },
    /// Truncated triangle: a trapezoid with a narrow back edge
    Wedge {
        /// Length of the narrow back edge
        base_width: f32,
        /// Length of the wide front edge
        base: f32,
        /// Half height used for vertical extents
        half_height: f32,
        /// Distance from back edge to front edge
        length: f32,
    },
}

/// Length of the base of an isosceles triangle with the given apex angle
fn base_from_angle(angle_degrees: f32, length: f32) -> f32 {
    2.0 * length * utils::deg_to_rad(angle_degrees * 0.5).tan()
}

/// Rescale a triangle's length while keeping its apex angle
fn scale_keeping_angle(base: &mut f32, length: &mut f32, scale: f32) {
    let half_angle = (*base * 0.5 / *length).atan();
    *length *= scale;
    *base = half_angle.tan() * 2.0 * *length;
}

impl Geometry {
    /// Box from full dimensions
    pub fn new_box(width: f32, length: f32, height: f32, axis_aligned: bool, orientation: &Orientation) -> Self {
        let half_extents = Vec3::new(width * 0.5, length * 0.5, height * 0.5);
        if axis_aligned {
            Self::Aabb {
                half_extents,
                oriented: orientation.abs_matrix() * half_extents,
            }
        } else {
            Self::Obb { half_extents }
        }
    }

    /// Upright capsule
    pub fn new_capsule(radius: f32, half_height: f32) -> Self {
        Self::Capsule { radius, half_height }
    }

    /// Sphere
    pub fn new_sphere(radius: f32) -> Self {
        Self::Sphere { radius }
    }

    /// Isosceles triangle from its apex angle
    pub fn new_triangle(angle_degrees: f32, half_height: f32, length: f32) -> Self {
        Self::Triangle {
            base: base_from_angle(angle_degrees, length),
            half_height,
            length,
        }
    }

    /// Wedge from its apex angle and back edge width
    pub fn new_wedge(angle_degrees: f32, half_height: f32, length: f32, base_width: f32) -> Self {
        Self::Wedge {
            base_width,
            base: base_from_angle(angle_degrees, length),
            half_height,
            length,
        }
    }

    /// Name of the shape kind, for logs
    pub fn kind(&self) -> &'static str {
        match self {
            Self::None => "None",
            Self::Obb { .. } => "OBB",
            Self::Aabb { .. } => "AABB",
            Self::Capsule { .. } => "Capsule",
            Self::Sphere { .. } => "Sphere",
            Self::Triangle { .. } => "Triangle",
            Self::Wedge { .. } => "Wedge",
        }
    }

    /// True for [`Geometry::None`]
    pub fn is_none(&self) -> bool {
        matches!(self, Self::None)
    }

    /// True for triangles and wedges
    pub fn is_flat(&self) -> bool {
        matches!(self, Self::Triangle { .. } | Self::Wedge { .. })
    }

    /// Recompute the cached world-axis extents of an axis-aligned box
    pub fn refresh_orientation(&mut self, orientation: &Orientation) {
        if let Self::Aabb { half_extents, oriented } = self {
            *oriented = orientation.abs_matrix() * *half_extents;
        }
    }

    /// Uniform scale.
    ///
    /// Triangles and wedges keep their apex angle: the base is rederived from
    /// the scaled length. Capsules only scale their radius.
    pub fn scale(&mut self, scale: f32, orientation: &Orientation) {
        match self {
            Self::None => {}
            Self::Obb { half_extents } => *half_extents *= scale,
            Self::Aabb { half_extents, .. } => *half_extents *= scale,
            Self::Capsule { radius, .. } | Self::Sphere { radius } => *radius *= scale,
            Self::Triangle { base, length, .. } => scale_keeping_angle(base, length, scale),
            Self::Wedge { base_width, base, length, .. } => {
                scale_keeping_angle(base, length, scale);
                *base_width *= scale;
            }
        }
        self.refresh_orientation(orientation);
    }

    /// Set the radius of a sphere or capsule. Returns false for other shapes.
    pub fn set_radius(&mut self, value: f32) -> bool {
        match self {
            Self::Capsule { radius, .. } | Self::Sphere { radius } => {
                *radius = value;
                true
            }
            _ => false,
        }
    }

    /// Half of the shape's vertical extent
    pub fn half_height(&self) -> f32 {
        match *self {
            Self::None => 0.0,
            Self::Obb { half_extents } | Self::Aabb { half_extents, .. } => half_extents.z,
            Self::Capsule { half_height, .. } | Self::Triangle { half_height, .. } | Self::Wedge { half_height, .. } => {
                half_height
            }
            Self::Sphere { radius } => radius,
        }
    }

    /// Distance from the bounds center to the apex of a triangle or wedge
    pub fn center_offset(&self) -> f32 {
        match *self {
            Self::Triangle { length, .. } | Self::Wedge { length, .. } => length * APEX_FRACTION,
            _ => 0.0,
        }
    }

    /// Triangle vertices relative to the center, before rotation
    pub fn triangle_local_vertices(&self) -> Option<[Vec3; 3]> {
        let Self::Triangle { base, length, .. } = *self else {
            return None;
        };
        Some([
            Vec3::new(-length * APEX_FRACTION, 0.0, 0.0),
            Vec3::new(length * BASE_FRACTION, -base * 0.5, 0.0),
            Vec3::new(length * BASE_FRACTION, base * 0.5, 0.0),
        ])
    }

    /// Wedge corners relative to the center, before rotation.
    ///
    /// Order: back edge (-Y, +Y), then front edge (+Y, -Y).
    pub fn wedge_local_vertices(&self) -> Option<[Vec3; 4]> {
        let Self::Wedge { base_width, base, length, .. } = *self else {
            return None;
        };
        Some([
            Vec3::new(-length * APEX_FRACTION, -base_width * 0.5, 0.0),
            Vec3::new(-length * APEX_FRACTION, base_width * 0.5, 0.0),
            Vec3::new(length * BASE_FRACTION, base * 0.5, 0.0),
            Vec3::new(length * BASE_FRACTION, -base * 0.5, 0.0),
        ])
    }

    /// Radius of the shape's footprint on the XY plane
    pub fn radius(&self, rotation: &Rotation) -> f32 {
        match *self {
            Self::None => 0.0,
            Self::Obb { half_extents } => half_extents.x.hypot(half_extents.y),
            Self::Aabb { oriented, .. } => oriented.x.hypot(oriented.y),
            Self::Capsule { radius, .. } | Self::Sphere { radius } => radius,
            Self::Triangle { .. } => self
                .triangle_local_vertices()
                .map_or(0.0, |vertices| vertices.iter().map(|v| v.norm()).fold(0.0, f32::max)),
            Self::Wedge { .. } => self.wedge_local_vertices().map_or(0.0, |vertices| {
                let v1 = rotation * vertices[1];
                let v2 = rotation * vertices[2];
                (v1.x * v1.x + v1.y * v1.y).max(v2.x * v2.x + v2.y * v2.y).sqrt()
            }),
        }
    }

    /// Radius of a sphere around the center that encloses the whole shape
    pub fn sphere_radius(&self, rotation: &Rotation) -> f32 {
        match *self {
            Self::None => 0.0,
            Self::Obb { half_extents } => half_extents.norm(),
            Self::Aabb { oriented, .. } => oriented.norm(),
            Self::Capsule { radius, half_height } => half_height + radius,
            Self::Sphere { radius } => radius,
            Self::Triangle { half_height, .. } => self.triangle_local_vertices().map_or(0.0, |vertices| {
                vertices
                    .iter()
                    .map(|v| {
                        let mut world = rotation * v;
                        world.z = half_height;
                        world.norm()
                    })
                    .fold(0.0, f32::max)
            }),
            Self::Wedge { half_height, .. } => self.wedge_local_vertices().map_or(0.0, |vertices| {
                vertices
                    .iter()
                    .map(|v| (rotation * v + Vec3::new(0.0, 0.0, half_height)).norm())
                    .fold(0.0, f32::max)
            }),
        }
    }
}
