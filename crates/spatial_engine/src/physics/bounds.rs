//! Placed collision shapes
//!
//! A [`Bounds`] is one [`Geometry`] plus its world placement and collision
//! metadata. Every test first converts the bounds to a canonical shape from
//! [`collision`](super::collision) and runs the matching routine there.
//!
//! Unsupported combinations never fail hard: they log and report no contact.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::collision::intersection;
use super::collision::{Aabb, Capsule, Cylinder2, Obb, Segment, Sphere, SweepHit, Triangle};
use super::collision_types::{BlockingCheckFlags, BoundsCollisionType, BoundsFlags, BoundsMovementPowerBlockType};
use super::geometry::{Geometry, EYE_HEIGHT_FRACTION};
use crate::foundation::math::{utils, Orientation, Vec3};

/// Shape part of a bounds descriptor
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub enum ShapePrototype {
    /// No geometry
    #[default]
    None,
    /// Box given by full dimensions
    Box {
        /// Size along X
        width: f32,
        /// Size along Y
        length: f32,
        /// Size along Z
        height: f32,
        /// Keep the box aligned to the world axes when rotated
        #[serde(default)]
        axis_aligned: bool,
    },
    /// Upright capsule
    Capsule {
        /// Capsule radius
        radius: f32,
        /// Half length of the core segment
        height_from_center: f32,
    },
    /// Sphere
    Sphere {
        /// Sphere radius
        radius: f32,
    },
    /// Isosceles triangle
    Triangle {
        /// Apex angle in degrees
        angle_degrees: f32,
        /// Half height
        height_from_center: f32,
        /// Distance from apex to base
        length: f32,
    },
    /// Truncated triangle
    Wedge {
        /// Apex angle in degrees
        angle_degrees: f32,
        /// Half height
        height_from_center: f32,
        /// Distance from back edge to front edge
        length: f32,
        /// Width of the back edge
        base_width: f32,
    },
}

/// Declarative bounds descriptor, authored alongside entity data
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct BoundsPrototype {
    /// Shape and dimensions
    pub shape: ShapePrototype,
    /// Collision behavior
    pub collision_type: BoundsCollisionType,
    /// Picking uses the mesh instead of the bounds
    pub complex_picking_only: bool,
    /// Prevents other entities from spawning inside
    pub blocks_spawns: bool,
    /// Which movement powers are stopped
    pub blocks_movement_powers: BoundsMovementPowerBlockType,
    /// Prevents landing inside
    pub blocks_landing: bool,
}

impl BoundsPrototype {
    /// Descriptor for a shape with the given collision type
    pub fn new(shape: ShapePrototype, collision_type: BoundsCollisionType) -> Self {
        Self {
            shape,
            collision_type,
            ..Self::default()
        }
    }

    /// Whether these bounds block a check of the given kind
    pub fn blocks_check(&self, flags: BlockingCheckFlags) -> bool {
        let blocks_ground = matches!(
            self.blocks_movement_powers,
            BoundsMovementPowerBlockType::Ground | BoundsMovementPowerBlockType::All
        );
        let blocks_all = self.blocks_movement_powers == BoundsMovementPowerBlockType::All;

        (flags.contains(BlockingCheckFlags::CHECK_SPAWNS) && self.blocks_spawns)
            || (flags.contains(BlockingCheckFlags::CHECK_GROUND_MOVEMENT_POWERS) && blocks_ground)
            || (flags.contains(BlockingCheckFlags::CHECK_ALL_MOVEMENT_POWERS) && blocks_all)
            || (flags.contains(BlockingCheckFlags::CHECK_LANDING) && self.blocks_landing)
    }
}

/// A bounds converted to a canonical shape
#[derive(Debug, Clone, Copy)]
enum Shape {
    Obb(Obb),
    Aabb(Aabb),
    Capsule(Capsule),
    Sphere(Sphere),
    Triangle(Triangle),
    Wedge([Triangle; 2]),
}

/// One routine per unordered pair, so the result never depends on order
fn shapes_intersect(a: &Shape, b: &Shape) -> bool {
    match (a, b) {
        (Shape::Wedge(triangles), other) | (other, Shape::Wedge(triangles)) => triangles
            .iter()
            .any(|triangle| shapes_intersect(&Shape::Triangle(*triangle), other)),

        (Shape::Obb(a), Shape::Obb(b)) => a.intersects(b),
        (Shape::Obb(obb), Shape::Aabb(aabb)) | (Shape::Aabb(aabb), Shape::Obb(obb)) => {
            intersection::aabb_obb(aabb, obb)
        }
        (Shape::Obb(obb), Shape::Capsule(capsule)) | (Shape::Capsule(capsule), Shape::Obb(obb)) => {
            intersection::capsule_obb(capsule, obb)
        }
        (Shape::Obb(obb), Shape::Sphere(sphere)) | (Shape::Sphere(sphere), Shape::Obb(obb)) => {
            intersection::sphere_obb(sphere, obb)
        }
        (Shape::Obb(obb), Shape::Triangle(triangle)) | (Shape::Triangle(triangle), Shape::Obb(obb)) => {
            triangle.intersects_obb(obb)
        }

        (Shape::Aabb(a), Shape::Aabb(b)) => a.intersects(b),
        (Shape::Aabb(aabb), Shape::Capsule(capsule)) | (Shape::Capsule(capsule), Shape::Aabb(aabb)) => {
            intersection::capsule_aabb(capsule, aabb)
        }
        (Shape::Aabb(aabb), Shape::Sphere(sphere)) | (Shape::Sphere(sphere), Shape::Aabb(aabb)) => {
            sphere.intersects_aabb(aabb)
        }
        (Shape::Aabb(aabb), Shape::Triangle(triangle)) | (Shape::Triangle(triangle), Shape::Aabb(aabb)) => {
            triangle.intersects_aabb(aabb)
        }

        (Shape::Capsule(a), Shape::Capsule(b)) => a.intersects(b),
        (Shape::Capsule(capsule), Shape::Sphere(sphere)) | (Shape::Sphere(sphere), Shape::Capsule(capsule)) => {
            intersection::capsule_sphere(capsule, sphere)
        }
        (Shape::Capsule(capsule), Shape::Triangle(triangle)) | (Shape::Triangle(triangle), Shape::Capsule(capsule)) => {
            intersection::triangle_capsule(triangle, capsule)
        }

        (Shape::Sphere(a), Shape::Sphere(b)) => a.intersects(b),
        (Shape::Sphere(sphere), Shape::Triangle(triangle)) | (Shape::Triangle(triangle), Shape::Sphere(sphere)) => {
            intersection::triangle_sphere(triangle, sphere)
        }

        (Shape::Triangle(a), Shape::Triangle(b)) => a.intersects_2d(b),
    }
}

/// A shape placed in the world
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Bounds {
    geometry: Geometry,
    center: Vec3,
    orientation: Orientation,
    collision_type: BoundsCollisionType,
    flags: BoundsFlags,
}

impl Bounds {
    /// Empty bounds with no geometry
    pub fn new() -> Self {
        Self::default()
    }

    /// Bounds built from a descriptor and placed at `position`
    pub fn from_prototype(prototype: &BoundsPrototype, position: Vec3) -> Self {
        let mut bounds = Self::new();
        bounds.init_from_prototype(Some(prototype));
        bounds.center = position;
        bounds
    }

    /// Reset the shape from a descriptor.
    ///
    /// A missing descriptor leaves the bounds with no geometry.
    pub fn init_from_prototype(&mut self, prototype: Option<&BoundsPrototype>) {
        let Some(prototype) = prototype else {
            log::warn!("Bounds initialized without a prototype, falling back to no geometry");
            self.geometry = Geometry::None;
            self.collision_type = BoundsCollisionType::None;
            return;
        };

        self.geometry = match prototype.shape {
            ShapePrototype::None => Geometry::None,
            ShapePrototype::Box { width, length, height, axis_aligned } => {
                Geometry::new_box(width, length, height, axis_aligned, &self.orientation)
            }
            ShapePrototype::Capsule { radius, height_from_center } => Geometry::new_capsule(radius, height_from_center),
            ShapePrototype::Sphere { radius } => Geometry::new_sphere(radius),
            ShapePrototype::Triangle { angle_degrees, height_from_center, length } => {
                Geometry::new_triangle(angle_degrees, height_from_center, length)
            }
            ShapePrototype::Wedge { angle_degrees, height_from_center, length, base_width } => {
                Geometry::new_wedge(angle_degrees, height_from_center, length, base_width)
            }
        };
        self.collision_type = prototype.collision_type;
        self.flags = if prototype.complex_picking_only {
            BoundsFlags::COMPLEX_PICKING_ONLY
        } else {
            BoundsFlags::empty()
        };
    }

    /// Bounds with the given geometry at the origin
    pub fn with_geometry(geometry: Geometry, collision_type: BoundsCollisionType) -> Self {
        Self {
            geometry,
            collision_type,
            ..Self::default()
        }
    }

    /// Shape parameters
    pub fn geometry(&self) -> &Geometry {
        &self.geometry
    }

    /// World position
    pub fn center(&self) -> Vec3 {
        self.center
    }

    /// Move the bounds
    pub fn set_center(&mut self, center: Vec3) {
        self.center = center;
    }

    /// Current orientation
    pub fn orientation(&self) -> Orientation {
        self.orientation
    }

    /// Rotate the bounds, refreshing cached axis-aligned extents
    pub fn set_orientation(&mut self, orientation: Orientation) {
        self.orientation = orientation;
        self.geometry.refresh_orientation(&self.orientation);
    }

    /// Collision behavior
    pub fn collision_type(&self) -> BoundsCollisionType {
        self.collision_type
    }

    /// Change the collision behavior
    pub fn set_collision_type(&mut self, collision_type: BoundsCollisionType) {
        self.collision_type = collision_type;
    }

    /// Extra flags
    pub fn flags(&self) -> BoundsFlags {
        self.flags
    }

    /// Radius of the footprint on the XY plane
    pub fn radius(&self) -> f32 {
        self.geometry.radius(&self.orientation.rotation())
    }

    /// Set the radius of a sphere or capsule; logs an error for other shapes
    pub fn set_radius(&mut self, radius: f32) {
        if !self.geometry.set_radius(radius) {
            log::error!("Can't set the radius of a {} bounds", self.geometry.kind());
        }
    }

    /// Radius of the enclosing sphere
    pub fn sphere_radius(&self) -> f32 {
        self.geometry.sphere_radius(&self.orientation.rotation())
    }

    /// Half of the vertical extent
    pub fn half_height(&self) -> f32 {
        self.geometry.half_height()
    }

    /// Height of the eyes above the center
    pub fn eye_height(&self) -> f32 {
        self.half_height() * EYE_HEIGHT_FRACTION
    }

    /// Distance from the center to a triangle or wedge apex
    pub fn center_offset(&self) -> f32 {
        self.geometry.center_offset()
    }

    /// Uniform scale
    pub fn scale(&mut self, scale: f32) {
        self.geometry.scale(scale, &self.orientation);
    }

    /// Whether movement of these bounds is stopped by `other`
    pub fn can_be_blocked_by(&self, other: &Bounds, self_blocking: bool, other_blocking: bool) -> bool {
        (self.collision_type == BoundsCollisionType::Blocking || self_blocking)
            && (other.collision_type == BoundsCollisionType::Blocking || other_blocking)
    }

    /// Whether `other` blocks these bounds for the given kind of check.
    ///
    /// With no flags only the collision types decide. With flags, `other`
    /// must block that check according to its descriptor.
    pub fn is_blocked_by(&self, other: &Bounds, other_prototype: Option<&BoundsPrototype>, flags: BlockingCheckFlags) -> bool {
        let mut self_blocking = false;
        let mut other_blocking = false;

        if !flags.is_empty() {
            let Some(prototype) = other_prototype else {
                return false;
            };
            self_blocking = flags.contains(BlockingCheckFlags::CHECK_SELF);
            other_blocking = prototype.blocks_check(flags);
            if !other_blocking {
                return false;
            }
        }

        self.can_be_blocked_by(other, self_blocking, other_blocking) && self.intersects(other)
    }

    /// Exact axis-aligned extents
    pub fn to_aabb(&self) -> Aabb {
        let c = self.center;
        match self.geometry {
            Geometry::None => Aabb::from_center_extents(c, Vec3::zeros()),
            Geometry::Obb { half_extents } => Aabb::from_center_extents(c, self.orientation.abs_matrix() * half_extents),
            Geometry::Aabb { oriented, .. } => Aabb::from_center_extents(c, oriented),
            Geometry::Capsule { radius, half_height } => {
                Aabb::from_center_extents(c, Vec3::new(radius, radius, half_height + radius))
            }
            Geometry::Sphere { radius } => Aabb::from_center_extents(c, Vec3::repeat(radius)),
            Geometry::Triangle { half_height, .. } | Geometry::Wedge { half_height, .. } => {
                let mut aabb = match (self.to_triangle(), self.wedge_triangles()) {
                    (Some(triangle), _) => triangle.to_aabb(),
                    (None, Some([first, second])) => first.to_aabb().union(&second.to_aabb()),
                    (None, None) => Aabb::from_center_extents(c, Vec3::zeros()),
                };
                aabb.min.z = aabb.min.z.min(c.z - half_height);
                aabb.max.z = aabb.max.z.max(c.z + half_height);
                aabb
            }
        }
    }

    /// Oriented box for box shapes
    pub fn to_obb(&self) -> Option<Obb> {
        match self.geometry {
            Geometry::Obb { half_extents } => Some(Obb::new(
                self.center,
                half_extents,
                self.orientation.rotation().into_inner(),
            )),
            Geometry::Aabb { .. } => Some(Obb::from_aabb(&self.to_aabb())),
            _ => None,
        }
    }

    /// Upright capsule for capsule shapes
    pub fn to_capsule(&self) -> Option<Capsule> {
        let Geometry::Capsule { radius, half_height } = self.geometry else {
            return None;
        };
        let offset = Vec3::new(0.0, 0.0, half_height);
        Some(Capsule::new(self.center - offset, self.center + offset, radius))
    }

    /// Sphere for sphere shapes
    pub fn to_sphere(&self) -> Option<Sphere> {
        let Geometry::Sphere { radius } = self.geometry else {
            return None;
        };
        Some(Sphere::new(self.center, radius))
    }

    /// World-space triangle for triangle shapes
    pub fn to_triangle(&self) -> Option<Triangle> {
        let [v0, v1, v2] = self.geometry.triangle_local_vertices()?;
        let rotation = self.orientation.rotation();
        Some(Triangle::new(
            self.center + rotation * v0,
            self.center + rotation * v1,
            self.center + rotation * v2,
        ))
    }

    /// World-space corners of a wedge
    pub fn wedge_vertices(&self) -> Option<[Vec3; 4]> {
        let rotation = self.orientation.rotation();
        let local = self.geometry.wedge_local_vertices()?;
        Some(local.map(|v| self.center + rotation * v))
    }

    /// A wedge split into two triangles sharing the diagonal between its
    /// first and third corners
    pub fn wedge_triangles(&self) -> Option<[Triangle; 2]> {
        let [v0, v1, v2, v3] = self.wedge_vertices()?;
        Some([Triangle::new(v0, v1, v2), Triangle::new(v2, v3, v0)])
    }

    fn shape(&self) -> Option<Shape> {
        match self.geometry {
            Geometry::None => None,
            Geometry::Obb { .. } => self.to_obb().map(Shape::Obb),
            Geometry::Aabb { .. } => Some(Shape::Aabb(self.to_aabb())),
            Geometry::Capsule { .. } => self.to_capsule().map(Shape::Capsule),
            Geometry::Sphere { .. } => self.to_sphere().map(Shape::Sphere),
            Geometry::Triangle { .. } => self.to_triangle().map(Shape::Triangle),
            Geometry::Wedge { .. } => self.wedge_triangles().map(Shape::Wedge),
        }
    }

    fn intersects_shape(&self, other: &Shape) -> bool {
        self.shape().is_some_and(|shape| shapes_intersect(&shape, other))
    }

    /// Check if a point is inside the shape.
    ///
    /// Triangles and wedges only test the point's XY position.
    pub fn contains(&self, point: &Vec3) -> bool {
        match self.shape() {
            Some(Shape::Obb(obb)) => obb.contains_point(point),
            Some(Shape::Aabb(aabb)) => aabb.contains_point(point),
            Some(Shape::Capsule(capsule)) => capsule.contains_point(point),
            Some(Shape::Sphere(sphere)) => sphere.contains_point(point),
            Some(Shape::Triangle(triangle)) => triangle.contains_point_2d(point),
            Some(Shape::Wedge(triangles)) => triangles.iter().any(|t| t.contains_point_2d(point)),
            None => {
                log::warn!("Unknown bounds geometry. Geometry={}", self.geometry.kind());
                false
            }
        }
    }

    /// Check if two bounds overlap
    pub fn intersects(&self, other: &Bounds) -> bool {
        if self.geometry.is_none() || other.geometry.is_none() {
            log::warn!(
                "Unknown bounds geometry in intersection. Geometry={} Other={}",
                self.geometry.kind(),
                other.geometry.kind()
            );
            return false;
        }
        other.shape().is_some_and(|shape| self.intersects_shape(&shape))
    }

    /// Check against an oriented box
    pub fn intersects_obb(&self, obb: &Obb) -> bool {
        self.intersects_shape(&Shape::Obb(*obb))
    }

    /// Check against an axis-aligned box
    pub fn intersects_aabb(&self, aabb: &Aabb) -> bool {
        self.intersects_shape(&Shape::Aabb(*aabb))
    }

    /// Check against a capsule
    pub fn intersects_capsule(&self, capsule: &Capsule) -> bool {
        self.intersects_shape(&Shape::Capsule(*capsule))
    }

    /// Check against a sphere
    pub fn intersects_sphere(&self, sphere: &Sphere) -> bool {
        self.intersects_shape(&Shape::Sphere(*sphere))
    }

    /// Check against a triangle
    pub fn intersects_triangle(&self, triangle: &Triangle) -> bool {
        self.intersects_shape(&Shape::Triangle(*triangle))
    }

    /// First parameter along the segment that touches the shape.
    ///
    /// Only boxes, capsules and spheres support segment tests.
    pub fn intersects_segment(&self, segment: &Segment) -> Option<f32> {
        match self.shape() {
            Some(Shape::Obb(obb)) => obb.intersect_segment(segment),
            Some(Shape::Aabb(aabb)) => aabb.intersect_segment(segment),
            Some(Shape::Capsule(capsule)) => capsule.intersect_segment(segment),
            Some(Shape::Sphere(sphere)) => sphere.intersect_segment(segment),
            _ => {
                log::warn!("Segment intersect not implemented for bounds geometry={}", self.geometry.kind());
                None
            }
        }
    }

    /// Continuous collision between two moving bounds over one step.
    ///
    /// The normal points from `other` toward `self`. Flat shapes fall back
    /// to a test at the end of the step that reports time 1 and an up normal.
    pub fn sweep(&self, other: &Bounds, velocity: &Vec3, other_velocity: &Vec3) -> Option<SweepHit> {
        if self.geometry.is_none() || other.geometry.is_none() {
            log::warn!("Unknown bounds geometry in sweep. Geometry={} Other={}", self.geometry.kind(), other.geometry.kind());
            return None;
        }

        let still = utils::is_near_zero(velocity);
        let other_still = utils::is_near_zero(other_velocity);

        match (&self.geometry, &other.geometry) {
            (Geometry::Sphere { .. }, Geometry::Sphere { .. }) => {
                let time = self.to_sphere()?.sweep(velocity, &other.to_sphere()?, other_velocity)?;
                Some(Self::separation_hit(self, other, velocity, other_velocity, time))
            }
            (Geometry::Obb { .. }, _) if still => other.sweep_vs_stationary_obb(other_velocity, &self.to_obb()?, true),
            (_, Geometry::Obb { .. }) if other_still => self.sweep_vs_stationary_obb(velocity, &other.to_obb()?, false),
            (Geometry::Aabb { .. }, _) if still => other.sweep_vs_stationary_aabb(other_velocity, &self.to_aabb(), true),
            (_, Geometry::Aabb { .. }) if other_still => self.sweep_vs_stationary_aabb(velocity, &other.to_aabb(), false),
            (a, b) if a.is_flat() || b.is_flat() => {
                let mut moved = *self;
                moved.center += velocity;
                let mut other_moved = *other;
                other_moved.center += other_velocity;
                moved.intersects(&other_moved).then(|| SweepHit::new(1.0, Vec3::z()))
            }
            _ => self.sweep_as_cylinders(other, velocity, other_velocity),
        }
    }

    fn separation_hit(bounds: &Bounds, other: &Bounds, velocity: &Vec3, other_velocity: &Vec3, time: f32) -> SweepHit {
        let position = bounds.center + velocity * time;
        let other_position = other.center + other_velocity * time;
        SweepHit::new(time, utils::safe_normalize_2d(&(position - other_position), Vec3::z()))
    }

    fn sweep_as_cylinders(&self, other: &Bounds, velocity: &Vec3, other_velocity: &Vec3) -> Option<SweepHit> {
        let sphere = Sphere::new(self.center, self.radius());
        let other_sphere = Sphere::new(other.center, other.radius());
        let time = sphere.sweep_xy(velocity, &other_sphere, other_velocity)?;

        let z = self.center.z + velocity.z * time;
        let other_z = other.center.z + other_velocity.z * time;
        let (half, other_half) = (self.half_height(), other.half_height());
        if z - half > other_z + other_half || other_z - other_half > z + half {
            return None;
        }

        Some(Self::separation_hit(self, other, velocity, other_velocity, time))
    }

    /// Sweep these moving bounds against a box that stays put.
    ///
    /// Cylinder normals point from the box toward the mover, or the other
    /// way when `reverse` is set. Flat movers always report an up normal.
    fn sweep_vs_stationary_aabb(&self, velocity: &Vec3, aabb: &Aabb, reverse: bool) -> Option<SweepHit> {
        let sign = if reverse { -1.0 } else { 1.0 };
        match self.geometry {
            Geometry::Capsule { radius, half_height } => Cylinder2::new(self.center, radius, half_height)
                .sweep_aabb(velocity, aabb)
                .map(|hit| SweepHit::new(hit.time, hit.normal * sign)),
            Geometry::Sphere { radius } => Cylinder2::new(self.center, radius, radius)
                .sweep_aabb(velocity, aabb)
                .map(|hit| SweepHit::new(hit.time, hit.normal * sign)),
            Geometry::Triangle { .. } | Geometry::Wedge { .. } => Sphere::new(self.center, self.sphere_radius())
                .sweep_aabb(velocity, aabb)
                .map(|time| SweepHit::new(time, Vec3::z())),
            _ => {
                log::warn!("Sweep against a stationary AABB: unsupported mover geometry {}", self.geometry.kind());
                None
            }
        }
    }

    /// Same as [`Self::sweep_vs_stationary_aabb`], run in the box's frame
    fn sweep_vs_stationary_obb(&self, velocity: &Vec3, obb: &Obb, reverse: bool) -> Option<SweepHit> {
        let sign = if reverse { -1.0 } else { 1.0 };
        let local_center = obb.to_local(&self.center);
        let local_velocity = obb.rotation.transpose() * velocity;
        let local_box = obb.local_aabb();

        match self.geometry {
            Geometry::Capsule { radius, half_height } => Cylinder2::new(local_center, radius, half_height)
                .sweep_aabb(&local_velocity, &local_box)
                .map(|hit| SweepHit::new(hit.time, obb.rotation * hit.normal * sign)),
            Geometry::Sphere { radius } => Cylinder2::new(local_center, radius, radius)
                .sweep_aabb(&local_velocity, &local_box)
                .map(|hit| SweepHit::new(hit.time, obb.rotation * hit.normal * sign)),
            Geometry::Triangle { .. } | Geometry::Wedge { .. } => Sphere::new(local_center, self.sphere_radius())
                .sweep_aabb(&local_velocity, &local_box)
                .map(|time| SweepHit::new(time, Vec3::z())),
            _ => {
                log::warn!("Sweep against a stationary OBB: unsupported mover geometry {}", self.geometry.kind());
                None
            }
        }
    }
}

impl fmt::Display for Bounds {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Bounds: [{}] center={:?}", self.geometry.kind(), self.center)?;
        match self.shape() {
            Some(Shape::Obb(obb)) => write!(f, " extents={:?}", obb.extents),
            Some(Shape::Aabb(aabb)) => write!(f, " min={:?} max={:?}", aabb.min, aabb.max),
            Some(Shape::Capsule(capsule)) => write!(f, " a={:?} b={:?} radius={}", capsule.a, capsule.b, capsule.radius),
            Some(Shape::Sphere(sphere)) => write!(f, " radius={}", sphere.radius),
            Some(Shape::Triangle(triangle)) => write!(f, " points={:?}", triangle.points()),
            Some(Shape::Wedge([first, second])) => {
                write!(f, " triangles={:?} {:?}", first.points(), second.points())
            }
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    const EPSILON: f32 = 1e-5;

    fn sphere_at(center: Vec3, radius: f32) -> Bounds {
        let mut bounds = Bounds::with_geometry(Geometry::new_sphere(radius), BoundsCollisionType::Blocking);
        bounds.set_center(center);
        bounds
    }

    fn box_at(center: Vec3, size: f32, axis_aligned: bool) -> Bounds {
        let prototype = BoundsPrototype::new(
            ShapePrototype::Box { width: size, length: size, height: size, axis_aligned },
            BoundsCollisionType::Blocking,
        );
        Bounds::from_prototype(&prototype, center)
    }

    #[test]
    fn test_missing_prototype_degrades_to_none() {
        let mut bounds = sphere_at(Vec3::zeros(), 1.0);
        bounds.init_from_prototype(None);
        assert!(bounds.geometry().is_none());
        assert_eq!(bounds.collision_type(), BoundsCollisionType::None);
        assert!(!bounds.contains(&Vec3::zeros()));
        assert!(!bounds.intersects(&sphere_at(Vec3::zeros(), 5.0)));
        assert_eq!(bounds.radius(), 0.0);
    }

    #[test]
    fn test_missing_geometry_never_collides() {
        let empty = Bounds::new();
        let sphere = sphere_at(Vec3::zeros(), 1.0);
        let wall = box_at(Vec3::zeros(), 2.0, true);

        assert!(empty.sweep(&sphere, &Vec3::zeros(), &Vec3::new(-1.0, 0.0, 0.0)).is_none());
        assert!(sphere.sweep(&empty, &Vec3::new(-1.0, 0.0, 0.0), &Vec3::zeros()).is_none());
        assert!(empty.sweep(&wall, &Vec3::new(1.0, 0.0, 0.0), &Vec3::zeros()).is_none());
        assert!(wall.sweep(&empty, &Vec3::zeros(), &Vec3::new(1.0, 0.0, 0.0)).is_none());
        assert!(empty.sweep(&empty, &Vec3::zeros(), &Vec3::zeros()).is_none());
    }

    #[test]
    fn test_missing_geometry_intersects_nothing() {
        let empty = Bounds::new();
        for other in [sphere_at(Vec3::zeros(), 5.0), box_at(Vec3::zeros(), 4.0, false), Bounds::new()] {
            assert!(!empty.intersects(&other));
            assert!(!other.intersects(&empty));
        }
    }

    #[test]
    fn test_prototype_flags() {
        let prototype = BoundsPrototype {
            complex_picking_only: true,
            ..BoundsPrototype::new(ShapePrototype::Sphere { radius: 2.0 }, BoundsCollisionType::Overlapping)
        };
        let bounds = Bounds::from_prototype(&prototype, Vec3::new(1.0, 2.0, 3.0));
        assert!(bounds.flags().contains(BoundsFlags::COMPLEX_PICKING_ONLY));
        assert_eq!(bounds.collision_type(), BoundsCollisionType::Overlapping);
        assert_eq!(bounds.center(), Vec3::new(1.0, 2.0, 3.0));
    }

    #[test]
    fn test_prototype_from_ron() {
        let text = "(shape: Capsule(radius: 1.5, height_from_center: 4.0), collision_type: Blocking)";
        let prototype: BoundsPrototype = ron::from_str(text).unwrap();
        let bounds = Bounds::from_prototype(&prototype, Vec3::zeros());
        assert_eq!(*bounds.geometry(), Geometry::new_capsule(1.5, 4.0));
        assert_relative_eq!(bounds.eye_height(), 4.0 * 0.8333, epsilon = EPSILON);
    }

    #[test]
    fn test_set_radius_on_box_is_ignored() {
        let mut bounds = box_at(Vec3::zeros(), 2.0, false);
        let before = *bounds.geometry();
        bounds.set_radius(10.0);
        assert_eq!(*bounds.geometry(), before);
    }

    #[test]
    fn test_capsule_aabb_includes_caps() {
        let mut bounds = Bounds::with_geometry(Geometry::new_capsule(1.0, 3.0), BoundsCollisionType::Blocking);
        bounds.set_center(Vec3::new(0.0, 0.0, 10.0));
        let aabb = bounds.to_aabb();
        assert_relative_eq!(aabb.min, Vec3::new(-1.0, -1.0, 6.0), epsilon = EPSILON);
        assert_relative_eq!(aabb.max, Vec3::new(1.0, 1.0, 14.0), epsilon = EPSILON);
    }

    #[test]
    fn test_contains_per_shape() {
        let obb = box_at(Vec3::zeros(), 2.0, false);
        assert!(obb.contains(&Vec3::new(0.9, 0.9, 0.9)));
        assert!(!obb.contains(&Vec3::new(1.1, 0.0, 0.0)));

        let capsule = Bounds::with_geometry(Geometry::new_capsule(1.0, 3.0), BoundsCollisionType::Blocking);
        assert!(capsule.contains(&Vec3::new(0.0, 0.0, 3.9)));

        let triangle = Bounds::with_geometry(Geometry::new_triangle(90.0, 1.0, 3.0), BoundsCollisionType::Blocking);
        assert!(triangle.contains(&Vec3::new(0.0, 0.0, 100.0)));
        assert!(!triangle.contains(&Vec3::new(-2.5, 1.0, 0.0)));
    }

    #[test]
    fn test_can_be_blocked_by() {
        let blocking = sphere_at(Vec3::zeros(), 1.0);
        let mut overlapping = sphere_at(Vec3::zeros(), 1.0);
        overlapping.set_collision_type(BoundsCollisionType::Overlapping);

        assert!(blocking.can_be_blocked_by(&blocking, false, false));
        assert!(!overlapping.can_be_blocked_by(&blocking, false, false));
        assert!(overlapping.can_be_blocked_by(&blocking, true, false));
        assert!(blocking.can_be_blocked_by(&overlapping, false, true));
    }

    #[test]
    fn test_is_blocked_by_spawn_check() {
        let mover = sphere_at(Vec3::zeros(), 1.0);
        let mut obstacle = sphere_at(Vec3::new(1.5, 0.0, 0.0), 1.0);
        obstacle.set_collision_type(BoundsCollisionType::Overlapping);
        let mut prototype = BoundsPrototype::new(ShapePrototype::Sphere { radius: 1.0 }, BoundsCollisionType::Overlapping);

        assert!(!mover.is_blocked_by(&obstacle, Some(&prototype), BlockingCheckFlags::empty()));
        assert!(!mover.is_blocked_by(&obstacle, Some(&prototype), BlockingCheckFlags::CHECK_SPAWNS));
        prototype.blocks_spawns = true;
        assert!(mover.is_blocked_by(&obstacle, Some(&prototype), BlockingCheckFlags::CHECK_SPAWNS));
        assert!(!mover.is_blocked_by(&obstacle, None, BlockingCheckFlags::CHECK_SPAWNS));
    }

    #[test]
    fn test_segment_intersection() {
        let sphere = sphere_at(Vec3::zeros(), 1.0);
        let segment = Segment::new(Vec3::new(-5.0, 0.0, 0.0), Vec3::new(5.0, 0.0, 0.0));
        let t = sphere.intersects_segment(&segment).unwrap();
        assert_relative_eq!(t, 0.4, epsilon = EPSILON);

        let triangle = Bounds::with_geometry(Geometry::new_triangle(60.0, 1.0, 3.0), BoundsCollisionType::Blocking);
        assert!(triangle.intersects_segment(&segment).is_none());
    }

    #[test]
    fn test_sweep_capsule_into_stationary_box() {
        let mut capsule = Bounds::with_geometry(Geometry::new_capsule(1.0, 2.0), BoundsCollisionType::Blocking);
        capsule.set_center(Vec3::new(-5.0, 0.0, 0.0));
        let wall = box_at(Vec3::zeros(), 2.0, true);

        let hit = capsule.sweep(&wall, &Vec3::new(6.0, 0.0, 0.0), &Vec3::zeros()).unwrap();
        assert_relative_eq!(hit.time, 0.5, epsilon = EPSILON);
        assert_relative_eq!(hit.normal, -Vec3::x(), epsilon = EPSILON);

        // Same contact seen from the box: normal points toward the box
        let hit = wall.sweep(&capsule, &Vec3::zeros(), &Vec3::new(6.0, 0.0, 0.0)).unwrap();
        assert_relative_eq!(hit.time, 0.5, epsilon = EPSILON);
        assert_relative_eq!(hit.normal, Vec3::x(), epsilon = EPSILON);
    }

    #[test]
    fn test_sweep_sphere_into_rotated_obb() {
        let mut wall = box_at(Vec3::zeros(), 2.0, false);
        wall.set_orientation(Orientation::from_yaw(std::f32::consts::FRAC_PI_2));
        let sphere = sphere_at(Vec3::new(0.0, -5.0, 0.0), 1.0);

        let hit = sphere.sweep(&wall, &Vec3::new(0.0, 6.0, 0.0), &Vec3::zeros()).unwrap();
        assert_relative_eq!(hit.time, 0.5, epsilon = EPSILON);
        assert_relative_eq!(hit.normal, -Vec3::y(), epsilon = EPSILON);
    }

    #[test]
    fn test_sweep_cylinders_need_height_overlap() {
        let mut a = Bounds::with_geometry(Geometry::new_capsule(1.0, 1.0), BoundsCollisionType::Blocking);
        let mut b = a;
        b.set_center(Vec3::new(10.0, 0.0, 0.0));
        let hit = a.sweep(&b, &Vec3::new(10.0, 0.0, 0.0), &Vec3::zeros()).unwrap();
        assert_relative_eq!(hit.time, 0.8, epsilon = EPSILON);

        a.set_center(Vec3::new(0.0, 0.0, 5.0));
        assert!(a.sweep(&b, &Vec3::new(10.0, 0.0, 0.0), &Vec3::zeros()).is_none());
    }

    #[test]
    fn test_sweep_flat_shape_checks_end_of_step() {
        let triangle = Bounds::with_geometry(Geometry::new_triangle(90.0, 1.0, 3.0), BoundsCollisionType::Blocking);
        let sphere = sphere_at(Vec3::new(-10.0, 0.0, 0.0), 1.0);

        // Ends on top of the triangle: reported at the end of the step
        let hit = sphere.sweep(&triangle, &Vec3::new(10.0, 0.0, 0.0), &Vec3::zeros()).unwrap();
        assert_relative_eq!(hit.time, 1.0, epsilon = EPSILON);
        assert_relative_eq!(hit.normal, Vec3::z(), epsilon = EPSILON);

        let hit = triangle.sweep(&sphere, &Vec3::zeros(), &Vec3::new(10.0, 0.0, 0.0)).unwrap();
        assert_relative_eq!(hit.time, 1.0, epsilon = EPSILON);
        assert_relative_eq!(hit.normal, Vec3::z(), epsilon = EPSILON);

        // Passing clean through within one step is not seen
        assert!(sphere.sweep(&triangle, &Vec3::new(20.0, 0.0, 0.0), &Vec3::zeros()).is_none());

        let mut wedge = Bounds::with_geometry(Geometry::new_wedge(90.0, 1.0, 3.0, 1.0), BoundsCollisionType::Blocking);
        wedge.set_center(Vec3::new(-20.0, 0.0, 0.0));
        let hit = wedge.sweep(&sphere, &Vec3::new(10.0, 0.0, 0.0), &Vec3::zeros()).unwrap();
        assert_relative_eq!(hit.time, 1.0, epsilon = EPSILON);
        assert_relative_eq!(hit.normal, Vec3::z(), epsilon = EPSILON);
    }

    #[test]
    fn test_sweep_flat_shape_into_stationary_box() {
        let mut triangle = Bounds::with_geometry(Geometry::new_triangle(90.0, 1.0, 3.0), BoundsCollisionType::Blocking);
        triangle.set_center(Vec3::new(-10.0, 0.0, 0.0));
        let wall = box_at(Vec3::zeros(), 2.0, true);
        let velocity = Vec3::new(10.0, 0.0, 0.0);

        // Approximated by the enclosing sphere touching the box face at x = -1
        let expected = (9.0 - triangle.sphere_radius()) / 10.0;
        let hit = triangle.sweep(&wall, &velocity, &Vec3::zeros()).unwrap();
        assert_relative_eq!(hit.time, expected, epsilon = EPSILON);
        assert_relative_eq!(hit.normal, Vec3::z(), epsilon = EPSILON);

        // Up normal from either side
        let hit = wall.sweep(&triangle, &Vec3::zeros(), &velocity).unwrap();
        assert_relative_eq!(hit.time, expected, epsilon = EPSILON);
        assert_relative_eq!(hit.normal, Vec3::z(), epsilon = EPSILON);

        let oriented = box_at(Vec3::zeros(), 2.0, false);
        let hit = triangle.sweep(&oriented, &velocity, &Vec3::zeros()).unwrap();
        assert_relative_eq!(hit.time, expected, epsilon = EPSILON);
        assert_relative_eq!(hit.normal, Vec3::z(), epsilon = EPSILON);
    }

    #[test]
    fn test_sweep_treats_tiny_velocity_as_still() {
        let sphere = sphere_at(Vec3::new(-5.0, 0.0, 0.0), 1.0);
        let wall = box_at(Vec3::zeros(), 2.0, true);
        let creep = Vec3::new(1e-4, 0.0, 0.0);
        assert!(utils::is_near_zero(&creep));

        // Box sweep: the sphere's face touches x = -1 halfway through
        let hit = sphere.sweep(&wall, &Vec3::new(6.0, 0.0, 0.0), &creep).unwrap();
        assert_relative_eq!(hit.time, 0.5, epsilon = EPSILON);
        assert_relative_eq!(hit.normal, -Vec3::x(), epsilon = EPSILON);

        let hit = wall.sweep(&sphere, &creep, &Vec3::new(6.0, 0.0, 0.0)).unwrap();
        assert_relative_eq!(hit.time, 0.5, epsilon = EPSILON);
        assert_relative_eq!(hit.normal, Vec3::x(), epsilon = EPSILON);
    }

    #[test]
    fn test_display_names_geometry() {
        let text = sphere_at(Vec3::zeros(), 2.0).to_string();
        assert!(text.starts_with("Bounds: [Sphere]"));
        assert!(text.contains("radius=2"));
    }
}
