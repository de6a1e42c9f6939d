//! Primitive collision shapes
//!
//! Canonical shapes that [`Bounds`](crate::physics::Bounds) converts to before
//! running an intersection test. Shape-vs-same-shape tests live here; the
//! mixed pairs are in [`intersection`](super::intersection).

use crate::foundation::math::{utils, Mat3, Vec2, Vec3, NEAR_ZERO_EPSILON};

/// Result of testing how a query volume relates to a region
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Containment {
    /// The region lies entirely inside the volume
    Contains,
    /// The region and the volume do not touch
    Disjoint,
    /// The region straddles the volume's boundary
    Intersects,
}

/// Axis-aligned bounding box
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    /// Minimum corner of the bounding box
    pub min: Vec3,
    /// Maximum corner of the bounding box
    pub max: Vec3,
}

impl Aabb {
    /// Create a new AABB from min and max points
    pub fn new(min: Vec3, max: Vec3) -> Self {
        Self { min, max }
    }

    /// Create an AABB centered at a point with given half-extents
    pub fn from_center_extents(center: Vec3, extents: Vec3) -> Self {
        Self {
            min: center - extents,
            max: center + extents,
        }
    }

    /// Smallest AABB containing every point
    pub fn from_points(points: &[Vec3]) -> Self {
        let mut aabb = Self::new(Vec3::repeat(f32::MAX), Vec3::repeat(f32::MIN));
        for point in points {
            aabb.include_point(point);
        }
        aabb
    }

    /// Get the center of the AABB
    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    /// Get the extents (half-size) of the AABB
    pub fn extents(&self) -> Vec3 {
        (self.max - self.min) * 0.5
    }

    /// Radius of the XY footprint's circumscribed circle
    pub fn radius_2d(&self) -> f32 {
        let e = self.extents();
        e.x.hypot(e.y)
    }

    /// True if min does not exceed max on any axis
    pub fn is_valid(&self) -> bool {
        self.min.x <= self.max.x && self.min.y <= self.max.y && self.min.z <= self.max.z
    }

    /// Grow the box to contain a point
    pub fn include_point(&mut self, point: &Vec3) {
        self.min = self.min.inf(point);
        self.max = self.max.sup(point);
    }

    /// Smallest AABB containing both boxes
    pub fn union(&self, other: &Aabb) -> Aabb {
        Aabb::new(self.min.inf(&other.min), self.max.sup(&other.max))
    }

    /// Copy moved by an offset
    pub fn translated(&self, offset: &Vec3) -> Aabb {
        Aabb::new(self.min + offset, self.max + offset)
    }

    /// Copy grown by `amount` on every side
    pub fn expanded(&self, amount: f32) -> Aabb {
        let grow = Vec3::repeat(amount);
        Aabb::new(self.min - grow, self.max + grow)
    }

    /// Check if this AABB contains a point
    pub fn contains_point(&self, point: &Vec3) -> bool {
        point.x >= self.min.x
            && point.x <= self.max.x
            && point.y >= self.min.y
            && point.y <= self.max.y
            && point.z >= self.min.z
            && point.z <= self.max.z
    }

    /// Check if this AABB fully contains another
    pub fn contains_aabb(&self, other: &Aabb) -> bool {
        self.contains_point(&other.min) && self.contains_point(&other.max)
    }

    /// Check if this AABB intersects another AABB
    pub fn intersects(&self, other: &Aabb) -> bool {
        self.min.x <= other.max.x
            && self.max.x >= other.min.x
            && self.min.y <= other.max.y
            && self.max.y >= other.min.y
            && self.min.z <= other.max.z
            && self.max.z >= other.min.z
    }

    /// Closest point in or on the box
    pub fn closest_point(&self, point: &Vec3) -> Vec3 {
        point.sup(&self.min).inf(&self.max)
    }

    /// Squared distance from a point to the box (zero inside)
    pub fn distance_sq_to_point(&self, point: &Vec3) -> f32 {
        (self.closest_point(point) - point).norm_squared()
    }

    /// Slab test of the segment against the box.
    ///
    /// Returns the segment parameter in `[0, 1]` where the segment enters the
    /// box (zero if it starts inside).
    pub fn intersect_segment(&self, segment: &Segment) -> Option<f32> {
        let direction = segment.direction();
        let mut t_min = 0.0_f32;
        let mut t_max = 1.0_f32;

        for axis in 0..3 {
            let origin = segment.start[axis];
            let delta = direction[axis];
            if delta.abs() < NEAR_ZERO_EPSILON {
                if origin < self.min[axis] || origin > self.max[axis] {
                    return None;
                }
                continue;
            }
            let inv = 1.0 / delta;
            let mut t0 = (self.min[axis] - origin) * inv;
            let mut t1 = (self.max[axis] - origin) * inv;
            if t0 > t1 {
                std::mem::swap(&mut t0, &mut t1);
            }
            t_min = t_min.max(t0);
            t_max = t_max.min(t1);
            if t_min > t_max {
                return None;
            }
        }

        Some(t_min)
    }

    /// XY footprint
    pub fn to_2d(&self) -> Aabb2 {
        Aabb2::new(utils::to_2d(&self.min), utils::to_2d(&self.max))
    }
}

/// Axis-aligned rectangle on the XY plane
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb2 {
    /// Minimum corner
    pub min: Vec2,
    /// Maximum corner
    pub max: Vec2,
}

impl Aabb2 {
    /// Create a rectangle from its corners
    pub fn new(min: Vec2, max: Vec2) -> Self {
        Self { min, max }
    }

    /// Square of side `2 * half` centered at `center`
    pub fn from_center_half(center: Vec2, half: f32) -> Self {
        let half = Vec2::repeat(half);
        Self::new(center - half, center + half)
    }

    /// Center of the rectangle
    pub fn center(&self) -> Vec2 {
        (self.min + self.max) * 0.5
    }

    /// Size along X
    pub fn width(&self) -> f32 {
        self.max.x - self.min.x
    }

    /// Size along Y
    pub fn length(&self) -> f32 {
        self.max.y - self.min.y
    }

    /// Check if a point lies in or on the rectangle
    pub fn contains_point(&self, point: &Vec2) -> bool {
        point.x >= self.min.x && point.x <= self.max.x && point.y >= self.min.y && point.y <= self.max.y
    }

    /// Check if this rectangle fully contains another
    pub fn contains(&self, other: &Aabb2) -> bool {
        other.min.x >= self.min.x
            && other.max.x <= self.max.x
            && other.min.y >= self.min.y
            && other.max.y <= self.max.y
    }

    /// Check if the rectangles overlap
    pub fn intersects(&self, other: &Aabb2) -> bool {
        self.min.x <= other.max.x
            && self.max.x >= other.min.x
            && self.min.y <= other.max.y
            && self.max.y >= other.min.y
    }

    /// Classify `other` relative to this rectangle
    pub fn containment(&self, other: &Aabb2) -> Containment {
        if !self.intersects(other) {
            Containment::Disjoint
        } else if self.contains(other) {
            Containment::Contains
        } else {
            Containment::Intersects
        }
    }

    /// The four corners in winding order
    pub fn corners(&self) -> [Vec2; 4] {
        [
            self.min,
            Vec2::new(self.max.x, self.min.y),
            self.max,
            Vec2::new(self.min.x, self.max.y),
        ]
    }
}

/// A line segment between two points
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Segment {
    /// Start point
    pub start: Vec3,
    /// End point
    pub end: Vec3,
}

impl Segment {
    /// Create a segment
    pub fn new(start: Vec3, end: Vec3) -> Self {
        Self { start, end }
    }

    /// Vector from start to end
    pub fn direction(&self) -> Vec3 {
        self.end - self.start
    }

    /// Length of the segment
    pub fn length(&self) -> f32 {
        self.direction().norm()
    }

    /// Point at parameter `t` (0 at start, 1 at end)
    pub fn point_at(&self, t: f32) -> Vec3 {
        self.start + self.direction() * t
    }

    /// Parameter of the point on the segment closest to `point`
    pub fn closest_parameter(&self, point: &Vec3) -> f32 {
        let d = self.direction();
        let len_sq = d.norm_squared();
        if len_sq < NEAR_ZERO_EPSILON {
            return 0.0;
        }
        ((point - self.start).dot(&d) / len_sq).clamp(0.0, 1.0)
    }

    /// Squared distance from a point to the segment
    pub fn distance_sq_to_point(&self, point: &Vec3) -> f32 {
        (self.point_at(self.closest_parameter(point)) - point).norm_squared()
    }

    /// Closest points between two segments.
    ///
    /// Returns the parameters on each segment and the squared distance
    /// between the two closest points (Ericson, RTCD 5.1.9).
    pub fn closest_points(&self, other: &Segment) -> (f32, f32, f32) {
        let d1 = self.direction();
        let d2 = other.direction();
        let r = self.start - other.start;
        let a = d1.norm_squared();
        let e = d2.norm_squared();
        let f = d2.dot(&r);

        let (s, t) = if a < NEAR_ZERO_EPSILON && e < NEAR_ZERO_EPSILON {
            (0.0, 0.0)
        } else if a < NEAR_ZERO_EPSILON {
            (0.0, (f / e).clamp(0.0, 1.0))
        } else {
            let c = d1.dot(&r);
            if e < NEAR_ZERO_EPSILON {
                ((-c / a).clamp(0.0, 1.0), 0.0)
            } else {
                let b = d1.dot(&d2);
                let denom = a * e - b * b;
                let mut s = if denom.abs() > f32::EPSILON {
                    ((b * f - c * e) / denom).clamp(0.0, 1.0)
                } else {
                    0.0
                };
                let mut t = (b * s + f) / e;
                if t < 0.0 {
                    t = 0.0;
                    s = (-c / a).clamp(0.0, 1.0);
                } else if t > 1.0 {
                    t = 1.0;
                    s = ((b - c) / a).clamp(0.0, 1.0);
                }
                (s, t)
            }
        };

        let distance_sq = (self.point_at(s) - other.point_at(t)).norm_squared();
        (s, t, distance_sq)
    }
}

/// A bounding sphere
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sphere {
    /// The center position of the sphere in world space
    pub center: Vec3,
    /// The radius of the sphere
    pub radius: f32,
}

impl Sphere {
    /// Creates a new bounding sphere with the given center and radius
    pub fn new(center: Vec3, radius: f32) -> Self {
        Self { center, radius }
    }

    /// Copy moved by an offset
    pub fn translated(&self, offset: &Vec3) -> Sphere {
        Sphere::new(self.center + offset, self.radius)
    }

    /// Tight AABB
    pub fn to_aabb(&self) -> Aabb {
        Aabb::from_center_extents(self.center, Vec3::repeat(self.radius))
    }

    /// Check if a point is inside the sphere
    pub fn contains_point(&self, point: &Vec3) -> bool {
        (point - self.center).norm_squared() <= self.radius * self.radius
    }

    /// Check if this sphere intersects with another
    pub fn intersects(&self, other: &Sphere) -> bool {
        let radius_sum = self.radius + other.radius;
        (self.center - other.center).norm_squared() <= radius_sum * radius_sum
    }

    /// Check if the sphere touches the box
    pub fn intersects_aabb(&self, aabb: &Aabb) -> bool {
        aabb.distance_sq_to_point(&self.center) <= self.radius * self.radius
    }

    /// First parameter along the segment that lies on or in the sphere
    pub fn intersect_segment(&self, segment: &Segment) -> Option<f32> {
        let d = segment.direction();
        let m = segment.start - self.center;
        let c = m.norm_squared() - self.radius * self.radius;
        if c <= 0.0 {
            return Some(0.0);
        }
        let a = d.norm_squared();
        if a < NEAR_ZERO_EPSILON {
            return None;
        }
        let b = m.dot(&d);
        if b > 0.0 {
            return None;
        }
        let discriminant = b * b - a * c;
        if discriminant < 0.0 {
            return None;
        }
        let t = (-b - discriminant.sqrt()) / a;
        (t <= 1.0).then_some(t.max(0.0))
    }
}

/// A swept sphere around a segment
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Capsule {
    /// One end of the core segment
    pub a: Vec3,
    /// The other end of the core segment
    pub b: Vec3,
    /// Distance from the core segment to the surface
    pub radius: f32,
}

impl Capsule {
    /// Create a capsule
    pub fn new(a: Vec3, b: Vec3, radius: f32) -> Self {
        Self { a, b, radius }
    }

    /// The core segment
    pub fn segment(&self) -> Segment {
        Segment::new(self.a, self.b)
    }

    /// Copy moved by an offset
    pub fn translated(&self, offset: &Vec3) -> Capsule {
        Capsule::new(self.a + offset, self.b + offset, self.radius)
    }

    /// Tight AABB
    pub fn to_aabb(&self) -> Aabb {
        Aabb::new(self.a.inf(&self.b), self.a.sup(&self.b)).expanded(self.radius)
    }

    /// Check if a point is inside the capsule
    pub fn contains_point(&self, point: &Vec3) -> bool {
        self.segment().distance_sq_to_point(point) <= self.radius * self.radius
    }

    /// Check if two capsules overlap
    pub fn intersects(&self, other: &Capsule) -> bool {
        let (_, _, distance_sq) = self.segment().closest_points(&other.segment());
        let radius_sum = self.radius + other.radius;
        distance_sq <= radius_sum * radius_sum
    }

    /// First parameter along the segment that touches the capsule
    pub fn intersect_segment(&self, segment: &Segment) -> Option<f32> {
        let (s, _, distance_sq) = segment.closest_points(&self.segment());
        if distance_sq > self.radius * self.radius {
            return None;
        }
        if self.contains_point(&segment.start) {
            return Some(0.0);
        }
        // Walk back from the closest approach to the surface
        let mut lo = 0.0_f32;
        let mut hi = s;
        for _ in 0..24 {
            let mid = (lo + hi) * 0.5;
            if self.contains_point(&segment.point_at(mid)) {
                hi = mid;
            } else {
                lo = mid;
            }
        }
        Some(hi)
    }
}

/// Oriented bounding box
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Obb {
    /// World-space center
    pub center: Vec3,
    /// Half size along each local axis
    pub extents: Vec3,
    /// Columns are the box's local axes in world space
    pub rotation: Mat3,
}

impl Obb {
    /// Create an oriented box
    pub fn new(center: Vec3, extents: Vec3, rotation: Mat3) -> Self {
        Self { center, extents, rotation }
    }

    /// Oriented box with no rotation
    pub fn from_aabb(aabb: &Aabb) -> Self {
        Self::new(aabb.center(), aabb.extents(), Mat3::identity())
    }

    /// Copy moved by an offset
    pub fn translated(&self, offset: &Vec3) -> Obb {
        Obb::new(self.center + offset, self.extents, self.rotation)
    }

    /// Transform a world point into box space (origin at the center)
    pub fn to_local(&self, point: &Vec3) -> Vec3 {
        self.rotation.transpose() * (point - self.center)
    }

    /// The box in its own frame
    pub fn local_aabb(&self) -> Aabb {
        Aabb::from_center_extents(Vec3::zeros(), self.extents)
    }

    /// Tight AABB
    pub fn to_aabb(&self) -> Aabb {
        Aabb::from_center_extents(self.center, self.rotation.abs() * self.extents)
    }

    /// Check if a point is inside the box
    pub fn contains_point(&self, point: &Vec3) -> bool {
        self.local_aabb().contains_point(&self.to_local(point))
    }

    /// First parameter along the segment inside the box
    pub fn intersect_segment(&self, segment: &Segment) -> Option<f32> {
        let local = Segment::new(self.to_local(&segment.start), self.to_local(&segment.end));
        self.local_aabb().intersect_segment(&local)
    }

    /// Separating axis test against another box (Ericson, RTCD 4.4.1)
    pub fn intersects(&self, other: &Obb) -> bool {
        const EPSILON: f32 = 1e-6;

        let a = self.extents;
        let b = other.extents;
        // Rotation expressing other in this box's frame
        let r = self.rotation.transpose() * other.rotation;
        let t = self.rotation.transpose() * (other.center - self.center);
        let abs_r = r.abs().add_scalar(EPSILON);

        for i in 0..3 {
            let ra = a[i];
            let rb = b[0] * abs_r[(i, 0)] + b[1] * abs_r[(i, 1)] + b[2] * abs_r[(i, 2)];
            if t[i].abs() > ra + rb {
                return false;
            }
        }

        for j in 0..3 {
            let ra = a[0] * abs_r[(0, j)] + a[1] * abs_r[(1, j)] + a[2] * abs_r[(2, j)];
            let rb = b[j];
            let proj = t[0] * r[(0, j)] + t[1] * r[(1, j)] + t[2] * r[(2, j)];
            if proj.abs() > ra + rb {
                return false;
            }
        }

        // Cross products of edge pairs
        for i in 0..3 {
            let i1 = (i + 1) % 3;
            let i2 = (i + 2) % 3;
            for j in 0..3 {
                let j1 = (j + 1) % 3;
                let j2 = (j + 2) % 3;
                let ra = a[i1] * abs_r[(i2, j)] + a[i2] * abs_r[(i1, j)];
                let rb = b[j1] * abs_r[(i, j2)] + b[j2] * abs_r[(i, j1)];
                let proj = t[i2] * r[(i1, j)] - t[i1] * r[(i2, j)];
                if proj.abs() > ra + rb {
                    return false;
                }
            }
        }

        true
    }
}

/// A triangle for collision detection
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Triangle {
    /// Triangle vertices in world space
    pub v0: Vec3,
    /// Second vertex
    pub v1: Vec3,
    /// Third vertex
    pub v2: Vec3,
}

impl Triangle {
    /// Creates a new triangle
    pub fn new(v0: Vec3, v1: Vec3, v2: Vec3) -> Self {
        Self { v0, v1, v2 }
    }

    /// Vertices as an array
    pub fn points(&self) -> [Vec3; 3] {
        [self.v0, self.v1, self.v2]
    }

    /// Copy moved by an offset
    pub fn translated(&self, offset: &Vec3) -> Triangle {
        Triangle::new(self.v0 + offset, self.v1 + offset, self.v2 + offset)
    }

    /// Tight AABB of the vertices
    pub fn to_aabb(&self) -> Aabb {
        Aabb::from_points(&self.points())
    }

    /// Check if a point lies inside the triangle's XY footprint, either winding
    pub fn contains_point_2d(&self, point: &Vec3) -> bool {
        let p = utils::to_2d(point);
        let [a, b, c] = self.points().map(|v| utils::to_2d(&v));

        let d0 = utils::cross_2d(&(p - a), &(b - a));
        let d1 = utils::cross_2d(&(p - b), &(c - b));
        let d2 = utils::cross_2d(&(p - c), &(a - c));

        if utils::cross_2d(&(b - a), &(c - a)) > 0.0 {
            d0 <= 0.0 && d1 <= 0.0 && d2 <= 0.0
        } else {
            d0 >= 0.0 && d1 >= 0.0 && d2 >= 0.0
        }
    }

    /// Check if a circle on the XY plane touches the triangle's footprint
    pub fn intersects_circle_2d(&self, center: &Vec3, radius: f32) -> bool {
        if self.contains_point_2d(center) {
            return true;
        }

        let c = utils::to_2d(center);
        let [a, b, d] = self.points().map(|v| utils::to_2d(&v));
        let radius_sq = radius * radius;

        utils::segment_point_distance_sq_2d(&a, &b, &c) < radius_sq
            || utils::segment_point_distance_sq_2d(&b, &d, &c) < radius_sq
            || utils::segment_point_distance_sq_2d(&d, &a, &c) < radius_sq
    }

    /// Separating axis test of the XY footprints
    pub fn intersects_2d(&self, other: &Triangle) -> bool {
        fn project(points: &[Vec2; 3], axis: &Vec2) -> (f32, f32) {
            let p0 = axis.dot(&points[0]);
            let p1 = axis.dot(&points[1]);
            let p2 = axis.dot(&points[2]);
            (p0.min(p1).min(p2), p0.max(p1).max(p2))
        }

        let first = self.points().map(|v| utils::to_2d(&v));
        let second = other.points().map(|v| utils::to_2d(&v));

        for points in [&first, &second] {
            for i in 0..3 {
                let edge = points[(i + 1) % 3] - points[i];
                let axis = Vec2::new(-edge.y, edge.x);
                if axis.norm_squared() < NEAR_ZERO_EPSILON {
                    continue;
                }
                let (min1, max1) = project(&first, &axis);
                let (min2, max2) = project(&second, &axis);
                if max1 < min2 || max2 < min1 {
                    return false;
                }
            }
        }

        true
    }

    /// Separating axis test against a box (Akenine-Möller)
    ///
    /// Tests the nine edge cross axes, the three box face normals and the
    /// triangle's plane.
    pub fn intersects_aabb(&self, aabb: &Aabb) -> bool {
        let c = aabb.center();
        let e = aabb.extents();
        let v = [self.v0 - c, self.v1 - c, self.v2 - c];
        let edges = [v[1] - v[0], v[2] - v[1], v[0] - v[2]];

        for edge in &edges {
            for box_axis in [Vec3::x(), Vec3::y(), Vec3::z()] {
                let axis = box_axis.cross(edge);
                if axis.norm_squared() < NEAR_ZERO_EPSILON {
                    continue;
                }
                let p0 = axis.dot(&v[0]);
                let p1 = axis.dot(&v[1]);
                let p2 = axis.dot(&v[2]);
                let r = e.x * axis.x.abs() + e.y * axis.y.abs() + e.z * axis.z.abs();
                if p0.min(p1).min(p2) > r || p0.max(p1).max(p2) < -r {
                    return false;
                }
            }
        }

        for axis in 0..3 {
            let min = v[0][axis].min(v[1][axis]).min(v[2][axis]);
            let max = v[0][axis].max(v[1][axis]).max(v[2][axis]);
            if min > e[axis] || max < -e[axis] {
                return false;
            }
        }

        let normal = edges[0].cross(&edges[1]);
        if normal.norm_squared() < NEAR_ZERO_EPSILON {
            // Degenerate triangle, the edge axes already decided it
            return true;
        }
        let distance = normal.dot(&v[0]);
        let r = e.x * normal.x.abs() + e.y * normal.y.abs() + e.z * normal.z.abs();
        distance.abs() <= r
    }

    /// Separating axis test against an oriented box
    pub fn intersects_obb(&self, obb: &Obb) -> bool {
        let local = Triangle::new(obb.to_local(&self.v0), obb.to_local(&self.v1), obb.to_local(&self.v2));
        local.intersects_aabb(&obb.local_aabb())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::foundation::math::Orientation;
    use approx::assert_relative_eq;
    use std::f32::consts::FRAC_PI_4;

    const EPSILON: f32 = 1e-5;

    fn unit_box() -> Aabb {
        Aabb::new(Vec3::repeat(-1.0), Vec3::repeat(1.0))
    }

    #[test]
    fn test_aabb_segment_entry() {
        let segment = Segment::new(Vec3::new(-3.0, 0.0, 0.0), Vec3::new(3.0, 0.0, 0.0));
        let t = unit_box().intersect_segment(&segment).unwrap();
        assert_relative_eq!(t, 1.0 / 3.0, epsilon = EPSILON);

        let miss = Segment::new(Vec3::new(-3.0, 2.0, 0.0), Vec3::new(3.0, 2.0, 0.0));
        assert!(unit_box().intersect_segment(&miss).is_none());
    }

    #[test]
    fn test_aabb2_containment() {
        let outer = Aabb2::new(Vec2::new(0.0, 0.0), Vec2::new(10.0, 10.0));
        let inner = Aabb2::new(Vec2::new(2.0, 2.0), Vec2::new(3.0, 3.0));
        let straddling = Aabb2::new(Vec2::new(8.0, 8.0), Vec2::new(12.0, 12.0));
        let far = Aabb2::new(Vec2::new(20.0, 20.0), Vec2::new(21.0, 21.0));

        assert_eq!(outer.containment(&inner), Containment::Contains);
        assert_eq!(outer.containment(&straddling), Containment::Intersects);
        assert_eq!(outer.containment(&far), Containment::Disjoint);
    }

    #[test]
    fn test_segment_closest_points_parallel() {
        let a = Segment::new(Vec3::new(0.0, 0.0, 0.0), Vec3::new(10.0, 0.0, 0.0));
        let b = Segment::new(Vec3::new(0.0, 3.0, 0.0), Vec3::new(10.0, 3.0, 0.0));
        let (_, _, distance_sq) = a.closest_points(&b);
        assert_relative_eq!(distance_sq, 9.0, epsilon = EPSILON);
    }

    #[test]
    fn test_sphere_segment() {
        let sphere = Sphere::new(Vec3::zeros(), 1.0);
        let segment = Segment::new(Vec3::new(-5.0, 0.0, 0.0), Vec3::new(5.0, 0.0, 0.0));
        let t = sphere.intersect_segment(&segment).unwrap();
        assert_relative_eq!(t, 0.4, epsilon = EPSILON);
    }

    #[test]
    fn test_capsule_contains_and_overlap() {
        let capsule = Capsule::new(Vec3::new(0.0, 0.0, -5.0), Vec3::new(0.0, 0.0, 5.0), 1.0);
        assert!(capsule.contains_point(&Vec3::new(0.5, 0.0, 5.5)));
        assert!(!capsule.contains_point(&Vec3::new(0.0, 0.0, 6.5)));

        let other = Capsule::new(Vec3::new(1.5, -5.0, 0.0), Vec3::new(1.5, 5.0, 0.0), 0.6);
        assert!(capsule.intersects(&other));
        let far = Capsule::new(Vec3::new(3.0, -5.0, 0.0), Vec3::new(3.0, 5.0, 0.0), 0.6);
        assert!(!capsule.intersects(&far));
    }

    #[test]
    fn test_obb_rotated_overlap() {
        let rotation = Orientation::from_yaw(FRAC_PI_4).rotation().into_inner();
        let diamond = Obb::new(Vec3::zeros(), Vec3::new(1.0, 1.0, 1.0), rotation);
        // Corner of the diamond reaches sqrt(2) along X
        let near = Obb::from_aabb(&Aabb::new(Vec3::new(1.3, -0.1, -0.1), Vec3::new(2.0, 0.1, 0.1)));
        let far = Obb::from_aabb(&Aabb::new(Vec3::new(1.5, -0.1, -0.1), Vec3::new(2.0, 0.1, 0.1)));
        assert!(diamond.intersects(&near));
        assert!(!diamond.intersects(&far));
    }

    #[test]
    fn test_obb_to_aabb_rotated() {
        let rotation = Orientation::from_yaw(FRAC_PI_4).rotation().into_inner();
        let obb = Obb::new(Vec3::zeros(), Vec3::new(1.0, 1.0, 1.0), rotation);
        let aabb = obb.to_aabb();
        assert_relative_eq!(aabb.max.x, 2.0_f32.sqrt(), epsilon = EPSILON);
        assert_relative_eq!(aabb.max.z, 1.0, epsilon = EPSILON);
    }

    #[test]
    fn test_triangle_contains_point_either_winding() {
        let ccw = Triangle::new(Vec3::zeros(), Vec3::new(4.0, 0.0, 0.0), Vec3::new(0.0, 4.0, 0.0));
        let cw = Triangle::new(Vec3::zeros(), Vec3::new(0.0, 4.0, 0.0), Vec3::new(4.0, 0.0, 0.0));
        let inside = Vec3::new(1.0, 1.0, 50.0);
        let outside = Vec3::new(3.0, 3.0, 0.0);
        assert!(ccw.contains_point_2d(&inside));
        assert!(cw.contains_point_2d(&inside));
        assert!(!ccw.contains_point_2d(&outside));
        assert!(!cw.contains_point_2d(&outside));
    }

    #[test]
    fn test_triangle_circle_2d() {
        let triangle = Triangle::new(Vec3::zeros(), Vec3::new(4.0, 0.0, 0.0), Vec3::new(0.0, 4.0, 0.0));
        assert!(triangle.intersects_circle_2d(&Vec3::new(2.0, -0.5, 0.0), 1.0));
        assert!(!triangle.intersects_circle_2d(&Vec3::new(2.0, -2.0, 0.0), 1.0));
    }

    #[test]
    fn test_triangle_aabb_sat() {
        let triangle = Triangle::new(Vec3::new(-5.0, -5.0, 0.0), Vec3::new(5.0, -5.0, 0.0), Vec3::new(0.0, 5.0, 0.0));
        assert!(triangle.intersects_aabb(&unit_box()));
        assert!(!triangle.intersects_aabb(&unit_box().translated(&Vec3::new(0.0, 0.0, 3.0))));
        assert!(!triangle.intersects_aabb(&unit_box().translated(&Vec3::new(6.0, 6.0, 0.0))));
    }

    #[test]
    fn test_triangle_2d_sat() {
        let a = Triangle::new(Vec3::zeros(), Vec3::new(4.0, 0.0, 0.0), Vec3::new(0.0, 4.0, 0.0));
        let b = a.translated(&Vec3::new(1.0, 1.0, 0.0));
        let c = a.translated(&Vec3::new(3.0, 3.0, 0.0));
        assert!(a.intersects_2d(&b));
        assert!(!a.intersects_2d(&c));
    }
}
