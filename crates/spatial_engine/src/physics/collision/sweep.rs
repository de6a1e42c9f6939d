//! Continuous collision sweeps
//!
//! All sweeps run over a unit time step: a body at `p` with velocity `v`
//! travels to `p + v` and the reported time is in `[0, 1]`.

use super::primitives::{Aabb, Aabb2, Segment, Sphere};
use crate::foundation::math::{utils, Vec2, Vec3, NEAR_ZERO_EPSILON};

/// Time of impact and contact normal of a sweep
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SweepHit {
    /// Fraction of the step at which contact begins
    pub time: f32,
    /// Contact normal, pointing away from the surface that was hit
    pub normal: Vec3,
}

impl SweepHit {
    /// Create a hit record
    pub fn new(time: f32, normal: Vec3) -> Self {
        Self { time, normal }
    }
}

/// Entry and exit times of a moving point through a region
type Interval = (f32, f32);

fn merge(a: Option<Interval>, b: Option<Interval>) -> Option<Interval> {
    match (a, b) {
        (Some((a0, a1)), Some((b0, b1))) => Some((a0.min(b0), a1.max(b1))),
        (a, None) => a,
        (None, b) => b,
    }
}

/// Times at which `origin + t * velocity` is inside `[min, max]`
fn slab_interval(origin: f32, velocity: f32, min: f32, max: f32) -> Option<Interval> {
    if velocity.abs() < NEAR_ZERO_EPSILON {
        return (origin >= min && origin <= max).then_some((f32::NEG_INFINITY, f32::INFINITY));
    }
    let t0 = (min - origin) / velocity;
    let t1 = (max - origin) / velocity;
    Some((t0.min(t1), t0.max(t1)))
}

fn rect_interval(origin: &Vec2, velocity: &Vec2, rect: &Aabb2) -> Option<Interval> {
    let (x0, x1) = slab_interval(origin.x, velocity.x, rect.min.x, rect.max.x)?;
    let (y0, y1) = slab_interval(origin.y, velocity.y, rect.min.y, rect.max.y)?;
    let enter = x0.max(y0);
    let exit = x1.min(y1);
    (enter <= exit).then_some((enter, exit))
}

fn disc_interval(origin: &Vec2, velocity: &Vec2, center: &Vec2, radius: f32) -> Option<Interval> {
    let m = origin - center;
    let c = m.norm_squared() - radius * radius;
    let a = velocity.norm_squared();
    if a < NEAR_ZERO_EPSILON {
        return (c <= 0.0).then_some((f32::NEG_INFINITY, f32::INFINITY));
    }
    let b = m.dot(velocity);
    let discriminant = b * b - a * c;
    if discriminant < 0.0 {
        return None;
    }
    let root = discriminant.sqrt();
    Some(((-b - root) / a, (-b + root) / a))
}

impl Sphere {
    /// Analytic sweep of two moving spheres (Ericson, RTCD 5.5.5).
    ///
    /// Returns the time of first contact, or zero if they already overlap.
    pub fn sweep(&self, velocity: &Vec3, other: &Sphere, other_velocity: &Vec3) -> Option<f32> {
        let s = other.center - self.center;
        let v = other_velocity - velocity;
        sweep_relative(&s, &v, self.radius + other.radius)
    }

    /// Sphere sweep that ignores height, treating both as vertical cylinders
    pub fn sweep_xy(&self, velocity: &Vec3, other: &Sphere, other_velocity: &Vec3) -> Option<f32> {
        let mut s = other.center - self.center;
        let mut v = other_velocity - velocity;
        s.z = 0.0;
        v.z = 0.0;
        sweep_relative(&s, &v, self.radius + other.radius)
    }

    /// Sweep a moving sphere against a static box.
    ///
    /// The box is grown by the radius, so contact near the box's edges is
    /// reported slightly early.
    pub fn sweep_aabb(&self, velocity: &Vec3, aabb: &Aabb) -> Option<f32> {
        let expanded = aabb.expanded(self.radius);
        expanded.intersect_segment(&Segment::new(self.center, self.center + velocity))
    }
}

fn sweep_relative(s: &Vec3, v: &Vec3, radius_sum: f32) -> Option<f32> {
    let c = s.norm_squared() - radius_sum * radius_sum;
    if c < 0.0 {
        return Some(0.0);
    }
    let a = v.norm_squared();
    if a < NEAR_ZERO_EPSILON {
        return None;
    }
    let b = v.dot(s);
    if b >= 0.0 {
        return None;
    }
    let discriminant = b * b - a * c;
    if discriminant < 0.0 {
        return None;
    }
    let t = (-b - discriminant.sqrt()) / a;
    (t <= 1.0).then_some(t)
}

/// Upright cylinder used to approximate capsules and spheres in sweeps
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Cylinder2 {
    /// Center of the cylinder
    pub center: Vec3,
    /// Radius on the XY plane
    pub radius: f32,
    /// Half the cylinder's height
    pub half_height: f32,
}

impl Cylinder2 {
    /// Create a cylinder
    pub fn new(center: Vec3, radius: f32, half_height: f32) -> Self {
        Self { center, radius, half_height }
    }

    /// Sweep the cylinder against a static box.
    ///
    /// The footprint's contact region is the box rectangle with rounded
    /// corners: the union of the rectangle grown along X, grown along Y and a
    /// disc at each corner. Contact requires the vertical ranges to overlap at
    /// the same time. The normal points from the box toward the cylinder.
    pub fn sweep_aabb(&self, velocity: &Vec3, aabb: &Aabb) -> Option<SweepHit> {
        let (z_enter, z_exit) = slab_interval(
            self.center.z,
            velocity.z,
            aabb.min.z - self.half_height,
            aabb.max.z + self.half_height,
        )?;

        let origin = utils::to_2d(&self.center);
        let velocity_2d = utils::to_2d(velocity);
        let rect = aabb.to_2d();
        let r = self.radius;

        let grown_x = Aabb2::new(rect.min - Vec2::new(r, 0.0), rect.max + Vec2::new(r, 0.0));
        let grown_y = Aabb2::new(rect.min - Vec2::new(0.0, r), rect.max + Vec2::new(0.0, r));
        let mut xy = merge(
            rect_interval(&origin, &velocity_2d, &grown_x),
            rect_interval(&origin, &velocity_2d, &grown_y),
        );
        for corner in rect.corners() {
            xy = merge(xy, disc_interval(&origin, &velocity_2d, &corner, r));
        }
        let (xy_enter, xy_exit) = xy?;

        let enter = xy_enter.max(z_enter).max(0.0);
        let exit = xy_exit.min(z_exit).min(1.0);
        if enter > exit {
            return None;
        }

        let normal = if z_enter > xy_enter && z_enter > 0.0 {
            if velocity.z < 0.0 {
                Vec3::z()
            } else {
                -Vec3::z()
            }
        } else {
            let contact = self.center + velocity * enter;
            let closest = rect.min.sup(&utils::to_2d(&contact)).inf(&rect.max);
            let away = Vec3::new(contact.x - closest.x, contact.y - closest.y, 0.0);
            utils::safe_normalize_2d(&away, utils::safe_normalize_2d(&-velocity, Vec3::z()))
        };

        Some(SweepHit::new(enter, normal))
    }
}
