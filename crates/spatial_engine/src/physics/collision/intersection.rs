//! Mixed-shape intersection tests
//!
//! Each unordered pair of canonical shapes has exactly one routine here, so
//! `a` vs `b` and `b` vs `a` always agree.

use super::primitives::{Aabb, Capsule, Obb, Segment, Sphere, Triangle};

/// Iterations of the ternary search used for segment-to-box distances
const DISTANCE_SEARCH_STEPS: usize = 40;

/// Squared distance between a segment and a box.
///
/// The distance to a convex set is convex along the segment, so a ternary
/// search over the segment parameter converges on the minimum.
pub fn segment_aabb_distance_sq(segment: &Segment, aabb: &Aabb) -> f32 {
    if aabb.intersect_segment(segment).is_some() {
        return 0.0;
    }

    let distance_at = |t: f32| aabb.distance_sq_to_point(&segment.point_at(t));
    let mut lo = 0.0_f32;
    let mut hi = 1.0_f32;
    for _ in 0..DISTANCE_SEARCH_STEPS {
        let m1 = lo + (hi - lo) / 3.0;
        let m2 = hi - (hi - lo) / 3.0;
        if distance_at(m1) <= distance_at(m2) {
            hi = m2;
        } else {
            lo = m1;
        }
    }
    distance_at((lo + hi) * 0.5)
}

/// AABB vs OBB
pub fn aabb_obb(aabb: &Aabb, obb: &Obb) -> bool {
    Obb::from_aabb(aabb).intersects(obb)
}

/// Sphere vs OBB, tested in the box's frame
pub fn sphere_obb(sphere: &Sphere, obb: &Obb) -> bool {
    let local = Sphere::new(obb.to_local(&sphere.center), sphere.radius);
    local.intersects_aabb(&obb.local_aabb())
}

/// Capsule vs AABB
pub fn capsule_aabb(capsule: &Capsule, aabb: &Aabb) -> bool {
    segment_aabb_distance_sq(&capsule.segment(), aabb) <= capsule.radius * capsule.radius
}

/// Capsule vs OBB, tested in the box's frame
pub fn capsule_obb(capsule: &Capsule, obb: &Obb) -> bool {
    let local = Capsule::new(obb.to_local(&capsule.a), obb.to_local(&capsule.b), capsule.radius);
    capsule_aabb(&local, &obb.local_aabb())
}

/// Capsule vs sphere
pub fn capsule_sphere(capsule: &Capsule, sphere: &Sphere) -> bool {
    let radius_sum = capsule.radius + sphere.radius;
    capsule.segment().distance_sq_to_point(&sphere.center) <= radius_sum * radius_sum
}

/// Triangle vs sphere, as a circle test on the XY plane
pub fn triangle_sphere(triangle: &Triangle, sphere: &Sphere) -> bool {
    triangle.intersects_circle_2d(&sphere.center, sphere.radius)
}

/// Triangle vs capsule.
///
/// The capsule's footprint is a circle on the XY plane. The triangle must
/// also sit inside the capsule's vertical span.
pub fn triangle_capsule(triangle: &Triangle, capsule: &Capsule) -> bool {
    let z_min = capsule.a.z.min(capsule.b.z) - capsule.radius;
    let z_max = capsule.a.z.max(capsule.b.z) + capsule.radius;
    let tri_aabb = triangle.to_aabb();
    if tri_aabb.max.z < z_min || tri_aabb.min.z > z_max {
        return false;
    }
    let mid = (capsule.a + capsule.b) * 0.5;
    triangle.intersects_circle_2d(&mid, capsule.radius)
}
