//! Query volumes for spatial iteration
//!
//! A quadtree walk needs two answers from a volume: how it relates to a node's
//! XY square (to prune or skip whole subtrees) and whether it touches an
//! element's stored AABB. Any shape that can answer both can drive a query.

use crate::foundation::math::{utils, Vec2, Vec3};
use crate::physics::collision::intersection;
use crate::physics::{Aabb, Aabb2, Bounds, Capsule, Containment, Obb, Sphere};

/// A shape that spatial partitions can be queried with
pub trait QueryVolume {
    /// Relation between the volume's XY footprint and a region.
    ///
    /// Must never report [`Containment::Disjoint`] for a region the volume
    /// touches. Reporting [`Containment::Intersects`] when unsure is fine.
    fn contains_xy(&self, region: &Aabb2) -> Containment;

    /// Check if the volume touches a box
    fn intersects_aabb(&self, aabb: &Aabb) -> bool;
}

/// Classify a region by how many of its corners pass `inside`
fn corner_containment(region: &Aabb2, inside: impl Fn(&Vec2) -> bool) -> Containment {
    if region.corners().iter().all(inside) {
        Containment::Contains
    } else {
        Containment::Intersects
    }
}

impl QueryVolume for Aabb {
    fn contains_xy(&self, region: &Aabb2) -> Containment {
        self.to_2d().containment(region)
    }

    fn intersects_aabb(&self, aabb: &Aabb) -> bool {
        self.intersects(aabb)
    }
}

impl QueryVolume for Sphere {
    fn contains_xy(&self, region: &Aabb2) -> Containment {
        let center = utils::to_2d(&self.center);
        let radius_sq = self.radius * self.radius;
        let closest = center.sup(&region.min).inf(&region.max);
        if (closest - center).norm_squared() > radius_sq {
            return Containment::Disjoint;
        }
        corner_containment(region, |corner| (corner - center).norm_squared() <= radius_sq)
    }

    fn intersects_aabb(&self, aabb: &Aabb) -> bool {
        Sphere::intersects_aabb(self, aabb)
    }
}

impl QueryVolume for Obb {
    fn contains_xy(&self, region: &Aabb2) -> Containment {
        if !self.to_aabb().to_2d().intersects(region) {
            return Containment::Disjoint;
        }
        let z = self.center.z;
        corner_containment(region, |corner| {
            self.contains_point(&Vec3::new(corner.x, corner.y, z))
        })
    }

    fn intersects_aabb(&self, aabb: &Aabb) -> bool {
        intersection::aabb_obb(aabb, self)
    }
}

impl QueryVolume for Capsule {
    fn contains_xy(&self, region: &Aabb2) -> Containment {
        if !self.to_aabb().to_2d().intersects(region) {
            return Containment::Disjoint;
        }
        let a = utils::to_2d(&self.a);
        let b = utils::to_2d(&self.b);
        let radius_sq = self.radius * self.radius;
        corner_containment(region, |corner| {
            utils::segment_point_distance_sq_2d(&a, &b, corner) <= radius_sq
        })
    }

    fn intersects_aabb(&self, aabb: &Aabb) -> bool {
        intersection::capsule_aabb(self, aabb)
    }
}

impl QueryVolume for Bounds {
    fn contains_xy(&self, region: &Aabb2) -> Containment {
        if self.to_aabb().to_2d().intersects(region) {
            Containment::Intersects
        } else {
            Containment::Disjoint
        }
    }

    fn intersects_aabb(&self, aabb: &Aabb) -> bool {
        Bounds::intersects_aabb(self, aabb)
    }
}
