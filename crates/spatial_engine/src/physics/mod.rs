//! Collision geometry
//!
//! Provides the placed shapes entities carry ([`Bounds`]) and the canonical
//! shape tests they are built on.

pub mod bounds;
pub mod collision;
pub mod collision_types;
pub mod geometry;

pub use bounds::{Bounds, BoundsPrototype, ShapePrototype};
pub use collision::{Aabb, Aabb2, Capsule, Containment, Cylinder2, Obb, Segment, Sphere, SweepHit, Triangle};
pub use collision_types::{BlockingCheckFlags, BoundsCollisionType, BoundsFlags, BoundsMovementPowerBlockType};
pub use geometry::Geometry;
