//! Canonical collision shapes and the tests between them
//!
//! # Module Organization
//!
//! - [`primitives`] - Canonical shapes (boxes, spheres, capsules, triangles, segments)
//! - [`intersection`] - Tests between two different canonical shapes
//! - [`sweep`] - Continuous collision over a unit time step
//!
//! # Key Types
//!
//! - [`Aabb`], [`Obb`], [`Capsule`], [`Sphere`], [`Triangle`] - Shapes that
//!   [`Bounds`](crate::physics::Bounds) converts to before testing
//! - [`SweepHit`] - Time of impact and contact normal

pub mod intersection;
pub mod primitives;
pub mod sweep;

// Re-export commonly used types
pub use primitives::{Aabb, Aabb2, Capsule, Containment, Obb, Segment, Sphere, Triangle};
pub use sweep::{Cylinder2, SweepHit};
