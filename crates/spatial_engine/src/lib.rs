//! # Spatial Engine
//!
//! Collision geometry and region spatial partitioning for a real-time
//! multiplayer simulation.
//!
//! ## Features
//!
//! - **Bounds**: six placed shapes with containment, intersection, segment
//!   and continuous sweep tests
//! - **Loose Quadtree**: arena-backed XY index with stable element keys
//! - **Region Partition**: parallel trees for collidable, power-immune and
//!   player-restricted entities behind one query interface
//! - **Configuration**: region settings and shape descriptors in TOML or RON
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use spatial_engine::prelude::*;
//!
//! fn main() -> Result<(), ConfigError> {
//!     let mut world = World::from_config(&SpatialConfig::default())?;
//!
//!     let mut bounds = Bounds::with_geometry(Geometry::new_sphere(1.0), BoundsCollisionType::Blocking);
//!     bounds.set_center(Vec3::new(10.0, 0.0, 0.0));
//!     let id = world.spawn(bounds, EntityTraits::AVATAR, None);
//!
//!     let query = Sphere::new(Vec3::zeros(), 20.0);
//!     for found in world.partition().iterate_elements_in_volume(query, PartitionContext::all()) {
//!         assert_eq!(found, id);
//!     }
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions, clippy::similar_names, clippy::too_many_arguments)]

pub mod config;
pub mod ecs;
pub mod foundation;
pub mod physics;
pub mod spatial;

/// Common imports for engine users
pub mod prelude {
    pub use crate::{
        config::{Config, ConfigError, SpatialConfig},
        ecs::{EntityId, EntityTraits, SpatialEntity, World, WorldEntity},
        foundation::math::{Orientation, Vec3},
        physics::{
            Aabb, BlockingCheckFlags, Bounds, BoundsCollisionType, BoundsPrototype, Capsule, Geometry, Obb,
            ShapePrototype, Sphere, SweepHit, Triangle,
        },
        spatial::{
            EntityRegionSpatialPartition, PartitionContext, PartitionContextFlags, QueryVolume,
            SpatialPartitionLocation,
        },
    };
}
