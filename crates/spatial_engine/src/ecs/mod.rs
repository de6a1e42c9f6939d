//! Entity storage
//!
//! Provides the entity contract the spatial partition consumes and an
//! arena-backed world that keeps entities and their region index in step.

pub mod entity;
pub mod world;

pub use entity::{EntityId, EntityTraits, SpatialEntity, WorldEntity};
pub use world::World;
