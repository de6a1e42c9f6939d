//! Spatial partitioning data structures
//!
//! Provides the loose quadtree, the query-volume trait and the per-region
//! partition that routes entities into parallel trees.

mod location;
mod partition;
mod quadtree;
mod spatial_query;

#[cfg(test)]
mod tests;

pub use location::{PartitionId, PlayerGuid, SpatialPartitionLocation};
pub use partition::{AvatarIter, EntityRegionSpatialPartition, PartitionContext, PartitionContextFlags, PartitionIter};
pub use quadtree::{ElementIter, ElementKey, NodeKey, Quadtree, LOOSENESS, PUSH_DOWN_THRESHOLD};
pub use spatial_query::QueryVolume;
