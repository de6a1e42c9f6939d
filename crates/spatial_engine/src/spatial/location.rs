//! Per-entity back-reference into a spatial partition

use super::quadtree::ElementKey;

/// Identifier of the player an entity is restricted to
pub type PlayerGuid = u64;

/// One of the parallel trees of a region partition
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum PartitionId {
    /// Generally collidable entities
    Primary,
    /// Entities that powers never affect, and passive hotspots
    NotAffectedByPowers,
    /// Entities only one player can see or interact with
    PlayerRestricted(PlayerGuid),
}

/// Where an entity is stored in its region's partition.
///
/// Owned by the entity; never owns the tree data it points into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SpatialPartitionLocation {
    slot: Option<(PartitionId, ElementKey)>,
}

impl SpatialPartitionLocation {
    /// Location of an entity that is not indexed
    pub const INVALID: Self = Self { slot: None };

    /// Location of an element in a partition's tree
    pub fn new(partition: PartitionId, key: ElementKey) -> Self {
        Self { slot: Some((partition, key)) }
    }

    /// True if the entity is currently indexed
    pub fn is_valid(&self) -> bool {
        self.slot.is_some()
    }

    /// Tree the entity lives in
    pub fn partition(&self) -> Option<PartitionId> {
        self.slot.map(|(partition, _)| partition)
    }

    /// Key of the entity inside its tree
    pub fn key(&self) -> Option<ElementKey> {
        self.slot.map(|(_, key)| key)
    }

    /// Both halves of the location
    pub fn get(&self) -> Option<(PartitionId, ElementKey)> {
        self.slot
    }

    /// Mark the entity as no longer indexed
    pub fn clear(&mut self) {
        self.slot = None;
    }
}
