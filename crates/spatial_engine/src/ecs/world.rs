//! World implementation

use super::entity::{EntityId, EntityTraits, SpatialEntity, WorldEntity};
use crate::config::{ConfigError, SpatialConfig};
use crate::foundation::collections::SlotMap;
use crate::foundation::math::{Orientation, Vec3};
use crate::physics::Bounds;
use crate::spatial::{EntityRegionSpatialPartition, PartitionContext, PlayerGuid};

/// Entities of one region together with their spatial index
#[derive(Debug)]
pub struct World {
    entities: SlotMap<EntityId, WorldEntity>,
    partition: EntityRegionSpatialPartition,
}

impl World {
    /// Create an empty world indexed by `partition`
    pub fn new(partition: EntityRegionSpatialPartition) -> Self {
        Self {
            entities: SlotMap::with_key(),
            partition,
        }
    }

    /// Create an empty world from configuration
    pub fn from_config(config: &SpatialConfig) -> Result<Self, ConfigError> {
        Ok(Self::new(EntityRegionSpatialPartition::from_config(config)?))
    }

    /// Create an entity and index it
    pub fn spawn(&mut self, bounds: Bounds, traits: EntityTraits, restricted_to: Option<PlayerGuid>) -> EntityId {
        let id = self
            .entities
            .insert_with_key(|id| WorldEntity::new(id, bounds, traits, restricted_to));
        if let Some(entity) = self.entities.get_mut(id) {
            self.partition.insert(entity);
        }
        id
    }

    /// Remove an entity from the world and its index
    pub fn despawn(&mut self, id: EntityId) -> Option<WorldEntity> {
        let mut entity = self.entities.remove(id)?;
        self.partition.remove(&mut entity);
        Some(entity)
    }

    /// Move an entity and reindex it
    pub fn set_position(&mut self, id: EntityId, position: Vec3) -> bool {
        let Some(entity) = self.entities.get_mut(id) else {
            log::warn!("set_position on unknown entity {id:?}");
            return false;
        };
        entity.bounds_mut().set_center(position);
        self.partition.update(entity);
        true
    }

    /// Rotate an entity and reindex it
    pub fn set_orientation(&mut self, id: EntityId, orientation: Orientation) -> bool {
        let Some(entity) = self.entities.get_mut(id) else {
            log::warn!("set_orientation on unknown entity {id:?}");
            return false;
        };
        entity.bounds_mut().set_orientation(orientation);
        self.partition.update(entity);
        true
    }

    /// Get an entity
    pub fn get(&self, id: EntityId) -> Option<&WorldEntity> {
        self.entities.get(id)
    }

    /// Number of live entities
    pub fn entity_count(&self) -> usize {
        self.entities.len()
    }

    /// Get an iterator over all entities
    pub fn entities(&self) -> impl Iterator<Item = &WorldEntity> {
        self.entities.values()
    }

    /// The region's spatial index
    pub fn partition(&self) -> &EntityRegionSpatialPartition {
        &self.partition
    }

    /// Entities whose bounds truly intersect `bounds`.
    ///
    /// The partition yields AABB candidates; each is confirmed with an exact
    /// bounds test.
    pub fn overlapping(&self, bounds: &Bounds, context: PartitionContext) -> Vec<EntityId> {
        self.partition
            .iterate_elements_in_volume(*bounds, context)
            .filter(|id| {
                self.entities
                    .get(*id)
                    .is_some_and(|entity| entity.bounds().intersects(bounds))
            })
            .collect()
    }
}
