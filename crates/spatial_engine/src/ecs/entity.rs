//! Entity implementation
//!
//! The partition only needs a narrow view of an entity: its bounds, its
//! location handle and a few classification predicates. [`SpatialEntity`]
//! is that view; [`WorldEntity`] is the concrete entity stored in a
//! [`World`](super::World).

use crate::foundation::collections::new_key_type;
use crate::physics::Bounds;
use crate::spatial::{PlayerGuid, SpatialPartitionLocation};

new_key_type! {
    /// Entity identifier
    pub struct EntityId;
}

bitflags::bitflags! {
    /// Classification bits read when routing an entity to a partition
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct EntityTraits: u32 {
        /// Player-controlled avatar
        const AVATAR = 1 << 0;
        /// Trigger volume
        const HOTSPOT = 1 << 1;
        /// Hotspot that also blocks or overlaps like a solid
        const COLLIDABLE_HOTSPOT = 1 << 2;
        /// Hotspot that reflects projectiles
        const REFLECTING_HOTSPOT = 1 << 3;
        /// Powers never target or affect this entity
        const NEVER_AFFECTED_BY_POWERS = 1 << 4;
    }
}

/// What a region partition needs from an entity
pub trait SpatialEntity {
    /// Identifier stored in the partition's trees
    fn entity_id(&self) -> EntityId;

    /// Current world-space bounds
    fn bounds(&self) -> &Bounds;

    /// Where the entity is indexed, if anywhere
    fn spatial_location(&self) -> SpatialPartitionLocation;

    /// Record where the entity is indexed
    fn set_spatial_location(&mut self, location: SpatialPartitionLocation);

    /// True for player avatars
    fn is_avatar(&self) -> bool;

    /// True if powers never affect the entity
    fn is_never_affected_by_powers(&self) -> bool;

    /// True for trigger volumes
    fn is_hotspot(&self) -> bool;

    /// True for hotspots that also collide
    fn is_collidable_hotspot(&self) -> bool;

    /// True for hotspots that reflect projectiles
    fn is_reflecting_hotspot(&self) -> bool;

    /// Player this entity is restricted to, if any
    fn player_restricted_guid(&self) -> Option<PlayerGuid>;
}

/// An entity living in a region
#[derive(Debug, Clone)]
pub struct WorldEntity {
    id: EntityId,
    bounds: Bounds,
    location: SpatialPartitionLocation,
    traits: EntityTraits,
    restricted_to: Option<PlayerGuid>,
}

impl WorldEntity {
    pub(super) fn new(id: EntityId, bounds: Bounds, traits: EntityTraits, restricted_to: Option<PlayerGuid>) -> Self {
        Self {
            id,
            bounds,
            location: SpatialPartitionLocation::INVALID,
            traits,
            restricted_to,
        }
    }

    /// Get the entity ID
    pub fn id(&self) -> EntityId {
        self.id
    }

    /// Classification bits
    pub fn traits(&self) -> EntityTraits {
        self.traits
    }

    /// Mutable bounds; the owning partition must be updated afterwards
    pub fn bounds_mut(&mut self) -> &mut Bounds {
        &mut self.bounds
    }
}

impl SpatialEntity for WorldEntity {
    fn entity_id(&self) -> EntityId {
        self.id
    }

    fn bounds(&self) -> &Bounds {
        &self.bounds
    }

    fn spatial_location(&self) -> SpatialPartitionLocation {
        self.location
    }

    fn set_spatial_location(&mut self, location: SpatialPartitionLocation) {
        self.location = location;
    }

    fn is_avatar(&self) -> bool {
        self.traits.contains(EntityTraits::AVATAR)
    }

    fn is_never_affected_by_powers(&self) -> bool {
        self.traits.contains(EntityTraits::NEVER_AFFECTED_BY_POWERS)
    }

    fn is_hotspot(&self) -> bool {
        self.traits.contains(EntityTraits::HOTSPOT)
    }

    fn is_collidable_hotspot(&self) -> bool {
        self.traits.contains(EntityTraits::HOTSPOT | EntityTraits::COLLIDABLE_HOTSPOT)
    }

    fn is_reflecting_hotspot(&self) -> bool {
        self.traits.contains(EntityTraits::HOTSPOT | EntityTraits::REFLECTING_HOTSPOT)
    }

    fn player_restricted_guid(&self) -> Option<PlayerGuid> {
        self.restricted_to.filter(|guid| *guid != 0)
    }
}
