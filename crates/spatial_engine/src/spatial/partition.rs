//! Region spatial partition
//!
//! A region keeps several quadtrees side by side: one for generally
//! collidable entities, one for entities powers never touch, and one per
//! player for player-restricted entities. Queries pick the trees they need
//! through a [`PartitionContext`] and see them as one lazy sequence.
//!
//! Avatars are also tracked in a flat list so proximity checks against
//! players do not need a tree descent.

use std::cell::Cell;
use std::collections::BTreeMap;

use crate::config::{ConfigError, SpatialConfig};
use crate::ecs::{EntityId, SpatialEntity};
use crate::foundation::collections::{PooledVec, ScratchPool};
use crate::foundation::math::Vec3;
use crate::physics::{Aabb, Sphere};

use super::location::{PartitionId, PlayerGuid, SpatialPartitionLocation};
use super::quadtree::{ElementIter, Quadtree};
use super::spatial_query::QueryVolume;

bitflags::bitflags! {
    /// Which partitions a query visits
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct PartitionContextFlags: u32 {
        /// Generally collidable entities
        const PRIMARY = 1 << 0;
        /// Entities powers never affect
        const NOT_AFFECTED_BY_POWERS = 1 << 1;
        /// Every player-restricted tree, regardless of player
        const PLAYER_RESTRICTED = 1 << 2;

        /// Everything not restricted to a player
        const UNRESTRICTED = Self::PRIMARY.bits() | Self::NOT_AFFECTED_BY_POWERS.bits();
        /// Every partition
        const ALL = Self::UNRESTRICTED.bits() | Self::PLAYER_RESTRICTED.bits();
    }
}

/// Selects the trees a query walks
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PartitionContext {
    /// Partitions to visit
    pub flags: PartitionContextFlags,
    /// Restricted tree to visit when not visiting all of them
    pub player_restricted_guid: Option<PlayerGuid>,
}

impl PartitionContext {
    /// Context with explicit flags and player
    pub fn new(flags: PartitionContextFlags, player_restricted_guid: Option<PlayerGuid>) -> Self {
        Self { flags, player_restricted_guid }
    }

    /// Visit every partition
    pub fn all() -> Self {
        Self::new(PartitionContextFlags::ALL, None)
    }

    /// Visit what one player can interact with: everything unrestricted plus
    /// that player's own tree
    pub fn for_player(guid: PlayerGuid) -> Self {
        Self::new(PartitionContextFlags::UNRESTRICTED, Some(guid))
    }
}

impl Default for PartitionContext {
    fn default() -> Self {
        Self::all()
    }
}

#[derive(Debug, Clone, Copy)]
struct AvatarEntry {
    id: EntityId,
    position: Vec3,
}

/// Spatial index of the entities in one region
#[derive(Debug)]
pub struct EntityRegionSpatialPartition {
    bounds: Aabb,
    min_radius: f32,
    primary: Quadtree<EntityId>,
    not_affected_by_powers: Quadtree<EntityId>,
    player_restricted: BTreeMap<PlayerGuid, Quadtree<EntityId>>,
    avatars: Vec<AvatarEntry>,
    avatar_iterator_count: Cell<usize>,
    partition_pool: ScratchPool<PartitionId>,
    total_elements: usize,
}

impl EntityRegionSpatialPartition {
    /// Create an empty partition covering `bounds`
    pub fn new(bounds: Aabb, min_radius: f32) -> Self {
        Self {
            bounds,
            min_radius,
            primary: Quadtree::new(bounds, min_radius),
            not_affected_by_powers: Quadtree::new(bounds, min_radius),
            player_restricted: BTreeMap::new(),
            avatars: Vec::new(),
            avatar_iterator_count: Cell::new(0),
            partition_pool: ScratchPool::new(),
            total_elements: 0,
        }
    }

    /// Create a partition from validated configuration
    pub fn from_config(config: &SpatialConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self::new(config.region_bounds(), config.min_node_radius))
    }

    /// Region covered by every tree
    pub fn bounds(&self) -> &Aabb {
        &self.bounds
    }

    /// Entities currently indexed across all trees
    pub fn total_elements(&self) -> usize {
        self.total_elements
    }

    /// Number of player-restricted trees created so far
    pub fn player_restricted_partition_count(&self) -> usize {
        self.player_restricted.len()
    }

    /// Number of tracked avatars
    pub fn avatar_count(&self) -> usize {
        self.avatars.len()
    }

    /// Tree behind a partition id, if it exists
    pub fn tree(&self, partition: PartitionId) -> Option<&Quadtree<EntityId>> {
        match partition {
            PartitionId::Primary => Some(&self.primary),
            PartitionId::NotAffectedByPowers => Some(&self.not_affected_by_powers),
            PartitionId::PlayerRestricted(guid) => self.player_restricted.get(&guid),
        }
    }

    fn tree_mut(&mut self, partition: PartitionId) -> Option<&mut Quadtree<EntityId>> {
        match partition {
            PartitionId::Primary => Some(&mut self.primary),
            PartitionId::NotAffectedByPowers => Some(&mut self.not_affected_by_powers),
            PartitionId::PlayerRestricted(guid) => self.player_restricted.get_mut(&guid),
        }
    }

    fn tree_or_create(&mut self, partition: PartitionId) -> &mut Quadtree<EntityId> {
        match partition {
            PartitionId::Primary => &mut self.primary,
            PartitionId::NotAffectedByPowers => &mut self.not_affected_by_powers,
            PartitionId::PlayerRestricted(guid) => {
                let (bounds, min_radius) = (self.bounds, self.min_radius);
                self.player_restricted.entry(guid).or_insert_with(|| {
                    log::debug!("Creating player-restricted partition for player {guid}");
                    Quadtree::new(bounds, min_radius)
                })
            }
        }
    }

    /// Tree an entity belongs in
    pub fn classify<T: SpatialEntity + ?Sized>(entity: &T) -> PartitionId {
        if let Some(guid) = entity.player_restricted_guid() {
            return PartitionId::PlayerRestricted(guid);
        }
        let passive_hotspot =
            entity.is_hotspot() && !entity.is_collidable_hotspot() && !entity.is_reflecting_hotspot();
        if entity.is_never_affected_by_powers() || passive_hotspot {
            PartitionId::NotAffectedByPowers
        } else {
            PartitionId::Primary
        }
    }

    /// Index an entity and record its location.
    ///
    /// An entity that is already indexed is updated instead.
    pub fn insert<T: SpatialEntity + ?Sized>(&mut self, entity: &mut T) {
        if entity.spatial_location().is_valid() {
            log::warn!("Entity {:?} inserted twice into spatial partition, updating instead", entity.entity_id());
            self.update(entity);
            return;
        }

        let partition = Self::classify(entity);
        if entity.is_avatar() && entity.player_restricted_guid().is_none() {
            self.track_avatar(entity.entity_id(), entity.bounds().center());
        }

        let bounds = entity.bounds().to_aabb();
        let key = self.tree_or_create(partition).insert(entity.entity_id(), bounds);
        entity.set_spatial_location(SpatialPartitionLocation::new(partition, key));
        self.total_elements += 1;
    }

    /// Drop an entity from the index.
    ///
    /// Returns false, with a warning, if the entity was not indexed.
    pub fn remove<T: SpatialEntity + ?Sized>(&mut self, entity: &mut T) -> bool {
        let Some((partition, key)) = entity.spatial_location().get() else {
            log::warn!("Removing entity {:?} that is not in the spatial partition", entity.entity_id());
            return false;
        };

        self.total_elements = self.total_elements.saturating_sub(1);
        if entity.is_avatar() {
            self.untrack_avatar(entity.entity_id());
        }

        let removed = self.tree_mut(partition).and_then(|tree| tree.remove(key));
        if removed.is_none() {
            log::warn!("Entity {:?} had a stale spatial location in {partition:?}", entity.entity_id());
        }
        entity.set_spatial_location(SpatialPartitionLocation::INVALID);
        true
    }

    /// Move an entity to match its current bounds.
    ///
    /// An entity that is not indexed yet is inserted.
    pub fn update<T: SpatialEntity + ?Sized>(&mut self, entity: &mut T) {
        let Some((partition, key)) = entity.spatial_location().get() else {
            log::warn!("Entity {:?} updated before being inserted into spatial partition, inserting", entity.entity_id());
            self.insert(entity);
            return;
        };

        let bounds = entity.bounds().to_aabb();
        let updated = self.tree_mut(partition).is_some_and(|tree| tree.update(key, bounds));
        if !updated {
            log::warn!("Entity {:?} had a stale spatial location in {partition:?}, reinserting", entity.entity_id());
            entity.set_spatial_location(SpatialPartitionLocation::INVALID);
            self.total_elements = self.total_elements.saturating_sub(1);
            self.insert(entity);
            return;
        }

        if entity.is_avatar() {
            let id = entity.entity_id();
            if let Some(avatar) = self.avatars.iter_mut().find(|avatar| avatar.id == id) {
                avatar.position = entity.bounds().center();
            }
        }
    }

    fn track_avatar(&mut self, id: EntityId, position: Vec3) {
        if self.avatars.iter().any(|avatar| avatar.id == id) {
            return;
        }
        self.warn_if_iterating_avatars("insert");
        self.avatars.push(AvatarEntry { id, position });
    }

    fn untrack_avatar(&mut self, id: EntityId) {
        if let Some(index) = self.avatars.iter().position(|avatar| avatar.id == id) {
            self.warn_if_iterating_avatars("remove");
            self.avatars.swap_remove(index);
        }
    }

    fn warn_if_iterating_avatars(&self, operation: &str) {
        let count = self.avatar_iterator_count.get();
        if count != 0 {
            log::warn!("Avatar list {operation} while {count} iterator(s) are in flight");
        }
    }

    /// Iterate entities whose AABB touches `volume` in the trees `context`
    /// selects.
    ///
    /// Trees are visited primary first, then player-restricted, then
    /// not-affected-by-powers, each drained before the next.
    pub fn iterate_elements_in_volume<V: QueryVolume + Copy>(
        &self,
        volume: V,
        context: PartitionContext,
    ) -> PartitionIter<'_, V> {
        let mut pending = self.partition_pool.acquire();

        // Pushed in reverse visiting order
        if context.flags.contains(PartitionContextFlags::NOT_AFFECTED_BY_POWERS) {
            pending.push(PartitionId::NotAffectedByPowers);
        }
        if context.flags.contains(PartitionContextFlags::PLAYER_RESTRICTED) {
            pending.extend(self.player_restricted.keys().rev().map(|guid| PartitionId::PlayerRestricted(*guid)));
        } else if let Some(guid) = context.player_restricted_guid {
            if self.player_restricted.contains_key(&guid) {
                pending.push(PartitionId::PlayerRestricted(guid));
            }
        }
        if context.flags.contains(PartitionContextFlags::PRIMARY) {
            pending.push(PartitionId::Primary);
        }

        PartitionIter {
            partition: self,
            volume,
            pending,
            current: None,
        }
    }

    /// Collect matching entities into `out`, returning how many were added
    pub fn get_elements_in_volume<V: QueryVolume + Copy>(
        &self,
        out: &mut Vec<EntityId>,
        volume: V,
        context: PartitionContext,
    ) -> usize {
        let before = out.len();
        out.extend(self.iterate_elements_in_volume(volume, context));
        out.len() - before
    }

    /// Iterate avatars whose position lies inside `sphere`
    pub fn iterate_avatars_in_volume(&self, sphere: Sphere) -> AvatarIter<'_> {
        self.avatar_iterator_count.set(self.avatar_iterator_count.get() + 1);
        AvatarIter {
            partition: self,
            sphere,
            index: 0,
        }
    }

    /// True if an avatar standing at `position` is inside `sphere`
    pub fn does_sphere_contain_avatar(sphere: &Sphere, position: &Vec3) -> bool {
        sphere.contains_point(position)
    }
}

/// Lazy iterator over several partition trees
pub struct PartitionIter<'a, V: QueryVolume + Copy> {
    partition: &'a EntityRegionSpatialPartition,
    volume: V,
    pending: PooledVec<'a, PartitionId>,
    current: Option<ElementIter<'a, EntityId, V>>,
}

impl<V: QueryVolume + Copy> Iterator for PartitionIter<'_, V> {
    type Item = EntityId;

    fn next(&mut self) -> Option<EntityId> {
        loop {
            if let Some(iter) = self.current.as_mut() {
                if let Some(id) = iter.next() {
                    return Some(id);
                }
                self.current = None;
            }
            let next = self.pending.pop()?;
            let partition = self.partition;
            let volume = self.volume;
            self.current = partition.tree(next).map(|tree| tree.iterate_elements_in_volume(volume));
        }
    }
}

/// Lazy iterator over avatars inside a sphere
pub struct AvatarIter<'a> {
    partition: &'a EntityRegionSpatialPartition,
    sphere: Sphere,
    index: usize,
}

impl Iterator for AvatarIter<'_> {
    type Item = EntityId;

    fn next(&mut self) -> Option<EntityId> {
        while let Some(avatar) = self.partition.avatars.get(self.index) {
            self.index += 1;
            if EntityRegionSpatialPartition::does_sphere_contain_avatar(&self.sphere, &avatar.position) {
                return Some(avatar.id);
            }
        }
        None
    }
}

impl Drop for AvatarIter<'_> {
    fn drop(&mut self) {
        let count = self.partition.avatar_iterator_count.get();
        self.partition.avatar_iterator_count.set(count.saturating_sub(1));
    }
}
