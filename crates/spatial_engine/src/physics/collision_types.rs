//! Collision classification for bounds
//!
//! A bounds' collision type decides whether it stops movement, only reports
//! overlaps, or takes no part in collision at all.

use serde::{Deserialize, Serialize};

/// How a bounds takes part in collision
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum BoundsCollisionType {
    /// Never collides
    #[default]
    None,
    /// Stops other blocking bounds
    Blocking,
    /// Reports overlaps without stopping movement
    Overlapping,
}

/// Which movement powers a bounds stops
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum BoundsMovementPowerBlockType {
    /// Movement powers pass through
    #[default]
    None,
    /// Stops ground-based movement powers only
    Ground,
    /// Stops every movement power
    All,
}

bitflags::bitflags! {
    /// Extra per-bounds behavior
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct BoundsFlags: u32 {
        /// Picking must use the entity's mesh rather than its bounds
        const COMPLEX_PICKING_ONLY = 1 << 0;
    }
}

bitflags::bitflags! {
    /// Which movement checks a blocking test is performed for
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct BlockingCheckFlags: u32 {
        /// Spawn placement
        const CHECK_SPAWNS = 1 << 0;
        /// Movement powers that stay on the ground
        const CHECK_GROUND_MOVEMENT_POWERS = 1 << 1;
        /// Every movement power
        const CHECK_ALL_MOVEMENT_POWERS = 1 << 2;
        /// Landing after a jump or knockback
        const CHECK_LANDING = 1 << 3;
        /// The moving entity's own bounds
        const CHECK_SELF = 1 << 4;
    }
}

impl BlockingCheckFlags {
    /// True if any kind of movement power is being checked
    pub fn checks_movement_powers(self) -> bool {
        self.intersects(Self::CHECK_GROUND_MOVEMENT_POWERS | Self::CHECK_ALL_MOVEMENT_POWERS)
    }
}
