//! Collision layers of the level
//!
//! A layer is a bit index shared with [`LayerMask`], so the grab session's
//! masks select exactly the colliders spawned on those layers.

use liminal_grab::LayerMask;
use rapier3d::prelude as rapier;
use serde::{Deserialize, Serialize};

/// Bit index of a collision layer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct CollisionLayer(pub u32);

impl CollisionLayer {
    pub const DEFAULT: Self = Self(0);
    /// Player capsule
    pub const PLAYER: Self = Self(1);
    /// Walls and floors
    pub const ENVIRONMENT: Self = Self(2);
    /// Props the player can pick up
    pub const GRABBABLE: Self = Self(3);
    /// Pressure plate sensors
    pub const TRIGGERS: Self = Self(4);
    pub const DOORS: Self = Self(5);

    /// Single-bit mask
    pub fn as_mask(&self) -> u32 {
        1 << self.0
    }

    /// Grab-side mask selecting only this layer
    pub fn query_mask(&self) -> LayerMask {
        LayerMask::layer(self.0)
    }
}

/// Membership and filter bits of a collider
///
/// Two colliders interact when each one's membership is accepted by the
/// other's filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollisionGroups {
    pub memberships: u32,
    pub filter: u32,
}

impl CollisionGroups {
    /// Member of every layer, accepts every layer
    pub const ALL: Self = Self {
        memberships: u32::MAX,
        filter: u32::MAX,
    };

    /// On `layer`, interacting with everything
    pub fn layer(layer: CollisionLayer) -> Self {
        Self {
            memberships: layer.as_mask(),
            filter: u32::MAX,
        }
    }

    /// On `layer`, ignoring the layers in `ignored`
    pub fn layer_ignoring(layer: CollisionLayer, ignored: &[CollisionLayer]) -> Self {
        let filter = ignored.iter().fold(u32::MAX, |acc, l| acc & !l.as_mask());
        Self {
            memberships: layer.as_mask(),
            filter,
        }
    }

    /// Groups of a scene query: accepted by every collider, sees only `mask`
    pub fn query(mask: LayerMask) -> Self {
        Self {
            memberships: u32::MAX,
            filter: mask.0,
        }
    }

    /// Whether colliders with these groups interact
    pub fn interacts_with(&self, other: &CollisionGroups) -> bool {
        self.memberships & other.filter != 0 && other.memberships & self.filter != 0
    }

    pub(crate) fn to_rapier(self) -> rapier::InteractionGroups {
        rapier::InteractionGroups::new(
            rapier::Group::from_bits_truncate(self.memberships),
            rapier::Group::from_bits_truncate(self.filter),
        )
    }
}

impl Default for CollisionGroups {
    fn default() -> Self {
        Self::ALL
    }
}
