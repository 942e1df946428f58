//! Per-realm platform registry and the shard's proximity glow.
//!
//! The registry is a read-only list of platform positions for each realm,
//! filled at level start. The player's shard glows brighter while a platform
//! of the *other* realm is within reach, hinting that a switch would land the
//! player on solid ground.
//!
//! ```
//! use realmshift_logic::platforms::{PlatformPoint, PlatformRegistry, ShardGlow};
//! use realmshift_logic::realm::RealmId;
//!
//! let registry = PlatformRegistry::new(
//!     vec![PlatformPoint::new(0.0, 0.0, 0.0)],
//!     vec![PlatformPoint::new(1.0, 0.0, 0.0)],
//! );
//! let glow = ShardGlow::default();
//! let player = PlatformPoint::new(0.0, 0.0, 0.0);
//! assert!(glow.has_nearby(player, &registry, RealmId::Light));
//! ```

use serde::{Deserialize, Serialize};

use crate::realm::RealmId;

/// A world-space position.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct PlatformPoint {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl PlatformPoint {
    pub fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    pub fn distance_sq(&self, other: &PlatformPoint) -> f32 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        let dz = self.z - other.z;
        dx * dx + dy * dy + dz * dz
    }

    pub fn distance(&self, other: &PlatformPoint) -> f32 {
        self.distance_sq(other).sqrt()
    }
}

/// Static platform positions for both realms.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PlatformRegistry {
    light: Vec<PlatformPoint>,
    dark: Vec<PlatformPoint>,
}

impl PlatformRegistry {
    pub fn new(light: Vec<PlatformPoint>, dark: Vec<PlatformPoint>) -> Self {
        Self { light, dark }
    }

    pub fn platforms(&self, realm: RealmId) -> &[PlatformPoint] {
        match realm {
            RealmId::Light => &self.light,
            RealmId::Dark => &self.dark,
        }
    }

    /// Platforms of the realm that is *not* `active`.
    pub fn opposite_of(&self, active: RealmId) -> &[PlatformPoint] {
        self.platforms(active.opposite())
    }

    /// Any platform of `realm` within `radius` of `point` (inclusive).
    pub fn any_within(&self, realm: RealmId, point: PlatformPoint, radius: f32) -> bool {
        let r2 = radius * radius;
        self.platforms(realm)
            .iter()
            .any(|p| p.distance_sq(&point) <= r2)
    }
}

/// Shard emission tuning.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ShardGlow {
    /// Detection radius in world units.
    pub radius: f32,
    pub base_intensity: f32,
    pub glowing_intensity: f32,
}

impl Default for ShardGlow {
    fn default() -> Self {
        Self {
            radius: 2.0,
            base_intensity: 10.0,
            glowing_intensity: 50.0,
        }
    }
}

impl ShardGlow {
    /// Whether an opposite-realm platform is within reach of the player.
    pub fn has_nearby(
        &self,
        player: PlatformPoint,
        registry: &PlatformRegistry,
        active: RealmId,
    ) -> bool {
        registry.any_within(active.opposite(), player, self.radius)
    }

    /// Emission intensity for this frame.
    pub fn intensity(
        &self,
        player: PlatformPoint,
        registry: &PlatformRegistry,
        active: RealmId,
    ) -> f32 {
        if self.has_nearby(player, registry, active) {
            self.glowing_intensity
        } else {
            self.base_intensity
        }
    }
}
