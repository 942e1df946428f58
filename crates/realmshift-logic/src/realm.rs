//! The two mutually-exclusive world states.
//!
//! Every level has a Light and a Dark realm, each with its own geometry.
//! Exactly one of them is active whenever no transition is in flight.

use serde::{Deserialize, Serialize};

/// Identifies one of the two realms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum RealmId {
    /// The starting realm of every level.
    #[default]
    Light,
    /// The hostile realm, guarded by the survival timer.
    Dark,
}

impl RealmId {
    /// Both realms, Light first.
    pub fn all() -> [RealmId; 2] {
        [RealmId::Light, RealmId::Dark]
    }

    /// The other realm.
    pub fn opposite(self) -> Self {
        match self {
            RealmId::Light => RealmId::Dark,
            RealmId::Dark => RealmId::Light,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            RealmId::Light => "Light Realm",
            RealmId::Dark => "Dark Realm",
        }
    }
}

impl std::fmt::Display for RealmId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}
