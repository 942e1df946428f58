//! Light and Dark keys carried by the player.

use serde::{Deserialize, Serialize};

use crate::realm::RealmId;

/// Keys collected so far, counted per realm.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct KeyRing {
    pub light: u32,
    pub dark: u32,
}

impl KeyRing {
    pub fn add(&mut self, realm: RealmId) {
        match realm {
            RealmId::Light => self.light += 1,
            RealmId::Dark => self.dark += 1,
        }
        log::info!("Collected {:?} key. Light: {}, Dark: {}", realm, self.light, self.dark);
    }

    pub fn count(&self, realm: RealmId) -> u32 {
        match realm {
            RealmId::Light => self.light,
            RealmId::Dark => self.dark,
        }
    }

    pub fn has(&self, light: u32, dark: u32) -> bool {
        self.light >= light && self.dark >= dark
    }

    /// Remove keys if the ring holds enough. Returns whether it did.
    pub fn spend(&mut self, light: u32, dark: u32) -> bool {
        if !self.has(light, dark) {
            return false;
        }
        self.light -= light;
        self.dark -= dark;
        true
    }
}
