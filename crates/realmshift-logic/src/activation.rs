//! Realm activation store.
//!
//! Holds the two realm root containers and switches them on and off. An
//! inactive container is neither rendered nor simulated by the engine.

use crate::error::ConfigurationError;
use crate::realm::RealmId;

/// Engine handle for a realm's root object.
pub type ContainerId = u32;

/// Engine side of the store: enables or disables a container subtree.
pub trait ContainerSwitch {
    fn set_container_active(&mut self, container: ContainerId, active: bool);
}

/// Root containers for both realms and their last applied state.
#[derive(Debug, Clone, Default)]
pub struct ActivationStore {
    light: Option<ContainerId>,
    dark: Option<ContainerId>,
    light_active: bool,
    dark_active: bool,
}

impl ActivationStore {
    pub fn new(light: Option<ContainerId>, dark: Option<ContainerId>) -> Self {
        Self {
            light,
            dark,
            light_active: false,
            dark_active: false,
        }
    }

    pub fn container(&self, realm: RealmId) -> Option<ContainerId> {
        match realm {
            RealmId::Light => self.light,
            RealmId::Dark => self.dark,
        }
    }

    /// Both containers must be assigned before any switch.
    pub fn validate(&self) -> Result<(), ConfigurationError> {
        for realm in RealmId::all() {
            if self.container(realm).is_none() {
                return Err(ConfigurationError::MissingRealmContainer(realm));
            }
        }
        Ok(())
    }

    /// Last state written for a realm.
    pub fn is_active(&self, realm: RealmId) -> bool {
        match realm {
            RealmId::Light => self.light_active,
            RealmId::Dark => self.dark_active,
        }
    }

    /// Enable or disable one realm. Unassigned containers are skipped.
    pub fn set_active(&mut self, realm: RealmId, active: bool, engine: &mut dyn ContainerSwitch) {
        let Some(container) = self.container(realm) else {
            log::warn!("{} container missing, activation skipped", realm);
            return;
        };
        engine.set_container_active(container, active);
        match realm {
            RealmId::Light => self.light_active = active,
            RealmId::Dark => self.dark_active = active,
        }
    }

    /// Activate `active` and deactivate the other realm as one pair.
    pub fn apply_exclusive(
        &mut self,
        active: RealmId,
        engine: &mut dyn ContainerSwitch,
    ) -> Result<(), ConfigurationError> {
        self.validate()?;
        self.set_active(active, true, engine);
        self.set_active(active.opposite(), false, engine);
        Ok(())
    }
}
