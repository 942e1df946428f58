//! Interactables driven by the player's interact button.
//!
//! Every interactable implements [`Activatable`]; the player only keeps the
//! id of the one currently in range and never needs to know its concrete
//! type.
//!
//! ```
//! use realmshift_logic::interact::{Activatable, Activation, Actor, Door};
//! use realmshift_logic::keys::KeyRing;
//!
//! let mut keys = KeyRing { light: 1, dark: 0 };
//! let mut door = Door::new(1, 0);
//! let mut actor = Actor::new(&mut keys);
//! assert_eq!(door.activate(&mut actor), Activation::Activated);
//! assert_eq!(door.activate(&mut actor), Activation::Spent);
//! ```

use crate::collaborators::RespawnReason;
use crate::keys::KeyRing;

/// Index of an interactable in the level's pool.
pub type InteractableId = usize;

/// Sound cue requested by an interaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Cue {
    DoorOpen,
    DoorLocked,
    SwitchOn,
    SpikesUp,
    SpikesDown,
}

impl Cue {
    pub fn clip(self) -> &'static str {
        match self {
            Cue::DoorOpen => "door_open",
            Cue::DoorLocked => "door_locked",
            Cue::SwitchOn => "switch_on",
            Cue::SpikesUp => "spikes_up",
            Cue::SpikesDown => "spikes_down",
        }
    }
}

/// The player as seen by an interactable.
pub struct Actor<'a> {
    pub keys: &'a mut KeyRing,
    pub cues: Vec<Cue>,
}

impl<'a> Actor<'a> {
    pub fn new(keys: &'a mut KeyRing) -> Self {
        Self {
            keys,
            cues: Vec::new(),
        }
    }
}

/// Result of activating something.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Activation {
    /// The interactable did its thing.
    Activated,
    /// Requirements not met; nothing changed.
    Refused,
    /// Already used up; nothing changed.
    Spent,
}

/// Capability shared by every interactable.
pub trait Activatable {
    fn activate(&mut self, actor: &mut Actor) -> Activation;

    /// Whether the player should still be able to target this.
    fn is_available(&self) -> bool {
        true
    }
}

/// A door that opens once for enough keys of each realm.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Door {
    pub light_needed: u32,
    pub dark_needed: u32,
    open: bool,
}

impl Door {
    pub fn new(light_needed: u32, dark_needed: u32) -> Self {
        Self {
            light_needed,
            dark_needed,
            open: false,
        }
    }

    pub fn is_open(&self) -> bool {
        self.open
    }
}

impl Activatable for Door {
    fn activate(&mut self, actor: &mut Actor) -> Activation {
        if self.open {
            return Activation::Spent;
        }
        if !actor.keys.spend(self.light_needed, self.dark_needed) {
            log::info!(
                "Door is locked. Requires: {} Light, {} Dark",
                self.light_needed,
                self.dark_needed
            );
            actor.cues.push(Cue::DoorLocked);
            return Activation::Refused;
        }
        self.open = true;
        actor.cues.push(Cue::DoorOpen);
        Activation::Activated
    }

    fn is_available(&self) -> bool {
        !self.open
    }
}

/// A one-shot switch, e.g. starting a moving platform.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Switch {
    activated: bool,
}

impl Switch {
    pub fn is_activated(&self) -> bool {
        self.activated
    }
}

impl Activatable for Switch {
    fn activate(&mut self, actor: &mut Actor) -> Activation {
        if self.activated {
            return Activation::Spent;
        }
        self.activated = true;
        actor.cues.push(Cue::SwitchOn);
        Activation::Activated
    }
}

/// Spikes that can be raised and lowered. Lethal while raised.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpikeTrap {
    up: bool,
}

impl SpikeTrap {
    pub fn new(up: bool) -> Self {
        Self { up }
    }

    pub fn is_lethal(&self) -> bool {
        self.up
    }

    pub fn toggle(&mut self) -> Cue {
        self.up = !self.up;
        log::debug!("Spike state changed. Spikes up? {}", self.up);
        if self.up {
            Cue::SpikesUp
        } else {
            Cue::SpikesDown
        }
    }

    /// Player touched the trap; a respawn is due if the spikes are up.
    pub fn contact(&self) -> Option<RespawnReason> {
        self.up.then_some(RespawnReason::Hazard)
    }
}

impl Activatable for SpikeTrap {
    fn activate(&mut self, actor: &mut Actor) -> Activation {
        let cue = self.toggle();
        actor.cues.push(cue);
        Activation::Activated
    }
}

/// Floor plate wired to spike traps; toggles all of them when released.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PressurePlate {
    pub traps: Vec<usize>,
    pressed: bool,
}

impl PressurePlate {
    pub fn new(traps: Vec<usize>) -> Self {
        Self {
            traps,
            pressed: false,
        }
    }

    pub fn is_pressed(&self) -> bool {
        self.pressed
    }

    pub fn press(&mut self) {
        self.pressed = true;
    }

    /// Step off the plate. Unknown trap indices are skipped.
    pub fn release(&mut self, traps: &mut [SpikeTrap]) {
        if !self.pressed {
            return;
        }
        self.pressed = false;
        for &index in &self.traps {
            if let Some(trap) = traps.get_mut(index) {
                trap.toggle();
            }
        }
    }
}

/// The player's current interaction target.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Interactor {
    current: Option<InteractableId>,
}

impl Interactor {
    pub fn current(&self) -> Option<InteractableId> {
        self.current
    }

    pub fn set_target(&mut self, id: InteractableId) {
        self.current = Some(id);
    }

    /// Clear the target only if it is still `id`.
    pub fn clear_target(&mut self, id: InteractableId) {
        if self.current == Some(id) {
            self.current = None;
        }
    }

    /// Activate the current target. Targets that become unavailable are
    /// cleared.
    pub fn interact(
        &mut self,
        pool: &mut [Box<dyn Activatable>],
        actor: &mut Actor,
    ) -> Option<Activation> {
        let id = self.current?;
        let target = pool.get_mut(id)?;
        let result = target.activate(actor);
        if !target.is_available() {
            self.current = None;
        }
        Some(result)
    }
}
