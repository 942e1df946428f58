//! In-memory stand-ins for the engine and player, plus a level wrapper that
//! drives a [`DimensionMachine`] with synthetic frames.

use std::collections::HashMap;

use realmshift_logic::activation::{ActivationStore, ContainerId, ContainerSwitch};
use realmshift_logic::collaborators::{AudioSink, FrameContext, RespawnHandler, RespawnReason};
use realmshift_logic::config::LevelConfig;
use realmshift_logic::dimension::{DimensionMachine, TickReport};
use realmshift_logic::dissolve::{DissolveSet, DissolveTarget, SurfaceId, SurfaceWriter};
use realmshift_logic::error::AudioError;
use realmshift_logic::realm::RealmId;

pub const LIGHT_ROOT: ContainerId = 1;
pub const DARK_ROOT: ContainerId = 2;
pub const LIGHT_SURFACES: [SurfaceId; 6] = [10, 11, 12, 13, 14, 15];
pub const DARK_SURFACES: [SurfaceId; 4] = [20, 21, 22, 23];

/// Records every parameter write and container switch.
#[derive(Default)]
pub struct SimScene {
    pub values: HashMap<SurfaceId, f32>,
    pub active: HashMap<ContainerId, bool>,
    pub writes: usize,
}

impl SurfaceWriter for SimScene {
    fn write_scalar(&mut self, target: &DissolveTarget, value: f32) {
        self.values.insert(target.surface, value);
        self.writes += 1;
    }
}

impl ContainerSwitch for SimScene {
    fn set_container_active(&mut self, container: ContainerId, active: bool) {
        self.active.insert(container, active);
    }
}

impl SimScene {
    pub fn value(&self, surface: SurfaceId) -> Option<f32> {
        self.values.get(&surface).copied()
    }

    pub fn is_active(&self, container: ContainerId) -> bool {
        self.active.get(&container).copied().unwrap_or(false)
    }
}

#[derive(Default)]
pub struct SimPlayer {
    pub respawns: Vec<RespawnReason>,
    pub died_in: Option<RealmId>,
}

impl RespawnHandler for SimPlayer {
    fn respawn(&mut self, reason: RespawnReason) {
        self.respawns.push(reason);
    }

    fn death_realm(&self) -> Option<RealmId> {
        self.died_in
    }
}

#[derive(Default)]
pub struct SimSpeaker {
    pub played: Vec<String>,
}

impl AudioSink for SimSpeaker {
    fn play_one_shot(&mut self, clip: &str) -> Result<(), AudioError> {
        self.played.push(clip.to_string());
        Ok(())
    }
}

/// One loaded level with all collaborators attached.
pub struct SimLevel {
    pub machine: DimensionMachine,
    pub scene: SimScene,
    pub player: SimPlayer,
    pub speaker: SimSpeaker,
}

impl SimLevel {
    pub fn new(config: &LevelConfig) -> Self {
        let parameter = config.dissolve_parameter.clone();
        Self {
            machine: DimensionMachine::new(
                config.clone(),
                ActivationStore::new(Some(LIGHT_ROOT), Some(DARK_ROOT)),
                DissolveSet::cache(LIGHT_SURFACES, &parameter),
                DissolveSet::cache(DARK_SURFACES, &parameter),
            ),
            scene: SimScene::default(),
            player: SimPlayer::default(),
            speaker: SimSpeaker::default(),
        }
    }

    /// Level with the start routine already applied.
    pub fn started(config: &LevelConfig) -> Self {
        let mut level = Self::new(config);
        let mut ctx = FrameContext::new(&mut level.scene);
        if let Err(e) = level.machine.initialize(&mut ctx) {
            log::error!("level start failed: {}", e);
        }
        level
    }

    pub fn tick(&mut self, dt: f32) -> TickReport {
        let mut ctx = FrameContext::new(&mut self.scene)
            .with_respawn(&mut self.player)
            .with_audio(&mut self.speaker);
        self.machine.tick(dt, &mut ctx)
    }

    pub fn run(&mut self, frames: usize, dt: f32) {
        for _ in 0..frames {
            self.tick(dt);
        }
    }

    /// Tick until idle, giving up after `limit` frames.
    pub fn settle(&mut self, dt: f32, limit: usize) -> bool {
        for _ in 0..limit {
            if !self.machine.is_transitioning() {
                return true;
            }
            self.tick(dt);
        }
        !self.machine.is_transitioning()
    }

    pub fn surfaces(realm: RealmId) -> &'static [SurfaceId] {
        match realm {
            RealmId::Light => &LIGHT_SURFACES,
            RealmId::Dark => &DARK_SURFACES,
        }
    }

    pub fn root(realm: RealmId) -> ContainerId {
        match realm {
            RealmId::Light => LIGHT_ROOT,
            RealmId::Dark => DARK_ROOT,
        }
    }

    /// Dissolve value of the first surface of a realm.
    pub fn sample(&self, realm: RealmId) -> Option<f32> {
        self.scene.value(Self::surfaces(realm)[0])
    }

    /// Settled realm shown, other hidden, containers matching.
    pub fn is_settled_cleanly(&self) -> bool {
        let active = self.machine.active_realm();
        let hidden = active.opposite();
        Self::surfaces(active)
            .iter()
            .all(|s| self.scene.value(*s) == Some(0.0))
            && Self::surfaces(hidden)
                .iter()
                .all(|s| self.scene.value(*s) == Some(1.0))
            && self.scene.is_active(Self::root(active))
            && !self.scene.is_active(Self::root(hidden))
    }
}
