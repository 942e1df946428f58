//! Boundary with the engine and the rest of the gameplay layer.
//!
//! The realm core never looks anything up by itself. Everything it needs for
//! one call is handed in through a [`FrameContext`]: the scene (mandatory) and
//! the respawn and audio collaborators (optional, skipped when absent).

use crate::activation::ContainerSwitch;
use crate::dissolve::SurfaceWriter;
use crate::error::{AudioError, CollaboratorError};
use crate::realm::RealmId;

/// Engine scene: dissolve parameters plus container activation.
pub trait RealmScene {
    fn surfaces(&mut self) -> &mut dyn SurfaceWriter;
    fn containers(&mut self) -> &mut dyn ContainerSwitch;
}

impl<T: SurfaceWriter + ContainerSwitch> RealmScene for T {
    fn surfaces(&mut self) -> &mut dyn SurfaceWriter {
        self
    }

    fn containers(&mut self) -> &mut dyn ContainerSwitch {
        self
    }
}

/// Why the player is being sent back to the spawn point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RespawnReason {
    /// The dark-realm survival timer ran out.
    TimeExpired,
    /// Fell out of the level.
    Fell,
    /// Touched a lethal trap.
    Hazard,
    /// Caught by an enemy.
    Enemy,
}

/// Player side: relocation to spawn and where the player died.
pub trait RespawnHandler {
    fn respawn(&mut self, reason: RespawnReason);

    /// Realm the player was in at the moment of death, if known.
    fn death_realm(&self) -> Option<RealmId>;
}

/// Fire-and-forget sound playback.
pub trait AudioSink {
    fn play_one_shot(&mut self, clip: &str) -> Result<(), AudioError>;
}

/// Collaborators available to one call into the realm core.
pub struct FrameContext<'a> {
    pub scene: &'a mut dyn RealmScene,
    pub respawn: Option<&'a mut dyn RespawnHandler>,
    pub audio: Option<&'a mut dyn AudioSink>,
}

impl<'a> FrameContext<'a> {
    pub fn new(scene: &'a mut dyn RealmScene) -> Self {
        Self {
            scene,
            respawn: None,
            audio: None,
        }
    }

    pub fn with_respawn(mut self, respawn: &'a mut dyn RespawnHandler) -> Self {
        self.respawn = Some(respawn);
        self
    }

    pub fn with_audio(mut self, audio: &'a mut dyn AudioSink) -> Self {
        self.audio = Some(audio);
        self
    }

    /// Play a clip if both the clip and the sink exist. Failures are swallowed.
    pub fn play(&mut self, clip: Option<&str>) {
        let Some(clip) = clip else {
            return;
        };
        let Some(audio) = self.audio.as_deref_mut() else {
            log::warn!("{}, skipping '{}'", CollaboratorError::MissingAudio, clip);
            return;
        };
        if let Err(e) = audio.play_one_shot(clip) {
            log::warn!("{}", e);
        }
    }

    /// Ask the player collaborator to respawn.
    pub fn request_respawn(&mut self, reason: RespawnReason) -> Result<(), CollaboratorError> {
        let respawn = self
            .respawn
            .as_deref_mut()
            .ok_or(CollaboratorError::MissingRespawn)?;
        log::info!("Respawning player ({:?})", reason);
        respawn.respawn(reason);
        Ok(())
    }

    /// Realm the player died in, if a respawn handler is attached and knows.
    pub fn death_realm(&self) -> Option<RealmId> {
        self.respawn.as_deref().and_then(|r| r.death_realm())
    }
}
