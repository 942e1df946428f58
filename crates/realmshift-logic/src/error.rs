//! Error taxonomy for the realm core.
//!
//! Configuration errors are fatal to the operation that hit them and leave
//! the state machine in its last idle state. Missing collaborators are never
//! fatal: the optional effect is skipped and the transition carries on.
//! Requests dropped while a transition is in flight are not errors at all,
//! see [`crate::dimension::SwitchOutcome::Ignored`].

use thiserror::Error;

use crate::realm::RealmId;

/// Level setup problem. Not retried.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigurationError {
    /// A realm root container was never assigned.
    #[error("{0} container is not assigned")]
    MissingRealmContainer(RealmId),
    /// The dissolve shader parameter name is empty.
    #[error("dissolve parameter name is empty")]
    MissingDissolveParameter,
    /// A duration constant is negative or not finite.
    #[error("{field} must be a finite, non-negative number of seconds (got {value})")]
    InvalidDuration { field: &'static str, value: f32 },
}

/// An optional collaborator that was not wired in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum CollaboratorError {
    #[error("no respawn handler attached")]
    MissingRespawn,
    #[error("no audio sink attached")]
    MissingAudio,
}

/// Audio playback failure reported by the engine. Always swallowed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("audio clip '{clip}' could not be played: {reason}")]
pub struct AudioError {
    pub clip: String,
    pub reason: String,
}
