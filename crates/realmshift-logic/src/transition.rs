//! Resumable cross-fade state.
//!
//! A transition is a fixed-duration linear interpolation advanced once per
//! frame by the caller. Cancelling is replacing the value with `Idle`.

use serde::{Deserialize, Serialize};

use crate::realm::RealmId;

/// Elapsed time within this many seconds of the duration counts as done.
/// Summing frame deltas drifts below the exact duration.
pub const COMPLETION_EPSILON: f32 = 1e-4;

/// The single in-flight transition, if any.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub enum TransitionState {
    #[default]
    Idle,
    Transitioning {
        from: RealmId,
        to: RealmId,
        elapsed: f32,
        duration: f32,
        /// Set once the first frame has been driven.
        started: bool,
    },
}

/// One frame's worth of transition output.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TransitionFrame {
    pub from: RealmId,
    pub to: RealmId,
    /// Normalized progress, exactly 1.0 when `finished`.
    pub progress: f32,
    /// This is the first frame of the transition.
    pub first: bool,
    /// The transition completed on this frame; the state is `Idle` again.
    pub finished: bool,
}

impl TransitionState {
    pub fn begin(from: RealmId, to: RealmId, duration: f32) -> Self {
        TransitionState::Transitioning {
            from,
            to,
            elapsed: 0.0,
            duration: duration.max(0.0),
            started: false,
        }
    }

    pub fn is_transitioning(&self) -> bool {
        matches!(self, TransitionState::Transitioning { .. })
    }

    /// Realm being faded in.
    pub fn destination(&self) -> Option<RealmId> {
        match *self {
            TransitionState::Transitioning { to, .. } => Some(to),
            TransitionState::Idle => None,
        }
    }

    /// Realm being faded out.
    pub fn origin(&self) -> Option<RealmId> {
        match *self {
            TransitionState::Transitioning { from, .. } => Some(from),
            TransitionState::Idle => None,
        }
    }

    pub fn progress(&self) -> Option<f32> {
        match *self {
            TransitionState::Transitioning {
                elapsed, duration, ..
            } => Some(normalized(elapsed, duration)),
            TransitionState::Idle => None,
        }
    }

    /// Advance by one frame delta. Returns `None` while idle.
    ///
    /// The frame's delta counts before progress is sampled, so the first
    /// frame already reports `dt / duration` rather than 0. This keeps a
    /// transition of `duration` seconds finishing after exactly
    /// `duration / dt` frames, with the final frame writing 1.0.
    pub fn advance(&mut self, dt: f32) -> Option<TransitionFrame> {
        let TransitionState::Transitioning {
            from,
            to,
            elapsed,
            duration,
            started,
        } = self
        else {
            return None;
        };

        let first = !*started;
        *started = true;
        *elapsed += dt.max(0.0);

        let finished = *duration <= 0.0 || *elapsed >= *duration - COMPLETION_EPSILON;
        let frame = TransitionFrame {
            from: *from,
            to: *to,
            progress: if finished {
                1.0
            } else {
                normalized(*elapsed, *duration)
            },
            first,
            finished,
        };

        if finished {
            *self = TransitionState::Idle;
        }
        Some(frame)
    }
}

fn normalized(elapsed: f32, duration: f32) -> f32 {
    if duration <= 0.0 {
        1.0
    } else {
        (elapsed / duration).clamp(0.0, 1.0)
    }
}
