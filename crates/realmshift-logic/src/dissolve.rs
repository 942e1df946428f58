//! Material dissolve driver.
//!
//! Each realm's renderable surfaces expose a scalar shader parameter where
//! 0.0 means fully shown and 1.0 means fully hidden. The driver holds no
//! timing state: the caller supplies a progress value and the driver writes
//! it through the engine's [`SurfaceWriter`].
//!
//! ```
//! use realmshift_logic::dissolve::{transition_values, DissolveSet};
//!
//! let set = DissolveSet::cache([1, 2, 3], "_Dissolve");
//! assert_eq!(set.len(), 3);
//! assert_eq!(transition_values(0.25), (0.25, 0.75));
//! ```

/// Engine handle for one material instance on a renderer.
pub type SurfaceId = u32;

/// A surface plus the name of the dissolve scalar it exposes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DissolveTarget {
    pub surface: SurfaceId,
    pub parameter: String,
}

/// Engine side of the driver: sets a scalar shader parameter.
pub trait SurfaceWriter {
    fn write_scalar(&mut self, target: &DissolveTarget, value: f32);
}

/// Dissolve value for a fully shown surface.
pub const SHOWN: f32 = 0.0;

/// Dissolve value for a fully hidden surface.
pub const HIDDEN: f32 = 1.0;

/// All dissolve targets of one realm, cached once at level start.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DissolveSet {
    targets: Vec<DissolveTarget>,
}

impl DissolveSet {
    /// A realm with no dissolve-capable surfaces.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Collect every surface of a realm under a shared parameter name.
    pub fn cache(surfaces: impl IntoIterator<Item = SurfaceId>, parameter: &str) -> Self {
        Self {
            targets: surfaces
                .into_iter()
                .map(|surface| DissolveTarget {
                    surface,
                    parameter: parameter.to_string(),
                })
                .collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.targets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &DissolveTarget> {
        self.targets.iter()
    }
}

/// Outgoing and incoming dissolve values for a normalized progress.
///
/// Linear, no easing: the outgoing realm goes 0 → 1 while the incoming realm
/// goes 1 → 0 using the same progress.
pub fn transition_values(progress: f32) -> (f32, f32) {
    let t = progress.clamp(0.0, 1.0);
    (t, HIDDEN - t)
}

/// Write one value to every target in the set. Empty sets are a no-op.
pub fn apply(set: &DissolveSet, value: f32, writer: &mut dyn SurfaceWriter) {
    let value = value.clamp(SHOWN, HIDDEN);
    for target in set.iter() {
        writer.write_scalar(target, value);
    }
}

/// Drive both sets in lockstep from one progress value.
pub fn cross_fade(
    outgoing: &DissolveSet,
    incoming: &DissolveSet,
    progress: f32,
    writer: &mut dyn SurfaceWriter,
) {
    let (out_value, in_value) = transition_values(progress);
    apply(outgoing, out_value, writer);
    apply(incoming, in_value, writer);
}
