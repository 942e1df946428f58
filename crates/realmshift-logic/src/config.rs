//! Level-authored constants for the realm core.
//!
//! Values are set per level by the designer and loaded once at level start.
//! Every field has a default so a level file only needs to list overrides.
//!
//! ```
//! use realmshift_logic::config::LevelConfig;
//!
//! let config = LevelConfig::default();
//! assert!(config.validate().is_empty());
//! assert_eq!(config.transition_duration, 0.5);
//! ```

use serde::{Deserialize, Serialize};

use crate::error::ConfigurationError;
use crate::realm::RealmId;

/// Default cross-fade length in seconds.
pub const DEFAULT_TRANSITION_DURATION: f32 = 0.5;

/// Default time the player may stay in the Dark realm, in seconds.
pub const DEFAULT_SURVIVAL_DURATION: f32 = 10.0;

/// Default shader parameter driven by the dissolve.
pub const DEFAULT_DISSOLVE_PARAMETER: &str = "_Dissolve";

/// Default one-shot clip played when a switch completes.
pub const DEFAULT_SWITCH_CLIP: &str = "realm_shift";

/// Per-level tuning for the dimension switch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LevelConfig {
    /// Seconds a realm cross-fade takes.
    pub transition_duration: f32,
    /// Name of the scalar parameter on every dissolve-capable material.
    pub dissolve_parameter: String,
    /// Seconds the player may remain in the Dark realm before being pulled out.
    pub survival_duration: f32,
    /// Realm that is active when the level starts.
    pub initial_realm: RealmId,
    /// Realm the player must be in after a respawn.
    pub home_realm: RealmId,
    /// Clip played on each completed switch (`None` = silent).
    pub switch_clip: Option<String>,
}

impl Default for LevelConfig {
    fn default() -> Self {
        Self {
            transition_duration: DEFAULT_TRANSITION_DURATION,
            dissolve_parameter: DEFAULT_DISSOLVE_PARAMETER.to_string(),
            survival_duration: DEFAULT_SURVIVAL_DURATION,
            initial_realm: RealmId::Light,
            home_realm: RealmId::Light,
            switch_clip: Some(DEFAULT_SWITCH_CLIP.to_string()),
        }
    }
}

impl LevelConfig {
    /// Validate the config, returning all errors found.
    pub fn validate(&self) -> Vec<ConfigurationError> {
        let mut errors = Vec::new();

        if !is_valid_duration(self.transition_duration) {
            errors.push(ConfigurationError::InvalidDuration {
                field: "transition_duration",
                value: self.transition_duration,
            });
        }
        if !is_valid_duration(self.survival_duration) {
            errors.push(ConfigurationError::InvalidDuration {
                field: "survival_duration",
                value: self.survival_duration,
            });
        }
        if self.dissolve_parameter.trim().is_empty() {
            errors.push(ConfigurationError::MissingDissolveParameter);
        }

        errors
    }
}

fn is_valid_duration(seconds: f32) -> bool {
    seconds.is_finite() && seconds >= 0.0
}
