//! Agent configuration.
//!
//! Everything here is plain data with serde support so a run can be described
//! in a JSON file. [`TrainingConfig`] is the only part mutated during a run,
//! and only at episode boundaries.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::RlError;

/// Lowest walking speed a target can be set to.
pub const MIN_WALKING_SPEED: f32 = 0.1;

/// Stall threshold used when none is configured.
pub const DEFAULT_MAX_STEPS_WITHOUT_PROGRESS: u32 = 200;

/// The behavioural objective of an agent. Fixed for the agent's lifetime.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    /// Move toward the target at the target speed.
    #[default]
    Walk,
    /// Get upright from an arbitrary orientation.
    Getup,
    /// Make steady progress toward an elevated target.
    Climb,
}

impl std::str::FromStr for Mode {
    type Err = RlError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "walk" => Ok(Mode::Walk),
            "getup" | "get-up" => Ok(Mode::Getup),
            "climb" => Ok(Mode::Climb),
            other => Err(RlError::InvalidConfig(format!("unknown mode {other}"))),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrainingConfig {
    /// Speed the agent should move toward the target at, in m/s.
    target_speed: f32,
    /// Upper bound of `target_speed`.
    pub max_speed: f32,
    /// Resample `target_speed` at every episode start.
    pub randomize_speed: bool,
    /// Randomize the root's yaw at every episode start.
    pub randomize_yaw: bool,
    /// Randomize the root's full orientation at every episode start.
    pub randomize_rotation: bool,
}

impl Default for TrainingConfig {
    fn default() -> Self {
        Self {
            target_speed: 10.0,
            max_speed: 10.0,
            randomize_speed: true,
            randomize_yaw: true,
            randomize_rotation: false,
        }
    }
}

impl TrainingConfig {
    /// Defaults for a character with the given top speed, with orientation
    /// randomization chosen for `mode`.
    #[must_use]
    pub fn for_mode(mode: Mode, max_speed: f32) -> Self {
        let max_speed = max_speed.max(MIN_WALKING_SPEED);
        Self {
            target_speed: max_speed,
            max_speed,
            randomize_speed: true,
            randomize_yaw: mode != Mode::Getup,
            randomize_rotation: mode == Mode::Getup,
        }
    }

    #[must_use]
    pub fn target_speed(&self) -> f32 {
        self.target_speed.clamp(MIN_WALKING_SPEED, self.max_speed.max(MIN_WALKING_SPEED))
    }

    /// Sets the target speed, clamped to `[0.1, max_speed]`.
    pub fn set_target_speed(&mut self, speed: f32) {
        self.target_speed = speed.clamp(MIN_WALKING_SPEED, self.max_speed.max(MIN_WALKING_SPEED));
    }

    /// # Errors
    ///
    /// Returns [`RlError::InvalidConfig`] for a non-finite or too small top speed.
    pub fn validate(&self) -> Result<(), RlError> {
        if !self.max_speed.is_finite() || self.max_speed < MIN_WALKING_SPEED {
            return Err(RlError::InvalidConfig(format!(
                "max_speed must be at least {MIN_WALKING_SPEED}, got {}",
                self.max_speed
            )));
        }
        Ok(())
    }
}

/// Reactions to body parts touching tagged surfaces.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContactConfig {
    pub penalize_ground: bool,
    /// Reward added on ground contact, e.g. `-1.0`.
    pub ground_penalty: f32,
    pub end_on_ground: bool,
    pub penalize_stairs: bool,
    pub stairs_penalty: f32,
}

impl Default for ContactConfig {
    fn default() -> Self {
        Self {
            penalize_ground: false,
            ground_penalty: -1.0,
            end_on_ground: false,
            penalize_stairs: false,
            stairs_penalty: -1.0,
        }
    }
}

/// Per-part contact configuration; parts not listed use the agent default.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PartContactConfig {
    pub part: String,
    #[serde(flatten)]
    pub contact: ContactConfig,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AgentConfig {
    pub mode: Mode,
    pub training: TrainingConfig,
    pub contact: ContactConfig,
    pub part_contacts: Vec<PartContactConfig>,
    /// Climb only: ticks allowed without beating the closest distance.
    pub max_steps_without_progress: u32,
    /// Episode length cap applied by the environment; 0 disables it.
    pub max_steps: u32,
    pub seed: u64,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            mode: Mode::Walk,
            training: TrainingConfig::default(),
            contact: ContactConfig::default(),
            part_contacts: Vec::new(),
            max_steps_without_progress: DEFAULT_MAX_STEPS_WITHOUT_PROGRESS,
            max_steps: 0,
            seed: 0,
        }
    }
}

impl AgentConfig {
    #[must_use]
    pub fn new(mode: Mode, max_speed: f32) -> Self {
        Self {
            mode,
            training: TrainingConfig::for_mode(mode, max_speed),
            ..Self::default()
        }
    }

    /// # Errors
    ///
    /// Returns [`RlError::InvalidConfig`] if the JSON is malformed or invalid.
    pub fn from_json(json: &str) -> Result<Self, RlError> {
        let config: Self =
            serde_json::from_str(json).map_err(|e| RlError::InvalidConfig(e.to_string()))?;
        config.training.validate()?;
        Ok(config)
    }

    /// # Errors
    ///
    /// Returns [`RlError::InvalidConfig`] if the file cannot be read or parsed.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, RlError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)
            .map_err(|e| RlError::InvalidConfig(format!("{}: {e}", path.display())))?;
        Self::from_json(&json)
    }

    /// Contact configuration for one part.
    #[must_use]
    pub fn contact_for(&self, part: &str) -> &ContactConfig {
        self.part_contacts
            .iter()
            .find(|c| c.part == part)
            .map_or(&self.contact, |c| &c.contact)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn target_speed_is_clamped() {
        let mut training = TrainingConfig::for_mode(Mode::Walk, 10.0);
        training.set_target_speed(0.0);
        assert_relative_eq!(training.target_speed(), 0.1);
        training.set_target_speed(42.0);
        assert_relative_eq!(training.target_speed(), 10.0);
        training.set_target_speed(3.5);
        assert_relative_eq!(training.target_speed(), 3.5);
    }

    #[test]
    fn getup_randomizes_full_orientation() {
        let getup = TrainingConfig::for_mode(Mode::Getup, 10.0);
        assert!(getup.randomize_rotation);
        assert!(!getup.randomize_yaw);
        let walk = TrainingConfig::for_mode(Mode::Walk, 30.0);
        assert!(walk.randomize_yaw);
        assert!(!walk.randomize_rotation);
    }

    #[test]
    fn config_json_fills_defaults() {
        let config = AgentConfig::from_json(
            r#"{
                "mode": "climb",
                "training": { "max_speed": 30.0, "randomize_speed": false },
                "part_contacts": [{ "part": "head", "penalize_ground": true, "end_on_ground": true }]
            }"#,
        )
        .unwrap();
        assert_eq!(config.mode, Mode::Climb);
        assert_eq!(config.max_steps_without_progress, 200);
        assert!(!config.training.randomize_speed);
        assert!(config.contact_for("head").end_on_ground);
        assert!(!config.contact_for("left_foot").end_on_ground);
        assert_relative_eq!(config.contact_for("head").ground_penalty, -1.0);
    }

    #[test]
    fn invalid_max_speed_is_rejected() {
        let err = AgentConfig::from_json(r#"{ "training": { "max_speed": 0.0 } }"#).unwrap_err();
        assert!(matches!(err, RlError::InvalidConfig(_)));
    }

    #[test]
    fn modes_parse_from_cli_names() {
        assert_eq!("Climb".parse::<Mode>(), Ok(Mode::Climb));
        assert_eq!("get-up".parse::<Mode>(), Ok(Mode::Getup));
        assert!("swim".parse::<Mode>().is_err());
    }
}
