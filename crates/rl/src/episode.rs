//! # Episode Lifecycle
//!
//! [`EpisodeSignal`] is what a trainer reads back each tick: the reward
//! accumulated since it last looked and whether the episode is over.
//! [`EpisodeLifecycle`] prepares a fresh episode.

use std::f32::consts::TAU;

use glam::{EulerRot, Quat, Vec3};
use physics::{JointDriveController, OrientationFrame};
use tracing::debug;

use crate::config::{TrainingConfig, MIN_WALKING_SPEED};
use crate::error::RlError;
use crate::reward::RewardMode;

/// Why an episode ended.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Termination {
    /// Climb made no progress for too long.
    Stalled,
    GroundContact,
    ObstacleContact,
    /// The environment's step cap was reached.
    MaxSteps,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct EpisodeSignal {
    step_reward: f32,
    cumulative: f32,
    termination: Option<Termination>,
}

impl EpisodeSignal {
    /// Accumulates `reward` into both the pending step reward and the total.
    pub fn add_reward(&mut self, reward: f32) {
        self.step_reward += reward;
        self.cumulative += reward;
    }

    /// Ends the episode. Only the first call has an effect; returns whether
    /// this call was it.
    pub fn end_episode(&mut self, reason: Termination) -> bool {
        if self.termination.is_some() {
            return false;
        }
        self.termination = Some(reason);
        true
    }

    #[must_use]
    pub fn is_done(&self) -> bool {
        self.termination.is_some()
    }

    #[must_use]
    pub fn termination(&self) -> Option<Termination> {
        self.termination
    }

    #[must_use]
    pub fn cumulative_reward(&self) -> f32 {
        self.cumulative
    }

    /// Reward added since the previous call.
    pub fn take_step_reward(&mut self) -> f32 {
        std::mem::take(&mut self.step_reward)
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

/// Resets and re-randomizes one character at episode start.
pub struct EpisodeLifecycle;

impl EpisodeLifecycle {
    /// Returns the root-to-target distance after randomization.
    ///
    /// # Errors
    ///
    /// Fails if the root is missing from the registry.
    pub fn begin(
        registry: &mut JointDriveController,
        root: usize,
        frame: &mut OrientationFrame,
        target: Vec3,
        training: &mut TrainingConfig,
        reward: &mut RewardMode,
        rng: &mut fastrand::Rng,
    ) -> Result<f32, RlError> {
        registry.reset_all();
        let position = registry
            .get(root)
            .map(|part| part.body.position)
            .ok_or_else(|| RlError::MissingBodyPart(format!("#{root}")))?;
        frame.update(position, target);

        let turn = if training.randomize_rotation {
            Some(Quat::from_euler(
                EulerRot::YXZ,
                rng.f32() * TAU,
                rng.f32() * TAU,
                rng.f32() * TAU,
            ))
        } else if training.randomize_yaw {
            Some(Quat::from_rotation_y(rng.f32() * TAU))
        } else {
            None
        };
        if let Some(turn) = turn {
            registry.rotate_about(root, turn)?;
        }

        if training.randomize_speed {
            // rng.f32() is in [0, 1), so the result lands in (0.1, max].
            let max = training.max_speed;
            training.set_target_speed(max - rng.f32() * (max - MIN_WALKING_SPEED));
        }

        let distance = position.distance(target);
        reward.begin_episode(distance);
        debug!(
            target_speed = training.target_speed(),
            distance,
            mode = ?reward.mode(),
            "episode begin"
        );
        Ok(distance)
    }
}
