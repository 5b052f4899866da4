//! # Reward Shaping
//!
//! One strategy per [`Mode`], picked when the agent is built. Every strategy
//! answers the same question each tick: what is this tick's reward, and
//! should the episode end?
//!
//! Walk and Climb share two terms:
//!
//! - speed match, `(1 - (clamp(|v_avg - v_goal|, 0, s) / s)^2)^2`, which is 1
//!   at a perfect match and 0 once the error reaches the target speed `s`,
//! - heading, `(dot(frame forward, root forward) + 1) / 2`.
//!
//! Getup ignores the frame and scores absolute uprightness of the root.

use glam::Vec3;
use physics::{delta_angle, euler_degrees};

use crate::config::Mode;
use crate::error::RlError;
use crate::observation::TickContext;
use crate::progress::ProgressState;
use crate::schema::BodySchema;

/// Reward for matching the goal velocity.
#[must_use]
pub fn speed_match_reward(average_velocity: Vec3, goal_velocity: Vec3, target_speed: f32) -> f32 {
    if target_speed <= 0.0 {
        return 0.0;
    }
    let error = average_velocity.distance(goal_velocity).clamp(0.0, target_speed);
    (1.0 - (error / target_speed).powi(2)).powi(2)
}

/// Reward for facing the way the frame faces, in `[0, 1]`.
#[must_use]
pub fn heading_reward(frame_forward: Vec3, root_forward: Vec3) -> f32 {
    (frame_forward.dot(root_forward) + 1.0) * 0.5
}

/// Where `value` lies between `a` and `b`, clamped to `[0, 1]`.
#[must_use]
pub fn inverse_lerp(a: f32, b: f32, value: f32) -> f32 {
    if (b - a).abs() <= f32::EPSILON {
        return 0.0;
    }
    ((value - a) / (b - a)).clamp(0.0, 1.0)
}

/// 1 at zero degrees, falling quadratically to 0 at 180.
#[must_use]
pub fn delta_angle_reward(angle: f32) -> f32 {
    (1.0 - inverse_lerp(0.0, 180.0, delta_angle(0.0, angle).abs())).powi(2)
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct RewardOutcome {
    pub reward: f32,
    pub terminate: bool,
}

/// Climb strategy state.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ClimbReward {
    pub progress: ProgressState,
    pub max_steps_without_progress: u32,
}

impl ClimbReward {
    #[must_use]
    pub fn new(max_steps_without_progress: u32) -> Self {
        Self {
            progress: ProgressState::default(),
            max_steps_without_progress,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum RewardMode {
    Walk,
    Getup,
    Climb(ClimbReward),
}

impl RewardMode {
    #[must_use]
    pub fn new(mode: Mode, max_steps_without_progress: u32) -> Self {
        match mode {
            Mode::Walk => Self::Walk,
            Mode::Getup => Self::Getup,
            Mode::Climb => Self::Climb(ClimbReward::new(max_steps_without_progress)),
        }
    }

    #[must_use]
    pub fn mode(&self) -> Mode {
        match self {
            Self::Walk => Mode::Walk,
            Self::Getup => Mode::Getup,
            Self::Climb(_) => Mode::Climb,
        }
    }

    /// Restarts per-episode state. `distance` is the root-to-target distance.
    pub fn begin_episode(&mut self, distance: f32) {
        if let Self::Climb(climb) = self {
            climb.progress = ProgressState::start(distance);
        }
    }

    #[must_use]
    pub fn progress(&self) -> Option<&ProgressState> {
        match self {
            Self::Climb(climb) => Some(&climb.progress),
            Self::Walk | Self::Getup => None,
        }
    }

    /// # Errors
    ///
    /// Fails if the root is missing from the registry or the registry is empty.
    pub fn compute(
        &mut self,
        tick: u32,
        schema: &BodySchema,
        ctx: &TickContext<'_>,
    ) -> Result<RewardOutcome, RlError> {
        let root = ctx
            .registry
            .get(schema.root)
            .ok_or_else(|| RlError::MissingBodyPart(format!("#{}", schema.root)))?;

        if let Self::Getup = self {
            let euler = euler_degrees(root.body.rotation);
            let upright = delta_angle_reward(euler.x) * delta_angle_reward(euler.z);
            return Ok(RewardOutcome {
                reward: upright * upright,
                terminate: false,
            });
        }

        let average_velocity = ctx
            .registry
            .average_velocity()
            .map_err(|_| RlError::EmptyRegistry)?;
        let speed = speed_match_reward(average_velocity, ctx.goal_velocity(), ctx.target_speed);
        let heading = heading_reward(ctx.frame.forward(), root.body.forward());

        match self {
            Self::Climb(climb) => {
                let distance = root.body.position.distance(ctx.target);
                let score = climb.progress.advance(tick, distance);
                let terminate = climb
                    .progress
                    .check_stall(tick, climb.max_steps_without_progress);
                Ok(RewardOutcome {
                    reward: score * speed * heading,
                    terminate,
                })
            }
            Self::Walk | Self::Getup => Ok(RewardOutcome {
                reward: speed * heading,
                terminate: false,
            }),
        }
    }
}
