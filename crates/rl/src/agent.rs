//! # Ragdoll Agent
//!
//! Ties the per-tick pieces together for one character. The agent does not
//! own the body: the registry is borrowed on every call, so the same agent
//! works against a [`physics::World`] or any other owner of the parts.
//!
//! Call order within an episode:
//!
//! 1. [`RagdollAgent::on_episode_begin`]
//! 2. per tick: [`collect_observations`](RagdollAgent::collect_observations),
//!    [`on_action_received`](RagdollAgent::on_action_received), physics,
//!    [`fixed_update`](RagdollAgent::fixed_update)
//! 3. any time between ticks: [`on_contact`](RagdollAgent::on_contact)

use glam::Vec3;
use phenotype::Topology;
use physics::{ContactEvent, JointDriveController, OrientationFrame};
use tracing::{info, trace};

use crate::action::ActionDecoder;
use crate::config::{AgentConfig, Mode};
use crate::contact::ContactHandler;
use crate::episode::{EpisodeLifecycle, EpisodeSignal, Termination};
use crate::error::RlError;
use crate::observation::{ObservationEncoder, TickContext};
use crate::progress::ProgressState;
use crate::reward::RewardMode;
use crate::schema::BodySchema;

pub struct RagdollAgent {
    schema: BodySchema,
    config: AgentConfig,
    encoder: ObservationEncoder,
    decoder: ActionDecoder,
    reward: RewardMode,
    frame: OrientationFrame,
    target: Vec3,
    rng: fastrand::Rng,
    signal: EpisodeSignal,
    step_count: u32,
}

impl RagdollAgent {
    /// Compiles `topology` against `registry` and validates `config`.
    ///
    /// # Errors
    ///
    /// Fails if the registry does not match the topology or the training
    /// configuration is invalid.
    pub fn new(
        topology: &Topology,
        registry: &JointDriveController,
        config: AgentConfig,
        target: Vec3,
    ) -> Result<Self, RlError> {
        config.training.validate()?;
        let schema = BodySchema::compile(topology, registry)?;
        let encoder = ObservationEncoder::new(&schema, config.mode);
        let decoder = ActionDecoder::new(&schema);
        let reward = RewardMode::new(config.mode, config.max_steps_without_progress);
        let rng = fastrand::Rng::with_seed(config.seed);
        info!(
            topology = %schema.name,
            mode = ?config.mode,
            observation_size = encoder.size(),
            action_size = decoder.size(),
            "agent ready"
        );
        Ok(Self {
            schema,
            config,
            encoder,
            decoder,
            reward,
            frame: OrientationFrame::default(),
            target,
            rng,
            signal: EpisodeSignal::default(),
            step_count: 0,
        })
    }

    #[must_use]
    pub fn schema(&self) -> &BodySchema {
        &self.schema
    }

    #[must_use]
    pub fn config(&self) -> &AgentConfig {
        &self.config
    }

    #[must_use]
    pub fn mode(&self) -> Mode {
        self.config.mode
    }

    #[must_use]
    pub fn observation_size(&self) -> usize {
        self.encoder.size()
    }

    #[must_use]
    pub fn action_size(&self) -> usize {
        self.decoder.size()
    }

    #[must_use]
    pub fn frame(&self) -> &OrientationFrame {
        &self.frame
    }

    #[must_use]
    pub fn target(&self) -> Vec3 {
        self.target
    }

    /// Takes effect at the next episode start for Climb progress, and
    /// immediately for observations and rewards.
    pub fn set_target(&mut self, target: Vec3) {
        self.target = target;
    }

    #[must_use]
    pub fn step_count(&self) -> u32 {
        self.step_count
    }

    #[must_use]
    pub fn progress(&self) -> Option<&ProgressState> {
        self.reward.progress()
    }

    #[must_use]
    pub fn signal(&self) -> &EpisodeSignal {
        &self.signal
    }

    pub fn signal_mut(&mut self) -> &mut EpisodeSignal {
        &mut self.signal
    }

    /// # Errors
    ///
    /// Fails if the registry lost its root.
    pub fn on_episode_begin(&mut self, registry: &mut JointDriveController) -> Result<(), RlError> {
        self.signal.reset();
        self.step_count = 0;
        EpisodeLifecycle::begin(
            registry,
            self.schema.root,
            &mut self.frame,
            self.target,
            &mut self.config.training,
            &mut self.reward,
            &mut self.rng,
        )?;
        Ok(())
    }

    /// # Errors
    ///
    /// See [`ObservationEncoder::encode`].
    pub fn collect_observations(&self, registry: &JointDriveController) -> Result<Vec<f32>, RlError> {
        self.encoder.encode(&self.schema, &self.context(registry))
    }

    /// # Errors
    ///
    /// See [`ActionDecoder::decode`].
    pub fn on_action_received(
        &self,
        actions: &[f32],
        registry: &mut JointDriveController,
    ) -> Result<(), RlError> {
        self.decoder.decode(&self.schema, actions, registry)
    }

    /// Runs after the physics step: refreshes the frame and adds this tick's
    /// reward. Returns the reward added.
    ///
    /// # Errors
    ///
    /// Fails if the registry lost its root or is empty.
    pub fn fixed_update(&mut self, registry: &JointDriveController) -> Result<f32, RlError> {
        self.step_count += 1;
        let root = registry
            .get(self.schema.root)
            .ok_or_else(|| RlError::MissingBodyPart(format!("#{}", self.schema.root)))?;
        self.frame.update(root.body.position, self.target);

        let ctx = TickContext {
            frame: &self.frame,
            registry,
            target: self.target,
            target_speed: self.config.training.target_speed(),
        };
        let outcome = self.reward.compute(self.step_count, &self.schema, &ctx)?;
        trace!(step = self.step_count, reward = outcome.reward, "tick");
        self.signal.add_reward(outcome.reward);
        if outcome.terminate && self.signal.end_episode(Termination::Stalled) {
            info!(
                step = self.step_count,
                reward = self.signal.cumulative_reward(),
                "episode stalled"
            );
        }
        Ok(outcome.reward)
    }

    pub fn on_contact(&mut self, registry: &mut JointDriveController, event: &ContactEvent) {
        ContactHandler::handle(&self.config, registry, &mut self.signal, event);
    }

    fn context<'a>(&'a self, registry: &'a JointDriveController) -> TickContext<'a> {
        TickContext {
            frame: &self.frame,
            registry,
            target: self.target,
            target_speed: self.config.training.target_speed(),
        }
    }
}
