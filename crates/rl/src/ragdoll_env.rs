//! [`Env`] over a simulated ragdoll.
//!
//! One [`RagdollEnv::step`] is one fixed physics tick: the action is applied
//! to the joints, the world advances, contact transitions are handed to the
//! agent, and the agent scores the tick.

use glam::Vec3;
use phenotype::Topology;
use physics::World;
use tracing::{debug, trace};

use crate::agent::RagdollAgent;
use crate::config::AgentConfig;
use crate::env::Env;
use crate::episode::Termination;
use crate::error::RlError;

pub struct RagdollEnv {
    world: World,
    agent: RagdollAgent,
}

impl RagdollEnv {
    /// # Errors
    ///
    /// Fails if the world's registry does not match `topology` or the config
    /// is invalid.
    pub fn new(topology: &Topology, world: World, config: AgentConfig, target: Vec3) -> Result<Self, RlError> {
        let agent = RagdollAgent::new(topology, &world.parts, config, target)?;
        Ok(Self { world, agent })
    }

    #[must_use]
    pub fn world(&self) -> &World {
        &self.world
    }

    pub fn world_mut(&mut self) -> &mut World {
        &mut self.world
    }

    #[must_use]
    pub fn agent(&self) -> &RagdollAgent {
        &self.agent
    }

    pub fn agent_mut(&mut self) -> &mut RagdollAgent {
        &mut self.agent
    }

    #[must_use]
    pub fn is_done(&self) -> bool {
        self.agent.signal().is_done()
    }
}

impl Env for RagdollEnv {
    fn step(&mut self, action: &[f32]) -> Result<(Vec<f32>, f32, bool), RlError> {
        self.agent.on_action_received(action, &mut self.world.parts)?;

        let events = self.world.step();
        for event in &events {
            trace!(part = %event.part, tag = %event.tag, phase = ?event.phase, "contact");
            self.agent.on_contact(&mut self.world.parts, event);
        }

        self.agent.fixed_update(&self.world.parts)?;

        let max_steps = self.agent.config().max_steps;
        if max_steps > 0
            && self.agent.step_count() >= max_steps
            && self.agent.signal_mut().end_episode(Termination::MaxSteps)
        {
            debug!(steps = max_steps, "episode reached step cap");
        }

        let reward = self.agent.signal_mut().take_step_reward();
        let obs = self.agent.collect_observations(&self.world.parts)?;
        Ok((obs, reward, self.agent.signal().is_done()))
    }

    fn reset(&mut self) -> Result<Vec<f32>, RlError> {
        self.agent.on_episode_begin(&mut self.world.parts)?;
        self.world.reset_contacts();
        self.agent.collect_observations(&self.world.parts)
    }

    fn obs_size(&self) -> usize {
        self.agent.observation_size()
    }

    fn action_size(&self) -> usize {
        self.agent.action_size()
    }
}
