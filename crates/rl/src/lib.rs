#![deny(clippy::all, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
//! # Ragdoll Control Core
//!
//! The environment side of ragdoll training: everything between the raw
//! physical state of a character and the tensors a trainer exchanges with a
//! policy. No learning happens here.
//!
//! ## Key Components
//!
//! -   **Schema:** [`BodySchema`] binds a [`phenotype::Topology`] to a body
//!     part registry. Observation and action sizes are read off it.
//! -   **Observation:** [`ObservationEncoder`] builds the frame-relative
//!     input vector.
//! -   **Action:** [`ActionDecoder`] routes a flat action vector to joint
//!     targets and strengths.
//! -   **Reward:** [`RewardMode`] scores a tick for Walk, Getup or Climb and
//!     may end a stalled Climb episode.
//! -   **Episodes:** [`EpisodeLifecycle`] re-randomizes a character at
//!     episode start; [`EpisodeSignal`] carries reward and termination back.
//! -   **Contacts:** [`ContactHandler`] turns contact transitions into
//!     penalties and terminations.
//! -   **Agent:** [`RagdollAgent`] composes all of the above, and
//!     [`RagdollEnv`] wraps it around a [`physics::World`] behind the [`Env`]
//!     trait.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use rl::{AgentConfig, Env, Mode, RagdollEnv};
//!
//! let topology = phenotype::Topology::duck_rabbit()?;
//! let world = physics::World::new(topology.build_registry()?, 0.02)?;
//! let config = AgentConfig::new(Mode::Walk, topology.max_walking_speed);
//! let mut env = RagdollEnv::new(&topology, world, config, target)?;
//! let mut obs = env.reset()?;
//! let (next, reward, done) = env.step(&vec![0.0; env.action_size()])?;
//! ```

pub mod action;
pub mod agent;
pub mod config;
pub mod contact;
pub mod env;
pub mod episode;
pub mod error;
pub mod observation;
pub mod progress;
pub mod ragdoll_env;
pub mod reward;
pub mod schema;

pub use action::ActionDecoder;
pub use agent::RagdollAgent;
pub use config::{AgentConfig, ContactConfig, Mode, PartContactConfig, TrainingConfig};
pub use contact::ContactHandler;
pub use env::Env;
pub use episode::{EpisodeLifecycle, EpisodeSignal, Termination};
pub use error::RlError;
pub use observation::{ObservationEncoder, TickContext, VectorSensor};
pub use progress::ProgressState;
pub use ragdoll_env::RagdollEnv;
pub use reward::{
    delta_angle_reward, heading_reward, inverse_lerp, speed_match_reward, ClimbReward, RewardMode,
    RewardOutcome,
};
pub use schema::{BodySchema, JointSlot};
