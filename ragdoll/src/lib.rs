#![deny(clippy::all, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
//! # Ragdoll
//!
//! Tooling around the control core: arena setup, a headless rollout driver
//! and the checkpoint catalogue a viewer browses trained policies with.
//!
//! -   [`scene`] builds a [`physics::World`] and [`rl::RagdollEnv`] for a
//!     character and mode.
//! -   [`rollout`] drives episodes with a random policy.
//! -   [`catalog`] reads the trainer's status file and orders checkpoints.
//! -   [`selector`] tracks the current checkpoint and notifies observers.

pub mod catalog;
pub mod rollout;
pub mod scene;
pub mod selector;

pub use catalog::{Catalog, CatalogEntry, CatalogError, Checkpoint, TrainingRun, TrainingStatus};
pub use rollout::{EpisodeSummary, RandomPolicy};
pub use selector::{ModelSelector, SubscriptionId};
