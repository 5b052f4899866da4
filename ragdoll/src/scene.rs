//! Arena setup for a character and mode.
//!
//! Walk and Getup run on the open ground plane. Climb adds a flight of
//! stairs rising along +Z with the target on the top landing.

use anyhow::{Context, Result};
use glam::Vec3;
use phenotype::Topology;
use physics::{SurfaceTag, Volume, World};
use rl::{AgentConfig, Mode, RagdollEnv};

/// Fixed physics timestep, in seconds.
pub const FIXED_DT: f32 = 0.02;

const WALK_TARGET_DISTANCE: f32 = 20.0;
const STAIR_COUNT: u8 = 6;
const STAIR_RISE: f32 = 0.15;
const STAIR_DEPTH: f32 = 0.8;
const STAIR_HALF_WIDTH: f32 = 2.0;
const STAIRS_START: f32 = 3.0;

/// Stair boxes, lowest first.
#[must_use]
pub fn stairs() -> Vec<Volume> {
    (0..STAIR_COUNT)
        .map(|i| {
            let i = f32::from(i);
            let z = STAIRS_START + i * STAIR_DEPTH;
            Volume::new(
                SurfaceTag::Stairs,
                Vec3::new(-STAIR_HALF_WIDTH, 0.0, z),
                Vec3::new(STAIR_HALF_WIDTH, (i + 1.0) * STAIR_RISE, z + STAIR_DEPTH),
            )
        })
        .collect()
}

/// Where the character is sent in `mode`.
#[must_use]
pub fn default_target(mode: Mode) -> Vec3 {
    match mode {
        Mode::Walk | Mode::Getup => Vec3::new(0.0, 0.0, WALK_TARGET_DISTANCE),
        Mode::Climb => {
            let top = f32::from(STAIR_COUNT);
            Vec3::new(
                0.0,
                top * STAIR_RISE,
                STAIRS_START + (top - 0.5) * STAIR_DEPTH,
            )
        }
    }
}

/// Builds the world for `topology`, with the arena `mode` needs.
///
/// # Errors
///
/// Fails if the topology does not produce a drivable registry.
pub fn build_world(topology: &Topology, mode: Mode) -> Result<World> {
    let registry = topology.build_registry()?;
    let mut world = World::new(registry, FIXED_DT)
        .with_context(|| format!("cannot simulate topology {}", topology.name))?;
    if mode == Mode::Climb {
        for step in stairs() {
            world.add_volume(step);
        }
    }
    Ok(world)
}

/// A ready-to-reset environment.
///
/// # Errors
///
/// Fails if the world cannot be built or the agent rejects `config`.
pub fn build_env(topology: &Topology, config: AgentConfig) -> Result<RagdollEnv> {
    let world = build_world(topology, config.mode)?;
    let target = default_target(config.mode);
    RagdollEnv::new(topology, world, config, target)
        .with_context(|| format!("cannot build agent for {}", topology.name))
}
