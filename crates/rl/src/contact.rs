//! Contact-driven penalties and termination.
//!
//! Runs between ticks, whenever the contact sensor reports a transition.
//! The flags it writes are what the next observation reads.

use physics::{ContactEvent, ContactPhase, JointDriveController, SurfaceTag};
use tracing::{info, warn};

use crate::config::AgentConfig;
use crate::episode::{EpisodeSignal, Termination};

pub struct ContactHandler;

impl ContactHandler {
    /// Applies one contact transition. Events for parts the registry does not
    /// know are dropped.
    pub fn handle(
        config: &AgentConfig,
        registry: &mut JointDriveController,
        signal: &mut EpisodeSignal,
        event: &ContactEvent,
    ) {
        let Some(part) = registry.by_name_mut(&event.part) else {
            warn!(part = %event.part, tag = %event.tag, "contact for unknown body part ignored");
            return;
        };

        match event.phase {
            ContactPhase::Exit => part.contact.set(event.tag, false),
            ContactPhase::Enter => {
                part.contact.set(event.tag, true);
                let contact = config.contact_for(&event.part);
                match event.tag {
                    SurfaceTag::Ground => {
                        if contact.penalize_ground {
                            signal.add_reward(contact.ground_penalty);
                        }
                        if contact.end_on_ground && signal.end_episode(Termination::GroundContact) {
                            info!(part = %event.part, "episode ended on ground contact");
                        }
                    }
                    SurfaceTag::Stairs => {
                        if contact.penalize_stairs {
                            signal.add_reward(contact.stairs_penalty);
                        }
                    }
                    SurfaceTag::Obstacle => {
                        if signal.end_episode(Termination::ObstacleContact) {
                            info!(part = %event.part, "episode ended on obstacle contact");
                        }
                    }
                    SurfaceTag::Untagged => {}
                }
            }
        }
    }
}
