//! # Ragdoll World
//!
//! Owns a character's body part registry plus the static arena surfaces and
//! advances them one fixed timestep at a time. Contact transitions detected
//! during a step are returned to the caller as [`ContactEvent`]s; the world
//! never writes the parts' contact flags itself.

use glam::Vec3;

use crate::collision::{self, Volume};
use crate::contact::{ContactEvent, ContactFlags, SurfaceTag};
use crate::drive::JointDriveController;
use crate::error::PhysicsError;
use crate::integrator::{drive_joints, integrate_root, resolve_support};

pub struct World {
    pub parts: JointDriveController,
    pub gravity: Vec3,
    pub dt: f32,
    pub volumes: Vec<Volume>,
    root: usize,
    // Overlap state seen by the sensor on the previous step, per part.
    overlaps: Vec<ContactFlags>,
}

impl World {
    /// # Errors
    ///
    /// Returns [`PhysicsError::EmptyRegistry`] or [`PhysicsError::NoRoot`]
    /// when the registry cannot drive a body, and
    /// [`PhysicsError::InvalidTimestep`] unless `dt` is positive and finite.
    pub fn new(parts: JointDriveController, dt: f32) -> Result<Self, PhysicsError> {
        if !dt.is_finite() || dt <= 0.0 {
            return Err(PhysicsError::InvalidTimestep(dt.to_string()));
        }
        if parts.is_empty() {
            return Err(PhysicsError::EmptyRegistry);
        }
        let root = parts.root_index()?;
        let overlaps = vec![ContactFlags::default(); parts.len()];
        Ok(Self {
            parts,
            gravity: Vec3::new(0.0, -9.81, 0.0),
            dt,
            volumes: Vec::new(),
            root,
            overlaps,
        })
    }

    #[must_use]
    pub fn root(&self) -> usize {
        self.root
    }

    pub fn add_volume(&mut self, volume: Volume) -> usize {
        self.volumes.push(volume);
        self.volumes.len() - 1
    }

    /// Forgets the sensor state so contacts present after a reset are
    /// reported again as fresh enters.
    pub fn reset_contacts(&mut self) {
        for overlap in &mut self.overlaps {
            overlap.clear();
        }
    }

    /// Advances the world by `dt` and returns the contact transitions.
    pub fn step(&mut self) -> Vec<ContactEvent> {
        integrate_root(&mut self.parts, self.root, self.gravity, self.dt);
        let push = drive_joints(&mut self.parts, self.dt);
        if let Some(root) = self.parts.get_mut(self.root) {
            root.body.linear_velocity += push * self.dt;
        }

        let lowest = self
            .parts
            .iter()
            .map(|p| p.body.position.y - p.radius - collision::support_height(p.body.position, &self.volumes))
            .fold(f32::INFINITY, f32::min);
        resolve_support(&mut self.parts, self.root, lowest);

        self.sense()
    }

    fn sense(&mut self) -> Vec<ContactEvent> {
        let mut events = Vec::new();
        for (part, previous) in self.parts.iter().zip(self.overlaps.iter_mut()) {
            let mut current = ContactFlags::default();
            current.set(
                SurfaceTag::Ground,
                collision::touches_ground(part.body.position, part.radius),
            );
            for volume in &self.volumes {
                if volume.touches(part.body.position, part.radius) {
                    current.set(volume.tag, true);
                }
            }

            for tag in [SurfaceTag::Ground, SurfaceTag::Stairs, SurfaceTag::Obstacle] {
                match (previous.get(tag), current.get(tag)) {
                    (false, true) => events.push(ContactEvent::enter(part.name.as_str(), tag)),
                    (true, false) => events.push(ContactEvent::exit(part.name.as_str(), tag)),
                    _ => {}
                }
            }
            *previous = current;
        }
        if !events.is_empty() {
            tracing::trace!(count = events.len(), "contact transitions");
        }
        events
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::contact::ContactPhase;
    use crate::types::{BodyPart, Pose};

    fn world() -> World {
        let mut parts = JointDriveController::new(100.0);
        parts
            .setup_body_part(BodyPart::root("root", Pose::at(Vec3::new(0.0, 0.3, 0.0))))
            .unwrap();
        parts
            .setup_body_part(BodyPart::new("foot", Pose::at(Vec3::new(0.0, 0.1, 0.0)), Some(0)))
            .unwrap();
        World::new(parts, 0.02).unwrap()
    }

    #[test]
    fn empty_registry_is_rejected() {
        assert!(matches!(
            World::new(JointDriveController::default(), 0.02),
            Err(PhysicsError::EmptyRegistry)
        ));
    }

    #[test]
    fn non_positive_or_non_finite_timestep_is_rejected() {
        for dt in [0.0, -0.02, f32::NAN, f32::INFINITY] {
            let parts = world().parts;
            assert!(matches!(World::new(parts, dt), Err(PhysicsError::InvalidTimestep(_))), "dt {dt}");
        }
    }

    #[test]
    fn landing_raises_a_single_ground_enter() {
        let mut world = world();
        let first = world.step();
        assert!(first
            .iter()
            .any(|e| e.part == "foot" && e.tag == SurfaceTag::Ground && e.phase == ContactPhase::Enter));
        let second = world.step();
        assert!(second.iter().all(|e| e.part != "foot"));
    }

    #[test]
    fn leaving_the_ground_raises_exit() {
        let mut world = world();
        world.step();
        let root = world.root();
        world.parts.get_mut(root).unwrap().body.position.y = 3.0;
        world.gravity = Vec3::ZERO;
        let events = world.step();
        assert!(events
            .iter()
            .any(|e| e.part == "foot" && e.phase == ContactPhase::Exit));
    }

    #[test]
    fn body_never_sinks_below_ground() {
        let mut world = world();
        for _ in 0..200 {
            world.step();
        }
        for part in world.parts.iter() {
            assert!(part.body.position.y - part.radius >= -1e-4, "{} sank", part.name);
        }
    }

    #[test]
    fn obstacle_volume_reports_its_tag() {
        let mut world = world();
        world.add_volume(Volume::new(
            SurfaceTag::Obstacle,
            Vec3::new(-1.0, 0.0, -1.0),
            Vec3::new(1.0, 2.0, 1.0),
        ));
        let events = world.step();
        assert!(events.iter().any(|e| e.tag == SurfaceTag::Obstacle));
    }
}
