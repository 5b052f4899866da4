//! # Ragdoll Integration
//!
//! Kinematic integration of an articulated body. The root is a free body
//! under gravity; every other part hangs off its parent at its rest offset
//! and is swung toward its joint target by its joint drive.

use glam::{Quat, Vec3};

use crate::drive::JointDriveController;

/// Integration constants
const DAMPING_FACTOR: f32 = 0.99;
/// Fraction of the remaining joint error closed per second at full strength.
const DRIVE_RATE: f32 = 10.0;
/// How strongly a grounded, swinging part pushes the root.
const TRACTION: f32 = 0.5;
const GROUND_FRICTION: f32 = 0.9;

/// Semi-implicit Euler step of the root body.
pub fn integrate_root(parts: &mut JointDriveController, root: usize, gravity: Vec3, dt: f32) {
    let Some(part) = parts.get_mut(root) else {
        return;
    };
    let body = &mut part.body;
    body.linear_velocity += gravity * dt;
    body.position += body.linear_velocity * dt;
    body.rotation = (Quat::from_scaled_axis(body.angular_velocity * dt) * body.rotation).normalize();

    body.linear_velocity *= DAMPING_FACTOR;
    body.angular_velocity *= DAMPING_FACTOR;
}

/// Moves every non-root part with its parent and toward its joint target.
///
/// Returns the horizontal push grounded parts exert on the root. Parents
/// must precede their children, which the registry guarantees.
pub fn drive_joints(parts: &mut JointDriveController, dt: f32) -> Vec3 {
    let max_force = parts.max_joint_force_limit.max(f32::EPSILON);
    let mut push = Vec3::ZERO;

    for idx in 0..parts.len() {
        let Some(parent_idx) = parts.get(idx).and_then(|p| p.parent) else {
            continue;
        };
        let Some(parent) = parts.get(parent_idx).map(|p| p.body) else {
            continue;
        };
        let Some(part) = parts.get_mut(idx) else {
            continue;
        };

        let old_position = part.body.position;
        let old_rotation = part.body.rotation;

        let ratio = (part.current_strength / max_force).clamp(0.0, 1.0);
        let local = parent.rotation.inverse() * old_rotation;
        let driven = local.slerp(part.target_rotation, (DRIVE_RATE * ratio * dt).min(1.0));
        let new_rotation = (parent.rotation * driven).normalize();
        let new_position = parent.position + parent.rotation * part.offset;

        part.body.rotation = new_rotation;
        part.body.position = new_position;
        part.body.linear_velocity = (new_position - old_position) / dt;
        part.body.angular_velocity = (new_rotation * old_rotation.inverse()).to_scaled_axis() / dt;

        if part.contact.touching_ground || part.contact.touching_stairs {
            let swing = (new_rotation * Vec3::NEG_Y - old_rotation * Vec3::NEG_Y) * part.radius / dt;
            push -= Vec3::new(swing.x, 0.0, swing.z) * TRACTION;
        }
    }
    push
}

/// Lifts the whole body so no part sinks below its support height.
///
/// `lowest_clearance` is the most negative `y - radius - support` over all
/// parts. Returns whether a correction was applied.
pub fn resolve_support(parts: &mut JointDriveController, root: usize, lowest_clearance: f32) -> bool {
    if lowest_clearance >= 0.0 {
        return false;
    }
    let lift = Vec3::new(0.0, -lowest_clearance, 0.0);
    for part in parts.iter_mut() {
        part.body.position += lift;
    }
    if let Some(root) = parts.get_mut(root) {
        let vel = &mut root.body.linear_velocity;
        vel.y = vel.y.max(0.0);
        vel.x *= GROUND_FRICTION;
        vel.z *= GROUND_FRICTION;
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{BodyPart, Pose};

    fn chain() -> JointDriveController {
        let mut parts = JointDriveController::new(100.0);
        parts.setup_body_part(BodyPart::root("root", Pose::at(Vec3::new(0.0, 1.0, 0.0)))).unwrap();
        parts
            .setup_body_part(BodyPart::new("head", Pose::at(Vec3::new(0.0, 1.5, 0.0)), Some(0)))
            .unwrap();
        parts
    }

    #[test]
    fn root_falls_under_gravity() {
        let mut parts = chain();
        integrate_root(&mut parts, 0, Vec3::new(0.0, -9.81, 0.0), 0.01);
        let root = parts.get(0).unwrap();
        assert!(root.body.position.y < 1.0);
        assert!(root.body.linear_velocity.y < 0.0);
    }

    #[test]
    fn children_follow_their_parent() {
        let mut parts = chain();
        parts.get_mut(0).unwrap().body.position = Vec3::new(3.0, 1.0, 0.0);
        drive_joints(&mut parts, 0.02);
        let head = parts.get(1).unwrap();
        assert!(head.body.position.abs_diff_eq(Vec3::new(3.0, 1.5, 0.0), 1e-5));
        assert!(head.body.linear_velocity.x > 0.0);
    }

    #[test]
    fn zero_strength_leaves_joint_in_place() {
        let mut parts = chain();
        parts.set_joint_target_rotation(1, 1.0, 1.0, 1.0).unwrap();
        drive_joints(&mut parts, 0.02);
        assert!(parts.get(1).unwrap().body.rotation.abs_diff_eq(Quat::IDENTITY, 1e-6));

        parts.set_joint_strength(1, 1.0).unwrap();
        drive_joints(&mut parts, 0.02);
        assert!(!parts.get(1).unwrap().body.rotation.abs_diff_eq(Quat::IDENTITY, 1e-3));
    }

    #[test]
    fn support_lifts_and_stops_descent() {
        let mut parts = chain();
        parts.get_mut(0).unwrap().body.linear_velocity = Vec3::new(1.0, -2.0, 0.0);
        assert!(resolve_support(&mut parts, 0, -0.25));
        let root = parts.get(0).unwrap();
        assert!((root.body.position.y - 1.25).abs() < 1e-6);
        assert!(root.body.linear_velocity.y.abs() < 1e-6);
        assert!(!resolve_support(&mut parts, 0, 0.1));
    }
}
