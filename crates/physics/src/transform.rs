//! Reference frame and rotation utilities
//!
//! This module provides the yaw-aligned orientation frame used to express
//! world-space vectors relative to a character, plus the handful of rotation
//! helpers the training core needs (shortest-arc rotations, Euler angles in
//! degrees and signed angle differences).
//!
//! Conventions: +Y is up, +Z is forward. Euler angles are in degrees and
//! compose as `Ry * Rx * Rz` (roll about Z first, then pitch, then yaw).

use glam::{EulerRot, Quat, Vec3};

/// Yaw-only frame anchored on the character's root and facing its target.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct OrientationFrame {
    pub origin: Vec3,
    pub rotation: Quat,
}

impl Default for OrientationFrame {
    fn default() -> Self {
        Self {
            origin: Vec3::ZERO,
            rotation: Quat::IDENTITY,
        }
    }
}

impl OrientationFrame {
    /// Re-anchors the frame on `root_position` and turns it toward `target`
    /// around the vertical axis.
    ///
    /// When the target sits straight above or below the root there is no
    /// horizontal direction to face, and the previous yaw is kept.
    pub fn update(&mut self, root_position: Vec3, target: Vec3) {
        self.origin = root_position;
        let mut direction = target - root_position;
        direction.y = 0.0;
        if direction.length_squared() > f32::EPSILON {
            self.rotation = Quat::from_rotation_y(direction.x.atan2(direction.z));
        }
    }

    #[must_use]
    pub fn forward(&self) -> Vec3 {
        self.rotation * Vec3::Z
    }

    #[must_use]
    pub fn up(&self) -> Vec3 {
        self.rotation * Vec3::Y
    }

    /// Expresses a world direction in frame coordinates (rotation only).
    #[must_use]
    pub fn inverse_transform_direction(&self, direction: Vec3) -> Vec3 {
        self.rotation.inverse() * direction
    }

    /// Expresses a world point in frame coordinates.
    #[must_use]
    pub fn inverse_transform_point(&self, point: Vec3) -> Vec3 {
        self.rotation.inverse() * (point - self.origin)
    }
}

/// Smallest rotation taking direction `from` onto direction `to`.
///
/// Degenerate (zero-length) inputs yield the identity.
#[must_use]
pub fn shortest_arc(from: Vec3, to: Vec3) -> Quat {
    match (from.try_normalize(), to.try_normalize()) {
        (Some(from), Some(to)) => Quat::from_rotation_arc(from, to),
        _ => Quat::IDENTITY,
    }
}

/// Builds a rotation from `(x, y, z)` Euler angles in degrees.
#[must_use]
pub fn quat_from_euler_degrees(euler: Vec3) -> Quat {
    Quat::from_euler(
        EulerRot::YXZ,
        euler.y.to_radians(),
        euler.x.to_radians(),
        euler.z.to_radians(),
    )
}

/// Decomposes a rotation into `(x, y, z)` Euler angles in degrees.
#[must_use]
pub fn euler_degrees(rotation: Quat) -> Vec3 {
    let (y, x, z) = rotation.to_euler(EulerRot::YXZ);
    Vec3::new(x.to_degrees(), y.to_degrees(), z.to_degrees())
}

/// Shortest signed difference `target - current` in degrees, in `(-180, 180]`.
#[must_use]
pub fn delta_angle(current: f32, target: f32) -> f32 {
    let delta = (target - current).rem_euclid(360.0);
    if delta > 180.0 {
        delta - 360.0
    } else {
        delta
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn frame_faces_target_on_ground_plane() {
        let mut frame = OrientationFrame::default();
        frame.update(Vec3::new(1.0, 0.5, 1.0), Vec3::new(5.0, 3.0, 1.0));

        let forward = frame.forward();
        assert!(forward.abs_diff_eq(Vec3::X, 1e-5), "forward = {forward:?}");
        assert!(frame.up().abs_diff_eq(Vec3::Y, 1e-5));
        assert_eq!(frame.origin, Vec3::new(1.0, 0.5, 1.0));
    }

    #[test]
    fn frame_keeps_yaw_when_target_is_overhead() {
        let mut frame = OrientationFrame::default();
        frame.update(Vec3::ZERO, Vec3::new(-3.0, 0.0, 0.0));
        let before = frame.rotation;
        frame.update(Vec3::new(0.0, 1.0, 0.0), Vec3::new(0.0, 4.0, 0.0));
        assert_eq!(frame.rotation, before);
    }

    #[test]
    fn inverse_transforms_undo_the_frame() {
        let mut frame = OrientationFrame::default();
        frame.update(Vec3::new(2.0, 0.0, 0.0), Vec3::new(2.0, 0.0, -10.0));

        // Facing -Z: world -Z is local +Z, world +X is local -X.
        let local = frame.inverse_transform_direction(Vec3::new(1.0, 0.0, -1.0));
        assert!(local.abs_diff_eq(Vec3::new(-1.0, 0.0, 1.0), 1e-5), "local = {local:?}");

        let point = frame.inverse_transform_point(Vec3::new(2.0, 1.0, -3.0));
        assert!(point.abs_diff_eq(Vec3::new(0.0, 1.0, 3.0), 1e-5), "point = {point:?}");
    }

    #[test]
    fn shortest_arc_rotates_from_onto_to() {
        let q = shortest_arc(Vec3::Z, Vec3::X * 3.0);
        assert!((q * Vec3::Z).abs_diff_eq(Vec3::X, 1e-5));
        assert_eq!(shortest_arc(Vec3::ZERO, Vec3::X), Quat::IDENTITY);
    }

    #[test]
    fn euler_round_trip_in_degrees() {
        let euler = Vec3::new(20.0, -35.0, 50.0);
        let back = euler_degrees(quat_from_euler_degrees(euler));
        assert!(back.abs_diff_eq(euler, 1e-3), "back = {back:?}");
    }

    #[test]
    fn delta_angle_wraps_into_half_open_range() {
        assert_relative_eq!(delta_angle(0.0, 190.0), -170.0);
        assert_relative_eq!(delta_angle(0.0, -190.0), 170.0);
        assert_relative_eq!(delta_angle(0.0, 180.0), 180.0);
        assert_relative_eq!(delta_angle(0.0, 360.0), 0.0);
        assert_relative_eq!(delta_angle(350.0, 10.0), 20.0);
    }
}
