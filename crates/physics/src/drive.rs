//! # Joint Drive Controller
//!
//! The body part registry of a character. Parts are kept in registration
//! order, which is the order every consumer iterates them in, and are also
//! addressable by their skeletal segment name.

use std::collections::HashMap;

use glam::{Quat, Vec3};

use crate::error::PhysicsError;
use crate::types::BodyPart;

/// Force limit used when none is configured.
pub const DEFAULT_MAX_JOINT_FORCE_LIMIT: f32 = 20000.0;

#[derive(Clone, Debug)]
pub struct JointDriveController {
    parts: Vec<BodyPart>,
    index: HashMap<String, usize>,
    /// Shared upper bound of every joint's strength.
    pub max_joint_force_limit: f32,
}

impl Default for JointDriveController {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_JOINT_FORCE_LIMIT)
    }
}

impl JointDriveController {
    #[must_use]
    pub fn new(max_joint_force_limit: f32) -> Self {
        Self {
            parts: Vec::new(),
            index: HashMap::new(),
            max_joint_force_limit,
        }
    }

    /// Registers a body part and returns its index.
    ///
    /// A part's parent must already be registered; its rest offset from the
    /// parent is computed here.
    ///
    /// # Errors
    ///
    /// Returns [`PhysicsError::DuplicateBodyPart`] if the name is taken and
    /// [`PhysicsError::InvalidParent`] if the parent index is not registered.
    pub fn setup_body_part(&mut self, mut part: BodyPart) -> Result<usize, PhysicsError> {
        if self.index.contains_key(&part.name) {
            return Err(PhysicsError::DuplicateBodyPart(part.name));
        }
        if let Some(parent_idx) = part.parent {
            let parent = self.parts.get(parent_idx).ok_or_else(|| PhysicsError::InvalidParent {
                part: part.name.clone(),
                parent: parent_idx,
            })?;
            part.offset = parent.rest.rotation.inverse() * (part.rest.position - parent.rest.position);
        }
        let idx = self.parts.len();
        self.index.insert(part.name.clone(), idx);
        self.parts.push(part);
        Ok(idx)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.parts.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.parts.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &BodyPart> {
        self.parts.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut BodyPart> {
        self.parts.iter_mut()
    }

    #[must_use]
    pub fn get(&self, idx: usize) -> Option<&BodyPart> {
        self.parts.get(idx)
    }

    pub fn get_mut(&mut self, idx: usize) -> Option<&mut BodyPart> {
        self.parts.get_mut(idx)
    }

    #[must_use]
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.index.get(name).copied()
    }

    pub fn by_name_mut(&mut self, name: &str) -> Option<&mut BodyPart> {
        let idx = self.index_of(name)?;
        self.parts.get_mut(idx)
    }

    /// Index of the first part without a parent.
    ///
    /// # Errors
    ///
    /// Returns [`PhysicsError::NoRoot`] when every part has a parent.
    pub fn root_index(&self) -> Result<usize, PhysicsError> {
        self.parts
            .iter()
            .position(BodyPart::is_root)
            .ok_or(PhysicsError::NoRoot)
    }

    /// # Errors
    ///
    /// Returns [`PhysicsError::IndexOutOfRange`] for an unknown index.
    pub fn set_joint_target_rotation(
        &mut self,
        idx: usize,
        x: f32,
        y: f32,
        z: f32,
    ) -> Result<(), PhysicsError> {
        let part = self.parts.get_mut(idx).ok_or(PhysicsError::IndexOutOfRange(idx))?;
        part.set_joint_target_rotation(x, y, z);
        Ok(())
    }

    /// # Errors
    ///
    /// Returns [`PhysicsError::IndexOutOfRange`] for an unknown index.
    pub fn set_joint_strength(&mut self, idx: usize, value: f32) -> Result<(), PhysicsError> {
        let max_force = self.max_joint_force_limit;
        let part = self.parts.get_mut(idx).ok_or(PhysicsError::IndexOutOfRange(idx))?;
        part.set_joint_strength(value, max_force);
        Ok(())
    }

    pub fn reset_all(&mut self) {
        for part in &mut self.parts {
            part.reset();
        }
    }

    /// Turns the whole body by `rotation` about the part at `root`, placing
    /// every part at its rest pose relative to the root. Joint-local
    /// rotations come out as identity.
    ///
    /// # Errors
    ///
    /// Returns [`PhysicsError::IndexOutOfRange`] for an unknown root index.
    pub fn rotate_about(&mut self, root: usize, rotation: Quat) -> Result<(), PhysicsError> {
        let (anchor, rest_anchor) = self
            .parts
            .get(root)
            .map(|part| (part.body.position, part.rest.position))
            .ok_or(PhysicsError::IndexOutOfRange(root))?;
        for part in &mut self.parts {
            part.body.position = anchor + rotation * (part.rest.position - rest_anchor);
            part.body.rotation = rotation * part.rest.rotation;
        }
        Ok(())
    }

    /// Rotation of a part relative to its parent; the root's is its world rotation.
    #[must_use]
    pub fn local_rotation(&self, idx: usize) -> Option<Quat> {
        let part = self.parts.get(idx)?;
        let parent_rotation = match part.parent {
            Some(parent) => self.parts.get(parent)?.body.rotation,
            None => Quat::IDENTITY,
        };
        Some(parent_rotation.inverse() * part.body.rotation)
    }

    /// Mean linear velocity over every registered part.
    ///
    /// # Errors
    ///
    /// Returns [`PhysicsError::EmptyRegistry`] when no part is registered.
    pub fn average_velocity(&self) -> Result<Vec3, PhysicsError> {
        self.average(|part| part.body.linear_velocity)
    }

    /// Mean angular velocity over every registered part.
    ///
    /// # Errors
    ///
    /// Returns [`PhysicsError::EmptyRegistry`] when no part is registered.
    pub fn average_angular_velocity(&self) -> Result<Vec3, PhysicsError> {
        self.average(|part| part.body.angular_velocity)
    }

    fn average(&self, value: impl Fn(&BodyPart) -> Vec3) -> Result<Vec3, PhysicsError> {
        if self.parts.is_empty() {
            return Err(PhysicsError::EmptyRegistry);
        }
        #[allow(clippy::cast_precision_loss)]
        let count = self.parts.len() as f32;
        Ok(self.parts.iter().map(value).sum::<Vec3>() / count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Pose;
    use approx::assert_relative_eq;

    fn two_part_chain() -> JointDriveController {
        let mut parts = JointDriveController::new(100.0);
        let root = parts
            .setup_body_part(BodyPart::root("seat", Pose::at(Vec3::new(0.0, 1.0, 0.0))))
            .unwrap();
        parts
            .setup_body_part(BodyPart::new("back", Pose::at(Vec3::new(0.0, 1.5, -0.2)), Some(root)))
            .unwrap();
        parts
    }

    #[test]
    fn registration_order_is_stable() {
        let parts = two_part_chain();
        let names: Vec<_> = parts.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, ["seat", "back"]);
        assert_eq!(parts.index_of("back"), Some(1));
        assert_eq!(parts.root_index(), Ok(0));
        assert!(parts.get(1).unwrap().offset.abs_diff_eq(Vec3::new(0.0, 0.5, -0.2), 1e-6));
    }

    #[test]
    fn duplicate_and_orphan_parts_are_rejected() {
        let mut parts = two_part_chain();
        assert_eq!(
            parts.setup_body_part(BodyPart::root("seat", Pose::default())),
            Err(PhysicsError::DuplicateBodyPart("seat".into()))
        );
        assert!(matches!(
            parts.setup_body_part(BodyPart::new("leg", Pose::default(), Some(7))),
            Err(PhysicsError::InvalidParent { parent: 7, .. })
        ));
    }

    #[test]
    fn averages_cover_every_part() {
        let mut parts = two_part_chain();
        parts.get_mut(0).unwrap().body.linear_velocity = Vec3::new(2.0, 0.0, 0.0);
        parts.get_mut(1).unwrap().body.linear_velocity = Vec3::new(0.0, 0.0, 4.0);
        parts.get_mut(1).unwrap().body.angular_velocity = Vec3::new(0.0, 6.0, 0.0);

        let avg = parts.average_velocity().unwrap();
        assert!(avg.abs_diff_eq(Vec3::new(1.0, 0.0, 2.0), 1e-6));
        let avg_ang = parts.average_angular_velocity().unwrap();
        assert_relative_eq!(avg_ang.y, 3.0);
    }

    #[test]
    fn empty_registry_has_no_average() {
        let parts = JointDriveController::default();
        assert_eq!(parts.average_velocity(), Err(PhysicsError::EmptyRegistry));
        assert_eq!(parts.root_index(), Err(PhysicsError::NoRoot));
    }

    #[test]
    fn local_rotation_is_relative_to_parent() {
        let mut parts = two_part_chain();
        let yaw = Quat::from_rotation_y(0.5);
        parts.get_mut(0).unwrap().body.rotation = yaw;
        parts.get_mut(1).unwrap().body.rotation = yaw * Quat::from_rotation_x(0.25);

        let local = parts.local_rotation(1).unwrap();
        assert!(local.abs_diff_eq(Quat::from_rotation_x(0.25), 1e-5));
        assert!(parts.local_rotation(0).unwrap().abs_diff_eq(yaw, 1e-6));
        assert!(parts.local_rotation(9).is_none());
    }

    #[test]
    fn rotating_about_the_root_keeps_joints_relaxed() {
        let mut parts = two_part_chain();
        parts.get_mut(0).unwrap().body.position = Vec3::new(2.0, 1.0, 3.0);
        let turn = Quat::from_rotation_y(std::f32::consts::FRAC_PI_2) * Quat::from_rotation_x(0.3);
        parts.rotate_about(0, turn).unwrap();

        let seat = parts.get(0).unwrap().body;
        let back = parts.get(1).unwrap().body;
        assert!(seat.position.abs_diff_eq(Vec3::new(2.0, 1.0, 3.0), 1e-6));
        assert!(seat.rotation.abs_diff_eq(turn, 1e-6));
        assert!((back.position - seat.position).abs_diff_eq(turn * Vec3::new(0.0, 0.5, -0.2), 1e-5));
        assert!(parts.local_rotation(1).unwrap().abs_diff_eq(Quat::IDENTITY, 1e-5));
        assert_eq!(parts.rotate_about(4, turn), Err(PhysicsError::IndexOutOfRange(4)));
    }

    #[test]
    fn commands_reject_unknown_indices() {
        let mut parts = two_part_chain();
        assert_eq!(parts.set_joint_strength(5, 0.0), Err(PhysicsError::IndexOutOfRange(5)));
        parts.set_joint_strength(1, 1.0).unwrap();
        assert_relative_eq!(parts.get(1).unwrap().current_strength, 100.0);
    }
}
