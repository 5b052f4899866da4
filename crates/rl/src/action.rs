//! # Action Decoder
//!
//! A policy emits one flat vector per tick. It is read strictly left to
//! right in two regions, both ordered like the schema's driven parts:
//!
//! - rotation: one slot per driven axis of each part, written into the
//!   part's joint target with undriven axes pinned to zero,
//! - strength: exactly one slot per driven part.
//!
//! DuckRabbit: `head xyz, left_foot xyz, right_foot xyz | head, left_foot,
//! right_foot` (12 slots). Chair: `back x, four legs xz, four uppers xz, four
//! feet x | the same thirteen parts` (34 slots).

use physics::JointDriveController;

use crate::error::RlError;
use crate::schema::BodySchema;

#[derive(Clone, Debug)]
pub struct ActionDecoder {
    expected: usize,
}

impl ActionDecoder {
    #[must_use]
    pub fn new(schema: &BodySchema) -> Self {
        Self {
            expected: schema.action_size(),
        }
    }

    #[must_use]
    pub fn size(&self) -> usize {
        self.expected
    }

    /// Applies `actions` to the registry.
    ///
    /// Nothing is written unless the length matches exactly.
    ///
    /// # Errors
    ///
    /// Returns [`RlError::ActionLengthMismatch`] for any other length, and a
    /// physics error if the registry lost a part the schema routes to.
    pub fn decode(
        &self,
        schema: &BodySchema,
        actions: &[f32],
        registry: &mut JointDriveController,
    ) -> Result<(), RlError> {
        if actions.len() != self.expected {
            return Err(RlError::ActionLengthMismatch {
                topology: schema.name.clone(),
                expected: self.expected,
                actual: actions.len(),
            });
        }

        let (rotations, strengths) = actions.split_at(schema.rotation_slots());
        let mut cursor = rotations.iter().copied();
        for joint in &schema.joints {
            let mut target = [0.0_f32; 3];
            for axis in &joint.axes {
                target[axis.component()] = cursor.next().unwrap_or_default();
            }
            let [x, y, z] = target;
            registry.set_joint_target_rotation(joint.part, x, y, z)?;
        }

        for (joint, &strength) in schema.joints.iter().zip(strengths) {
            registry.set_joint_strength(joint.part, strength)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use phenotype::Topology;
    use physics::{euler_degrees, quat_from_euler_degrees, Vec3};

    fn chair() -> (BodySchema, JointDriveController) {
        let topology = Topology::chair().unwrap();
        let registry = topology.build_registry().unwrap();
        let schema = BodySchema::compile(&topology, &registry).unwrap();
        (schema, registry)
    }

    #[test]
    fn wrong_length_writes_nothing() {
        let (schema, mut registry) = chair();
        let decoder = ActionDecoder::new(&schema);
        for len in [0, 33, 35] {
            let err = decoder.decode(&schema, &vec![1.0; len], &mut registry).unwrap_err();
            assert_eq!(
                err,
                RlError::ActionLengthMismatch { topology: "Chair".into(), expected: 34, actual: len }
            );
        }
        assert!(registry.iter().all(|p| p.current_strength == 0.0));
    }

    #[test]
    fn strengths_follow_declared_order() {
        let (schema, mut registry) = chair();
        let decoder = ActionDecoder::new(&schema);
        let mut actions = vec![0.0; 34];
        // k-th strength slot gets a distinct value in [-1, 1].
        for k in 0..13 {
            #[allow(clippy::cast_precision_loss)]
            let value = -1.0 + 2.0 * k as f32 / 12.0;
            actions[21 + k] = value;
        }
        decoder.decode(&schema, &actions, &mut registry).unwrap();

        let max = registry.max_joint_force_limit;
        for (k, joint) in schema.joints.iter().enumerate() {
            #[allow(clippy::cast_precision_loss)]
            let expected = (k as f32 / 12.0) * max;
            assert_relative_eq!(registry.get(joint.part).unwrap().current_strength, expected, max_relative = 1e-5);
        }
        assert_relative_eq!(registry.by_name_mut("back").unwrap().current_strength, 0.0);
        assert_relative_eq!(registry.by_name_mut("back_right_foot").unwrap().current_strength, max);
    }

    #[test]
    fn rotation_slots_fill_driven_axes_only() {
        let (schema, mut registry) = chair();
        let decoder = ActionDecoder::new(&schema);
        let mut actions = vec![0.0; 34];
        // back x, then front_left_leg x and z.
        actions[0] = 1.0;
        actions[1] = -1.0;
        actions[2] = 1.0;
        decoder.decode(&schema, &actions, &mut registry).unwrap();

        let back = registry.by_name_mut("back").unwrap();
        let euler = euler_degrees(back.target_rotation);
        assert_relative_eq!(euler.x, 45.0, epsilon = 1e-3);
        assert_relative_eq!(euler.y, 0.0, epsilon = 1e-3);
        assert_relative_eq!(euler.z, 0.0, epsilon = 1e-3);

        let leg = registry.by_name_mut("front_left_leg").unwrap();
        let expected = quat_from_euler_degrees(Vec3::new(-45.0, 0.0, 30.0));
        assert!(leg.target_rotation.abs_diff_eq(expected, 1e-5));
    }

    #[test]
    fn duck_rabbit_routes_three_axes_per_part() {
        let topology = Topology::duck_rabbit().unwrap();
        let mut registry = topology.build_registry().unwrap();
        let schema = BodySchema::compile(&topology, &registry).unwrap();
        let decoder = ActionDecoder::new(&schema);

        let mut actions = vec![0.0; 12];
        actions[3] = 1.0; // left_foot x
        actions[10] = 1.0; // left_foot strength
        decoder.decode(&schema, &actions, &mut registry).unwrap();

        let foot = registry.by_name_mut("left_foot").unwrap();
        assert_relative_eq!(euler_degrees(foot.target_rotation).x, 60.0, epsilon = 1e-3);
        assert_relative_eq!(foot.current_strength, 20000.0);
        let head = registry.by_name_mut("head").unwrap();
        assert_relative_eq!(head.current_strength, 10000.0);
    }
}
