//! Compiled body schema.
//!
//! A [`phenotype::Topology`] bound to a concrete body part registry. The
//! schema is compiled once per agent; the observation length, the action
//! length and the action routing are all read off it.

use physics::{Axis, JointDriveController};
use phenotype::Topology;

use crate::config::Mode;
use crate::error::RlError;

/// Header floats shared by every mode: velocity error, average velocity,
/// goal velocity, heading rotation, target position.
const COMMON_HEADER: usize = 1 + 3 + 3 + 4 + 3;
/// Walk / Climb: frame height and origin-to-target vector.
const LOCOMOTION_HEADER: usize = 1 + 3;
/// Getup: root height, uprightness rotation, average angular velocity.
const GETUP_HEADER: usize = 1 + 4 + 3;
/// Linear velocity, angular velocity, position relative to the root.
const PART_KINEMATICS: usize = 3 + 3 + 3;
/// Local rotation and normalized strength of a driven part.
const JOINT_STATE: usize = 4 + 1;

/// Action routing for one driven part.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct JointSlot {
    pub part: usize,
    pub name: String,
    /// Axes fed by consecutive rotation slots.
    pub axes: Vec<Axis>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BodySchema {
    pub name: String,
    pub root: usize,
    pub stairs_contact: bool,
    /// Registry indices of every part, in observation order.
    pub parts: Vec<usize>,
    /// Driven parts, in action order.
    pub joints: Vec<JointSlot>,
}

impl BodySchema {
    /// Binds `topology` to `registry` by part name.
    ///
    /// # Errors
    ///
    /// Fails when the registry is empty, holds a different number of parts,
    /// or lacks a part the topology names.
    pub fn compile(topology: &Topology, registry: &JointDriveController) -> Result<Self, RlError> {
        if registry.is_empty() {
            return Err(RlError::EmptyRegistry);
        }
        if registry.len() != topology.parts.len() {
            return Err(RlError::RegistrySizeMismatch {
                topology: topology.name.clone(),
                expected: topology.parts.len(),
                actual: registry.len(),
            });
        }
        let lookup = |name: &str| {
            registry
                .index_of(name)
                .ok_or_else(|| RlError::MissingBodyPart(name.to_owned()))
        };

        let root = lookup(&topology.root)?;
        let parts = topology
            .parts
            .iter()
            .map(|p| lookup(&p.name))
            .collect::<Result<Vec<_>, _>>()?;
        let joints = topology
            .driven_parts()
            .map(|p| {
                Ok(JointSlot {
                    part: lookup(&p.name)?,
                    name: p.name.clone(),
                    axes: p.dof.iter().copied().map(Axis::from).collect(),
                })
            })
            .collect::<Result<Vec<_>, RlError>>()?;

        Ok(Self {
            name: topology.name.clone(),
            root,
            stairs_contact: topology.stairs_contact,
            parts,
            joints,
        })
    }

    #[must_use]
    pub fn rotation_slots(&self) -> usize {
        self.joints.iter().map(|j| j.axes.len()).sum()
    }

    #[must_use]
    pub fn strength_slots(&self) -> usize {
        self.joints.len()
    }

    #[must_use]
    pub fn action_size(&self) -> usize {
        self.rotation_slots() + self.strength_slots()
    }

    #[must_use]
    pub fn header_size(mode: Mode) -> usize {
        COMMON_HEADER
            + match mode {
                Mode::Getup => GETUP_HEADER,
                Mode::Walk | Mode::Climb => LOCOMOTION_HEADER,
            }
    }

    /// Floats emitted per part, excluding the joint state of driven parts.
    #[must_use]
    pub fn part_size(&self) -> usize {
        let contacts = if self.stairs_contact { 2 } else { 1 };
        contacts + PART_KINEMATICS
    }

    #[must_use]
    pub fn observation_size(&self, mode: Mode) -> usize {
        Self::header_size(mode) + self.parts.len() * self.part_size() + self.joints.len() * JOINT_STATE
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duck_rabbit_sizes() {
        let topology = Topology::duck_rabbit().unwrap();
        let registry = topology.build_registry().unwrap();
        let schema = BodySchema::compile(&topology, &registry).unwrap();

        assert_eq!(schema.action_size(), 12);
        // 14 + 4 header, root 11, three driven parts 16 each.
        assert_eq!(schema.observation_size(Mode::Walk), 77);
        assert_eq!(schema.observation_size(Mode::Climb), 77);
        assert_eq!(schema.observation_size(Mode::Getup), 81);
        let names: Vec<_> = schema.joints.iter().map(|j| j.name.as_str()).collect();
        assert_eq!(names, ["head", "left_foot", "right_foot"]);
    }

    #[test]
    fn chair_sizes() {
        let topology = Topology::chair().unwrap();
        let registry = topology.build_registry().unwrap();
        let schema = BodySchema::compile(&topology, &registry).unwrap();

        assert_eq!(schema.rotation_slots(), 21);
        assert_eq!(schema.action_size(), 34);
        // 18 header, root 10, thirteen driven parts 15 each.
        assert_eq!(schema.observation_size(Mode::Walk), 223);
    }

    #[test]
    fn registry_must_match_topology() {
        let duck = Topology::duck_rabbit().unwrap();
        let chair_registry = Topology::chair().unwrap().build_registry().unwrap();
        assert!(matches!(
            BodySchema::compile(&duck, &chair_registry),
            Err(RlError::RegistrySizeMismatch { expected: 4, actual: 14, .. })
        ));
        assert_eq!(
            BodySchema::compile(&duck, &JointDriveController::default()),
            Err(RlError::EmptyRegistry)
        );
    }
}
