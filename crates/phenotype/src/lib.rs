#![deny(clippy::all, clippy::pedantic)]
//! Character topologies.
//!
//! A topology is the declarative description of an articulated character:
//! its body parts in a fixed order, which part is the root, which rotational
//! axes each joint exposes and where every part rests. Everything that depends
//! on the body's shape (observation length, action length, decode routing) is
//! derived from it, so adding or removing a part cannot silently misalign the
//! flat vectors exchanged with a policy.

use std::collections::HashSet;
use std::path::Path;

use anyhow::{bail, Context, Result};
use physics::{Axis, BodyPart, JointDriveController, JointLimits, Pose, Vec3};
use serde::Deserialize;

const DUCK_RABBIT_JSON: &str = include_str!("../data/duck_rabbit.json");
const CHAIR_JSON: &str = include_str!("../data/chair.json");

#[derive(Debug, Clone, Deserialize)]
pub struct Topology {
    pub name: String,
    /// Name of the root part. It must be listed first.
    pub root: String,
    /// Whether each part also reports a stairs-contact flag.
    #[serde(default)]
    pub stairs_contact: bool,
    #[serde(default = "default_force_limit")]
    pub max_joint_force_limit: f32,
    #[serde(default = "default_max_speed")]
    pub max_walking_speed: f32,
    pub parts: Vec<PartDef>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PartDef {
    pub name: String,
    #[serde(default)]
    pub parent: Option<String>,
    /// Driven rotational axes, in action-slot order.
    #[serde(default)]
    pub dof: Vec<Dof>,
    #[serde(default)]
    pub limits: LimitsDef,
    pub rest: RestDef,
    #[serde(default = "default_radius")]
    pub radius: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Dof {
    X,
    Y,
    Z,
}

impl From<Dof> for Axis {
    fn from(dof: Dof) -> Self {
        match dof {
            Dof::X => Axis::X,
            Dof::Y => Axis::Y,
            Dof::Z => Axis::Z,
        }
    }
}

/// Joint limits in degrees, `[low, high]` per axis.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct LimitsDef {
    #[serde(default = "default_x_limit")]
    pub x: [f32; 2],
    #[serde(default = "default_yz_limit")]
    pub y: [f32; 2],
    #[serde(default = "default_yz_limit")]
    pub z: [f32; 2],
}

impl Default for LimitsDef {
    fn default() -> Self {
        Self {
            x: default_x_limit(),
            y: default_yz_limit(),
            z: default_yz_limit(),
        }
    }
}

#[derive(Debug, Clone, Copy, Deserialize)]
pub struct RestDef {
    pub position: [f32; 3],
    /// Euler angles in degrees.
    #[serde(default = "zero_vec")]
    pub rotation: [f32; 3],
}

fn default_force_limit() -> f32 {
    physics::drive::DEFAULT_MAX_JOINT_FORCE_LIMIT
}

fn default_max_speed() -> f32 {
    10.0
}

fn default_radius() -> f32 {
    0.1
}

fn default_x_limit() -> [f32; 2] {
    [-60.0, 60.0]
}

fn default_yz_limit() -> [f32; 2] {
    [-45.0, 45.0]
}

fn zero_vec() -> [f32; 3] {
    [0.0, 0.0, 0.0]
}

impl PartDef {
    /// Joint limits with every undriven axis locked at zero.
    #[must_use]
    pub fn joint_limits(&self) -> JointLimits {
        let axis = |dof: Dof, [low, high]: [f32; 2]| {
            if self.dof.contains(&dof) {
                (low, high)
            } else {
                (0.0, 0.0)
            }
        };
        JointLimits {
            x: axis(Dof::X, self.limits.x),
            y: axis(Dof::Y, self.limits.y),
            z: axis(Dof::Z, self.limits.z),
        }
    }

    #[must_use]
    pub fn rest_pose(&self) -> Pose {
        let [x, y, z] = self.rest.position;
        let [rx, ry, rz] = self.rest.rotation;
        Pose::new(
            Vec3::new(x, y, z),
            physics::quat_from_euler_degrees(Vec3::new(rx, ry, rz)),
        )
    }
}

impl Topology {
    /// Parses and validates a topology.
    ///
    /// # Errors
    ///
    /// Fails on malformed JSON or when [`Topology::validate`] rejects it.
    pub fn from_json(json: &str) -> Result<Self> {
        let topology: Self = serde_json::from_str(json)?;
        topology.validate()?;
        Ok(topology)
    }

    /// # Errors
    ///
    /// Fails if the file cannot be read or holds an invalid topology.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)
            .with_context(|| format!("reading topology {}", path.display()))?;
        Self::from_json(&json).with_context(|| format!("parsing topology {}", path.display()))
    }

    /// One of the bundled characters, by name.
    ///
    /// # Errors
    ///
    /// Fails for an unknown name.
    pub fn builtin(name: &str) -> Result<Self> {
        match name.to_ascii_lowercase().replace(['-', '_'], "").as_str() {
            "duckrabbit" => Self::duck_rabbit(),
            "chair" => Self::chair(),
            _ => bail!("unknown character {name}"),
        }
    }

    /// The biped: root, head, left foot, right foot.
    ///
    /// # Errors
    ///
    /// Only fails if the bundled definition is broken.
    pub fn duck_rabbit() -> Result<Self> {
        Self::from_json(DUCK_RABBIT_JSON).context("bundled DuckRabbit topology")
    }

    /// The quadruped: seat, back, four legs, four upper legs, four feet.
    ///
    /// # Errors
    ///
    /// Only fails if the bundled definition is broken.
    pub fn chair() -> Result<Self> {
        Self::from_json(CHAIR_JSON).context("bundled Chair topology")
    }

    /// Checks the structural rules every consumer relies on.
    ///
    /// # Errors
    ///
    /// Fails when the part list is empty, the root is not first or has a
    /// joint, a name repeats, a parent is unknown or listed after its child,
    /// or a non-root part drives zero or more than three (distinct) axes.
    pub fn validate(&self) -> Result<()> {
        let Some(first) = self.parts.first() else {
            bail!("topology {} has no parts", self.name);
        };
        if first.name != self.root {
            bail!("root part {} must be listed first, found {}", self.root, first.name);
        }
        if first.parent.is_some() || !first.dof.is_empty() {
            bail!("root part {} cannot have a parent or a driven joint", self.root);
        }
        if self.max_walking_speed < 0.1 {
            bail!("max walking speed {} is below 0.1", self.max_walking_speed);
        }

        let mut seen = HashSet::new();
        for part in &self.parts {
            if let Some(parent) = &part.parent {
                if !seen.contains(parent.as_str()) {
                    bail!("part {} references parent {parent} before it is declared", part.name);
                }
                let distinct: HashSet<_> = part.dof.iter().collect();
                if part.dof.is_empty() || part.dof.len() > 3 || distinct.len() != part.dof.len() {
                    bail!("part {} must drive between one and three distinct axes", part.name);
                }
            } else if part.name != self.root {
                bail!("part {} has no parent but is not the root", part.name);
            }
            if !seen.insert(part.name.as_str()) {
                bail!("part {} is declared twice", part.name);
            }
        }
        Ok(())
    }

    #[must_use]
    pub fn root_part(&self) -> Option<&PartDef> {
        self.parts.first()
    }

    /// Every part with a driven joint, in declaration order.
    pub fn driven_parts(&self) -> impl Iterator<Item = &PartDef> {
        self.parts.iter().filter(|p| p.parent.is_some())
    }

    #[must_use]
    pub fn rotation_slots(&self) -> usize {
        self.driven_parts().map(|p| p.dof.len()).sum()
    }

    #[must_use]
    pub fn strength_slots(&self) -> usize {
        self.driven_parts().count()
    }

    /// Builds the body part registry for this character, in declaration order.
    ///
    /// # Errors
    ///
    /// Fails if a part is rejected by the registry.
    pub fn build_registry(&self) -> Result<JointDriveController> {
        let mut registry = JointDriveController::new(self.max_joint_force_limit);
        for part in &self.parts {
            let parent = part
                .parent
                .as_deref()
                .map(|name| {
                    registry
                        .index_of(name)
                        .with_context(|| format!("unknown parent {name} of {}", part.name))
                })
                .transpose()?;
            let body_part = BodyPart::new(part.name.clone(), part.rest_pose(), parent)
                .with_limits(part.joint_limits())
                .with_radius(part.radius);
            registry.setup_body_part(body_part)?;
        }
        Ok(registry)
    }
}
