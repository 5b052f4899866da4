use glam::{Quat, Vec3};

use crate::contact::ContactFlags;
use crate::transform::quat_from_euler_degrees;

/// Kinematic state of one rigid body.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct RigidBody {
    pub position: Vec3,
    pub rotation: Quat,
    pub linear_velocity: Vec3,
    pub angular_velocity: Vec3,
}

impl RigidBody {
    /// A body resting at `pose` with zero velocities.
    #[must_use]
    pub fn at_rest(pose: Pose) -> Self {
        Self {
            position: pose.position,
            rotation: pose.rotation,
            linear_velocity: Vec3::ZERO,
            angular_velocity: Vec3::ZERO,
        }
    }

    /// Local +Z expressed in world space.
    #[must_use]
    pub fn forward(&self) -> Vec3 {
        self.rotation * Vec3::Z
    }

    /// Local +Y expressed in world space.
    #[must_use]
    pub fn up(&self) -> Vec3 {
        self.rotation * Vec3::Y
    }
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Pose {
    pub position: Vec3,
    pub rotation: Quat,
}

impl Pose {
    #[must_use]
    pub const fn new(position: Vec3, rotation: Quat) -> Self {
        Self { position, rotation }
    }

    #[must_use]
    pub fn at(position: Vec3) -> Self {
        Self::new(position, Quat::IDENTITY)
    }
}

impl Default for Pose {
    fn default() -> Self {
        Self::new(Vec3::ZERO, Quat::IDENTITY)
    }
}

/// A rotational degree of freedom of a joint.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Axis {
    X,
    Y,
    Z,
}

impl Axis {
    /// Component index inside an `(x, y, z)` triple.
    #[must_use]
    pub const fn component(self) -> usize {
        match self {
            Axis::X => 0,
            Axis::Y => 1,
            Axis::Z => 2,
        }
    }
}

/// Angular limits of a joint in degrees, `(low, high)` per axis.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct JointLimits {
    pub x: (f32, f32),
    pub y: (f32, f32),
    pub z: (f32, f32),
}

impl Default for JointLimits {
    fn default() -> Self {
        Self {
            x: (-60.0, 60.0),
            y: (-45.0, 45.0),
            z: (-45.0, 45.0),
        }
    }
}

impl JointLimits {
    /// Maps normalized targets in `[-1, 1]` onto the limits, returning Euler
    /// angles in degrees.
    #[must_use]
    pub fn target_euler(&self, x: f32, y: f32, z: f32) -> Vec3 {
        let lerp = |(low, high): (f32, f32), v: f32| {
            let t = (v.clamp(-1.0, 1.0) + 1.0) * 0.5;
            low + (high - low) * t
        };
        Vec3::new(lerp(self.x, x), lerp(self.y, y), lerp(self.z, z))
    }
}

/// One independently actuated skeletal segment.
#[derive(Clone, Debug)]
pub struct BodyPart {
    pub name: String,
    pub body: RigidBody,
    pub rest: Pose,
    /// Index of the parent part. `None` marks the root, which has no driven joint.
    pub parent: Option<usize>,
    /// Rest offset from the parent, in the parent's frame. Filled on registration.
    pub offset: Vec3,
    pub limits: JointLimits,
    /// Joint target relative to the parent.
    pub target_rotation: Quat,
    /// Last applied joint force, in `[0, max_joint_force_limit]`.
    pub current_strength: f32,
    pub contact: ContactFlags,
    /// Collision sphere radius.
    pub radius: f32,
}

impl BodyPart {
    #[must_use]
    pub fn new(name: impl Into<String>, rest: Pose, parent: Option<usize>) -> Self {
        Self {
            name: name.into(),
            body: RigidBody::at_rest(rest),
            rest,
            parent,
            offset: Vec3::ZERO,
            limits: JointLimits::default(),
            target_rotation: Quat::IDENTITY,
            current_strength: 0.0,
            contact: ContactFlags::default(),
            radius: 0.1,
        }
    }

    #[must_use]
    pub fn root(name: impl Into<String>, rest: Pose) -> Self {
        Self::new(name, rest, None)
    }

    #[must_use]
    pub fn with_limits(mut self, limits: JointLimits) -> Self {
        self.limits = limits;
        self
    }

    #[must_use]
    pub fn with_radius(mut self, radius: f32) -> Self {
        self.radius = radius;
        self
    }

    #[must_use]
    pub fn is_root(&self) -> bool {
        self.parent.is_none()
    }

    /// Back to the rest pose: velocities, strength, joint target and contact
    /// flags are cleared.
    pub fn reset(&mut self) {
        self.body = RigidBody::at_rest(self.rest);
        self.target_rotation = Quat::IDENTITY;
        self.current_strength = 0.0;
        self.contact.clear();
    }

    /// Sets the joint target from normalized per-axis values in `[-1, 1]`.
    pub fn set_joint_target_rotation(&mut self, x: f32, y: f32, z: f32) {
        self.target_rotation = quat_from_euler_degrees(self.limits.target_euler(x, y, z));
    }

    /// Maps a normalized strength in `[-1, 1]` onto `[0, max_force]`.
    pub fn set_joint_strength(&mut self, value: f32, max_force: f32) {
        self.current_strength = (value.clamp(-1.0, 1.0) + 1.0) * 0.5 * max_force;
    }
}
