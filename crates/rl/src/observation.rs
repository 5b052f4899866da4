//! # Observation Encoder
//!
//! Turns the raw kinematic state of a character into the fixed-length float
//! vector a policy consumes. Vectors are expressed in the character's
//! [`OrientationFrame`] so the policy sees the same input whatever direction
//! the character happens to face in the world.
//!
//! Layout, in order:
//!
//! 1. distance between goal velocity and average velocity,
//! 2. average velocity (frame-local),
//! 3. goal velocity (frame-local),
//! 4. shortest-arc rotation from root forward to frame forward,
//! 5. target world position rotated into the frame (not made relative to
//!    the frame origin),
//! 6. mode tail: Getup emits root height, root-up to frame-up rotation and
//!    average angular velocity (frame-local); Walk and Climb emit the frame
//!    origin's height and the raw origin-to-target vector,
//! 7. per part, in schema order: ground contact, stairs contact (when the
//!    topology has stairs), linear velocity, angular velocity and position
//!    relative to the root (all frame-local); then, for driven parts only,
//!    local rotation and strength normalized by the force limit.

use glam::{Quat, Vec3};
use physics::{shortest_arc, JointDriveController, OrientationFrame};

use crate::config::Mode;
use crate::error::RlError;
use crate::schema::BodySchema;

/// Everything a tick reads: the frame, the registry, the target and speed.
#[derive(Clone, Copy)]
pub struct TickContext<'a> {
    pub frame: &'a OrientationFrame,
    pub registry: &'a JointDriveController,
    pub target: Vec3,
    pub target_speed: f32,
}

impl TickContext<'_> {
    /// Velocity the character should have: frame forward at target speed.
    #[must_use]
    pub fn goal_velocity(&self) -> Vec3 {
        self.frame.forward() * self.target_speed
    }
}

/// Append-only float buffer.
#[derive(Debug, Default)]
pub struct VectorSensor {
    values: Vec<f32>,
}

impl VectorSensor {
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self { values: Vec::with_capacity(capacity) }
    }

    pub fn add_f32(&mut self, value: f32) {
        self.values.push(value);
    }

    pub fn add_bool(&mut self, value: bool) {
        self.values.push(if value { 1.0 } else { 0.0 });
    }

    pub fn add_vec3(&mut self, value: Vec3) {
        self.values.extend_from_slice(&value.to_array());
    }

    /// Quaternions are written `x, y, z, w`.
    pub fn add_quat(&mut self, value: Quat) {
        self.values.extend_from_slice(&value.to_array());
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    #[must_use]
    pub fn into_vec(self) -> Vec<f32> {
        self.values
    }
}

#[derive(Clone, Debug)]
pub struct ObservationEncoder {
    mode: Mode,
    size: usize,
}

impl ObservationEncoder {
    #[must_use]
    pub fn new(schema: &BodySchema, mode: Mode) -> Self {
        Self {
            mode,
            size: schema.observation_size(mode),
        }
    }

    #[must_use]
    pub fn size(&self) -> usize {
        self.size
    }

    /// # Errors
    ///
    /// Returns [`RlError::EmptyRegistry`] when there is nothing to average and
    /// [`RlError::MissingBodyPart`] if the registry no longer matches the schema.
    pub fn encode(&self, schema: &BodySchema, ctx: &TickContext<'_>) -> Result<Vec<f32>, RlError> {
        let registry = ctx.registry;
        let frame = ctx.frame;
        let root = registry
            .get(schema.root)
            .ok_or_else(|| RlError::MissingBodyPart(format!("#{}", schema.root)))?;

        let goal_velocity = ctx.goal_velocity();
        let avg_velocity = registry.average_velocity().map_err(|_| RlError::EmptyRegistry)?;

        let mut sensor = VectorSensor::with_capacity(self.size);
        sensor.add_f32(goal_velocity.distance(avg_velocity));
        sensor.add_vec3(frame.inverse_transform_direction(avg_velocity));
        sensor.add_vec3(frame.inverse_transform_direction(goal_velocity));
        sensor.add_quat(shortest_arc(root.body.forward(), frame.forward()));
        sensor.add_vec3(frame.inverse_transform_direction(ctx.target));

        match self.mode {
            Mode::Getup => {
                let avg_angular = registry
                    .average_angular_velocity()
                    .map_err(|_| RlError::EmptyRegistry)?;
                sensor.add_f32(frame.inverse_transform_direction(root.body.position).y);
                sensor.add_quat(shortest_arc(root.body.up(), frame.up()));
                sensor.add_vec3(frame.inverse_transform_direction(avg_angular));
            }
            Mode::Walk | Mode::Climb => {
                sensor.add_f32(frame.origin.y);
                sensor.add_vec3(ctx.target - frame.origin);
            }
        }

        for &idx in &schema.parts {
            let part = registry
                .get(idx)
                .ok_or_else(|| RlError::MissingBodyPart(format!("#{idx}")))?;
            sensor.add_bool(part.contact.touching_ground);
            if schema.stairs_contact {
                sensor.add_bool(part.contact.touching_stairs);
            }
            sensor.add_vec3(frame.inverse_transform_direction(part.body.linear_velocity));
            sensor.add_vec3(frame.inverse_transform_direction(part.body.angular_velocity));
            sensor.add_vec3(frame.inverse_transform_direction(part.body.position - root.body.position));

            if !part.is_root() {
                let local_rotation = registry.local_rotation(idx).unwrap_or(Quat::IDENTITY);
                sensor.add_quat(local_rotation);
                sensor.add_f32(part.current_strength / registry.max_joint_force_limit);
            }
        }

        debug_assert_eq!(sensor.len(), self.size, "observation layout drifted from schema");
        Ok(sensor.into_vec())
    }
}
