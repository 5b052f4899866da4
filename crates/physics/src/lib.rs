#![deny(clippy::all, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
//! # Ragdoll Physics Layer
//!
//! The actuator and sensing layer the training core talks to. It owns the
//! articulated body of a character and exposes it the way a joint-driven
//! ragdoll is usually exposed to a learning agent: as an order-stable set of
//! body parts with rigid-body kinematics, contact flags and joint drives.
//!
//! ## Key Components
//!
//! -   **Body parts:** [`BodyPart`] holds the kinematic state of one skeletal
//!     segment plus its joint drive and contact flags.
//! -   **Registry:** [`JointDriveController`] is the order-stable collection
//!     of body parts. It accepts joint-target and joint-strength commands and
//!     resets parts to their rest pose.
//! -   **Reference frame:** [`OrientationFrame`] is the yaw-aligned frame
//!     anchored on the character and pointed at its target. Every
//!     character-relative vector is expressed through it.
//! -   **Contacts:** [`ContactEvent`]s are raised when a part starts or stops
//!     touching a tagged surface ([`SurfaceTag`]).
//! -   **World:** [`World`] steps a kinematic approximation of the ragdoll
//!     (gravity, joint drives, ground and stairs support) and reports contact
//!     transitions.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use physics::{BodyPart, JointDriveController, Pose, World};
//!
//! let mut parts = JointDriveController::new(400.0);
//! let root = parts.setup_body_part(BodyPart::root("seat", Pose::default()))?;
//! let mut world = World::new(parts, 0.02)?;
//! let events = world.step();
//! ```

pub mod collision;
pub mod contact;
pub mod drive;
pub mod error;
pub mod integrator;
pub mod simulation;
pub mod transform;
pub mod types;

pub use collision::Volume;
pub use contact::{ContactEvent, ContactFlags, ContactPhase, SurfaceTag};
pub use drive::JointDriveController;
pub use error::PhysicsError;
pub use simulation::World;
pub use transform::{delta_angle, euler_degrees, quat_from_euler_degrees, shortest_arc, OrientationFrame};
pub use types::{Axis, BodyPart, JointLimits, Pose, RigidBody};

pub use glam::{Quat, Vec3};
