use physics::PhysicsError;
use thiserror::Error;

/// Configuration errors of the control core. None of these are recoverable
/// at runtime: an agent that hits one refuses to run.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RlError {
    #[error("action vector has {actual} values, topology {topology} expects {expected}")]
    ActionLengthMismatch {
        topology: String,
        expected: usize,
        actual: usize,
    },
    #[error("body part registry is empty")]
    EmptyRegistry,
    #[error("topology part {0} is missing from the body part registry")]
    MissingBodyPart(String),
    #[error("topology {topology} has {expected} parts but the registry holds {actual}")]
    RegistrySizeMismatch {
        topology: String,
        expected: usize,
        actual: usize,
    },
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    #[error(transparent)]
    Physics(#[from] PhysicsError),
}
