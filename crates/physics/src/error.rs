use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PhysicsError {
    #[error("body part index {0} is out of range")]
    IndexOutOfRange(usize),
    #[error("body part {0} is registered twice")]
    DuplicateBodyPart(String),
    #[error("body part {part} references parent index {parent} which is not registered yet")]
    InvalidParent { part: String, parent: usize },
    #[error("body part registry is empty")]
    EmptyRegistry,
    #[error("body part registry has no root part")]
    NoRoot,
    #[error("timestep must be positive and finite, got {0}")]
    InvalidTimestep(String),
}
