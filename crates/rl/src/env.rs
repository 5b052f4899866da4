use crate::error::RlError;

/// Reinforcement learning environment trait.
///
/// Each call to [`step`] advances the simulation by one action and returns
/// the new observation vector, the reward earned by that action, and whether
/// the episode has terminated.
///
/// [`step`]: Env::step
pub trait Env {
    /// Advance the environment by one action.
    ///
    /// Returns `(obs, reward, done)`.
    ///
    /// # Errors
    ///
    /// Fails when the action does not fit the action space.
    fn step(&mut self, action: &[f32]) -> Result<(Vec<f32>, f32, bool), RlError>;

    /// Reset the environment to its starting state and return the initial
    /// observation vector.
    ///
    /// # Errors
    ///
    /// Fails when the environment cannot be put into a valid starting state.
    fn reset(&mut self) -> Result<Vec<f32>, RlError>;

    /// Size of the observation vector.
    fn obs_size(&self) -> usize;

    /// Size of the action space.
    fn action_size(&self) -> usize;
}
