//! Headless episodes under a uniform random policy.

use anyhow::Result;
use rl::{Env, RagdollEnv, Termination};
use tracing::info;

#[derive(Clone, Debug, PartialEq)]
pub struct EpisodeSummary {
    pub episode: u32,
    pub steps: u32,
    pub total_reward: f32,
    /// `None` when the step budget ran out first.
    pub termination: Option<Termination>,
}

/// Actions uniform in `[-1, 1]`.
pub struct RandomPolicy {
    rng: fastrand::Rng,
}

impl RandomPolicy {
    #[must_use]
    pub fn new(seed: u64) -> Self {
        Self {
            rng: fastrand::Rng::with_seed(seed),
        }
    }

    pub fn act(&mut self, action_size: usize) -> Vec<f32> {
        (0..action_size).map(|_| self.rng.f32() * 2.0 - 1.0).collect()
    }
}

/// Runs `episodes` episodes of at most `max_steps` ticks each.
///
/// # Errors
///
/// Propagates any environment error.
pub fn run(
    env: &mut RagdollEnv,
    policy: &mut RandomPolicy,
    episodes: u32,
    max_steps: u32,
) -> Result<Vec<EpisodeSummary>> {
    let mut summaries = Vec::with_capacity(episodes as usize);
    for episode in 0..episodes {
        env.reset()?;
        let mut steps = 0;
        let mut total_reward = 0.0;
        while steps < max_steps {
            let action = policy.act(env.action_size());
            let (_, reward, done) = env.step(&action)?;
            steps += 1;
            total_reward += reward;
            if done {
                break;
            }
        }
        let termination = env.agent().signal().termination();
        info!(episode, steps, total_reward, ?termination, "episode finished");
        summaries.push(EpisodeSummary {
            episode,
            steps,
            total_reward,
            termination,
        });
    }
    Ok(summaries)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn actions_stay_in_range() {
        let mut policy = RandomPolicy::new(1);
        let action = policy.act(1000);
        assert_eq!(action.len(), 1000);
        assert!(action.iter().all(|a| (-1.0..=1.0).contains(a)));
    }

    #[test]
    fn same_seed_same_actions() {
        assert_eq!(RandomPolicy::new(9).act(34), RandomPolicy::new(9).act(34));
    }
}
