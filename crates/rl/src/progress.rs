//! Climb progress tracking.

/// Distances to the target over one Climb episode. A distance still zero on
/// the first tick is taken from that tick's distance.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct ProgressState {
    pub previous_distance: f32,
    pub initial_distance: f32,
    /// Monotonically non-increasing within an episode.
    pub closest_distance: f32,
    /// Tick at which `closest_distance` last improved.
    pub last_progress_tick: u32,
    seeded: bool,
    stalled: bool,
}

impl ProgressState {
    /// State at episode start: every distance seeded from `distance`.
    #[must_use]
    pub fn start(distance: f32) -> Self {
        Self {
            previous_distance: distance,
            initial_distance: distance,
            closest_distance: distance,
            last_progress_tick: 0,
            seeded: false,
            stalled: false,
        }
    }

    /// Progress made since the previous tick, as a fraction of the initial
    /// distance. Negative when the character moved away.
    pub fn advance(&mut self, tick: u32, distance: f32) -> f32 {
        if !self.seeded {
            self.seed(distance);
        }

        let progress = self.previous_distance - distance;
        let score = if progress == 0.0 || self.initial_distance == 0.0 {
            0.0
        } else {
            progress / self.initial_distance
        };

        if distance < self.closest_distance {
            self.closest_distance = distance;
            self.last_progress_tick = tick;
        }
        self.previous_distance = distance;
        score
    }

    fn seed(&mut self, distance: f32) {
        self.seeded = true;
        if self.previous_distance == 0.0 {
            self.previous_distance = distance;
        }
        if self.initial_distance == 0.0 {
            self.initial_distance = distance;
        }
        if self.closest_distance == 0.0 {
            self.closest_distance = distance;
        }
    }

    /// True exactly once: on the first tick more than `max_steps` ticks past
    /// the last improvement.
    pub fn check_stall(&mut self, tick: u32, max_steps: u32) -> bool {
        if self.stalled || tick.saturating_sub(self.last_progress_tick) <= max_steps {
            return false;
        }
        self.stalled = true;
        true
    }

    #[must_use]
    pub fn is_stalled(&self) -> bool {
        self.stalled
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn score_is_relative_to_initial_distance() {
        let mut state = ProgressState::start(10.0);
        assert_relative_eq!(state.advance(1, 8.0), 0.2);

        let mut state = ProgressState::start(10.0);
        assert_relative_eq!(state.advance(1, 12.0), -0.2);
        assert_relative_eq!(state.closest_distance, 10.0);
    }

    #[test]
    fn unseeded_state_takes_first_distance() {
        let mut state = ProgressState::default();
        assert_relative_eq!(state.advance(1, 5.0), 0.0);
        assert_relative_eq!(state.initial_distance, 5.0);
        assert_relative_eq!(state.closest_distance, 5.0);
    }

    #[test]
    fn zero_distance_target_never_divides_by_zero() {
        let mut state = ProgressState::start(0.0);
        let score = state.advance(1, 0.0);
        assert!(score.is_finite());
        assert_relative_eq!(score, 0.0);
    }

    #[test]
    fn closest_only_decreases() {
        let mut state = ProgressState::start(10.0);
        for (tick, d) in [(1, 9.0), (2, 9.5), (3, 7.0), (4, 8.0)] {
            state.advance(tick, d);
        }
        assert_relative_eq!(state.closest_distance, 7.0);
        assert_eq!(state.last_progress_tick, 3);
        assert_relative_eq!(state.previous_distance, 8.0);
    }

    #[test]
    fn reaching_the_target_is_not_forgotten() {
        let mut state = ProgressState::start(10.0);
        state.advance(1, 0.0);
        assert_relative_eq!(state.closest_distance, 0.0);

        assert_relative_eq!(state.advance(2, 3.0), -0.3);
        assert_relative_eq!(state.closest_distance, 0.0);
        assert_relative_eq!(state.initial_distance, 10.0);
        assert_eq!(state.last_progress_tick, 1);
        assert!(!state.check_stall(201, 200));
        assert!(state.check_stall(202, 200));
    }

    #[test]
    fn stall_fires_once_after_threshold() {
        let mut state = ProgressState::start(10.0);
        let fired: Vec<u32> = (1..=400).filter(|&tick| state.check_stall(tick, 200)).collect();
        assert_eq!(fired, [201]);
        assert!(state.is_stalled());
    }
}
