//! Episode termination classification.
//!
//! Distinguishes genuine termination (absorbing state) from truncation
//! (time limit). The replay buffer stores a done-mask that disables value
//! bootstrapping only for genuine terminals: an episode that reports done
//! exactly at the step limit is treated as truncated and keeps its
//! bootstrap, so the stored mask is 0.

/// How an episode step left the episode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum EpisodeState {
    /// Episode is ongoing.
    #[default]
    Running,
    /// Episode reached an absorbing state.
    Terminal,
    /// Episode was cut by an external limit.
    Truncated,
}

impl EpisodeState {
    /// Classify from explicit terminal/truncated flags.
    ///
    /// Terminal takes precedence when both are set.
    pub fn from_flags(terminal: bool, truncated: bool) -> Self {
        if terminal {
            Self::Terminal
        } else if truncated {
            Self::Truncated
        } else {
            Self::Running
        }
    }

    /// Classify a raw `done` flag using the time-limit heuristic.
    ///
    /// `step_in_episode` counts steps taken in the current episode,
    /// starting at 1 for the first step. A done reported exactly at
    /// `max_episode_steps` is attributed to the time limit.
    pub fn from_step(done: bool, step_in_episode: usize, max_episode_steps: Option<usize>) -> Self {
        match (done, max_episode_steps) {
            (false, _) => Self::Running,
            (true, Some(limit)) if step_in_episode == limit => Self::Truncated,
            (true, _) => Self::Terminal,
        }
    }

    /// Done-mask stored alongside a transition: 1.0 kills the bootstrap.
    pub fn mask(&self) -> f32 {
        match self {
            Self::Terminal => 1.0,
            Self::Running | Self::Truncated => 0.0,
        }
    }

    /// Whether the episode ended, for either reason.
    pub fn is_done(&self) -> bool {
        !matches!(self, Self::Running)
    }

    /// Whether the episode truly terminated.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Terminal)
    }

    /// Whether the episode was truncated.
    pub fn is_truncated(&self) -> bool {
        matches!(self, Self::Truncated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_flags() {
        assert_eq!(EpisodeState::from_flags(false, false), EpisodeState::Running);
        assert_eq!(EpisodeState::from_flags(true, false), EpisodeState::Terminal);
        assert_eq!(EpisodeState::from_flags(false, true), EpisodeState::Truncated);
        // Terminal wins when both are set
        assert_eq!(EpisodeState::from_flags(true, true), EpisodeState::Terminal);
    }

    #[test]
    fn test_time_limit_heuristic() {
        let limit = Some(200);

        // Done before the limit is a genuine terminal
        let state = EpisodeState::from_step(true, 57, limit);
        assert!(state.is_terminal());
        assert_eq!(state.mask(), 1.0);

        // Done exactly at the limit is truncation, bootstrap preserved
        let state = EpisodeState::from_step(true, 200, limit);
        assert!(state.is_truncated());
        assert_eq!(state.mask(), 0.0);

        // Not done at all
        let state = EpisodeState::from_step(false, 200, limit);
        assert!(!state.is_done());
        assert_eq!(state.mask(), 0.0);
    }

    #[test]
    fn test_no_limit_always_terminal() {
        let state = EpisodeState::from_step(true, 1_000_000, None);
        assert!(state.is_terminal());
        assert_eq!(state.mask(), 1.0);
    }
}
