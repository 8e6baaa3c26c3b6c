//! Environment abstraction consumed by the data-collection layer.

use crate::buffers::lazy_frames::Frame;
use crate::core::action::Action;
use crate::spaces::{ActionSpace, StateSpace};

/// Result of stepping an environment once.
#[derive(Debug, Clone)]
pub struct StepOutcome {
    /// Observation after the step.
    pub next_state: Frame,
    /// Reward received.
    pub reward: f32,
    /// Raw done flag as reported by the environment. Time-limit
    /// attribution is the caller's job (see [`crate::EpisodeState`]).
    pub done: bool,
}

/// A single sequential environment.
pub trait Environment {
    /// Observation space descriptor.
    fn state_space(&self) -> StateSpace;

    /// Action space descriptor.
    fn action_space(&self) -> ActionSpace;

    /// Step limit after which episodes are truncated, if any.
    fn max_episode_steps(&self) -> Option<usize> {
        None
    }

    /// Reset to the start of a new episode and return the initial
    /// observation.
    fn reset(&mut self) -> Frame;

    /// Apply an action and advance one step.
    fn step(&mut self, action: &Action) -> StepOutcome;
}
