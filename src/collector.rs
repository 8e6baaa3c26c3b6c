//! Environment interaction loop feeding the replay buffer.
//!
//! Owns the episode protocol so callers cannot get it wrong: the initial
//! observation of every episode is registered with `reset_episode`, each
//! step is appended with a done-mask that attributes time-limit hits to
//! truncation, and a finished episode triggers an environment reset and
//! a fresh buffer episode.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

use crate::buffers::lazy_frames::Frame;
use crate::buffers::slac_buffer::SlacReplayBuffer;
use crate::core::action::Action;
use crate::core::episode_state::EpisodeState;
use crate::environment::{Environment, StepOutcome};
use crate::metrics::logger::{MetricsLogger, TrainingSnapshot};

/// Configuration for the collection loop.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CollectorConfig {
    /// Environment steps between logged snapshots.
    pub snapshot_interval: usize,
    /// Number of recent episodes averaged for the reported return.
    pub return_window: usize,
}

impl Default for CollectorConfig {
    fn default() -> Self {
        Self {
            snapshot_interval: 1_000,
            return_window: 100,
        }
    }
}

/// Drives a single environment through the buffer episode protocol.
pub struct EpisodeCollector<E: Environment> {
    env: E,
    config: CollectorConfig,
    /// Current observation, the next step's input.
    state: Frame,
    /// The next step must register a fresh episode with the buffer.
    needs_episode_reset: bool,
    episode_step: usize,
    episode_return: f32,
    env_steps: usize,
    episodes: usize,
    recent_returns: VecDeque<f32>,
}

impl<E: Environment> EpisodeCollector<E> {
    /// Reset the environment and wrap it for collection.
    pub fn new(mut env: E, config: CollectorConfig) -> Self {
        let state = env.reset();
        Self {
            env,
            config,
            state,
            needs_episode_reset: true,
            episode_step: 0,
            episode_return: 0.0,
            env_steps: 0,
            episodes: 0,
            recent_returns: VecDeque::new(),
        }
    }

    /// Take one environment step and append it to the buffer.
    ///
    /// The policy sees the current observation and picks the action.
    pub fn step<P>(&mut self, buffer: &mut SlacReplayBuffer, policy: P)
    where
        P: FnOnce(&Frame) -> Action,
    {
        if self.needs_episode_reset {
            buffer.reset_episode(self.state.clone());
            self.needs_episode_reset = false;
        }

        let action = policy(&self.state);
        let StepOutcome {
            next_state,
            reward,
            done,
        } = self.env.step(&action);
        self.env_steps += 1;
        self.episode_step += 1;
        self.episode_return += reward;

        let outcome = EpisodeState::from_step(done, self.episode_step, self.env.max_episode_steps());
        buffer.append(action, reward, outcome.is_terminal(), next_state.clone(), done);

        if done {
            self.episodes += 1;
            if self.recent_returns.len() == self.config.return_window {
                self.recent_returns.pop_front();
            }
            self.recent_returns.push_back(self.episode_return);
            log::debug!(
                "episode {} finished after {} steps, return {:.2}",
                self.episodes,
                self.episode_step,
                self.episode_return
            );

            self.episode_step = 0;
            self.episode_return = 0.0;
            self.state = self.env.reset();
            self.needs_episode_reset = true;
        } else {
            self.state = next_state;
        }
    }

    /// Run `steps` environment steps, logging snapshots on the
    /// configured interval.
    pub fn collect<P>(
        &mut self,
        buffer: &mut SlacReplayBuffer,
        steps: usize,
        mut policy: P,
        logger: &mut dyn MetricsLogger,
    ) where
        P: FnMut(&Frame) -> Action,
    {
        for _ in 0..steps {
            self.step(buffer, &mut policy);
            if self.env_steps % self.config.snapshot_interval == 0 {
                logger.log(&self.snapshot(buffer));
            }
        }
        logger.flush();
    }

    /// Current collection snapshot.
    pub fn snapshot(&self, buffer: &SlacReplayBuffer) -> TrainingSnapshot {
        let avg_return = if self.recent_returns.is_empty() {
            0.0
        } else {
            self.recent_returns.iter().sum::<f32>() / self.recent_returns.len() as f32
        };
        TrainingSnapshot {
            env_steps: self.env_steps,
            episodes: self.episodes,
            avg_return,
            buffer_len: buffer.len(),
            buffer_utilization: buffer.utilization(),
        }
    }

    /// Total environment steps taken.
    pub fn env_steps(&self) -> usize {
        self.env_steps
    }

    /// Completed episodes.
    pub fn episodes(&self) -> usize {
        self.episodes
    }

    /// The current observation.
    pub fn state(&self) -> &Frame {
        &self.state
    }

    /// The wrapped environment.
    pub fn env(&self) -> &E {
        &self.env
    }
}
