//! SAC-Discrete hyperparameters and update cadence.
//!
//! Covers the training-side knobs that sit outside the gradient
//! computation itself: replay/batch sizing, warm-up length, update
//! intervals, the entropy target for automatic temperature tuning, and
//! the target-network sync policy (hard copies on a long interval, the
//! discrete-action convention).

use serde::{Deserialize, Serialize};

use crate::core::target_network::TargetSyncConfig;

/// Hyperparameters for SAC with a discrete action space.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SacDiscreteConfig {
    /// Discount factor.
    pub gamma: f32,

    /// Replay buffer capacity (transitions or windows, per buffer kind).
    pub buffer_size: usize,

    /// Batch size for gradient steps.
    pub batch_size: usize,

    /// Environment steps of random-action warm-up before learning.
    pub start_steps: usize,

    /// Environment steps between gradient updates.
    pub update_interval: usize,

    /// Gradient steps between target-network copies.
    pub update_interval_target: usize,

    /// Actor learning rate.
    pub lr_actor: f64,

    /// Critic learning rate.
    pub lr_critic: f64,

    /// Temperature (alpha) learning rate.
    pub lr_alpha: f64,

    /// Actor hidden layer widths.
    pub units_actor: Vec<usize>,

    /// Critic hidden layer widths.
    pub units_critic: Vec<usize>,

    /// Fraction of maximum entropy used as the tuning target.
    pub target_entropy_scale: f32,
}

impl Default for SacDiscreteConfig {
    fn default() -> Self {
        Self {
            gamma: 0.99,
            buffer_size: 1_000_000,
            batch_size: 256,
            start_steps: 1_000,
            update_interval: 1,
            update_interval_target: 1_000,
            lr_actor: 3e-4,
            lr_critic: 3e-4,
            lr_alpha: 3e-4,
            units_actor: vec![512],
            units_critic: vec![512],
            target_entropy_scale: 0.98,
        }
    }
}

impl SacDiscreteConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the discount factor.
    pub fn with_gamma(mut self, gamma: f32) -> Self {
        self.gamma = gamma;
        self
    }

    /// Set the replay buffer capacity.
    pub fn with_buffer_size(mut self, buffer_size: usize) -> Self {
        self.buffer_size = buffer_size;
        self
    }

    /// Set the batch size.
    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size;
        self
    }

    /// Set the random-action warm-up length.
    pub fn with_start_steps(mut self, start_steps: usize) -> Self {
        self.start_steps = start_steps;
        self
    }

    /// Set the target-network copy interval.
    pub fn with_update_interval_target(mut self, interval: usize) -> Self {
        self.update_interval_target = interval;
        self
    }

    /// Entropy target for automatic temperature tuning.
    ///
    /// A fraction of the maximum policy entropy `ln |A|`:
    /// `-ln(1/|A|) * scale`.
    pub fn target_entropy(&self, n_actions: usize) -> f32 {
        assert!(n_actions > 0, "discrete space must have at least one action");
        -(1.0 / n_actions as f32).ln() * self.target_entropy_scale
    }

    /// Target-network sync policy: hard copies every
    /// `update_interval_target` gradient steps.
    pub fn target_sync(&self) -> TargetSyncConfig {
        TargetSyncConfig::hard(self.update_interval_target)
    }

    /// Whether `env_step` still falls in the random-action warm-up.
    pub fn in_warmup(&self, env_step: usize) -> bool {
        env_step <= self.start_steps
    }

    /// Whether a gradient update is due at `env_step`.
    pub fn update_due(&self, env_step: usize) -> bool {
        !self.in_warmup(env_step) && env_step % self.update_interval == 0
    }
}
