//! Target-network synchronization.
//!
//! Temporal-difference targets bootstrap from a slowly-moving copy of the
//! value network. Two update styles are supported:
//!
//! - soft: `θ_target = τ·θ_online + (1-τ)·θ_target` every sync point
//! - hard: full weight copy every `sync_interval` gradient steps
//!
//! Discrete-action SAC conventionally uses hard copies on a long interval;
//! continuous SAC uses soft updates with a small τ.

use burn::module::{Module, ModuleMapper, ParamId};
use burn::prelude::*;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Collects a module's float parameters, flattened to 1-D.
///
/// Parameters are gathered in traversal order, which is deterministic for
/// two modules of the same architecture; matching by order sidesteps the
/// differing `ParamId`s of independently initialized models.
struct CollectParams<B: Backend> {
    params: Vec<Tensor<B, 1>>,
}

impl<B: Backend> ModuleMapper<B> for CollectParams<B> {
    fn map_float<const D: usize>(&mut self, _id: ParamId, tensor: Tensor<B, D>) -> Tensor<B, D> {
        let total: usize = tensor.dims().iter().product();
        self.params.push(tensor.clone().reshape([total]));
        tensor
    }
}

/// Interpolates target parameters towards a collected set of online
/// parameters: `θ_target = τ·θ_online + (1-τ)·θ_target`.
struct Interpolate<B: Backend> {
    online: Vec<Tensor<B, 1>>,
    tau: f32,
    index: usize,
}

impl<B: Backend> ModuleMapper<B> for Interpolate<B> {
    fn map_float<const D: usize>(&mut self, _id: ParamId, tensor: Tensor<B, D>) -> Tensor<B, D> {
        let shape = tensor.dims();
        let total: usize = shape.iter().product();

        let idx = self.index;
        self.index += 1;

        match self.online.get(idx) {
            Some(online) => {
                let mixed = online.clone().mul_scalar(self.tau)
                    + tensor.reshape([total]).mul_scalar(1.0 - self.tau);
                mixed.reshape(shape)
            }
            // Architectures diverged; leave the parameter untouched.
            None => tensor,
        }
    }
}

/// Polyak-average the target model towards the online model.
///
/// `tau = 1.0` degenerates to a hard copy and `tau = 0.0` to a no-op;
/// both short-circuit without touching parameters.
pub fn soft_update<B, M>(online: &M, target: M, tau: f32) -> M
where
    B: Backend,
    M: Module<B>,
{
    if (tau - 1.0).abs() < 1e-6 {
        return online.clone();
    }
    if tau.abs() < 1e-6 {
        return target;
    }

    let mut collect = CollectParams { params: Vec::new() };
    let _ = online.clone().map(&mut collect);

    let mut interpolate = Interpolate {
        online: collect.params,
        tau,
        index: 0,
    };
    target.map(&mut interpolate)
}

/// Replace target weights with a copy of the online weights.
pub fn hard_copy<B, M>(online: &M) -> M
where
    B: Backend,
    M: Module<B>,
{
    online.clone()
}

/// How and when to synchronize a target network.
#[derive(Debug, Clone, PartialEq)]
pub struct TargetSyncConfig {
    /// Interpolation coefficient for soft updates.
    pub tau: f32,
    /// Gradient steps between sync points.
    pub sync_interval: usize,
    /// Use full copies instead of interpolation.
    pub hard: bool,
}

impl Default for TargetSyncConfig {
    fn default() -> Self {
        Self::soft(0.005)
    }
}

impl TargetSyncConfig {
    /// Soft updates with coefficient `tau` at every step.
    pub fn soft(tau: f32) -> Self {
        Self {
            tau,
            sync_interval: 1,
            hard: false,
        }
    }

    /// Hard copies every `sync_interval` steps.
    pub fn hard(sync_interval: usize) -> Self {
        assert!(sync_interval > 0, "sync interval must be positive");
        Self {
            tau: 1.0,
            sync_interval,
            hard: true,
        }
    }
}

/// Counts gradient steps and applies the configured sync policy.
///
/// The step counter is atomic so `maybe_sync` takes `&self`; the manager
/// can be shared by reference with the code driving gradient steps.
#[derive(Debug)]
pub struct TargetSync {
    config: TargetSyncConfig,
    steps: AtomicUsize,
}

impl TargetSync {
    pub fn new(config: TargetSyncConfig) -> Self {
        Self {
            config,
            steps: AtomicUsize::new(0),
        }
    }

    /// Advance the step counter and sync the target if the policy says so.
    ///
    /// Returns the (possibly replaced) target model.
    pub fn maybe_sync<B, M>(&self, online: &M, target: M) -> M
    where
        B: Backend,
        M: Module<B>,
    {
        let step = self.steps.fetch_add(1, Ordering::Relaxed) + 1;
        if step % self.config.sync_interval != 0 {
            return target;
        }
        if self.config.hard {
            hard_copy(online)
        } else {
            soft_update(online, target, self.config.tau)
        }
    }

    /// Gradient steps seen so far.
    pub fn steps(&self) -> usize {
        self.steps.load(Ordering::Relaxed)
    }

    pub fn config(&self) -> &TargetSyncConfig {
        &self.config
    }
}
