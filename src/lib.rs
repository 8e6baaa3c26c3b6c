//! # sequence_rl: replay machinery for sequence-aware off-policy RL
//!
//! Training-side components for latent-variable and discrete-action
//! soft actor-critic agents that learn from fixed-length trajectory
//! windows rather than single transitions.
//!
//! ## Data flow
//!
//! ```text
//! Environment ──step──> EpisodeCollector
//!                            │ reset_episode / append
//!                            ▼
//!                      SequenceBuffer          (per-episode sliding window)
//!                            │ full window
//!                            ▼
//!                      SlacReplayBuffer        (circular store, FIFO eviction)
//!                       │             │
//!              sample_latent     sample_sac
//!                       │             │
//!                       ▼             ▼
//!               latent-model      policy/critic
//!               training          training
//! ```
//!
//! Image observations are held as lazily-shared frames: consecutive
//! windows overlap in all but one frame, so each frame is stored once
//! and densified only when sampled.
//!
//! Gradient computation, network construction and the optimizer loop
//! are external collaborators; this crate supplies the storage,
//! sampling, episode bookkeeping and target-network synchronization
//! they plug into.

pub mod buffers;
pub mod collector;
pub mod core;
pub mod environment;
pub mod metrics;
pub mod sac_discrete;
pub mod spaces;

pub use crate::buffers::lazy_frames::{Frame, LazyFrames};
pub use crate::buffers::sequence_buffer::{SequenceBuffer, TrajectoryWindow};
pub use crate::buffers::slac_buffer::{
    ActionBatch, LatentBatch, SacBatch, SlacReplayBuffer, StateBatch, WriteCursor,
};
pub use crate::collector::{CollectorConfig, EpisodeCollector};
pub use crate::core::action::Action;
pub use crate::core::episode_state::EpisodeState;
pub use crate::core::target_network::{hard_copy, soft_update, TargetSync, TargetSyncConfig};
pub use crate::environment::{Environment, StepOutcome};
pub use crate::metrics::logger::{ConsoleLogger, CsvLogger, MetricsLogger, TrainingSnapshot};
pub use crate::sac_discrete::SacDiscreteConfig;
pub use crate::spaces::{ActionSpace, StateSpace};
