//! Replay storage for sequence-aware off-policy training.
//!
//! - `LazyFrames`: shared observation frames, densified on demand
//! - `SequenceBuffer`: per-episode sliding window accumulator
//! - `SlacReplayBuffer`: circular store of completed trajectory windows
//!   with uniform sampling for the latent-model and policy/critic
//!   consumers

pub mod lazy_frames;
pub mod sequence_buffer;
pub mod slac_buffer;

pub use lazy_frames::{Frame, LazyFrames};
pub use sequence_buffer::{SequenceBuffer, TrajectoryWindow};
pub use slac_buffer::{
    ActionBatch, LatentBatch, SacBatch, SlacReplayBuffer, StateBatch, WriteCursor,
};

#[cfg(test)]
mod tests;
