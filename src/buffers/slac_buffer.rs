//! Circular replay store for fixed-length trajectory windows.
//!
//! Key characteristics:
//! - Ring-buffer eviction: once `capacity` windows are stored, each new
//!   window overwrites the oldest slot (write-then-evict, FIFO).
//! - Image observations are kept as lazily-shared frame windows and only
//!   densified at sample time; feature observations live in one flat
//!   f32 array.
//! - Two sampling surfaces over the same uniform index draw: the
//!   latent-model consumer takes the full reward sequence, the
//!   policy/critic consumer only the last step's reward.
//!
//! An internal [`SequenceBuffer`] accumulates the episode in progress;
//! completed windows are flushed here automatically by [`SlacReplayBuffer::append`].

use crate::buffers::lazy_frames::{Frame, LazyFrames};
use crate::buffers::sequence_buffer::{SequenceBuffer, TrajectoryWindow};
use crate::core::action::Action;
use crate::spaces::{ActionSpace, StateSpace};

/// Write cursor of the circular store.
///
/// `position` is the next slot to write (mod capacity) and `stored` the
/// number of valid slots. The two advance together as a unit; a later
/// multi-producer variant must keep that atomicity.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WriteCursor {
    p: usize,
    n: usize,
}

impl WriteCursor {
    fn advance(&mut self, capacity: usize) {
        self.p = (self.p + 1) % capacity;
        self.n = (self.n + 1).min(capacity);
    }

    /// Next slot to be written.
    pub fn position(&self) -> usize {
        self.p
    }

    /// Number of valid stored windows.
    pub fn stored(&self) -> usize {
        self.n
    }
}

/// Backing storage for state windows.
#[derive(Debug)]
enum StateStore {
    /// Flat `capacity × (N+1) × frame_size` array for feature states.
    Dense { data: Vec<f32> },
    /// One lazy window handle per slot for image states; adjacent
    /// windows share frame allocations.
    Lazy { windows: Vec<Option<LazyFrames>> },
}

/// Backing storage for action windows.
#[derive(Debug)]
enum ActionStore {
    /// Flat `capacity × N × dim` f32 array.
    Continuous { data: Vec<f32> },
    /// Flat `capacity × N × 1` i32 array.
    Discrete { data: Vec<i32> },
}

/// Dense state windows for a sampled batch.
#[derive(Debug, Clone, PartialEq)]
pub enum StateBatch {
    /// f32 features, shape `[B, N+1, frame…]`.
    Dense(Vec<f32>),
    /// u8 pixels, shape `[B, N+1, frame…]`, densified at sample time.
    Pixels(Vec<u8>),
}

impl StateBatch {
    /// Feature contents, panics on a pixel batch.
    pub fn as_dense(&self) -> &[f32] {
        match self {
            Self::Dense(data) => data,
            Self::Pixels(_) => panic!("expected dense state batch"),
        }
    }

    /// Pixel contents, panics on a feature batch.
    pub fn as_pixels(&self) -> &[u8] {
        match self {
            Self::Pixels(data) => data,
            Self::Dense(_) => panic!("expected pixel state batch"),
        }
    }
}

/// Action windows for a sampled batch.
#[derive(Debug, Clone, PartialEq)]
pub enum ActionBatch {
    /// f32 vectors, shape `[B, N, dim]`.
    Continuous(Vec<f32>),
    /// i32 indices, shape `[B, N, 1]`.
    Discrete(Vec<i32>),
}

impl ActionBatch {
    /// Continuous contents, panics on a discrete batch.
    pub fn as_continuous(&self) -> &[f32] {
        match self {
            Self::Continuous(data) => data,
            Self::Discrete(_) => panic!("expected continuous action batch"),
        }
    }

    /// Discrete contents, panics on a continuous batch.
    pub fn as_discrete(&self) -> &[i32] {
        match self {
            Self::Discrete(data) => data,
            Self::Continuous(_) => panic!("expected discrete action batch"),
        }
    }
}

/// Batch for latent-model training: full reward sequences.
#[derive(Debug, Clone)]
pub struct LatentBatch {
    /// State windows, shape `[B, N+1, frame…]`.
    pub states: StateBatch,
    /// Action windows.
    pub actions: ActionBatch,
    /// Rewards, shape `[B, N, 1]`.
    pub rewards: Vec<f32>,
    /// Done flags, shape `[B, 1]`.
    pub dones: Vec<f32>,
    /// Leading dimension B.
    pub batch_size: usize,
    /// Window length N.
    pub num_sequences: usize,
    /// Shape of a single frame.
    pub state_space: StateSpace,
    /// Trailing action dimension.
    pub action_dim: usize,
}

impl LatentBatch {
    /// Full shape of the state array.
    pub fn state_dims(&self) -> Vec<usize> {
        let mut dims = vec![self.batch_size, self.num_sequences + 1];
        dims.extend(self.state_space.frame_shape());
        dims
    }

    /// Full shape of the action array.
    pub fn action_dims(&self) -> [usize; 3] {
        [self.batch_size, self.num_sequences, self.action_dim]
    }

    /// Full shape of the reward array.
    pub fn reward_dims(&self) -> [usize; 3] {
        [self.batch_size, self.num_sequences, 1]
    }
}

/// Batch for policy/critic training: only the newest reward per window.
#[derive(Debug, Clone)]
pub struct SacBatch {
    /// State windows, shape `[B, N+1, frame…]`.
    pub states: StateBatch,
    /// Action windows.
    pub actions: ActionBatch,
    /// Last-step rewards, shape `[B, 1]`.
    pub rewards: Vec<f32>,
    /// Done flags, shape `[B, 1]`.
    pub dones: Vec<f32>,
    /// Leading dimension B.
    pub batch_size: usize,
    /// Window length N.
    pub num_sequences: usize,
    /// Shape of a single frame.
    pub state_space: StateSpace,
    /// Trailing action dimension.
    pub action_dim: usize,
}

/// Fixed-capacity circular store of trajectory windows.
#[derive(Debug)]
pub struct SlacReplayBuffer {
    capacity: usize,
    num_sequences: usize,
    state_space: StateSpace,
    action_space: ActionSpace,
    states: StateStore,
    actions: ActionStore,
    /// `capacity × N` rewards, trailing dimension 1.
    rewards: Vec<f32>,
    /// `capacity` done flags.
    dones: Vec<f32>,
    cursor: WriteCursor,
    seq: SequenceBuffer,
}

impl SlacReplayBuffer {
    /// Create a store for `capacity` windows of `num_sequences`
    /// transitions each.
    pub fn new(
        capacity: usize,
        state_space: StateSpace,
        action_space: ActionSpace,
        num_sequences: usize,
    ) -> Self {
        assert!(capacity > 0, "replay capacity must be positive");
        assert!(num_sequences > 0, "window length must be positive");

        let states = if state_space.is_image() {
            StateStore::Lazy {
                windows: vec![None; capacity],
            }
        } else {
            StateStore::Dense {
                data: vec![0.0; capacity * (num_sequences + 1) * state_space.frame_size()],
            }
        };
        let actions = match action_space {
            ActionSpace::Box { dim } => ActionStore::Continuous {
                data: vec![0.0; capacity * num_sequences * dim],
            },
            ActionSpace::Discrete { .. } => ActionStore::Discrete {
                data: vec![0; capacity * num_sequences],
            },
        };

        Self {
            capacity,
            num_sequences,
            state_space,
            action_space,
            states,
            actions,
            rewards: vec![0.0; capacity * num_sequences],
            dones: vec![0.0; capacity],
            cursor: WriteCursor::default(),
            seq: SequenceBuffer::new(num_sequences),
        }
    }

    /// Begin a new episode with its initial observation.
    ///
    /// Must be called before every episode's first `append`.
    pub fn reset_episode(&mut self, state: Frame) {
        self.assert_frame(&state);
        self.seq.reset_episode(state);
    }

    /// Append one transition.
    ///
    /// When the internal window becomes full it is flushed into the
    /// circular store together with `done` (the bootstrap mask of the
    /// newest step). When `episode_done` is set, the partial window of
    /// the finished episode is discarded and the next episode must start
    /// with `reset_episode`.
    pub fn append(
        &mut self,
        action: Action,
        reward: f32,
        done: bool,
        next_state: Frame,
        episode_done: bool,
    ) {
        assert!(
            action.matches(&self.action_space),
            "action does not fit the action space"
        );
        self.assert_frame(&next_state);

        self.seq.append(action, reward, next_state);
        if self.seq.is_full() {
            let window = self.seq.get();
            self.write_window(&window, done);
        }
        if episode_done {
            self.seq.reset();
        }
    }

    /// Sample for the latent/dynamics objective: full reward sequences.
    ///
    /// Draws `batch_size` slots uniformly at random with replacement
    /// from the valid range. Panics if the buffer is empty.
    pub fn sample_latent(&self, batch_size: usize) -> LatentBatch {
        let idxes = self.sample_indices(batch_size);
        let (states, actions, dones) = self.gather(&idxes);

        let n = self.num_sequences;
        let mut rewards = Vec::with_capacity(batch_size * n);
        for &idx in &idxes {
            rewards.extend_from_slice(&self.rewards[idx * n..(idx + 1) * n]);
        }

        LatentBatch {
            states,
            actions,
            rewards,
            dones,
            batch_size,
            num_sequences: n,
            state_space: self.state_space,
            action_dim: self.action_space.action_dim(),
        }
    }

    /// Sample for the policy/critic objective: newest reward only.
    ///
    /// Same index draw as [`sample_latent`](Self::sample_latent), but the
    /// reward array is the last time-step slice.
    pub fn sample_sac(&self, batch_size: usize) -> SacBatch {
        let idxes = self.sample_indices(batch_size);
        let (states, actions, dones) = self.gather(&idxes);

        let n = self.num_sequences;
        let rewards = idxes.iter().map(|&idx| self.rewards[idx * n + n - 1]).collect();

        SacBatch {
            states,
            actions,
            rewards,
            dones,
            batch_size,
            num_sequences: n,
            state_space: self.state_space,
            action_dim: self.action_space.action_dim(),
        }
    }

    /// Number of valid stored windows.
    pub fn len(&self) -> usize {
        self.cursor.stored()
    }

    /// True iff nothing has been stored yet.
    pub fn is_empty(&self) -> bool {
        self.cursor.stored() == 0
    }

    /// Maximum number of stored windows.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Fill fraction in `[0, 1]`.
    pub fn utilization(&self) -> f32 {
        self.cursor.stored() as f32 / self.capacity as f32
    }

    /// Window length N.
    pub fn num_sequences(&self) -> usize {
        self.num_sequences
    }

    /// Current write cursor.
    pub fn cursor(&self) -> WriteCursor {
        self.cursor
    }

    pub fn state_space(&self) -> StateSpace {
        self.state_space
    }

    pub fn action_space(&self) -> ActionSpace {
        self.action_space
    }

    fn assert_frame(&self, frame: &Frame) {
        assert_eq!(
            frame.is_pixels(),
            self.state_space.is_image(),
            "frame kind does not match the state space"
        );
        assert_eq!(
            frame.len(),
            self.state_space.frame_size(),
            "frame size does not match the state space"
        );
    }

    fn write_window(&mut self, window: &TrajectoryWindow, done: bool) {
        let p = self.cursor.position();
        let n = self.num_sequences;
        debug_assert_eq!(window.rewards.len(), n);
        debug_assert_eq!(window.states.len(), n + 1);

        match &mut self.states {
            StateStore::Dense { data } => {
                let frame_size = self.state_space.frame_size();
                let mut offset = p * (n + 1) * frame_size;
                for frame in window.states.frames() {
                    data[offset..offset + frame_size].copy_from_slice(frame.as_features());
                    offset += frame_size;
                }
            }
            StateStore::Lazy { windows } => {
                // Shares the frame allocations with the sequence buffer
                // and with the neighboring stored windows.
                windows[p] = Some(window.states.clone());
            }
        }

        match &mut self.actions {
            ActionStore::Continuous { data } => {
                let dim = self.action_space.action_dim();
                let mut offset = p * n * dim;
                for action in &window.actions {
                    data[offset..offset + dim].copy_from_slice(action.as_continuous());
                    offset += dim;
                }
            }
            ActionStore::Discrete { data } => {
                for (i, action) in window.actions.iter().enumerate() {
                    data[p * n + i] = action.as_discrete() as i32;
                }
            }
        }

        self.rewards[p * n..(p + 1) * n].copy_from_slice(&window.rewards);
        self.dones[p] = if done { 1.0 } else { 0.0 };

        let was_full = self.cursor.stored() == self.capacity;
        self.cursor.advance(self.capacity);
        if !was_full && self.cursor.stored() == self.capacity {
            log::debug!(
                "replay buffer reached capacity ({} windows), evicting oldest",
                self.capacity
            );
        }
    }

    fn sample_indices(&self, batch_size: usize) -> Vec<usize> {
        let n = self.cursor.stored();
        assert!(n > 0, "cannot sample from an empty replay buffer");
        (0..batch_size).map(|_| fastrand::usize(..n)).collect()
    }

    fn gather(&self, idxes: &[usize]) -> (StateBatch, ActionBatch, Vec<f32>) {
        let n = self.num_sequences;

        let states = match &self.states {
            StateStore::Dense { data } => {
                let window_size = (n + 1) * self.state_space.frame_size();
                let mut out = Vec::with_capacity(idxes.len() * window_size);
                for &idx in idxes {
                    out.extend_from_slice(&data[idx * window_size..(idx + 1) * window_size]);
                }
                StateBatch::Dense(out)
            }
            StateStore::Lazy { windows } => {
                let window_size = (n + 1) * self.state_space.frame_size();
                let mut out = Vec::with_capacity(idxes.len() * window_size);
                for &idx in idxes {
                    let window = windows[idx].as_ref().expect("sampled slot is initialized");
                    out.extend(window.materialize_u8());
                }
                StateBatch::Pixels(out)
            }
        };

        let actions = match &self.actions {
            ActionStore::Continuous { data } => {
                let window_size = n * self.action_space.action_dim();
                let mut out = Vec::with_capacity(idxes.len() * window_size);
                for &idx in idxes {
                    out.extend_from_slice(&data[idx * window_size..(idx + 1) * window_size]);
                }
                ActionBatch::Continuous(out)
            }
            ActionStore::Discrete { data } => {
                let mut out = Vec::with_capacity(idxes.len() * n);
                for &idx in idxes {
                    out.extend_from_slice(&data[idx * n..(idx + 1) * n]);
                }
                ActionBatch::Discrete(out)
            }
        };

        let dones = idxes.iter().map(|&idx| self.dones[idx]).collect();

        (states, actions, dones)
    }

    /// Rewards stored at a valid slot, oldest step first.
    ///
    /// Slot inspection for debugging and tests; `slot` must be below
    /// [`len`](Self::len).
    pub fn stored_rewards(&self, slot: usize) -> &[f32] {
        assert!(slot < self.cursor.stored(), "slot {} is not valid", slot);
        let n = self.num_sequences;
        &self.rewards[slot * n..(slot + 1) * n]
    }

    /// Done flag stored at a valid slot.
    pub fn stored_done(&self, slot: usize) -> f32 {
        assert!(slot < self.cursor.stored(), "slot {} is not valid", slot);
        self.dones[slot]
    }

    /// Lazily stored state window at a valid slot, if states are images.
    pub fn stored_state_window(&self, slot: usize) -> Option<&LazyFrames> {
        assert!(slot < self.cursor.stored(), "slot {} is not valid", slot);
        match &self.states {
            StateStore::Lazy { windows } => windows[slot].as_ref(),
            StateStore::Dense { .. } => None,
        }
    }
}
