//! Per-episode sliding window accumulator.
//!
//! Collects an episode's transitions into a window of up to N+1 states
//! and N actions/rewards. Once full, every further append slides the
//! window forward by one step, so consecutive full windows overlap in
//! all but their newest transition.
//!
//! Callers must follow the episode protocol: `reset_episode` exactly once
//! per episode before any `append`, `reset` between episodes. Violations
//! are fatal; the buffer refuses to produce an inconsistent window.

use crate::buffers::lazy_frames::{Frame, LazyFrames};
use crate::core::action::Action;

/// Fixed-capacity ring that evicts its oldest entry when pushed past
/// capacity.
#[derive(Debug)]
struct SlidingWindow<T> {
    slots: Vec<Option<T>>,
    head: usize,
    len: usize,
}

impl<T: Clone> SlidingWindow<T> {
    fn new(capacity: usize) -> Self {
        Self {
            slots: (0..capacity).map(|_| None).collect(),
            head: 0,
            len: 0,
        }
    }

    fn push(&mut self, item: T) {
        let capacity = self.slots.len();
        if self.len == capacity {
            // Full: the slot at head is the oldest; overwrite and advance.
            self.slots[self.head] = Some(item);
            self.head = (self.head + 1) % capacity;
        } else {
            let tail = (self.head + self.len) % capacity;
            self.slots[tail] = Some(item);
            self.len += 1;
        }
    }

    fn len(&self) -> usize {
        self.len
    }

    fn clear(&mut self) {
        for slot in &mut self.slots {
            *slot = None;
        }
        self.head = 0;
        self.len = 0;
    }

    fn iter(&self) -> impl Iterator<Item = &T> {
        let capacity = self.slots.len();
        (0..self.len).map(move |i| {
            self.slots[(self.head + i) % capacity]
                .as_ref()
                .expect("occupied slot")
        })
    }
}

/// A completed (or partial) trajectory window produced by
/// [`SequenceBuffer::get`].
#[derive(Debug, Clone)]
pub struct TrajectoryWindow {
    /// `len+1` states for `len` transitions, oldest first.
    pub states: LazyFrames,
    /// Actions in step order.
    pub actions: Vec<Action>,
    /// Rewards in step order; stored downstream with a trailing
    /// dimension of 1.
    pub rewards: Vec<f32>,
}

/// Sliding window over one episode's transitions.
#[derive(Debug)]
pub struct SequenceBuffer {
    num_sequences: usize,
    episode_started: bool,
    states: SlidingWindow<Frame>,
    actions: SlidingWindow<Action>,
    rewards: SlidingWindow<f32>,
}

impl SequenceBuffer {
    /// Create a buffer producing windows of `num_sequences` transitions.
    pub fn new(num_sequences: usize) -> Self {
        assert!(num_sequences > 0, "window length must be positive");
        Self {
            num_sequences,
            episode_started: false,
            states: SlidingWindow::new(num_sequences + 1),
            actions: SlidingWindow::new(num_sequences),
            rewards: SlidingWindow::new(num_sequences),
        }
    }

    /// Window length N.
    pub fn num_sequences(&self) -> usize {
        self.num_sequences
    }

    /// Discard all contents and end any episode in progress.
    pub fn reset(&mut self) {
        self.episode_started = false;
        self.states.clear();
        self.actions.clear();
        self.rewards.clear();
    }

    /// Begin a new episode with its initial observation.
    ///
    /// Panics if an episode is already in progress.
    pub fn reset_episode(&mut self, state: Frame) {
        assert!(
            !self.episode_started,
            "reset_episode called while an episode is in progress"
        );
        self.episode_started = true;
        self.states.push(state);
    }

    /// Append one transition.
    ///
    /// Panics if called before `reset_episode`. Appending past the window
    /// length slides the window, silently evicting the oldest entry.
    pub fn append(&mut self, action: Action, reward: f32, next_state: Frame) {
        assert!(
            self.episode_started,
            "append called before reset_episode"
        );
        self.actions.push(action);
        self.rewards.push(reward);
        self.states.push(next_state);
    }

    /// Snapshot the current window without mutating the buffer.
    pub fn get(&self) -> TrajectoryWindow {
        TrajectoryWindow {
            states: LazyFrames::new(self.states.iter().cloned().collect()),
            actions: self.actions.iter().cloned().collect(),
            rewards: self.rewards.iter().copied().collect(),
        }
    }

    /// Number of transitions currently held.
    pub fn len(&self) -> usize {
        self.rewards.len()
    }

    /// True iff no transitions are held.
    pub fn is_empty(&self) -> bool {
        self.rewards.len() == 0
    }

    /// True iff exactly N transitions are held.
    pub fn is_full(&self) -> bool {
        self.rewards.len() == self.num_sequences
    }
}
