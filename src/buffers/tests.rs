//! Cross-module tests for the replay storage stack.
//!
//! Covers the behaviors that span the sequence buffer and the circular
//! store: flush-on-full, FIFO eviction, the two sampling surfaces over a
//! shared index draw, and lazy image windows.

use super::*;
use crate::core::action::Action;
use crate::spaces::{ActionSpace, StateSpace};

/// One-element feature frame carrying `value`.
fn frame(value: f32) -> Frame {
    Frame::features(vec![value])
}

/// 2x2 single-channel pixel frame filled with `value`.
fn pixel_frame(value: u8) -> Frame {
    Frame::pixels(vec![value; 4])
}

/// Buffer over a scalar state and discrete actions, fed with one long
/// episode of `steps` appends. Rewards are the step index, actions the
/// step index mod 4.
fn fed_buffer(capacity: usize, num_sequences: usize, steps: usize) -> SlacReplayBuffer {
    let mut buffer = SlacReplayBuffer::new(
        capacity,
        StateSpace::vector(1),
        ActionSpace::discrete(4),
        num_sequences,
    );
    buffer.reset_episode(frame(0.0));
    for step in 0..steps {
        buffer.append(
            Action::Discrete((step % 4) as u32),
            step as f32,
            false,
            frame(step as f32 + 1.0),
            false,
        );
    }
    buffer
}

#[test]
fn test_no_window_before_n_appends() {
    let buffer = fed_buffer(4, 3, 2);
    assert!(buffer.is_empty());
    assert_eq!(buffer.len(), 0);
}

#[test]
fn test_every_append_past_warmup_flushes() {
    // With N=2, append i (0-based) flushes for every i >= 1.
    let buffer = fed_buffer(8, 2, 6);
    assert_eq!(buffer.len(), 5);
    assert_eq!(buffer.cursor().position(), 5);
}

#[test]
fn test_fifo_eviction_worked_example() {
    // capacity=4, N=2, five completed windows W0..W4: the ring holds
    // [W4, W1, W2, W3] with the cursor back at slot 1.
    let buffer = fed_buffer(4, 2, 6);

    assert_eq!(buffer.len(), 4);
    assert_eq!(buffer.cursor().position(), 1);
    assert_eq!(buffer.stored_rewards(0), &[4.0, 5.0]); // W4
    assert_eq!(buffer.stored_rewards(1), &[1.0, 2.0]); // W1
    assert_eq!(buffer.stored_rewards(2), &[2.0, 3.0]); // W2
    assert_eq!(buffer.stored_rewards(3), &[3.0, 4.0]); // W3
}

#[test]
fn test_retains_last_capacity_windows_in_order() {
    let capacity = 3;
    let n = 2;
    let steps = 10; // windows W0..W8
    let buffer = fed_buffer(capacity, n, steps);
    assert_eq!(buffer.len(), capacity);

    // Windows W6, W7, W8 survive; Wk holds rewards [k, k+1].
    let mut survivors: Vec<Vec<f32>> = (0..capacity)
        .map(|slot| buffer.stored_rewards(slot).to_vec())
        .collect();
    survivors.sort_by(|a, b| a[0].partial_cmp(&b[0]).unwrap());
    assert_eq!(survivors, vec![vec![6.0, 7.0], vec![7.0, 8.0], vec![8.0, 9.0]]);
}

#[test]
fn test_partial_trailing_window_is_discarded() {
    let mut buffer = SlacReplayBuffer::new(
        4,
        StateSpace::vector(1),
        ActionSpace::discrete(2),
        3,
    );

    // Episode ends after a single transition: below window length,
    // nothing may reach the store.
    buffer.reset_episode(frame(0.0));
    buffer.append(Action::Discrete(0), 1.0, true, frame(1.0), true);
    assert!(buffer.is_empty());

    // The next episode starts cleanly.
    buffer.reset_episode(frame(2.0));
    for step in 0..3 {
        buffer.append(Action::Discrete(1), step as f32, false, frame(step as f32 + 3.0), false);
    }
    assert_eq!(buffer.len(), 1);
    assert_eq!(buffer.stored_rewards(0), &[0.0, 1.0, 2.0]);
}

#[test]
#[should_panic(expected = "before reset_episode")]
fn test_append_after_episode_done_requires_reset() {
    let mut buffer = SlacReplayBuffer::new(
        4,
        StateSpace::vector(1),
        ActionSpace::discrete(2),
        2,
    );
    buffer.reset_episode(frame(0.0));
    buffer.append(Action::Discrete(0), 1.0, true, frame(1.0), true);
    // Episode is over; appending without reset_episode violates the protocol.
    buffer.append(Action::Discrete(0), 1.0, false, frame(2.0), false);
}

#[test]
fn test_done_mask_stored_with_flushed_window() {
    let mut buffer = SlacReplayBuffer::new(
        4,
        StateSpace::vector(1),
        ActionSpace::discrete(2),
        2,
    );
    buffer.reset_episode(frame(0.0));
    buffer.append(Action::Discrete(0), 0.0, false, frame(1.0), false);
    buffer.append(Action::Discrete(0), 1.0, true, frame(2.0), true);

    assert_eq!(buffer.len(), 1);
    assert_eq!(buffer.stored_done(0), 1.0);
}

#[test]
fn test_sample_batch_leading_dimension() {
    let buffer = fed_buffer(8, 3, 10);
    let batch = buffer.sample_latent(5);

    assert_eq!(batch.batch_size, 5);
    assert_eq!(batch.states.as_dense().len(), 5 * 4 * 1);
    assert_eq!(batch.actions.as_discrete().len(), 5 * 3);
    assert_eq!(batch.rewards.len(), 5 * 3);
    assert_eq!(batch.dones.len(), 5);
    assert_eq!(batch.state_dims(), vec![5, 4, 1]);
    assert_eq!(batch.action_dims(), [5, 3, 1]);
    assert_eq!(batch.reward_dims(), [5, 3, 1]);
}

#[test]
fn test_sample_sac_rewards_are_last_step_slice() {
    let buffer = fed_buffer(16, 4, 30);

    // Re-seeding reproduces the same uniform index draw, so the two
    // surfaces see the same slots.
    fastrand::seed(0x5eed);
    let latent = buffer.sample_latent(12);
    fastrand::seed(0x5eed);
    let sac = buffer.sample_sac(12);

    assert_eq!(latent.states, sac.states);
    assert_eq!(latent.actions, sac.actions);
    assert_eq!(latent.dones, sac.dones);
    let n = buffer.num_sequences();
    for b in 0..12 {
        assert_eq!(sac.rewards[b], latent.rewards[b * n + n - 1]);
    }
    assert_eq!(sac.rewards.len(), 12);
}

#[test]
fn test_sampling_before_full_stays_in_valid_range() {
    // Only 3 of 100 slots are valid; every sampled window must be one
    // of the 3 stored ones.
    let buffer = fed_buffer(100, 2, 4);
    assert_eq!(buffer.len(), 3);

    let batch = buffer.sample_latent(64);
    for b in 0..64 {
        let first_reward = batch.rewards[b * 2];
        assert!(
            (0.0..=2.0).contains(&first_reward),
            "sampled a window outside the valid range: {}",
            first_reward
        );
    }
}

#[test]
#[should_panic(expected = "empty replay buffer")]
fn test_sample_empty_panics() {
    let buffer = fed_buffer(4, 2, 0);
    buffer.sample_latent(1);
}

#[test]
fn test_continuous_actions_trailing_dimension() {
    let mut buffer = SlacReplayBuffer::new(
        4,
        StateSpace::vector(2),
        ActionSpace::continuous(3),
        2,
    );
    buffer.reset_episode(Frame::features(vec![0.0, 0.0]));
    for step in 0..4 {
        buffer.append(
            Action::Continuous(vec![step as f32, 0.5, -0.5]),
            step as f32,
            false,
            Frame::features(vec![step as f32, step as f32]),
            false,
        );
    }

    let batch = buffer.sample_sac(6);
    assert_eq!(batch.actions.as_continuous().len(), 6 * 2 * 3);
    assert_eq!(batch.action_dim, 3);
}

#[test]
#[should_panic(expected = "does not fit the action space")]
fn test_wrong_action_kind_rejected() {
    let mut buffer = SlacReplayBuffer::new(
        4,
        StateSpace::vector(1),
        ActionSpace::discrete(2),
        2,
    );
    buffer.reset_episode(frame(0.0));
    buffer.append(Action::Continuous(vec![0.1]), 0.0, false, frame(1.0), false);
}

#[test]
#[should_panic(expected = "frame size")]
fn test_wrong_frame_size_rejected() {
    let mut buffer = SlacReplayBuffer::new(
        4,
        StateSpace::vector(2),
        ActionSpace::discrete(2),
        2,
    );
    buffer.reset_episode(frame(0.0));
}

#[test]
fn test_image_windows_share_frames_across_slots() {
    let mut buffer = SlacReplayBuffer::new(
        4,
        StateSpace::image(1, 2, 2),
        ActionSpace::discrete(2),
        2,
    );
    buffer.reset_episode(pixel_frame(0));
    for step in 0..3 {
        buffer.append(
            Action::Discrete(0),
            step as f32,
            false,
            pixel_frame(step as u8 + 1),
            false,
        );
    }

    // Slots 0 and 1 hold overlapping windows [s0..s2] and [s1..s3]:
    // the shared frames are the same allocations, not copies.
    let first = buffer.stored_state_window(0).unwrap();
    let second = buffer.stored_state_window(1).unwrap();
    assert!(first.frames()[1].ptr_eq(&second.frames()[0]));
    assert!(first.frames()[2].ptr_eq(&second.frames()[1]));
}

#[test]
fn test_image_sampling_materializes_dense_u8() {
    let mut buffer = SlacReplayBuffer::new(
        2,
        StateSpace::image(1, 2, 2),
        ActionSpace::discrete(2),
        2,
    );
    buffer.reset_episode(pixel_frame(10));
    buffer.append(Action::Discrete(0), 0.0, false, pixel_frame(20), false);
    buffer.append(Action::Discrete(1), 1.0, false, pixel_frame(30), false);
    assert_eq!(buffer.len(), 1);

    let batch = buffer.sample_latent(2);
    let pixels = batch.states.as_pixels();
    // Both draws hit the single stored window [s0, s1, s2].
    let expected: Vec<u8> = [10u8, 20, 30]
        .iter()
        .flat_map(|&v| vec![v; 4])
        .collect();
    assert_eq!(pixels.len(), 2 * 3 * 4);
    assert_eq!(&pixels[..12], expected.as_slice());
    assert_eq!(&pixels[12..], expected.as_slice());
    assert_eq!(batch.state_dims(), vec![2, 3, 1, 2, 2]);
}
