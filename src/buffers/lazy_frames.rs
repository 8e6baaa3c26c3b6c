//! Shared observation frames and lazy window aggregation.
//!
//! Consecutive trajectory windows overlap in all but one frame. Copying
//! each window densely would store every image up to N+1 times; instead a
//! frame is allocated once when it leaves the environment and windows hold
//! cheap shared handles. A window only becomes a dense array when a
//! training batch asks for it, and a frame's allocation is released as
//! soon as the last window referencing it is evicted.

use std::sync::Arc;

/// A single observation frame.
///
/// Feature frames are f32 vectors; image frames are u8 pixel blocks in
/// channel-first layout. Clones share the underlying allocation.
#[derive(Debug, Clone)]
pub enum Frame {
    /// Flat feature vector.
    Features(Arc<[f32]>),
    /// Raw image pixels.
    Pixels(Arc<[u8]>),
}

impl Frame {
    /// Create a feature frame.
    pub fn features(values: Vec<f32>) -> Self {
        Self::Features(values.into())
    }

    /// Create a pixel frame.
    pub fn pixels(values: Vec<u8>) -> Self {
        Self::Pixels(values.into())
    }

    /// Number of scalar elements in the frame.
    pub fn len(&self) -> usize {
        match self {
            Self::Features(v) => v.len(),
            Self::Pixels(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Whether this is a pixel frame.
    pub fn is_pixels(&self) -> bool {
        matches!(self, Self::Pixels(_))
    }

    /// Feature contents, panics on a pixel frame.
    pub fn as_features(&self) -> &[f32] {
        match self {
            Self::Features(v) => v,
            Self::Pixels(_) => panic!("expected feature frame"),
        }
    }

    /// Pixel contents, panics on a feature frame.
    pub fn as_pixels(&self) -> &[u8] {
        match self {
            Self::Pixels(v) => v,
            Self::Features(_) => panic!("expected pixel frame"),
        }
    }

    /// Whether two frames share the same allocation.
    pub fn ptr_eq(&self, other: &Frame) -> bool {
        match (self, other) {
            (Self::Features(a), Self::Features(b)) => Arc::ptr_eq(a, b),
            (Self::Pixels(a), Self::Pixels(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }
}

/// An ordered window of frames, materialized on demand.
#[derive(Debug, Clone)]
pub struct LazyFrames {
    frames: Vec<Frame>,
}

impl LazyFrames {
    pub fn new(frames: Vec<Frame>) -> Self {
        Self { frames }
    }

    /// Number of frames in the window.
    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// The underlying frame handles.
    pub fn frames(&self) -> &[Frame] {
        &self.frames
    }

    /// Concatenate the window into a dense f32 array.
    ///
    /// Pixel frames are widened element-wise.
    pub fn materialize_f32(&self) -> Vec<f32> {
        let per_frame = self.frames.first().map_or(0, Frame::len);
        let mut out = Vec::with_capacity(self.frames.len() * per_frame);
        for frame in &self.frames {
            match frame {
                Frame::Features(v) => out.extend_from_slice(v),
                Frame::Pixels(v) => out.extend(v.iter().map(|&p| p as f32)),
            }
        }
        out
    }

    /// Concatenate the window into a dense u8 array.
    ///
    /// Panics if any frame is not a pixel frame; feature windows have no
    /// meaningful u8 representation.
    pub fn materialize_u8(&self) -> Vec<u8> {
        let per_frame = self.frames.first().map_or(0, Frame::len);
        let mut out = Vec::with_capacity(self.frames.len() * per_frame);
        for frame in &self.frames {
            out.extend_from_slice(frame.as_pixels());
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frame_clone_shares_allocation() {
        let frame = Frame::pixels(vec![1, 2, 3]);
        let clone = frame.clone();
        assert!(frame.ptr_eq(&clone));

        let other = Frame::pixels(vec![1, 2, 3]);
        assert!(!frame.ptr_eq(&other));
    }

    #[test]
    fn test_materialize_f32() {
        let window = LazyFrames::new(vec![
            Frame::features(vec![1.0, 2.0]),
            Frame::features(vec![3.0, 4.0]),
        ]);
        assert_eq!(window.len(), 2);
        assert_eq!(window.materialize_f32(), vec![1.0, 2.0, 3.0, 4.0]);
    }

    #[test]
    fn test_materialize_u8() {
        let window = LazyFrames::new(vec![
            Frame::pixels(vec![10, 20]),
            Frame::pixels(vec![30, 40]),
        ]);
        assert_eq!(window.materialize_u8(), vec![10, 20, 30, 40]);
    }

    #[test]
    fn test_materialize_f32_widens_pixels() {
        let window = LazyFrames::new(vec![Frame::pixels(vec![0, 255])]);
        assert_eq!(window.materialize_f32(), vec![0.0, 255.0]);
    }

    #[test]
    #[should_panic(expected = "expected pixel frame")]
    fn test_materialize_u8_rejects_features() {
        LazyFrames::new(vec![Frame::features(vec![1.0])]).materialize_u8();
    }
}
