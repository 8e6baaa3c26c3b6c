//! State and action space descriptors.
//!
//! Shapes are fixed per environment: states are either flat feature
//! vectors or channel-first images, actions are either a continuous
//! box or a single discrete index. Anything else is unrepresentable.

/// Observation space descriptor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StateSpace {
    /// Flat feature vector of `dim` f32 values.
    Vector { dim: usize },
    /// Channel-first image of u8 pixels.
    Image {
        channels: usize,
        height: usize,
        width: usize,
    },
}

impl StateSpace {
    /// Create a vector space.
    pub fn vector(dim: usize) -> Self {
        assert!(dim > 0, "state dimension must be positive");
        Self::Vector { dim }
    }

    /// Create an image space.
    pub fn image(channels: usize, height: usize, width: usize) -> Self {
        assert!(
            channels > 0 && height > 0 && width > 0,
            "image dimensions must be positive"
        );
        Self::Image {
            channels,
            height,
            width,
        }
    }

    /// Number of scalar elements in a single frame.
    pub fn frame_size(&self) -> usize {
        match self {
            Self::Vector { dim } => *dim,
            Self::Image {
                channels,
                height,
                width,
            } => channels * height * width,
        }
    }

    /// Shape of a single frame.
    pub fn frame_shape(&self) -> Vec<usize> {
        match self {
            Self::Vector { dim } => vec![*dim],
            Self::Image {
                channels,
                height,
                width,
            } => vec![*channels, *height, *width],
        }
    }

    /// Whether frames in this space are images.
    pub fn is_image(&self) -> bool {
        matches!(self, Self::Image { .. })
    }
}

/// Action space descriptor.
///
/// Continuous actions are f32 vectors of length `dim`; discrete actions
/// are a single index, stored with a trailing dimension of 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionSpace {
    /// Continuous box with `dim` components.
    Box { dim: usize },
    /// Discrete space with `n` actions.
    Discrete { n: usize },
}

impl ActionSpace {
    /// Create a continuous box space.
    pub fn continuous(dim: usize) -> Self {
        assert!(dim > 0, "action dimension must be positive");
        Self::Box { dim }
    }

    /// Create a discrete space.
    pub fn discrete(n: usize) -> Self {
        assert!(n > 0, "discrete space must have at least one action");
        Self::Discrete { n }
    }

    /// Trailing dimension of a stored action.
    pub fn action_dim(&self) -> usize {
        match self {
            Self::Box { dim } => *dim,
            Self::Discrete { .. } => 1,
        }
    }

    /// Whether this space is discrete.
    pub fn is_discrete(&self) -> bool {
        matches!(self, Self::Discrete { .. })
    }
}
