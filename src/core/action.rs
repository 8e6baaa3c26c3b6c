//! Action values (discrete index or continuous vector).

use crate::spaces::ActionSpace;

/// An action taken in the environment.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    /// Discrete action index.
    Discrete(u32),
    /// Continuous action vector.
    Continuous(Vec<f32>),
}

impl Action {
    /// Get the discrete action index, panics if continuous.
    pub fn as_discrete(&self) -> u32 {
        match self {
            Action::Discrete(a) => *a,
            Action::Continuous(_) => panic!("expected discrete action"),
        }
    }

    /// Get the continuous action vector, panics if discrete.
    pub fn as_continuous(&self) -> &[f32] {
        match self {
            Action::Discrete(_) => panic!("expected continuous action"),
            Action::Continuous(a) => a,
        }
    }

    /// Whether this action is valid for the given space.
    pub fn matches(&self, space: &ActionSpace) -> bool {
        match (self, space) {
            (Action::Discrete(a), ActionSpace::Discrete { n }) => (*a as usize) < *n,
            (Action::Continuous(v), ActionSpace::Box { dim }) => v.len() == *dim,
            _ => false,
        }
    }
}
