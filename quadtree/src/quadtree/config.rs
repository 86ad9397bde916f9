#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Split policy copied from the root into every node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Config {
    /// A leaf splits once it holds more than this many objects.
    pub max_objects: usize,
    /// Deepest level a split may create. Leaves at this level grow unbounded.
    pub max_levels: usize,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            max_objects: 10,
            max_levels: 4,
        }
    }
}
