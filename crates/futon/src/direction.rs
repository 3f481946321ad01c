use serde::{Deserialize, Serialize};
use std::fmt;

///
/// Direction
///
/// Canonical traversal direction shared by page cursors, view queries,
/// and the pagination engine.
///

#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub enum Direction {
    #[default]
    Forward,
    Backward,
}

impl Direction {
    #[must_use]
    pub const fn is_backward(self) -> bool {
        matches!(self, Self::Backward)
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Forward => "forward",
            Self::Backward => "backward",
        };
        write!(f, "{label}")
    }
}
