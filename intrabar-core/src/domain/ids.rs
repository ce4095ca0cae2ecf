use serde::{Deserialize, Serialize};
use std::fmt;

/// Index of a registered bar series.
///
/// Index 0 is the primary series (the first registration); 1..K are the
/// secondary series in registration order. The index doubles as the
/// tie-break priority in the merge scheduler: lower index wins.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SeriesIndex(pub usize);

impl SeriesIndex {
    pub const PRIMARY: SeriesIndex = SeriesIndex(0);

    pub fn is_primary(&self) -> bool {
        self.0 == 0
    }
}

impl fmt::Display for SeriesIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<usize> for SeriesIndex {
    fn from(index: usize) -> Self {
        Self(index)
    }
}
