use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::ops::Range;

/// Staking era index
pub type Era = u32;

/// Eras the chain reports as already paid out for one validator
pub type ClaimedEraSet = BTreeSet<Era>;

/// Eras of a window that are still unclaimed, ascending
pub type UnclaimedEraSet = Vec<Era>;

/// Half-open range of eras `[start, end)` inspected for unclaimed rewards.
///
/// `end` is the active era, which is never part of the window because its
/// rewards are not final yet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClaimWindow {
    pub start: Era,
    pub end: Era,
}

impl ClaimWindow {
    pub fn eras(&self) -> Range<Era> {
        self.start..self.end
    }

    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start) as usize
    }

    pub fn is_empty(&self) -> bool {
        self.start >= self.end
    }

    pub fn contains(&self, era: Era) -> bool {
        self.eras().contains(&era)
    }
}
