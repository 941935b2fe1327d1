use crate::chain::ClaimedEraQuery;
use crate::models::{ClaimWindow, ClaimedEraSet, UnclaimedEraSet};

/// Result of comparing a validator's claimed eras against the window
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    Unclaimed(UnclaimedEraSet),
    /// No claimed-era data was reported, so nothing can be concluded
    Inconclusive,
}

/// `window \ claimed`, ascending
pub fn resolve_unclaimed(window: &ClaimWindow, claimed: &ClaimedEraSet) -> UnclaimedEraSet {
    window.eras().filter(|era| !claimed.contains(era)).collect()
}

/// Resolve against chain-reported data. Absent data is never read as
/// "nothing claimed" nor as "everything claimed".
pub fn resolve(window: &ClaimWindow, query: &ClaimedEraQuery) -> Resolution {
    match query {
        ClaimedEraQuery::Reported(claimed) => {
            Resolution::Unclaimed(resolve_unclaimed(window, claimed))
        }
        ClaimedEraQuery::Absent => Resolution::Inconclusive,
    }
}
