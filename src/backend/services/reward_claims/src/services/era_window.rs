use crate::models::{ClaimWindow, Era};

/// Eras `[max(0, active_era - lookback), active_era)`.
///
/// The active era itself is excluded since its rewards are not final.
pub fn compute_window(active_era: Era, lookback: u32) -> ClaimWindow {
    ClaimWindow {
        start: active_era.saturating_sub(lookback),
        end: active_era,
    }
}
