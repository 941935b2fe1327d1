use crate::models::{BatchRequest, PayoutCall, UnclaimedEraSet, Validator};

/// One `payout_stakers` call per unclaimed era, ascending, in a single batch.
///
/// Returns `None` when there is nothing to claim.
pub fn build_batch(validator: &Validator, unclaimed: &UnclaimedEraSet) -> Option<BatchRequest> {
    if unclaimed.is_empty() {
        return None;
    }

    let mut eras = unclaimed.clone();
    eras.sort_unstable();
    eras.dedup();

    let calls = eras
        .into_iter()
        .map(|era| PayoutCall {
            validator_stash: validator.address.clone(),
            era,
        })
        .collect();

    Some(BatchRequest {
        validator: validator.clone(),
        calls,
    })
}

/// Build the batch and split it when a per-batch call limit is configured
pub fn build_batches(
    validator: &Validator,
    unclaimed: &UnclaimedEraSet,
    max_calls_per_batch: Option<usize>,
) -> Vec<BatchRequest> {
    match build_batch(validator, unclaimed) {
        Some(batch) => match max_calls_per_batch {
            Some(max_calls) => batch.split(max_calls),
            None => vec![batch],
        },
        None => Vec::new(),
    }
}
