use serde::{Deserialize, Serialize};

use super::{Era, Validator};

/// A single `Staking::payout_stakers` call
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PayoutCall {
    pub validator_stash: String,
    pub era: Era,
}

/// Payout calls for one validator, applied by the chain as one atomic batch
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchRequest {
    pub validator: Validator,
    pub calls: Vec<PayoutCall>,
}

impl BatchRequest {
    pub fn len(&self) -> usize {
        self.calls.len()
    }

    pub fn is_empty(&self) -> bool {
        self.calls.is_empty()
    }

    pub fn eras(&self) -> impl Iterator<Item = Era> + '_ {
        self.calls.iter().map(|call| call.era)
    }

    /// Split into consecutive batches of at most `max_calls` calls.
    ///
    /// Era order is kept both inside and across the returned batches.
    /// A `max_calls` of zero is treated as no limit.
    pub fn split(self, max_calls: usize) -> Vec<BatchRequest> {
        if max_calls == 0 || self.calls.len() <= max_calls {
            return vec![self];
        }

        let validator = self.validator;
        self.calls
            .chunks(max_calls)
            .map(|chunk| BatchRequest {
                validator: validator.clone(),
                calls: chunk.to_vec(),
            })
            .collect()
    }
}
