use futures::stream::{self, Stream, StreamExt};
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::chain::ChainQuery;
use crate::models::{ClaimWindow, UnclaimedEraSet, Validator};
use crate::services::unclaimed_resolver::{resolve, Resolution};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClaimState {
    Unclaimed(UnclaimedEraSet),
    Inconclusive,
    QueryFailed(String),
}

/// Read-only view of what one validator still has to claim
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClaimPlan {
    pub validator: Validator,
    pub window: ClaimWindow,
    pub state: ClaimState,
}

/// Runs the read stages of the payout pipeline: claimed-era lookup and
/// resolution against the window. Never touches the signing account.
pub struct ClaimPlanner {
    query: Arc<dyn ChainQuery>,
    concurrency: usize,
}

impl ClaimPlanner {
    pub fn new(query: Arc<dyn ChainQuery>, concurrency: usize) -> Self {
        Self {
            query,
            concurrency: concurrency.max(1),
        }
    }

    pub async fn plan_validator(&self, validator: &Validator, window: ClaimWindow) -> ClaimPlan {
        let state = match self.query.claimed_eras(&validator.address, window).await {
            Ok(claimed) => match resolve(&window, &claimed) {
                Resolution::Unclaimed(eras) => {
                    debug!(validator = %validator, unclaimed = ?eras, "resolved unclaimed eras");
                    ClaimState::Unclaimed(eras)
                }
                Resolution::Inconclusive => {
                    info!(validator = %validator, "claimed rewards not reported, skipping");
                    ClaimState::Inconclusive
                }
            },
            Err(e) => {
                warn!(validator = %validator, error = %e, "failed to query claimed eras");
                ClaimState::QueryFailed(e.to_string())
            }
        };

        ClaimPlan {
            validator: validator.clone(),
            window,
            state,
        }
    }

    /// Plans for `validators` in their given order. Up to `concurrency`
    /// lookups run ahead of the consumer.
    pub fn plans<'a>(
        &'a self,
        validators: &'a [Validator],
        window: ClaimWindow,
    ) -> impl Stream<Item = ClaimPlan> + 'a {
        stream::iter(validators)
            .map(move |validator| self.plan_validator(validator, window))
            .buffered(self.concurrency)
    }

    pub async fn plan_all(&self, validators: &[Validator], window: ClaimWindow) -> Vec<ClaimPlan> {
        self.plans(validators, window).collect().await
    }
}
