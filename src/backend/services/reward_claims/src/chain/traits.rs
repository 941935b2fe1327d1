use async_trait::async_trait;

use crate::models::{Balance, BatchRequest, ClaimWindow, ClaimedEraSet, Era, TxHash};
use crate::utils::errors::ChainError;

/// Claimed-era data as reported by the chain for one validator
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClaimedEraQuery {
    Reported(ClaimedEraSet),
    /// The staking entry or its claimed-rewards field is missing
    Absent,
}

#[async_trait]
pub trait ChainQuery: Send + Sync {
    /// Free balance of `address`
    async fn account_balance(&self, address: &str) -> Result<Balance, ChainError>;
    async fn active_era(&self) -> Result<Option<Era>, ChainError>;
    /// Eras claimed by the stash `address`. Eras inside `window` are checked
    /// against per-era page records when the ledger only carries the legacy list.
    async fn claimed_eras(
        &self,
        address: &str,
        window: ClaimWindow,
    ) -> Result<ClaimedEraQuery, ChainError>;
}

/// Signs and submits payout batches. Implementors own the signing key and
/// with it the account nonce, so calls must not overlap.
#[async_trait]
pub trait ExtrinsicSubmitter: Send + Sync {
    fn signer_address(&self) -> String;

    /// Submit `batch` as one extrinsic and wait until it is included
    async fn submit_batch(&self, batch: &BatchRequest) -> Result<TxHash, ChainError>;
}
