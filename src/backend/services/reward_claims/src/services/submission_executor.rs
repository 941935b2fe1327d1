use std::sync::Arc;
use tokio::sync::Mutex;
use tokio::time::{timeout_at, Instant};
use tracing::{error, info, warn};

use crate::chain::{ChainQuery, ExtrinsicSubmitter};
use crate::models::outcome::{format_tx_hash, TIMEOUT_OUTCOME_UNKNOWN};
use crate::models::{Balance, BatchRequest, SubmissionOutcome, TxHash};
use crate::utils::errors::{PayoutError, Result};

/// Signs and submits payout batches from the single signing account.
///
/// Submissions are serialized behind a lock: every batch shares the
/// account's nonce, so at most one may be in flight.
pub struct SubmissionExecutor {
    submitter: Arc<dyn ExtrinsicSubmitter>,
    in_flight: Mutex<()>,
}

impl SubmissionExecutor {
    pub fn new(submitter: Arc<dyn ExtrinsicSubmitter>) -> Self {
        Self {
            submitter,
            in_flight: Mutex::new(()),
        }
    }

    pub fn signer_address(&self) -> String {
        self.submitter.signer_address()
    }

    /// Check once per run that the signing account can pay fees
    pub async fn ensure_funded(&self, query: &dyn ChainQuery) -> Result<Balance> {
        let account = self.signer_address();
        let free = query
            .account_balance(&account)
            .await
            .map_err(|source| PayoutError::BalanceUnavailable {
                account: account.clone(),
                source,
            })?;

        if free == 0 {
            return Err(PayoutError::InsufficientBalance { account, free });
        }

        info!(account = %account, free, "signing account is funded");
        Ok(free)
    }

    async fn submit_one(&self, batch: &BatchRequest) -> std::result::Result<TxHash, String> {
        let _guard = self.in_flight.lock().await;
        self.submitter
            .submit_batch(batch)
            .await
            .map_err(|e| e.to_string())
    }

    /// Submit one batch and wait for inclusion
    pub async fn submit(&self, batch: &BatchRequest) -> SubmissionOutcome {
        self.submit_all(std::slice::from_ref(batch), None).await
    }

    /// Submit the batches of one validator in order. The first failing batch
    /// stops the rest; batches already included are reported with the failure.
    pub async fn submit_all(
        &self,
        batches: &[BatchRequest],
        deadline: Option<Instant>,
    ) -> SubmissionOutcome {
        if batches.is_empty() {
            return SubmissionOutcome::NoOp;
        }

        let mut included = Vec::with_capacity(batches.len());
        for (index, batch) in batches.iter().enumerate() {
            let submitted = match deadline {
                Some(deadline) => match timeout_at(deadline, self.submit_one(batch)).await {
                    Ok(result) => result,
                    Err(_) => {
                        warn!(
                            validator = %batch.validator,
                            batch = index + 1,
                            "run deadline hit while batch was in flight"
                        );
                        return SubmissionOutcome::Failure {
                            reason: TIMEOUT_OUTCOME_UNKNOWN.to_string(),
                            included,
                        };
                    }
                },
                None => self.submit_one(batch).await,
            };

            match submitted {
                Ok(tx_hash) => {
                    info!(
                        validator = %batch.validator,
                        calls = batch.len(),
                        tx_hash = %format_tx_hash(&tx_hash),
                        "payout batch included"
                    );
                    included.push(tx_hash);
                }
                Err(reason) => {
                    error!(
                        validator = %batch.validator,
                        batch = index + 1,
                        of = batches.len(),
                        error = %reason,
                        "failed to submit payout batch"
                    );
                    let reason = if batches.len() > 1 {
                        format!("batch {} of {}: {}", index + 1, batches.len(), reason)
                    } else {
                        reason
                    };
                    return SubmissionOutcome::Failure { reason, included };
                }
            }
        }

        SubmissionOutcome::Success {
            tx_hashes: included,
        }
    }
}
