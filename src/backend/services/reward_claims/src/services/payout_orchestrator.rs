use futures::{pin_mut, StreamExt};
use std::sync::Arc;
use tokio::time::{timeout_at, Instant};
use tracing::{info, warn};

use crate::chain::{ChainQuery, ExtrinsicSubmitter};
use crate::models::outcome::TIMEOUT_NOT_ATTEMPTED;
use crate::models::{Balance, Era, OutcomeKind, PayoutSettings, RunSummary, SubmissionOutcome};
use crate::services::batch_builder::build_batches;
use crate::services::claim_planner::{ClaimPlan, ClaimPlanner, ClaimState};
use crate::services::era_window::compute_window;
use crate::services::submission_executor::SubmissionExecutor;
use crate::utils::errors::{PayoutError, Result};

pub const INCONCLUSIVE_DETAIL: &str = "claimed rewards not reported by chain";

/// Chain state read once before a run
#[derive(Debug, Clone, Copy)]
pub struct RunContext {
    /// Free balance of the signing account
    pub free: Balance,
    pub active_era: Era,
    deadline: Option<Instant>,
}

/// Drives a payout run: one window/resolve/build/submit pass per validator.
///
/// Validator-scoped problems end up as entries of the returned summary.
/// Only the pre-run checks abort the run.
pub struct PayoutOrchestrator {
    query: Arc<dyn ChainQuery>,
    planner: ClaimPlanner,
    executor: SubmissionExecutor,
    settings: PayoutSettings,
}

impl PayoutOrchestrator {
    pub fn new(
        query: Arc<dyn ChainQuery>,
        submitter: Arc<dyn ExtrinsicSubmitter>,
        settings: PayoutSettings,
    ) -> Self {
        Self {
            planner: ClaimPlanner::new(query.clone(), settings.query_concurrency),
            query,
            executor: SubmissionExecutor::new(submitter),
            settings,
        }
    }

    /// Pre-run checks: the signing account is funded and the chain reports
    /// an active era. The run deadline starts counting here.
    pub async fn preflight(&self) -> Result<RunContext> {
        let deadline = self.settings.run_timeout.map(|timeout| Instant::now() + timeout);

        let free = self.executor.ensure_funded(self.query.as_ref()).await?;

        let active_era = self
            .query
            .active_era()
            .await?
            .ok_or(PayoutError::ActiveEraUnavailable)?;
        info!(active_era, "active era");

        Ok(RunContext {
            free,
            active_era,
            deadline,
        })
    }

    /// Process every configured validator against a checked context
    pub async fn run_with(&self, context: RunContext) -> RunSummary {
        let summary = self.run_at_era(context.active_era, context.deadline).await;
        info!(
            validators = summary.len(),
            success = summary.count(OutcomeKind::Success),
            noop = summary.count(OutcomeKind::NoOp),
            inconclusive = summary.count(OutcomeKind::Inconclusive),
            query_error = summary.count(OutcomeKind::QueryError),
            failure = summary.count(OutcomeKind::Failure),
            "payout run finished"
        );
        summary
    }

    pub async fn run(&self) -> Result<RunSummary> {
        let context = self.preflight().await?;
        Ok(self.run_with(context).await)
    }

    async fn run_at_era(&self, active_era: Era, deadline: Option<Instant>) -> RunSummary {
        let window = compute_window(active_era, self.settings.lookback_eras);
        info!(start = window.start, end = window.end, "claim window");

        let validators = &self.settings.validators;
        let mut summary = RunSummary::new();

        let plans = self.planner.plans(validators, window);
        pin_mut!(plans);

        loop {
            let next = match deadline {
                Some(deadline) => match timeout_at(deadline, plans.next()).await {
                    Ok(next) => next,
                    Err(_) => break,
                },
                None => plans.next().await,
            };
            let Some(plan) = next else {
                break;
            };

            let validator = plan.validator.clone();
            let outcome = self.settle(plan, deadline).await;
            summary.push(validator, outcome);
        }

        // Deadline passed before these validators were reached
        for validator in &validators[summary.len()..] {
            warn!(validator = %validator, "run deadline passed, validator not attempted");
            summary.push(
                validator.clone(),
                SubmissionOutcome::failure(TIMEOUT_NOT_ATTEMPTED),
            );
        }

        summary
    }

    async fn settle(&self, plan: ClaimPlan, deadline: Option<Instant>) -> SubmissionOutcome {
        let eras = match plan.state {
            ClaimState::Unclaimed(eras) => eras,
            ClaimState::Inconclusive => {
                return SubmissionOutcome::Inconclusive {
                    detail: INCONCLUSIVE_DETAIL.to_string(),
                }
            }
            ClaimState::QueryFailed(reason) => return SubmissionOutcome::QueryFailed { reason },
        };

        let batches = build_batches(&plan.validator, &eras, self.settings.max_calls_per_batch);
        if batches.is_empty() {
            info!(validator = %plan.validator, "No unclaimed rewards");
            return SubmissionOutcome::NoOp;
        }

        if deadline.map_or(false, |deadline| Instant::now() >= deadline) {
            return SubmissionOutcome::failure(TIMEOUT_NOT_ATTEMPTED);
        }

        info!(
            validator = %plan.validator,
            eras = eras.len(),
            batches = batches.len(),
            "claiming unclaimed eras"
        );
        self.executor.submit_all(&batches, deadline).await
    }
}
