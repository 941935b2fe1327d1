use anyhow::Result;
use async_trait::async_trait;
use mockall::mock;
use std::sync::Arc;

use reward_claims::{
    chain::{ChainQuery, ClaimedEraQuery, ExtrinsicSubmitter},
    models::{Balance, BatchRequest, ClaimWindow, ClaimedEraSet, Era, TxHash},
    services::submission_executor::SubmissionExecutor,
    ChainError, OutcomeKind, PayoutError, PayoutOrchestrator, PayoutSettings, SubmissionOutcome,
    Validator,
};

// Mock chain boundary
mock! {
    pub Query {}
    #[async_trait]
    impl ChainQuery for Query {
        async fn account_balance(&self, address: &str) -> Result<Balance, ChainError>;
        async fn active_era(&self) -> Result<Option<Era>, ChainError>;
        async fn claimed_eras(
            &self,
            address: &str,
            window: ClaimWindow,
        ) -> Result<ClaimedEraQuery, ChainError>;
    }
}

mock! {
    pub Submitter {}
    #[async_trait]
    impl ExtrinsicSubmitter for Submitter {
        fn signer_address(&self) -> String;
        async fn submit_batch(&self, batch: &BatchRequest) -> Result<TxHash, ChainError>;
    }
}

const SIGNER: &str = "5GrwvaEF5zXb26Fz9rcQpDWS57CtERHpNehXCPcNoHGKutQY";
const VALIDATOR_A: &str = "GTzRQPzkcuynHgkEHhsPBFpKdh4sAacVRsnd8vYfPpTMeEY";
const VALIDATOR_B: &str = "EPStAMtjApGg8Ap6xKe9gyuinjmetz1MNhzu1cPmLQkWKUA";

// Test helpers
fn funded_query(active_era: Era) -> MockQuery {
    let mut query = MockQuery::new();
    query
        .expect_account_balance()
        .returning(|_| Ok(1_000_000_000_000));
    query
        .expect_active_era()
        .returning(move || Ok(Some(active_era)));
    query
}

fn signer() -> MockSubmitter {
    let mut submitter = MockSubmitter::new();
    submitter
        .expect_signer_address()
        .returning(|| SIGNER.to_string());
    submitter
}

fn settings(validators: &[&str]) -> PayoutSettings {
    PayoutSettings::new(validators.iter().map(|v| Validator::new(*v)).collect())
}

#[tokio::test]
async fn test_zero_balance_aborts_run() -> Result<()> {
    let mut query = MockQuery::new();
    query
        .expect_account_balance()
        .times(1)
        .returning(|_| Ok(0));
    query.expect_active_era().times(0);
    query.expect_claimed_eras().times(0);

    let mut submitter = signer();
    submitter.expect_submit_batch().times(0);

    let orchestrator = PayoutOrchestrator::new(
        Arc::new(query),
        Arc::new(submitter),
        settings(&[VALIDATOR_A, VALIDATOR_B]),
    );

    let result = orchestrator.run().await;
    assert!(matches!(
        result,
        Err(PayoutError::InsufficientBalance { free: 0, .. })
    ));

    Ok(())
}

#[tokio::test]
async fn test_unreadable_balance_aborts_run() -> Result<()> {
    let mut query = MockQuery::new();
    query
        .expect_account_balance()
        .returning(|_| Err(ChainError::Connection("socket closed".into())));
    query.expect_claimed_eras().times(0);

    let mut submitter = signer();
    submitter.expect_submit_batch().times(0);

    let orchestrator =
        PayoutOrchestrator::new(Arc::new(query), Arc::new(submitter), settings(&[VALIDATOR_A]));

    match orchestrator.run().await {
        Err(PayoutError::BalanceUnavailable { account, .. }) => assert_eq!(account, SIGNER),
        other => panic!("expected BalanceUnavailable, got {:?}", other),
    }

    Ok(())
}

#[tokio::test]
async fn test_missing_active_era_aborts_run() -> Result<()> {
    let mut query = MockQuery::new();
    query.expect_account_balance().returning(|_| Ok(10));
    query.expect_active_era().returning(|| Ok(None));
    query.expect_claimed_eras().times(0);

    let orchestrator =
        PayoutOrchestrator::new(Arc::new(query), Arc::new(signer()), settings(&[VALIDATOR_A]));

    assert!(matches!(
        orchestrator.run().await,
        Err(PayoutError::ActiveEraUnavailable)
    ));

    Ok(())
}

#[tokio::test]
async fn test_single_batch_for_unclaimed_tail() -> Result<()> {
    let mut query = funded_query(100);
    query
        .expect_claimed_eras()
        .times(1)
        .returning(|_, _| Ok(ClaimedEraQuery::Reported((0..=90).collect())));

    let mut submitter = signer();
    submitter
        .expect_submit_batch()
        .withf(|batch: &BatchRequest| {
            batch.validator.address == VALIDATOR_A
                && batch.eras().collect::<Vec<_>>() == (91..100).collect::<Vec<_>>()
        })
        .times(1)
        .returning(|_| Ok(TxHash::from_low_u64_be(1)));

    let orchestrator =
        PayoutOrchestrator::new(Arc::new(query), Arc::new(submitter), settings(&[VALIDATOR_A]));

    let summary = orchestrator.run().await?;
    assert_eq!(summary.len(), 1);
    assert_eq!(
        summary.outcome_for(VALIDATOR_A),
        Some(&SubmissionOutcome::Success {
            tx_hashes: vec![TxHash::from_low_u64_be(1)]
        })
    );

    Ok(())
}

#[tokio::test]
async fn test_absent_claim_data_is_inconclusive() -> Result<()> {
    let mut query = funded_query(100);
    query
        .expect_claimed_eras()
        .returning(|_, _| Ok(ClaimedEraQuery::Absent));

    let mut submitter = signer();
    submitter.expect_submit_batch().times(0);

    let orchestrator =
        PayoutOrchestrator::new(Arc::new(query), Arc::new(submitter), settings(&[VALIDATOR_A]));

    let summary = orchestrator.run().await?;
    let rows = summary.rows();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].kind, OutcomeKind::Inconclusive);

    Ok(())
}

#[tokio::test]
async fn test_fully_claimed_window_is_noop() -> Result<()> {
    let mut query = funded_query(100);
    query
        .expect_claimed_eras()
        .returning(|_, _| Ok(ClaimedEraQuery::Reported((16..100).collect())));

    let mut submitter = signer();
    submitter.expect_submit_batch().times(0);

    let orchestrator =
        PayoutOrchestrator::new(Arc::new(query), Arc::new(submitter), settings(&[VALIDATOR_A]));

    let summary = orchestrator.run().await?;
    assert_eq!(summary.outcome_for(VALIDATOR_A), Some(&SubmissionOutcome::NoOp));
    assert!(!summary.has_failures());

    Ok(())
}

#[tokio::test]
async fn test_query_error_is_reported_separately() -> Result<()> {
    let mut query = funded_query(10);
    query.expect_claimed_eras().returning(|address, _| {
        if address == VALIDATOR_A {
            Err(ChainError::Decode("unexpected ledger layout".into()))
        } else {
            Ok(ClaimedEraQuery::Reported(ClaimedEraSet::new()))
        }
    });

    let mut submitter = signer();
    submitter
        .expect_submit_batch()
        .times(1)
        .returning(|_| Ok(TxHash::from_low_u64_be(7)));

    let orchestrator = PayoutOrchestrator::new(
        Arc::new(query),
        Arc::new(submitter),
        settings(&[VALIDATOR_A, VALIDATOR_B]),
    );

    let summary = orchestrator.run().await?;
    let rows = summary.rows();
    assert_eq!(rows[0].kind.as_str(), "query_error");
    assert!(rows[0].detail.contains("unexpected ledger layout"));
    assert_eq!(rows[1].kind, OutcomeKind::Success);

    Ok(())
}

#[tokio::test]
async fn test_failed_validator_does_not_block_next() -> Result<()> {
    let mut query = funded_query(20);
    query
        .expect_claimed_eras()
        .returning(|_, _| Ok(ClaimedEraQuery::Reported(ClaimedEraSet::new())));

    let mut submitter = signer();
    submitter
        .expect_submit_batch()
        .times(2)
        .returning(|batch: &BatchRequest| {
            if batch.validator.address == VALIDATOR_A {
                Err(ChainError::Submission("Priority is too low".into()))
            } else {
                Ok(TxHash::from_low_u64_be(2))
            }
        });

    let orchestrator = PayoutOrchestrator::new(
        Arc::new(query),
        Arc::new(submitter),
        settings(&[VALIDATOR_A, VALIDATOR_B]),
    );

    let summary = orchestrator.run().await?;
    assert_eq!(summary.len(), 2);

    match summary.outcome_for(VALIDATOR_A) {
        Some(SubmissionOutcome::Failure { reason, included }) => {
            assert!(reason.contains("Priority is too low"));
            assert!(included.is_empty());
        }
        other => panic!("expected failure, got {:?}", other),
    }
    assert_eq!(
        summary.outcome_for(VALIDATOR_B).map(SubmissionOutcome::kind),
        Some(OutcomeKind::Success)
    );
    assert!(summary.has_failures());

    Ok(())
}

#[tokio::test]
async fn test_executor_reports_included_batches_on_failure() -> Result<()> {
    let mut submitter = signer();
    let mut seq = mockall::Sequence::new();
    submitter
        .expect_submit_batch()
        .times(1)
        .in_sequence(&mut seq)
        .returning(|_| Ok(TxHash::from_low_u64_be(11)));
    submitter
        .expect_submit_batch()
        .times(1)
        .in_sequence(&mut seq)
        .returning(|_| Err(ChainError::Submission("ExhaustsResources".into())));

    let executor = SubmissionExecutor::new(Arc::new(submitter));
    let validator = Validator::new(VALIDATOR_A);
    let batches = reward_claims::services::batch_builder::build_batches(
        &validator,
        &(0..6).collect(),
        Some(2),
    );
    assert_eq!(batches.len(), 3);

    let outcome = executor.submit_all(&batches, None).await;
    assert_eq!(
        outcome,
        SubmissionOutcome::Failure {
            reason: "batch 2 of 3: Submission error: ExhaustsResources".into(),
            included: vec![TxHash::from_low_u64_be(11)],
        }
    );

    Ok(())
}

#[tokio::test]
async fn test_submit_single_batch() -> Result<()> {
    let mut submitter = signer();
    submitter
        .expect_submit_batch()
        .withf(|batch: &BatchRequest| batch.eras().collect::<Vec<_>>() == vec![3, 4])
        .times(1)
        .returning(|_| Ok(TxHash::from_low_u64_be(21)));

    let executor = SubmissionExecutor::new(Arc::new(submitter));
    let validator = Validator::new(VALIDATOR_A);
    let batch = reward_claims::services::batch_builder::build_batch(&validator, &vec![4, 3])
        .expect("two eras make a batch");

    let outcome = executor.submit(&batch).await;
    assert_eq!(
        outcome,
        SubmissionOutcome::Success {
            tx_hashes: vec![TxHash::from_low_u64_be(21)]
        }
    );

    Ok(())
}

#[tokio::test]
async fn test_submit_single_batch_failure_keeps_reason() -> Result<()> {
    let mut submitter = signer();
    submitter
        .expect_submit_batch()
        .times(1)
        .returning(|_| Err(ChainError::Submission("Staking.AlreadyClaimed".into())));

    let executor = SubmissionExecutor::new(Arc::new(submitter));
    let validator = Validator::new(VALIDATOR_A);
    let batch = reward_claims::services::batch_builder::build_batch(&validator, &vec![9])
        .expect("one era makes a batch");

    let outcome = executor.submit(&batch).await;
    assert_eq!(
        outcome,
        SubmissionOutcome::Failure {
            reason: "Submission error: Staking.AlreadyClaimed".into(),
            included: vec![],
        }
    );

    Ok(())
}

#[tokio::test]
async fn test_preflight_reads_balance_once() -> Result<()> {
    let mut query = MockQuery::new();
    query
        .expect_account_balance()
        .times(1)
        .returning(|_| Ok(42_000));
    query
        .expect_active_era()
        .times(1)
        .returning(|| Ok(Some(30)));
    query
        .expect_claimed_eras()
        .times(1)
        .returning(|_, window| Ok(ClaimedEraQuery::Reported(window.eras().collect())));

    let mut submitter = signer();
    submitter.expect_submit_batch().times(0);

    let orchestrator =
        PayoutOrchestrator::new(Arc::new(query), Arc::new(submitter), settings(&[VALIDATOR_A]));

    let context = orchestrator.preflight().await?;
    assert_eq!(context.free, 42_000);
    assert_eq!(context.active_era, 30);

    let summary = orchestrator.run_with(context).await;
    assert_eq!(summary.outcome_for(VALIDATOR_A), Some(&SubmissionOutcome::NoOp));

    Ok(())
}
