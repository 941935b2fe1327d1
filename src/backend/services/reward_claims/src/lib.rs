//! Staking reward claims for a set of validators: window the recent eras,
//! find the unclaimed ones and pay them out in one atomic batch per
//! validator.

pub mod chain;
pub mod models;
pub mod services;
pub mod utils;

pub use chain::{ChainQuery, ClaimedEraQuery, ExtrinsicSubmitter, PayoutSigner, PeoChainApi};
pub use models::{
    BatchRequest, ClaimWindow, Era, OutcomeKind, PayoutSettings, RunSummary, SubmissionOutcome,
    Validator,
};
pub use services::payout_orchestrator::{PayoutOrchestrator, RunContext};
pub use utils::errors::{ChainError, PayoutError};
