pub mod batch_builder;
pub mod claim_planner;
pub mod era_window;
pub mod payout_orchestrator;
pub mod submission_executor;
pub mod unclaimed_resolver;
