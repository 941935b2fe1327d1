use anyhow::{anyhow, Context, Result};
use reward_claims::{
    models::outcome::format_tx_hash,
    services::{
        claim_planner::{ClaimPlanner, ClaimState},
        era_window::compute_window,
    },
    utils::balance::format_balance,
    ChainQuery, ExtrinsicSubmitter, OutcomeKind, PayoutOrchestrator, PeoChainApi, RunSummary,
    SubmissionOutcome,
};
use std::{path::Path, sync::Arc};
use thiserror::Error;
use tracing::info;

use crate::{
    config::Config,
    credential::{self, CredentialSource},
};

/// Error type for payout commands
#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Config parse error: {0}")]
    ConfigParse(#[from] toml::de::Error),

    #[error("Config write error: {0}")]
    ConfigWrite(#[from] toml::ser::Error),

    #[error("Invalid config: {0}")]
    InvalidConfig(String),

    #[error("Invalid account JSON: {0}")]
    InvalidAccountJson(String),

    #[error("Crypto error: {0}")]
    Crypto(String),
}

/// Commands for reward payouts
pub struct PayoutCommands;

impl PayoutCommands {
    /// Claim every unclaimed era of the configured validators
    pub async fn payout(config: &Config, source: &CredentialSource) -> Result<RunSummary> {
        config.validate()?;

        let keypair = credential::load_keypair(source)?;
        println!("Keypair created successfully.");

        let api = Self::connect(config).await?;
        let signer = api.with_signer(keypair);
        let account = signer.signer_address();

        let orchestrator =
            PayoutOrchestrator::new(Arc::new(api), Arc::new(signer), config.payout_settings());
        let context = orchestrator.preflight().await?;
        println!(
            "Account {} available balance is {}",
            account,
            format_balance(context.free, config.decimal_places, &config.denom)
        );

        let summary = orchestrator.run_with(context).await;

        Self::print_summary(config, &summary);
        Ok(summary)
    }

    /// Show what a payout would claim, without signing anything
    pub async fn plan(config: &Config) -> Result<()> {
        config.validate()?;

        let api = Self::connect(config).await?;
        let active_era = api
            .active_era()
            .await?
            .ok_or_else(|| anyhow!("chain reports no active era"))?;

        let settings = config.payout_settings();
        let window = compute_window(active_era, settings.lookback_eras);
        println!(
            "Active era is {}, inspecting eras {}..{}",
            active_era, window.start, window.end
        );

        let planner = ClaimPlanner::new(Arc::new(api), settings.query_concurrency);
        for plan in planner.plan_all(&settings.validators, window).await {
            match plan.state {
                ClaimState::Unclaimed(eras) if eras.is_empty() => {
                    println!("{}: no unclaimed rewards", plan.validator);
                }
                ClaimState::Unclaimed(eras) => {
                    let eras: Vec<String> = eras.iter().map(|era| era.to_string()).collect();
                    println!(
                        "{}: {} unclaimed eras [{}]",
                        plan.validator,
                        eras.len(),
                        eras.join(", ")
                    );
                }
                ClaimState::Inconclusive => {
                    println!("{}: claimed rewards not reported, skipped", plan.validator);
                }
                ClaimState::QueryFailed(reason) => {
                    println!("{}: query failed: {}", plan.validator, reason);
                }
            }
        }

        Ok(())
    }

    /// Write a default configuration file
    pub fn init_config(path: &Path, force: bool) -> Result<()> {
        if path.exists() && !force {
            return Err(anyhow!(
                "{} already exists, pass --force to overwrite",
                path.display()
            ));
        }

        Config::default().save(path)?;
        println!("Wrote default configuration to {}", path.display());
        Ok(())
    }

    async fn connect(config: &Config) -> Result<PeoChainApi> {
        println!("Attempting to connect to {}...", config.node_url);
        let api = PeoChainApi::new(&config.node_url)
            .await
            .context("failed to connect to node")?;
        info!(node = %config.node_url, "connected to node");
        println!("Connected to the node successfully.");
        Ok(api)
    }

    fn print_summary(config: &Config, summary: &RunSummary) {
        println!("\nPayout summary");
        for row in summary.rows() {
            if row.detail.is_empty() {
                println!("  {:<50} {}", row.validator, row.kind);
            } else {
                println!("  {:<50} {:<13} {}", row.validator, row.kind, row.detail);
            }
        }

        for (validator, outcome) in summary.entries() {
            if let SubmissionOutcome::Success { tx_hashes } = outcome {
                for tx_hash in tx_hashes {
                    if let Some(link) = config.explorer_link(&format_tx_hash(tx_hash)) {
                        println!("  {} -> {}", validator, link);
                    }
                }
            }
        }

        println!(
            "\n{} success, {} noop, {} inconclusive, {} query errors, {} failures",
            summary.count(OutcomeKind::Success),
            summary.count(OutcomeKind::NoOp),
            summary.count(OutcomeKind::Inconclusive),
            summary.count(OutcomeKind::QueryError),
            summary.count(OutcomeKind::Failure),
        );
    }
}
